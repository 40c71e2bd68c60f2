//! Error types for vault-setup
//!
//! This module defines all error types used throughout the application,
//! providing detailed error information for debugging and user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vault-setup operations
#[derive(Error, Debug)]
pub enum SetupError {
    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration document does not exist
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Configuration document is not valid JSON
    #[error("Error loading configuration '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A key required by a downstream component is absent
    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    /// A configuration key holds a value of the wrong JSON type
    #[error("Invalid configuration value for '{key}': expected {expected}")]
    InvalidConfigValue { key: String, expected: &'static str },

    /// A required source asset (file or directory) is absent
    #[error("Source asset not found: {0}")]
    SourceAssetMissing(PathBuf),

    /// One or more required plugins are not installed
    #[error("Required plugins not installed: {}", .0.join(", "))]
    PluginsMissing(Vec<String>),

    /// Copying a single file failed
    #[error("Error copying '{source_path}' to '{dest}': {message}")]
    FileCopy {
        source_path: PathBuf,
        dest: PathBuf,
        message: String,
    },

    /// Creating a backup failed
    #[error("Failed to backup '{path}': {message}")]
    Backup { path: PathBuf, message: String },

    /// Placeholder substitution failed
    #[error("Template error in '{path}': {message}")]
    Template { path: PathBuf, message: String },

    /// Writing the plugin settings document failed
    #[error("Error writing plugin settings '{path}': {message}")]
    SettingsWrite { path: PathBuf, message: String },

    /// Vault path is missing or not a directory
    #[error("Invalid vault path '{path}': {reason}")]
    InvalidVault { path: PathBuf, reason: &'static str },

    /// Both copy-only and configure-only were requested
    #[error("Cannot use --copy and --configure together. Use one or neither (for both).")]
    InvalidModeSelection,

    /// Invalid glob pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl SetupError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration parse error
    pub fn config_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source,
        }
    }

    /// Create a file copy error
    pub fn file_copy(
        source: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::FileCopy {
            source_path: source.into(),
            dest: dest.into(),
            message: message.into(),
        }
    }

    /// Create a settings write error
    pub fn settings_write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::SettingsWrite {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for vault-setup operations
pub type Result<T> = std::result::Result<T, SetupError>;

impl From<std::io::Error> for SetupError {
    fn from(err: std::io::Error) -> Self {
        SetupError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| SetupError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SetupError::io("/vault/config.json", io_err);
        assert!(matches!(err, SetupError::Io { ref path, .. } if path == Path::new("/vault/config.json")));
        assert!(err.to_string().contains("/vault/config.json"));
    }

    #[test]
    fn test_plugins_missing_lists_all_names() {
        let err = SetupError::PluginsMissing(vec!["dataview".into(), "metadata-extractor".into()]);
        assert_eq!(
            err.to_string(),
            "Required plugins not installed: dataview, metadata-extractor"
        );
    }

    #[test]
    fn test_with_path_extension() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        let err = result.with_path("/vault/Templater").unwrap_err();
        assert!(matches!(err, SetupError::Io { ref path, .. } if path == Path::new("/vault/Templater")));
    }
}
