//! Two-document configuration resolver
//!
//! Lookups walk a dotted key path through the vault's configuration
//! document first and fall back to the source bundle's document.

use crate::config::layout::DEFAULT_BACKUP_DIR;
use crate::config::SetupOverrides;
use crate::error::{IoResultExt, Result, SetupError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// Immutable configuration resolver over a primary and a source document
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    /// Configuration living in the vault
    primary: Option<Value>,
    /// Configuration living in the source bundle
    source: Option<Value>,
}

impl ConfigResolver {
    /// Create a resolver from already-parsed documents
    pub fn new(primary: Option<Value>, source: Option<Value>) -> Self {
        Self { primary, source }
    }

    /// Resolver with only a source document, used before the vault has a configuration
    pub fn source_only(source: Option<Value>) -> Self {
        Self::new(None, source)
    }

    /// Load a configuration document, failing if it is absent or malformed
    pub fn load(path: &Path) -> Result<Value> {
        if !path.exists() {
            return Err(SetupError::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).with_path(path)?;
        serde_json::from_str(&content).map_err(|e| SetupError::config_parse(path, e))
    }

    /// Load the source bundle's document; any failure means "no source document"
    pub fn load_source(path: &Path) -> Option<Value> {
        match Self::load(path) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::debug!("Source configuration unavailable: {}", e);
                None
            }
        }
    }

    /// Look up a dotted key, falling back to the source document
    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        self.primary
            .as_ref()
            .and_then(|doc| walk(doc, dotted_path))
            .or_else(|| self.source.as_ref().and_then(|doc| walk(doc, dotted_path)))
    }

    /// Look up a dotted key and deserialize it, returning `default` when absent
    pub fn get_or<T: DeserializeOwned>(&self, dotted_path: &str, default: T) -> T {
        match self.get(dotted_path) {
            Some(value) => match T::deserialize(value) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(
                        "Ignoring configuration value for '{}': {}",
                        dotted_path,
                        e
                    );
                    default
                }
            },
            None => default,
        }
    }

    /// Directly access a key that must be present in the vault document
    pub fn require(&self, dotted_path: &str) -> Result<&Value> {
        self.primary
            .as_ref()
            .and_then(|doc| walk(doc, dotted_path))
            .ok_or_else(|| SetupError::MissingConfigKey(dotted_path.to_string()))
    }

    /// Directly access a required string key
    pub fn require_str(&self, dotted_path: &str) -> Result<&str> {
        self.require(dotted_path)?
            .as_str()
            .ok_or_else(|| SetupError::InvalidConfigValue {
                key: dotted_path.to_string(),
                expected: "a string",
            })
    }

    /// Directly access a required list of strings
    pub fn require_str_list(&self, dotted_path: &str) -> Result<Vec<String>> {
        str_list(self.require(dotted_path)?, dotted_path)
    }

    /// Look up an optional list of strings, falling back to the source document
    ///
    /// Absent means empty; a value of any other shape is an error.
    pub fn get_str_list(&self, dotted_path: &str) -> Result<Vec<String>> {
        match self.get(dotted_path) {
            Some(value) => str_list(value, dotted_path),
            None => Ok(Vec::new()),
        }
    }

    /// Plugin identifiers that must be installed before configuring
    pub fn required_plugins(&self) -> Result<Vec<String>> {
        self.get_str_list("required_plugins")
    }
}

fn str_list(value: &Value, dotted_path: &str) -> Result<Vec<String>> {
    let invalid = || SetupError::InvalidConfigValue {
        key: dotted_path.to_string(),
        expected: "a list of strings",
    };

    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// Walk a dotted path; JSON `null` counts as absent
fn walk<'a>(doc: &'a Value, dotted_path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for key in dotted_path.split('.') {
        current = current.as_object()?.get(key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Directory conventions declared under `paths`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    /// Folder holding Templater templates
    pub templates_folder: String,
    /// Folder holding Templater user scripts
    pub user_scripts_folder: String,
    /// Folder whose templates are bound to hotkeys
    pub commands_folder: String,
    /// Folders receiving a folder template
    pub note_directories: Vec<String>,
    /// Subset of note folders using the daily-note template
    pub daily_note_directories: Vec<String>,
    /// Template for new notes
    pub new_note_template: String,
    /// Template for daily notes
    pub daily_note_template: String,
    /// Template run when Obsidian starts
    pub startup_template: String,
    /// Folders receiving web clippings
    pub clipping_directories: Vec<String>,
}

impl VaultPaths {
    /// Read the `paths` block from the vault document
    pub fn from_resolver(resolver: &ConfigResolver) -> Result<Self> {
        Ok(Self {
            templates_folder: resolver.require_str("paths.templates_folder")?.to_string(),
            user_scripts_folder: resolver.require_str("paths.user_scripts_folder")?.to_string(),
            commands_folder: resolver.require_str("paths.commands_folder")?.to_string(),
            note_directories: resolver.require_str_list("paths.note_directories")?,
            daily_note_directories: resolver.require_str_list("paths.daily_note_directories")?,
            new_note_template: resolver.require_str("paths.new_note_template")?.to_string(),
            daily_note_template: resolver.require_str("paths.daily_note_template")?.to_string(),
            startup_template: resolver.require_str("paths.startup_template")?.to_string(),
            clipping_directories: resolver.get_or("paths.clipping_directories", Vec::new()),
        })
    }
}

/// Backup and overwrite behavior declared under `setup`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPolicy {
    /// Back up files before overwriting them
    pub backup_enabled: bool,
    /// Backup directory name, relative to the vault
    pub backup_directory: String,
    /// Overwrite existing files instead of skipping them
    pub overwrite_existing: bool,
}

impl Default for SetupPolicy {
    fn default() -> Self {
        Self {
            backup_enabled: false,
            backup_directory: DEFAULT_BACKUP_DIR.to_string(),
            overwrite_existing: true,
        }
    }
}

impl SetupPolicy {
    /// Resolve the policy from configuration, then apply command-line overrides
    pub fn resolve(resolver: &ConfigResolver, overrides: &SetupOverrides) -> Self {
        let defaults = Self::default();
        let configured = Self {
            backup_enabled: resolver.get_or("setup.backup_existing_config", defaults.backup_enabled),
            backup_directory: resolver.get_or("setup.backup_directory", defaults.backup_directory),
            overwrite_existing: resolver
                .get_or("setup.overwrite_existing_files", defaults.overwrite_existing),
        };
        overrides.apply(configured)
    }
}
