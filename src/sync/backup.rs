//! Backups of vault content before it is overwritten
//!
//! Backups live under a timestamp-free root inside the vault and mirror
//! the relative path they were given. A later backup of the same path
//! replaces the earlier one.

use crate::config::{SetupPolicy, VaultLayout};
use crate::error::{IoResultExt, Result, SetupError};
use crate::fs::{copy_dir_recursive, copy_file_preserving, remove_path};
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of a backup attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Backups are turned off
    Disabled,
    /// Nothing to back up
    SourceMissing,
    /// Backup written to the given path
    Created(PathBuf),
    /// Backup could not be written
    Failed(String),
}

impl BackupOutcome {
    /// Check whether a backup was written
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Conditional, best-effort backup of files and directories
pub struct BackupPolicy {
    enabled: bool,
    root: PathBuf,
    reporter: Arc<ProgressReporter>,
}

impl BackupPolicy {
    /// Create a backup policy writing under `root`
    pub fn new(enabled: bool, root: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            root: root.into(),
            reporter: Arc::new(ProgressReporter::disabled()),
        }
    }

    /// Create the policy declared by the resolved setup configuration
    pub fn from_policy(layout: &VaultLayout, policy: &SetupPolicy) -> Self {
        Self::new(
            policy.backup_enabled,
            layout.backup_root(&policy.backup_directory),
        )
    }

    /// Set progress reporter
    pub fn with_reporter(mut self, reporter: Arc<ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Whether backups are enabled
    pub fn should_backup(&self) -> bool {
        self.enabled
    }

    /// Back up `source` to `<root>/<relative_dest>`
    ///
    /// Failures are reported as warnings and never propagate.
    pub fn backup(&self, source: &Path, relative_dest: &Path) -> BackupOutcome {
        if !self.should_backup() {
            return BackupOutcome::Disabled;
        }
        if !source.exists() {
            return BackupOutcome::SourceMissing;
        }

        let backup_path = self.root.join(relative_dest);

        match self.write_backup(source, &backup_path) {
            Ok(()) => {
                tracing::debug!("Backed up {:?} to {:?}", source, backup_path);
                self.reporter
                    .backup(&format!("Backed up to: {}", backup_path.display()));
                BackupOutcome::Created(backup_path)
            }
            Err(e) => {
                let err = SetupError::Backup {
                    path: source.to_path_buf(),
                    message: e.to_string(),
                };
                tracing::debug!("{}", err);
                self.reporter.warning(&err.to_string());
                BackupOutcome::Failed(e.to_string())
            }
        }
    }

    fn write_backup(&self, source: &Path, backup_path: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.root).with_path(&self.root)?;

        if source.is_dir() {
            if backup_path.exists() {
                remove_path(backup_path)?;
            }
            copy_dir_recursive(source, backup_path)?;
        } else {
            copy_file_preserving(source, backup_path)?;
        }

        Ok(())
    }
}
