//! Asset synchronization into the vault
//!
//! Copies the configuration document, the template tree and stylesheet
//! snippets from the source bundle, honoring the overwrite policy and
//! backing up anything about to be replaced.

use crate::config::layout::{CONFIG_FILE_NAME, SNIPPETS_DIR, SNIPPET_PATTERN, TEMPLATE_ASSETS_DIR};
use crate::config::{SetupPolicy, VaultLayout};
use crate::error::{IoResultExt, Result, SetupError};
use crate::fs::{build_globset, ensure_parent, scan_files, substitute_env};
use crate::progress::ProgressReporter;
use crate::sync::BackupPolicy;
use globset::GlobSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of copying a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCopyOutcome {
    /// File written
    Copied {
        /// Bytes written
        bytes: u64,
        /// Whether the previous destination was backed up first
        backed_up: bool,
    },
    /// Destination exists and overwriting is disabled
    Skipped,
    /// Copy failed
    Failed(String),
}

impl FileCopyOutcome {
    /// Skipping counts as success
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Tally of a directory tree copy
#[derive(Debug, Clone, Default)]
pub struct TreeSyncSummary {
    /// Files visited
    pub total: usize,
    /// Files written
    pub copied: usize,
    /// Files left in place
    pub skipped: usize,
    /// Bytes written
    pub bytes_copied: u64,
    /// Failed files with reasons
    pub failures: Vec<(PathBuf, String)>,
}

impl TreeSyncSummary {
    /// Files that were copied or skipped
    pub fn succeeded(&self) -> usize {
        self.copied + self.skipped
    }

    /// Check if every file succeeded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, relative_path: &Path, outcome: FileCopyOutcome) {
        self.total += 1;
        match outcome {
            FileCopyOutcome::Copied { bytes, .. } => {
                self.copied += 1;
                self.bytes_copied += bytes;
            }
            FileCopyOutcome::Skipped => self.skipped += 1,
            FileCopyOutcome::Failed(reason) => {
                self.failures.push((relative_path.to_path_buf(), reason));
            }
        }
    }
}

/// Result of the copy phase
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Configuration document copy
    pub config: FileCopyOutcome,
    /// Template tree copy
    pub templates: TreeSyncSummary,
    /// Snippet copy, absent when the bundle has no snippets
    pub snippets: Option<TreeSyncSummary>,
}

impl SyncReport {
    /// Check if every copy succeeded
    pub fn is_success(&self) -> bool {
        self.config.is_success()
            && self.templates.is_success()
            && self.snippets.as_ref().map_or(true, TreeSyncSummary::is_success)
    }

    /// Total bytes written
    pub fn bytes_copied(&self) -> u64 {
        let config = match self.config {
            FileCopyOutcome::Copied { bytes, .. } => bytes,
            _ => 0,
        };
        config
            + self.templates.bytes_copied
            + self.snippets.as_ref().map_or(0, |s| s.bytes_copied)
    }
}

/// Copies bundle assets into the vault
pub struct AssetSynchronizer {
    layout: VaultLayout,
    policy: SetupPolicy,
    backup: BackupPolicy,
    reporter: Arc<ProgressReporter>,
}

impl AssetSynchronizer {
    /// Create a synchronizer for the given layout and resolved policy
    pub fn new(layout: VaultLayout, policy: SetupPolicy) -> Self {
        let backup = BackupPolicy::from_policy(&layout, &policy);
        Self {
            layout,
            policy,
            backup,
            reporter: Arc::new(ProgressReporter::disabled()),
        }
    }

    /// Set progress reporter
    pub fn with_reporter(mut self, reporter: Arc<ProgressReporter>) -> Self {
        self.backup = self.backup.with_reporter(Arc::clone(&reporter));
        self.reporter = reporter;
        self
    }

    /// Copy one file into the vault
    ///
    /// When `apply_templating` is set, `$VAR` / `${VAR}` placeholders are
    /// filled from the process environment. Failures are reported and
    /// returned, never raised.
    pub fn copy_file(
        &self,
        source: &Path,
        dest: &Path,
        backup_rel: Option<&Path>,
        apply_templating: bool,
    ) -> FileCopyOutcome {
        let label = self.label(dest);

        if !source.exists() {
            tracing::debug!("Source file not found: {:?}", source);
            self.reporter
                .failure(&format!("Source file not found: {}", source.display()));
            return FileCopyOutcome::Failed(format!("source not found: {}", source.display()));
        }

        let dest_exists = dest.exists();
        if dest_exists && !self.policy.overwrite_existing {
            tracing::debug!("Skipping existing {:?}", dest);
            self.reporter
                .skipped(&format!("Skipped {} (already exists)", label));
            return FileCopyOutcome::Skipped;
        }

        let backed_up = match (dest_exists, backup_rel) {
            (true, Some(rel)) => self.backup.backup(dest, rel).is_created(),
            _ => false,
        };

        match write_copy(source, dest, apply_templating) {
            Ok(bytes) => {
                tracing::debug!("Copied {:?} to {:?} ({} bytes)", source, dest, bytes);
                self.reporter.success(&format!("Copied {}", label));
                FileCopyOutcome::Copied { bytes, backed_up }
            }
            Err(e) => {
                let err = SetupError::file_copy(source, dest, e.to_string());
                tracing::debug!("{}", err);
                self.reporter.failure(&err.to_string());
                FileCopyOutcome::Failed(e.to_string())
            }
        }
    }

    /// Copy every file under `source_dir` into `dest_dir`
    ///
    /// Each file is backed up under `backup_prefix/<relative path>`.
    /// Processing continues past failures.
    pub fn copy_directory_tree(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        backup_prefix: &Path,
    ) -> Result<TreeSyncSummary> {
        self.copy_directory_tree_matching(source_dir, dest_dir, backup_prefix, None)
    }

    /// Copy the files under `source_dir` whose relative path matches `filter`
    pub fn copy_directory_tree_matching(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        backup_prefix: &Path,
        filter: Option<&GlobSet>,
    ) -> Result<TreeSyncSummary> {
        let scan = scan_files(source_dir, filter)?;
        let mut summary = TreeSyncSummary::default();

        for error in scan.errors {
            tracing::debug!("Unreadable entry under {:?}: {}", source_dir, error);
            self.reporter.failure(&error);
            summary.record(source_dir, FileCopyOutcome::Failed(error));
        }

        for entry in &scan.files {
            let dest = dest_dir.join(&entry.relative_path);
            let backup_rel = backup_prefix.join(&entry.relative_path);
            let outcome = self.copy_file(&entry.path, &dest, Some(&backup_rel), false);
            summary.record(&entry.relative_path, outcome);
        }

        if summary.is_success() {
            tracing::info!(
                "Copied tree {:?} -> {:?}: {} copied, {} skipped",
                source_dir,
                dest_dir,
                summary.copied,
                summary.skipped
            );
        } else {
            tracing::debug!(
                "Tree {:?} -> {:?}: {}/{} files succeeded",
                source_dir,
                dest_dir,
                summary.succeeded(),
                summary.total
            );
        }

        Ok(summary)
    }

    /// Copy the configuration document, template tree and snippets into the vault
    pub fn sync_all(&self) -> Result<SyncReport> {
        let source_config = self.layout.source_config_path();
        if !source_config.is_file() {
            self.reporter.failure(&format!(
                "Source config.json not found: {}",
                source_config.display()
            ));
            return Err(SetupError::SourceAssetMissing(source_config));
        }

        let source_templates = self.layout.source_templates_dir();
        if !source_templates.is_dir() {
            self.reporter.failure(&format!(
                "Source Templater folder not found: {}",
                source_templates.display()
            ));
            return Err(SetupError::SourceAssetMissing(source_templates));
        }

        tracing::info!(
            "Syncing assets from {:?} into {:?}",
            self.layout.source_root,
            self.layout.vault_root
        );

        let config_dest = self.layout.config_path();
        let config = self.copy_file(
            &source_config,
            &config_dest,
            Some(Path::new(CONFIG_FILE_NAME)),
            true,
        );
        if let FileCopyOutcome::Failed(reason) = &config {
            return Err(SetupError::file_copy(source_config, config_dest, reason.clone()));
        }

        let templates = self.copy_directory_tree(
            &source_templates,
            &self.layout.templates_dir(),
            Path::new(TEMPLATE_ASSETS_DIR),
        )?;
        self.report_tree("Templater folder", &templates);

        let source_snippets = self.layout.source_snippets_dir();
        let snippets = if source_snippets.is_dir() {
            let filter = build_globset(&[SNIPPET_PATTERN])?;
            let snippets_dir = self.layout.snippets_dir();
            std::fs::create_dir_all(&snippets_dir).with_path(&snippets_dir)?;
            let summary = self.copy_directory_tree_matching(
                &source_snippets,
                &snippets_dir,
                Path::new(SNIPPETS_DIR),
                Some(&filter),
            )?;
            self.report_tree("CSS snippets", &summary);
            Some(summary)
        } else {
            tracing::debug!("Source CssSnippets folder not found: {:?}", source_snippets);
            self.reporter.warning(&format!(
                "Source CssSnippets folder not found: {}",
                source_snippets.display()
            ));
            None
        };

        Ok(SyncReport {
            config,
            templates,
            snippets,
        })
    }

    fn report_tree(&self, name: &str, summary: &TreeSyncSummary) {
        if summary.is_success() {
            self.reporter.info(&format!(
                "{}: {} copied, {} skipped ({})",
                name,
                summary.copied,
                summary.skipped,
                humansize::format_size(summary.bytes_copied, humansize::BINARY)
            ));
        } else {
            self.reporter.failure(&format!(
                "{}: {}/{} files succeeded",
                name,
                summary.succeeded(),
                summary.total
            ));
        }
    }

    fn label(&self, path: &Path) -> String {
        self.layout
            .vault_relative(path)
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// Write `source` to `dest`, optionally substituting environment placeholders
fn write_copy(source: &Path, dest: &Path, apply_templating: bool) -> Result<u64> {
    let contents = if apply_templating {
        let text = std::fs::read_to_string(source).with_path(source)?;
        substitute_env(&text)
            .map_err(|e| SetupError::Template {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?
            .into_bytes()
    } else {
        std::fs::read(source).with_path(source)?
    };

    ensure_parent(dest)?;
    std::fs::write(dest, &contents).with_path(dest)?;
    Ok(contents.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        layout: VaultLayout,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("vault");
        let bundle = dir.path().join("bundle");
        std::fs::create_dir_all(&vault).unwrap();
        std::fs::create_dir_all(bundle.join("Templater/Templates")).unwrap();
        std::fs::create_dir_all(bundle.join("Templater/Scripts")).unwrap();
        std::fs::create_dir_all(bundle.join("CssSnippets")).unwrap();
        std::fs::write(
            bundle.join("config.json"),
            r#"{"paths": {"templates_folder": "Templater/Templates"}}"#,
        )
        .unwrap();
        std::fs::write(bundle.join("Templater/Templates/new.md"), "# New").unwrap();
        std::fs::write(bundle.join("Templater/Scripts/path.js"), "module.exports = {}").unwrap();
        std::fs::write(bundle.join("CssSnippets/wide.css"), ".page { width: 100% }").unwrap();
        std::fs::write(bundle.join("CssSnippets/README.md"), "snippets").unwrap();
        Fixture {
            layout: VaultLayout::new(vault, bundle),
            _dir: dir,
        }
    }

    fn policy(backup: bool, overwrite: bool) -> SetupPolicy {
        SetupPolicy {
            backup_enabled: backup,
            overwrite_existing: overwrite,
            ..Default::default()
        }
    }

    #[test]
    fn test_copy_file_missing_source() {
        let fx = fixture();
        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true));
        let outcome = sync.copy_file(
            &fx.layout.source_root.join("nope.md"),
            &fx.layout.vault_root.join("nope.md"),
            None,
            false,
        );
        assert!(matches!(outcome, FileCopyOutcome::Failed(_)));
        assert!(!fx.layout.vault_root.join("nope.md").exists());
    }

    #[test]
    fn test_copy_file_skip_policy_leaves_dest() {
        let fx = fixture();
        let dest = fx.layout.config_path();
        std::fs::write(&dest, "existing").unwrap();

        let reporter = Arc::new(ProgressReporter::disabled());
        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(true, false))
            .with_reporter(Arc::clone(&reporter));
        let outcome = sync.copy_file(
            &fx.layout.source_config_path(),
            &dest,
            Some(Path::new("config.json")),
            true,
        );

        assert_eq!(outcome, FileCopyOutcome::Skipped);
        assert!(outcome.is_success());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "existing");
        assert_eq!(reporter.summary().skips, 1);
        assert_eq!(reporter.summary().failures, 0);
        assert!(!fx.layout.backup_root(".obsidian-setup-backup").exists());
    }

    #[test]
    fn test_copy_file_backs_up_existing_dest() {
        let fx = fixture();
        let dest = fx.layout.config_path();
        std::fs::write(&dest, "previous").unwrap();

        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(true, true));
        let outcome = sync.copy_file(
            &fx.layout.source_config_path(),
            &dest,
            Some(Path::new("config.json")),
            true,
        );

        assert!(matches!(outcome, FileCopyOutcome::Copied { backed_up: true, .. }));
        let backup = fx
            .layout
            .backup_root(".obsidian-setup-backup")
            .join("config.json");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "previous");
    }

    #[test]
    fn test_copy_file_overwrites_when_backup_fails() {
        let fx = fixture();
        let dest = fx.layout.config_path();
        std::fs::write(&dest, "previous").unwrap();

        // A regular file where the backup root should be
        let blocked = fx.layout.backup_root(".obsidian-setup-backup");
        std::fs::write(&blocked, "not a directory").unwrap();

        let reporter = Arc::new(ProgressReporter::disabled());
        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(true, true))
            .with_reporter(Arc::clone(&reporter));
        let outcome = sync.copy_file(
            &fx.layout.source_config_path(),
            &dest,
            Some(Path::new("config.json")),
            false,
        );

        assert!(matches!(outcome, FileCopyOutcome::Copied { backed_up: false, .. }));
        assert!(std::fs::read_to_string(&dest).unwrap().contains("templates_folder"));
        assert_eq!(reporter.summary().warnings, 1);
        assert_eq!(reporter.summary().successes, 1);
    }

    #[test]
    fn test_copy_file_no_backup_without_existing_dest() {
        let fx = fixture();
        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(true, true));
        let outcome = sync.copy_file(
            &fx.layout.source_config_path(),
            &fx.layout.config_path(),
            Some(Path::new("config.json")),
            false,
        );
        assert!(matches!(outcome, FileCopyOutcome::Copied { backed_up: false, .. }));
        assert!(!fx.layout.backup_root(".obsidian-setup-backup").exists());
    }

    #[test]
    fn test_copy_file_templating() {
        let fx = fixture();
        std::env::set_var("VAULT_SETUP_ASSET_TEST", "Inbox");
        let source = fx.layout.source_root.join("templated.json");
        std::fs::write(&source, r#"{"inbox": "${VAULT_SETUP_ASSET_TEST}", "price": "$$5"}"#).unwrap();
        let dest = fx.layout.vault_root.join("templated.json");

        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true));
        assert!(sync.copy_file(&source, &dest, None, true).is_success());
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            r#"{"inbox": "Inbox", "price": "$5"}"#
        );

        // Without templating the text is copied verbatim
        let verbatim = fx.layout.vault_root.join("verbatim.json");
        assert!(sync.copy_file(&source, &verbatim, None, false).is_success());
        assert!(std::fs::read_to_string(&verbatim).unwrap().contains("${VAULT_SETUP_ASSET_TEST}"));
    }

    #[test]
    fn test_copy_file_undefined_variable_fails() {
        let fx = fixture();
        let source = fx.layout.source_root.join("bad.json");
        std::fs::write(&source, r#"{"key": "${VAULT_SETUP_SURELY_UNDEFINED_VAR}"}"#).unwrap();
        let dest = fx.layout.vault_root.join("bad.json");

        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true));
        let outcome = sync.copy_file(&source, &dest, None, true);
        assert!(matches!(outcome, FileCopyOutcome::Failed(ref r) if r.contains("VAULT_SETUP_SURELY_UNDEFINED_VAR")));
        assert!(!dest.exists());
    }

    #[test]
    fn test_copy_directory_tree_missing_source() {
        let fx = fixture();
        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true));
        let err = sync
            .copy_directory_tree(
                &fx.layout.source_root.join("Missing"),
                &fx.layout.vault_root.join("Missing"),
                Path::new("Missing"),
            )
            .unwrap_err();
        assert!(matches!(err, SetupError::SourceAssetMissing(_)));
    }

    #[test]
    fn test_copy_directory_tree_backs_up_per_file() {
        let fx = fixture();
        let existing = fx.layout.templates_dir().join("Templates/new.md");
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, "# Old").unwrap();

        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(true, true));
        let summary = sync
            .copy_directory_tree(
                &fx.layout.source_templates_dir(),
                &fx.layout.templates_dir(),
                Path::new("Templater"),
            )
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.copied, 2);
        assert!(summary.is_success());
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "# New");

        let backup_root = fx.layout.backup_root(".obsidian-setup-backup");
        assert_eq!(
            std::fs::read_to_string(backup_root.join("Templater/Templates/new.md")).unwrap(),
            "# Old"
        );
        // Only overwritten files are backed up
        assert!(!backup_root.join("Templater/Scripts/path.js").exists());
    }

    #[test]
    fn test_copy_directory_tree_continues_after_failure() {
        let fx = fixture();
        // A directory where a file should go makes that single copy fail
        let blocked = fx.layout.templates_dir().join("Scripts/path.js");
        std::fs::create_dir_all(&blocked).unwrap();

        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true));
        let summary = sync
            .copy_directory_tree(
                &fx.layout.source_templates_dir(),
                &fx.layout.templates_dir(),
                Path::new("Templater"),
            )
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failures.len(), 1);
        assert!(!summary.is_success());
        assert!(fx.layout.templates_dir().join("Templates/new.md").exists());
    }

    #[test]
    fn test_sync_all_copies_everything() {
        let fx = fixture();
        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true));
        let report = sync.sync_all().unwrap();

        assert!(report.is_success());
        assert!(fx.layout.config_path().exists());
        assert!(fx.layout.templates_dir().join("Scripts/path.js").exists());
        assert!(fx.layout.snippets_dir().join("wide.css").exists());
        assert!(!fx.layout.snippets_dir().join("README.md").exists());
        assert_eq!(report.snippets.as_ref().unwrap().total, 1);
        assert!(report.bytes_copied() > 0);
    }

    #[test]
    fn test_sync_all_copies_only_top_level_snippets() {
        let fx = fixture();
        let nested = fx.layout.source_snippets_dir().join("old");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("archived.css"), ".old {}").unwrap();

        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true));
        let report = sync.sync_all().unwrap();

        assert_eq!(report.snippets.as_ref().unwrap().total, 1);
        assert!(fx.layout.snippets_dir().join("wide.css").exists());
        assert!(!fx.layout.snippets_dir().join("old").exists());
    }

    #[test]
    fn test_sync_all_without_snippets_warns() {
        let fx = fixture();
        std::fs::remove_dir_all(fx.layout.source_snippets_dir()).unwrap();

        let reporter = Arc::new(ProgressReporter::disabled());
        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true))
            .with_reporter(Arc::clone(&reporter));
        let report = sync.sync_all().unwrap();

        assert!(report.is_success());
        assert!(report.snippets.is_none());
        assert_eq!(reporter.summary().warnings, 1);
    }

    #[test]
    fn test_sync_all_requires_source_assets() {
        let fx = fixture();
        std::fs::remove_dir_all(fx.layout.source_templates_dir()).unwrap();
        let sync = AssetSynchronizer::new(fx.layout.clone(), policy(false, true));
        assert!(matches!(
            sync.sync_all(),
            Err(SetupError::SourceAssetMissing(ref p)) if p.ends_with("Templater")
        ));

        std::fs::remove_file(fx.layout.source_config_path()).unwrap();
        assert!(matches!(
            sync.sync_all(),
            Err(SetupError::SourceAssetMissing(ref p)) if p.ends_with("config.json")
        ));
    }
}
