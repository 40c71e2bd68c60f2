//! Templater settings builder
//!
//! Derives the managed settings from the vault configuration and merges
//! them into the plugin's existing `data.json`.

use crate::config::layout::{COMMAND_TEMPLATE_EXTENSION, PLUGIN_DATA_FILE};
use crate::config::{ConfigResolver, VaultLayout, VaultPaths};
use crate::error::{IoResultExt, Result, SetupError};
use crate::fs::{list_files_with_extension, write_atomic};
use crate::plugin::settings::{folder_templates, FolderTemplate, TemplaterSettings};
use crate::progress::ProgressReporter;
use crate::sync::BackupPolicy;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of writing the plugin settings
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct ApplyReport {
    /// Settings file written
    pub path: PathBuf,
    /// True if no settings file existed before
    pub created: bool,
    /// True if the previous settings file was backed up
    pub backed_up: bool,
    pub templates_folder: String,
    pub user_scripts_folder: String,
    pub folder_templates: usize,
    pub hotkeys: usize,
    pub startup_templates: usize,
    pub trigger_on_file_creation: bool,
    /// Unmanaged keys carried over from the previous file
    pub preserved_keys: usize,
}

impl ApplyReport {
    /// "created" or "updated"
    pub fn action(&self) -> &'static str {
        if self.created {
            "created"
        } else {
            "updated"
        }
    }

    /// Human-readable summary lines
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Templates folder: {}", self.templates_folder),
            format!("User scripts folder: {}", self.user_scripts_folder),
            format!("Folder templates: {} folders", self.folder_templates),
            format!("Enabled template hotkeys: {} templates", self.hotkeys),
            format!("Startup templates: {} template(s)", self.startup_templates),
            format!(
                "File creation trigger: {}",
                if self.trigger_on_file_creation {
                    "Enabled"
                } else {
                    "Disabled"
                }
            ),
        ]
    }
}

/// Builds and writes the Templater settings document
pub struct PluginSettingsBuilder<'a> {
    layout: &'a VaultLayout,
    resolver: &'a ConfigResolver,
    backup: BackupPolicy,
    reporter: Arc<ProgressReporter>,
}

impl<'a> PluginSettingsBuilder<'a> {
    /// Create a builder over a loaded vault configuration
    pub fn new(layout: &'a VaultLayout, resolver: &'a ConfigResolver, backup: BackupPolicy) -> Self {
        Self {
            layout,
            resolver,
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

    /// Markdown files directly inside the commands folder, vault-relative and sorted
    pub fn list_command_templates(&self) -> Result<Vec<String>> {
        let commands_folder = self.resolver.require_str("paths.commands_folder")?;
        let commands_dir = self.layout.vault_root.join(commands_folder);

        if !commands_dir.is_dir() {
            tracing::debug!("Commands folder not found: {:?}", commands_dir);
            self.reporter.warning(&format!(
                "Commands folder not found: {}",
                commands_dir.display()
            ));
            return Ok(Vec::new());
        }

        let mut templates: Vec<String> =
            list_files_with_extension(&commands_dir, COMMAND_TEMPLATE_EXTENSION)?
                .iter()
                .filter_map(|path| self.layout.vault_relative(path))
                .collect();
        templates.sort();

        tracing::debug!("Found {} command templates", templates.len());
        Ok(templates)
    }

    /// Folder template entries for every declared note directory
    pub fn build_folder_templates(&self) -> Result<Vec<FolderTemplate>> {
        let paths = VaultPaths::from_resolver(self.resolver)?;
        Ok(folder_templates(&paths))
    }

    /// Managed settings derived from configuration, without unmanaged keys
    pub fn build_settings(&self) -> Result<TemplaterSettings> {
        let paths = VaultPaths::from_resolver(self.resolver)?;
        let command_templates = self.list_command_templates()?;
        Ok(TemplaterSettings::from_paths(&paths, command_templates))
    }

    /// Merge the managed settings into the plugin's settings file
    pub fn apply(&self) -> Result<ApplyReport> {
        let path = self.layout.templater_settings_path();
        let plugin_dir = path
            .parent()
            .ok_or_else(|| SetupError::settings_write(&path, "settings path has no parent"))?;
        std::fs::create_dir_all(plugin_dir).with_path(plugin_dir)?;

        let created = !path.exists();
        let (existing, backed_up) = if created {
            self.reporter.info(&format!(
                "Templater configuration file not found. Creating new one: {}",
                path.display()
            ));
            (Map::new(), false)
        } else {
            self.reporter.info(&format!(
                "Found existing Templater configuration: {}",
                path.display()
            ));
            let existing = read_settings_object(&path)?;
            let backed_up = self
                .backup
                .backup(&path, Path::new(PLUGIN_DATA_FILE))
                .is_created();
            (existing, backed_up)
        };

        let preserved_before = existing.len();
        let settings = self.build_settings()?.merged_over(existing);
        tracing::debug!(
            "Merging settings: {} existing keys, {} unmanaged kept",
            preserved_before,
            settings.extra.len()
        );

        let text = settings
            .to_pretty_json()
            .map_err(|e| SetupError::settings_write(&path, e))?;
        write_atomic(&path, text.as_bytes())
            .map_err(|e| SetupError::settings_write(&path, e))?;

        let report = ApplyReport {
            path,
            created,
            backed_up,
            templates_folder: settings.templates_folder,
            user_scripts_folder: settings.user_scripts_folder,
            folder_templates: settings.folder_templates.len(),
            hotkeys: settings.enabled_templates_hotkeys.len(),
            startup_templates: settings.startup_templates.len(),
            trigger_on_file_creation: settings.trigger_on_file_creation,
            preserved_keys: settings.extra.len(),
        };

        tracing::info!("Templater configuration {}: {:?}", report.action(), report.path);
        self.reporter.success(&format!(
            "Templater configuration {} successfully:",
            report.action()
        ));
        for line in report.summary_lines() {
            self.reporter.line(&format!("   - {}", line));
        }

        Ok(report)
    }
}

/// Read an existing settings file, which must hold a JSON object
fn read_settings_object(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path).with_path(path)?;
    match serde_json::from_str(&content).map_err(|e| SetupError::config_parse(path, e))? {
        Value::Object(map) => Ok(map),
        _ => Err(SetupError::settings_write(
            path,
            "existing settings are not a JSON object",
        )),
    }
}
