//! Templater plugin settings document
//!
//! The settings file is owned by the plugin. Only the fields modelled here
//! are managed; everything else is carried through untouched in `extra`.

use crate::config::VaultPaths;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys written by the setup, in output order
pub const MANAGED_KEYS: [&str; 9] = [
    "templates_folder",
    "trigger_on_file_creation",
    "user_scripts_folder",
    "enable_folder_templates",
    "folder_templates",
    "enable_file_templates",
    "file_templates",
    "enabled_templates_hotkeys",
    "startup_templates",
];

/// Template applied to notes created inside a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTemplate {
    /// Vault-relative folder
    pub folder: String,
    /// Vault-relative template file
    pub template: String,
}

/// Template applied to notes whose path matches a regex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTemplate {
    /// Pattern matched against the note path
    pub regex: String,
    /// Template file, empty for none
    pub template: String,
}

impl FileTemplate {
    /// Placeholder entry kept while file templates are disabled
    pub fn catch_all() -> Self {
        Self {
            regex: ".*".to_string(),
            template: String::new(),
        }
    }
}

/// Managed Templater settings plus the unmanaged remainder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TemplaterSettings {
    pub templates_folder: String,
    pub trigger_on_file_creation: bool,
    pub user_scripts_folder: String,
    pub enable_folder_templates: bool,
    pub folder_templates: Vec<FolderTemplate>,
    pub enable_file_templates: bool,
    pub file_templates: Vec<FileTemplate>,
    pub enabled_templates_hotkeys: Vec<String>,
    pub startup_templates: Vec<String>,
    /// Keys the setup does not manage
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplaterSettings {
    /// Settings derived from the vault's directory conventions
    pub fn from_paths(paths: &VaultPaths, command_templates: Vec<String>) -> Self {
        Self {
            templates_folder: paths.templates_folder.clone(),
            trigger_on_file_creation: true,
            user_scripts_folder: paths.user_scripts_folder.clone(),
            enable_folder_templates: true,
            folder_templates: folder_templates(paths),
            enable_file_templates: false,
            file_templates: vec![FileTemplate::catch_all()],
            enabled_templates_hotkeys: command_templates,
            startup_templates: vec![paths.startup_template.clone()],
            extra: Map::new(),
        }
    }

    /// Carry over every unmanaged key of an existing settings object
    ///
    /// Managed keys from `existing` are dropped so the derived values win.
    pub fn merged_over(mut self, existing: Map<String, Value>) -> Self {
        self.extra = existing
            .into_iter()
            .filter(|(key, _)| !MANAGED_KEYS.contains(&key.as_str()))
            .collect();
        self
    }

    /// Render as 2-space indented JSON
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// One entry per note directory, in order; daily directories get the daily template
pub fn folder_templates(paths: &VaultPaths) -> Vec<FolderTemplate> {
    paths
        .note_directories
        .iter()
        .map(|folder| {
            let template = if paths.daily_note_directories.contains(folder) {
                &paths.daily_note_template
            } else {
                &paths.new_note_template
            };
            FolderTemplate {
                folder: folder.clone(),
                template: template.clone(),
            }
        })
        .collect()
}
