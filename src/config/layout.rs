//! Vault and source bundle layout
//!
//! Fixed names of the files and directories the setup reads and writes.

use std::path::{Path, PathBuf};

/// Configuration document name, in both the vault and the bundle
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Template asset directory, in both the vault and the bundle
pub const TEMPLATE_ASSETS_DIR: &str = "Templater";
/// Stylesheet snippet directory in the bundle
pub const SNIPPETS_SOURCE_DIR: &str = "CssSnippets";
/// Obsidian's per-vault settings directory
pub const OBSIDIAN_DIR: &str = ".obsidian";
/// Plugin directory under `.obsidian`
pub const PLUGINS_DIR: &str = "plugins";
/// Snippet directory under `.obsidian`
pub const SNIPPETS_DIR: &str = "snippets";
/// Plugin whose settings are derived from the configuration
pub const TEMPLATER_PLUGIN_ID: &str = "templater-obsidian";
/// Plugin settings file name
pub const PLUGIN_DATA_FILE: &str = "data.json";
/// File whose presence marks a plugin as installed
pub const PLUGIN_MANIFEST_FILE: &str = "manifest.json";
/// Backup directory used when the configuration names none
pub const DEFAULT_BACKUP_DIR: &str = ".obsidian-setup-backup";
/// Extension of command templates bound to hotkeys
pub const COMMAND_TEMPLATE_EXTENSION: &str = "md";
/// Files copied from the snippet directory
pub const SNIPPET_PATTERN: &str = "*.css";

/// Resolved locations for one setup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    /// Vault root receiving assets and settings
    pub vault_root: PathBuf,
    /// Distribution bundle root providing assets
    pub source_root: PathBuf,
}

impl VaultLayout {
    /// Create a layout from a vault root and a source bundle root
    pub fn new(vault_root: impl Into<PathBuf>, source_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            source_root: source_root.into(),
        }
    }

    /// `<vault>/config.json`
    pub fn config_path(&self) -> PathBuf {
        self.vault_root.join(CONFIG_FILE_NAME)
    }

    /// `<source>/config.json`
    pub fn source_config_path(&self) -> PathBuf {
        self.source_root.join(CONFIG_FILE_NAME)
    }

    /// `<source>/Templater`
    pub fn source_templates_dir(&self) -> PathBuf {
        self.source_root.join(TEMPLATE_ASSETS_DIR)
    }

    /// `<vault>/Templater`
    pub fn templates_dir(&self) -> PathBuf {
        self.vault_root.join(TEMPLATE_ASSETS_DIR)
    }

    /// `<source>/CssSnippets`
    pub fn source_snippets_dir(&self) -> PathBuf {
        self.source_root.join(SNIPPETS_SOURCE_DIR)
    }

    /// `<vault>/.obsidian`
    pub fn obsidian_dir(&self) -> PathBuf {
        self.vault_root.join(OBSIDIAN_DIR)
    }

    /// `<vault>/.obsidian/snippets`
    pub fn snippets_dir(&self) -> PathBuf {
        self.obsidian_dir().join(SNIPPETS_DIR)
    }

    /// `<vault>/.obsidian/plugins`
    pub fn plugins_dir(&self) -> PathBuf {
        self.obsidian_dir().join(PLUGINS_DIR)
    }

    /// `<vault>/.obsidian/plugins/templater-obsidian/data.json`
    pub fn templater_settings_path(&self) -> PathBuf {
        self.plugins_dir()
            .join(TEMPLATER_PLUGIN_ID)
            .join(PLUGIN_DATA_FILE)
    }

    /// Backup root for the given directory name
    pub fn backup_root(&self, backup_directory: &str) -> PathBuf {
        self.vault_root.join(backup_directory)
    }

    /// Vault-relative path as a `/`-separated string
    pub fn vault_relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.vault_root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}
