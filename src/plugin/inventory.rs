//! Installed plugin lookup

use crate::config::layout::PLUGIN_MANIFEST_FILE;
use crate::config::VaultLayout;
use std::path::PathBuf;

/// Answers whether a plugin is installed
pub trait PluginInventory {
    /// Check whether the plugin with this identifier is installed
    fn is_installed(&self, plugin_id: &str) -> bool;
}

/// Plugins installed under `<vault>/.obsidian/plugins`
///
/// A plugin counts as installed when its directory holds a `manifest.json`.
#[derive(Debug, Clone)]
pub struct VaultPluginInventory {
    plugins_root: PathBuf,
}

impl VaultPluginInventory {
    /// Inventory over an explicit plugins directory
    pub fn new(plugins_root: impl Into<PathBuf>) -> Self {
        Self {
            plugins_root: plugins_root.into(),
        }
    }

    /// Inventory over the vault's `.obsidian/plugins`
    pub fn for_layout(layout: &VaultLayout) -> Self {
        Self::new(layout.plugins_dir())
    }
}

impl PluginInventory for VaultPluginInventory {
    fn is_installed(&self, plugin_id: &str) -> bool {
        let plugin_dir = self.plugins_root.join(plugin_id);
        plugin_dir.is_dir() && plugin_dir.join(PLUGIN_MANIFEST_FILE).is_file()
    }
}

/// Required plugins that are not installed, in declaration order
pub fn missing_plugins(inventory: &dyn PluginInventory, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|id| !inventory.is_installed(id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install(root: &std::path::Path, id: &str, with_manifest: bool) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        if with_manifest {
            std::fs::write(dir.join("manifest.json"), r#"{"id": "x"}"#).unwrap();
        }
    }

    #[test]
    fn test_missing_plugins_scenario() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "templater-obsidian", true);

        let inventory = VaultPluginInventory::new(dir.path());
        let required = vec![
            "templater-obsidian".to_string(),
            "metadata-extractor".to_string(),
        ];
        assert_eq!(
            missing_plugins(&inventory, &required),
            vec!["metadata-extractor".to_string()]
        );
    }

    #[test]
    fn test_directory_without_manifest_is_not_installed() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "dataview", false);
        let inventory = VaultPluginInventory::new(dir.path());
        assert!(!inventory.is_installed("dataview"));
    }

    #[test]
    fn test_missing_plugins_root() {
        let dir = TempDir::new().unwrap();
        let inventory = VaultPluginInventory::new(dir.path().join("plugins"));
        let required = vec!["a".to_string(), "b".to_string()];
        assert_eq!(missing_plugins(&inventory, &required), required);
        assert!(missing_plugins(&inventory, &[]).is_empty());
    }
}
