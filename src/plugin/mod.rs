//! Obsidian plugin handling
//!
//! Installed-plugin checks and the Templater settings document.

mod builder;
mod inventory;
pub mod settings;

pub use builder::{ApplyReport, PluginSettingsBuilder};
pub use inventory::{missing_plugins, PluginInventory, VaultPluginInventory};
pub use settings::{FileTemplate, FolderTemplate, TemplaterSettings};
