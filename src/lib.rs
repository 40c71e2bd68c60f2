//! # vault-setup - Obsidian vault provisioning
//!
//! vault-setup copies a distribution bundle (a `config.json`, a `Templater`
//! folder and CSS snippets) into an Obsidian vault, then writes the
//! Templater plugin's `data.json` so its folders, folder templates, hotkeys
//! and startup template match the conventions declared in `config.json`.
//!
//! ## Features
//!
//! - **Overwrite-or-skip copies**: per file, with a configurable policy
//! - **Backups**: anything about to be overwritten is copied aside first
//! - **Environment templating**: `${VAR}` placeholders in `config.json`
//! - **Non-destructive merge**: unmanaged plugin settings survive
//! - **Plugin checks**: all missing required plugins reported at once
//!
//! ## Quick Start
//!
//! ```no_run
//! use vault_setup::config::{PhasePlan, SetupOptions, SetupOverrides};
//! use vault_setup::core::SetupOrchestrator;
//! use std::path::PathBuf;
//!
//! let options = SetupOptions {
//!     vault: PathBuf::from("/path/to/vault"),
//!     source: PathBuf::from("/path/to/bundle"),
//!     plan: PhasePlan::full(),
//!     overrides: SetupOverrides::default(),
//! };
//!
//! let report = SetupOrchestrator::new(options).run();
//! println!("success: {}", report.is_success());
//! ```
//!
//! ## Configure Only
//!
//! ```no_run
//! use vault_setup::config::{ConfigResolver, VaultLayout};
//! use vault_setup::plugin::PluginSettingsBuilder;
//! use vault_setup::sync::BackupPolicy;
//!
//! let layout = VaultLayout::new("/path/to/vault", "/path/to/bundle");
//! let primary = ConfigResolver::load(&layout.config_path()).unwrap();
//! let resolver = ConfigResolver::new(Some(primary), None);
//! let backup = BackupPolicy::new(true, layout.backup_root(".obsidian-setup-backup"));
//!
//! let report = PluginSettingsBuilder::new(&layout, &resolver, backup)
//!     .apply()
//!     .unwrap();
//! println!("Templater configuration {}", report.action());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod plugin;
pub mod progress;
pub mod sync;

// Re-export commonly used types
pub use config::{CliArgs, ConfigResolver, PhasePlan, SetupOptions, VaultLayout};
pub use core::{SetupOrchestrator, SetupReport};
pub use error::{Result, SetupError};
pub use progress::ProgressReporter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use vault_setup::prelude::*;
    //! ```

    pub use crate::config::{
        ConfigResolver, PhasePlan, SetupOptions, SetupOverrides, SetupPolicy, VaultLayout,
        VaultPaths,
    };
    pub use crate::core::{Phase, SetupOrchestrator, SetupReport, SetupState};
    pub use crate::error::{Result, SetupError};
    pub use crate::plugin::{PluginInventory, PluginSettingsBuilder, TemplaterSettings};
    pub use crate::progress::ProgressReporter;
    pub use crate::sync::{AssetSynchronizer, BackupPolicy, FileCopyOutcome};
}
