//! Configuration module for vault-setup
//!
//! Provides configuration management including CLI arguments,
//! the two-document configuration resolver, and the vault layout.

pub mod layout;
mod resolver;
mod settings;

pub use layout::VaultLayout;
pub use resolver::*;
pub use settings::*;
