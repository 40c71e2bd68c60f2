//! File system operations module
//!
//! Provides directory scanning, metadata-preserving copies,
//! atomic writes and placeholder substitution.

mod operations;
mod scanner;
pub mod template;

pub use operations::*;
pub use scanner::*;
pub use template::{substitute, substitute_env, PlaceholderError};
