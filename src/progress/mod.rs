//! Progress reporting module
//!
//! Provides phase progress and outcome reporting for setup runs
//! with distinct markers per outcome and a final summary.

mod reporter;

pub use reporter::*;
