//! Setup orchestration module
//!
//! Sequences the copy, plugin verification and configure phases
//! and collects their outcomes.

mod orchestrator;

pub use orchestrator::*;
