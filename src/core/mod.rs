//! Core business logic module
//!
//! This module contains input validation shared by the orchestrator and the
//! CLI, independent of git and filesystem concerns.

pub mod validation;

// Re-export commonly used items
pub use validation::{validate_app_name, validate_module_path};
