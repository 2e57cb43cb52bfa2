//! Utility functions for terminal output formatting
//!
//! This module provides consistent, colored output functions for displaying
//! success, warning, and error messages in the terminal.

use colored::*;
use dialoguer::theme::ColorfulTheme;

/// Displays a success message with a green checkmark
///
/// # Example
///
/// ```no_run
/// use module_creator::utils::print_success;
///
/// print_success("Module created");
/// ```
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Displays an error message with a red X mark
///
/// A multi-line message, such as an aggregated verification failure, is
/// printed with every line after the first indented under the mark.
pub fn print_error(message: &str) {
    let mut lines = message.lines();
    println!("{} {}", "✗".red(), lines.next().unwrap_or_default());
    for line in lines {
        println!("  {line}");
    }
}

/// Returns a consistent theme for all dialoguer prompts
pub fn get_theme() -> ColorfulTheme {
    ColorfulTheme::default()
}
