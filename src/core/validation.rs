//! Validation logic for module creation input
//!
//! Module paths and app names are checked when a creator is constructed,
//! before any filesystem or network activity takes place.

use anyhow::{anyhow, Result};

use crate::area::remove_end_slash;
use crate::constants::{
    fill, GIT_DIR_NAME, INVALID_SEGMENT_CHARS, MAX_SEGMENT_LENGTH, MSG_APP_NAME_INVALID,
    MSG_MODULE_PATH_ABSOLUTE, MSG_MODULE_PATH_EMPTY, MSG_MODULE_PATH_TRAVERSAL,
    MSG_SEGMENT_INVALID_CHAR, MSG_SEGMENT_RESERVED, MSG_SEGMENT_TOO_LONG,
};

/// Validates and normalises a relative module path
///
/// # Returns
///
/// * `Ok(String)` - The trimmed path without a trailing `/`
/// * `Err(anyhow::Error)` - If the path is invalid
///
/// # Validation Rules
///
/// 1. **Non-empty**: Path must not be empty or whitespace-only
/// 2. **Relative only**: Must not start with `/` or a drive letter
/// 3. **No traversal**: No `.`, `..` or empty segments
/// 4. **Git metadata**: No segment may be `.git`
/// 5. **Characters**: No filesystem-incompatible characters
///
/// # Examples
///
/// ```rust
/// use module_creator::core::validate_module_path;
///
/// assert_eq!(validate_module_path("motor/").unwrap(), "motor");
/// assert!(validate_module_path("BL99I/BL99I-VA-IOC-01").is_ok());
/// assert!(validate_module_path("../escape").is_err());
/// assert!(validate_module_path("/abs/path").is_err());
/// ```
pub fn validate_module_path(path: &str) -> Result<String> {
    let trimmed = remove_end_slash(path.trim());

    if trimmed.is_empty() {
        return Err(anyhow!(MSG_MODULE_PATH_EMPTY));
    }

    if trimmed.starts_with('/') || (trimmed.len() > 1 && trimmed.chars().nth(1) == Some(':')) {
        return Err(anyhow!(fill(MSG_MODULE_PATH_ABSOLUTE, &[trimmed])));
    }

    for segment in trimmed.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(anyhow!(fill(MSG_MODULE_PATH_TRAVERSAL, &[trimmed])));
        }
        validate_segment(segment)?;
    }

    Ok(trimmed.to_string())
}

/// Validates an app name; the app folder is created as a direct child of the module
pub fn validate_app_name(name: &str) -> Result<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() || trimmed.contains('/') || trimmed == "." || trimmed == ".." {
        return Err(anyhow!(fill(MSG_APP_NAME_INVALID, &[trimmed])));
    }
    validate_segment(trimmed)?;

    Ok(trimmed.to_string())
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment == GIT_DIR_NAME {
        return Err(anyhow!(fill(MSG_SEGMENT_RESERVED, &[segment])));
    }

    if let Some(ch) = segment.chars().find(|ch| INVALID_SEGMENT_CHARS.contains(ch)) {
        return Err(anyhow!(fill(
            MSG_SEGMENT_INVALID_CHAR,
            &[segment, &ch.to_string()]
        )));
    }

    if segment.len() > MAX_SEGMENT_LENGTH {
        return Err(anyhow!(fill(MSG_SEGMENT_TOO_LONG, &[segment])));
    }

    Ok(())
}
