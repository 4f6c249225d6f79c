//! Name cleaning and validation for projects and collections.
//!
//! Names are cleaned before they are stored: everything except ASCII
//! letters, digits, space, `-` and `_` is dropped and the rest lowercased.
//! "My Cool App!!" becomes "my cool app".

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Minimum length of a cleaned project or collection name.
pub const MIN_NAME_LEN: usize = 3;

/// Collection names that would collide with command words.
pub static RESERVED_NAMES: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["all", "list", "help"].into_iter().collect());

/// Strip every character that is not alphanumeric, space, `-` or `_`, then lowercase.
#[must_use]
pub fn clean_name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .to_lowercase()
}

/// Clean and validate a project name.
///
/// # Errors
///
/// Returns `Error::InvalidName` if fewer than three characters survive cleaning.
pub fn validate_project_name(value: &str) -> Result<String> {
    let cleaned = clean_name(value);
    if cleaned.len() < MIN_NAME_LEN {
        return Err(Error::InvalidName(
            "Project name must be at least 3 alphanumeric characters.".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Clean and validate a collection name.
///
/// # Errors
///
/// Returns `Error::ReservedName` for `all`, `list` or `help`, and
/// `Error::InvalidName` if fewer than three characters survive cleaning.
pub fn validate_collection_name(value: &str) -> Result<String> {
    let cleaned = clean_name(value);
    if RESERVED_NAMES.contains(cleaned.as_str()) {
        return Err(Error::ReservedName(cleaned));
    }
    if cleaned.len() < MIN_NAME_LEN {
        return Err(Error::InvalidName(
            "Collection name must be at least 3 alphanumeric characters.".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Reject blank spark content.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if the content is empty after trimming.
pub fn validate_content(value: &str) -> Result<&str> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument("spark content cannot be empty".to_string()));
    }
    Ok(value)
}
