//! Utility functions for input handling.
//!
//! URL lists are plain newline-separated text: every line is trimmed and
//! blank lines are skipped. There is no comment syntax.

use crate::error::ExtractorError;
use crate::Result;
use std::fs;
use std::path::Path;

/// Validate a target domain supplied by the user.
///
/// Surrounding whitespace is ignored; an empty domain or one with inner
/// whitespace is rejected.
///
/// # Returns
///
/// The trimmed domain.
pub fn validate_domain(domain: &str) -> Result<String> {
    let domain = domain.trim();

    if domain.is_empty() {
        return Err(ExtractorError::invalid_domain(
            domain,
            "Domain cannot be empty",
        ));
    }

    if domain.chars().any(char::is_whitespace) {
        return Err(ExtractorError::invalid_domain(
            domain,
            "Domain cannot contain whitespace",
        ));
    }

    Ok(domain.to_string())
}

/// Split newline-separated text into URLs.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a URL list from a file.
///
/// An existing file with no URLs is not an error; it yields an empty list.
///
/// # Errors
///
/// Returns `ExtractorError::FileError` if the file cannot be read.
pub fn read_url_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        ExtractorError::file_error(
            path.to_string_lossy(),
            format!("Failed to read URL file: {}", e),
        )
    })?;

    Ok(parse_url_list(&content))
}
