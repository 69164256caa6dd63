//! Filename generation and manipulation.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// Sortable, fixed-width timestamp format used as the filename prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Format a post's creation time as a filename prefix (UTC).
pub fn timestamp_prefix(created_at: &DateTime<Utc>) -> String {
    created_at.format(TIMESTAMP_FORMAT).to_string()
}

/// `<prefix>_<index>`, the filename without extension.
pub fn media_stem(prefix: &str, index: usize) -> String {
    format!("{}_{}", prefix, index)
}

/// Build the filename for the `index`-th media item of a post.
///
/// Given prefix "2023-06-01_10-15-30", index 0 and extension "jpg", produces
/// "2023-06-01_10-15-30_0.jpg".
pub fn media_filename(prefix: &str, index: usize, extension: &str) -> Result<String> {
    sanitize_filename(&format!("{}.{}", media_stem(prefix, index), extension))
}

/// Insert the post id before the extension to break a name collision.
///
/// Given "2023-06-01_10-15-30_0.jpg" and post id "42", produces
/// "2023-06-01_10-15-30_0_42.jpg".
pub fn disambiguate_filename(filename: &str, post_id: &str) -> String {
    if let Some(dot_pos) = filename.rfind('.') {
        let name = &filename[..dot_pos];
        let ext = &filename[dot_pos..];
        format!("{}_{}{}", name, post_id, ext)
    } else {
        format!("{}_{}", filename, post_id)
    }
}

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    // Reject path separators
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    // Reject null bytes
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    // Sanitize remaining problematic characters
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Reject empty or whitespace-only names
    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Sanitize a path component (directory name) with less strict validation.
///
/// Separators and reserved characters are replaced rather than rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    // Reject null bytes
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    // Sanitize problematic characters (replace with underscore)
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Reject empty or whitespace-only names
    if sanitized.is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}
