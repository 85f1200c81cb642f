//! Input sanitization and shape checks shared by the API and the client.

use crate::error::{AppError, Result};

/// Hard cap on stored post length, in characters.
pub const MAX_CONTENT_CHARS: usize = 500;

/// Length of an actor proof or action fingerprint (hex SHA-256).
pub const FINGERPRINT_LEN: usize = 64;

/// Escapes `<` and `>`, trims whitespace and truncates to
/// [`MAX_CONTENT_CHARS`] characters of escaped output.
///
/// An entity is either kept whole or dropped, never cut in half.
/// Returns a validation error when nothing is left.
pub fn sanitize_content(raw: &str) -> Result<String> {
    let mut sanitized = String::with_capacity(raw.len().min(MAX_CONTENT_CHARS * 4));
    let mut len = 0;
    for c in raw.trim().chars() {
        let entity = match c {
            '<' => Some("&lt;"),
            '>' => Some("&gt;"),
            _ => None,
        };
        let width = entity.map_or(1, str::len);
        if len + width > MAX_CONTENT_CHARS {
            break;
        }
        match entity {
            Some(entity) => sanitized.push_str(entity),
            None => sanitized.push(c),
        }
        len += width;
    }
    let sanitized = sanitized.trim_end().to_string();

    if sanitized.is_empty() {
        return Err(AppError::ValidationError("content is required".into()));
    }
    Ok(sanitized)
}

/// True for exactly 64 hex characters.
pub fn is_valid_fingerprint(candidate: &str) -> bool {
    candidate.len() == FINGERPRINT_LEN && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Checks a fingerprint or actor proof, naming the field in the error.
pub fn require_fingerprint(candidate: Option<&str>, field: &str) -> Result<String> {
    match candidate {
        Some(value) if is_valid_fingerprint(value) => Ok(value.to_ascii_lowercase()),
        _ => Err(AppError::ValidationError(format!(
            "{field} must be {FINGERPRINT_LEN} hex characters"
        ))),
    }
}
