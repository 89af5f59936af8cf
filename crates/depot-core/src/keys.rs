//! Storage key generation.
//!
//! Auto-generated keys have the shape
//! `{prefix}/{timestamp}-{8-char-suffix}-{sanitized-name}`. The timestamp uses
//! `-` instead of `:` and `.` so keys are filesystem-safe and sort
//! chronologically as plain strings. The random suffix disambiguates keys
//! generated within the same millisecond.

use chrono::Utc;
use uuid::Uuid;

const MAX_NAME_LENGTH: usize = 128;

/// Strip path components and unsafe characters from a client-supplied
/// filename. Returns `None` when nothing usable remains (empty input, pure
/// punctuation such as `..`), in which case callers substitute a default.
pub fn sanitize_object_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let sanitized: String = base
        .chars()
        .take(MAX_NAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| matches!(c, '.' | '-' | '_')) {
        return None;
    }

    Some(sanitized)
}

/// Generate a storage key under `prefix` for an optional original filename.
///
/// Infallible: a missing or unusable name falls back to `report-{timestamp}`.
pub fn generate_key(original_name: Option<&str>, prefix: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string();
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();

    let name = original_name
        .and_then(sanitize_object_name)
        .unwrap_or_else(|| format!("report-{}", timestamp));

    format!("{}/{}-{}-{}", prefix.trim_matches('/'), timestamp, suffix, name)
}

/// Whether a caller-supplied key literal is acceptable as-is.
///
/// Rejects empty keys, leading slashes, and `..` segments so an explicit key
/// can never escape the storage root on path-based backends.
pub fn is_valid_explicit_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !key.split('/').any(|segment| segment == "..")
}
