//! Shared helpers for slugs, tag parsing, and checksums.

use sha2::{Digest, Sha256};

/// Sanitize arbitrary text into a URL- and path-safe slug.
///
/// Lowercases the input, collapses runs of non-alphanumeric characters into a
/// single `-`, trims leading/trailing separators, and caps the result at 80
/// characters. Unicode letters and digits are kept.
pub fn sanitize_slug(input: &str) -> String {
    let mut slug = String::new();
    let mut gap = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug.chars().take(80).collect()
}

/// Parse a JSON-encoded list of tags, always producing a string array.
///
/// Malformed JSON or a non-array value yields an empty list. Non-string array
/// elements are coerced to their JSON representation rather than rejected.
pub fn safe_parse_tags(raw: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items.into_iter().map(json_to_tag).collect(),
        _ => Vec::new(),
    }
}

/// Coerce a single JSON value into a tag string.
pub fn json_to_tag(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Strip a trailing `.pdf` extension, case-insensitively.
pub fn strip_pdf_extension(name: &str) -> &str {
    if name.to_ascii_lowercase().ends_with(".pdf") {
        // The suffix is 4 ASCII bytes, so the slice lands on a char boundary.
        &name[..name.len() - 4]
    } else {
        name
    }
}

/// Hex-encoded SHA-256 digest of a binary payload.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
