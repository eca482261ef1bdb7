//! Document metadata types.

use serde::{Deserialize, Serialize};

use crate::utils::json_to_tag;

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Upper bound on the listing page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Authoritative metadata record for one uploaded PDF.
///
/// Mirrors the `documents` table. `tags` is materialized from the `tags_json`
/// column; a denormalized `document_tags` relation mirrors it for filtering.
/// `storage_key`, `size`, `content_type`, and `checksum` are fixed at upload
/// time and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Record format version, fixed at 1 on creation.
    pub version: i64,
    pub file_name: String,
    /// Blob store key of the binary payload. Embeds the upload-time year and
    /// is not rewritten if the year is later updated.
    pub storage_key: String,
    /// RFC-3339 creation timestamp; primary sort key and pagination cursor.
    pub uploaded_at: String,
    pub year: i64,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub size: i64,
    pub content_type: String,
    /// Hex-encoded SHA-256 of the payload, recorded at upload. Informational
    /// only; nothing deduplicates on it.
    pub checksum: String,
}

/// Listing projection of a document (everything except `version`).
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub file_name: String,
    pub storage_key: String,
    pub uploaded_at: String,
    pub year: i64,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub size: i64,
    pub content_type: String,
    pub checksum: String,
}

/// Keyset pagination cursor: the sort key of the last row of the previous
/// page. Rows strictly after it in `(uploaded_at DESC, id DESC)` order are
/// returned next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListCursor {
    pub after_uploaded_at: String,
    pub after_id: String,
}

/// Filters for the listing query. `year` and `tag` are ANDed when both are
/// present.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub year: Option<i64>,
    pub tag: Option<String>,
    pub limit: Option<i64>,
    pub cursor: Option<ListCursor>,
}

impl ListFilter {
    /// Requested limit clamped to `[1, MAX_PAGE_SIZE]`, defaulting to
    /// `DEFAULT_PAGE_SIZE`.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Partial metadata update parsed from a JSON request body.
///
/// Only recognized, correctly-typed keys are picked up; everything else in
/// the body is ignored. An empty patch makes the update a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub year: Option<i64>,
    pub file_name: Option<String>,
}

impl DocumentPatch {
    /// Extract recognized fields from an arbitrary JSON body.
    pub fn from_json(body: &serde_json::Value) -> Self {
        let description = body
            .get("description")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        let tags = body.get("tags").and_then(serde_json::Value::as_array).map(|items| {
            items.iter().map(|item| json_to_tag(item.clone())).collect()
        });
        let year = body.get("year").and_then(serde_json::Value::as_i64);
        let file_name = body
            .get("file_name")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);

        Self {
            description,
            tags,
            year,
            file_name,
        }
    }

    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.tags.is_none()
            && self.year.is_none()
            && self.file_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_limit_default_and_clamp() {
        assert_eq!(ListFilter::default().effective_limit(), 50);

        let mut filter = ListFilter {
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(filter.effective_limit(), 100);

        filter.limit = Some(0);
        assert_eq!(filter.effective_limit(), 1);

        filter.limit = Some(-5);
        assert_eq!(filter.effective_limit(), 1);

        filter.limit = Some(25);
        assert_eq!(filter.effective_limit(), 25);
    }

    #[test]
    fn test_patch_from_json_recognized_keys() {
        let patch = DocumentPatch::from_json(&json!({
            "description": "updated",
            "tags": ["a", "b"],
            "year": 2023,
            "file_name": "renamed.pdf",
        }));
        assert_eq!(patch.description.as_deref(), Some("updated"));
        assert_eq!(patch.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(patch.year, Some(2023));
        assert_eq!(patch.file_name.as_deref(), Some("renamed.pdf"));
    }

    #[test]
    fn test_patch_from_json_ignores_unknown_and_wrong_types() {
        let patch = DocumentPatch::from_json(&json!({
            "foo": 1,
            "description": 42,
            "tags": "not-an-array",
            "year": "2023",
        }));
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_from_json_coerces_tag_elements() {
        let patch = DocumentPatch::from_json(&json!({ "tags": ["a", 7] }));
        assert_eq!(patch.tags, Some(vec!["a".to_string(), "7".to_string()]));
    }

    #[test]
    fn test_patch_preserves_duplicate_tags() {
        let patch = DocumentPatch::from_json(&json!({ "tags": ["x", "x"] }));
        assert_eq!(patch.tags, Some(vec!["x".to_string(), "x".to_string()]));
    }
}
