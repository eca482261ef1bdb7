//! Multipart upload handler.

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Datelike, SecondsFormat, Utc};
use serde_json::json;

use super::super::error::ApiError;
use super::super::AppState;
use crate::models::Document;
use crate::storage::sidecar_key;
use crate::utils::{safe_parse_tags, sanitize_slug, sha256_hex, strip_pdf_extension};

/// Object key prefix for uploaded payloads.
const KEY_PREFIX: &str = "documents";

/// Fallback display name when the client omits one.
const DEFAULT_FILE_NAME: &str = "document.pdf";

/// Handle a multipart PDF upload.
///
/// The `file` part is required; `year`, `description`, and `tags` (a
/// JSON-encoded string array, parsed defensively) are optional. On success
/// the payload and a metadata sidecar land in the blob store, the metadata
/// row and its tag rows land in SQLite, and any pending marker for the new
/// id is cleared. The writes are sequential with no cross-store transaction:
/// a failure partway through can leave orphaned blobs behind.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut year: Option<i64> = None;
    let mut description = String::new();
    let mut tags: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let name = match field.file_name() {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => DEFAULT_FILE_NAME.to_string(),
                };
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?;
                file = Some((name, data.to_vec()));
            }
            Some("year") => {
                year = field.text().await.ok().and_then(|text| text.trim().parse().ok());
            }
            Some("description") => {
                description = field
                    .text()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?;
            }
            Some("tags") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?;
                tags = safe_parse_tags(&raw);
            }
            _ => {}
        }
    }

    let Some((file_name, data)) = file else {
        return Err(ApiError::BadRequest("file is required".to_string()));
    };

    let year = year.unwrap_or_else(|| i64::from(Utc::now().year()));
    let id = uuid::Uuid::new_v4().to_string();
    let uploaded_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let content_type = "application/pdf".to_string();
    let size = data.len() as i64;

    let slug = sanitize_slug(strip_pdf_extension(&file_name));
    let storage_key = format!("{KEY_PREFIX}/{year}/{slug}-{id}.pdf");
    let checksum = sha256_hex(&data);

    state
        .blobs
        .put(&storage_key, &data, &content_type, &[("id", id.as_str())])?;

    // The sidecar is a snapshot at upload time; metadata updates never
    // rewrite it.
    let sidecar = json!({
        "description": description,
        "tags": tags,
        "uploaded_at": uploaded_at,
        "checksum": checksum,
        "size": size,
        "content_type": content_type,
        "year": year,
    });
    state.blobs.put(
        &sidecar_key(&storage_key),
        sidecar.to_string().as_bytes(),
        "application/json",
        &[],
    )?;

    let doc = Document {
        id,
        version: 1,
        file_name,
        storage_key,
        uploaded_at,
        year,
        tags: tags.clone(),
        description: Some(description),
        size,
        content_type,
        checksum,
    };
    state.repo.insert(&doc)?;
    state.repo.insert_tags(&doc.id, &tags)?;

    // Clear any pending marker for this upload.
    state.markers.delete(&format!("upload:{}", doc.id))?;

    tracing::info!(id = %doc.id, size, "uploaded document");
    Ok(Json(json!({ "ok": true, "id": doc.id })))
}
