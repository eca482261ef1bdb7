//! JSON metadata endpoints: list, get, update, delete.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::super::error::ApiError;
use super::super::AppState;
use crate::models::{DocumentPatch, ListCursor, ListFilter};
use crate::storage::sidecar_key;

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Exact-match year filter.
    pub year: Option<i64>,
    /// Exact-match tag filter against the denormalized tag relation.
    pub tag: Option<String>,
    /// Page size, clamped to [1, 100]; defaults to 50.
    pub limit: Option<i64>,
    pub after_uploaded_at: Option<String>,
    pub after_id: Option<String>,
}

/// Paginated document listing.
///
/// The keyset cursor only applies when both halves are present. `next` is
/// derived from the last returned row, or null when the page is empty.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let cursor = match (params.after_uploaded_at, params.after_id) {
        (Some(after_uploaded_at), Some(after_id)) => Some(ListCursor {
            after_uploaded_at,
            after_id,
        }),
        _ => None,
    };
    let filter = ListFilter {
        year: params.year,
        tag: params.tag,
        limit: params.limit,
        cursor,
    };

    let docs = state.repo.list(&filter)?;
    let next = docs.last().map(|doc| ListCursor {
        after_uploaded_at: doc.uploaded_at.clone(),
        after_id: doc.id.clone(),
    });
    Ok(Json(json!({ "docs": docs, "next": next })))
}

/// Fetch the full metadata record for one document.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let doc = state.repo.get(&id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "doc": doc })))
}

/// Partially update document metadata.
///
/// Recognized keys: `description`, `tags`, `year`, `file_name`; anything
/// else in the body is ignored, and a body with no recognized keys is a
/// no-op success. The blob sidecar is never rewritten, so it keeps its
/// upload-time snapshot.
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = DocumentPatch::from_json(&body);
    state.repo.update(&id, &patch)?;
    Ok(Json(json!({ "ok": true })))
}

/// Delete a document: both blob objects in one batched call, then the row.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let target = state.repo.get_storage_ref(&id)?.ok_or(ApiError::NotFound)?;

    let sidecar = sidecar_key(&target.storage_key);
    state
        .blobs
        .delete(&[target.storage_key.as_str(), sidecar.as_str()])?;
    state.repo.delete(&id)?;

    tracing::info!(%id, "deleted document");
    Ok(Json(json!({ "ok": true })))
}
