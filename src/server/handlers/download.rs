//! Binary download handler.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::super::error::ApiError;
use super::super::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// `download=1` forces an attachment disposition.
    pub download: Option<String>,
}

/// Stream the stored PDF back to the client.
///
/// Defaults to inline display. Object attributes from the blob store are
/// applied first and then overridden by the explicit content-type,
/// disposition, and cache headers. Responses are marked non-cacheable.
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let target = state.repo.get_storage_ref(&id)?.ok_or(ApiError::NotFound)?;
    let object = state
        .blobs
        .get(&target.storage_key)?
        .ok_or(ApiError::MissingObject)?;

    let stored_content_type = object.content_type.clone();
    let mut response = object.data.into_response();
    let headers = response.headers_mut();

    if let Some(value) = stored_content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        headers.insert(header::CONTENT_TYPE, value);
    }

    let content_type = if target.content_type.is_empty() {
        "application/pdf".to_string()
    } else {
        target.content_type
    };
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }

    let is_download = params.download.as_deref() == Some("1");
    let disposition = format!(
        "{}; filename=\"{}\"",
        if is_download { "attachment" } else { "inline" },
        target.file_name
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).map_err(anyhow::Error::from)?,
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(response)
}
