//! Router configuration for the API server.

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Router};

use super::cors::apply_cors;
use super::handlers;
use super::AppState;

/// Maximum accepted upload body size.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Create the main router with all routes.
///
/// Preflight OPTIONS requests and CORS header attachment are handled by the
/// `apply_cors` middleware wrapping the whole router, so every response,
/// including errors and the 404 fallback, carries the CORS headers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload_document))
        .route("/list", get(handlers::list_documents))
        .route(
            "/doc/:id",
            get(handlers::get_document)
                .put(handlers::update_document)
                .patch(handlers::update_document)
                .delete(handlers::delete_document),
        )
        .route("/download/:id", get(handlers::download_document))
        .fallback(|| async { (StatusCode::NOT_FOUND, "Not found") })
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), apply_cors))
        .with_state(state)
}
