//! HTTP API server for the document shelf.
//!
//! Exposes upload/list/get/update/delete/download over a small REST surface
//! backed by the filesystem blob store and the SQLite metadata repository.
//! Requests are handled independently; the only shared state is the handles
//! in `AppState`, all of which are safe to use concurrently.

mod cors;
mod error;
mod handlers;
mod routes;

pub use cors::cors_headers;
pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::repository::DocumentRepository;
use crate::storage::{BlobStore, MarkerStore};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<DocumentRepository>,
    pub blobs: Arc<BlobStore>,
    pub markers: Arc<MarkerStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let repo = DocumentRepository::new(&settings.database_path())?;
        let blobs = BlobStore::new(&settings.objects_dir())?;
        let markers = MarkerStore::new(&settings.pending_dir())?;
        Ok(Self {
            repo: Arc::new(repo),
            blobs: Arc::new(blobs),
            markers: Arc::new(markers),
            settings: Arc::new(settings.clone()),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
