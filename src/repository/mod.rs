//! Repository layer for document metadata persistence.
//!
//! All access goes through parameterized SQL against SQLite. Connections are
//! opened per call from the stored database path; SQLite handles cross-call
//! synchronization, so the repository itself carries no locking.

mod document;

pub use document::{DocumentRepository, StorageRef};

use std::path::Path;

use rusqlite::Connection;

/// Errors surfaced by the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

pub(crate) fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(conn)
}
