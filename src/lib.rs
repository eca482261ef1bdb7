//! docshelf - PDF document storage and metadata API.
//!
//! Uploaded PDFs live as blob pairs on disk (the binary payload plus a JSON
//! metadata sidecar) while searchable metadata sits in SQLite. A denormalized
//! tag relation mirrors each document's tag list so the listing endpoint can
//! filter by exact tag without unpacking JSON at query time.

pub mod config;
pub mod models;
pub mod repository;
pub mod server;
pub mod storage;
pub mod utils;
