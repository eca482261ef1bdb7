//! HTTP request handlers for the document API.

mod documents_api;
mod download;
mod upload;

pub use documents_api::{delete_document, get_document, list_documents, update_document};
pub use download::download_document;
pub use upload::upload_document;
