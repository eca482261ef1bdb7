//! Data model types shared across the service.

mod document;

pub use document::{
    Document, DocumentPatch, DocumentSummary, ListCursor, ListFilter, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
