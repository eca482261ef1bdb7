//! SQLite-backed document repository.
//!
//! Holds the authoritative `documents` table plus the denormalized
//! `document_tags` relation used by the listing endpoint's tag filter. The
//! tag relation is rebuilt (delete-all-then-reinsert) on every mutation that
//! touches tags.

use std::path::{Path, PathBuf};

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};

use super::Result;
use crate::models::{Document, DocumentPatch, DocumentSummary, ListFilter};
use crate::utils::safe_parse_tags;

/// SQLite-backed repository for document metadata.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db_path: PathBuf,
}

/// Fields needed to serve or delete the stored object for a document.
#[derive(Debug, Clone)]
pub struct StorageRef {
    pub storage_key: String,
    pub file_name: String,
    pub content_type: String,
}

impl DocumentRepository {
    /// Create a repository, initializing the schema if needed.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                version INTEGER NOT NULL,
                file_name TEXT NOT NULL,
                storage_key TEXT NOT NULL,
                uploaded_at TEXT NOT NULL,
                year INTEGER NOT NULL,
                tags_json TEXT NOT NULL,
                description TEXT,
                size INTEGER NOT NULL,
                content_type TEXT NOT NULL,
                checksum TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS document_tags (
                doc_id TEXT NOT NULL,
                tag TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_uploaded
                ON documents(uploaded_at DESC, id DESC);
            CREATE INDEX IF NOT EXISTS idx_document_tags_tag
                ON document_tags(tag, doc_id);
            "#,
        )?;
        Ok(())
    }

    /// Insert a new document row.
    pub fn insert(&self, doc: &Document) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO documents (
                id, version, file_name, storage_key, uploaded_at,
                year, tags_json, description, size, content_type, checksum
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                doc.id,
                doc.version,
                doc.file_name,
                doc.storage_key,
                doc.uploaded_at,
                doc.year,
                serde_json::to_string(&doc.tags)?,
                doc.description,
                doc.size,
                doc.content_type,
                doc.checksum,
            ],
        )?;
        Ok(())
    }

    /// Insert one tag row per entry, order preserved, duplicates kept.
    pub fn insert_tags(&self, doc_id: &str, tags: &[String]) -> Result<()> {
        let conn = self.connect()?;
        for tag in tags {
            conn.execute(
                "INSERT INTO document_tags (doc_id, tag) VALUES (?1, ?2)",
                params![doc_id, tag],
            )?;
        }
        Ok(())
    }

    /// Rebuild the tag relation for a document: delete everything, then
    /// reinsert the provided list.
    pub fn replace_tags(&self, doc_id: &str, tags: &[String]) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "DELETE FROM document_tags WHERE doc_id = ?1",
            params![doc_id],
        )?;
        for tag in tags {
            conn.execute(
                "INSERT INTO document_tags (doc_id, tag) VALUES (?1, ?2)",
                params![doc_id, tag],
            )?;
        }
        Ok(())
    }

    /// Get a document by id.
    pub fn get(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, version, file_name, storage_key, uploaded_at,
                    year, tags_json, description, size, content_type, checksum
             FROM documents WHERE id = ?1",
        )?;
        let doc = stmt.query_row(params![id], row_to_document).optional()?;
        Ok(doc)
    }

    /// Get the storage key, file name, and content type for a document.
    pub fn get_storage_ref(&self, id: &str) -> Result<Option<StorageRef>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT storage_key, file_name, content_type FROM documents WHERE id = ?1",
        )?;
        let target = stmt
            .query_row(params![id], |row| {
                Ok(StorageRef {
                    storage_key: row.get(0)?,
                    file_name: row.get(1)?,
                    content_type: row.get(2)?,
                })
            })
            .optional()?;
        Ok(target)
    }

    /// List documents, newest first, ties broken by id descending.
    ///
    /// The keyset cursor includes rows strictly after the cursor position in
    /// that order: `uploaded_at < after OR (uploaded_at = after AND id <
    /// after_id)`.
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<DocumentSummary>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(year) = filter.year {
            clauses.push("d.year = ?");
            values.push(Box::new(year));
        }
        if let Some(tag) = &filter.tag {
            clauses.push(
                "EXISTS (SELECT 1 FROM document_tags t WHERE t.doc_id = d.id AND t.tag = ?)",
            );
            values.push(Box::new(tag.clone()));
        }
        if let Some(cursor) = &filter.cursor {
            clauses.push("(d.uploaded_at < ? OR (d.uploaded_at = ? AND d.id < ?))");
            values.push(Box::new(cursor.after_uploaded_at.clone()));
            values.push(Box::new(cursor.after_uploaded_at.clone()));
            values.push(Box::new(cursor.after_id.clone()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT d.id, d.file_name, d.storage_key, d.uploaded_at, d.year,
                    d.tags_json, d.description, d.size, d.content_type, d.checksum
             FROM documents d
             {where_sql}
             ORDER BY d.uploaded_at DESC, d.id DESC
             LIMIT ?"
        );
        values.push(Box::new(filter.effective_limit()));

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(values.iter().map(|v| v.as_ref())),
            row_to_summary,
        )?;
        let docs = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    /// Apply a partial metadata update.
    ///
    /// When the patch carries tags, the tag relation is rebuilt before the
    /// row update. An empty patch is a no-op; an unknown id updates zero rows
    /// and is also treated as success.
    pub fn update(&self, id: &str, patch: &DocumentPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        if let Some(tags) = &patch.tags {
            self.replace_tags(id, tags)?;
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(description) = &patch.description {
            sets.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(tags) = &patch.tags {
            sets.push("tags_json = ?");
            values.push(Box::new(serde_json::to_string(tags)?));
        }
        if let Some(year) = patch.year {
            sets.push("year = ?");
            values.push(Box::new(year));
        }
        if let Some(file_name) = &patch.file_name {
            sets.push("file_name = ?");
            values.push(Box::new(file_name.clone()));
        }
        values.push(Box::new(id.to_string()));

        let sql = format!("UPDATE documents SET {} WHERE id = ?", sets.join(", "));
        let conn = self.connect()?;
        conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())))?;
        Ok(())
    }

    /// Delete the document row.
    ///
    /// Tag rows for the id are not removed; once the row is gone, the listing
    /// query's EXISTS filter no longer resolves them to a document.
    pub fn delete(&self, id: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let tags_json: String = row.get(6)?;
    Ok(Document {
        id: row.get(0)?,
        version: row.get(1)?,
        file_name: row.get(2)?,
        storage_key: row.get(3)?,
        uploaded_at: row.get(4)?,
        year: row.get(5)?,
        tags: safe_parse_tags(&tags_json),
        description: row.get(7)?,
        size: row.get(8)?,
        content_type: row.get(9)?,
        checksum: row.get(10)?,
    })
}

fn row_to_summary(row: &Row<'_>) -> rusqlite::Result<DocumentSummary> {
    let tags_json: String = row.get(5)?;
    Ok(DocumentSummary {
        id: row.get(0)?,
        file_name: row.get(1)?,
        storage_key: row.get(2)?,
        uploaded_at: row.get(3)?,
        year: row.get(4)?,
        tags: safe_parse_tags(&tags_json),
        description: row.get(6)?,
        size: row.get(7)?,
        content_type: row.get(8)?,
        checksum: row.get(9)?,
    })
}
