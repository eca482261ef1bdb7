//! Filesystem-backed blob store and pending-upload marker store.
//!
//! Every uploaded document owns a blob pair: the binary payload at its
//! storage key and a JSON metadata sidecar next to it. Object attributes
//! (content type plus custom metadata) are kept under a parallel `.attrs/`
//! tree so downloads can replay them onto the response.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::utils::strip_pdf_extension;

/// One stored object: payload bytes plus the attributes recorded at put time.
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub custom_metadata: HashMap<String, String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ObjectAttrs {
    content_type: Option<String>,
    #[serde(default)]
    custom_metadata: HashMap<String, String>,
}

/// Blob store rooted at a directory; object keys map to relative paths.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn attrs_path(&self, key: &str) -> PathBuf {
        self.root.join(".attrs").join(format!("{key}.json"))
    }

    /// Keys are generated internally, but reject anything that could escape
    /// the store root.
    fn check_key(key: &str) -> anyhow::Result<()> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
            bail!("invalid object key: {key}");
        }
        Ok(())
    }

    /// Write an object and its attributes, creating parent directories.
    pub fn put(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
        custom_metadata: &[(&str, &str)],
    ) -> anyhow::Result<()> {
        Self::check_key(key)?;
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;

        let attrs = ObjectAttrs {
            content_type: Some(content_type.to_string()),
            custom_metadata: custom_metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        let attrs_path = self.attrs_path(key);
        if let Some(parent) = attrs_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&attrs_path, serde_json::to_vec(&attrs)?)?;
        Ok(())
    }

    /// Read an object; `None` when the key does not exist.
    pub fn get(&self, key: &str) -> anyhow::Result<Option<BlobObject>> {
        Self::check_key(key)?;
        let data = match fs::read(self.object_path(key)) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        // Missing or unreadable attributes degrade to defaults.
        let attrs: ObjectAttrs = fs::read(self.attrs_path(key))
            .ok()
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .unwrap_or_default();
        Ok(Some(BlobObject {
            data,
            content_type: attrs.content_type,
            custom_metadata: attrs.custom_metadata,
        }))
    }

    /// Batched removal; keys that do not exist are ignored.
    pub fn delete(&self, keys: &[&str]) -> anyhow::Result<()> {
        for key in keys {
            Self::check_key(key)?;
            remove_if_present(&self.object_path(key))?;
            remove_if_present(&self.attrs_path(key))?;
        }
        Ok(())
    }
}

/// Derive the metadata sidecar key for a payload key: a trailing `.pdf`
/// (case-insensitive) becomes `.meta.json`; other keys get the suffix
/// appended.
pub fn sidecar_key(key: &str) -> String {
    format!("{}.meta.json", strip_pdf_extension(key))
}

/// Short-lived marker store tracking in-flight uploads, one empty file per
/// key.
///
/// Upload clears its `upload:{id}` marker after the metadata row lands;
/// nothing sets markers yet. The write side is reserved for a future
/// orphan-reconciliation sweep over the blob/row dual write.
#[derive(Debug, Clone)]
pub struct MarkerStore {
    dir: PathBuf,
}

impl MarkerStore {
    pub fn new(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn marker_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(name)
    }

    pub fn set(&self, key: &str) -> anyhow::Result<()> {
        fs::write(self.marker_path(key), b"")?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> anyhow::Result<()> {
        remove_if_present(&self.marker_path(key))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.marker_path(key).exists()
    }
}

fn remove_if_present(path: &Path) -> anyhow::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_get_roundtrip_with_attrs() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path()).unwrap();

        store
            .put(
                "documents/2024/report-abc.pdf",
                b"%PDF-1.4",
                "application/pdf",
                &[("id", "abc")],
            )
            .unwrap();

        let object = store.get("documents/2024/report-abc.pdf").unwrap().unwrap();
        assert_eq!(object.data, b"%PDF-1.4");
        assert_eq!(object.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(object.custom_metadata.get("id").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path()).unwrap();
        assert!(store.get("documents/nope.pdf").unwrap().is_none());
    }

    #[test]
    fn test_delete_is_batched_and_ignores_missing() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path()).unwrap();
        store.put("a/x.pdf", b"x", "application/pdf", &[]).unwrap();
        store.put("a/x.meta.json", b"{}", "application/json", &[]).unwrap();

        store
            .delete(&["a/x.pdf", "a/x.meta.json", "a/never-existed.pdf"])
            .unwrap();
        assert!(store.get("a/x.pdf").unwrap().is_none());
        assert!(store.get("a/x.meta.json").unwrap().is_none());
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path()).unwrap();
        assert!(store.get("../outside.pdf").is_err());
        assert!(store.put("/abs.pdf", b"", "application/pdf", &[]).is_err());
    }

    #[test]
    fn test_sidecar_key() {
        assert_eq!(sidecar_key("documents/2024/a-b.pdf"), "documents/2024/a-b.meta.json");
        assert_eq!(sidecar_key("documents/2024/a-b.PDF"), "documents/2024/a-b.meta.json");
        assert_eq!(sidecar_key("documents/raw"), "documents/raw.meta.json");
    }

    #[test]
    fn test_marker_set_and_delete() {
        let dir = tempdir().unwrap();
        let markers = MarkerStore::new(dir.path()).unwrap();

        markers.set("upload:123e4567").unwrap();
        assert!(markers.exists("upload:123e4567"));

        markers.delete("upload:123e4567").unwrap();
        assert!(!markers.exists("upload:123e4567"));

        // Deleting a marker that was never set is fine.
        markers.delete("upload:ghost").unwrap();
    }
}
