//! Service configuration.
//!
//! Defaults live in code; an optional TOML file overrides them and the CLI
//! applies flag/env overrides on top. The resulting `Settings` value is loaded
//! once at startup and treated as immutable for the life of the process.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Process-wide configuration for the API server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address to bind the HTTP listener to.
    pub host: String,
    /// Port to bind the HTTP listener to.
    pub port: u16,
    /// Root directory for the database, blob objects, and pending markers.
    pub data_dir: PathBuf,
    /// Origins allowed to make cross-origin requests. Requests from other
    /// origins still succeed but receive the wildcard allow-origin header.
    pub allowed_origins: Vec<String>,
    /// Reserved hook for gating downloads behind authentication. Downloads
    /// are currently always public.
    pub public_read: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            data_dir: PathBuf::from("data"),
            allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ],
            public_read: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)?;
                Ok(toml::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Path of the SQLite metadata database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("docshelf.db")
    }

    /// Root directory of the blob store.
    pub fn objects_dir(&self) -> PathBuf {
        self.data_dir.join("objects")
    }

    /// Directory holding short-lived pending-upload markers.
    pub fn pending_dir(&self) -> PathBuf {
        self.data_dir.join("pending")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8787);
        assert!(settings.public_read);
        assert!(!settings.allowed_origins.is_empty());
        assert_eq!(settings.database_path(), PathBuf::from("data/docshelf.db"));
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docshelf.toml");
        std::fs::write(
            &path,
            r#"
port = 9000
allowed_origins = ["https://docs.example.org"]
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.allowed_origins, vec!["https://docs.example.org"]);
        // Unspecified fields keep their defaults.
        assert_eq!(settings.host, "127.0.0.1");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("data"));
    }
}
