//! File-backed token store for the CLI session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use beejak_core::error::SessionError;
use beejak_core::session::TokenStore;

/// Persists session keys as a small JSON object under the user config
/// directory. Every write lands on disk immediately.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileTokenStore {
    /// Open the store at `path`, loading existing entries if the file is
    /// there.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| SessionError::Storage(e.to_string()))?;
            serde_json::from_str(&raw).map_err(|e| SessionError::Storage(e.to_string()))?
        } else {
            HashMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Default location: `<config dir>/beejak/session.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("beejak")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::Storage(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| SessionError::Storage(e.to_string()))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        self.persist()
    }
}
