//! JSON-file backed preference store.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use super::{PreferenceStore, StoreError};
use crate::sync::lock;

const DEFAULT_FILE_NAME: &str = "preferences.json";

/// A store persisted as a flat JSON object of strings.
///
/// ```json
/// { "theme": "dark" }
/// ```
///
/// A missing file is an empty store. Writes create parent directories as
/// needed, and a malformed file is replaced on the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// Nothing is read or created until the store is used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Creates a store at `<config dir>/<app_name>/preferences.json`.
    ///
    /// Returns `None` when the platform has no notion of a config directory.
    pub fn default_location(app_name: &str) -> Option<Self> {
        let dir = dirs::config_dir()?.join(app_name);
        Some(Self::new(dir.join(DEFAULT_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn read_map_for_update(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match self.read_map() {
            Err(StoreError::Malformed { path, source }) => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "replacing malformed preference file"
                );
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(map).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, body + "\n").map_err(io_err)
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = lock(&self.guard);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = lock(&self.guard);
        let mut map = self.read_map_for_update()?;
        if map.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        let _guard = lock(&self.guard);
        if !self.path.exists() {
            return Ok(());
        }
        let mut map = self.read_map_for_update()?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}
