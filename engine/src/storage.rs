//! Durable key-value storage for persisted collections.
//!
//! Values are opaque strings, like browser storage. Typed loading and the
//! handling of corrupt entries live in [`crate::snapshot`].

use crate::{error::Result, Error};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// A string key-value store that survives restarts.
pub trait LocalStore: Send + Sync + fmt::Debug {
    /// Read a value, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store.
///
/// Clones share the same entries, which is how tests model several tabs
/// writing to one browser storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Store keeping one JSON file per key in a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| Error::Storage(format!("{}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// Directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!("{}: {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Error::Storage(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path).map_err(|e| Error::Storage(format!("{}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("{}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("cart").unwrap(), None);

        store.set("cart", "{}").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("{}"));

        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
        store.remove("cart").unwrap();
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.clone();

        tab_a.set("wishlist", "[1]").unwrap();
        assert_eq!(tab_b.get("wishlist").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state")).unwrap();

        assert_eq!(store.get("cart").unwrap(), None);
        store.set("cart", r#"{"items":[]}"#).unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some(r#"{"items":[]}"#));
        assert!(store.dir().join("cart.json").exists());

        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
        store.remove("cart").unwrap();
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path()).unwrap().set("cart", "saved").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("cart").unwrap().as_deref(), Some("saved"));
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("../escape/me", "x").unwrap();

        assert!(dir.path().join(".._escape_me.json").exists());
        assert_eq!(store.get("../escape/me").unwrap().as_deref(), Some("x"));
    }
}
