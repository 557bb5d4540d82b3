//! Client-local durable storage
//!
//! A slot store is a string-keyed map of string values, the shape of a
//! browser's local storage. The local cache and the theme preference each
//! live in their own slot.

mod cache;

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub use cache::{LocalCache, TODOS_SLOT};

/// String-keyed slot storage
pub trait SlotStorage {
    /// Read a slot, `None` if it was never written
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a slot
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot; removing a missing slot is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process slot storage (for testing)
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

/// One file per slot under a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        tracing::debug!("Slot storage at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.slot", key))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("slot.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        // Readers only ever see a complete slot
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.read("theme").unwrap(), None);
        storage.write("theme", "dark").unwrap();
        assert_eq!(storage.read("theme").unwrap().as_deref(), Some("dark"));
        storage.remove("theme").unwrap();
        storage.remove("theme").unwrap();
        assert_eq!(storage.read("theme").unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut storage = FileStorage::open(dir.path().join("nested")).unwrap();
            storage.write("todos", "[]").unwrap();
            storage.write("todos", "[1]").unwrap();
        }
        let storage = FileStorage::open(dir.path().join("nested")).unwrap();
        assert_eq!(storage.read("todos").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.read("theme").unwrap(), None);
    }

    #[test]
    fn test_file_storage_remove_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.remove("never-written").is_ok());
    }
}
