//! File-based storage backend.
//!
//! Each area is one JSON object file, so entries persist across runs and are
//! shared by every process pointing at the same data directory.
//!
//! Directory structure:
//! ```text
//! data/
//! └── local.json
//! ```

mod document;

use std::path::{Path, PathBuf};

use crate::config::FileStorageConfig;
use crate::domain::StorageArea;
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::StorageBackend;

pub use document::{AreaDocument, Entries};

/// File-based storage implementation for a single area.
#[derive(Debug)]
pub struct FileStorage {
    area: StorageArea,
    document: AreaDocument,
}

impl FileStorage {
    /// Create a new file storage instance for `area`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: &FileStorageConfig, area: StorageArea) -> StorageResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            StorageError::FileIO(format!(
                "Failed to create directory {}: {e}",
                config.data_dir.display()
            ))
        })?;

        Ok(Self {
            area,
            document: AreaDocument::new(area_path(&config.data_dir, area)),
        })
    }

    /// Path of the file backing this area.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.document.path()
    }

    fn entries(&self) -> Entries {
        self.document.read().unwrap_or_else(|e| {
            tracing::warn!(
                area = %self.area,
                path = ?self.path(),
                error = %e,
                "Failed to read storage file"
            );
            Entries::new()
        })
    }
}

fn area_path(data_dir: &Path, area: StorageArea) -> PathBuf {
    data_dir.join(format!("{area}.json"))
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.document.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        if !self.document.path().exists() {
            return Ok(());
        }
        self.document.update(|entries| {
            entries.remove(key);
            Ok(())
        })
    }

    fn clear(&self) -> StorageResult<()> {
        self.document.update(|entries| {
            entries.clear();
            Ok(())
        })
    }

    fn length(&self) -> usize {
        self.entries().len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.entries().into_keys().nth(index)
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
        };
        let storage = FileStorage::new(&config, StorageArea::Local).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_area_file_name() {
        let (storage, temp) = create_test_storage();
        assert_eq!(storage.path(), temp.path().join("local.json"));
    }

    #[test]
    fn test_item_operations() {
        let (storage, _temp) = create_test_storage();

        assert_eq!(storage.get_item("a"), None);
        storage.remove_item("a").unwrap();

        storage.set_item("b", "2").unwrap();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").as_deref(), Some("1"));
        assert_eq!(storage.length(), 2);
        assert_eq!(storage.key(0).as_deref(), Some("a"));
        assert_eq!(storage.key(1).as_deref(), Some("b"));

        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a"), None);

        storage.clear().unwrap();
        assert_eq!(storage.length(), 0);
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
        };

        FileStorage::new(&config, StorageArea::Local)
            .unwrap()
            .set_item("theme", "dark")
            .unwrap();

        let reopened = FileStorage::new(&config, StorageArea::Local).unwrap();
        assert_eq!(reopened.get_item("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_two_handles_share_one_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
        };
        let first = FileStorage::new(&config, StorageArea::Local).unwrap();
        let second = FileStorage::new(&config, StorageArea::Local).unwrap();

        first.set_item("k", "v").unwrap();
        assert_eq!(second.get_item("k").as_deref(), Some("v"));
    }
}
