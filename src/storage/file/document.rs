//! Locked JSON document holding one storage area.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{StorageError, StorageResult};

/// Entries of one area as persisted on disk.
pub type Entries = BTreeMap<String, String>;

/// JSON object file guarded by advisory file locks.
///
/// Reads take a shared lock, updates an exclusive one, so several processes
/// can share a single area file.
#[derive(Debug, Clone)]
pub struct AreaDocument {
    path: PathBuf,
}

impl AreaDocument {
    /// Create a document handle for `path`. The file is created lazily.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all entries under a shared lock.
    pub fn read(&self) -> StorageResult<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let mut file = File::open(&self.path)?;
        file.lock_shared()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        let entries = read_entries(&mut file);

        file.unlock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        entries
    }

    /// Apply `update_fn` to the entries under an exclusive lock.
    ///
    /// The file is rewritten only when `update_fn` succeeds.
    pub fn update<F, R>(&self, update_fn: F) -> StorageResult<R>
    where
        F: FnOnce(&mut Entries) -> StorageResult<R>,
    {
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        file.lock_exclusive()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        let result = read_entries(&mut file).and_then(|mut entries| {
            let output = update_fn(&mut entries)?;
            write_entries(&mut file, &entries)?;
            Ok(output)
        });

        file.unlock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        result
    }
}

fn read_entries(file: &mut File) -> StorageResult<Entries> {
    let mut raw = String::new();
    file.read_to_string(&mut raw)?;

    // A freshly created file is empty.
    if raw.trim().is_empty() {
        return Ok(Entries::new());
    }

    Ok(serde_json::from_str(&raw)?)
}

fn write_entries(file: &mut File, entries: &Entries) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(entries)?;

    file.seek(SeekFrom::Start(0))?;
    file.set_len(0)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;

    Ok(())
}
