//! Key-value slot persistence
//!
//! A slot is one named string value. The catalog keeps its whole collection
//! in a single slot and the one-shot notices in two more.
//!
//! Storage location: `~/.local/share/shelf/` (configurable via `Config`)
//!
//! Files:
//! - `books.json` - The book collection (JSON array)
//! - `notice.registered.json`, `notice.updated.json` - One-shot notices

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StorageError, StorageResult};
use crate::config::Config;

/// Extension used for slot files
const SLOT_EXTENSION: &str = "json";

/// A local key-value store holding string slots
pub trait SlotStore {
    /// Read a slot. Returns `None` if it was never written or was removed.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value of a slot
    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a slot. Returns whether it existed.
    fn remove(&mut self, key: &str) -> StorageResult<bool>;
}

/// Slots stored as files in a directory, one file per key
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    /// Use `dir` for slot files, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Self { dir })
    }

    /// Open the slot directory configured as `data_dir`
    pub fn open(config: &Config) -> StorageResult<Self> {
        Self::new(&config.data_dir)
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path backing a slot
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, SLOT_EXTENSION)))
    }

    /// Total size in bytes of all slot files
    pub fn total_size(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.path().extension().and_then(|ext| ext.to_str()) == Some(SLOT_EXTENSION)
            })
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum()
    }
}

impl SlotStore for FileSlots {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(key, bytes = content.len(), "Read slot");
                Ok(Some(content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_read(e, path)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, value.as_bytes())?;
        debug!(key, bytes = value.len(), "Wrote slot");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "Removed slot");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_write(e, path)),
        }
    }
}

/// Slots kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    slots: HashMap<String, String>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently set
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SlotStore for MemorySlots {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<bool> {
        Ok(self.slots.remove(key).is_some())
    }
}

/// Keys become file names, so keep them to a safe alphabet
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
