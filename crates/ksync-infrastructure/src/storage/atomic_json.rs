//! Atomic JSON collection files.
//!
//! A collection is a whole JSON array in one file. Every change is a
//! read-modify-write of the complete array under an exclusive file lock,
//! written through a temporary file and an atomic rename, so a failed write
//! never leaves a half-written collection behind.

use ksync_core::{KsyncError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A handle to a JSON array file with all-or-nothing writes.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: An exclusive `fs2` lock serializes read-modify-write cycles
/// - **Durability**: Explicit fsync before rename
/// - **Quota**: An optional byte budget, reported as `QuotaExceeded`
pub struct JsonCollectionFile<T> {
    path: PathBuf,
    collection: String,
    quota_bytes: Option<u64>,
    _phantom: PhantomData<T>,
}

impl<T> JsonCollectionFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a handle for the collection stored at `path`.
    ///
    /// `collection` names the collection in error messages and logs.
    pub fn new(path: PathBuf, collection: impl Into<String>) -> Self {
        Self {
            path,
            collection: collection.into(),
            quota_bytes: None,
            _phantom: PhantomData,
        }
    }

    /// Limits the serialized size of the collection.
    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the whole collection.
    ///
    /// A missing or empty file is an empty collection.
    pub fn load(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<T> = serde_json::from_str(&content)?;
        Ok(items)
    }

    /// Performs a locked read-modify-write of the collection.
    ///
    /// If `f` returns an error nothing is written. If the write fails the
    /// previous file contents are left as they were.
    pub fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut items = self.load()?;
        let result = f(&mut items)?;
        self.write_all(&items)?;

        Ok(result)
    }

    /// Overwrites the collection, under the same lock as `update`.
    pub fn replace(&self, items: &[T]) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        self.write_all(items)
    }

    fn write_all(&self, items: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(items)?;

        if let Some(quota) = self.quota_bytes {
            if json.len() as u64 > quota {
                tracing::warn!(
                    collection = %self.collection,
                    size = json.len(),
                    quota,
                    "Refusing write over storage quota"
                );
                return Err(KsyncError::quota_exceeded(
                    &self.collection,
                    format!("{} bytes needed, quota is {} bytes", json.len(), quota),
                ));
            }
        }

        let tmp_path = self.temp_path()?;
        if let Err(err) = Self::write_tmp(&tmp_path, &json) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.tag_collection(err.into()));
        }

        // Atomic rename
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.tag_collection(err.into()));
        }

        Ok(())
    }

    fn write_tmp(tmp_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut tmp_file = File::create(tmp_path)?;
        tmp_file.write_all(bytes)?;
        tmp_file.sync_all()
    }

    /// Fills in the collection name on quota errors raised by the OS.
    fn tag_collection(&self, err: KsyncError) -> KsyncError {
        match err {
            KsyncError::QuotaExceeded { message, .. } => {
                KsyncError::quota_exceeded(&self.collection, message)
            }
            other => other,
        }
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| KsyncError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| KsyncError::io("Path has no file name"))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// An exclusive lock on `<collection>.lock`, released on drop.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        fs2::FileExt::lock_exclusive(&file)
            .map_err(|e| KsyncError::io(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // The lock file itself stays; removing it would let a waiting
        // process lock an unlinked inode.
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        count: u32,
    }

    fn entry(name: &str, count: u32) -> Entry {
        Entry {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = JsonCollectionFile::<Entry>::new(temp_dir.path().join("none.json"), "entries");
        assert!(file.load().unwrap().is_empty());
        assert!(!file.exists());
    }

    #[test]
    fn test_update_appends() {
        let temp_dir = TempDir::new().unwrap();
        let file = JsonCollectionFile::<Entry>::new(temp_dir.path().join("e.json"), "entries");

        file.update(|items| {
            items.push(entry("a", 1));
            Ok(())
        })
        .unwrap();
        file.update(|items| {
            items.push(entry("b", 2));
            Ok(())
        })
        .unwrap();

        assert_eq!(file.load().unwrap(), vec![entry("a", 1), entry("b", 2)]);
    }

    #[test]
    fn test_failed_closure_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let file = JsonCollectionFile::<Entry>::new(temp_dir.path().join("e.json"), "entries");
        file.replace(&[entry("a", 1)]).unwrap();

        let result: Result<()> = file.update(|items| {
            items.clear();
            Err(KsyncError::validation("nope"))
        });

        assert!(result.is_err());
        assert_eq!(file.load().unwrap(), vec![entry("a", 1)]);
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("e.json");
        let file = JsonCollectionFile::<Entry>::new(path.clone(), "entries").with_quota(Some(120));
        file.replace(&[entry("a", 1)]).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let err = file
            .update(|items| {
                items.extend((0..20).map(|i| entry("filler", i)));
                Ok(())
            })
            .unwrap_err();

        match err {
            KsyncError::QuotaExceeded { collection, .. } => assert_eq!(collection, "entries"),
            other => panic!("expected quota error, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("e.json");
        let file = JsonCollectionFile::<Entry>::new(path.clone(), "entries");

        file.replace(&[entry("a", 1)]).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join(".e.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("e.json");
        fs::write(&path, "{ not json").unwrap();
        let file = JsonCollectionFile::<Entry>::new(path, "entries");

        assert!(file.load().unwrap_err().is_serialization());
    }
}
