//! Single-file snapshot storage for the embedding record.


use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rkyv::rancor::Error as RkyvError;
use rkyv::to_bytes;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::storage::EmbeddingRecord;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::mmap::MmapFileHandle;

#[derive(Debug, Clone)]
/// Stores one [`EmbeddingRecord`] at a fixed path.
///
/// Writes go to a temp file in the same directory, are synced, then renamed over
/// the target, so readers only ever observe a complete old or new record.
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Serializes and atomically replaces the snapshot. Returns the bytes written.
    pub fn write(&self, record: &EmbeddingRecord) -> StorageResult<u64> {
        if !record.is_consistent() {
            return Err(StorageError::InconsistentRecord {
                ids: record.ids.len(),
                floats: record.vectors.len(),
                dim: record.embedding_dim,
            });
        }

        let bytes = to_bytes::<RkyvError>(record)
            .map_err(|e| StorageError::Serialization(format!("{:?}", e)))?;

        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|e| StorageError::WriteFailed(e.error.to_string()))?;

        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            "Snapshot written"
        );

        Ok(bytes.len() as u64)
    }

    /// Maps the current snapshot for reading.
    pub fn open(&self) -> StorageResult<MmapFileHandle> {
        if !self.path.exists() {
            return Err(StorageError::NotFound {
                path: self.path.clone(),
            });
        }

        Ok(MmapFileHandle::open(&self.path)?)
    }

    /// Deletes the snapshot. Returns `false` if there was nothing to delete.
    pub fn remove(&self) -> StorageResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}
