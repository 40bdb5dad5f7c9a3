//! Persistent embedding cache.
//!
//! One record on disk, keyed by the full ordered id list of the dataset it was
//! built from. A lookup hits only when the requested id sequence is identical
//! (same ids, same order, same length); anything else is a miss and the caller
//! recomputes every vector. Reordering an otherwise unchanged dataset therefore
//! forces a full recompute.
//!
//! Nothing here is fatal: unreadable records become [`MissReason::Corrupt`] and
//! failed writes become [`SaveOutcome::Failed`], both logged.

pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{CacheError, CacheResult};
pub use types::{CacheInfo, CacheLookup, MissReason, SaveOutcome};

use std::path::{Path, PathBuf};

use rkyv::rancor::Error as RkyvError;
use tracing::{debug, error, info, warn};

use crate::storage::{ArchivedEmbeddingRecord, EmbeddingRecord, SnapshotFile, StorageError};
use crate::vectors::VectorTable;

#[derive(Debug, Clone)]
/// Embedding cache backed by a single [`SnapshotFile`].
pub struct EmbeddingCache {
    snapshot: SnapshotFile,
}

impl EmbeddingCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            snapshot: SnapshotFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.snapshot.path()
    }

    /// Returns the stored table if it was built for exactly `expected_ids`.
    ///
    /// Ids are compared on the memory-mapped archive; vectors are only copied
    /// out on a hit.
    pub fn load<S: AsRef<str>>(&self, expected_ids: &[S]) -> CacheLookup {
        let lookup = self.lookup(expected_ids);

        match &lookup {
            CacheLookup::Hit(table) => info!(
                path = %self.path().display(),
                items = table.len(),
                embedding_dim = table.embedding_dim(),
                "Loaded embeddings from disk (cache hit)"
            ),
            CacheLookup::Miss(MissReason::Absent) => debug!(
                path = %self.path().display(),
                "No embedding cache on disk"
            ),
            CacheLookup::Miss(reason @ MissReason::Corrupt(_)) => warn!(
                path = %self.path().display(),
                reason = %reason,
                "Ignoring unreadable embedding cache"
            ),
            CacheLookup::Miss(reason @ MissReason::Stale { .. }) => warn!(
                path = %self.path().display(),
                reason = %reason,
                "Embedding cache is stale; embeddings will be recomputed"
            ),
        }

        lookup
    }

    fn lookup<S: AsRef<str>>(&self, expected_ids: &[S]) -> CacheLookup {
        let handle = match self.snapshot.open() {
            Ok(handle) => handle,
            Err(StorageError::NotFound { .. }) => return CacheLookup::Miss(MissReason::Absent),
            Err(e) => return CacheLookup::Miss(MissReason::Corrupt(e.to_string())),
        };

        let archived = match handle.access_archived::<ArchivedEmbeddingRecord>() {
            Ok(archived) => archived,
            Err(e) => return CacheLookup::Miss(MissReason::Corrupt(e.to_string())),
        };

        if !archived.is_consistent() {
            return CacheLookup::Miss(MissReason::Corrupt(format!(
                "{} ids with {} floats at dimension {}",
                archived.len(),
                archived.vectors.len(),
                archived.embedding_dim.to_native()
            )));
        }

        if !archived.ids_match(expected_ids) {
            return CacheLookup::Miss(MissReason::Stale {
                cached_len: archived.len(),
                expected_len: expected_ids.len(),
            });
        }

        let record = match rkyv::deserialize::<EmbeddingRecord, RkyvError>(archived) {
            Ok(record) => record,
            Err(e) => return CacheLookup::Miss(MissReason::Corrupt(format!("{:?}", e))),
        };

        match record.into_table() {
            Ok(table) => CacheLookup::Hit(table),
            Err(e) => CacheLookup::Miss(MissReason::Corrupt(e.to_string())),
        }
    }

    /// Atomically replaces the record with `table`. Failures are logged and
    /// leave the previous record in place.
    pub fn save(&self, table: &VectorTable) -> SaveOutcome {
        let record = EmbeddingRecord::from_table(table);

        match self.snapshot.write(&record) {
            Ok(bytes) => {
                info!(
                    path = %self.path().display(),
                    items = table.len(),
                    bytes,
                    "Saved embeddings to disk"
                );
                SaveOutcome::Written { bytes }
            }
            Err(e) => {
                error!(
                    path = %self.path().display(),
                    error = %e,
                    "Failed to save embedding cache"
                );
                SaveOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Describes the record on disk. `None` if absent or unreadable.
    pub fn info(&self) -> Option<CacheInfo> {
        let handle = self.snapshot.open().ok()?;
        let archived = match handle.access_archived::<ArchivedEmbeddingRecord>() {
            Ok(archived) => archived,
            Err(e) => {
                warn!(path = %self.path().display(), error = %e, "Unreadable embedding cache");
                return None;
            }
        };

        Some(CacheInfo {
            items: archived.len(),
            embedding_dim: archived.embedding_dim.to_native() as usize,
            bytes: handle.len() as u64,
        })
    }

    /// Deletes the record. Returns `false` if there was none.
    pub fn clear(&self) -> CacheResult<bool> {
        let removed = self.snapshot.remove()?;
        if removed {
            info!(path = %self.path().display(), "Embedding cache cleared");
        }
        Ok(removed)
    }
}
