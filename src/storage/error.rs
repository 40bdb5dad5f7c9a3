use std::path::PathBuf;
use thiserror::Error;

use crate::storage::mmap::MmapError;

#[derive(Error, Debug)]
/// Errors returned by the snapshot file backend.
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mmap error: {0}")]
    Mmap(#[from] MmapError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot not found at {path}")]
    NotFound { path: PathBuf },

    #[error("refusing to write inconsistent record: {ids} ids, {floats} floats, dim {dim}")]
    InconsistentRecord { ids: usize, floats: usize, dim: u32 },

    #[error("write failed: {0}")]
    WriteFailed(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
