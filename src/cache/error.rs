//! Cache error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by the cache's maintenance calls.
///
/// `load` and `save` never return these; they fold failures into
/// [`MissReason`](super::MissReason) and [`SaveOutcome`](super::SaveOutcome).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type CacheResult<T> = Result<T, CacheError>;
