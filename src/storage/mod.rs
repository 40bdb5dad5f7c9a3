//! Storage primitives.
//!
//! - [`EmbeddingRecord`] is the on-disk record.
//! - [`SnapshotFile`] writes records atomically and maps them back for reading.
//! - [`mmap`] provides the read-only mapping used for zero-copy validation.

pub mod error;
pub mod mmap;
mod model;
pub mod snapshot;

pub use error::{StorageError, StorageResult};
pub use model::{ArchivedEmbeddingRecord, EmbeddingRecord};
pub use snapshot::SnapshotFile;
