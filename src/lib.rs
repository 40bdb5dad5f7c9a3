//! Semantic project matching over a cached sentence-embedding table.
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`ProjectMatcher`] - encode-or-load orchestration, `search` and `similar`
//! - [`EmbeddingCache`] - on-disk table keyed by the dataset's ordered id list
//! - [`VectorTable`] - ordered id → vector mapping with cosine scoring
//! - [`Config`], [`ConfigError`] - `HOPON_*` environment configuration
//!
//! ## Embedding
//! - [`SentenceEncoder`], [`EncoderConfig`] - BERT sentence encoder (candle)
//! - [`EncoderHandle`] - process-wide encoder injected into matchers
//! - [`TextEncoder`] - encoder seam used by the matcher
//!
//! ## Data
//! - [`Project`], [`CorpusItem`], [`load_projects`] - dataset rows and reader
//!
//! ## Test/Mock Support
//! [`MockEncoder`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod embedding;
pub mod matcher;
pub mod storage;
pub mod vectors;

pub use cache::{CacheError, CacheInfo, CacheLookup, EmbeddingCache, MissReason, SaveOutcome};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use dataset::{CorpusItem, DatasetError, Project, load_projects};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEncoder;
pub use embedding::{EmbeddingError, EncoderConfig, EncoderHandle, SentenceEncoder, TextEncoder};
pub use matcher::{
    EncodeOutcome, MatcherState, ProjectMatcher, Ranking, ScoreKind, ScoredItem, SearchOutcome,
    SkipReason,
};
pub use storage::{EmbeddingRecord, SnapshotFile, StorageError};
pub use vectors::{TableError, VectorTable, cosine_similarity};
