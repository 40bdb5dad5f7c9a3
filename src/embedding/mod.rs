//! Embedding + model utilities.
//!
//! - [`encoder`] turns corpus text into vectors ([`SentenceEncoder`] or any [`TextEncoder`]).
//! - [`handle`] wraps the loaded encoder so one instance is shared per process.

/// BERT sentence model with mean pooling.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence encoder and the [`TextEncoder`] seam.
pub mod encoder;
mod error;
/// Shared encoder handle.
pub mod handle;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Tokenizer loading helpers.
pub mod utils;

pub use encoder::{EncoderConfig, SentenceEncoder, TextEncoder};
pub use error::EmbeddingError;
pub use handle::EncoderHandle;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEncoder;
