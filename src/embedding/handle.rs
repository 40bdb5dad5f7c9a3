//! Process-wide encoder handle.

use std::sync::Arc;

use tracing::{error, info};

use super::encoder::{EncoderConfig, SentenceEncoder, TextEncoder};

#[derive(Clone)]
/// Loaded encoder, or the reason it could not be loaded.
///
/// Build one handle at process start and clone it into every
/// [`ProjectMatcher`](crate::matcher::ProjectMatcher); clones share the same model.
pub enum EncoderHandle {
    Ready(Arc<dyn TextEncoder>),
    Unavailable { reason: String },
}

impl std::fmt::Debug for EncoderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(encoder) => f
                .debug_struct("Ready")
                .field("embedding_dim", &encoder.embedding_dim())
                .finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

impl EncoderHandle {
    /// Loads a [`SentenceEncoder`]; a load failure is logged once and yields `Unavailable`.
    pub fn load(config: EncoderConfig) -> Self {
        match SentenceEncoder::load(config) {
            Ok(encoder) => {
                info!(
                    embedding_dim = encoder.embedding_dim(),
                    stub = encoder.is_stub(),
                    "Semantic encoder ready"
                );
                Self::Ready(Arc::new(encoder))
            }
            Err(e) => {
                error!(error = %e, "Failed to load semantic encoder; semantic features disabled");
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Wraps an already-built encoder.
    pub fn from_encoder<E: TextEncoder + 'static>(encoder: E) -> Self {
        Self::Ready(Arc::new(encoder))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns the encoder if loaded.
    pub fn encoder(&self) -> Option<&Arc<dyn TextEncoder>> {
        match self {
            Self::Ready(encoder) => Some(encoder),
            Self::Unavailable { .. } => None,
        }
    }

    /// Returns the load failure reason, if any.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}
