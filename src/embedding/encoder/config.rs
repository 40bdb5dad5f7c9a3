use std::path::PathBuf;

use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_ENCODE_BATCH_SIZE, DEFAULT_MAX_SEQ_LEN};
use crate::embedding::error::EmbeddingError;

/// Files a model directory must contain.
pub const REQUIRED_MODEL_FILES: [&str; 3] = ["config.json", "model.safetensors", "tokenizer.json"];

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEncoder`](super::SentenceEncoder).
pub struct EncoderConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_dir: Option<PathBuf>,
    /// Max tokens per input (longer inputs are truncated).
    pub max_seq_len: usize,
    /// Inputs per forward pass.
    pub batch_size: usize,
    /// Output dimension used by the stub backend (model backends report their own).
    pub embedding_dim: usize,
    /// L2-normalise pooled vectors.
    pub normalize: bool,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            batch_size: DEFAULT_ENCODE_BATCH_SIZE,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            normalize: true,
            testing_stub: false,
        }
    }
}

impl EncoderConfig {
    /// Environment variables read by [`Config::from_env`](crate::config::Config::from_env).
    pub const ENV_MODEL_DIR: &'static str = "HOPON_MODEL_DIR";
    pub const ENV_MAX_SEQ_LEN: &'static str = "HOPON_MAX_SEQ_LEN";
    pub const ENV_BATCH_SIZE: &'static str = "HOPON_ENCODE_BATCH_SIZE";
    pub const ENV_STUB: &'static str = "HOPON_ENCODER_STUB";

    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "batch_size must be greater than zero".to_string(),
            });
        }
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be greater than zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        let Some(model_dir) = &self.model_dir else {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        };

        if !model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: model_dir.clone(),
            });
        }

        Ok(())
    }

    /// Returns the first required model file missing from `model_dir`.
    pub fn missing_model_file(&self) -> Option<PathBuf> {
        let model_dir = self.model_dir.as_ref()?;
        REQUIRED_MODEL_FILES
            .iter()
            .map(|name| model_dir.join(name))
            .find(|path| !path.is_file())
    }
}
