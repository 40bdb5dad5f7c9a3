//! Sentence encoder (BERT + tokenizer, or a deterministic stub).
//!
//! Use [`EncoderConfig::stub`] for tests/examples without model files.

/// Encoder configuration.
pub mod config;


pub use config::{EncoderConfig, REQUIRED_MODEL_FILES};

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::{SentenceBert, l2_normalize};
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_batch_tokenizer;
use crate::vectors::normalize_in_place;

/// Turns text into fixed-dimension vectors.
///
/// `encode_batch` must return exactly one vector per input, in input order, all
/// of length [`embedding_dim`](TextEncoder::embedding_dim).
pub trait TextEncoder: Send + Sync {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.encode_batch(&[text])?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::OutputCountMismatch {
                expected: 1,
                actual: vectors.len(),
            });
        }
        Ok(vectors.swap_remove(0))
    }

    fn embedding_dim(&self) -> usize;
}

enum EncoderBackend {
    Model {
        model: SentenceBert,
        tokenizer: Arc<Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Sentence-embedding model wrapper.
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
    embedding_dim: usize,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .field("batch_size", &self.config.batch_size)
            .finish()
    }
}

impl SentenceEncoder {
    /// Loads the encoder. Blocks for the duration of the weight load.
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence encoder running in STUB mode (testing only)");
            let embedding_dim = config.embedding_dim;
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
                embedding_dim,
            });
        }

        if let Some(missing) = config.missing_model_file() {
            return Err(EmbeddingError::ModelNotFound { path: missing });
        }
        let Some(model_dir) = config.model_dir.clone() else {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        };

        let device = select_device()?;
        debug!(?device, "Selected compute device for sentence encoder");

        info!(model_dir = %model_dir.display(), "Loading sentence encoder");

        let model = SentenceBert::load(&model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        let tokenizer = load_batch_tokenizer(&model_dir, config.max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        let embedding_dim = model.hidden_size();

        info!(
            model_dir = %model_dir.display(),
            embedding_dim,
            max_seq_len = config.max_seq_len,
            batch_size = config.batch_size,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
            embedding_dim,
        })
    }

    fn encode_chunk(
        &self,
        texts: &[&str],
        model: &SentenceBert,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let batch = encodings.len();
        let seq_len = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut type_ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            type_ids.extend_from_slice(encoding.get_type_ids());
            mask.extend_from_slice(encoding.get_attention_mask());
        }

        debug!(batch, seq_len, "Encoding chunk (transformer forward pass)");

        let input_ids = Tensor::from_vec(ids, (batch, seq_len), device)?;
        let token_type_ids = Tensor::from_vec(type_ids, (batch, seq_len), device)?;
        let attention_mask = Tensor::from_vec(mask, (batch, seq_len), device)?;

        let pooled = model
            .embed(&input_ids, &token_type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Transformer forward pass failed: {}", e),
            })?;

        let pooled = if self.config.normalize {
            l2_normalize(&pooled)?
        } else {
            pooled
        };

        Ok(pooled.to_vec2::<f32>()?)
    }

    fn encode_stub(&self, text: &str) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        let mut embedding = Vec::with_capacity(self.embedding_dim);
        for _ in 0..self.embedding_dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        if self.config.normalize {
            normalize_in_place(&mut embedding);
        }
        embedding
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl TextEncoder for SentenceEncoder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let vectors = match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => {
                let mut vectors = Vec::with_capacity(texts.len());
                for chunk in texts.chunks(self.config.batch_size) {
                    vectors.extend(self.encode_chunk(chunk, model, tokenizer, device)?);
                }
                vectors
            }
            EncoderBackend::Stub => texts.iter().map(|text| self.encode_stub(text)).collect(),
        };

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::OutputCountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }

        Ok(vectors)
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}
