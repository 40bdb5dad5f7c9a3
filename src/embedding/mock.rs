//! Rule-based mock encoder for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::encoder::TextEncoder;
use super::error::EmbeddingError;

/// Maps text to fixed vectors by substring rules and counts calls.
///
/// The first rule whose needle occurs in the text wins; unmatched text gets the
/// fallback vector (all zeros unless overridden).
pub struct MockEncoder {
    rules: Vec<(String, Vec<f32>)>,
    fallback: Vec<f32>,
    embedding_dim: usize,
    batch_calls: AtomicUsize,
    texts_encoded: AtomicUsize,
    fail: AtomicBool,
}

impl MockEncoder {
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            rules: Vec::new(),
            fallback: vec![0.0; embedding_dim],
            embedding_dim,
            batch_calls: AtomicUsize::new(0),
            texts_encoded: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    /// Adds a `needle → vector` rule. Panics if `vector` has the wrong dimension.
    pub fn with_rule(mut self, needle: impl Into<String>, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.embedding_dim, "rule vector dimension");
        self.rules.push((needle.into(), vector));
        self
    }

    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.embedding_dim, "fallback vector dimension");
        self.fallback = vector;
        self
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of `encode_batch` calls, including those made through `encode`.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Total number of texts encoded.
    pub fn texts_encoded(&self) -> usize {
        self.texts_encoded.load(Ordering::SeqCst)
    }

    fn lookup(&self, text: &str) -> Vec<f32> {
        self.rules
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, vector)| vector.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl TextEncoder for MockEncoder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock encoder configured to fail".to_string(),
            });
        }

        self.texts_encoded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|text| self.lookup(text)).collect())
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}
