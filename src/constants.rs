//! Cross-cutting, shared constants.
//!
//! # Dimension Invariants
//!
//! The default embedding dimension matches the sentence model family the encoder
//! targets (MiniLM, 384 floats). The real dimension is whatever the loaded model
//! produces; use [`validate_embedding_dim`] at boundaries where vectors from
//! different sources meet (query vs. stored table, cache vs. encoder).

use std::fmt;

pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub const DEFAULT_MAX_SEQ_LEN: usize = 256;
pub const DEFAULT_ENCODE_BATCH_SIZE: usize = 32;

/// Default number of rows returned by a similar-project lookup.
pub const DEFAULT_SIMILAR_TOP_K: usize = 5;

pub const DEFAULT_CACHE_FILENAME: &str = "embeddings.rkyv";
pub const DEFAULT_CACHE_DIR: &str = "data/processed";

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILENAME: &str = "hopon.log";

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    ZeroDimension,
    DimensionMismatch { expected: usize, actual: usize },
}

impl fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension is non-zero and matches the expected one.
///
/// # Example
///
/// ```
/// use hopon::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// let query_dim = 384;
/// validate_embedding_dim(query_dim, DEFAULT_EMBEDDING_DIM).unwrap();
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual == 0 || expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_embedding_dim_mismatch() {
        assert!(validate_embedding_dim(384, 384).is_ok());
        assert_eq!(
            validate_embedding_dim(768, 384),
            Err(DimValidationError::DimensionMismatch {
                expected: 384,
                actual: 768
            })
        );
        assert_eq!(
            validate_embedding_dim(0, 384),
            Err(DimValidationError::ZeroDimension)
        );
    }

    #[test]
    fn test_error_display() {
        let err = DimValidationError::ZeroDimension;
        assert_eq!(err.to_string(), "embedding dimension cannot be zero");

        let err = DimValidationError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert!(err.to_string().contains("384"));
        assert!(err.to_string().contains("768"));
    }
}
