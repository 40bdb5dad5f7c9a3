use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
/// Errors raised while building a [`VectorTable`](super::VectorTable).
pub enum TableError {
    #[error("vector table cannot be empty")]
    Empty,

    #[error("embedding dimension cannot be zero")]
    ZeroDimension,

    #[error("duplicate id in vector table: {id}")]
    DuplicateId { id: String },

    #[error("row count mismatch: {ids} ids, {rows} vectors")]
    LengthMismatch { ids: usize, rows: usize },

    #[error("vector for {id} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
}

pub type TableResult<T> = Result<T, TableError>;
