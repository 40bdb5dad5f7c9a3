//! Storage model types.

use rkyv::{Archive, Deserialize, Serialize};

use crate::vectors::{TableResult, VectorTable};

/// Embedding table persisted to disk.
///
/// Stored as `rkyv` bytes and read back through a memory map. `vectors` is
/// row-major: row `i` belongs to `ids[i]` and spans `embedding_dim` floats.
///
/// # Example
/// ```rust
/// use hopon::storage::EmbeddingRecord;
///
/// let record = EmbeddingRecord {
///     ids: vec!["a".to_string()],
///     embedding_dim: 2,
///     vectors: vec![1.0, 0.0],
/// };
/// assert!(record.is_consistent());
/// ```
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct EmbeddingRecord {
    /// Item ids in dataset order.
    pub ids: Vec<String>,
    /// Floats per row.
    pub embedding_dim: u32,
    /// Row-major vectors.
    pub vectors: Vec<f32>,
}

impl EmbeddingRecord {
    /// Snapshots a table into a record.
    pub fn from_table(table: &VectorTable) -> Self {
        Self {
            ids: table.ids().to_vec(),
            embedding_dim: table.embedding_dim() as u32,
            vectors: table.as_flat().to_vec(),
        }
    }

    /// Returns `true` if the vector buffer length agrees with `ids` and `embedding_dim`.
    pub fn is_consistent(&self) -> bool {
        self.embedding_dim > 0
            && !self.ids.is_empty()
            && self.vectors.len() == self.ids.len() * self.embedding_dim as usize
    }

    /// Rebuilds the in-memory table (re-validates ids and lengths).
    pub fn into_table(self) -> TableResult<VectorTable> {
        VectorTable::from_flat(self.ids, self.embedding_dim as usize, self.vectors)
    }
}

impl ArchivedEmbeddingRecord {
    /// Number of stored ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Compares the archived id sequence against `expected` without deserializing.
    pub fn ids_match<S: AsRef<str>>(&self, expected: &[S]) -> bool {
        self.ids.len() == expected.len()
            && self
                .ids
                .iter()
                .zip(expected)
                .all(|(stored, wanted)| stored.as_str() == wanted.as_ref())
    }

    /// Same check as [`EmbeddingRecord::is_consistent`] on the archived form.
    pub fn is_consistent(&self) -> bool {
        let dim = self.embedding_dim.to_native() as usize;
        dim > 0 && !self.ids.is_empty() && self.vectors.len() == self.ids.len() * dim
    }
}
