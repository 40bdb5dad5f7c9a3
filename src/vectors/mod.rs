//! Ordered id → vector table used for ranking.
//!
//! [`VectorTable`] keeps ids and rows in one structure so a row can never drift
//! away from the id it was computed for. Rows are stored contiguously
//! (row-major), matching the on-disk record layout.

mod error;
pub mod similarity;


pub use error::{TableError, TableResult};
pub use similarity::{cosine_similarity, l2_norm, normalize_in_place};

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
/// Immutable table of embedding rows keyed by item id, in dataset order.
pub struct VectorTable {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
    embedding_dim: usize,
    data: Vec<f32>,
}

impl VectorTable {
    /// Builds a table from ids and one vector per id.
    pub fn from_rows(ids: Vec<String>, rows: Vec<Vec<f32>>) -> TableResult<Self> {
        if ids.len() != rows.len() {
            return Err(TableError::LengthMismatch {
                ids: ids.len(),
                rows: rows.len(),
            });
        }

        let embedding_dim = rows.first().map(Vec::len).ok_or(TableError::Empty)?;
        if embedding_dim == 0 {
            return Err(TableError::ZeroDimension);
        }

        let mut data = Vec::with_capacity(ids.len() * embedding_dim);
        for (id, row) in ids.iter().zip(rows) {
            if row.len() != embedding_dim {
                return Err(TableError::DimensionMismatch {
                    id: id.clone(),
                    expected: embedding_dim,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }

        Self::from_flat(ids, embedding_dim, data)
    }

    /// Builds a table from ids and a row-major buffer of `ids.len() * embedding_dim` floats.
    pub fn from_flat(ids: Vec<String>, embedding_dim: usize, data: Vec<f32>) -> TableResult<Self> {
        if ids.is_empty() {
            return Err(TableError::Empty);
        }
        if embedding_dim == 0 {
            return Err(TableError::ZeroDimension);
        }
        if data.len() != ids.len() * embedding_dim {
            return Err(TableError::LengthMismatch {
                ids: ids.len(),
                rows: data.len() / embedding_dim,
            });
        }

        let mut positions = HashMap::with_capacity(ids.len());
        for (idx, id) in ids.iter().enumerate() {
            if positions.insert(id.clone(), idx).is_some() {
                return Err(TableError::DuplicateId { id: id.clone() });
            }
        }

        Ok(Self {
            ids,
            positions,
            embedding_dim,
            data,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Ids in table order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Row-major vector buffer.
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Returns the row index for `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Returns the row at `idx`.
    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        if idx >= self.ids.len() {
            return None;
        }
        let start = idx * self.embedding_dim;
        Some(&self.data[start..start + self.embedding_dim])
    }

    /// Returns the stored vector for `id`.
    pub fn vector(&self, id: &str) -> Option<&[f32]> {
        self.position(id).and_then(|idx| self.row(idx))
    }

    /// Iterates `(id, vector)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> + '_ {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.data.chunks_exact(self.embedding_dim))
    }

    /// Returns `true` if `ids` equals the table's id sequence exactly (same order).
    pub fn matches_ids<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        self.ids.len() == ids.len()
            && self
                .ids
                .iter()
                .zip(ids)
                .all(|(stored, wanted)| stored == wanted.as_ref())
    }

    /// Cosine similarity of `query` against every row, in table order.
    pub fn similarities(&self, query: &[f32]) -> Vec<f32> {
        self.data
            .chunks_exact(self.embedding_dim)
            .map(|row| cosine_similarity(query, row))
            .collect()
    }
}
