use crate::vectors::VectorTable;

/// Result of [`EmbeddingCache::load`](super::EmbeddingCache::load).
#[derive(Debug)]
pub enum CacheLookup {
    /// The stored id sequence equals the requested one.
    Hit(VectorTable),
    Miss(MissReason),
}

impl CacheLookup {
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    /// Returns the table on a hit.
    pub fn into_table(self) -> Option<VectorTable> {
        match self {
            CacheLookup::Hit(table) => Some(table),
            CacheLookup::Miss(_) => None,
        }
    }
}

/// Why a lookup missed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No record on disk.
    Absent,
    /// The record could not be read or failed validation.
    Corrupt(String),
    /// The record is valid but was built for a different id sequence.
    Stale {
        cached_len: usize,
        expected_len: usize,
    },
}

impl MissReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissReason::Absent => "absent",
            MissReason::Corrupt(_) => "corrupt",
            MissReason::Stale { .. } => "stale",
        }
    }
}

impl std::fmt::Display for MissReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissReason::Absent => write!(f, "no cache record"),
            MissReason::Corrupt(reason) => write!(f, "corrupt cache record: {}", reason),
            MissReason::Stale {
                cached_len,
                expected_len,
            } => write!(
                f,
                "cache built for a different dataset ({} cached ids, {} requested)",
                cached_len, expected_len
            ),
        }
    }
}

/// Result of [`EmbeddingCache::save`](super::EmbeddingCache::save). Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { bytes: u64 },
    Failed { reason: String },
}

impl SaveOutcome {
    #[inline]
    pub fn is_written(&self) -> bool {
        matches!(self, SaveOutcome::Written { .. })
    }
}

/// Summary of the record currently on disk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheInfo {
    pub items: usize,
    pub embedding_dim: usize,
    pub bytes: u64,
}
