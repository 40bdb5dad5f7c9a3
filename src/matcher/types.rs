use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::vectors::VectorTable;

/// Which score a [`Ranking`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreKind {
    /// Query-to-item score from [`search`](super::ProjectMatcher::search).
    Relevance,
    /// Item-to-item score from [`similar`](super::ProjectMatcher::similar).
    Similarity,
}

impl ScoreKind {
    /// Column name the score is attached under in tabular output.
    #[inline]
    pub fn column_name(&self) -> &'static str {
        match self {
            ScoreKind::Relevance => "relevance_score",
            ScoreKind::Similarity => "similarity_score",
        }
    }
}

impl std::fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<T> {
    pub item: T,
    pub score: f32,
}

/// Rows sorted by descending score (ties keep candidate order).
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking<T> {
    kind: ScoreKind,
    rows: Vec<ScoredItem<T>>,
}

impl<T> Ranking<T> {
    /// Wraps rows that are already sorted.
    pub(crate) fn new(kind: ScoreKind, rows: Vec<ScoredItem<T>>) -> Self {
        Self { kind, rows }
    }

    pub fn empty(kind: ScoreKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }

    pub fn kind(&self) -> ScoreKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ScoredItem<T>] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredItem<T>> + '_ {
        self.rows.iter()
    }

    pub fn scores(&self) -> Vec<f32> {
        self.rows.iter().map(|row| row.score).collect()
    }

    /// Drops the scores, keeping the order.
    pub fn into_items(self) -> Vec<T> {
        self.rows.into_iter().map(|row| row.item).collect()
    }
}

impl<T: Serialize> Ranking<T> {
    /// Renders each row as a JSON object with the score under
    /// [`ScoreKind::column_name`]. Non-object rows are nested under `"item"`.
    pub fn to_json_rows(&self) -> serde_json::Result<Vec<Value>> {
        let column = self.kind.column_name();
        self.rows
            .iter()
            .map(|row| {
                let mut object = match serde_json::to_value(&row.item)? {
                    Value::Object(object) => object,
                    other => {
                        let mut object = Map::new();
                        object.insert("item".to_string(), other);
                        object
                    }
                };
                object.insert(column.to_string(), Value::from(row.score));
                Ok(Value::Object(object))
            })
            .collect()
    }
}

/// Result of [`search`](super::ProjectMatcher::search).
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T> {
    /// Semantic search unavailable; candidates returned unchanged and unscored.
    Passthrough(Vec<T>),
    Ranked(Ranking<T>),
}

impl<T> SearchOutcome<T> {
    pub fn is_ranked(&self) -> bool {
        matches!(self, SearchOutcome::Ranked(_))
    }

    pub fn len(&self) -> usize {
        match self {
            SearchOutcome::Passthrough(items) => items.len(),
            SearchOutcome::Ranked(ranking) => ranking.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ranking(&self) -> Option<&Ranking<T>> {
        match self {
            SearchOutcome::Passthrough(_) => None,
            SearchOutcome::Ranked(ranking) => Some(ranking),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            SearchOutcome::Passthrough(items) => items,
            SearchOutcome::Ranked(ranking) => ranking.into_items(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EncoderUnavailable,
    EmptyDataset,
}

/// Result of [`encode_projects`](super::ProjectMatcher::encode_projects).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EncodeOutcome {
    /// Nothing attempted; state unchanged.
    Skipped { reason: SkipReason },
    /// The published table already has this id sequence.
    AlreadyCurrent { count: usize },
    /// Adopted from the on-disk cache.
    Loaded { count: usize },
    /// Encoded from scratch. `persisted` is `false` when the cache write failed.
    Computed { count: usize, persisted: bool },
    /// Encoding failed; the previous table (if any) is still published.
    Failed { reason: String },
}

impl EncodeOutcome {
    /// `true` if a table for the requested ids is now published.
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            EncodeOutcome::AlreadyCurrent { .. }
                | EncodeOutcome::Loaded { .. }
                | EncodeOutcome::Computed { .. }
        )
    }
}

/// Snapshot of a matcher's readiness.
#[derive(Debug, Clone)]
pub enum MatcherState {
    Ready(Arc<VectorTable>),
    /// The encoder failed to load; permanent for this matcher.
    Unavailable { reason: String },
    /// Encoder loaded but no table published yet.
    Stale,
}

impl MatcherState {
    pub fn is_ready(&self) -> bool {
        matches!(self, MatcherState::Ready(_))
    }

    pub fn table(&self) -> Option<&Arc<VectorTable>> {
        match self {
            MatcherState::Ready(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatcherState::Ready(_) => "ready",
            MatcherState::Unavailable { .. } => "unavailable",
            MatcherState::Stale => "stale",
        }
    }
}
