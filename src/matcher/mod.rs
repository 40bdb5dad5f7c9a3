//! Semantic project matching.
//!
//! [`ProjectMatcher`] owns the published [`VectorTable`] and answers two
//! queries against it:
//!
//! - [`search`](ProjectMatcher::search): rank candidates by cosine similarity
//!   to an encoded free-text query.
//! - [`similar`](ProjectMatcher::similar): rank candidates by cosine
//!   similarity to a stored item's vector.
//!
//! Neither query fails. When the encoder is unavailable or nothing has been
//! encoded yet, `search` passes the candidates through unscored and `similar`
//! returns an empty ranking.

pub mod types;


pub use types::{
    EncodeOutcome, MatcherState, Ranking, ScoreKind, ScoredItem, SearchOutcome, SkipReason,
};

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::{CacheLookup, EmbeddingCache, SaveOutcome};
use crate::constants::validate_embedding_dim;
use crate::dataset::{CorpusItem, ensure_unique_ids};
use crate::embedding::EncoderHandle;
use crate::vectors::VectorTable;

/// Encode-or-load orchestration plus query serving.
///
/// `Send + Sync`; share one instance behind an `Arc`.
pub struct ProjectMatcher {
    encoder: EncoderHandle,
    cache: EmbeddingCache,
    table: RwLock<Option<Arc<VectorTable>>>,
    encode_lock: Mutex<()>,
}

impl std::fmt::Debug for ProjectMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectMatcher")
            .field("encoder", &self.encoder)
            .field("cache", &self.cache.path())
            .field("state", &self.state().as_str())
            .finish()
    }
}

impl ProjectMatcher {
    pub fn new(encoder: EncoderHandle, cache: EmbeddingCache) -> Self {
        if let Some(reason) = encoder.unavailable_reason() {
            warn!(reason, "Matcher created without an encoder; semantic features disabled");
        }

        Self {
            encoder,
            cache,
            table: RwLock::new(None),
            encode_lock: Mutex::new(()),
        }
    }

    pub fn encoder(&self) -> &EncoderHandle {
        &self.encoder
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn state(&self) -> MatcherState {
        if let Some(reason) = self.encoder.unavailable_reason() {
            return MatcherState::Unavailable {
                reason: reason.to_string(),
            };
        }

        match self.current_table() {
            Some(table) => MatcherState::Ready(table),
            None => MatcherState::Stale,
        }
    }

    fn current_table(&self) -> Option<Arc<VectorTable>> {
        self.table.read().clone()
    }

    fn publish(&self, table: Arc<VectorTable>) {
        *self.table.write() = Some(table);
    }

    /// Makes a table for exactly `items` (in order) available to queries.
    ///
    /// Reuses the published table or the on-disk cache when the id sequence
    /// matches; otherwise encodes every item in one encoder call and saves the
    /// result. Calls are serialized.
    pub fn encode_projects<T: CorpusItem>(&self, items: &[T]) -> EncodeOutcome {
        let Some(encoder) = self.encoder.encoder() else {
            return EncodeOutcome::Skipped {
                reason: SkipReason::EncoderUnavailable,
            };
        };
        if items.is_empty() {
            debug!("No projects to encode");
            return EncodeOutcome::Skipped {
                reason: SkipReason::EmptyDataset,
            };
        }

        let _guard = self.encode_lock.lock();

        let ids: Vec<&str> = items.iter().map(|item| item.item_id()).collect();

        if let Some(table) = self.current_table()
            && table.matches_ids(&ids)
        {
            debug!(count = ids.len(), "Embeddings already current");
            return EncodeOutcome::AlreadyCurrent { count: ids.len() };
        }

        if let CacheLookup::Hit(table) = self.cache.load(&ids) {
            match validate_embedding_dim(table.embedding_dim(), encoder.embedding_dim()) {
                Ok(()) => {
                    let count = table.len();
                    self.publish(Arc::new(table));
                    return EncodeOutcome::Loaded { count };
                }
                Err(e) => {
                    warn!(error = %e, "Cached embeddings do not fit the encoder; recomputing");
                }
            }
        }

        if let Err(e) = ensure_unique_ids(items) {
            error!(error = %e, "Cannot encode projects");
            return EncodeOutcome::Failed {
                reason: e.to_string(),
            };
        }

        info!(count = items.len(), "Encoding project corpus");

        let corpus: Vec<String> = items.iter().map(|item| item.corpus_text()).collect();
        let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();

        let vectors = match encoder.encode_batch(&texts) {
            Ok(vectors) => vectors,
            Err(e) => {
                error!(error = %e, "Failed to encode projects");
                return EncodeOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let owned_ids = ids.iter().map(|id| id.to_string()).collect();
        let table = match VectorTable::from_rows(owned_ids, vectors) {
            Ok(table) => Arc::new(table),
            Err(e) => {
                error!(error = %e, "Encoder output does not form a valid table");
                return EncodeOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        self.publish(Arc::clone(&table));

        let persisted = matches!(self.cache.save(&table), SaveOutcome::Written { .. });
        info!(count = table.len(), persisted, "Project embeddings ready");

        EncodeOutcome::Computed {
            count: table.len(),
            persisted,
        }
    }

    /// Ranks `candidates` by relevance to `query`.
    ///
    /// Candidates missing from the table score `0.0`. Falls back to
    /// [`SearchOutcome::Passthrough`] whenever a query vector cannot be
    /// produced.
    pub fn search<T: CorpusItem + Clone>(
        &self,
        query: &str,
        candidates: &[T],
        top_k: Option<usize>,
    ) -> SearchOutcome<T> {
        let passthrough = || SearchOutcome::Passthrough(candidates.to_vec());

        let Some(encoder) = self.encoder.encoder() else {
            return passthrough();
        };
        let Some(table) = self.current_table() else {
            debug!("Search before any embeddings were published; returning candidates unranked");
            return passthrough();
        };

        let query_vector = match encoder.encode(query) {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Failed to encode search query; returning candidates unranked");
                return passthrough();
            }
        };
        if let Err(e) = validate_embedding_dim(query_vector.len(), table.embedding_dim()) {
            warn!(error = %e, "Query vector does not fit stored embeddings; returning candidates unranked");
            return passthrough();
        }

        let scores = table.similarities(&query_vector);
        let ranking = rank(ScoreKind::Relevance, &table, &scores, candidates, None, top_k);

        debug!(
            candidates = candidates.len(),
            returned = ranking.len(),
            "Search ranked"
        );
        SearchOutcome::Ranked(ranking)
    }

    /// Ranks `candidates` by similarity to the stored vector of `target_id`.
    ///
    /// The target itself is never returned. Empty when nothing is published or
    /// `target_id` has no vector.
    pub fn similar<T: CorpusItem + Clone>(
        &self,
        target_id: &str,
        candidates: &[T],
        top_k: usize,
    ) -> Ranking<T> {
        let Some(table) = self.current_table() else {
            warn!(target_id, "Similarity lookup before any embeddings were published");
            return Ranking::empty(ScoreKind::Similarity);
        };
        let Some(target) = table.vector(target_id) else {
            warn!(target_id, "Project id not found in embeddings");
            return Ranking::empty(ScoreKind::Similarity);
        };

        let scores = table.similarities(target);
        rank(
            ScoreKind::Similarity,
            &table,
            &scores,
            candidates,
            Some(target_id),
            Some(top_k),
        )
    }
}

/// Joins per-row `scores` onto `candidates` by id and sorts descending.
/// `sort_by` is stable, so equal scores keep candidate order. Non-finite
/// scores count as `0.0`, like candidates missing from the table.
fn rank<T: CorpusItem + Clone>(
    kind: ScoreKind,
    table: &VectorTable,
    scores: &[f32],
    candidates: &[T],
    exclude: Option<&str>,
    top_k: Option<usize>,
) -> Ranking<T> {
    let mut rows: Vec<ScoredItem<T>> = candidates
        .iter()
        .filter(|item| exclude != Some(item.item_id()))
        .map(|item| ScoredItem {
            item: item.clone(),
            score: table
                .position(item.item_id())
                .and_then(|idx| scores.get(idx).copied())
                .filter(|score| score.is_finite())
                .unwrap_or(0.0),
        })
        .collect();

    rows.sort_by(|a, b| b.score.total_cmp(&a.score));

    if let Some(k) = top_k {
        rows.truncate(k);
    }

    Ranking::new(kind, rows)
}
