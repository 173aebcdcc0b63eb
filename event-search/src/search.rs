//! Semantic event search
//!
//! Request-time pipeline: embed the query, read embedded candidates from
//! storage, rank them, then drop weak matches.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::event::EventSummary;
use crate::rank::{rank, ScoredCandidate, DEFAULT_TOP_K};
use crate::storage::{CandidateFilter, EventStore};
use crate::vector::ModelIdentity;

/// Default minimum similarity a result must exceed
pub const DEFAULT_MIN_SCORE: f32 = 0.2;

/// Search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum results to return (default: 20)
    pub limit: usize,
    /// Results must score strictly above this (default: 0.2)
    pub min_score: f32,
    /// Skip candidates embedded by a different model
    pub require_matching_model: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
            require_matching_model: true,
        }
    }
}

/// One ranked event
pub type SearchHit = ScoredCandidate<EventSummary>;

/// Result of a search request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Trimmed query text
    pub query: String,
    pub only_future: bool,
    /// Matches, best first
    pub results: Vec<SearchHit>,
    /// Model used to embed the query
    pub model: ModelIdentity,
    /// Wall-clock search time; `None` when the query was blank
    pub elapsed_ms: Option<f64>,
}

impl SearchOutcome {
    pub fn total_results(&self) -> usize {
        self.results.len()
    }
}

/// Semantic search over stored events
pub struct EventSearch<S: EventStore> {
    provider: Arc<EmbeddingProvider>,
    store: Arc<S>,
    config: SearchConfig,
}

impl<S: EventStore> EventSearch<S> {
    pub fn new(provider: Arc<EmbeddingProvider>, store: Arc<S>) -> Self {
        Self::with_config(provider, store, SearchConfig::default())
    }

    pub fn with_config(provider: Arc<EmbeddingProvider>, store: Arc<S>, config: SearchConfig) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search with the configured limit and threshold
    pub fn search(&self, query: &str, only_future: bool) -> Result<SearchOutcome> {
        self.search_with(query, only_future, &self.config)
    }

    /// Search with explicit settings.
    ///
    /// A blank query returns no results without embedding anything. A
    /// failure to embed the query is returned as an error, never as an
    /// empty result.
    pub fn search_with(
        &self,
        query: &str,
        only_future: bool,
        config: &SearchConfig,
    ) -> Result<SearchOutcome> {
        let query = query.trim();
        let model = self.provider.model_identity().clone();
        if query.is_empty() {
            return Ok(SearchOutcome {
                query: String::new(),
                only_future,
                results: Vec::new(),
                model,
                elapsed_ms: None,
            });
        }

        let start = Instant::now();
        let query_vector = self.provider.embed(query)?;

        let filter = CandidateFilter {
            scheduled_after: only_future.then(Utc::now),
        };
        let candidates = self.store.embedded_candidates(&filter)?;
        let considered = candidates.len();

        let pairs = candidates
            .into_iter()
            .filter(|c| !c.embedding.is_empty())
            .filter(|c| {
                !config.require_matching_model
                    || c.embedding_model.as_ref().map_or(true, |m| *m == model)
            })
            .map(|c| (c.summary, c.embedding));

        let results: Vec<SearchHit> = rank(query_vector.as_slice(), pairs, config.limit)
            .into_iter()
            .filter(|hit| hit.score > config.min_score)
            .collect();

        let elapsed_ms = (start.elapsed().as_secs_f64() * 100_000.0).round() / 100.0;
        log::debug!(
            "Search {:?}: {} of {} candidates matched in {} ms",
            query,
            results.len(),
            considered,
            elapsed_ms
        );

        Ok(SearchOutcome {
            query: query.to_string(),
            only_future,
            results,
            model,
            elapsed_ms: Some(elapsed_ms),
        })
    }
}
