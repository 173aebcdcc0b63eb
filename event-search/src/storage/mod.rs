//! Event storage
//!
//! The seam between semantic search and wherever events live. Stores
//! answer two kinds of reads: events that need an embedding (backfill) and
//! events that already have one (search candidates).

mod memory;
mod rocks;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::event::{EventCandidate, EventId, EventRecord};
use crate::vector::{EmbeddingVector, ModelIdentity};

pub use memory::InMemoryEventStore;
pub use rocks::RocksEventStore;

/// Which events a backfill pass should (re)embed
#[derive(Debug, Clone, Default)]
pub struct EmbeddingSelection {
    /// Select every event, embedded or not
    pub force: bool,
    /// Also select events embedded by a model other than this one
    pub stale_for: Option<ModelIdentity>,
    /// Maximum number of events (0 = no limit)
    pub limit: usize,
}

impl EmbeddingSelection {
    /// Every event, oldest first
    pub fn all() -> Self {
        Self {
            force: true,
            ..Default::default()
        }
    }

    /// Events without a stored vector
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        self.force
            || !record.has_embedding()
            || self
                .stale_for
                .as_ref()
                .is_some_and(|model| record.has_stale_embedding(model))
    }
}

/// Restrictions on search candidates
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    /// Only events scheduled strictly after this instant
    pub scheduled_after: Option<DateTime<Utc>>,
}

impl CandidateFilter {
    pub fn matches(&self, record: &EventRecord) -> bool {
        record.has_embedding()
            && self
                .scheduled_after
                .map_or(true, |now| record.is_upcoming(now))
    }
}

/// Embedding coverage of a store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_events: usize,
    pub embedded: usize,
    pub missing: usize,
    pub stale: usize,
}

/// Persistence operations used by backfill and search
pub trait EventStore: Send + Sync {
    /// Insert or replace an event. An unchanged canonical text keeps the
    /// stored embedding; changed text drops it.
    fn put(&self, event: EventRecord) -> Result<EventId>;

    /// Get an event by ID
    fn get(&self, id: &EventId) -> Result<Option<EventRecord>>;

    /// Events matching `selection`, ordered by creation time ascending
    fn select_for_embedding(&self, selection: &EmbeddingSelection) -> Result<Vec<EventRecord>>;

    /// Overwrite the embedding attributes of one event.
    ///
    /// `source_text` is the canonical text the vector was computed from.
    /// If the stored event's text no longer matches, nothing is written
    /// and a `TextChanged` error is returned.
    fn write_embedding(
        &self,
        id: &EventId,
        source_text: &str,
        vector: EmbeddingVector,
        model: &ModelIdentity,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Projection of every embedded event accepted by `filter`
    fn embedded_candidates(&self, filter: &CandidateFilter) -> Result<Vec<EventCandidate>>;

    /// Number of stored events
    fn count(&self) -> Result<usize>;

    /// Embedding coverage, judged against `model`
    fn stats(&self, model: &ModelIdentity) -> Result<StoreStats> {
        let events = self.select_for_embedding(&EmbeddingSelection::all())?;
        let mut stats = StoreStats {
            total_events: events.len(),
            ..Default::default()
        };
        for event in &events {
            if !event.has_embedding() {
                stats.missing += 1;
            } else {
                stats.embedded += 1;
                if event.has_stale_embedding(model) {
                    stats.stale += 1;
                }
            }
        }
        Ok(stats)
    }
}

/// Sort oldest first and apply the selection limit
fn order_for_backfill(mut events: Vec<EventRecord>, limit: usize) -> Vec<EventRecord> {
    events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    if limit > 0 {
        events.truncate(limit);
    }
    events
}

/// Candidates in a deterministic order: soonest scheduled first
fn order_candidates(mut candidates: Vec<EventCandidate>) -> Vec<EventCandidate> {
    candidates.sort_by(|a, b| {
        a.summary
            .scheduled_at
            .cmp(&b.summary.scheduled_at)
            .then(a.summary.id.cmp(&b.summary.id))
    });
    candidates
}
