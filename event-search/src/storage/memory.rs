//! In-process event store

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{
    order_candidates, order_for_backfill, CandidateFilter, EmbeddingSelection, EventStore,
};
use crate::error::{Result, SearchError};
use crate::event::{EventCandidate, EventId, EventRecord};
use crate::vector::{EmbeddingVector, ModelIdentity};

/// Event store kept entirely in memory
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<EventId, EventRecord>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `events`
    pub fn with_events(events: impl IntoIterator<Item = EventRecord>) -> Result<Self> {
        let store = Self::new();
        for event in events {
            store.put(event)?;
        }
        Ok(store)
    }
}

impl EventStore for InMemoryEventStore {
    fn put(&self, mut event: EventRecord) -> Result<EventId> {
        let id = event.id;
        let mut events = self.events.write();
        if let Some(previous) = events.get(&id) {
            event.inherit_embedding(previous);
        }
        events.insert(id, event);
        Ok(id)
    }

    fn get(&self, id: &EventId) -> Result<Option<EventRecord>> {
        Ok(self.events.read().get(id).cloned())
    }

    fn select_for_embedding(&self, selection: &EmbeddingSelection) -> Result<Vec<EventRecord>> {
        let selected = self
            .events
            .read()
            .values()
            .filter(|e| selection.matches(e))
            .cloned()
            .collect();
        Ok(order_for_backfill(selected, selection.limit))
    }

    fn write_embedding(
        &self,
        id: &EventId,
        source_text: &str,
        vector: EmbeddingVector,
        model: &ModelIdentity,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut events = self.events.write();
        let event = events
            .get_mut(id)
            .ok_or_else(|| SearchError::not_found(id.to_string()))?;
        if event.canonical_text() != source_text {
            return Err(SearchError::text_changed(id.to_string()));
        }
        event.set_embedding(vector, model.clone(), updated_at);
        Ok(())
    }

    fn embedded_candidates(&self, filter: &CandidateFilter) -> Result<Vec<EventCandidate>> {
        let candidates = self
            .events
            .read()
            .values()
            .filter(|e| filter.matches(e))
            .map(EventCandidate::from)
            .collect();
        Ok(order_candidates(candidates))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.events.read().len())
    }
}
