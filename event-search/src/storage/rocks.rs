//! RocksDB event storage
//!
//! Persistent storage for events using RocksDB with LZ4 compression.
//! Records are bincode-encoded under `event:<id>` and mirrored in a
//! DashMap read cache loaded at startup.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rocksdb::{IteratorMode, Options, DB};
use std::path::Path;
use std::sync::Arc;

use super::{
    order_candidates, order_for_backfill, CandidateFilter, EmbeddingSelection, EventStore,
};
use crate::error::{Result, SearchError};
use crate::event::{EventCandidate, EventId, EventRecord};
use crate::vector::{EmbeddingVector, ModelIdentity};

const EVENT_PREFIX: &str = "event:";

/// RocksDB-based event store
pub struct RocksEventStore {
    db: Arc<DB>,
    cache: Arc<DashMap<EventId, EventRecord>>,
}

impl RocksEventStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_max_background_jobs(2);
        opts.set_bytes_per_sync(1048576); // 1MB
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path)?;

        log::info!("RocksEventStore opened at: {}", path.display());

        let store = Self {
            db: Arc::new(db),
            cache: Arc::new(DashMap::new()),
        };

        store.load_cache()?;
        Ok(store)
    }

    /// Load existing events into cache on startup
    fn load_cache(&self) -> Result<()> {
        let mut count = 0;
        let mut skipped = 0;

        for item in self.db.iterator(IteratorMode::Start) {
            let (key, value) = item?;
            let key_str = String::from_utf8_lossy(&key);
            let Some(id) = key_str.strip_prefix(EVENT_PREFIX) else {
                continue;
            };

            // Gracefully handle deserialization errors
            match bincode::deserialize::<EventRecord>(&value) {
                Ok(event) => {
                    self.cache.insert(event.id, event);
                    count += 1;
                }
                Err(e) => {
                    log::warn!("Failed to deserialize event {}: {}. Skipping.", id, e);
                    skipped += 1;
                }
            }
        }

        if count > 0 {
            log::info!("Loaded {} events from disk", count);
        }
        if skipped > 0 {
            log::warn!("Skipped {} events due to deserialization errors", skipped);
        }
        Ok(())
    }

    fn persist(&self, event: &EventRecord) -> Result<()> {
        let key = format!("{}{}", EVENT_PREFIX, event.id);
        self.db.put(key.as_bytes(), bincode::serialize(event)?)?;
        self.db.flush()?;
        Ok(())
    }
}

impl EventStore for RocksEventStore {
    fn put(&self, mut event: EventRecord) -> Result<EventId> {
        let id = event.id;
        // The entry guard serializes this write against write_embedding
        match self.cache.entry(id) {
            Entry::Occupied(mut slot) => {
                event.inherit_embedding(slot.get());
                self.persist(&event)?;
                slot.insert(event);
            }
            Entry::Vacant(slot) => {
                self.persist(&event)?;
                slot.insert(event);
            }
        }
        Ok(id)
    }

    fn get(&self, id: &EventId) -> Result<Option<EventRecord>> {
        Ok(self.cache.get(id).map(|e| e.clone()))
    }

    fn select_for_embedding(&self, selection: &EmbeddingSelection) -> Result<Vec<EventRecord>> {
        let selected = self
            .cache
            .iter()
            .filter(|entry| selection.matches(entry.value()))
            .map(|entry| entry.value().clone())
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
        let mut current = self
            .cache
            .get_mut(id)
            .ok_or_else(|| SearchError::not_found(id.to_string()))?;
        if current.canonical_text() != source_text {
            return Err(SearchError::text_changed(id.to_string()));
        }

        let mut event = current.clone();
        event.set_embedding(vector, model.clone(), updated_at);
        self.persist(&event)?;
        *current = event;
        Ok(())
    }

    fn embedded_candidates(&self, filter: &CandidateFilter) -> Result<Vec<EventCandidate>> {
        let candidates = self
            .cache
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| EventCandidate::from(entry.value()))
            .collect();
        Ok(order_candidates(candidates))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.cache.len())
    }
}
