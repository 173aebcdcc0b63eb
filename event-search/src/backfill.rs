//! Embedding backfill
//!
//! Walks events that lack an embedding (or all of them, when forced),
//! embeds their canonical text and writes the vector back. One event
//! failing never stops the batch; failures are collected in the report.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SearchError};
use crate::event::{EventId, EventRecord};
use crate::storage::{EmbeddingSelection, EventStore};

/// Backfill options
#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// Recompute every embedding, not only missing ones
    pub force: bool,
    /// Maximum events to process (0 = all)
    pub limit: usize,
    /// Also recompute embeddings made by a different model
    pub include_stale: bool,
    /// Log progress every N embedded events (0 = never)
    pub progress_every: usize,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            force: false,
            limit: 0,
            include_stale: false,
            progress_every: 5,
        }
    }
}

/// One event that could not be embedded or stored
#[derive(Debug, Clone, Serialize)]
pub struct BackfillFailure {
    pub event_id: EventId,
    pub kind: &'static str,
    pub message: String,
}

/// Outcome counts of a backfill run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    /// Embedded and stored
    pub processed: usize,
    /// Skipped because the canonical text was empty
    pub skipped: usize,
    /// Embedding or storage failed
    pub errored: usize,
    /// Events selected for this run
    pub total: usize,
    pub failures: Vec<BackfillFailure>,
}

/// What happened to a single event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Embedded,
    EmptyText,
}

/// Drives embedding generation over stored events
pub struct BackfillOrchestrator<S: EventStore> {
    provider: Arc<EmbeddingProvider>,
    store: Arc<S>,
}

impl<S: EventStore> BackfillOrchestrator<S> {
    pub fn new(provider: Arc<EmbeddingProvider>, store: Arc<S>) -> Self {
        Self { provider, store }
    }

    /// Run one backfill pass.
    ///
    /// Only a failure to list the events aborts the run.
    pub fn run(&self, options: &BackfillOptions) -> Result<BackfillReport> {
        let model = self.provider.model_identity().clone();
        let selection = EmbeddingSelection {
            force: options.force,
            stale_for: options.include_stale.then(|| model.clone()),
            limit: options.limit,
        };
        let events = self.store.select_for_embedding(&selection)?;

        let mut report = BackfillReport {
            total: events.len(),
            ..Default::default()
        };
        log::info!(
            "Backfilling {} events with {} (force: {})",
            report.total,
            model,
            options.force
        );

        for event in &events {
            match self.embed_event(event) {
                Ok(RefreshOutcome::Embedded) => {
                    report.processed += 1;
                    if options.progress_every > 0 && report.processed % options.progress_every == 0
                    {
                        log::info!("Processed: {}/{}", report.processed, report.total);
                    }
                }
                Ok(RefreshOutcome::EmptyText) => {
                    report.skipped += 1;
                    log::warn!("Skipped event {}: no text", event.id);
                }
                Err(e) => {
                    report.errored += 1;
                    log::error!("Error on event {}: {}: {}", event.id, e.kind(), e);
                    report.failures.push(BackfillFailure {
                        event_id: event.id,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Backfill complete: {} embedded, {} skipped, {} errors",
            report.processed,
            report.skipped,
            report.errored
        );
        Ok(report)
    }

    /// Re-embed a single event right away, e.g. after its text changed.
    /// Failures propagate to the caller.
    pub fn refresh(&self, id: &EventId) -> Result<RefreshOutcome> {
        let event = self
            .store
            .get(id)?
            .ok_or_else(|| SearchError::not_found(id.to_string()))?;
        self.embed_event(&event)
    }

    fn embed_event(&self, event: &EventRecord) -> Result<RefreshOutcome> {
        let text = event.canonical_text();
        if text.is_empty() {
            return Ok(RefreshOutcome::EmptyText);
        }

        let vector = self.provider.embed(&text)?;
        self.store.write_embedding(
            &event.id,
            &text,
            vector,
            self.provider.model_identity(),
            Utc::now(),
        )?;
        Ok(RefreshOutcome::Embedded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::TextEncoder;
    use crate::event::EventCandidate;
    use crate::storage::{CandidateFilter, InMemoryEventStore};
    use crate::vector::{EmbeddingVector, ModelIdentity};
    use chrono::{DateTime, Duration};

    /// Letter histogram; refuses texts containing "corrupte"
    struct LetterEncoder;

    impl TextEncoder for LetterEncoder {
        fn encode(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains("corrupte") {
                return Err(SearchError::embedding("unsupported input"));
            }
            let mut v = vec![0.0; 26];
            for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
            Ok(v)
        }

        fn dimension(&self) -> usize {
            26
        }
    }

    fn provider() -> Arc<EmbeddingProvider> {
        Arc::new(EmbeddingProvider::from_encoder(
            ModelIdentity::new("letters"),
            Box::new(LetterEncoder),
        ))
    }

    fn event(title: &str, minutes: i64) -> EventRecord {
        let base = DateTime::parse_from_rfc3339("2026-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        EventRecord::builder()
            .title(title)
            .category("music")
            .scheduled_at(base + Duration::days(30))
            .created_at(base + Duration::minutes(minutes))
            .build()
            .unwrap()
    }

    fn store_with(events: Vec<EventRecord>) -> Arc<InMemoryEventStore> {
        Arc::new(InMemoryEventStore::with_events(events).unwrap())
    }

    #[test]
    fn test_backfill_embeds_missing_and_is_idempotent() {
        let store = store_with(vec![event("Jazz", 0), event("Rock", 1), event("Blues", 2)]);
        let backfill = BackfillOrchestrator::new(provider(), store.clone());

        let first = backfill.run(&BackfillOptions::default()).unwrap();
        assert_eq!(first.processed, 3);
        assert_eq!(first.total, 3);
        assert_eq!(first.errored, 0);

        let embedded = store.embedded_candidates(&CandidateFilter::default()).unwrap();
        assert_eq!(embedded.len(), 3);
        for candidate in &embedded {
            assert!((candidate.embedding.norm() - 1.0).abs() < 1e-5);
            assert_eq!(
                candidate.embedding_model.as_ref().map(|m| m.as_str()),
                Some("letters")
            );
        }

        let second = backfill.run(&BackfillOptions::default()).unwrap();
        assert_eq!(second.processed, 0);
        assert_eq!(second.total, 0);
    }

    #[test]
    fn test_force_recomputes_everything() {
        let store = store_with(vec![event("Jazz", 0), event("Rock", 1)]);
        let backfill = BackfillOrchestrator::new(provider(), store.clone());
        backfill.run(&BackfillOptions::default()).unwrap();

        let before: Vec<_> = store
            .select_for_embedding(&EmbeddingSelection::all())
            .unwrap()
            .into_iter()
            .map(|e| e.embedding_updated_at)
            .collect();

        let forced = backfill
            .run(&BackfillOptions {
                force: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(forced.processed, 2);

        let after: Vec<_> = store
            .select_for_embedding(&EmbeddingSelection::all())
            .unwrap()
            .into_iter()
            .map(|e| e.embedding_updated_at)
            .collect();
        assert!(before.iter().zip(&after).all(|(b, a)| a >= b));
    }

    #[test]
    fn test_limit_takes_oldest_first() {
        let store = store_with(vec![event("C", 2), event("A", 0), event("B", 1)]);
        let backfill = BackfillOrchestrator::new(provider(), store.clone());

        let report = backfill
            .run(&BackfillOptions {
                limit: 2,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(report.processed, 2);

        let remaining = store
            .select_for_embedding(&EmbeddingSelection::missing())
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "C");
    }

    #[test]
    fn test_empty_text_and_failures_do_not_abort() {
        let mut blank = event("   ", 0);
        blank.category = String::new();
        let store = store_with(vec![
            blank,
            event("Fitxer corrupte", 1),
            event("Jazz", 2),
        ]);
        let backfill = BackfillOrchestrator::new(provider(), store.clone());

        let report = backfill.run(&BackfillOptions::default()).unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errored, 1);
        assert_eq!(report.failures[0].kind, "encoding");
        assert!(report.failures[0].message.contains("unsupported input"));
    }

    #[test]
    fn test_storage_failure_is_recorded() {
        struct ReadOnlyStore(InMemoryEventStore);

        impl EventStore for ReadOnlyStore {
            fn put(&self, event: EventRecord) -> Result<EventId> {
                self.0.put(event)
            }
            fn get(&self, id: &EventId) -> Result<Option<EventRecord>> {
                self.0.get(id)
            }
            fn select_for_embedding(
                &self,
                selection: &EmbeddingSelection,
            ) -> Result<Vec<EventRecord>> {
                self.0.select_for_embedding(selection)
            }
            fn write_embedding(
                &self,
                _id: &EventId,
                _source_text: &str,
                _vector: EmbeddingVector,
                _model: &ModelIdentity,
                _updated_at: DateTime<Utc>,
            ) -> Result<()> {
                Err(SearchError::store("read-only"))
            }
            fn embedded_candidates(
                &self,
                filter: &CandidateFilter,
            ) -> Result<Vec<EventCandidate>> {
                self.0.embedded_candidates(filter)
            }
            fn count(&self) -> Result<usize> {
                self.0.count()
            }
        }

        let inner = InMemoryEventStore::with_events(vec![event("Jazz", 0), event("Rock", 1)]).unwrap();
        let backfill = BackfillOrchestrator::new(provider(), Arc::new(ReadOnlyStore(inner)));

        let report = backfill.run(&BackfillOptions::default()).unwrap();
        assert_eq!(report.errored, 2);
        assert_eq!(report.processed, 0);
        assert!(report.failures.iter().all(|f| f.kind == "storage"));
    }

    #[test]
    fn test_include_stale() {
        let mut old = event("Jazz", 0);
        old.set_embedding(
            EmbeddingVector::normalized(vec![1.0; 26]),
            ModelIdentity::new("older-model"),
            Utc::now(),
        );
        let store = store_with(vec![old]);
        let backfill = BackfillOrchestrator::new(provider(), store.clone());

        assert_eq!(backfill.run(&BackfillOptions::default()).unwrap().total, 0);

        let report = backfill
            .run(&BackfillOptions {
                include_stale: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(store.stats(&ModelIdentity::new("letters")).unwrap().stale, 0);
    }

    #[test]
    fn test_refresh_single_event() {
        let store = store_with(vec![]);
        let id = store.put(event("Jazz", 0)).unwrap();
        let backfill = BackfillOrchestrator::new(provider(), store.clone());

        assert_eq!(backfill.refresh(&id).unwrap(), RefreshOutcome::Embedded);
        assert!(store.get(&id).unwrap().unwrap().has_embedding());

        let missing = backfill.refresh(&EventId::new()).unwrap_err();
        assert_eq!(missing.kind(), "not_found");
    }

    #[test]
    fn test_edit_during_backfill_is_not_embedded() {
        /// Edits every selected event right after handing out the snapshot
        struct EditingStore(InMemoryEventStore);

        impl EventStore for EditingStore {
            fn put(&self, event: EventRecord) -> Result<EventId> {
                self.0.put(event)
            }
            fn get(&self, id: &EventId) -> Result<Option<EventRecord>> {
                self.0.get(id)
            }
            fn select_for_embedding(
                &self,
                selection: &EmbeddingSelection,
            ) -> Result<Vec<EventRecord>> {
                let selected = self.0.select_for_embedding(selection)?;
                for event in &selected {
                    let mut edited = event.clone();
                    edited.title = format!("{} (ajornat)", event.title);
                    self.0.put(edited)?;
                }
                Ok(selected)
            }
            fn write_embedding(
                &self,
                id: &EventId,
                source_text: &str,
                vector: EmbeddingVector,
                model: &ModelIdentity,
                updated_at: DateTime<Utc>,
            ) -> Result<()> {
                self.0
                    .write_embedding(id, source_text, vector, model, updated_at)
            }
            fn embedded_candidates(
                &self,
                filter: &CandidateFilter,
            ) -> Result<Vec<EventCandidate>> {
                self.0.embedded_candidates(filter)
            }
            fn count(&self) -> Result<usize> {
                self.0.count()
            }
        }

        let inner = InMemoryEventStore::with_events(vec![event("Jazz", 0)]).unwrap();
        let store = Arc::new(EditingStore(inner));
        let backfill = BackfillOrchestrator::new(provider(), store.clone());

        let report = backfill.run(&BackfillOptions::default()).unwrap();
        assert_eq!(report.processed, 0);
        assert_eq!(report.errored, 1);
        assert_eq!(report.failures[0].kind, "text_changed");

        let remaining = store
            .0
            .select_for_embedding(&EmbeddingSelection::missing())
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Jazz (ajornat)");
    }
}
