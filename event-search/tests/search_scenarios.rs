//! End-to-end search scenarios over an in-memory store

use chrono::{Duration, Utc};
use std::sync::Arc;

use event_search::{
    BackfillOptions, BackfillOrchestrator, EmbeddingConfig, EmbeddingProvider, EventRecord,
    EventSearch, EventStore, InMemoryEventStore, ModelIdentity, SearchError, TextEncoder,
};

/// Bag-of-words over a small bilingual vocabulary; unknown words are ignored
struct VocabularyEncoder;

const VOCABULARY: &[&[&str]] = &[
    &["jazz"],
    &["festival"],
    &["concert", "música", "music"],
    &["fifa", "torneig", "tournament"],
    &["gaming", "videojocs"],
    &["xerrada", "talk"],
];

impl TextEncoder for VocabularyEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        let mut v = vec![0.0; VOCABULARY.len()];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            if let Some(slot) = VOCABULARY.iter().position(|words| words.contains(&token)) {
                v[slot] += 1.0;
            }
        }
        Ok(v)
    }

    fn dimension(&self) -> usize {
        VOCABULARY.len()
    }
}

fn provider() -> Arc<EmbeddingProvider> {
    Arc::new(EmbeddingProvider::from_encoder(
        ModelIdentity::new("vocabulary-test"),
        Box::new(VocabularyEncoder),
    ))
}

fn event(title: &str, description: &str, category: &str, tags: &str, days: i64) -> EventRecord {
    EventRecord::builder()
        .title(title)
        .description(description)
        .category(category)
        .tags(tags)
        .scheduled_at(Utc::now() + Duration::days(days))
        .build()
        .unwrap()
}

fn jazz(days: i64) -> EventRecord {
    event(
        "Festival de Jazz a la Plaça",
        "Concert a l'aire lliure",
        "music",
        "jazz,música",
        days,
    )
}

fn fifa(days: i64) -> EventRecord {
    event(
        "Torneig de FIFA",
        "Competició oberta de videojocs",
        "gaming",
        "fifa,esports",
        days,
    )
}

/// Store holding `events`, all embedded by a backfill pass
fn backfilled(provider: &Arc<EmbeddingProvider>, events: Vec<EventRecord>) -> Arc<InMemoryEventStore> {
    let store = Arc::new(InMemoryEventStore::with_events(events).unwrap());
    let report = BackfillOrchestrator::new(provider.clone(), store.clone())
        .run(&BackfillOptions::default())
        .unwrap();
    assert_eq!(report.errored, 0);
    store
}

#[test]
fn jazz_query_ranks_jazz_event_first() {
    let provider = provider();
    let store = backfilled(&provider, vec![fifa(5), jazz(5)]);
    let search = EventSearch::new(provider, store);

    let outcome = search.search("jazz festival", false).unwrap();
    assert!(!outcome.results.is_empty());
    assert_eq!(outcome.results[0].item.title, "Festival de Jazz a la Plaça");
    assert!(outcome.results[0].score > 0.2);
    assert!(outcome
        .results
        .iter()
        .skip(1)
        .all(|hit| hit.item.title != "Festival de Jazz a la Plaça"));
    assert_eq!(outcome.model.as_str(), "vocabulary-test");
}

#[test]
fn empty_query_returns_nothing_and_no_timing() {
    let provider = provider();
    let store = backfilled(&provider, vec![jazz(5)]);
    let search = EventSearch::new(provider, store);

    let outcome = search.search("", false).unwrap();
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.elapsed_ms, None);
}

#[test]
fn only_future_excludes_past_events() {
    let provider = provider();
    let store = backfilled(&provider, vec![jazz(-3), jazz(4)]);
    let search = EventSearch::new(provider, store);

    let everything = search.search("jazz festival", false).unwrap();
    assert_eq!(everything.total_results(), 2);

    let upcoming = search.search("jazz festival", true).unwrap();
    assert_eq!(upcoming.total_results(), 1);
    assert!(upcoming.results[0].item.scheduled_at > Utc::now());
}

#[test]
fn event_without_embedding_is_never_returned() {
    let provider = provider();
    let store = backfilled(&provider, vec![fifa(2)]);
    let unembedded = store.put(jazz(2)).unwrap();
    let search = EventSearch::new(provider, store);

    let outcome = search.search("jazz festival", false).unwrap();
    assert!(outcome.results.iter().all(|hit| hit.item.id != unembedded));
}

#[test]
fn edited_event_is_picked_up_by_next_backfill() {
    let provider = provider();
    let store = backfilled(&provider, vec![jazz(2)]);
    let backfill = BackfillOrchestrator::new(provider.clone(), store.clone());
    let search = EventSearch::new(provider, store.clone());

    let mut edited = store
        .select_for_embedding(&event_search::storage::EmbeddingSelection::all())
        .unwrap()
        .remove(0);
    edited.clear_embedding();
    edited.title = "Torneig de FIFA".to_string();
    edited.description = String::new();
    edited.category = "gaming".to_string();
    edited.tags = None;
    store.put(edited).unwrap();

    assert!(search.search("fifa", false).unwrap().results.is_empty());
    assert_eq!(backfill.run(&BackfillOptions::default()).unwrap().processed, 1);
    assert_eq!(search.search("fifa", false).unwrap().total_results(), 1);
}

#[test]
#[ignore = "requires model files"]
fn multilingual_model_matches_catalan_title() {
    let provider = Arc::new(EmbeddingProvider::new(EmbeddingConfig::default()));
    let store = backfilled(&provider, vec![jazz(5), fifa(5)]);
    let search = EventSearch::new(provider, store);

    let outcome = search.search("jazz festival", false).unwrap();
    assert_eq!(outcome.results[0].item.title, "Festival de Jazz a la Plaça");
    assert!(outcome.results[0].score > 0.2);
    if let Some(position) = outcome
        .results
        .iter()
        .position(|hit| hit.item.title == "Torneig de FIFA")
    {
        assert!(position > 0);
    }
}
