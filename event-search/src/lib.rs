//! Semantic Event Search
//!
//! Finds live events by meaning rather than keywords: event text and user
//! queries are embedded with a multilingual sentence-embedding model and
//! compared by cosine similarity.
//!
//! ## Features
//!
//! - **Lazy model loading** - The model loads once, on first use, even under concurrent first requests
//! - **Vector storage** - Embeddings live on the event record together with the model that made them
//! - **Backfill** - Batch job embedding events that lack a vector, tolerant of per-event failures
//! - **Top-k ranking** - Full-scan cosine ranking with a minimum score threshold
//!
//! ## Example
//!
//! ```ignore
//! use event_search::{EmbeddingConfig, EmbeddingProvider, EventSearch, RocksEventStore};
//!
//! let provider = Arc::new(EmbeddingProvider::new(EmbeddingConfig::default()));
//! let store = Arc::new(RocksEventStore::open(&db_path)?);
//!
//! BackfillOrchestrator::new(provider.clone(), store.clone()).run(&BackfillOptions::default())?;
//!
//! let outcome = EventSearch::new(provider, store).search("jazz festival", true)?;
//! for hit in &outcome.results {
//!     println!("{:.3} {}", hit.score, hit.item.title);
//! }
//! ```

pub mod backfill;
pub mod embedding;
pub mod error;
pub mod event;
pub mod rank;
pub mod search;
pub mod storage;
pub mod vector;

// Re-exports for convenience
pub use backfill::{BackfillFailure, BackfillOptions, BackfillOrchestrator, BackfillReport};
pub use embedding::{EmbeddingConfig, EmbeddingProvider, TextEncoder};
pub use error::SearchError;
pub use event::{EventCandidate, EventId, EventRecord, EventRecordBuilder, EventSummary};
pub use rank::{rank, ScoredCandidate};
pub use search::{EventSearch, SearchConfig, SearchHit, SearchOutcome};
pub use storage::{EventStore, InMemoryEventStore, RocksEventStore, StoreStats};
pub use vector::{EmbeddingVector, ModelIdentity};
