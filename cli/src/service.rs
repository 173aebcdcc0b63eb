//! Search service wiring
//!
//! Owns the event store and the shared embedding provider, and runs the
//! blocking search and backfill calls off the async runtime.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use event_search::{
    BackfillOptions, BackfillOrchestrator, BackfillReport, EmbeddingConfig, EmbeddingProvider,
    EventRecord, EventSearch, EventStore, RocksEventStore, SearchConfig, SearchOutcome,
};

use crate::error::{CliError, CliResult};

/// Where the embedding provider comes from
enum ProviderSource {
    /// Built from configuration at initialization time
    Config(EmbeddingConfig),
    /// Supplied ready-made
    Ready(Arc<EmbeddingProvider>),
}

struct ServiceState {
    store: Arc<RocksEventStore>,
    provider: Arc<EmbeddingProvider>,
    search: Arc<EventSearch<RocksEventStore>>,
    backfill: Arc<BackfillOrchestrator<RocksEventStore>>,
}

/// Search service for the CLI
///
/// Handles initialization, event import, backfill and search.
pub struct SearchService {
    state: Arc<RwLock<Option<Arc<ServiceState>>>>,
    source: ProviderSource,
    search_config: SearchConfig,
}

impl SearchService {
    /// Create a service whose embedding model is described by `embedding`
    pub fn new(embedding: EmbeddingConfig, search_config: SearchConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(None)),
            source: ProviderSource::Config(embedding),
            search_config,
        }
    }

    /// Create a service around an existing provider
    pub fn with_provider(provider: Arc<EmbeddingProvider>, search_config: SearchConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(None)),
            source: ProviderSource::Ready(provider),
            search_config,
        }
    }

    /// Open the event store under `data_dir`.
    ///
    /// The embedding model is not loaded here; it loads on first use.
    pub async fn initialize(&self, data_dir: &Path) -> CliResult<()> {
        tracing::info!("Initializing search service in {:?}", data_dir);
        let dir = data_dir.to_path_buf();
        let store = tokio::task::spawn_blocking(move || -> CliResult<RocksEventStore> {
            std::fs::create_dir_all(&dir)?;
            Ok(RocksEventStore::open(dir.join("db"))?)
        })
        .await?
        .map_err(|e| {
            tracing::error!("Event store failed to open: {}", e);
            e
        })?;
        let store = Arc::new(store);

        let provider = match &self.source {
            ProviderSource::Config(config) => {
                let mut config = config.clone();
                config.data_dir.get_or_insert_with(|| data_dir.to_path_buf());
                Arc::new(EmbeddingProvider::new(config))
            }
            ProviderSource::Ready(provider) => provider.clone(),
        };

        let state = ServiceState {
            search: Arc::new(EventSearch::with_config(
                provider.clone(),
                store.clone(),
                self.search_config.clone(),
            )),
            backfill: Arc::new(BackfillOrchestrator::new(provider.clone(), store.clone())),
            store,
            provider,
        };

        *self.state.write().await = Some(Arc::new(state));
        tracing::info!("Search service ready");
        Ok(())
    }

    /// Check if the service is initialized
    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Store events, returning how many were written
    pub async fn import(&self, events: Vec<EventRecord>) -> CliResult<usize> {
        let state = self.get_state().await?;
        tokio::task::spawn_blocking(move || -> CliResult<usize> {
            let mut written = 0;
            for event in events {
                state.store.put(event)?;
                written += 1;
            }
            Ok(written)
        })
        .await?
    }

    /// Run one backfill pass
    pub async fn backfill(&self, options: BackfillOptions) -> CliResult<BackfillReport> {
        let state = self.get_state().await?;
        let report = tokio::task::spawn_blocking(move || state.backfill.run(&options)).await??;
        Ok(report)
    }

    /// Search events; `config` overrides the service defaults
    pub async fn search(
        &self,
        query: &str,
        only_future: bool,
        config: Option<SearchConfig>,
    ) -> CliResult<SearchOutcome> {
        let state = self.get_state().await?;
        let query = query.to_string();
        let outcome = tokio::task::spawn_blocking(move || {
            let config = config.unwrap_or_else(|| state.search.config().clone());
            state.search.search_with(&query, only_future, &config)
        })
        .await??;
        Ok(outcome)
    }

    /// Store and model statistics
    pub async fn stats(&self) -> CliResult<serde_json::Value> {
        let state = self.get_state().await?;
        let value = tokio::task::spawn_blocking(move || -> CliResult<serde_json::Value> {
            let model = state.provider.model_identity().clone();
            let stats = state.store.stats(&model)?;
            Ok(serde_json::json!({
                "model": model,
                "modelLoaded": state.provider.is_loaded(),
                "events": stats,
            }))
        })
        .await??;
        Ok(value)
    }

    async fn get_state(&self) -> CliResult<Arc<ServiceState>> {
        self.state
            .read()
            .await
            .clone()
            .ok_or(CliError::NotInitialized)
    }
}
