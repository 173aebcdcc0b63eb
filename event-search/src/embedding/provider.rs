//! Embedding provider
//!
//! Owns the embedding model for the lifetime of the process. The model is
//! loaded on first use, exactly once, no matter how many threads race
//! for it; afterwards every caller shares it read-only.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use super::onnx::FastEmbedEncoder;
use crate::error::{Result, SearchError};
use crate::vector::{EmbeddingVector, ModelIdentity};

/// A loaded model able to turn text into a raw vector
pub trait TextEncoder: Send + Sync {
    /// Encode one non-empty text
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this encoder produces
    fn dimension(&self) -> usize;
}

/// Deferred model constructor, run at most once per successful load
pub type EncoderLoader = Box<dyn Fn() -> Result<Box<dyn TextEncoder>> + Send + Sync>;

/// Embedding configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Model to load (default: paraphrase-multilingual-MiniLM-L12-v2)
    pub model: ModelIdentity,
    /// Directory holding the model weights
    pub models_path: Option<PathBuf>,
    /// Data directory searched for bundled weights
    pub data_dir: Option<PathBuf>,
    /// Maximum sequence length in tokens (default: 128)
    pub max_length: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: ModelIdentity::default(),
            models_path: None,
            data_dir: None,
            max_length: 128,
        }
    }
}

/// Lazily loaded, shared embedding model
pub struct EmbeddingProvider {
    identity: ModelIdentity,
    loader: EncoderLoader,
    model: OnceLock<Box<dyn TextEncoder>>,
    load_lock: Mutex<()>,
    loads: AtomicUsize,
}

impl EmbeddingProvider {
    /// Provider backed by fastembed, loaded on first `embed`
    pub fn new(config: EmbeddingConfig) -> Self {
        let identity = config.model.clone();
        Self::with_loader(
            identity,
            Box::new(move || {
                FastEmbedEncoder::load(&config).map(|e| Box::new(e) as Box<dyn TextEncoder>)
            }),
        )
    }

    /// Provider with a custom deferred loader
    pub fn with_loader(identity: ModelIdentity, loader: EncoderLoader) -> Self {
        Self {
            identity,
            loader,
            model: OnceLock::new(),
            load_lock: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Provider around an already loaded encoder
    pub fn from_encoder(identity: ModelIdentity, encoder: Box<dyn TextEncoder>) -> Self {
        let provider = Self::with_loader(
            identity,
            Box::new(|| Err(SearchError::model("encoder was supplied pre-loaded"))),
        );
        let _ = provider.model.set(encoder);
        provider
    }

    /// Load the model if it is not loaded yet.
    ///
    /// Double-checked: the fast path reads the cell without locking; the
    /// slow path takes the lock and checks again before loading. A failed
    /// load leaves the cell empty so a later call can retry.
    pub fn load(&self) -> Result<&dyn TextEncoder> {
        if let Some(model) = self.model.get() {
            return Ok(model.as_ref());
        }

        let _guard = self.load_lock.lock();
        if let Some(model) = self.model.get() {
            return Ok(model.as_ref());
        }

        log::info!("Loading embedding model: {}", self.identity);
        let encoder = (self.loader)().map_err(|e| {
            log::error!("Embedding model {} failed to load: {}", self.identity, e);
            e
        })?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        log::info!(
            "Embedding model ready: {} ({}d)",
            self.identity,
            encoder.dimension()
        );

        Ok(self.model.get_or_init(|| encoder).as_ref())
    }

    /// Embed a text as a unit-length vector.
    ///
    /// Blank text yields the empty vector without touching the model.
    pub fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(EmbeddingVector::empty());
        }

        let model = self.load()?;
        let raw = model.encode(text)?;
        if raw.len() != model.dimension() {
            return Err(SearchError::embedding(format!(
                "expected {} dimensions, model returned {}",
                model.dimension(),
                raw.len()
            )));
        }

        Ok(EmbeddingVector::normalized(raw))
    }

    /// Name of the configured model. Never loads it.
    pub fn model_identity(&self) -> &ModelIdentity {
        &self.identity
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Number of successful model loads (0 or 1)
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Vector length, once the model is loaded
    pub fn dimension(&self) -> Option<usize> {
        self.model.get().map(|m| m.dimension())
    }
}
