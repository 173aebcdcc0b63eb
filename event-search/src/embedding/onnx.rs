//! fastembed sentence embeddings
//!
//! ONNX Runtime inference for sentence-transformers models; the default
//! paraphrase-multilingual-MiniLM-L12-v2 produces 384-dimensional vectors.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::discovery::find_model_cache_dir;
use super::provider::{EmbeddingConfig, TextEncoder};
use crate::error::{Result, SearchError};
use crate::vector::ModelIdentity;

/// Map a model identity onto a fastembed model and its dimension
pub fn resolve_model(identity: &ModelIdentity) -> Result<(EmbeddingModel, usize)> {
    let name = identity.as_str();
    let short = name.rsplit('/').next().unwrap_or(name);
    match short {
        "paraphrase-multilingual-MiniLM-L12-v2" => {
            Ok((EmbeddingModel::ParaphraseMLMiniLML12V2, 384))
        }
        "all-MiniLM-L6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        _ => Err(SearchError::model(format!(
            "Unsupported embedding model: {}",
            name
        ))),
    }
}

/// fastembed model wrapper
pub struct FastEmbedEncoder {
    model: TextEmbedding,
    dimension: usize,
}

impl FastEmbedEncoder {
    /// Load the configured model from the local cache directory,
    /// fetching the weights into it on first use.
    pub fn load(config: &EmbeddingConfig) -> Result<Self> {
        let (model_kind, dimension) = resolve_model(&config.model)?;
        let cache_dir =
            find_model_cache_dir(config.models_path.as_deref(), config.data_dir.as_deref())?;

        log::info!(
            "Loading {} from: {}",
            config.model,
            cache_dir.display()
        );

        let options = InitOptions::new(model_kind)
            .with_cache_dir(cache_dir)
            .with_max_length(config.max_length)
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| SearchError::model(format!("Failed to load {}: {}", config.model, e)))?;

        log::info!(
            "Loaded {} ({}d, max {} tokens)",
            config.model,
            dimension,
            config.max_length
        );

        Ok(Self { model, dimension })
    }
}

impl TextEncoder for FastEmbedEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self
            .model
            .embed(vec![text], None)
            .map_err(|e| SearchError::embedding(format!("Failed to encode text: {}", e)))?;

        embeddings
            .pop()
            .ok_or_else(|| SearchError::embedding("Model returned no embedding"))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
