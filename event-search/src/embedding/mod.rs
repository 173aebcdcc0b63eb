//! Embedding module for semantic search
//!
//! Turns free text into unit-length vectors using a multilingual
//! sentence-embedding model served by fastembed (ONNX Runtime).

mod discovery;
mod onnx;
mod provider;

pub use discovery::find_model_cache_dir;
pub use onnx::{resolve_model, FastEmbedEncoder};
pub use provider::{EmbeddingConfig, EmbeddingProvider, EncoderLoader, TextEncoder};
