//! Model path discovery utilities
//!
//! Finds the directory holding the ONNX weights across installation
//! scenarios.

use crate::error::{Result, SearchError};
use std::path::{Path, PathBuf};

/// Environment variable overriding every other model location
pub const MODELS_PATH_ENV: &str = "EVENT_SEARCH_MODELS_PATH";

/// Find the model cache directory with priority:
/// 1. EVENT_SEARCH_MODELS_PATH environment variable
/// 2. Explicitly configured path (created if missing)
/// 3. Bundled next to the data directory (`<data_dir>/models`)
/// 4. User home directory (~/.event-search/models), created if missing
///
/// Weights are fetched into the returned directory once, on the first
/// model load; later loads read them from disk.
pub fn find_model_cache_dir(configured: Option<&Path>, data_dir: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: explicit override
    if let Ok(models_path) = std::env::var(MODELS_PATH_ENV) {
        let path = PathBuf::from(&models_path);
        if path.is_dir() {
            log::info!("Using {}: {}", MODELS_PATH_ENV, path.display());
            return Ok(path);
        }
        log::warn!(
            "{} set but directory not found: {}",
            MODELS_PATH_ENV,
            models_path
        );
    }

    // Priority 2: configured path
    if let Some(path) = configured {
        std::fs::create_dir_all(path)?;
        log::info!("Using configured model directory: {}", path.display());
        return Ok(path.to_path_buf());
    }

    // Priority 3: bundled with the data directory
    if let Some(data_dir) = data_dir {
        let bundled = data_dir.join("models");
        if bundled.is_dir() {
            log::info!("Using bundled model directory: {}", bundled.display());
            return Ok(bundled);
        }
    }

    // Priority 4: user home directory
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .ok_or_else(|| {
            SearchError::invalid_path(format!(
                "No model directory found. Set {} or configure a models path.",
                MODELS_PATH_ENV
            ))
        })?;
    let user_path = PathBuf::from(home).join(".event-search").join("models");
    std::fs::create_dir_all(&user_path)?;
    log::info!("Using user model directory: {}", user_path.display());
    Ok(user_path)
}
