//! Model catalog and speaker resolution
//!
//! Both functions here are total: any engine failure is logged and turned into
//! a usable fallback so the UI always has something to show.

use crate::config::Config;
use crate::engine::TtsEngine;
use log::{debug, error, info, warn};

/// List models matching the configured namespace prefix
///
/// On engine failure, returns a single-element fallback containing the
/// configured default model; never fails.
pub fn list_available_models(engine: &dyn TtsEngine, config: &Config) -> Vec<String> {
    match engine.list_models() {
        Ok(all_models) => {
            let models: Vec<String> = all_models
                .into_iter()
                .filter(|m| m.starts_with(&config.model_prefix))
                .collect();
            info!(
                "Found {} {} models matching prefix {:?}",
                models.len(),
                engine.name(),
                config.model_prefix
            );
            if models.is_empty() {
                // An empty dropdown is useless; offer the default so the user
                // at least sees what to install
                warn!("No models found, falling back to default model");
                vec![config.default_model.clone()]
            } else {
                models
            }
        }
        Err(e) => {
            error!("Failed to list models: {}", e);
            vec![config.default_model.clone()]
        }
    }
}

/// Speaker indices for a model: `0..N` for an N-speaker model, empty otherwise
///
/// Loads the model to probe its capability, which may be expensive. On any
/// failure, logs a warning and returns an empty list; never fails.
pub fn get_speaker_ids(engine: &dyn TtsEngine, model: &str) -> Vec<usize> {
    match engine.load_model(model) {
        Ok(loaded) => {
            if loaded.supports_multiple_speakers() {
                let count = loaded.speakers().len();
                debug!("Model {} has {} speakers", model, count);
                (0..count).collect()
            } else {
                Vec::new()
            }
        }
        Err(e) => {
            warn!("Could not get speakers for model {}: {}", model, e);
            Vec::new()
        }
    }
}
