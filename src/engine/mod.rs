//! Speech engine abstraction
//!
//! Provides a unified interface over local TTS engines. The orchestrator only
//! talks to these traits; everything engine-specific (binary discovery, voice
//! file formats, command lines) lives in the backends.

pub mod espeak;
pub mod piper;

use crate::config::Config;
use crate::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Parameters for a single synthesis invocation
#[derive(Debug, Clone)]
pub struct SynthesisParams<'a> {
    /// Text to speak
    pub text: &'a str,
    /// Resolved speaker name, for multi-speaker models only
    pub speaker: Option<&'a str>,
    /// Speed factor, already clamped to 0.5..=1.5
    pub speed: f32,
    /// Destination WAV path
    pub output_path: &'a Path,
}

/// A text-to-speech engine
///
/// Implementations enumerate their known models and load them on demand.
/// Loading may be expensive (file parsing, capability probing) and is repeated
/// per request; no caching happens at this layer.
pub trait TtsEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &str;

    /// All model identifiers this engine knows about, unfiltered
    fn list_models(&self) -> Result<Vec<String>>;

    /// Load a model by identifier
    fn load_model(&self, model: &str) -> Result<Box<dyn LoadedModel>>;
}

/// A loaded, ready-to-synthesize model
pub trait LoadedModel: Send {
    /// Whether this model can produce more than one distinct voice
    fn supports_multiple_speakers(&self) -> bool;

    /// Speaker names, in index order; empty for single-speaker models
    fn speakers(&self) -> Vec<String>;

    /// Synthesize text to a WAV file; blocking
    fn synthesize_to_file(&self, params: &SynthesisParams) -> Result<()>;
}

/// Create the best available speech engine
///
/// Prefers Piper (higher quality, needs voice model files), falling back to
/// espeak-ng (widely packaged). Binary paths come from config (PIPER_BIN /
/// ESPEAK_BIN) or PATH lookup.
pub fn create_engine(config: &Config) -> Result<Box<dyn TtsEngine>> {
    info!("Trying Piper backend...");
    match piper::PiperEngine::new(config) {
        Ok(engine) => {
            info!("Initialized Piper backend");
            return Ok(Box::new(engine));
        }
        Err(e) => {
            info!("Piper backend unavailable: {}", e);
        }
    }

    info!("Trying espeak-ng backend...");
    match espeak::EspeakEngine::new(config) {
        Ok(engine) => {
            info!("Initialized espeak-ng backend");
            Ok(Box::new(engine))
        }
        Err(e) => Err(crate::TtsRunnerError::Synthesis(format!(
            "No speech engine available. Tried:\n\
             1. Piper (install from https://github.com/rhasspy/piper, or set PIPER_BIN)\n\
             2. espeak-ng (install: sudo apt install espeak-ng, or set ESPEAK_BIN)\n\
             Error: {}",
            e
        ))),
    }
}

/// Resolve a binary: explicit config path first, then PATH lookup
pub(crate) fn resolve_binary(configured: Option<&PathBuf>, name: &str) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.clone());
        }
        warn!(
            "Configured {} binary {:?} does not exist, falling back to PATH lookup",
            name, path
        );
    }
    find_in_path(name)
}

/// Search PATH for an executable
pub(crate) fn find_in_path(bin: &str) -> Option<PathBuf> {
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let p = PathBuf::from(bin);
        return if p.exists() { Some(p) } else { None };
    }
    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(bin);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configured_binary_falls_back_to_path_lookup() {
        let bogus = PathBuf::from("/nonexistent/piper-binary");
        // sh exists on every platform these tests run on
        let resolved = resolve_binary(Some(&bogus), "sh").expect("sh on PATH");
        assert_ne!(resolved, bogus);
        assert!(resolved.exists());
    }

    #[test]
    fn existing_configured_binary_wins_over_path() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("my-engine");
        std::fs::write(&custom, "#!/bin/sh\n").unwrap();

        let resolved = resolve_binary(Some(&custom), "sh").unwrap();
        assert_eq!(resolved, custom);
    }
}
