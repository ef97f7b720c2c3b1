//! Synthesis orchestrator
//!
//! Validates a request, loads the model, resolves the speaker, derives a
//! timestamped output filename, and invokes the engine. Every failure comes
//! back as a typed error; nothing panics across this boundary.

use crate::config::Config;
use crate::engine::{SynthesisParams, TtsEngine};
use crate::{Result, TtsRunnerError};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs of non-word characters, collapsed to `_` in filenames
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("static regex"));

/// How many characters of input text make it into the filename
const EXCERPT_LEN: usize = 30;

/// Valid speed factor range
pub const SPEED_RANGE: (f32, f32) = (0.5, 1.5);

/// A single text-to-speech request from the UI
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub model: String,
    pub speaker_id: Option<usize>,
    pub speed: f32,
}

/// Successful synthesis: where the audio landed, plus a status message
#[derive(Debug)]
pub struct SynthesisOutput {
    pub path: PathBuf,
    pub message: String,
}

/// The orchestration core: validation, model loading, synthesis, file naming
pub struct Orchestrator {
    config: Arc<Config>,
    engine: Arc<dyn TtsEngine>,
}

impl Orchestrator {
    pub fn new(config: Arc<Config>, engine: Arc<dyn TtsEngine>) -> Self {
        Self { config, engine }
    }

    /// Convert text to speech and save it under the output directory
    ///
    /// The model is loaded fresh on every call; there is no session cache.
    pub fn text_to_speech(&self, request: &SynthesisRequest) -> Result<SynthesisOutput> {
        let text = request.text.as_str();

        if text.trim().is_empty() {
            warn!("Empty text input received");
            return Err(TtsRunnerError::Validation(
                "Please enter some text to convert to speech.".to_string(),
            ));
        }

        let length = text.chars().count();
        if length > self.config.max_text_length {
            warn!(
                "Text exceeds maximum length: {}/{} characters",
                length, self.config.max_text_length
            );
            return Err(TtsRunnerError::Validation(format!(
                "Text is too long. Maximum length is {} characters.",
                self.config.max_text_length
            )));
        }

        info!(
            "Starting text-to-speech conversion: model={}, speaker_id={:?}, speed={}, text_len={}",
            request.model, request.speaker_id, request.speed, length
        );

        let model = self.engine.load_model(&request.model).map_err(|e| {
            error!("Failed to load model {}: {}", request.model, e);
            e
        })?;

        // Resolve a speaker index to the model's speaker name, if applicable
        let speaker = if model.supports_multiple_speakers() {
            match request.speaker_id {
                Some(idx) => {
                    let speakers = model.speakers();
                    let name = speakers.get(idx).cloned().ok_or_else(|| {
                        TtsRunnerError::Synthesis(format!(
                            "speaker id {} out of range for model {} ({} speakers)",
                            idx,
                            request.model,
                            speakers.len()
                        ))
                    })?;
                    debug!("Resolved speaker id {} to {:?}", idx, name);
                    Some(name)
                }
                None => None,
            }
        } else {
            None
        };

        let speed = request.speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1);
        let filename = output_filename(text);
        let output_path = self.config.output_dir.join(&filename);

        let excerpt: String = text.chars().take(50).collect();
        debug!("Converting text: {:?}", excerpt);

        let params = SynthesisParams {
            text,
            speaker: speaker.as_deref(),
            speed,
            output_path: &output_path,
        };
        model.synthesize_to_file(&params).map_err(|e| {
            error!("Failed to generate speech: {} (model={})", e, request.model);
            e
        })?;

        info!("Speech generated successfully: {}", output_path.display());
        Ok(SynthesisOutput {
            path: output_path,
            message: format!("Speech generated successfully. Saved to {}", filename),
        })
    }
}

/// Derive the output filename: `YYYYMMDD_HHMMSS_<sanitized excerpt>.wav`
fn output_filename(text: &str) -> String {
    let safe_text = sanitize_excerpt(text);
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.wav", timestamp, safe_text)
}

/// Sanitize the first 30 characters of trimmed text for use in a filename
///
/// Non-word runs collapse to single underscores; leading and trailing
/// underscores are stripped. Idempotent.
pub fn sanitize_excerpt(text: &str) -> String {
    let excerpt: String = text.trim().chars().take(EXCERPT_LEN).collect();
    NON_WORD
        .replace_all(&excerpt, "_")
        .trim_matches('_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_punctuation() {
        assert_eq!(sanitize_excerpt("Hello, World!!!"), "Hello_World");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_excerpt("a - b -- c");
        assert_eq!(sanitize_excerpt(&once), once);
    }

    #[test]
    fn sanitize_truncates_to_thirty_chars() {
        let text = "a".repeat(100);
        assert_eq!(sanitize_excerpt(&text).len(), 30);
    }

    #[test]
    fn sanitize_strips_edges() {
        assert_eq!(sanitize_excerpt("  ...hello...  "), "hello");
        assert_eq!(sanitize_excerpt("!!!"), "");
    }

    #[test]
    fn filename_has_wav_extension() {
        let name = output_filename("test input");
        assert!(name.ends_with("_test_input.wav"));
        // YYYYMMDD_HHMMSS prefix
        assert_eq!(name.as_bytes()[8], b'_');
        assert!(name[..8].bytes().all(|b| b.is_ascii_digit()));
    }
}
