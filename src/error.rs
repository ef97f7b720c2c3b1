//! Error types for the TTS runner

use std::io;
use thiserror::Error;

/// Main error type for TTS runner operations
#[derive(Error, Debug)]
pub enum TtsRunnerError {
    /// User input rejected before any engine work happened
    #[error("{0}")]
    Validation(String),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for TTS runner operations
pub type Result<T> = std::result::Result<T, TtsRunnerError>;

impl From<String> for TtsRunnerError {
    fn from(s: String) -> Self {
        TtsRunnerError::Other(s)
    }
}

impl From<&str> for TtsRunnerError {
    fn from(s: &str) -> Self {
        TtsRunnerError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for TtsRunnerError {
    fn from(e: serde_json::Error) -> Self {
        TtsRunnerError::ModelLoad(format!("JSON error: {}", e))
    }
}
