//! TTS Runner - local text-to-speech web front-end
//!
//! A thin orchestration layer over local CLI speech engines (Piper, espeak-ng):
//! list available voice models, enumerate speakers for multi-speaker models,
//! synthesize text to timestamped WAV files, and serve a single-page web UI
//! that drives it all.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod server;
pub mod synthesis;

pub use error::{Result, TtsRunnerError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "tts-runner";
