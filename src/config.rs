//! Application configuration
//!
//! All environment-derived settings are read once at startup into a `Config`
//! that is passed by reference (or `Arc`) to every component. No other
//! settings are read from the environment elsewhere (PATH lookups for engine
//! binaries are the one exception).

use crate::{Result, TtsRunnerError};
use log::debug;
use std::path::PathBuf;

/// Fallback model used when the engine cannot be queried
pub const DEFAULT_MODEL: &str = "en_US-lessac-medium";

/// Default validation bound on input text, in characters
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 500;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 7860;

/// Application configuration, fixed at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial model selection and catalog fallback (DEFAULT_MODEL)
    pub default_model: String,

    /// Catalog namespace filter, e.g. "en" (MODEL_PREFIX)
    pub model_prefix: String,

    /// Maximum accepted input text length in characters (MAX_TEXT_LENGTH)
    pub max_text_length: usize,

    /// Where the engine's voice model files live (MODELS_CACHE_DIR)
    pub models_cache_dir: PathBuf,

    /// Where generated audio is written (OUTPUT_DIR)
    pub output_dir: PathBuf,

    /// Verbose logging with full error context (DEBUG)
    pub debug: bool,

    /// Log level filter name (LOG_LEVEL)
    pub log_level: String,

    /// Optional log file sink (LOG_FILE)
    pub log_file: Option<PathBuf>,

    /// HTTP bind host (SERVER_NAME)
    pub server_name: String,

    /// HTTP bind port (SERVER_PORT)
    pub server_port: u16,

    /// Bind 0.0.0.0 so other machines on the LAN can reach the UI (ENABLE_SHARING)
    pub enable_sharing: bool,

    /// Open the UI in the default browser after startup (OPEN_BROWSER)
    pub open_browser: bool,

    /// Explicit path to the piper binary (PIPER_BIN)
    pub piper_bin: Option<PathBuf>,

    /// Explicit path to the espeak-ng binary (ESPEAK_BIN)
    pub espeak_bin: Option<PathBuf>,
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Tests inject a fake environment here instead of mutating the real one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_text_length = match lookup("MAX_TEXT_LENGTH") {
            Some(v) => v.parse::<usize>().map_err(|_| {
                TtsRunnerError::Config(format!("MAX_TEXT_LENGTH is not a number: {:?}", v))
            })?,
            None => DEFAULT_MAX_TEXT_LENGTH,
        };

        let server_port = match lookup("SERVER_PORT") {
            Some(v) => v.parse::<u16>().map_err(|_| {
                TtsRunnerError::Config(format!("SERVER_PORT is not a valid port: {:?}", v))
            })?,
            None => DEFAULT_PORT,
        };

        let models_cache_dir = lookup("MODELS_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_models_dir);

        let config = Self {
            default_model: lookup("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_prefix: lookup("MODEL_PREFIX").unwrap_or_else(|| "en".to_string()),
            max_text_length,
            models_cache_dir,
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
            debug: parse_bool(lookup("DEBUG")),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_file: lookup("LOG_FILE").filter(|v| !v.is_empty()).map(PathBuf::from),
            server_name: lookup("SERVER_NAME").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port,
            enable_sharing: parse_bool(lookup("ENABLE_SHARING")),
            open_browser: lookup("OPEN_BROWSER").map_or(true, |v| is_truthy(&v)),
            piper_bin: lookup("PIPER_BIN").map(PathBuf::from),
            espeak_bin: lookup("ESPEAK_BIN").map(PathBuf::from),
        };

        debug!(
            "Config loaded: default_model={}, max_text_length={}, output_dir={:?}",
            config.default_model, config.max_text_length, config.output_dir
        );

        Ok(config)
    }

    /// Create directories the application writes to
    ///
    /// The output directory must exist before the first synthesis call; the
    /// models directory is created so a fresh install has somewhere to drop
    /// voice files.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::create_dir_all(&self.models_cache_dir)?;
        Ok(())
    }

    /// Effective bind host, honoring ENABLE_SHARING
    pub fn bind_host(&self) -> &str {
        if self.enable_sharing {
            "0.0.0.0"
        } else {
            &self.server_name
        }
    }
}

/// Default voices directory: platform data dir, falling back to ./models
fn default_models_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tts-runner").join("models"))
        .unwrap_or_else(|| PathBuf::from("models"))
}

fn parse_bool(value: Option<String>) -> bool {
    value.map_or(false, |v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values() {
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn sharing_overrides_bind_host() {
        let config = Config::from_lookup(|key| match key {
            "SERVER_NAME" => Some("127.0.0.1".to_string()),
            "ENABLE_SHARING" => Some("true".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind_host(), "0.0.0.0");
    }
}
