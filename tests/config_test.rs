//! Configuration loading tests
//!
//! Config is built from an injected lookup so these tests never touch the
//! real process environment.

use std::path::PathBuf;
use tts_runner::config::Config;
use tts_runner::TtsRunnerError;

#[test]
fn empty_environment_yields_defaults() {
    let config = Config::from_lookup(|_| None).unwrap();

    assert_eq!(config.default_model, "en_US-lessac-medium");
    assert_eq!(config.model_prefix, "en");
    assert_eq!(config.max_text_length, 500);
    assert_eq!(config.output_dir, PathBuf::from("output"));
    assert_eq!(config.server_name, "127.0.0.1");
    assert_eq!(config.server_port, 7860);
    assert!(!config.debug);
    assert!(!config.enable_sharing);
    assert!(config.open_browser);
    assert!(config.log_file.is_none());
}

#[test]
fn values_override_defaults() {
    let config = Config::from_lookup(|key| {
        match key {
            "DEFAULT_MODEL" => Some("en_GB-alan-low"),
            "MAX_TEXT_LENGTH" => Some("1000"),
            "OUTPUT_DIR" => Some("/tmp/speech"),
            "SERVER_PORT" => Some("8080"),
            "DEBUG" => Some("true"),
            "OPEN_BROWSER" => Some("false"),
            "LOG_FILE" => Some("runner.log"),
            _ => None,
        }
        .map(str::to_string)
    })
    .unwrap();

    assert_eq!(config.default_model, "en_GB-alan-low");
    assert_eq!(config.max_text_length, 1000);
    assert_eq!(config.output_dir, PathBuf::from("/tmp/speech"));
    assert_eq!(config.server_port, 8080);
    assert!(config.debug);
    assert!(!config.open_browser);
    assert_eq!(config.log_file, Some(PathBuf::from("runner.log")));
}

#[test]
fn malformed_max_text_length_is_a_startup_error() {
    let result = Config::from_lookup(|key| match key {
        "MAX_TEXT_LENGTH" => Some("lots".to_string()),
        _ => None,
    });
    assert!(matches!(result, Err(TtsRunnerError::Config(_))));
}

#[test]
fn malformed_port_is_a_startup_error() {
    let result = Config::from_lookup(|key| match key {
        "SERVER_PORT" => Some("99999".to_string()),
        _ => None,
    });
    assert!(matches!(result, Err(TtsRunnerError::Config(_))));
}

#[test]
fn empty_log_file_means_no_file_sink() {
    let config = Config::from_lookup(|key| match key {
        "LOG_FILE" => Some(String::new()),
        _ => None,
    })
    .unwrap();
    assert!(config.log_file.is_none());
}
