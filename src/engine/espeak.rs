//! espeak-ng backend
//!
//! Fallback engine using whatever voices espeak-ng ships with. All espeak
//! voices are single-speaker; model ids are the voice codes from
//! `espeak-ng --voices` (en, en-us, de, ...).
//!
//! Install: sudo apt install espeak-ng (or set ESPEAK_BIN).

use crate::config::Config;
use crate::engine::{resolve_binary, LoadedModel, SynthesisParams, TtsEngine};
use crate::{Result, TtsRunnerError};
use log::debug;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// espeak-ng baseline speaking rate in words per minute
const BASE_WPM: f32 = 175.0;

pub struct EspeakEngine {
    espeak_path: PathBuf,
}

impl EspeakEngine {
    /// Create the engine, verifying espeak-ng runs
    pub fn new(config: &Config) -> Result<Self> {
        let espeak_path = resolve_binary(config.espeak_bin.as_ref(), "espeak-ng")
            .or_else(|| crate::engine::find_in_path("espeak"))
            .ok_or_else(|| {
                TtsRunnerError::Synthesis("espeak-ng binary not found on PATH".to_string())
            })?;

        let status = Command::new(&espeak_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| TtsRunnerError::Synthesis(format!("espeak-ng not runnable: {}", e)))?;
        if !status.success() {
            return Err(TtsRunnerError::Synthesis(
                "espeak-ng --version failed".to_string(),
            ));
        }

        debug!("Found espeak-ng at {:?}", espeak_path);
        Ok(Self { espeak_path })
    }
}

impl TtsEngine for EspeakEngine {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    /// Voice codes from the Language column of `espeak-ng --voices`
    fn list_models(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.espeak_path)
            .arg("--voices")
            .output()
            .map_err(|e| TtsRunnerError::Synthesis(format!("espeak-ng --voices: {}", e)))?;
        if !output.status.success() {
            return Err(TtsRunnerError::Synthesis(format!(
                "espeak-ng --voices exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut models: Vec<String> = stdout
            .lines()
            .skip(1) // header row
            .filter_map(parse_voice_line)
            .collect();
        models.sort();
        models.dedup();
        Ok(models)
    }

    fn load_model(&self, model: &str) -> Result<Box<dyn LoadedModel>> {
        let known = self.list_models()?;
        if !known.iter().any(|m| m == model) {
            return Err(TtsRunnerError::ModelLoad(format!(
                "espeak-ng has no voice {:?}",
                model
            )));
        }
        Ok(Box::new(EspeakVoice {
            espeak_path: self.espeak_path.clone(),
            voice: model.to_string(),
        }))
    }
}

/// Extract the language code from one `--voices` table row
///
/// Rows look like: ` 5  en-gb          M  english             gb/en`
fn parse_voice_line(line: &str) -> Option<String> {
    let mut fields = line.split_whitespace();
    let _priority = fields.next()?;
    let language = fields.next()?;
    if language.is_empty() {
        None
    } else {
        Some(language.to_string())
    }
}

struct EspeakVoice {
    espeak_path: PathBuf,
    voice: String,
}

impl LoadedModel for EspeakVoice {
    fn supports_multiple_speakers(&self) -> bool {
        false
    }

    fn speakers(&self) -> Vec<String> {
        Vec::new()
    }

    fn synthesize_to_file(&self, params: &SynthesisParams) -> Result<()> {
        let wpm = (BASE_WPM * params.speed).round().clamp(80.0, 450.0) as i32;

        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("-v").arg(&self.voice);
        cmd.arg("-s").arg(wpm.to_string());
        cmd.arg("-w").arg(params.output_path);
        cmd.arg(params.text);

        debug!("Running espeak-ng: {:?}", cmd);
        let output = cmd
            .output()
            .map_err(|e| TtsRunnerError::Synthesis(format!("failed to run espeak-ng: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TtsRunnerError::Synthesis(format!(
                "espeak-ng failed: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_voice_table_rows() {
        let line = " 5  en-gb          M  english             gb/en";
        assert_eq!(parse_voice_line(line), Some("en-gb".to_string()));
    }

    #[test]
    fn skips_blank_lines() {
        assert_eq!(parse_voice_line(""), None);
        assert_eq!(parse_voice_line("   "), None);
    }

    #[test]
    fn wpm_mapping_stays_in_range() {
        for speed in [0.5_f32, 1.0, 1.5] {
            let wpm = (BASE_WPM * speed).round().clamp(80.0, 450.0) as i32;
            assert!((80..=450).contains(&wpm), "speed {} -> wpm {}", speed, wpm);
        }
    }
}
