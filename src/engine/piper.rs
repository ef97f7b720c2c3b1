//! Piper backend
//!
//! Piper voices are ONNX files dropped into the models directory, each with an
//! optional `<voice>.onnx.json` sidecar describing the voice. Multi-speaker
//! voices carry `num_speakers` and a `speaker_id_map` (name -> numeric id) in
//! that sidecar; synthesis passes the numeric id via `--speaker`.
//!
//! Install: https://github.com/rhasspy/piper (or set PIPER_BIN).

use crate::config::Config;
use crate::engine::{resolve_binary, LoadedModel, SynthesisParams, TtsEngine};
use crate::{Result, TtsRunnerError};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Piper engine: a binary plus a directory of voice files
pub struct PiperEngine {
    piper_path: PathBuf,
    models_dir: PathBuf,
}

impl PiperEngine {
    /// Create the engine, verifying the piper binary is present
    pub fn new(config: &Config) -> Result<Self> {
        let piper_path = resolve_binary(config.piper_bin.as_ref(), "piper").ok_or_else(|| {
            TtsRunnerError::Synthesis("piper binary not found on PATH".to_string())
        })?;
        debug!("Found piper at {:?}", piper_path);

        Ok(Self {
            piper_path,
            models_dir: config.models_cache_dir.clone(),
        })
    }
}

impl TtsEngine for PiperEngine {
    fn name(&self) -> &str {
        "piper"
    }

    /// Model ids are the file stems of `*.onnx` voices in the models directory
    fn list_models(&self) -> Result<Vec<String>> {
        let mut models = Vec::new();
        for entry in std::fs::read_dir(&self.models_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("onnx") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    models.push(stem.to_string());
                }
            }
        }
        models.sort();
        Ok(models)
    }

    fn load_model(&self, model: &str) -> Result<Box<dyn LoadedModel>> {
        let voice_path = self.models_dir.join(format!("{}.onnx", model));
        if !voice_path.exists() {
            return Err(TtsRunnerError::ModelLoad(format!(
                "voice file not found: {}",
                voice_path.display()
            )));
        }

        // Sidecar config is optional; a voice without one is single-speaker
        let config_path = self.models_dir.join(format!("{}.onnx.json", model));
        let voice_config = if config_path.exists() {
            let raw = std::fs::read_to_string(&config_path)?;
            serde_json::from_str::<VoiceConfig>(&raw).map_err(|e| {
                TtsRunnerError::ModelLoad(format!(
                    "bad voice config {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            debug!("No voice config sidecar for {}", model);
            VoiceConfig::default()
        };

        Ok(Box::new(PiperVoice {
            piper_path: self.piper_path.clone(),
            voice_path,
            config: voice_config,
        }))
    }
}

/// Subset of Piper's voice config sidecar we care about
#[derive(Debug, Default, Deserialize)]
struct VoiceConfig {
    #[serde(default)]
    num_speakers: u32,
    #[serde(default)]
    speaker_id_map: HashMap<String, u32>,
}

/// A loaded Piper voice
struct PiperVoice {
    piper_path: PathBuf,
    voice_path: PathBuf,
    config: VoiceConfig,
}

impl PiperVoice {
    /// Speaker names ordered by their numeric id
    fn speaker_names(&self) -> Vec<String> {
        if self.config.num_speakers <= 1 {
            return Vec::new();
        }
        if self.config.speaker_id_map.is_empty() {
            // Voices without a name map still accept numeric speaker ids
            return (0..self.config.num_speakers)
                .map(|i| format!("speaker_{}", i))
                .collect();
        }
        let mut pairs: Vec<(&String, &u32)> = self.config.speaker_id_map.iter().collect();
        pairs.sort_by_key(|(_, id)| **id);
        pairs.into_iter().map(|(name, _)| name.clone()).collect()
    }

    /// Map a speaker name back to Piper's numeric id
    fn speaker_id(&self, name: &str) -> Option<u32> {
        if let Some(id) = self.config.speaker_id_map.get(name) {
            return Some(*id);
        }
        name.strip_prefix("speaker_").and_then(|n| n.parse().ok())
    }
}

impl LoadedModel for PiperVoice {
    fn supports_multiple_speakers(&self) -> bool {
        self.config.num_speakers > 1
    }

    fn speakers(&self) -> Vec<String> {
        self.speaker_names()
    }

    fn synthesize_to_file(&self, params: &SynthesisParams) -> Result<()> {
        let mut cmd = Command::new(&self.piper_path);
        cmd.arg("-m").arg(&self.voice_path);
        cmd.arg("-f").arg(params.output_path);

        // Piper scales phoneme duration, so speed inverts to length_scale
        let length_scale = (1.0 / params.speed).clamp(0.5, 2.0);
        cmd.arg("--length_scale").arg(format!("{:.2}", length_scale));

        if let Some(speaker) = params.speaker {
            match self.speaker_id(speaker) {
                Some(id) => {
                    cmd.arg("--speaker").arg(id.to_string());
                }
                None => {
                    return Err(TtsRunnerError::Synthesis(format!(
                        "unknown speaker {:?} for voice {}",
                        speaker,
                        self.voice_path.display()
                    )));
                }
            }
        }

        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::piped());

        debug!("Running piper: {:?}", cmd);
        let mut child = cmd.spawn().map_err(|e| {
            TtsRunnerError::Synthesis(format!("failed to spawn piper: {}", e))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(params.text.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("piper exited with {}: {}", output.status, stderr.trim());
            return Err(TtsRunnerError::Synthesis(format!(
                "piper failed: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice_with_map(pairs: &[(&str, u32)]) -> PiperVoice {
        PiperVoice {
            piper_path: PathBuf::from("piper"),
            voice_path: PathBuf::from("test.onnx"),
            config: VoiceConfig {
                num_speakers: pairs.len().max(1) as u32,
                speaker_id_map: pairs
                    .iter()
                    .map(|(name, id)| (name.to_string(), *id))
                    .collect(),
            },
        }
    }

    #[test]
    fn speaker_names_ordered_by_id() {
        let voice = voice_with_map(&[("carol", 2), ("alice", 0), ("bob", 1)]);
        assert_eq!(voice.speaker_names(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn single_speaker_voice_has_no_speakers() {
        let voice = voice_with_map(&[]);
        assert!(!voice.supports_multiple_speakers());
        assert!(voice.speakers().is_empty());
    }

    #[test]
    fn unnamed_speakers_fall_back_to_indices() {
        let voice = PiperVoice {
            piper_path: PathBuf::from("piper"),
            voice_path: PathBuf::from("test.onnx"),
            config: VoiceConfig {
                num_speakers: 3,
                speaker_id_map: HashMap::new(),
            },
        };
        assert_eq!(voice.speakers(), vec!["speaker_0", "speaker_1", "speaker_2"]);
        assert_eq!(voice.speaker_id("speaker_2"), Some(2));
    }
}
