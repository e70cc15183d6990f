use std::{collections::HashMap, path::Path};

use serde::Deserialize;

use crate::backend::VoicePrompt;

/// Reference sample for one cloneable voice
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoiceInfo {
    /// Display name
    pub name: String,
    /// Transcript of the reference sample
    pub prompt_text: String,
    /// Location of the reference sample
    pub prompt_wav_url: String,
}

/// Voice name to reference sample lookup, read-only after startup
#[derive(Debug, Default, Deserialize)]
pub struct VoiceMap {
    #[serde(default)]
    voices: HashMap<String, VoiceInfo>,
}

impl VoiceMap {
    /// Load the map from a JSON file of the form `{"voices": {"name": {...}}}`
    ///
    /// A missing or malformed file is logged and yields an empty map, so
    /// every voice falls back to plain synthesis.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(map) => {
                tracing::info!("Loaded {} voices from {}", map.len(), path.display());
                map
            }
            Err(e) => {
                tracing::error!("Failed to load voice map from {}: {e}", path.display());
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn get(&self, voice: &str) -> Option<&VoiceInfo> {
        self.voices.get(voice)
    }

    /// Voice cloning prompt for a known voice, `None` for anything else
    pub fn prompt_for(&self, voice: &str) -> Option<VoicePrompt> {
        self.get(voice).map(|info| VoicePrompt {
            prompt_text: info.prompt_text.clone(),
            prompt_wav_url: info.prompt_wav_url.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

impl FromIterator<(String, VoiceInfo)> for VoiceMap {
    fn from_iter<I: IntoIterator<Item = (String, VoiceInfo)>>(iter: I) -> Self {
        Self {
            voices: iter.into_iter().collect(),
        }
    }
}
