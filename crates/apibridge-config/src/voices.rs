use std::path::PathBuf;

use serde::Deserialize;

/// Location of the voice cloning map
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoicesConfig {
    /// JSON file mapping voice names to prompt text and reference audio
    #[serde(default = "default_map_path")]
    pub map_path: PathBuf,
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            map_path: default_map_path(),
        }
    }
}

fn default_map_path() -> PathBuf {
    PathBuf::from("voice_map.json")
}
