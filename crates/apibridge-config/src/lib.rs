#![allow(clippy::must_use_candidate)]

pub mod cors;
mod duration;
mod env;
pub mod health;
mod loader;
pub mod logging;
pub mod runpod;
pub mod server;
pub mod voices;

use serde::Deserialize;

pub use cors::*;
pub use health::*;
pub use logging::*;
pub use runpod::*;
pub use server::*;
pub use voices::*;

/// Top-level bridge configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote job executor configuration
    #[serde(default)]
    pub runpod: Option<RunpodConfig>,
    /// Voice cloning map configuration
    #[serde(default)]
    pub voices: VoicesConfig,
    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}
