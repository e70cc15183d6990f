use std::path::PathBuf;

use clap::Parser;

/// OpenAI-compatible text-to-speech bridge
#[derive(Debug, Parser)]
#[command(name = "apibridge", about = "OpenAI-compatible TTS API backed by a RunPod job endpoint")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "apibridge.toml", env = "APIBRIDGE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "APIBRIDGE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
