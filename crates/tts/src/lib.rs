#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
pub mod codec;
mod error;
mod http_client;
pub mod job;
mod request;
mod server;
mod types;
pub mod voice;

use std::sync::Arc;

use axum::{Router, extract::State, routing::post};

pub use error::{Result, TtsError};
pub use server::{Server, TtsServerBuilder};
pub use types::{AudioFormat, SpeechRequest, SpeechResponse};
use request::ExtractPayload;

/// Build the TTS server from configuration
pub fn build_server(config: &apibridge_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TtsServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for TTS
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/v1/audio/speech", post(synthesize))
}

/// Handle speech synthesis requests
async fn synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<SpeechRequest>,
) -> Result<SpeechResponse> {
    tracing::info!(
        "Received speech request: {}",
        request.input.chars().take(100).collect::<String>()
    );

    server.synthesize(request).await.inspect_err(|e| {
        tracing::error!(code = e.code(), "Speech request failed: {e}");
    })
}
