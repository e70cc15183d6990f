use axum::{Json, response::IntoResponse};
use http::StatusCode;

/// Name reported by the health and info endpoints
pub const SERVICE_NAME: &str = "tts-apibridge";

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "healthy", "service": SERVICE_NAME })),
    )
}

/// Service description listing the public endpoints
pub fn service_info(health_path: Option<&str>) -> serde_json::Value {
    let mut endpoints = serde_json::json!({ "speech": "/v1/audio/speech" });

    if let Some(path) = health_path {
        endpoints["health"] = serde_json::Value::from(path);
    }

    serde_json::json!({
        "message": "TTS API Bridge",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    })
}
