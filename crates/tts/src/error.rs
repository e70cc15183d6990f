use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{codec::DecodeError, job::JobError};

pub type Result<T> = std::result::Result<T, TtsError>;

/// TTS service errors with appropriate HTTP status codes
#[derive(Debug, Error)]
pub enum TtsError {
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body is not JSON
    #[error("Unsupported Content-Type, expected: 'Content-Type: application/json'")]
    UnsupportedMediaType,

    /// Request body exceeds the configured limit
    #[error("Request body is too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// No job executor is available to run the request
    #[error("Speech service is not initialized")]
    NotReady,

    /// The speech job did not produce audio
    #[error(transparent)]
    Job(#[from] JobError),

    /// The job produced audio that could not be decoded
    #[error(transparent)]
    InvalidAudio(#[from] DecodeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TtsError {
    /// Get the appropriate HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::Job(_) | Self::InvalidAudio(_) | Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string for the response
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::UnsupportedMediaType | Self::PayloadTooLarge(_) => "invalid_request_error",
            Self::NotReady => "service_unavailable",
            Self::Job(_) | Self::InvalidAudio(_) => "api_error",
            Self::ConfigError(_) => "internal_error",
        }
    }

    /// Machine-readable error code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::NotReady => "service_unavailable",
            Self::Job(e) => e.code(),
            Self::InvalidAudio(_) => "invalid_audio_data",
            Self::ConfigError(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    ///
    /// Backend failures are described by kind only; executor details stay
    /// in the logs.
    pub fn client_message(&self) -> String {
        match self {
            Self::Job(JobError::Submission(_)) => "Failed to submit speech job to backend service".to_string(),
            Self::Job(JobError::RemoteFailure { .. }) => "Speech generation failed on backend service".to_string(),
            Self::Job(JobError::Timeout { .. }) => "Speech generation timed out".to_string(),
            Self::Job(JobError::MissingOutput { .. }) => "Backend service returned no audio".to_string(),
            Self::Job(JobError::UnexpectedStatus { status, .. }) => {
                format!("Backend service reported unexpected job status '{status}'")
            }
            Self::Job(JobError::StatusCheck { .. }) => "Failed to check speech job status".to_string(),
            Self::InvalidAudio(_) => "Invalid audio data received from backend".to_string(),
            Self::ConfigError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error response format compatible with `OpenAI` API
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: String,
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: self.code().to_string(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}
