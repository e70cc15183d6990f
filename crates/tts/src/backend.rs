pub mod runpod;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Payload submitted to the remote executor for one speech job
///
/// Voice cloning fields travel together: either both prompt fields are
/// present or neither is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequest {
    /// Text to synthesize
    pub text: String,
    #[serde(flatten)]
    pub prompt: Option<VoicePrompt>,
}

impl JobRequest {
    pub fn new(text: impl Into<String>, prompt: Option<VoicePrompt>) -> Self {
        Self {
            text: text.into(),
            prompt,
        }
    }
}

/// Reference transcript and audio that make the executor mimic a voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoicePrompt {
    pub prompt_text: String,
    pub prompt_wav_url: String,
}

/// Identifies one submitted job on one executor endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
    pub endpoint_id: String,
}

/// Lifecycle state reported by the remote executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    /// A status string this bridge does not recognize
    Other(String),
}

impl JobStatus {
    /// Classify a raw status string
    pub fn from_remote(status: &str) -> Self {
        match status {
            "QUEUED" | "IN_QUEUE" => Self::Queued,
            "IN_PROGRESS" | "RUNNING" => Self::InProgress,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => f.write_str("QUEUED"),
            Self::InProgress => f.write_str("IN_PROGRESS"),
            Self::Completed => f.write_str("COMPLETED"),
            Self::Failed => f.write_str("FAILED"),
            Self::Other(status) => f.write_str(status),
        }
    }
}

/// Job state snapshot as returned by the executor's status endpoint
///
/// Only `status` is guaranteed; everything else depends on the job state
/// and on the worker implementation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Worker output, shape defined by the worker
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    /// Error reported for failed jobs
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    /// Queue time in milliseconds
    #[serde(default)]
    pub delay_time: Option<u64>,
    /// Execution time in milliseconds
    #[serde(default)]
    pub execution_time: Option<u64>,
}

/// Errors talking to the remote executor
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP transport or connection error
    #[error("job backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The executor answered with a non-success status
    #[error("job backend API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The executor answered with a body that could not be understood
    #[error("invalid job backend response: {0}")]
    InvalidResponse(String),
}

/// Remote asynchronous job API
///
/// Implementations must not block the calling task; the poller awaits every
/// call cooperatively.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Queue a job and return its handle
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, BackendError>;

    /// Fetch the current status of a job
    async fn status(&self, handle: &JobHandle) -> Result<JobStatus, BackendError>;

    /// Fetch the output (or failure details) of a job
    async fn output(&self, handle: &JobHandle) -> Result<JobResult, BackendError>;

    /// Get the backend name
    fn name(&self) -> &str;
}
