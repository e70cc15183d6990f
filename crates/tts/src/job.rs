use std::{sync::Arc, time::Duration};

use serde::Deserialize;

use crate::backend::{BackendError, JobBackend, JobHandle, JobRequest, JobStatus};

/// Timing and status policy for one poll loop
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Delay between two status checks
    pub interval: Duration,
    /// Overall budget; divided by `interval` to get the attempt count
    pub timeout: Duration,
    /// Fail on unrecognized statuses instead of waiting them out
    pub fail_on_unknown_status: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
            fail_on_unknown_status: false,
        }
    }
}

impl PollSettings {
    /// Number of status checks allowed by the budget
    ///
    /// Integer division: a remainder shorter than one interval is dropped.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.interval.as_nanos();
        if interval == 0 {
            return 0;
        }

        u32::try_from(self.timeout.as_nanos() / interval).unwrap_or(u32::MAX)
    }
}

/// Successful job output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    /// Base64 audio, possibly data-URL prefixed
    pub audio_base64: String,
    /// Language tag reported by the worker
    pub language: String,
    /// Time the worker spent executing the job
    pub execution_time: Option<Duration>,
}

/// Output shape produced by the speech worker
#[derive(Deserialize)]
struct SpeechOutput {
    #[serde(default)]
    audio_base64: String,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// Terminal failure of one speech job
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The executor did not accept the job
    #[error("failed to submit job: {0}")]
    Submission(#[source] BackendError),

    /// The job ran and reported failure
    #[error("job {job_id} failed on the remote executor")]
    RemoteFailure { job_id: String },

    /// The attempt budget ran out before a terminal status
    #[error("job {job_id} did not finish after {attempts} status checks")]
    Timeout { job_id: String, attempts: u32 },

    /// The job completed without a usable audio field
    #[error("job {job_id} completed without audio output")]
    MissingOutput { job_id: String },

    /// The job reported a status that is configured to be fatal
    #[error("job {job_id} reported unexpected status `{status}`")]
    UnexpectedStatus { job_id: String, status: String },

    /// Status or output could not be fetched
    #[error("failed to query job {job_id}: {source}")]
    StatusCheck {
        job_id: String,
        #[source]
        source: BackendError,
    },
}

impl JobError {
    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Submission(_) => "submission_failed",
            Self::RemoteFailure { .. } => "job_failed",
            Self::Timeout { .. } => "job_timeout",
            Self::MissingOutput { .. } => "missing_output",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::StatusCheck { .. } => "status_check_failed",
        }
    }
}

/// Submits speech jobs and waits for them to reach a terminal status
///
/// Each call owns its job handle; nothing is shared between calls apart from
/// the backend client. Dropping the future returned by
/// [`JobPoller::submit_and_await`] (for example when the inbound client
/// disconnects) stops polling at the next suspension point. The remote job is
/// not cancelled and runs to completion on the executor.
pub struct JobPoller {
    backend: Arc<dyn JobBackend>,
    settings: PollSettings,
}

impl JobPoller {
    pub fn new(backend: Arc<dyn JobBackend>, settings: PollSettings) -> Self {
        Self { backend, settings }
    }

    pub const fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Submit a job and poll until it completes, fails or runs out of time
    ///
    /// Only `COMPLETED` and `FAILED` end the loop early. Queued, running and
    /// (unless configured otherwise) unrecognized statuses sleep one interval
    /// and check again. Nothing is retried: every error is final.
    pub async fn submit_and_await(&self, request: &JobRequest) -> Result<AudioPayload, JobError> {
        let handle = self.backend.submit(request).await.map_err(|e| {
            tracing::error!("Failed to submit job to {}: {e}", self.backend.name());
            JobError::Submission(e)
        })?;

        tracing::info!(job_id = %handle.id, endpoint = %handle.endpoint_id, "job submitted");

        let max_attempts = self.settings.max_attempts();

        for attempt in 1..=max_attempts {
            let status = self.backend.status(&handle).await.map_err(|source| {
                tracing::error!(job_id = %handle.id, "status check failed: {source}");
                JobError::StatusCheck {
                    job_id: handle.id.clone(),
                    source,
                }
            })?;

            tracing::info!(job_id = %handle.id, %status, "job status (attempt {attempt}/{max_attempts})");

            match status {
                JobStatus::Completed => return self.collect_output(&handle).await,
                JobStatus::Failed => {
                    self.log_failure_details(&handle).await;
                    return Err(JobError::RemoteFailure { job_id: handle.id });
                }
                JobStatus::Queued | JobStatus::InProgress => {}
                JobStatus::Other(status) => {
                    tracing::warn!(job_id = %handle.id, "job has unexpected status: {status}");

                    if self.settings.fail_on_unknown_status {
                        return Err(JobError::UnexpectedStatus {
                            job_id: handle.id,
                            status,
                        });
                    }
                }
            }

            tokio::time::sleep(self.settings.interval).await;
        }

        tracing::error!(
            job_id = %handle.id,
            "job timed out after {:?} ({max_attempts} status checks)",
            self.settings.timeout
        );

        Err(JobError::Timeout {
            job_id: handle.id,
            attempts: max_attempts,
        })
    }

    async fn collect_output(&self, handle: &JobHandle) -> Result<AudioPayload, JobError> {
        let result = self
            .backend
            .output(handle)
            .await
            .map_err(|source| JobError::StatusCheck {
                job_id: handle.id.clone(),
                source,
            })?;

        let output = result
            .output
            .and_then(|value| serde_json::from_value::<SpeechOutput>(value).ok())
            .filter(|output| !output.audio_base64.is_empty());

        let Some(output) = output else {
            tracing::error!(job_id = %handle.id, "job completed but no audio data in output");
            return Err(JobError::MissingOutput {
                job_id: handle.id.clone(),
            });
        };

        let execution_time = result.execution_time.map(Duration::from_millis);

        tracing::info!(
            job_id = %handle.id,
            language = %output.language,
            execution_time_ms = result.execution_time,
            "job completed"
        );

        Ok(AudioPayload {
            audio_base64: output.audio_base64,
            language: output.language,
            execution_time,
        })
    }

    /// Best-effort diagnostics for a failed job; never changes the outcome
    async fn log_failure_details(&self, handle: &JobHandle) {
        match self.backend.output(handle).await {
            Ok(result) => tracing::error!(
                job_id = %handle.id,
                error = ?result.error,
                output = ?result.output,
                "job failed"
            ),
            Err(e) => tracing::error!(job_id = %handle.id, "job failed; could not fetch error details: {e}"),
        }
    }
}
