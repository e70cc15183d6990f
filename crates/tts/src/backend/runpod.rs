use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::http_client::http_client;

use super::{BackendError, JobBackend, JobHandle, JobRequest, JobResult, JobStatus};

const DEFAULT_RUNPOD_API_URL: &str = "https://api.runpod.ai/v2";

/// RunPod serverless endpoint reached over its HTTP job API
pub struct RunpodBackend {
    client: Client,
    base_url: String,
    endpoint_id: String,
    api_key: SecretString,
    output_timeout: Duration,
}

impl RunpodBackend {
    pub fn new(api_key: SecretString, endpoint_id: String, base_url: Option<String>, output_timeout: Duration) -> Self {
        let client = http_client();
        let base_url = base_url
            .as_deref()
            .unwrap_or(DEFAULT_RUNPOD_API_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            client,
            base_url,
            endpoint_id,
            api_key,
            output_timeout,
        }
    }

    fn status_url(&self, handle: &JobHandle) -> String {
        format!("{}/{}/status/{}", self.base_url, handle.endpoint_id, handle.id)
    }

    async fn fetch_status(&self, handle: &JobHandle, timeout: Option<Duration>) -> Result<JobResult, BackendError> {
        let mut request = self.client.get(self.status_url(handle)).bearer_auth(self.api_key.expose_secret());

        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = ensure_success(request.send().await?).await?;

        response
            .json::<JobResult>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("malformed status body for job {}: {e}", handle.id)))
    }
}

#[derive(Serialize)]
struct RunRequest<'a> {
    input: &'a JobRequest,
}

#[derive(Deserialize)]
struct RunResponse {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

#[async_trait]
impl JobBackend for RunpodBackend {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, BackendError> {
        let url = format!("{}/{}/run", self.base_url, self.endpoint_id);

        tracing::debug!(
            "RunPod job submission: endpoint={}, input_len={}, voice_prompt={}",
            self.endpoint_id,
            request.text.len(),
            request.prompt.is_some(),
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&RunRequest { input: request })
            .send()
            .await?;

        let body = ensure_success(response)
            .await?
            .json::<RunResponse>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("malformed run response: {e}")))?;

        if body.id.is_empty() {
            return Err(BackendError::InvalidResponse("run response carried an empty job id".to_string()));
        }

        tracing::debug!(
            "RunPod accepted job {} with status {}",
            body.id,
            body.status.as_deref().unwrap_or("unknown")
        );

        Ok(JobHandle {
            id: body.id,
            endpoint_id: self.endpoint_id.clone(),
        })
    }

    async fn status(&self, handle: &JobHandle) -> Result<JobStatus, BackendError> {
        let result = self.fetch_status(handle, None).await?;

        let status = result
            .status
            .ok_or_else(|| BackendError::InvalidResponse(format!("status missing for job {}", handle.id)))?;

        Ok(JobStatus::from_remote(&status))
    }

    async fn output(&self, handle: &JobHandle) -> Result<JobResult, BackendError> {
        self.fetch_status(handle, Some(self.output_timeout)).await
    }

    fn name(&self) -> &str {
        "runpod"
    }
}

async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

    tracing::error!("RunPod API error ({status}): {message}");

    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}
