//! Mock RunPod serverless endpoint for integration tests
//!
//! Replays a scripted sequence of job statuses. Once the script is
//! exhausted the last status repeats, so the output fetch that follows a
//! terminal status sees the same state.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Mock job executor with a scripted status sequence
pub struct MockRunpod {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockRunpodState>,
}

struct MockRunpodState {
    statuses: Mutex<VecDeque<String>>,
    last_status: Mutex<String>,
    output: Option<serde_json::Value>,
    reject_submission: bool,
    submissions: Mutex<Vec<serde_json::Value>>,
    authorization: Mutex<Option<String>>,
    status_count: AtomicU32,
}

impl MockRunpod {
    /// Executor that completes every job on the first status check
    pub async fn completing_with(audio_base64: &str) -> anyhow::Result<Self> {
        Self::start(
            &["COMPLETED"],
            Some(serde_json::json!({ "audio_base64": audio_base64, "language": "en" })),
        )
        .await
    }

    /// Executor that walks through `statuses`, returning `output` once completed
    pub async fn start(statuses: &[&str], output: Option<serde_json::Value>) -> anyhow::Result<Self> {
        Self::start_inner(statuses, output, false).await
    }

    /// Executor that refuses every submission with 500
    pub async fn rejecting() -> anyhow::Result<Self> {
        Self::start_inner(&["COMPLETED"], None, true).await
    }

    async fn start_inner(
        statuses: &[&str],
        output: Option<serde_json::Value>,
        reject_submission: bool,
    ) -> anyhow::Result<Self> {
        let state = Arc::new(MockRunpodState {
            statuses: Mutex::new(statuses.iter().map(|s| (*s).to_owned()).collect()),
            last_status: Mutex::new(statuses.last().copied().unwrap_or("IN_QUEUE").to_owned()),
            output,
            reject_submission,
            submissions: Mutex::new(Vec::new()),
            authorization: Mutex::new(None),
            status_count: AtomicU32::new(0),
        });

        let app = Router::new()
            .route("/v2/{endpoint}/run", routing::post(handle_run))
            .route("/v2/{endpoint}/status/{job_id}", routing::get(handle_status))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the executor
    pub fn base_url(&self) -> String {
        format!("http://{}/v2", self.addr)
    }

    /// `input` objects of all submitted jobs
    pub fn submissions(&self) -> Vec<serde_json::Value> {
        self.state.submissions.lock().unwrap().clone()
    }

    /// Authorization header of the last submission
    pub fn last_authorization(&self) -> Option<String> {
        self.state.authorization.lock().unwrap().clone()
    }

    /// Number of status requests received (status checks and output fetches)
    pub fn status_count(&self) -> u32 {
        self.state.status_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockRunpod {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_run(
    State(state): State<Arc<MockRunpodState>>,
    Path(endpoint): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    *state.authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    if state.reject_submission {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "worker pool offline" })));
    }

    let mut submissions = state.submissions.lock().unwrap();
    submissions.push(body["input"].clone());
    let id = format!("{endpoint}-job-{}", submissions.len());

    (StatusCode::OK, Json(serde_json::json!({ "id": id, "status": "IN_QUEUE" })))
}

async fn handle_status(
    State(state): State<Arc<MockRunpodState>>,
    Path((_endpoint, job_id)): Path<(String, String)>,
) -> impl IntoResponse {
    state.status_count.fetch_add(1, Ordering::Relaxed);

    let status = match state.statuses.lock().unwrap().pop_front() {
        Some(status) => {
            *state.last_status.lock().unwrap() = status.clone();
            status
        }
        None => state.last_status.lock().unwrap().clone(),
    };

    let mut body = serde_json::json!({ "id": job_id, "status": status });

    match status.as_str() {
        "COMPLETED" => {
            body["executionTime"] = serde_json::json!(842);
            if let Some(ref output) = state.output {
                body["output"] = output.clone();
            }
        }
        "FAILED" => {
            body["error"] = serde_json::json!("CUDA out of memory");
        }
        _ => {}
    }

    Json(body)
}
