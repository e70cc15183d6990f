use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Remote job executor (RunPod serverless endpoint) configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunpodConfig {
    /// API key sent as a bearer token
    pub api_key: SecretString,
    /// Serverless endpoint identifier
    pub endpoint_id: String,
    /// Base URL override (defaults to the public RunPod API)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Overall time budget for one speech job
    #[serde(default = "default_request_timeout", with = "crate::duration")]
    pub request_timeout: Duration,
    /// Delay between two status checks
    #[serde(default = "default_poll_interval", with = "crate::duration")]
    pub poll_interval: Duration,
    /// Per-request timeout for output fetches
    #[serde(default = "default_output_timeout", with = "crate::duration")]
    pub output_timeout: Duration,
    /// Fail a job as soon as it reports a status the bridge does not know,
    /// instead of polling until the time budget runs out
    #[serde(default)]
    pub fail_on_unknown_status: bool,
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(300)
}

const fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

const fn default_output_timeout() -> Duration {
    Duration::from_secs(30)
}
