use std::sync::Arc;

use apibridge_config::RunpodConfig;
use secrecy::ExposeSecret;

use crate::{
    backend::{JobBackend, JobRequest, runpod::RunpodBackend},
    codec,
    error::TtsError,
    job::{JobPoller, PollSettings},
    types::{SpeechRequest, SpeechResponse},
    voice::VoiceMap,
};

const SPEED_RANGE: std::ops::RangeInclusive<f64> = 0.25..=4.0;

/// TTS server that turns speech requests into remote jobs
pub struct Server {
    /// `None` when no job executor was configured at startup
    poller: Option<JobPoller>,
    voices: Arc<VoiceMap>,
}

impl Server {
    /// Synthesize text to speech through the remote executor
    ///
    /// Known voices are cloned from the voice map; any other voice name
    /// silently falls back to plain synthesis.
    pub async fn synthesize(&self, request: SpeechRequest) -> crate::error::Result<SpeechResponse> {
        let poller = self.poller.as_ref().ok_or(TtsError::NotReady)?;

        if request.input.trim().is_empty() {
            return Err(TtsError::InvalidRequest("input must not be empty".to_string()));
        }

        if !SPEED_RANGE.contains(&request.speed) {
            return Err(TtsError::InvalidRequest(format!(
                "speed must be between {} and {}",
                SPEED_RANGE.start(),
                SPEED_RANGE.end()
            )));
        }

        let prompt = self.voices.prompt_for(&request.voice);

        tracing::debug!(
            "Speech request: model={}, voice={}, cloned={}, format={:?}, speed={}, input_len={}",
            request.model,
            request.voice,
            prompt.is_some(),
            request.response_format,
            request.speed,
            request.input.len(),
        );

        let job = JobRequest::new(request.input, prompt);
        let payload = poller.submit_and_await(&job).await?;

        let audio = codec::decode(&payload.audio_base64)?;

        tracing::info!(
            "Returning {} bytes of audio as {}",
            audio.len(),
            request.response_format.content_type()
        );

        Ok(SpeechResponse {
            audio,
            format: request.response_format,
        })
    }

    /// Whether a job executor is available
    pub const fn is_ready(&self) -> bool {
        self.poller.is_some()
    }
}

/// Builder for constructing the TTS server from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a apibridge_config::Config,
    backend: Option<Arc<dyn JobBackend>>,
    voices: Option<VoiceMap>,
}

impl<'a> TtsServerBuilder<'a> {
    pub const fn new(config: &'a apibridge_config::Config) -> Self {
        Self {
            config,
            backend: None,
            voices: None,
        }
    }

    /// Use this backend instead of one built from `[runpod]`
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn JobBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use this voice map instead of loading `voices.map_path`
    #[must_use]
    pub fn with_voices(mut self, voices: VoiceMap) -> Self {
        self.voices = Some(voices);
        self
    }

    pub fn build(self) -> crate::error::Result<Server> {
        let voices = self
            .voices
            .unwrap_or_else(|| VoiceMap::load(&self.config.voices.map_path));

        let settings = self.config.runpod.as_ref().map_or_else(PollSettings::default, poll_settings);

        let backend = match (self.backend, &self.config.runpod) {
            (Some(backend), _) => Some(backend),
            (None, Some(runpod)) => Some(runpod_backend(runpod)?),
            (None, None) => None,
        };

        let poller = backend.map(|backend| {
            tracing::info!(
                "TTS server initialized with {} backend ({} voices, {} status checks every {:?})",
                backend.name(),
                voices.len(),
                settings.max_attempts(),
                settings.interval,
            );
            JobPoller::new(backend, settings)
        });

        if poller.is_none() {
            tracing::warn!("No job executor configured, speech requests will be rejected");
        }

        Ok(Server {
            poller,
            voices: Arc::new(voices),
        })
    }
}

fn poll_settings(config: &RunpodConfig) -> PollSettings {
    PollSettings {
        interval: config.poll_interval,
        timeout: config.request_timeout,
        fail_on_unknown_status: config.fail_on_unknown_status,
    }
}

fn runpod_backend(config: &RunpodConfig) -> crate::error::Result<Arc<dyn JobBackend>> {
    if config.api_key.expose_secret().trim().is_empty() {
        return Err(TtsError::ConfigError("RunPod API key is required".to_string()));
    }

    if config.endpoint_id.trim().is_empty() {
        return Err(TtsError::ConfigError("RunPod endpoint id is required".to_string()));
    }

    tracing::debug!("Initializing RunPod backend for endpoint: {}", config.endpoint_id);

    Ok(Arc::new(RunpodBackend::new(
        config.api_key.clone(),
        config.endpoint_id.clone(),
        config.base_url.clone(),
        config.output_timeout,
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        backend::{BackendError, JobHandle, JobResult, JobStatus},
        types::AudioFormat,
        voice::VoiceInfo,
    };

    /// Completes every job at once and records what was submitted
    #[derive(Default)]
    struct InstantBackend {
        submitted: Mutex<Vec<JobRequest>>,
        audio_base64: String,
    }

    impl InstantBackend {
        fn returning(audio_base64: &str) -> Arc<Self> {
            Arc::new(Self {
                audio_base64: audio_base64.to_owned(),
                ..Self::default()
            })
        }
    }

    #[async_trait]
    impl JobBackend for InstantBackend {
        async fn submit(&self, request: &JobRequest) -> Result<JobHandle, BackendError> {
            self.submitted.lock().unwrap().push(request.clone());
            Ok(JobHandle {
                id: "job-1".to_owned(),
                endpoint_id: "ep-1".to_owned(),
            })
        }

        async fn status(&self, _handle: &JobHandle) -> Result<JobStatus, BackendError> {
            Ok(JobStatus::Completed)
        }

        async fn output(&self, _handle: &JobHandle) -> Result<JobResult, BackendError> {
            Ok(JobResult {
                output: Some(serde_json::json!({ "audio_base64": self.audio_base64 })),
                ..JobResult::default()
            })
        }

        fn name(&self) -> &str {
            "instant"
        }
    }

    fn voices() -> VoiceMap {
        [(
            "alloy".to_owned(),
            VoiceInfo {
                name: "Alloy".to_owned(),
                prompt_text: "Reference words.".to_owned(),
                prompt_wav_url: "https://cdn.example/alloy.wav".to_owned(),
            },
        )]
        .into_iter()
        .collect()
    }

    fn server(config: &apibridge_config::Config, backend: Arc<InstantBackend>) -> Server {
        TtsServerBuilder::new(config)
            .with_backend(backend)
            .with_voices(voices())
            .build()
            .unwrap()
    }

    fn speech(input: &str, voice: &str) -> SpeechRequest {
        SpeechRequest {
            model: "tts-1".to_owned(),
            input: input.to_owned(),
            voice: voice.to_owned(),
            response_format: AudioFormat::Mp3,
            speed: 1.0,
        }
    }

    #[tokio::test]
    async fn known_voice_submits_prompt() {
        let config = apibridge_config::Config::default();
        let backend = InstantBackend::returning("aGVsbG8=");
        let server = server(&config, Arc::clone(&backend));

        let response = server.synthesize(speech("hello", "alloy")).await.unwrap();

        assert_eq!(response.audio, b"hello");

        let submitted = backend.submitted.lock().unwrap();
        let prompt = submitted[0].prompt.as_ref().unwrap();
        assert_eq!(prompt.prompt_text, "Reference words.");
        assert_eq!(prompt.prompt_wav_url, "https://cdn.example/alloy.wav");
    }

    #[tokio::test]
    async fn unknown_voice_submits_plain_text() {
        let config = apibridge_config::Config::default();
        let backend = InstantBackend::returning("aGVsbG8=");
        let server = server(&config, Arc::clone(&backend));

        server.synthesize(speech("hello", "nova")).await.unwrap();

        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted[0], JobRequest::new("hello", None));
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_submission() {
        let config = apibridge_config::Config::default();
        let backend = InstantBackend::returning("aGVsbG8=");
        let server = server(&config, Arc::clone(&backend));

        let err = server.synthesize(speech("   ", "alloy")).await.unwrap_err();

        assert!(matches!(err, TtsError::InvalidRequest(_)));
        assert!(backend.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_speed_is_rejected() {
        let config = apibridge_config::Config::default();
        let server = server(&config, InstantBackend::returning("aGVsbG8="));

        let mut request = speech("hello", "alloy");
        request.speed = 5.0;

        assert!(matches!(
            server.synthesize(request).await,
            Err(TtsError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn undecodable_audio_is_invalid_audio() {
        let config = apibridge_config::Config::default();
        let server = server(&config, InstantBackend::returning("%%%"));

        let err = server.synthesize(speech("hello", "alloy")).await.unwrap_err();

        assert!(matches!(err, TtsError::InvalidAudio(_)));
        assert_eq!(err.code(), "invalid_audio_data");
    }

    #[tokio::test]
    async fn missing_executor_is_not_ready() {
        let config = apibridge_config::Config::default();
        let server = TtsServerBuilder::new(&config).with_voices(voices()).build().unwrap();

        assert!(!server.is_ready());

        let err = server.synthesize(speech("hello", "alloy")).await.unwrap_err();
        assert!(matches!(err, TtsError::NotReady));
    }
}
