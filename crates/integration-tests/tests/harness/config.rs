//! Programmatic configuration builder for integration tests

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use apibridge_config::{Config, CorsConfig, RunpodConfig, ServerConfig, VoicesConfig};
use secrecy::SecretString;
use tempfile::NamedTempFile;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
    voice_map: Option<NamedTempFile>,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults and no executor
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                voices: VoicesConfig {
                    map_path: "/nonexistent/voice_map.json".into(),
                },
                ..Config::default()
            },
            voice_map: None,
        }
    }

    /// Point the bridge at a mock executor with fast polling
    ///
    /// Ten status checks 50ms apart.
    pub fn with_runpod(mut self, base_url: &str) -> Self {
        self.config.runpod = Some(RunpodConfig {
            api_key: SecretString::from("rp-test-key"),
            endpoint_id: "test-endpoint".to_owned(),
            base_url: Some(base_url.to_owned()),
            request_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(50),
            output_timeout: Duration::from_secs(5),
            fail_on_unknown_status: false,
        });
        self
    }

    /// Fail jobs on statuses the bridge does not recognize
    pub fn failing_on_unknown_status(mut self) -> Self {
        if let Some(ref mut runpod) = self.config.runpod {
            runpod.fail_on_unknown_status = true;
        }
        self
    }

    /// Write a voice map file containing the given JSON
    pub fn with_voice_map(mut self, voices: &serde_json::Value) -> Self {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(voices.to_string().as_bytes()).unwrap();

        self.config.voices.map_path = file.path().to_path_buf();
        self.voice_map = Some(file);
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = config;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    ///
    /// The voice map is read during server startup, so the builder's temp
    /// file is kept alive by returning it alongside the config.
    pub fn build(self) -> (Config, Option<NamedTempFile>) {
        (self.config, self.voice_map)
    }
}
