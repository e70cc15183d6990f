use std::path::Path;
use std::time::Duration;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the job executor credentials are missing or the
    /// polling timings cannot produce a single status check
    pub fn validate(&self) -> anyhow::Result<()> {
        let Some(ref runpod) = self.runpod else {
            anyhow::bail!("a [runpod] section with api_key and endpoint_id is required");
        };

        if runpod.api_key.expose_secret().trim().is_empty() {
            anyhow::bail!("runpod.api_key must not be empty");
        }

        if runpod.endpoint_id.trim().is_empty() {
            anyhow::bail!("runpod.endpoint_id must not be empty");
        }

        if runpod.poll_interval < Duration::from_millis(1) {
            anyhow::bail!("runpod.poll_interval must be at least 1ms");
        }

        if runpod.request_timeout < runpod.poll_interval {
            anyhow::bail!("runpod.request_timeout must be at least one poll_interval");
        }

        if self.server.cors.enabled && self.server.cors.credentials && self.server.cors.origins == crate::AnyOrArray::Any
        {
            anyhow::bail!("server.cors.credentials cannot be combined with a wildcard origin");
        }

        Ok(())
    }
}
