use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file and hands it to [`Config::from_toml`]. Validation is
    /// left to the caller so command line overrides can be applied first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a referenced environment
    /// variable is missing, or TOML parsing fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Expand `{{ env.VAR }}` placeholders and deserialize
    ///
    /// # Errors
    ///
    /// Returns an error if expansion or TOML parsing fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }

    /// Validate that the configuration can drive a provider
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is missing or empty, the timeout
    /// does not parse, or the fallback policy is inconsistent
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_credentials()?;
        self.validate_synthesis()?;
        self.tts.provider.timeout()?;
        Ok(())
    }

    fn validate_credentials(&self) -> anyhow::Result<()> {
        let present = self
            .tts
            .provider
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty());

        if !present {
            anyhow::bail!(
                "no provider API key configured: set ELEVENLABS_API_KEY, pass --api-key, or set tts.provider.api_key"
            );
        }

        Ok(())
    }

    fn validate_synthesis(&self) -> anyhow::Result<()> {
        let synthesis = &self.tts.synthesis;

        if synthesis.default_model_id.trim().is_empty() {
            anyhow::bail!("tts.synthesis.default_model_id must not be empty");
        }

        if !(400..=599).contains(&synthesis.fallback_status) {
            anyhow::bail!(
                "tts.synthesis.fallback_status must be an HTTP error status (400-599), got {}",
                synthesis.fallback_status
            );
        }

        if synthesis.fallback_model_id.as_deref() == Some(synthesis.default_model_id.as_str()) {
            anyhow::bail!("tts.synthesis.fallback_model_id must differ from default_model_id");
        }

        if synthesis.default_voice_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            anyhow::bail!("tts.synthesis.default_voice_id must not be empty when set");
        }

        tracing::debug!(
            default_model = %synthesis.default_model_id,
            fallback_model = ?synthesis.fallback_model_id,
            "synthesis policy validated"
        );

        Ok(())
    }
}
