use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Model id the synthesis defaults to when a request names none
pub const DEFAULT_MODEL_ID: &str = "tQkv9ulgQzDoPFvGQ3yb";
/// Model retried once when the default model is rejected
pub const FALLBACK_MODEL_ID: &str = "eleven_multilingual_v2";
/// Catalog voice name picked when a request names no voice
pub const DEFAULT_VOICE_NAME: &str = "EcoV2";

/// Top-level TTS configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    #[serde(default)]
    pub provider: TtsProviderConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// Connection settings for the speech provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsProviderConfig {
    #[serde(rename = "type", default)]
    pub provider_type: TtsProviderType,
    /// API key, required before the server or CLI can start
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override, mostly useful for tests
    #[serde(default)]
    pub base_url: Option<String>,
    /// Which response shape the provider hands back
    #[serde(default)]
    pub delivery: Delivery,
    /// Per-request timeout, e.g. `"120s"` or `"2m"`
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for TtsProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: TtsProviderType::default(),
            api_key: None,
            base_url: None,
            delivery: Delivery::default(),
            timeout: default_timeout(),
        }
    }
}

impl TtsProviderConfig {
    /// Parsed request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout` is not a valid duration string
    pub fn timeout(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.timeout)
            .map_err(|e| anyhow::anyhow!("invalid tts.provider.timeout '{}': {e}", self.timeout))
    }
}

/// Supported speech providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsProviderType {
    /// `ElevenLabs`
    #[default]
    Elevenlabs,
}

/// How synthesized audio is handed back by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Streaming endpoint, chunks pushed as they arrive
    Stream,
    /// Whole body collected at once
    #[default]
    Buffered,
    /// Response chunks pulled one read at a time
    Chunked,
}

/// Model and voice defaults plus the single-retry fallback policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Model used when a request does not name one
    pub default_model_id: String,
    /// Model retried once after the default model fails with `fallback_status`
    pub fallback_model_id: Option<String>,
    /// Provider status code that triggers the fallback retry
    pub fallback_status: u16,
    /// Catalog name looked up when a request names no voice
    pub default_voice_name: Option<String>,
    /// Voice id used when a request names no voice, skipping the catalog
    pub default_voice_id: Option<String>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_model_id: DEFAULT_MODEL_ID.to_string(),
            fallback_model_id: Some(FALLBACK_MODEL_ID.to_string()),
            fallback_status: 400,
            default_voice_name: Some(DEFAULT_VOICE_NAME.to_string()),
            default_voice_id: None,
        }
    }
}

fn default_timeout() -> String {
    "120s".to_string()
}
