//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use secrecy::SecretString;
use voxgate_config::{Config, Delivery, ServerConfig, TtsProviderType};

use super::mock_elevenlabs::API_KEY;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Config pointed at a mock provider, with the mock's API key
    pub fn new(base_url: &str) -> Self {
        let mut config = Config {
            server: ServerConfig {
                listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                ..ServerConfig::default()
            },
            ..Config::default()
        };

        config.tts.provider.provider_type = TtsProviderType::Elevenlabs;
        config.tts.provider.api_key = Some(SecretString::from(API_KEY));
        config.tts.provider.base_url = Some(base_url.to_owned());
        config.tts.provider.timeout = "5s".to_owned();

        Self { config }
    }

    /// How the provider hands its audio back
    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.config.tts.provider.delivery = delivery;
        self
    }

    /// Use a different API key than the one the mock accepts
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.config.tts.provider.api_key = Some(SecretString::from(key));
        self
    }

    /// Directory for per-request audio files
    pub fn with_temp_dir(mut self, dir: &Path) -> Self {
        self.config.server.temp_dir = Some(dir.to_path_buf());
        self
    }

    /// Voice used when a request names none
    pub fn with_default_voice_id(mut self, id: &str) -> Self {
        self.config.tts.synthesis.default_voice_id = Some(id.to_owned());
        self
    }

    /// Drop the fallback model so rejected conversions are never retried
    pub fn without_fallback(mut self) -> Self {
        self.config.tts.synthesis.fallback_model_id = None;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
