use std::sync::Arc;

use voxgate_config::SynthesisConfig;

use crate::{
    error::{Result, TtsError},
    provider::{ConvertRequest, ProviderError, ProviderFailure, TtsProvider},
    stream::{AudioSource, read_text},
};

/// Calls the provider's conversion, applying the fallback-model policy
pub struct Synthesizer {
    provider: Arc<dyn TtsProvider>,
    policy: SynthesisConfig,
}

/// Provider error with its body already read
struct Rejection {
    error: ProviderError,
    body: Option<String>,
}

impl Rejection {
    fn into_error(self) -> TtsError {
        TtsError::synthesis(self.error, self.body)
    }
}

impl Synthesizer {
    pub fn new(provider: Arc<dyn TtsProvider>, policy: SynthesisConfig) -> Self {
        Self { provider, policy }
    }

    pub const fn policy(&self) -> &SynthesisConfig {
        &self.policy
    }

    /// Request audio for `text`, using the default model when none is given
    ///
    /// When the default model is rejected with the configured fallback
    /// status, the conversion is retried exactly once with the fallback
    /// model. Every other failure is returned as [`TtsError::Synthesis`].
    pub async fn synthesize(&self, text: &str, voice_id: &str, model_id: Option<&str>) -> Result<AudioSource> {
        let model_id = model_id.unwrap_or(self.policy.default_model_id.as_str());

        tracing::info!(voice_id, model = model_id, "synthesizing speech");

        let rejection = match self.convert(text, voice_id, model_id).await {
            Ok(source) => return Ok(source),
            Err(rejection) => rejection,
        };

        let Some(fallback) = self.fallback_for(&rejection, model_id) else {
            return Err(rejection.into_error());
        };

        tracing::warn!(
            status = ?rejection.error.status,
            model = model_id,
            fallback,
            "model rejected, retrying once with fallback model"
        );

        self.convert(text, voice_id, fallback).await.map_err(Rejection::into_error)
    }

    fn fallback_for(&self, rejection: &Rejection, model_id: &str) -> Option<&str> {
        if rejection.error.status == Some(self.policy.fallback_status) && model_id == self.policy.default_model_id {
            self.policy.fallback_model_id.as_deref()
        } else {
            None
        }
    }

    async fn convert(&self, text: &str, voice_id: &str, model_id: &str) -> std::result::Result<AudioSource, Rejection> {
        let request = ConvertRequest { text, model_id };

        match self.provider.convert(voice_id, request).await {
            Ok(source) => Ok(source),
            Err(ProviderFailure { error, body }) => {
                let body = match body {
                    Some(source) => capture_body(source).await,
                    None => None,
                };

                tracing::debug!(provider = self.provider.name(), error = %error, body = ?body, "conversion failed");

                Err(Rejection { error, body })
            }
        }
    }
}

/// Read an error body as text; failures here never mask the original error
async fn capture_body(source: AudioSource) -> Option<String> {
    match read_text(source).await {
        Ok(text) if text.is_empty() => None,
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(error = %e, "could not read provider error body");
            None
        }
    }
}
