pub mod elevenlabs;

use std::fmt;

use async_trait::async_trait;

use crate::stream::AudioSource;

/// One entry of the provider's voice catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOption {
    pub id: String,
    pub display_name: String,
}

impl VoiceOption {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Parameters of a single conversion call
#[derive(Debug, Clone, Copy)]
pub struct ConvertRequest<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
}

/// Error reported by a provider call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    /// HTTP status of the provider response, absent for transport failures
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

/// A failed conversion together with the unread error body, if any
pub struct ProviderFailure {
    pub error: ProviderError,
    pub body: Option<AudioSource>,
}

impl ProviderFailure {
    pub fn with_body(error: ProviderError, body: AudioSource) -> Self {
        Self { error, body: Some(body) }
    }
}

impl From<ProviderError> for ProviderFailure {
    fn from(error: ProviderError) -> Self {
        Self { error, body: None }
    }
}

impl fmt::Debug for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFailure")
            .field("error", &self.error)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Text-to-speech provider: a voice catalog plus a conversion operation
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Fetch the whole voice catalog
    async fn list_voices(&self) -> Result<Vec<VoiceOption>, ProviderError>;

    /// Convert text to audio with the given voice and model
    async fn convert(&self, voice_id: &str, request: ConvertRequest<'_>) -> Result<AudioSource, ProviderFailure>;

    /// Get the provider name
    fn name(&self) -> &str;
}
