use std::{path::PathBuf, sync::Arc};

use secrecy::{ExposeSecret, SecretString};
use tokio::io::AsyncWrite;
use voxgate_config::{SynthesisConfig, TtsProviderConfig, TtsProviderType};

use crate::{
    error::{Result, TtsError},
    http_client::http_client,
    provider::{TtsProvider, VoiceOption, elevenlabs::ElevenLabsProvider},
    stream::write_to_sink,
    synthesis::Synthesizer,
    types::{SpeakOptions, SpeakRequest, SpeechFile},
    voice::VoiceResolver,
};

/// Speech service: voice resolution, synthesis and audio delivery
pub struct Server {
    resolver: VoiceResolver,
    synthesizer: Synthesizer,
    temp_dir: PathBuf,
}

impl Server {
    /// Assemble a service around an already constructed provider
    ///
    /// Temporary audio files go to `temp_dir`, or the OS temp dir when `None`.
    pub fn new(provider: Arc<dyn TtsProvider>, policy: SynthesisConfig, temp_dir: Option<PathBuf>) -> Self {
        Self {
            resolver: VoiceResolver::new(Arc::clone(&provider)),
            synthesizer: Synthesizer::new(provider, policy),
            temp_dir: temp_dir.unwrap_or_else(std::env::temp_dir),
        }
    }

    /// Voice id for a request, applying the configured defaults
    ///
    /// A request naming a voice (by id or name) bypasses the defaults.
    pub async fn resolve_voice(&self, options: &SpeakOptions) -> Result<String> {
        let policy = self.synthesizer.policy();

        let (id, name) = match (&options.voice_id, &options.voice_name) {
            (Some(id), _) => (Some(id.as_str()), None),
            (None, Some(name)) => (None, Some(name.as_str())),
            (None, None) => (policy.default_voice_id.as_deref(), policy.default_voice_name.as_deref()),
        };

        self.resolver.resolve(id, name).await
    }

    /// Synthesize `text` and write the audio into `sink`
    ///
    /// Returns the number of audio bytes written. Empty text is rejected
    /// before the provider is contacted.
    pub async fn synthesize_into<W>(&self, text: &str, options: &SpeakOptions, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        if text.is_empty() {
            return Err(TtsError::MissingInput("text"));
        }

        let voice_id = self.resolve_voice(options).await?;

        let source = self
            .synthesizer
            .synthesize(text, &voice_id, options.model_id.as_deref())
            .await?;

        let written = write_to_sink(source, sink).await?;

        tracing::debug!(voice_id = %voice_id, bytes = written, "speech synthesis complete");

        Ok(written)
    }

    /// Handle a `/speak` request, producing a temporary audio file
    pub async fn speak(&self, request: SpeakRequest) -> Result<SpeechFile> {
        let (text, options) = request.into_parts();

        if text.is_empty() {
            return Err(TtsError::MissingInput("text"));
        }

        let (file, path) = tempfile::Builder::new()
            .prefix("voice_")
            .suffix(".mp3")
            .tempfile_in(&self.temp_dir)?
            .into_parts();

        let mut file = tokio::fs::File::from_std(file);
        let written = self.synthesize_into(&text, &options, &mut file).await?;

        Ok(SpeechFile::new(path, written))
    }

    /// The provider's voice catalog
    pub async fn voices(&self) -> Result<Vec<VoiceOption>> {
        self.resolver.catalog().await
    }
}

/// Builder for constructing the speech service from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a voxgate_config::Config,
}

impl<'a> TtsServerBuilder<'a> {
    pub const fn new(config: &'a voxgate_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Server> {
        let provider_config = &self.config.tts.provider;

        tracing::debug!(provider = ?provider_config.provider_type, delivery = ?provider_config.delivery, "initializing TTS provider");

        let provider: Arc<dyn TtsProvider> = match provider_config.provider_type {
            TtsProviderType::Elevenlabs => {
                let api_key = resolve_api_key(provider_config)?;
                let timeout = provider_config
                    .timeout()
                    .map_err(|e| TtsError::Config(e.to_string()))?;

                Arc::new(ElevenLabsProvider::new(
                    "elevenlabs".to_string(),
                    http_client(timeout)?,
                    api_key,
                    provider_config.base_url.clone(),
                    provider_config.delivery,
                ))
            }
        };

        Ok(Server::new(
            provider,
            self.config.tts.synthesis.clone(),
            self.config.server.temp_dir.clone(),
        ))
    }
}

fn resolve_api_key(config: &TtsProviderConfig) -> Result<SecretString> {
    config
        .api_key
        .clone()
        .filter(|key| !key.expose_secret().trim().is_empty())
        .ok_or_else(|| TtsError::Config("API key required for the TTS provider".to_string()))
}
