use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{FutureExt, StreamExt, TryStreamExt};
use reqwest::{Client, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use voxgate_config::Delivery;

use super::{ConvertRequest, ProviderError, ProviderFailure, TtsProvider, VoiceOption};
use crate::stream::{AudioSource, ChunkReader, ChunkStream, ReadableSource, WholeBody};

const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";
const API_KEY_HEADER: &str = "xi-api-key";
const AUDIO_MPEG: &str = "audio/mpeg";

/// `ElevenLabs` TTS provider
pub struct ElevenLabsProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    delivery: Delivery,
    name: String,
}

impl ElevenLabsProvider {
    pub fn new(name: String, client: Client, api_key: SecretString, base_url: Option<String>, delivery: Delivery) -> Self {
        let base_url = base_url
            .as_deref()
            .unwrap_or(DEFAULT_ELEVENLABS_API_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            client,
            base_url,
            api_key,
            delivery,
            name,
        }
    }

    /// Conversion endpoint for `voice_id`
    ///
    /// The id is pushed as a single encoded path segment, so `/`, `?` or `#`
    /// inside it cannot reach a different endpoint.
    fn convert_url(&self, voice_id: &str) -> Result<Url, ProviderError> {
        if matches!(voice_id, "" | "." | "..") {
            return Err(ProviderError::new(format!("Invalid voice id {voice_id:?}"), None));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::new(format!("Invalid ElevenLabs base URL {}: {e}", self.base_url), None))?;

        url.path_segments_mut()
            .map_err(|()| ProviderError::new(format!("ElevenLabs base URL {} cannot take a path", self.base_url), None))?
            .pop_if_empty()
            .extend(["text-to-speech", voice_id])
            .extend((self.delivery == Delivery::Stream).then_some("stream"));

        Ok(url)
    }

    fn transport_error(&self, action: &str, e: &reqwest::Error) -> ProviderError {
        tracing::error!(provider = %self.name, error = %e, "ElevenLabs {action} request failed");
        ProviderError::new(format!("Failed to send {action} request to ElevenLabs: {e}"), None)
    }
}

#[derive(Serialize)]
struct ConvertBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<WireVoice>,
}

#[derive(Deserialize)]
struct WireVoice {
    voice_id: String,
    #[serde(default)]
    name: Option<String>,
}

#[async_trait]
impl TtsProvider for ElevenLabsProvider {
    async fn list_voices(&self) -> Result<Vec<VoiceOption>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/voices", self.base_url))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| self.transport_error("voices", &e))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(provider = %self.name, %status, "ElevenLabs voices error: {error_text}");

            return Err(ProviderError::new(
                format!("ElevenLabs API error ({status}): {error_text}"),
                Some(status.as_u16()),
            ));
        }

        let catalog: VoicesResponse = response.json().await.map_err(|e| {
            tracing::error!(provider = %self.name, error = %e, "failed to parse ElevenLabs voice catalog");
            ProviderError::new(format!("Invalid voice catalog from ElevenLabs: {e}"), Some(status.as_u16()))
        })?;

        tracing::debug!(provider = %self.name, voices = catalog.voices.len(), "fetched voice catalog");

        Ok(catalog
            .voices
            .into_iter()
            .map(|voice| VoiceOption {
                id: voice.voice_id,
                display_name: voice.name.unwrap_or_default(),
            })
            .collect())
    }

    async fn convert(&self, voice_id: &str, request: ConvertRequest<'_>) -> Result<AudioSource, ProviderFailure> {
        tracing::debug!(
            provider = %self.name,
            voice_id,
            model = request.model_id,
            input_len = request.text.len(),
            delivery = ?self.delivery,
            "ElevenLabs TTS request"
        );

        let body = ConvertBody {
            text: request.text,
            model_id: request.model_id,
        };

        let response = self
            .client
            .post(self.convert_url(voice_id)?)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .header(http::header::ACCEPT, AUDIO_MPEG)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error("text-to-speech", &e))?;

        let status = response.status();

        if !status.is_success() {
            tracing::warn!(provider = %self.name, %status, model = request.model_id, "ElevenLabs rejected conversion");

            let error = ProviderError::new(format!("ElevenLabs API error ({status})"), Some(status.as_u16()));
            return Err(ProviderFailure::with_body(
                error,
                Box::new(ResponseAudio::new(response, Delivery::Buffered)),
            ));
        }

        Ok(Box::new(ResponseAudio::new(response, self.delivery)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Provider response exposed through the capability matching its delivery
struct ResponseAudio {
    response: Option<Response>,
    delivery: Delivery,
}

impl ResponseAudio {
    fn new(response: Response, delivery: Delivery) -> Self {
        Self {
            response: Some(response),
            delivery,
        }
    }

    fn take(&mut self, delivery: Delivery) -> Option<Response> {
        if self.delivery == delivery { self.response.take() } else { None }
    }
}

impl ReadableSource for ResponseAudio {
    fn push_stream(&mut self) -> Option<ChunkStream> {
        let response = self.take(Delivery::Stream)?;
        Some(response.bytes_stream().map_err(io::Error::other).boxed())
    }

    fn buffered_body(&mut self) -> Option<WholeBody> {
        let response = self.take(Delivery::Buffered)?;
        Some(async move { response.bytes().await.map_err(io::Error::other) }.boxed())
    }

    fn chunk_reader(&mut self) -> Option<Box<dyn ChunkReader>> {
        let response = self.take(Delivery::Chunked)?;
        Some(Box::new(ResponseChunks(response)))
    }
}

struct ResponseChunks(Response);

#[async_trait]
impl ChunkReader for ResponseChunks {
    async fn read(&mut self) -> io::Result<Option<Bytes>> {
        self.0.chunk().await.map_err(io::Error::other)
    }
}
