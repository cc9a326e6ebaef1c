#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod http_client;
mod provider;
mod render;
mod request;
mod server;
mod stream;
mod synthesis;
#[cfg(test)]
mod testing;
mod types;
mod voice;

use std::sync::Arc;

use axum::{Router, extract::State, response::Response, routing::post};

pub use error::{Result, TtsError};
pub use provider::{
    ConvertRequest, ProviderError, ProviderFailure, TtsProvider, VoiceOption, elevenlabs::ElevenLabsProvider,
};
pub use render::mp3_path;
pub use server::{Server, TtsServerBuilder};
pub use stream::{
    AudioSource, BufferedSource, ChunkReader, ChunkStream, PullSource, PushSource, ReadableSource, SourceShape,
    WholeBody, read_text, write_to_sink,
};
pub use synthesis::Synthesizer;
pub use types::{SpeakOptions, SpeakRequest, SpeechFile};
pub use voice::{VoiceResolver, pick_voice};
use request::ExtractPayload;

/// Build the speech service from configuration
pub fn build_server(config: &voxgate_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TtsServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for speech synthesis
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/speak", post(speak))
}

/// Handle `POST /speak`
async fn speak(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<SpeakRequest>,
) -> Result<Response> {
    tracing::debug!(
        voice_id = ?request.voice_id,
        voice_name = ?request.voice_name,
        model_id = ?request.model_id,
        "speak handler called"
    );

    let file = server.speak(request).await?;

    tracing::debug!(bytes = file.len(), "sending synthesized audio");

    file.into_response().await
}
