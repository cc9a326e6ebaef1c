//! Mock ElevenLabs backend for integration tests
//!
//! Serves a fixed voice catalog and canned MP3 bytes, records which models
//! were requested, and can fail a configurable number of conversions

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// API key the mock accepts
pub const API_KEY: &str = "test-key";

/// Audio returned for every successful conversion, sent in [`CHUNK_SIZE`] pieces
pub const AUDIO: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00mock-mpeg-frame-one|mock-mpeg-frame-two|mock-mpeg-frame-three";

const CHUNK_SIZE: usize = 16;

/// Mock ElevenLabs API
pub struct MockElevenLabs {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    voices: Vec<(String, String)>,
    voices_count: AtomicU32,
    convert_count: AtomicU32,
    stream_count: AtomicU32,
    /// Conversions still to fail before succeeding
    fail_remaining: AtomicU32,
    fail_status: StatusCode,
    fail_body: String,
    requests: Mutex<Vec<ConvertRecord>>,
}

/// One conversion request as the mock saw it
#[derive(Debug, Clone)]
pub struct ConvertRecord {
    pub voice_id: String,
    pub model_id: String,
    pub text: String,
}

impl MockElevenLabs {
    /// Start a mock with a small catalog that includes `EcoV2`
    pub async fn start() -> anyhow::Result<Self> {
        Self::builder().start().await
    }

    pub fn builder() -> MockBuilder {
        MockBuilder {
            voices: vec![
                ("voice-aria".to_owned(), "Aria".to_owned()),
                ("voice-eco".to_owned(), "EcoV2".to_owned()),
                ("voice-bella".to_owned(), "Bella".to_owned()),
            ],
            fail_count: 0,
            fail_status: StatusCode::INTERNAL_SERVER_ERROR,
            fail_body: String::new(),
        }
    }

    /// Base URL for configuring the mock as the provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of catalog requests received
    pub fn voices_count(&self) -> u32 {
        self.state.voices_count.load(Ordering::Relaxed)
    }

    /// Number of conversion requests received, streaming or not
    pub fn convert_count(&self) -> u32 {
        self.state.convert_count.load(Ordering::Relaxed)
    }

    /// Number of conversion requests that used the streaming endpoint
    pub fn stream_count(&self) -> u32 {
        self.state.stream_count.load(Ordering::Relaxed)
    }

    /// Conversion requests in arrival order
    pub fn requests(&self) -> Vec<ConvertRecord> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Model ids of all conversion requests in arrival order
    pub fn models(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.model_id).collect()
    }
}

impl Drop for MockElevenLabs {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

pub struct MockBuilder {
    voices: Vec<(String, String)>,
    fail_count: u32,
    fail_status: StatusCode,
    fail_body: String,
}

impl MockBuilder {
    /// Replace the voice catalog
    pub fn voices(mut self, voices: &[(&str, &str)]) -> Self {
        self.voices = voices.iter().map(|(id, name)| ((*id).to_owned(), (*name).to_owned())).collect();
        self
    }

    /// Fail the first `n` conversions with `status` and `body`
    pub fn failing(mut self, n: u32, status: u16, body: &str) -> Self {
        self.fail_count = n;
        self.fail_status = StatusCode::from_u16(status).unwrap();
        self.fail_body = body.to_owned();
        self
    }

    pub async fn start(self) -> anyhow::Result<MockElevenLabs> {
        let state = Arc::new(MockState {
            voices: self.voices,
            voices_count: AtomicU32::new(0),
            convert_count: AtomicU32::new(0),
            stream_count: AtomicU32::new(0),
            fail_remaining: AtomicU32::new(self.fail_count),
            fail_status: self.fail_status,
            fail_body: self.fail_body,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/voices", routing::get(handle_voices))
            .route("/v1/text-to-speech/{voice_id}", routing::post(handle_convert))
            .route("/v1/text-to-speech/{voice_id}/stream", routing::post(handle_convert_stream))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(MockElevenLabs { addr, shutdown, state })
    }
}

#[derive(Debug, Deserialize)]
struct ConvertBody {
    text: String,
    model_id: String,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("xi-api-key").is_some_and(|v| v == API_KEY)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "detail": { "status": "invalid_api_key" } })),
    )
        .into_response()
}

async fn handle_voices(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.voices_count.fetch_add(1, Ordering::Relaxed);

    if !authorized(&headers) {
        return unauthorized();
    }

    let voices: Vec<_> = state
        .voices
        .iter()
        .map(|(id, name)| serde_json::json!({ "voice_id": id, "name": name }))
        .collect();

    Json(serde_json::json!({ "voices": voices })).into_response()
}

async fn handle_convert(
    State(state): State<Arc<MockState>>,
    Path(voice_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ConvertBody>,
) -> Response {
    convert(&state, voice_id, &headers, body)
}

async fn handle_convert_stream(
    State(state): State<Arc<MockState>>,
    Path(voice_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ConvertBody>,
) -> Response {
    state.stream_count.fetch_add(1, Ordering::Relaxed);
    convert(&state, voice_id, &headers, body)
}

fn convert(state: &MockState, voice_id: String, headers: &HeaderMap, body: ConvertBody) -> Response {
    state.convert_count.fetch_add(1, Ordering::Relaxed);
    state.requests.lock().unwrap().push(ConvertRecord {
        voice_id,
        model_id: body.model_id,
        text: body.text,
    });

    if !authorized(headers) {
        return unauthorized();
    }

    let should_fail = state
        .fail_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();

    if should_fail {
        return (state.fail_status, state.fail_body.clone()).into_response();
    }

    let chunks: Vec<Result<Bytes, std::io::Error>> = AUDIO
        .chunks(CHUNK_SIZE)
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();

    Response::builder()
        .header("content-type", "audio/mpeg")
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap()
}
