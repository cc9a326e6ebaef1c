use std::{
    path::Path,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{body::Body, response::Response};
use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;
use tempfile::TempPath;
use tokio_util::io::ReaderStream;

use crate::error::{Result, TtsError};

/// Body of `POST /speak`
#[derive(Debug, Default, Deserialize)]
pub struct SpeakRequest {
    /// Text to synthesize
    #[serde(default)]
    pub text: Option<String>,
    /// Voice id, used without checking the catalog
    #[serde(default, rename = "voiceId")]
    pub voice_id: Option<String>,
    /// Catalog display name, looked up when no id is given
    #[serde(default, rename = "voiceName")]
    pub voice_name: Option<String>,
    /// Provider model id
    #[serde(default)]
    pub model_id: Option<String>,
}

impl SpeakRequest {
    /// Split into the text and the voice/model options
    ///
    /// Empty strings count as absent.
    pub fn into_parts(self) -> (String, SpeakOptions) {
        let options = SpeakOptions {
            voice_id: non_empty(self.voice_id),
            voice_name: non_empty(self.voice_name),
            model_id: non_empty(self.model_id),
        };

        (self.text.unwrap_or_default(), options)
    }
}

/// Optional voice and model selection for one synthesis
#[derive(Debug, Clone, Default)]
pub struct SpeakOptions {
    pub voice_id: Option<String>,
    pub voice_name: Option<String>,
    pub model_id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Synthesized audio held in a temporary file
///
/// The file is removed when this value, or the response body built from
/// it, is dropped.
#[derive(Debug)]
pub struct SpeechFile {
    path: TempPath,
    len: u64,
}

impl SpeechFile {
    pub(crate) fn new(path: TempPath, len: u64) -> Self {
        Self { path, len }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of audio bytes in the file
    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stream the file as an `audio/mpeg` response
    ///
    /// The file is deleted once the body has been fully sent or the client
    /// goes away, whichever happens first.
    pub async fn into_response(self) -> Result<Response> {
        let file = tokio::fs::File::open(&self.path).await?;

        let body = Body::from_stream(DeleteOnDrop {
            inner: ReaderStream::new(file),
            path: Some(self.path),
        });

        Response::builder()
            .header(http::header::CONTENT_TYPE, "audio/mpeg")
            .header(http::header::CONTENT_LENGTH, self.len)
            .body(body)
            .map_err(|e| TtsError::Stream(std::io::Error::other(e)))
    }
}

/// Body stream that removes its backing file when dropped
struct DeleteOnDrop {
    inner: ReaderStream<tokio::fs::File>,
    path: Option<TempPath>,
}

impl Stream for DeleteOnDrop {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let poll = Pin::new(&mut self.inner).poll_next(cx);

        if let Poll::Ready(Some(Err(ref e))) = poll {
            tracing::error!(error = %e, "error sending audio file");
        }

        poll
    }
}

impl Drop for DeleteOnDrop {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        // Unlinking blocks, keep it off the async workers when a runtime is around
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_temp_file(path));
            }
            Err(_) => remove_temp_file(path),
        }
    }
}

fn remove_temp_file(path: TempPath) {
    let shown = path.display().to_string();

    match path.close() {
        Ok(()) => tracing::debug!(path = %shown, "removed temporary audio file"),
        Err(e) => tracing::warn!(path = %shown, error = %e, "failed to remove temporary audio file"),
    }
}
