use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Speech service errors with their HTTP mapping
#[derive(Debug, Error)]
pub enum TtsError {
    /// Required input (text or filename) was empty
    #[error("Missing {0}")]
    MissingInput(&'static str),

    /// The catalog is empty and the caller named no voice id
    #[error("No available voices found in the provider account")]
    NoVoiceAvailable,

    /// Listing the voice catalog failed
    #[error("Failed to list voices: {0}")]
    Catalog(#[source] ProviderError),

    /// The provider rejected the conversion
    ///
    /// `message` is the provider message followed by the captured error
    /// body, if any, after a `\nBody:` marker.
    #[error("{message}")]
    Synthesis {
        message: String,
        status: Option<u16>,
        body: Option<String>,
        #[source]
        source: ProviderError,
    },

    /// The provider response offered none of the known stream shapes
    #[error("Unsupported audio response type")]
    UnsupportedStreamType,

    /// Reading the audio source or writing the sink failed
    #[error("Audio stream failed: {0}")]
    Stream(#[from] std::io::Error),

    /// The service could not be built from configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TtsError {
    /// Wrap a provider failure, joining the captured body onto its message
    pub fn synthesis(source: ProviderError, body: Option<String>) -> Self {
        let message = match &body {
            Some(text) => format!("{} \nBody: {text}", source.message),
            None => source.message.clone(),
        };

        Self::Synthesis {
            message,
            status: source.status,
            body,
            source,
        }
    }

    /// HTTP status code reported to API callers
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingInput(_) => StatusCode::BAD_REQUEST,
            Self::NoVoiceAvailable
            | Self::Catalog(_)
            | Self::Synthesis { .. }
            | Self::UnsupportedStreamType
            | Self::Stream(_)
            | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Provider status code, when the failure came from a provider response
    pub const fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Synthesis { status, .. } => *status,
            Self::Catalog(source) => source.status,
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Build a `{"error": ...}` response
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, provider_status = ?self.provider_status(), "speech request failed");
        } else {
            tracing::debug!(error = %self, "speech request rejected");
        }

        error_response(status, self.to_string())
    }
}
