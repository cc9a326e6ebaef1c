use std::time::Duration;

use axum::http;
use reqwest::Client;

use crate::error::{Result, TtsError};

/// HTTP client shared by every call a provider makes
///
/// `timeout` bounds the whole request including the audio body, so a
/// hung provider cannot hold a request open forever.
pub fn http_client(timeout: Duration) -> Result<Client> {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .user_agent(concat!("voxgate/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .build()
        .map_err(|e| TtsError::Config(format!("failed to build HTTP client: {e}")))
}
