//! Test server wrapper that starts voxgate on a random port

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use voxgate_config::Config;
use voxgate_server::Server;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Validate `config` and serve it on an ephemeral loopback port
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let server = Server::new(&config)?;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let shutdown = CancellationToken::new();
        let stop = shutdown.clone().cancelled_owned();
        tokio::spawn(async move {
            let _ = axum::serve(listener, server.into_router()).with_graceful_shutdown(stop).await;
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
        })
    }

    /// URL of `path` on the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// `POST /speak` with a JSON body
    pub async fn speak(&self, body: serde_json::Value) -> reqwest::Response {
        self.client.post(self.url("/speak")).json(&body).send().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Wait until `dir` holds no entries, for at most a second
///
/// Temporary audio files are removed when the response body is dropped,
/// which can land just after the client has read the last byte.
pub async fn wait_until_empty(dir: &std::path::Path) -> bool {
    for _ in 0..50 {
        if std::fs::read_dir(dir).unwrap().next().is_none() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    false
}
