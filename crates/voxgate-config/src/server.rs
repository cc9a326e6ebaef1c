use std::{net::SocketAddr, path::PathBuf};

use serde::Deserialize;

/// HTTP listener and filesystem settings
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind, `0.0.0.0:3000` when unset
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    /// Directory served for any path no API route claims
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Where per-request audio files are written, the OS temp dir when unset
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// Liveness route settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/health".to_string(),
        }
    }
}
