#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod server;
pub mod telemetry;
pub mod tts;

use serde::Deserialize;

pub use env::{ExpandError, expand_env};
pub use server::*;
pub use telemetry::*;
pub use tts::*;

/// Top-level voxgate configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Speech provider and synthesis policy
    #[serde(default)]
    pub tts: TtsConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
