use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};

/// Voxgate text-to-speech gateway
#[derive(Debug, Parser)]
#[command(name = "voxgate", about = "Text-to-speech gateway backed by ElevenLabs")]
pub struct Args {
    /// Path to configuration file; built-in defaults apply when omitted
    #[arg(short, long, env = "VOXGATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "VOXGATE_LISTEN", global = true)]
    pub listen: Option<SocketAddr>,

    /// Override the provider API key
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Synthesize text into an MP3 file and print its path
    Say {
        /// Text to speak
        text: String,

        /// Output file; `.mp3` is appended when missing
        #[arg(short, long, default_value = "output.mp3")]
        out: String,

        /// Voice id, used without consulting the catalog
        #[arg(long)]
        voice_id: Option<String>,

        /// Catalog display name of the voice
        #[arg(long)]
        voice_name: Option<String>,

        /// Provider model id
        #[arg(long)]
        model: Option<String>,
    },

    /// List the provider's voices as `id<TAB>name`
    Voices,
}
