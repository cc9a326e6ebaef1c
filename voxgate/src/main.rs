#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::{Args, Command};
use clap::Parser;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tts::{SpeakOptions, TtsServerBuilder};
use voxgate_config::Config;
use voxgate_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;

    voxgate_telemetry::init(&config.telemetry)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Say {
            text,
            out,
            voice_id,
            voice_name,
            model,
        } => {
            let options = SpeakOptions {
                voice_id,
                voice_name,
                model_id: model,
            };
            say(&config, &text, &out, &options).await
        }
        Command::Voices => voices(&config).await,
    }
}

/// Load the configuration file, if any, and apply command line overrides
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(listen) = args.listen {
        config.server.listen_address = Some(listen);
    }

    if let Some(ref key) = args.api_key
        && !key.trim().is_empty()
    {
        config.tts.provider.api_key = Some(SecretString::from(key.clone()));
    }

    config.validate()?;

    Ok(config)
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        delivery = ?config.tts.provider.delivery,
        default_model = %config.tts.synthesis.default_model_id,
        "starting voxgate"
    );

    let server = Server::new(config)?;

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("voxgate stopped");
    Ok(())
}

async fn say(config: &Config, text: &str, out: &str, options: &SpeakOptions) -> anyhow::Result<()> {
    let server = TtsServerBuilder::new(config).build()?;
    let path = server.render_to_file(text, out, options).await?;

    println!("{}", path.display());
    Ok(())
}

async fn voices(config: &Config) -> anyhow::Result<()> {
    let server = TtsServerBuilder::new(config).build()?;

    for voice in server.voices().await? {
        println!("{}\t{}", voice.id, voice.display_name);
    }

    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
