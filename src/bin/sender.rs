//! ADTS Sender Application
//!
//! Reads an ADTS file and streams it frame by frame to a receiver over SRT,
//! paced to the audio's playback rate.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adts_srt_streamer::{config::AppConfig, sender::AdtsSender, transport::SrtSender};

/// Stream an ADTS/AAC file over SRT in real time
#[derive(Parser)]
#[command(name = "adts-send")]
#[command(version)]
struct Cli {
    /// ADTS file to stream
    input: PathBuf,

    /// Receiver host
    host: String,

    /// Receiver port
    port: u16,

    /// Config file (default is config.toml in the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting ADTS sender");

    let config = AppConfig::load(cli.config.as_deref()).context("invalid configuration")?;

    let input = tokio::fs::File::open(&cli.input)
        .await
        .with_context(|| format!("could not open input file {}", cli.input.display()))?;

    let remote = tokio::net::lookup_host((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("could not resolve {}:{}", cli.host, cli.port))?
        .next()
        .with_context(|| format!("no address for {}:{}", cli.host, cli.port))?;

    let sink = SrtSender::connect(remote, &config.transport).await?;
    tracing::info!("Streaming {} to {}", cli.input.display(), sink.remote());

    let stats = AdtsSender::new(sink, &config)
        .run(BufReader::new(input))
        .await?;

    tracing::info!(
        "Done: {} frames, {:.1} KB sent",
        stats.frames_sent,
        stats.bytes_sent as f64 / 1024.0
    );
    Ok(())
}
