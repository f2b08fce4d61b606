//! ADTS Receiver Application
//!
//! Accepts one SRT connection and writes every received message to a file.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::BufWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adts_srt_streamer::{config::AppConfig, receiver::StreamReceiver, transport::SrtReceiver};

/// Receive an SRT stream into a file
#[derive(Parser)]
#[command(name = "adts-recv")]
#[command(version)]
struct Cli {
    /// File to write received data to
    output: PathBuf,

    /// Address to listen on
    bind_host: String,

    /// Port to listen on
    bind_port: u16,

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

    tracing::info!("Starting ADTS receiver");

    let config = AppConfig::load(cli.config.as_deref()).context("invalid configuration")?;

    let output = tokio::fs::File::create(&cli.output)
        .await
        .with_context(|| format!("could not create output file {}", cli.output.display()))?;

    let local = tokio::net::lookup_host((cli.bind_host.as_str(), cli.bind_port))
        .await
        .with_context(|| format!("could not resolve {}:{}", cli.bind_host, cli.bind_port))?
        .next()
        .with_context(|| format!("no address for {}:{}", cli.bind_host, cli.bind_port))?;

    let source = SrtReceiver::accept(local, &config.transport).await?;
    tracing::info!("Writing stream on {} to {}", source.local(), cli.output.display());

    let stats = StreamReceiver::new(source, &config.receiver)
        .run(BufWriter::new(output))
        .await?;

    tracing::info!(
        "Done: {} messages, {:.1} KB written to {}",
        stats.messages_received,
        stats.bytes_received as f64 / 1024.0,
        cli.output.display()
    );
    Ok(())
}
