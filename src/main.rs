//! CLI entry point for the playlist audio downloader.

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info, warn};
use ytaudio_core::config::{Endpoints, build_http_client};
use ytaudio_core::{
    ArtifactFetcher, ConversionClient, Downloader, Engine, PlaylistSource, RetryPolicy,
    TokenProvider, YouTubePlaylist,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let playlist_url = match args.playlist_url {
        Some(url) => url,
        None => read_playlist_url()?,
    };
    let playlist_url = playlist_url.trim().to_string();
    if playlist_url.is_empty() {
        bail!("no playlist URL provided");
    }

    // One constructed HTTP client, shared by every component
    let client = build_http_client().context("failed to build HTTP client")?;

    let source = YouTubePlaylist::new(client.clone(), args.api_key);
    let items = source
        .list_items(&playlist_url)
        .await
        .context("failed to list playlist items")?;

    if items.is_empty() {
        info!("playlist contains no items");
        return Ok(());
    }
    info!(items = items.len(), "playlist listed");

    let endpoints = Endpoints::default();
    let downloader = Arc::new(Downloader::new(
        TokenProvider::new(client.clone(), &endpoints.auth_url),
        ConversionClient::new(client.clone(), &endpoints.convert_url),
        ArtifactFetcher::new(client),
        RetryPolicy::with_max_attempts(u32::from(args.max_retries) + 1),
        args.output,
    ));

    let engine = Engine::new(usize::from(args.concurrency))?;
    let outcomes = engine.download_all(&downloader, items).await?;

    for outcome in outcomes.iter().filter(|o| !o.is_success()) {
        if let Some(error) = outcome.error() {
            warn!(title = %outcome.item.title, error = %error, "item failed");
        }
    }

    info!(
        completed = engine.stats().completed(),
        failed = engine.stats().failed(),
        total = engine.stats().total(),
        "download complete"
    );

    Ok(())
}

/// Reads the playlist URL from stdin, prompting when attached to a terminal.
fn read_playlist_url() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        print!("Please provide the YouTube playlist URL you wish to download: ");
        io::stdout().flush()?;
    }
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("failed to read playlist URL from stdin")?;
    Ok(line)
}
