//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use ytaudio_core::config::DEFAULT_OUTPUT_DIR;
use ytaudio_core::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES};

/// Download the audio of every video in a YouTube playlist as mp3.
///
/// The playlist is listed through the YouTube Data API (an API key is
/// required) and each video is converted and fetched through an external
/// conversion service.
#[derive(Parser, Debug)]
#[command(name = "ytaudio")]
#[command(author, version, about)]
pub struct Args {
    /// YouTube playlist URL (reads from stdin or prompts when omitted)
    pub playlist_url: Option<String>,

    /// YouTube Data API key (falls back to the YOUTUBE_API_KEY env var)
    #[arg(short = 'k', long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Output directory for downloaded mp3 files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Maximum retry attempts for failed conversions (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
