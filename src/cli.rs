//! Command-line interface definitions.
//!
//! All options can be provided via command-line flags; the API key can
//! also come from the `ANTHROPIC_API_KEY` environment variable.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the daily anniversary pipeline.
///
/// # Examples
///
/// ```sh
/// # Normal daily run (API key from the environment)
/// anniversary_daily
///
/// # Backfill a specific date without pushing
/// anniversary_daily --date 2026-01-02
///
/// # Rebuild the listing pages only
/// anniversary_daily --reindex
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root directory of the published site
    #[arg(short, long, default_value = "docs")]
    pub docs_dir: PathBuf,

    /// Directory holding fallback data and page templates
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Anthropic API key (not needed with --reindex)
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Generate for this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Only rescan the docs tree and regenerate index pages
    #[arg(long)]
    pub reindex: bool,
}
