//! Command-line interface definitions.
//!
//! All tunables of a run live here: source URLs, output location and shape,
//! the enrichment worker cap, per-request timeouts, and the optional
//! re-scrape interval. Options with an `env` attribute can also come from
//! the environment.

use clap::Parser;

use crate::outputs::OutputShape;

/// Scrape today's broadcast listings and publish a JSON snapshot.
///
/// # Examples
///
/// ```sh
/// # Single run, list-shaped output
/// matchday_snapshot -o ./data
///
/// # Keyed output, re-scraping every 30 minutes
/// matchday_snapshot -o ./data --shape keyed --interval-minutes 30
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the snapshot JSON file
    #[arg(short, long)]
    pub output_dir: String,

    /// Listing page to scrape for today's broadcasts
    #[arg(
        long,
        env = "LISTING_URL",
        default_value = "https://livetv.sx/enx/allupcomingsports/1/"
    )]
    pub listing_url: String,

    /// Base URL that relative hrefs on the site resolve against
    #[arg(long, env = "BASE_URL", default_value = "https://livetv.sx")]
    pub base_url: String,

    /// Shape of the `events` field in the output JSON
    #[arg(long, value_enum, default_value_t = OutputShape::List)]
    pub shape: OutputShape,

    /// Maximum concurrent detail-page fetches
    #[arg(long, default_value_t = 15)]
    pub workers: usize,

    /// Timeout for the listing-page fetch, in seconds
    #[arg(long, default_value_t = 15)]
    pub listing_timeout_secs: u64,

    /// Timeout for each detail-page fetch, in seconds
    #[arg(long, default_value_t = 10)]
    pub detail_timeout_secs: u64,

    /// Abandon a run that exceeds this many seconds overall
    #[arg(long)]
    pub run_deadline_secs: Option<u64>,

    /// Re-run the pipeline on this interval; omit for a single run
    #[arg(long, env = "SCRAPE_INTERVAL_MINUTES")]
    pub interval_minutes: Option<u64>,
}
