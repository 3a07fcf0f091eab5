//! # Matchday Snapshot
//!
//! Scrapes a third-party listing site for today's sports broadcasts,
//! enriches each event with stream links and team imagery from its detail
//! page, and republishes the merged result as one JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! matchday_snapshot -o ./data
//! matchday_snapshot -o ./data --shape keyed --interval-minutes 30
//! ```
//!
//! ## Architecture
//!
//! Each run is one pass through the pipeline:
//! 1. **Listing**: fetch and parse the day's listing page into candidates
//! 2. **Filtering**: keep candidates scheduled for today
//! 3. **Enriching**: fetch detail pages concurrently (bounded worker pool)
//! 4. **Aggregating**: merge enrichments by event id into a snapshot
//! 5. **Publishing**: swap the snapshot into the store and overwrite
//!    `latest.json`
//!
//! A failed run never overwrites a previously published snapshot; an empty
//! run (nothing scheduled today) does.

use std::error::Error;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use clap::Parser;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};
use url::Url;

mod cli;
mod errors;
mod fetch;
mod identity;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod snapshot;
mod utils;

use cli::Cli;
use fetch::{PageFetcher, ReqwestFetcher};
use models::Snapshot;
use outputs::json;
use pipeline::ScrapeContext;
use snapshot::SnapshotStore;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("matchday_snapshot starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output_dir, ?args.listing_url, ?args.shape, "Parsed CLI arguments");

    // Early check: ensure the output dir is writable before scraping anything
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let base_url = Url::parse(&args.base_url)?;
    let fetcher = ReqwestFetcher::new()?;
    let ctx = ScrapeContext::new(
        fetcher,
        base_url,
        args.listing_url.clone(),
        args.workers,
        Duration::from_secs(args.listing_timeout_secs),
        Duration::from_secs(args.detail_timeout_secs),
    );

    // The publisher boundary an embedding serving layer reads from. Before
    // the first successful run it reports "not ready" (None).
    let store = SnapshotStore::new();

    loop {
        let now = Local::now().naive_local();
        match execute_run(&ctx, now, args.run_deadline_secs).await {
            Ok(snapshot) => {
                if let Err(e) = json::write_snapshot(&snapshot, &args.output_dir, args.shape).await
                {
                    error!(error = %e, "Failed to write snapshot JSON");
                }
                store.publish(snapshot);
            }
            Err(e) => {
                // Keep whatever was published before; "could not determine"
                // must not masquerade as "nothing today".
                warn!(error = %e, "Run failed; previous snapshot remains authoritative");
                if args.interval_minutes.is_none() {
                    return Err(e);
                }
            }
        }

        match args.interval_minutes {
            Some(minutes) => {
                info!(minutes, "Sleeping until next scheduled run");
                sleep(Duration::from_secs(minutes * 60)).await;
            }
            None => break,
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}

/// Run the pipeline once, bounded by the optional overall deadline.
///
/// Dropping the timed-out run future tears down its enrichment worker pool,
/// so an abandoned run leaks nothing.
async fn execute_run<F: PageFetcher>(
    ctx: &ScrapeContext<F>,
    now: NaiveDateTime,
    deadline_secs: Option<u64>,
) -> Result<Snapshot, Box<dyn Error>> {
    match deadline_secs {
        Some(secs) => {
            match tokio::time::timeout(Duration::from_secs(secs), pipeline::run(ctx, now)).await {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err(format!("run exceeded deadline of {secs}s").into()),
            }
        }
        None => pipeline::run(ctx, now).await.map_err(Into::into),
    }
}
