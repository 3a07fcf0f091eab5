//! The scrape-and-aggregate pipeline.
//!
//! One call to [`run`] executes the whole state machine:
//!
//! ```text
//! Idle → Listing → Filtering → Enriching → Aggregating → Published
//! ```
//!
//! Transitions are strictly forward with no intra-run retries. Listing and
//! filtering run sequentially on one logical task; enrichment is the only
//! concurrent stage, a bounded `buffer_unordered` worker pool whose
//! completions are merged by a single collector that exclusively owns the
//! result map. A listing-level fetch failure aborts the run; everything
//! downstream degrades per candidate instead.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::errors::RunFailure;
use crate::fetch::PageFetcher;
use crate::identity;
use crate::models::{Candidate, Event, Snapshot};
use crate::scrapers::{detail, listing};

/// Everything one run needs, passed explicitly; the pipeline holds no
/// ambient global state. The fetcher (and its HTTP client) is shared by all
/// enrichment workers.
#[derive(Debug)]
pub struct ScrapeContext<F> {
    pub fetcher: F,
    pub base_url: Url,
    pub listing_url: String,
    /// Cap on concurrent detail fetches.
    pub workers: usize,
    pub listing_timeout: Duration,
    pub detail_timeout: Duration,
}

impl<F: PageFetcher> ScrapeContext<F> {
    pub fn new(
        fetcher: F,
        base_url: Url,
        listing_url: String,
        workers: usize,
        listing_timeout: Duration,
        detail_timeout: Duration,
    ) -> Self {
        ScrapeContext {
            fetcher,
            base_url,
            listing_url,
            workers,
            listing_timeout,
            detail_timeout,
        }
    }
}

/// Pipeline stages, in order. Terminal outcomes are `Published` (snapshot
/// produced, possibly empty) and a listing-level [`RunFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Listing,
    Filtering,
    Enriching,
    Aggregating,
    Published,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Listing => "listing",
            Stage::Filtering => "filtering",
            Stage::Enriching => "enriching",
            Stage::Aggregating => "aggregating",
            Stage::Published => "published",
        };
        write!(f, "{name}")
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "Stage transition");
    *stage = next;
}

/// Dual-rule date filter: a normalized timestamp alone decides when present;
/// otherwise fall back to matching today's day-of-month next to a month-name
/// token in the display text. The fallback trades precision for recall and
/// can admit false positives when today's day number appears elsewhere.
pub fn scheduled_today(candidate: &Candidate, today: NaiveDate, day_fallback: &Regex) -> bool {
    match candidate.scheduled_at {
        Some(at) => at.date() == today,
        None => day_fallback.is_match(&candidate.scheduled_display),
    }
}

/// Execute one full pipeline run against the caller-supplied clock value.
///
/// Returns the finished snapshot, or a [`RunFailure`] when the listing page
/// itself cannot be fetched, in which case the caller must keep its
/// previously published snapshot rather than overwrite it.
#[instrument(level = "info", skip(ctx), fields(listing_url = %ctx.listing_url))]
pub async fn run<F: PageFetcher>(
    ctx: &ScrapeContext<F>,
    now: NaiveDateTime,
) -> Result<Snapshot, RunFailure> {
    let today = now.date();
    let mut stage = Stage::Idle;

    advance(&mut stage, Stage::Listing);
    let candidates = listing::fetch_candidates(
        &ctx.fetcher,
        &ctx.listing_url,
        &ctx.base_url,
        ctx.listing_timeout,
        today.year(),
    )
    .await?;
    let scraped = candidates.len();

    advance(&mut stage, Stage::Filtering);
    let day_fallback = Regex::new(&format!(r"\b{}\s+[A-Za-z]+", today.day()))
        .expect("valid day fallback regex");
    let todays: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| scheduled_today(c, today, &day_fallback))
        .collect();
    info!(scraped, retained = todays.len(), %today, "Filtered candidates to today");

    // Identity assignment; duplicate ids keep the first occurrence so a
    // duplicate never costs a second detail fetch.
    let identified: Vec<(String, Candidate)> = todays
        .into_iter()
        .map(|candidate| (identity::resolve(&candidate), candidate))
        .unique_by(|(id, _)| id.clone())
        .collect();

    advance(&mut stage, Stage::Enriching);
    let mut events: HashMap<String, Event> = identified
        .into_iter()
        .map(|(id, candidate)| {
            let event = Event::from_candidate(id.clone(), candidate, now);
            (id, event)
        })
        .collect();

    let jobs: Vec<(String, String)> = events
        .values()
        .filter_map(|event| {
            event
                .detail_url
                .clone()
                .map(|url| (event.id.clone(), url))
        })
        .collect();
    info!(
        events = events.len(),
        detail_fetches = jobs.len(),
        workers = ctx.workers,
        "Enriching candidates"
    );

    let mut enriched = 0usize;
    let mut missed = 0usize;
    {
        // Single collector: completions arrive out of order and are merged
        // by id; the map is owned exclusively by this loop.
        let mut completions = stream::iter(jobs)
            .map(|(id, url)| async move {
                let outcome =
                    detail::fetch_enrichment(&ctx.fetcher, &url, &ctx.base_url, ctx.detail_timeout)
                        .await;
                (id, url, outcome)
            })
            .buffer_unordered(ctx.workers.max(1));

        while let Some((id, url, outcome)) = completions.next().await {
            match outcome {
                Ok(enrichment) => {
                    if let Some(event) = events.get_mut(&id) {
                        event.apply_enrichment(enrichment);
                        enriched += 1;
                    }
                }
                Err(e) => {
                    // Per-candidate miss: the event stays in the snapshot
                    // with empty streams/images.
                    warn!(%id, %url, error = %e, "Detail fetch failed; keeping candidate unenriched");
                    missed += 1;
                }
            }
        }
    }
    info!(enriched, missed, "Enrichment completed");

    advance(&mut stage, Stage::Aggregating);
    let snapshot = Snapshot::assemble(events.into_values().collect(), now);

    advance(&mut stage, Stage::Published);
    info!(
        events = snapshot.events.len(),
        status = ?snapshot.status,
        "Run produced snapshot"
    );
    Ok(snapshot)
}
