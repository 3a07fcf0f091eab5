//! Data models for listing candidates, published events, and snapshots.
//!
//! Three stages of the same record live here:
//! - [`Candidate`]: a raw listing-page record before date filtering
//! - [`Enrichment`]: the stream/image data pulled from a detail page
//! - [`Event`]: a finalized record inside a published [`Snapshot`]
//!
//! Events are never mutated after publication; each run builds a fresh
//! `Snapshot` that fully replaces the previous one.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A parsed listing-page record, before date filtering and enrichment.
///
/// All fields come from one listing block. `scheduled_at` is a best-effort
/// normalization of `scheduled_display`; when the text doesn't match the
/// expected pattern it stays `None` and the record is still valid.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Raw matchup text, e.g. `"Arsenal - Chelsea"`. Not guaranteed to
    /// contain a separator.
    pub title: String,
    /// Absolute URL of the per-event detail page, when the block linked one.
    pub detail_url: Option<String>,
    /// Raw date/time text as displayed, e.g. `"7 August at 18:30"`.
    pub scheduled_display: String,
    /// Competition line, parentheses stripped, e.g. `"Premier League"`.
    pub competition: Option<String>,
    /// Normalized local start time, when `scheduled_display` was parsable.
    pub scheduled_at: Option<NaiveDateTime>,
    /// Alt text of the block's leading image.
    pub image_alt: Option<String>,
    /// Whether a live-status marker was present at scrape time.
    pub is_live: bool,
}

/// A labeled team image from a detail page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamImage {
    /// Team label, from the image alt text.
    pub team: String,
    /// Absolute image URL.
    pub url: String,
}

/// One playable stream row from a detail page's links section.
///
/// Sub-elements missing from a row default to empty strings; only rows below
/// the minimum column count are dropped entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamEntry {
    /// Commentary language, from the flag icon's title.
    pub language: String,
    /// Bitrate/quality label.
    pub bitrate: String,
    /// Title of the play link.
    pub title: String,
    /// Absolute playable URL.
    pub url: String,
    /// Type label, e.g. the player kind shown in the last column.
    pub kind: String,
}

/// Stream and image data extracted from one detail page.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub team_images: Vec<TeamImage>,
    pub streams: Vec<StreamEntry>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.team_images.is_empty() && self.streams.is_empty()
    }
}

/// A finalized, possibly enriched record in the published snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique within one snapshot. Derived from the detail URL's event
    /// reference when present, else a deterministic digest of the title.
    /// Never random, so identical source content keeps its id across runs.
    pub id: String,
    /// Raw matchup text as scraped.
    pub title: String,
    pub competition: Option<String>,
    /// Raw scraped date/time text.
    pub scheduled_display: String,
    /// Normalized start time; absent when the display text was unparsable.
    pub scheduled_at: Option<NaiveDateTime>,
    /// Live marker state from the listing page. Not refreshed by enrichment.
    pub is_live: bool,
    pub detail_url: Option<String>,
    /// Empty until/unless enrichment succeeds.
    pub team_images: Vec<TeamImage>,
    /// Empty until/unless enrichment succeeds.
    pub streams: Vec<StreamEntry>,
    /// Start time of the run that produced this record, uniform per run.
    pub last_updated: NaiveDateTime,
}

impl Event {
    /// Build an unenriched event from a filtered candidate.
    pub fn from_candidate(id: String, candidate: Candidate, run_started: NaiveDateTime) -> Self {
        Event {
            id,
            title: candidate.title,
            competition: candidate.competition,
            scheduled_display: candidate.scheduled_display,
            scheduled_at: candidate.scheduled_at,
            is_live: candidate.is_live,
            detail_url: candidate.detail_url,
            team_images: Vec::new(),
            streams: Vec::new(),
            last_updated: run_started,
        }
    }

    /// Merge a successful enrichment into this event.
    pub fn apply_enrichment(&mut self, enrichment: Enrichment) {
        self.team_images = enrichment.team_images;
        self.streams = enrichment.streams;
    }
}

/// Outcome classification of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The run produced at least one event.
    Success,
    /// The run completed but nothing is scheduled today. A legitimate result,
    /// distinct from "could not determine", and it does publish.
    Empty,
    /// The listing page could not be fetched. Never published; the previous
    /// snapshot stays authoritative.
    Failed,
}

/// One immutable, fully replacing result set from a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: NaiveDateTime,
    pub status: RunStatus,
    pub events: Vec<Event>,
}

impl Snapshot {
    /// Assemble a snapshot from finished events: classifies the run and
    /// applies the deterministic consumer-visible ordering (never completion
    /// order).
    pub fn assemble(mut events: Vec<Event>, generated_at: NaiveDateTime) -> Self {
        events.sort_by(|a, b| {
            (a.scheduled_at.is_none(), a.scheduled_at, &a.competition, &a.title, &a.id).cmp(&(
                b.scheduled_at.is_none(),
                b.scheduled_at,
                &b.competition,
                &b.title,
                &b.id,
            ))
        });
        let status = if events.is_empty() {
            RunStatus::Empty
        } else {
            RunStatus::Success
        };
        Snapshot {
            generated_at,
            status,
            events,
        }
    }
}
