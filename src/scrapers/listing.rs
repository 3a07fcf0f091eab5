//! Listing-page scraper.
//!
//! The listing page renders one `<table cellpadding="1" cellspacing="2">`
//! block per broadcast. Each block is parsed independently into a
//! [`Candidate`]; a block that doesn't match the expected shape (no primary
//! link) yields no record and never aborts the page parse; markup
//! irregularities are expected there.
//!
//! # Block anatomy
//!
//! - `a.live` (live events) or `a.bottomgray` (upcoming): matchup text and
//!   detail href
//! - `span.evdesc`: two lines, the date/time text and the competition in
//!   parentheses
//! - first `img[alt]`: sport/logo label
//! - `img[src*="live.gif"]`: live-status marker

use std::time::Duration;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use crate::errors::FetchError;
use crate::fetch::PageFetcher;
use crate::models::Candidate;
use crate::scrapers::{absolute_url, clean_text, text_parts};

static BLOCK_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"table[cellpadding="1"][cellspacing="2"]"#).expect("valid block selector")
});
static LIVE_LINK_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.live").expect("valid link selector"));
static UPCOMING_LINK_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.bottomgray").expect("valid link selector"));
static DESC_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.evdesc").expect("valid desc selector"));
static IMG_ALT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[alt]").expect("valid image selector"));
static LIVE_MARKER_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"img[src*="live.gif"]"#).expect("valid marker selector"));

/// `<day> <month-name> at <HH:MM>`, as the listing displays start times.
static SCHEDULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})\s+([A-Za-z]+)\s+at\s+(\d{1,2}:\d{2})").expect("valid schedule regex")
});

/// Fetch the listing page and parse it into unfiltered candidates.
///
/// This is the only fetch whose failure aborts a run, so the error is
/// returned rather than absorbed.
#[instrument(level = "info", skip(fetcher, base), fields(%listing_url))]
pub async fn fetch_candidates<F: PageFetcher>(
    fetcher: &F,
    listing_url: &str,
    base: &Url,
    timeout: Duration,
    year: i32,
) -> Result<Vec<Candidate>, FetchError> {
    let html = fetcher.fetch_page(listing_url, timeout).await?;
    let candidates = parse_listing(&html, base, year);
    info!(count = candidates.len(), "Parsed listing candidates");
    Ok(candidates)
}

/// Parse every listing block on the page; unparsable blocks are skipped.
pub fn parse_listing(html: &str, base: &Url, year: i32) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();
    for (index, block) in document.select(&BLOCK_SEL).enumerate() {
        match parse_block(block, base, year) {
            Some(candidate) => candidates.push(candidate),
            None => debug!(index, "Skipped listing block without primary link"),
        }
    }
    candidates
}

/// Parse one listing block. `None` means the block lacked the primary link
/// and produced no record.
fn parse_block(block: ElementRef<'_>, base: &Url, year: i32) -> Option<Candidate> {
    let link = block
        .select(&LIVE_LINK_SEL)
        .next()
        .or_else(|| block.select(&UPCOMING_LINK_SEL).next())?;

    let title = clean_text(&link.text().collect::<Vec<_>>().join(" "));
    let detail_url = link
        .value()
        .attr("href")
        .and_then(|href| absolute_url(base, href));

    let mut scheduled_display = String::new();
    let mut competition = None;
    if let Some(desc) = block.select(&DESC_SEL).next() {
        let parts = text_parts(desc);
        if let Some(first) = parts.first() {
            scheduled_display = first.clone();
        }
        if let Some(second) = parts.get(1) {
            let stripped = second.trim_matches(|c| c == '(' || c == ')').to_string();
            if !stripped.is_empty() {
                competition = Some(stripped);
            }
        }
    }
    let scheduled_at = parse_schedule(&scheduled_display, year);

    let image_alt = block
        .select(&IMG_ALT_SEL)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(clean_text)
        .filter(|alt| !alt.is_empty());

    let is_live = block.select(&LIVE_MARKER_SEL).next().is_some();

    Some(Candidate {
        title,
        detail_url,
        scheduled_display,
        competition,
        scheduled_at,
        image_alt,
        is_live,
    })
}

/// Normalize `"7 August at 18:30"`-style display text against the given
/// year. Non-matching text yields `None`, never an error.
pub fn parse_schedule(display: &str, year: i32) -> Option<NaiveDateTime> {
    let caps = SCHEDULE_RE.captures(display)?;
    let composed = format!("{} {} {} {}", year, &caps[1], &caps[2], &caps[3]);
    NaiveDateTime::parse_from_str(&composed, "%Y %d %B %H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn base() -> Url {
        Url::parse("https://example.test").unwrap()
    }

    const LISTING_HTML: &str = r#"
        <html><body>
        <table cellpadding="1" cellspacing="2">
          <tr><td>
            <img src="/img/soccer.gif" alt="Soccer">
            <img src="/img/live.gif">
            <a class="live" href="/eventinfo/298451/arsenal_chelsea/">Arsenal - Chelsea</a>
            <span class="evdesc">7 August at 18:30<br>(Premier League)</span>
          </td></tr>
        </table>
        <table cellpadding="1" cellspacing="2">
          <tr><td>
            <a class="bottomgray" href="/eventinfo/298452/lyon_nice/">Lyon - Nice</a>
            <span class="evdesc">8 August at 20:00<br>(Ligue 1)</span>
          </td></tr>
        </table>
        <table cellpadding="1" cellspacing="2">
          <tr><td><span class="evdesc">advertisement block</span></td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing_skips_blocks_without_link() {
        let candidates = parse_listing(LISTING_HTML, &base(), 2026);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_parse_listing_extracts_live_block_fields() {
        let candidates = parse_listing(LISTING_HTML, &base(), 2026);
        let first = &candidates[0];
        assert_eq!(first.title, "Arsenal - Chelsea");
        assert_eq!(
            first.detail_url.as_deref(),
            Some("https://example.test/eventinfo/298451/arsenal_chelsea/")
        );
        assert_eq!(first.scheduled_display, "7 August at 18:30");
        assert_eq!(first.competition.as_deref(), Some("Premier League"));
        assert_eq!(first.image_alt.as_deref(), Some("Soccer"));
        assert!(first.is_live);

        let scheduled = first.scheduled_at.expect("parsable schedule");
        assert_eq!((scheduled.month(), scheduled.day()), (8, 7));
        assert_eq!((scheduled.hour(), scheduled.minute()), (18, 30));
        assert_eq!(scheduled.year(), 2026);
    }

    #[test]
    fn test_parse_listing_upcoming_block_is_not_live() {
        let candidates = parse_listing(LISTING_HTML, &base(), 2026);
        let second = &candidates[1];
        assert_eq!(second.title, "Lyon - Nice");
        assert!(!second.is_live);
        assert_eq!(second.image_alt, None);
    }

    #[test]
    fn test_parse_block_without_href_keeps_candidate() {
        let html = r#"
            <table cellpadding="1" cellspacing="2">
              <tr><td>
                <a class="bottomgray">Mystery Match</a>
                <span class="evdesc">7 August at 12:00</span>
              </td></tr>
            </table>
        "#;
        let candidates = parse_listing(html, &base(), 2026);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].detail_url, None);
        assert_eq!(candidates[0].competition, None);
        assert!(candidates[0].scheduled_at.is_some());
    }

    #[test]
    fn test_parse_schedule_recognized_pattern() {
        let parsed = parse_schedule("25 December at 9:05", 2026).unwrap();
        assert_eq!((parsed.month(), parsed.day()), (12, 25));
        assert_eq!((parsed.hour(), parsed.minute()), (9, 5));
    }

    #[test]
    fn test_parse_schedule_rejects_other_text() {
        assert_eq!(parse_schedule("Today at some point", 2026), None);
        assert_eq!(parse_schedule("", 2026), None);
        assert_eq!(parse_schedule("7 Nonsensemonth at 18:30", 2026), None);
    }
}
