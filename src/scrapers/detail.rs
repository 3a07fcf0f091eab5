//! Detail-page scraper.
//!
//! A detail page carries the two things the listing can't provide: team
//! imagery (`img[itemprop="image"]`) and the playable stream rows inside
//! `div#links_block`. Each stream renders as its own `table.lnktbj`; rows
//! below the minimum cell count are dropped, while rows merely missing a
//! sub-element (flag, play link, title) keep the row with that field empty.

use std::time::Duration;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use crate::errors::FetchError;
use crate::fetch::PageFetcher;
use crate::models::{Enrichment, StreamEntry, TeamImage};
use crate::scrapers::{absolute_url, clean_text};

static TEAM_IMG_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"img[itemprop="image"][alt]"#).expect("valid team image selector")
});
static LINKS_BLOCK_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div#links_block").expect("valid links block selector"));
static STREAM_TABLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.lnktbj").expect("valid stream table selector"));
static CELL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid cell selector"));
static IMG_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("valid img selector"));
static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid link selector"));

/// A stream row needs at least this many cells to be meaningful: flag,
/// bitrate, and the play link / type columns at fixed positions.
const MIN_STREAM_CELLS: usize = 7;

/// Index of the cell holding the play link.
const PLAY_CELL: usize = 5;
/// Index of the cell holding the stream type label.
const KIND_CELL: usize = 6;

/// Fetch one event's detail page and extract its enrichment.
///
/// Failure here is per-candidate: the caller absorbs the error into an empty
/// enrichment and carries on with the other candidates.
#[instrument(level = "debug", skip(fetcher, base))]
pub async fn fetch_enrichment<F: PageFetcher>(
    fetcher: &F,
    detail_url: &str,
    base: &Url,
    timeout: Duration,
) -> Result<Enrichment, FetchError> {
    let html = fetcher.fetch_page(detail_url, timeout).await?;
    let enrichment = parse_detail(&html, base);
    debug!(
        images = enrichment.team_images.len(),
        streams = enrichment.streams.len(),
        "Parsed detail page"
    );
    Ok(enrichment)
}

/// Parse a detail page body. Always succeeds; pages without the expected
/// sections produce an empty enrichment.
pub fn parse_detail(html: &str, base: &Url) -> Enrichment {
    let document = Html::parse_document(html);

    let team_images = document
        .select(&TEAM_IMG_SEL)
        .filter_map(|img| {
            let team = clean_text(img.value().attr("alt")?);
            if team.is_empty() {
                return None;
            }
            let url = img
                .value()
                .attr("src")
                .and_then(|src| absolute_url(base, src))
                .unwrap_or_default();
            Some(TeamImage { team, url })
        })
        .collect();

    let streams = document
        .select(&LINKS_BLOCK_SEL)
        .next()
        .map(|block| {
            block
                .select(&STREAM_TABLE_SEL)
                .filter_map(|table| parse_stream_row(table, base))
                .collect()
        })
        .unwrap_or_default();

    Enrichment {
        team_images,
        streams,
    }
}

/// Parse one stream table. `None` only when the row is below the minimum
/// cell count; missing sub-elements default to empty fields instead.
fn parse_stream_row(table: ElementRef<'_>, base: &Url) -> Option<StreamEntry> {
    let cells: Vec<ElementRef<'_>> = table.select(&CELL_SEL).collect();
    if cells.len() < MIN_STREAM_CELLS {
        return None;
    }

    let mut entry = StreamEntry::default();

    if let Some(flag) = cells[0].select(&IMG_SEL).next() {
        entry.language = flag.value().attr("title").map(clean_text).unwrap_or_default();
    }
    entry.bitrate = cells[1].value().attr("title").map(clean_text).unwrap_or_default();

    if let Some(play) = cells[PLAY_CELL].select(&LINK_SEL).next() {
        entry.url = play
            .value()
            .attr("href")
            .and_then(|href| absolute_url(base, href))
            .unwrap_or_default();
        entry.title = play.value().attr("title").map(clean_text).unwrap_or_default();
    }
    entry.kind = clean_text(&cells[KIND_CELL].text().collect::<Vec<_>>().join(" "));

    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.test").unwrap()
    }

    const DETAIL_HTML: &str = r#"
        <html><body>
        <img itemprop="image" alt="Arsenal" src="/img/teams/arsenal.png">
        <img itemprop="image" alt="Chelsea" src="/img/teams/chelsea.png">
        <img alt="Decoration" src="/img/banner.png">
        <div id="links_block">
          <table class="lnktbj"><tr>
            <td><img src="/img/flags/en.gif" title="English"></td>
            <td title="2500 kbps">2500</td>
            <td></td><td></td><td></td>
            <td><a href="/webplayer.php?id=1" title="Stream 1">Play</a></td>
            <td>Flash</td>
          </tr></table>
          <table class="lnktbj"><tr>
            <td></td>
            <td>no title attr</td>
            <td></td><td></td><td></td>
            <td><a href="/webplayer.php?id=2">Play</a></td>
            <td>Browser</td>
          </tr></table>
          <table class="lnktbj"><tr>
            <td>too</td><td>short</td><td>row</td>
          </tr></table>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_detail_extracts_marked_team_images_only() {
        let enrichment = parse_detail(DETAIL_HTML, &base());
        assert_eq!(
            enrichment.team_images,
            vec![
                TeamImage {
                    team: "Arsenal".to_string(),
                    url: "https://example.test/img/teams/arsenal.png".to_string(),
                },
                TeamImage {
                    team: "Chelsea".to_string(),
                    url: "https://example.test/img/teams/chelsea.png".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_detail_complete_stream_row() {
        let enrichment = parse_detail(DETAIL_HTML, &base());
        assert_eq!(enrichment.streams.len(), 2);
        let first = &enrichment.streams[0];
        assert_eq!(first.language, "English");
        assert_eq!(first.bitrate, "2500 kbps");
        assert_eq!(first.title, "Stream 1");
        assert_eq!(first.url, "https://example.test/webplayer.php?id=1");
        assert_eq!(first.kind, "Flash");
    }

    #[test]
    fn test_parse_detail_missing_sub_elements_default_to_empty() {
        let enrichment = parse_detail(DETAIL_HTML, &base());
        let second = &enrichment.streams[1];
        assert_eq!(second.language, "");
        assert_eq!(second.bitrate, "");
        assert_eq!(second.title, "");
        assert_eq!(second.url, "https://example.test/webplayer.php?id=2");
        assert_eq!(second.kind, "Browser");
    }

    #[test]
    fn test_parse_detail_short_rows_are_dropped() {
        let enrichment = parse_detail(DETAIL_HTML, &base());
        assert!(enrichment.streams.iter().all(|s| s.kind != "row"));
    }

    #[test]
    fn test_parse_detail_without_links_block_is_empty() {
        let enrichment = parse_detail("<html><body><p>nothing</p></body></html>", &base());
        assert!(enrichment.is_empty());
    }
}
