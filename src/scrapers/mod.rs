//! Scrapers for the two pages the pipeline reads.
//!
//! | Page | Module | Extracts |
//! |------|--------|----------|
//! | Listing | [`listing`] | candidate records for the day's broadcasts |
//! | Detail | [`detail`] | stream rows and team images for one event |
//!
//! # Common Patterns
//!
//! Both scrapers follow the same policy:
//! - Fetch through the shared [`PageFetcher`](crate::fetch::PageFetcher)
//! - Parse structural blocks independently; a malformed block is skipped
//!   (debug-logged), never an error
//! - Resolve relative hrefs/srcs against the site base URL
//!
//! Shared element helpers live here; selectors are compiled once per module
//! as `once_cell` statics.

pub mod detail;
pub mod listing;

use scraper::ElementRef;
use url::Url;

/// Collapse runs of whitespace and trim, matching how the site's markup
/// interleaves text nodes with layout whitespace.
pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-empty, cleaned text parts of an element, one per text node.
///
/// `<br>`-separated lines come back as separate parts, which is how the
/// listing's two-line description block is split.
pub fn text_parts(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(clean_text)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Resolve a possibly relative href/src against the site base.
pub fn absolute_url(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a \n\t b  "), "a b");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_text_parts_splits_on_br() {
        let html = Html::parse_fragment("<span>7 August at 18:30<br>(Premier League)</span>");
        let selector = Selector::parse("span").unwrap();
        let span = html.select(&selector).next().unwrap();
        assert_eq!(
            text_parts(span),
            vec!["7 August at 18:30".to_string(), "(Premier League)".to_string()]
        );
    }

    #[test]
    fn test_absolute_url_joins_relative() {
        let base = Url::parse("https://example.test").unwrap();
        assert_eq!(
            absolute_url(&base, "/eventinfo/1/").as_deref(),
            Some("https://example.test/eventinfo/1/")
        );
        assert_eq!(
            absolute_url(&base, "https://cdn.example.test/x.png").as_deref(),
            Some("https://cdn.example.test/x.png")
        );
    }
}
