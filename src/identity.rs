//! Stable event identity.
//!
//! Ids come from the detail URL's numeric event reference when it carries
//! one. Otherwise the id is a short SHA-256 digest of the raw title, so the
//! same source content maps to the same id run-to-run. Two candidates with
//! identical titles and no extractable reference therefore collide; that
//! approximation is accepted, not treated as an error.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::models::Candidate;

static EVENT_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/eventinfo/(\d+)").expect("valid event ref regex"));

/// Length of the hex digest used for title-derived fallback ids.
const DIGEST_LEN: usize = 12;

/// Extract the numeric event reference from a detail URL, if present.
pub fn event_ref(url: &str) -> Option<String> {
    EVENT_REF_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Deterministic fallback id for a candidate without a URL-derived reference.
pub fn title_digest(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..DIGEST_LEN].to_string()
}

/// Resolve the id for one candidate: URL reference first, digest fallback.
pub fn resolve(candidate: &Candidate) -> String {
    candidate
        .detail_url
        .as_deref()
        .and_then(event_ref)
        .unwrap_or_else(|| title_digest(&candidate.title))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, detail_url: Option<&str>) -> Candidate {
        Candidate {
            title: title.to_string(),
            detail_url: detail_url.map(str::to_string),
            scheduled_display: String::new(),
            competition: None,
            scheduled_at: None,
            image_alt: None,
            is_live: false,
        }
    }

    #[test]
    fn test_event_ref_extracts_numeric_segment() {
        assert_eq!(
            event_ref("https://example.test/eventinfo/298451/arsenal_chelsea/"),
            Some("298451".to_string())
        );
    }

    #[test]
    fn test_event_ref_absent_for_other_paths() {
        assert_eq!(event_ref("https://example.test/other/298451/"), None);
    }

    #[test]
    fn test_title_digest_is_deterministic_and_short() {
        let a = title_digest("Arsenal - Chelsea");
        let b = title_digest("Arsenal - Chelsea");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_title_digest_differs_across_titles() {
        assert_ne!(title_digest("Arsenal - Chelsea"), title_digest("Lyon - Nice"));
    }

    #[test]
    fn test_resolve_prefers_url_reference() {
        let c = candidate("A - B", Some("https://example.test/eventinfo/77/a_b/"));
        assert_eq!(resolve(&c), "77");
    }

    #[test]
    fn test_resolve_falls_back_to_digest() {
        let c = candidate("A - B", Some("https://example.test/no/id/here/"));
        assert_eq!(resolve(&c), title_digest("A - B"));
        let no_url = candidate("A - B", None);
        assert_eq!(resolve(&no_url), title_digest("A - B"));
    }

    #[test]
    fn test_identical_titles_without_reference_collide() {
        let a = candidate("Derby", None);
        let b = candidate("Derby", None);
        assert_eq!(resolve(&a), resolve(&b));
    }
}
