//! Heuristic extraction for pages without a working adapter.
//!
//! Walks anchors in document order, keeps the ones the link classifier
//! accepts, and pairs each with the nearest following element whose class
//! looks like a date.

use chrono::TimeDelta;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, instrument};
use url::Url;

use super::{ExtractRequest, GenericLimits};
use crate::links::is_article_link;
use crate::models::{ArticleCandidate, RECENT};
use crate::utils::element_text;

static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("heading selector"));
static DATE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(date|time|published)").expect("date class regex"));

/// Lowercased title fragments that mark account and paywall links.
const DENYLIST: &[&str] = &["sign in", "sign up", "log in", "subscribe", "my account"];

/// Extract up to `limits.max_candidates` candidates from the first
/// `limits.scan_limit` anchors of `document`.
#[instrument(level = "debug", skip_all, fields(source = %req.source))]
pub fn extract_generic(
    document: &Html,
    req: &ExtractRequest<'_>,
    limits: &GenericLimits,
) -> Vec<ArticleCandidate> {
    let Ok(page_url) = Url::parse(req.search_url) else {
        debug!(search_url = %req.search_url, "Search URL is not absolute; skipping generic extraction");
        return Vec::new();
    };

    let order = DocumentOrder::new(document);
    let mut seen: HashSet<Url> = HashSet::new();
    let mut candidates = Vec::new();

    for &(pos, anchor) in order.anchors.iter().take(limits.scan_limit) {
        if candidates.len() >= limits.max_candidates {
            break;
        }
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let Ok(url) = page_url.join(href) else {
            continue;
        };
        if !is_article_link(url.as_str(), req.source) {
            continue;
        }

        let title = match anchor.select(&HEADING).next() {
            Some(heading) => element_text(&heading),
            None => element_text(&anchor),
        };
        let lower = title.to_lowercase();
        if DENYLIST.iter().any(|d| lower.contains(d)) {
            debug!(%title, "Account or subscription link; skipping");
            continue;
        }
        if seen.contains(&url) {
            continue;
        }

        let (date_text, date) = match order.next_date_after(pos) {
            Some(el) => req.date_from(el),
            None => (
                RECENT.to_string(),
                TimeDelta::try_days(limits.staleness_days)
                    .and_then(|age| req.now.checked_sub_signed(age)),
            ),
        };

        if let Some(candidate) =
            ArticleCandidate::new(req.source, &title, url.clone(), &date_text, date, req.query)
        {
            seen.insert(url);
            candidates.push(candidate);
        }
    }

    debug!(count = candidates.len(), "Generic extraction finished");
    candidates
}

/// Anchors and date-like elements tagged with their pre-order position.
struct DocumentOrder<'a> {
    anchors: Vec<(usize, ElementRef<'a>)>,
    dates: Vec<(usize, ElementRef<'a>)>,
}

impl<'a> DocumentOrder<'a> {
    fn new(document: &'a Html) -> Self {
        let mut anchors = Vec::new();
        let mut dates = Vec::new();
        for (pos, el) in document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
        {
            if el.value().name() == "a" && el.value().attr("href").is_some() {
                anchors.push((pos, el));
            } else if is_date_like(&el) {
                dates.push((pos, el));
            }
        }
        Self { anchors, dates }
    }

    /// First date-like element after position `pos`, which includes the
    /// anchor's own descendants.
    fn next_date_after(&self, pos: usize) -> Option<ElementRef<'a>> {
        let at = self.dates.partition_point(|(p, _)| *p <= pos);
        self.dates.get(at).map(|(_, el)| *el)
    }
}

fn is_date_like(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "time" | "span" | "div")
        && el
            .value()
            .attr("class")
            .is_some_and(|class| DATE_CLASS.is_match(class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DateNormalizer;
    use crate::scrapers::test_support::now;

    fn run(html: &str, limits: GenericLimits) -> Vec<ArticleCandidate> {
        let dates = DateNormalizer::default();
        let req = ExtractRequest {
            source: "Example Wire",
            search_url: "https://example.com/find/results?q=storm",
            query: "storm",
            now: now(),
            dates: &dates,
        };
        extract_generic(&Html::parse_document(html), &req, &limits)
    }

    #[test]
    fn test_heading_preferred_over_anchor_text() {
        let html = r#"<a href="/news/storm-1"><h2>Storm hits the coast</h2><p>Read more about it</p></a>"#;
        let found = run(html, GenericLimits::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title(), "Storm hits the coast");
    }

    #[test]
    fn test_relative_joins() {
        let html = r#"
            <a href="/news/storm-1">Storm hits the coast today</a>
            <a href="article/storm-2">Storm moves further inland</a>"#;
        let found = run(html, GenericLimits::default());
        let urls: Vec<_> = found.iter().map(|c| c.url().as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/news/storm-1",
                "https://example.com/find/article/storm-2",
            ]
        );
    }

    #[test]
    fn test_skips_denylisted_short_and_non_article_links() {
        let html = r#"
            <a href="/account/login">Sign in to your account</a>
            <a href="/news/short">Short</a>
            <a href="/news/subscribe-offer">Subscribe now for full access</a>
            <a href="/">Home page of the site</a>
            <a href="/news/storm-1">Storm hits the coast today</a>"#;
        let found = run(html, GenericLimits::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title(), "Storm hits the coast today");
    }

    #[test]
    fn test_dedup_by_url_within_page() {
        let html = r#"
            <a href="/news/storm-1">Storm hits the coast today</a>
            <a href="https://example.com/news/storm-1"><h3>Storm hits the coast (again)</h3></a>"#;
        let found = run(html, GenericLimits::default());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_nearest_following_date() {
        let html = r#"
            <div class="result">
              <a href="/news/storm-1">Storm hits the coast today</a>
              <span class="meta-date">2 hours ago</span>
            </div>
            <div class="result">
              <a href="/news/storm-2">Storm moves further inland</a>
            </div>"#;
        let found = run(html, GenericLimits::default());
        assert_eq!(found[0].date_text(), "2 hours ago");
        assert_eq!(found[0].date(), Some(now() - TimeDelta::hours(2)));
        // nothing follows the second link
        assert_eq!(found[1].date_text(), RECENT);
        assert_eq!(found[1].date(), Some(now() - TimeDelta::days(3)));
    }

    #[test]
    fn test_caps() {
        let html: String = (0..40)
            .map(|i| format!(r#"<a href="/news/storm-{i}">Storm update number {i}</a>"#))
            .collect();
        assert_eq!(run(&html, GenericLimits::default()).len(), 5);

        let wide = GenericLimits {
            scan_limit: 30,
            max_candidates: 100,
            staleness_days: 3,
        };
        assert_eq!(run(&html, wide).len(), 30);
    }
}
