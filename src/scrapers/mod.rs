//! Search-result extraction for news providers.
//!
//! Every known provider is described by a [`SourceAdapter`]: pure data listing
//! selectors in priority order. One shared algorithm, [`extract`], consumes
//! any adapter. Pages from unknown providers, or pages where the adapter finds
//! nothing, go through the heuristic [`generic`] extractor instead.
//!
//! # Registered Providers
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | AP News | [`apnews`] | |
//! | Reuters | [`reuters`] | |
//! | BBC | [`bbc`] | Undated results are assumed one day old |
//! | NPR | [`npr`] | |
//! | The Guardian | [`guardian`] | |
//! | Al Jazeera | [`aljazeera`] | |
//! | CNN | [`cnn`] | |
//! | The New York Times | [`nyt`] | |
//!
//! Adding a provider means adding a module with one `ADAPTER` constant and
//! listing it in [`REGISTRY`].

use chrono::{DateTime, TimeDelta, Utc};
use itertools::Itertools;
use scraper::{ElementRef, Html};
use tracing::{debug, instrument};
use url::Url;

use crate::dates::DateNormalizer;
use crate::models::{ArticleCandidate, RECENT};

pub mod aljazeera;
pub mod apnews;
pub mod bbc;
pub mod chain;
pub mod cnn;
pub mod generic;
pub mod guardian;
pub mod npr;
pub mod nyt;
pub mod reuters;

use chain::SelectorChain;

/// Registered adapters never return more than this many candidates.
pub const ADAPTER_CAP: usize = 5;

/// What to record when a result has no date element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePolicy {
    /// Keep [`RECENT`] as text and leave the candidate undated.
    Unset,
    /// Keep [`RECENT`] as text and date the candidate this many days back.
    AssumeDaysOld(i64),
}

/// Extraction configuration for one provider's search page.
#[derive(Debug, Clone, Copy)]
pub struct SourceAdapter {
    /// Matches [`SourceDescriptor::name`](crate::models::SourceDescriptor).
    pub name: &'static str,
    /// Relative links are joined onto this origin.
    pub base_origin: &'static str,
    pub containers: &'static [&'static str],
    pub titles: &'static [&'static str],
    pub links: &'static [&'static str],
    pub dates: &'static [&'static str],
    pub date_policy: DatePolicy,
    /// Path fragments that mark an article URL on this provider.
    pub article_hints: &'static [&'static str],
}

pub static REGISTRY: &[SourceAdapter] = &[
    apnews::ADAPTER,
    reuters::ADAPTER,
    bbc::ADAPTER,
    npr::ADAPTER,
    guardian::ADAPTER,
    aljazeera::ADAPTER,
    cnn::ADAPTER,
    nyt::ADAPTER,
];

/// The registered adapter for `source`, if any.
pub fn adapter_for(source: &str) -> Option<&'static SourceAdapter> {
    REGISTRY.iter().find(|a| a.name == source)
}

/// Per-page inputs shared by the adapter and generic extractors.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRequest<'a> {
    pub source: &'a str,
    pub search_url: &'a str,
    pub query: &'a str,
    pub now: DateTime<Utc>,
    pub dates: &'a DateNormalizer,
}

/// Whether a date element has anything to read: text, or a `datetime`
/// attribute.
fn carries_date(element: &ElementRef<'_>) -> bool {
    !crate::utils::element_text(element).is_empty()
        || element
            .value()
            .attr("datetime")
            .is_some_and(|d| !d.trim().is_empty())
}

impl ExtractRequest<'_> {
    /// Read a date element's text (or its `datetime` attribute when the text
    /// is blank) and normalize it.
    pub(crate) fn date_from(&self, element: ElementRef<'_>) -> (String, Option<DateTime<Utc>>) {
        let mut text = crate::utils::element_text(&element);
        if text.is_empty() {
            text = element
                .value()
                .attr("datetime")
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
        }
        if text.is_empty() {
            return (RECENT.to_string(), None);
        }
        let date = self.dates.normalize(&text, self.now);
        (text, date)
    }
}

/// How a source's candidates were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPath {
    Adapter,
    Generic,
}

/// Limits applied by the generic extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericLimits {
    /// Anchors inspected, in document order.
    pub scan_limit: usize,
    /// Candidates returned.
    pub max_candidates: usize,
    /// Age given to candidates without a nearby date element.
    pub staleness_days: i64,
}

impl Default for GenericLimits {
    fn default() -> Self {
        Self {
            scan_limit: 30,
            max_candidates: 5,
            staleness_days: 3,
        }
    }
}

/// Run `adapter` over a parsed search page.
///
/// Never fails: containers missing a title or link are dropped, and a page
/// that matches none of the container selectors gives an empty list.
#[instrument(level = "debug", skip_all, fields(source = %adapter.name))]
pub fn extract(document: &Html, adapter: &SourceAdapter, req: &ExtractRequest<'_>) -> Vec<ArticleCandidate> {
    let Ok(base) = Url::parse(adapter.base_origin) else {
        debug!(base = adapter.base_origin, "Adapter base origin is not a URL");
        return Vec::new();
    };
    let containers = SelectorChain::new(adapter.containers);
    let titles = SelectorChain::new(adapter.titles);
    let links = SelectorChain::new(adapter.links);
    let dates = SelectorChain::new(adapter.dates);

    containers
        .select_all(document.root_element())
        .into_iter()
        .take(ADAPTER_CAP)
        .filter_map(|container| {
            let Some(title) = titles.first_text(container) else {
                debug!("Container without title; dropping");
                return None;
            };
            let href = links.first_attr(container, "href").or_else(|| {
                (container.value().name() == "a")
                    .then(|| container.value().attr("href"))
                    .flatten()
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
            });
            let Some(href) = href else {
                debug!(%title, "Container without link; dropping");
                return None;
            };
            let url = match base.join(&href) {
                Ok(u) => u,
                Err(e) => {
                    debug!(%href, error = %e, "Unresolvable link; dropping");
                    return None;
                }
            };

            let (date_text, date) = match dates.first_where(container, carries_date) {
                Some(el) => req.date_from(el),
                None => {
                    let assumed = match adapter.date_policy {
                        DatePolicy::Unset => None,
                        DatePolicy::AssumeDaysOld(days) => TimeDelta::try_days(days)
                            .and_then(|age| req.now.checked_sub_signed(age)),
                    };
                    (RECENT.to_string(), assumed)
                }
            };

            ArticleCandidate::new(req.source, &title, url, &date_text, date, req.query)
        })
        .unique_by(|c| c.url().clone())
        .collect()
}

/// Extract candidates from a search page for `req.source`.
///
/// Uses the registered adapter when there is one and it finds anything;
/// otherwise the generic extractor.
pub fn extract_page(
    html: &str,
    req: &ExtractRequest<'_>,
    limits: &GenericLimits,
) -> (Vec<ArticleCandidate>, ExtractionPath) {
    let document = Html::parse_document(html);

    if let Some(adapter) = adapter_for(req.source) {
        let found = extract(&document, adapter, req);
        if !found.is_empty() {
            return (found, ExtractionPath::Adapter);
        }
        debug!(source = %req.source, "Adapter found nothing; using generic extraction");
    }
    (
        generic::extract_generic(&document, req, limits),
        ExtractionPath::Generic,
    )
}
