//! One HTTP request per enabled source, isolated from every other source.
//!
//! [`Dispatcher::dispatch`] fetches each source's search page, hands the body
//! to extraction and reports a [`SourceOutcome`] per source. A timeout, a
//! refused connection or a non-200 answer only empties that one source.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::{ExtractionSettings, HttpSettings};
use crate::dates::DateNormalizer;
use crate::error::FetchError;
use crate::models::{ArticleCandidate, SourceDescriptor};
use crate::scrapers::{self, ExtractRequest, ExtractionPath};
use crate::utils::truncate_for_log;

/// Placeholder replaced by the query in a search-URL template.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Fill `template` with `query`, spaces turned into `+` and nothing else
/// escaped. Templates without a placeholder get the query appended.
pub fn build_search_url(template: &str, query: &str) -> String {
    let q = query.trim().replace(' ', "+");
    if template.contains(QUERY_PLACEHOLDER) {
        template.replace(QUERY_PLACEHOLDER, &q)
    } else {
        format!("{}{}", template, q)
    }
}

/// What one source contributed to a session.
#[derive(Debug)]
pub enum SourceOutcome {
    Extracted {
        candidates: Vec<ArticleCandidate>,
        via: ExtractionPath,
    },
    /// The page was fetched but neither extractor found anything.
    Empty,
    Failed(FetchError),
}

#[derive(Debug)]
pub struct SourceReport {
    pub source: String,
    pub search_url: String,
    pub elapsed: Duration,
    pub outcome: SourceOutcome,
}

impl SourceReport {
    pub fn candidate_count(&self) -> usize {
        match &self.outcome {
            SourceOutcome::Extracted { candidates, .. } => candidates.len(),
            _ => 0,
        }
    }
}

/// Browser-like default headers sent with every request.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

/// Shared HTTP client plus the settings needed to fetch and extract.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    http: HttpSettings,
    extraction: ExtractionSettings,
    dates: DateNormalizer,
}

impl Dispatcher {
    pub fn new(
        http: HttpSettings,
        extraction: ExtractionSettings,
        dates: DateNormalizer,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .default_headers(browser_headers())
            .build()?;
        Ok(Self {
            client,
            http,
            extraction,
            dates,
        })
    }

    /// GET `url` and return its body. Anything but 200 is an error.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_page(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let url = url::Url::parse(url)?;
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Article pages use the content timeout.
    pub async fn fetch_article(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_page(url, self.http.content_timeout()).await
    }

    /// Fetch and extract a single source.
    #[instrument(level = "info", skip_all, fields(source = %source.name))]
    pub async fn search_source(
        &self,
        source: &SourceDescriptor,
        query: &str,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> SourceReport {
        let t0 = Instant::now();
        let search_url = build_search_url(&source.search_url, query);

        let fetched = tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            res = self.fetch_page(&search_url, self.http.timeout()) => res,
        };

        let outcome = match fetched {
            Ok(html) => {
                debug!(bytes = html.len(), preview = %truncate_for_log(&html, 120), "Fetched search page");
                let req = ExtractRequest {
                    source: &source.name,
                    search_url: &search_url,
                    query,
                    now,
                    dates: &self.dates,
                };
                let limits = self.extraction.limits_for(source);
                let (candidates, via) = scrapers::extract_page(&html, &req, &limits);
                if candidates.is_empty() {
                    SourceOutcome::Empty
                } else {
                    SourceOutcome::Extracted { candidates, via }
                }
            }
            Err(e) => {
                warn!(%search_url, error = %e, "Source fetch failed; skipping source");
                SourceOutcome::Failed(e)
            }
        };

        let report = SourceReport {
            source: source.name.clone(),
            search_url,
            elapsed: t0.elapsed(),
            outcome,
        };
        info!(
            count = report.candidate_count(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Source finished"
        );
        report
    }

    /// Search every source in `sources`, at most `concurrency` at a time.
    ///
    /// Reports come back in the order of `sources`. `on_progress` hears about
    /// each source as its request starts and again when its report is ready.
    pub async fn dispatch<F>(
        &self,
        sources: &[SourceDescriptor],
        query: &str,
        concurrency: usize,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Vec<SourceReport>
    where
        F: Fn(Progress<'_>),
    {
        let now = Utc::now();
        stream::iter(0..sources.len())
            .map(|i| {
                let source = &sources[i];
                on_progress(Progress::Started(source));
                self.search_source(source, query, now, cancel)
            })
            .buffered(concurrency.max(1))
            .inspect(|report| on_progress(Progress::Finished(report)))
            .collect()
            .await
    }
}

/// Per-source notifications raised by [`Dispatcher::dispatch`].
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Started(&'a SourceDescriptor),
    Finished(&'a SourceReport),
}
