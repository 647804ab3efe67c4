//! JSON output.
//!
//! A search is written as one object:
//! ```text
//! {
//!   "query": "climate policy",
//!   "sort": "relevance",
//!   "started_at": "...",
//!   "elapsed_ms": 812,
//!   "sources": [ { "name": "BBC", "status": "extracted", "via": "adapter", "count": 5, ... } ],
//!   "results": [ { "source": "BBC", "title": "...", "url": "...", "date_text": "...", "date": "...", "relevance": 19 } ],
//!   "stats": { ... },
//!   "article": { ... }     // with --read N
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::io::Write;
use tracing::{info, instrument};

use crate::fetch::{SourceOutcome, SourceReport};
use crate::models::{ArticleCandidate, ContentExtractionResult};
use crate::rank::{ResultStats, SortKey};
use crate::scrapers::ExtractionPath;
use crate::session::SearchSession;

#[derive(Serialize)]
struct SearchDocument<'a> {
    query: &'a str,
    sort: SortKey,
    started_at: DateTime<Utc>,
    elapsed_ms: u64,
    sources: Vec<SourceSummary<'a>>,
    results: &'a [ArticleCandidate],
    stats: ResultStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    article: Option<&'a ContentExtractionResult>,
}

#[derive(Serialize)]
struct SourceSummary<'a> {
    name: &'a str,
    search_url: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    via: Option<ExtractionPath>,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    elapsed_ms: u64,
}

impl<'a> From<&'a SourceReport> for SourceSummary<'a> {
    fn from(report: &'a SourceReport) -> Self {
        let (status, via, error) = match &report.outcome {
            SourceOutcome::Extracted { via, .. } => ("extracted", Some(*via), None),
            SourceOutcome::Empty => ("empty", None, None),
            SourceOutcome::Failed(e) => ("failed", None, Some(e.to_string())),
        };
        Self {
            name: &report.source,
            search_url: &report.search_url,
            status,
            via,
            count: report.candidate_count(),
            error,
            elapsed_ms: report.elapsed.as_millis() as u64,
        }
    }
}

/// Write `session` as a pretty-printed JSON document.
#[instrument(level = "debug", skip_all, fields(results = session.results.len()))]
pub fn write_session<W: Write>(
    session: &SearchSession,
    article: Option<&ContentExtractionResult>,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let doc = SearchDocument {
        query: &session.query,
        sort: session.results.sort_key(),
        started_at: session.started_at,
        elapsed_ms: session.elapsed.as_millis() as u64,
        sources: session.reports.iter().map(SourceSummary::from).collect(),
        results: session.results.items(),
        stats: session.results.stats(),
        article,
    };
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    info!("Wrote JSON search results");
    Ok(())
}

pub fn write_content<W: Write>(
    result: &ContentExtractionResult,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer_pretty(&mut *out, result)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::{ContentBody, RECENT};
    use crate::rank::RankedResults;
    use std::time::Duration;
    use url::Url;

    fn session() -> SearchSession {
        let candidate = ArticleCandidate::new(
            "BBC",
            "New climate policy unveiled",
            Url::parse("https://www.bbc.co.uk/news/1").unwrap(),
            RECENT,
            None,
            "climate policy",
        )
        .unwrap();
        SearchSession {
            query: "climate policy".to_string(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(40),
            reports: vec![
                SourceReport {
                    source: "BBC".to_string(),
                    search_url: "https://www.bbc.co.uk/search?q=climate+policy".to_string(),
                    elapsed: Duration::from_millis(30),
                    outcome: SourceOutcome::Extracted {
                        candidates: vec![candidate.clone()],
                        via: ExtractionPath::Adapter,
                    },
                },
                SourceReport {
                    source: "Reuters".to_string(),
                    search_url: "https://www.reuters.com/search/news?blob=climate+policy".to_string(),
                    elapsed: Duration::from_millis(10),
                    outcome: SourceOutcome::Failed(FetchError::Status(403)),
                },
            ],
            results: RankedResults::new(vec![candidate]),
        }
    }

    #[test]
    fn test_session_document_shape() {
        let mut buf = Vec::new();
        write_session(&session(), None, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["query"], "climate policy");
        assert_eq!(value["sort"], "relevance");
        assert_eq!(value["results"][0]["relevance"], 19);
        assert_eq!(value["results"][0]["date_text"], "Recent");
        assert!(value["results"][0]["date"].is_null());
        assert_eq!(value["sources"][0]["via"], "adapter");
        assert_eq!(value["sources"][1]["status"], "failed");
        assert_eq!(value["sources"][1]["error"], "unexpected status 403");
        assert_eq!(value["stats"]["total"], 1);
        assert!(value.get("article").is_none());
    }

    #[test]
    fn test_content_document() {
        let result = ContentExtractionResult {
            title: "Story".to_string(),
            url: "https://example.com/story".to_string(),
            published: None,
            authors: vec!["Jane Doe".to_string()],
            body: ContentBody::Text {
                text: "Body".to_string(),
                truncated: false,
            },
        };
        let mut buf = Vec::new();
        write_content(&result, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["body"]["status"], "text");
        assert_eq!(value["body"]["truncated"], false);
        assert_eq!(value["authors"][0], "Jane Doe");
    }
}
