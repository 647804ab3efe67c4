//! Data models for sources, candidates and extracted article content.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceDescriptor`]: A configured provider search page
//! - [`ArticleCandidate`]: One headline found on a provider's search page
//! - [`ContentExtractionResult`]: The body text of a single article
//!
//! Candidates are validated on construction and cannot be modified afterwards,
//! so their URL is always absolute and their title always long enough.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::relevance;

/// Titles must be longer than this many characters.
pub const MIN_TITLE_LEN: usize = 10;

/// Date text recorded when a provider shows no date at all.
pub const RECENT: &str = "Recent";

/// A news provider's search page.
///
/// `search_url` contains a `{query}` placeholder; templates without one get
/// the query appended.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDescriptor {
    /// Unique display name, also used to look up the registered adapter.
    pub name: String,
    pub search_url: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Overrides the generic extractor's candidate cap for this source.
    #[serde(default)]
    pub generic_cap: Option<usize>,
}

fn enabled_by_default() -> bool {
    true
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, search_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search_url: search_url.into(),
            enabled: true,
            generic_cap: None,
        }
    }
}

/// A headline extracted from one source's search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleCandidate {
    source: String,
    title: String,
    url: Url,
    date_text: String,
    date: Option<DateTime<Utc>>,
    relevance: u32,
}

impl ArticleCandidate {
    /// Build a candidate, or `None` if the title is too short once its
    /// whitespace is collapsed.
    ///
    /// The relevance score is computed here from `title` and `query`.
    pub fn new(
        source: &str,
        title: &str,
        url: Url,
        date_text: &str,
        date: Option<DateTime<Utc>>,
        query: &str,
    ) -> Option<Self> {
        let title = crate::utils::collapse_whitespace(title);
        if title.chars().count() <= MIN_TITLE_LEN {
            return None;
        }
        let relevance = relevance::score(&title, query);
        Some(Self {
            source: source.to_string(),
            title,
            url,
            date_text: date_text.to_string(),
            date,
            relevance,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The date exactly as the provider printed it, or [`RECENT`].
    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    /// Normalized publication time; `None` means undated.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn relevance(&self) -> u32 {
        self.relevance
    }
}

/// Body text of one article, or the reason it could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContentBody {
    Text { text: String, truncated: bool },
    Error { message: String },
}

/// Result of reading a single article page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentExtractionResult {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    pub body: ContentBody,
}

impl ContentExtractionResult {
    pub fn is_error(&self) -> bool {
        matches!(self.body, ContentBody::Error { .. })
    }

    pub fn truncated(&self) -> bool {
        matches!(self.body, ContentBody::Text { truncated: true, .. })
    }
}
