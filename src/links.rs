//! Heuristic test for "does this URL look like a news article".
//!
//! Patterns look at the part of the URL after the host, so a provider called
//! `news.example.com` does not make every one of its links an article.
//!
//! Decision order:
//! 1. a non-web scheme or any exclusion pattern matches → not an article, nothing can override it
//! 2. any inclusion pattern matches → article
//! 3. a provider-specific path hint matches → article
//! 4. otherwise: more than three path segments and no trailing slash

use once_cell::sync::Lazy;
use regex::Regex;
use url::{Position, Url};

use crate::scrapers;

/// Schemes that never lead to a page.
const EXCLUDE_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:"];

/// Substrings of the lowercased path, query and fragment that rule a URL out.
const EXCLUDE: &[&str] = &[
    "/login", "/signin", "/signup", "/register", "/subscribe", "/account", "/profile",
    "/video", "/gallery", "/podcast", "/newsletter", "/comment", "/tag/", "/tags/",
    "/category/", "/search", "/archive", "/about", "/contact", "/privacy", "/terms",
    "/home", "#", ".jpg", ".jpeg", ".png", ".gif",
];

static INCLUDE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"/article",
        r"/news",
        r"/story",
        r"/feature",
        r"/report",
        r"/opinion",
        r"/analysis",
        r"/world",
        r"/politics",
        r"/business",
        r"/technology",
        r"/health",
        r"/science",
        r"/sport",
        r"/culture",
        r"/\d{4}/\d{2}/\d{2}/",
        r"/\d{4}-\d{2}-\d{2}-",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("inclusion pattern"))
    .collect()
});

/// Classify `url` for the provider called `source`.
///
/// Provider hints come from the adapter registry; unregistered sources have
/// none.
pub fn is_article_link(url: &str, source: &str) -> bool {
    let hints = scrapers::adapter_for(source)
        .map(|a| a.article_hints)
        .unwrap_or(&[]);
    classify(url, hints)
}

/// Classification with explicit provider hints.
pub fn classify(url: &str, hints: &[&str]) -> bool {
    let lower = url.trim().to_lowercase();
    if EXCLUDE_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return false;
    }

    let (path, locator) = split_locator(&lower);
    if EXCLUDE.iter().any(|p| locator.contains(p)) {
        return false;
    }
    if INCLUDE.iter().any(|re| re.is_match(&path)) {
        return true;
    }

    if hints.iter().any(|h| path.contains(h)) {
        return true;
    }

    let segments = path.split('/').filter(|s| !s.is_empty()).count();
    segments > 3 && !path.ends_with('/')
}

/// The path of `url`, and everything after the host (path, query and
/// fragment). Relative references have no host to strip.
fn split_locator(url: &str) -> (String, String) {
    match Url::parse(url) {
        Ok(parsed) => (
            parsed.path().to_string(),
            parsed[Position::BeforePath..].to_string(),
        ),
        Err(_) => (
            url.split(['?', '#']).next().unwrap_or_default().to_string(),
            url.to_string(),
        ),
    }
}
