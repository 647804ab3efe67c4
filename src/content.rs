//! Plain-text extraction of a single article page.
//!
//! [`fetch_content`] never fails. Network or status errors come back as a
//! [`ContentBody::Error`] telling the reader to open the page in a browser.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{info, instrument, warn};

use crate::config::ContentSettings;
use crate::dates::parse_absolute;
use crate::fetch::Dispatcher;
use crate::models::{ContentBody, ContentExtractionResult};
use crate::scrapers::chain::SelectorChain;
use crate::utils::{collapse_whitespace, element_text, truncate_chars, wrap_text};

/// Shown when no paragraph survives filtering.
pub const UNAVAILABLE: &str = "Could not extract article content. The website may use dynamic loading or have restricted access.";

/// Appended after a truncated body.
pub const TRUNCATION_NOTE: &str = "[Article truncated. Open it in a browser to read the full article]";

static BODY: Lazy<SelectorChain> = Lazy::new(|| {
    SelectorChain::new(&[
        "article p",
        ".article-body p",
        ".story-body p",
        ".content p",
        "main p",
    ])
});

static PUBLISHED: Lazy<SelectorChain> = Lazy::new(|| {
    SelectorChain::new(&[
        r#"meta[property="article:published_time"]"#,
        r#"meta[name="pubdate"]"#,
    ])
});
static TIME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("time selector"));
static AUTHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="author"]"#).expect("author selector"));
static PAGE_TITLE: Lazy<SelectorChain> =
    Lazy::new(|| SelectorChain::new(&[r#"meta[property="og:title"]"#, "title", "h1"]));

/// Fetch `url` and extract its body text.
///
/// `title` is the headline the caller already knows; the page's own title is
/// used when it is `None`.
#[instrument(level = "info", skip(dispatcher, settings))]
pub async fn fetch_content(
    dispatcher: &Dispatcher,
    url: &str,
    title: Option<&str>,
    settings: &ContentSettings,
) -> ContentExtractionResult {
    match dispatcher.fetch_article(url).await {
        Ok(html) => {
            let result = extract_content(&html, url, title, settings);
            info!(truncated = result.truncated(), "Article extracted");
            result
        }
        Err(e) => {
            warn!(error = %e, "Article fetch failed");
            ContentExtractionResult {
                title: title.unwrap_or(url).to_string(),
                url: url.to_string(),
                published: None,
                authors: Vec::new(),
                body: ContentBody::Error {
                    message: format!(
                        "Error loading article: {e}\n\nPlease try opening in browser instead."
                    ),
                },
            }
        }
    }
}

/// Extract title, metadata and body from an already fetched page.
pub fn extract_content(
    html: &str,
    url: &str,
    title: Option<&str>,
    settings: &ContentSettings,
) -> ContentExtractionResult {
    let document = Html::parse_document(html);
    let title = match title {
        Some(t) => t.to_string(),
        None => page_title(&document).unwrap_or_else(|| url.to_string()),
    };
    ContentExtractionResult {
        title,
        url: url.to_string(),
        published: published_time(&document),
        authors: authors(&document),
        body: extract_body(&document, settings),
    }
}

/// Paragraphs from the first matching container selector, filtered,
/// truncated and wrapped.
pub fn extract_body(document: &Html, settings: &ContentSettings) -> ContentBody {
    let paragraphs: Vec<String> = BODY
        .select_all(document.root_element())
        .iter()
        .map(element_text)
        .filter(|p| p.chars().count() >= settings.min_paragraph_len)
        .collect();

    if paragraphs.is_empty() {
        return ContentBody::Text {
            text: UNAVAILABLE.to_string(),
            truncated: false,
        };
    }

    let joined = paragraphs.join("\n\n");
    let (kept, truncated) = truncate_chars(&joined, settings.max_chars);
    let mut text = kept
        .split("\n\n")
        .map(|p| wrap_text(p, settings.wrap_width))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if truncated {
        text.push_str("\n\n");
        text.push_str(TRUNCATION_NOTE);
    }
    ContentBody::Text { text, truncated }
}

fn page_title(document: &Html) -> Option<String> {
    let root = document.root_element();
    PAGE_TITLE
        .first_attr(root, "content")
        .map(|t| collapse_whitespace(&t))
        .filter(|t| !t.is_empty())
        .or_else(|| PAGE_TITLE.first_text(root))
}

fn published_time(document: &Html) -> Option<DateTime<Utc>> {
    let root = document.root_element();
    PUBLISHED
        .first_attr(root, "content")
        .or_else(|| {
            root.select(&TIME)
                .find_map(|t| t.value().attr("datetime").map(str::to_string))
        })
        .and_then(|raw| parse_absolute(raw.trim()))
}

fn authors(document: &Html) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for meta in document.select(&AUTHOR) {
        let Some(content) = meta.value().attr("content") else {
            continue;
        };
        for name in content.split(',').map(collapse_whitespace) {
            if !name.is_empty() && !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtractionSettings, HttpSettings};
    use crate::dates::DateNormalizer;
    use crate::fetch::test_server;

    fn settings() -> ContentSettings {
        ContentSettings::default()
    }

    fn body_text(body: &ContentBody) -> &str {
        match body {
            ContentBody::Text { text, .. } => text,
            ContentBody::Error { message } => panic!("unexpected error body: {message}"),
        }
    }

    fn dispatcher() -> Dispatcher {
        let http = HttpSettings {
            timeout_secs: 2,
            content_timeout_secs: 2,
            ..HttpSettings::default()
        };
        Dispatcher::new(http, ExtractionSettings::default(), DateNormalizer::default()).unwrap()
    }

    #[test]
    fn test_body_filters_short_paragraphs() {
        let html = r#"<article>
            <p>Share</p>
            <p>The council approved the new flood defences on Tuesday.</p>
            <p>Advertisement</p>
            <p>Work is expected to begin in the spring of next year.</p>
        </article>"#;
        let body = extract_body(&Html::parse_document(html), &settings());
        assert_eq!(
            body_text(&body),
            "The council approved the new flood defences on Tuesday.\n\nWork is expected to begin in the spring of next year."
        );
    }

    #[test]
    fn test_body_selector_fallback() {
        let html = r#"<div class="content"><p>Paragraph from the generic content block.</p></div>
            <main><p>Paragraph from main that should not be used.</p></main>"#;
        let body = extract_body(&Html::parse_document(html), &settings());
        assert_eq!(body_text(&body), "Paragraph from the generic content block.");
    }

    #[test]
    fn test_unavailable_when_nothing_qualifies() {
        let html = "<html><body><p>Too short</p></body></html>";
        let body = extract_body(&Html::parse_document(html), &settings());
        assert_eq!(
            body,
            ContentBody::Text {
                text: UNAVAILABLE.to_string(),
                truncated: false
            }
        );
    }

    #[test]
    fn test_truncates_and_wraps() {
        let sentence = "The storm moved slowly along the coast overnight. ";
        let html = format!("<article><p>{}</p></article>", sentence.repeat(40));
        let body = extract_body(&Html::parse_document(&html), &settings());
        let ContentBody::Text { text, truncated } = &body else {
            panic!("expected text");
        };
        assert!(*truncated);
        assert!(text.ends_with(TRUNCATION_NOTE));
        let without_note = text.trim_end_matches(TRUNCATION_NOTE).trim_end();
        let chars: usize = without_note.lines().map(|l| l.chars().count()).sum();
        assert!(chars <= 1000);
        for line in without_note.lines() {
            assert!(line.chars().count() <= 80, "{line}");
        }
    }

    #[test]
    fn test_metadata() {
        let html = r#"<html><head>
            <title>Page title | Example</title>
            <meta property="article:published_time" content="2025-05-06T08:30:00+00:00">
            <meta name="author" content="Jane Doe, John Roe">
        </head><body><article><p>Body paragraph that is long enough.</p></article></body></html>"#;
        let result = extract_content(html, "https://example.com/a", None, &settings());
        assert_eq!(result.title, "Page title | Example");
        assert_eq!(
            result.published.map(|d| d.to_rfc3339()).as_deref(),
            Some("2025-05-06T08:30:00+00:00")
        );
        assert_eq!(result.authors, vec!["Jane Doe", "John Roe"]);

        let named = extract_content(html, "https://example.com/a", Some("Known headline"), &settings());
        assert_eq!(named.title, "Known headline");
    }

    #[test]
    fn test_time_element_fallback() {
        let html = r#"<article><time datetime="2024-03-15">March 15</time>
            <p>Body paragraph that is long enough.</p></article>"#;
        let result = extract_content(html, "https://example.com/a", None, &settings());
        assert_eq!(
            result.published.map(|d| d.to_rfc3339()).as_deref(),
            Some("2024-03-15T00:00:00+00:00")
        );
        assert_eq!(result.title, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_unreachable_article_is_error_result() {
        let result = fetch_content(
            &dispatcher(),
            "http://127.0.0.1:1/news/story",
            Some("A story"),
            &settings(),
        )
        .await;
        assert!(result.is_error());
        let ContentBody::Error { message } = &result.body else {
            panic!("expected error body");
        };
        assert!(message.starts_with("Error loading article: "));
        assert!(message.ends_with("Please try opening in browser instead."));
        assert_eq!(result.title, "A story");
    }

    #[tokio::test]
    async fn test_fetch_content_from_server() {
        let page = r#"<html><body><main>
            <p>Rescue teams reached the village early this morning.</p>
        </main></body></html>"#;
        let origin = test_server::serve(vec![("/story", 200, page.to_string())]).await;
        let url = format!("{origin}/story");
        let result = fetch_content(&dispatcher(), &url, Some("Rescue teams"), &settings()).await;
        assert!(!result.is_error());
        assert_eq!(
            body_text(&result.body),
            "Rescue teams reached the village early this morning."
        );
    }
}
