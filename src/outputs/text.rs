//! Plain-text rendering for terminals.

use std::io::{self, Write};

use crate::fetch::{SourceOutcome, SourceReport};
use crate::models::{ContentBody, ContentExtractionResult, SourceDescriptor};
use crate::rank::{ResultStats, SortKey};
use crate::scrapers::adapter_for;
use crate::session::SearchSession;

fn sort_label(key: SortKey) -> &'static str {
    match key {
        SortKey::Relevance => "relevance",
        SortKey::Date => "date",
        SortKey::Source => "source",
    }
}

/// Numbered result list followed by a line per skipped source.
///
/// ```text
/// 3 results for "climate policy" (sorted by relevance)
///
///   1. [19] New climate policy unveiled
///      BBC | 2 hours ago
///      https://www.bbc.co.uk/news/...
/// ```
pub fn write_results<W: Write>(session: &SearchSession, out: &mut W) -> io::Result<()> {
    let results = &session.results;
    writeln!(
        out,
        "{} result{} for \"{}\" (sorted by {})",
        results.len(),
        if results.len() == 1 { "" } else { "s" },
        session.query,
        sort_label(results.sort_key())
    )?;

    if results.is_empty() {
        writeln!(out)?;
        writeln!(out, "No matching headlines.")?;
    }
    for (i, c) in results.items().iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "{:>3}. [{}] {}", i + 1, c.relevance(), c.title())?;
        writeln!(out, "     {} | {}", c.source(), c.date_text())?;
        writeln!(out, "     {}", c.url())?;
    }

    let skipped: Vec<&SourceReport> = session.failed_sources().collect();
    if !skipped.is_empty() {
        writeln!(out)?;
        for report in skipped {
            if let SourceOutcome::Failed(e) = &report.outcome {
                writeln!(out, "Skipped {}: {}", report.source, e)?;
            }
        }
    }
    Ok(())
}

pub fn write_stats<W: Write>(stats: &ResultStats, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Total results:      {}", stats.total)?;
    writeln!(out, "Average relevance:  {:.1}", stats.average_relevance)?;
    if let (Some(earliest), Some(latest)) = (stats.earliest, stats.latest) {
        writeln!(
            out,
            "Date range:         {} to {}",
            earliest.format("%Y-%m-%d"),
            latest.format("%Y-%m-%d")
        )?;
    }
    for (source, count) in &stats.per_source {
        writeln!(out, "  {source}: {count}")?;
    }
    Ok(())
}

/// Header lines, then the body text or the error message.
pub fn write_content<W: Write>(result: &ContentExtractionResult, out: &mut W) -> io::Result<()> {
    if let ContentBody::Error { message } = &result.body {
        return writeln!(out, "{message}");
    }
    writeln!(out, "Title: {}", result.title)?;
    writeln!(out, "URL: {}", result.url)?;
    writeln!(out)?;
    if let Some(published) = result.published {
        writeln!(out, "Published: {}", published.format("%Y-%m-%d %H:%M"))?;
        writeln!(out)?;
    }
    if !result.authors.is_empty() {
        writeln!(out, "Authors: {}", result.authors.join(", "))?;
        writeln!(out)?;
    }
    if let ContentBody::Text { text, .. } = &result.body {
        writeln!(out, "{text}")?;
    }
    Ok(())
}

/// One line per configured source.
pub fn write_sources<W: Write>(sources: &[SourceDescriptor], out: &mut W) -> io::Result<()> {
    for s in sources {
        writeln!(
            out,
            "{:<20} {:<8} {:<8} {}",
            s.name,
            if s.enabled { "enabled" } else { "disabled" },
            if adapter_for(&s.name).is_some() { "adapter" } else { "generic" },
            s.search_url
        )?;
    }
    Ok(())
}
