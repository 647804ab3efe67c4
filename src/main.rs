//! # News Search
//!
//! Searches several news providers at once and merges their headlines into
//! one ranked list. Any article from that list can then be read as plain
//! text.
//!
//! ## Usage
//!
//! ```sh
//! news_search search climate policy --stats
//! news_search search election --sort date --read 1
//! news_search read https://www.bbc.co.uk/news/articles/example
//! news_search sources
//! ```
//!
//! ## Architecture
//!
//! The search pipeline runs in stages:
//! 1. **Fetching**: one GET per enabled source, failures isolated per source
//! 2. **Extraction**: the provider's adapter, or generic heuristics when it finds nothing
//! 3. **Annotation**: date normalization and relevance scoring per headline
//! 4. **Ranking**: merge every source and sort (relevance, date or source)
//! 5. **Output**: text listing or JSON, plus an optional article read

use clap::Parser;
use std::error::Error;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod content;
mod dates;
mod error;
mod fetch;
mod links;
mod models;
mod outputs;
mod rank;
mod relevance;
mod scrapers;
mod session;
mod utils;

use cli::{Cli, Command, SearchArgs};
use config::Settings;
use outputs::{OutputFormat, json, text};
use session::Searcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref())?;

    match args.command {
        Command::Search(search) => run_search(settings, search).await?,
        Command::Read { url, title, format } => {
            let searcher = Searcher::new(&settings)?;
            let result = searcher.read(&url, title.as_deref()).await?;
            if result.is_error() {
                warn!(%url, "Article could not be read; try a browser");
            }
            let mut out = std::io::stdout().lock();
            match format {
                OutputFormat::Text => text::write_content(&result, &mut out)?,
                OutputFormat::Json => json::write_content(&result, &mut out)?,
            }
        }
        Command::Sources => {
            text::write_sources(&settings.sources, &mut std::io::stdout().lock())?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn run_search(mut settings: Settings, args: SearchArgs) -> Result<(), Box<dyn Error>> {
    if let Some(n) = args.concurrency {
        settings.session.concurrency = n;
    }
    if let Some(secs) = args.deadline_secs {
        settings.session.deadline_secs = Some(secs);
    }

    let sources = settings.select_sources(&args.sources);
    if sources.is_empty() && !args.sources.is_empty() {
        warn!(requested = ?args.sources, "None of the requested sources is configured and enabled");
    }

    let searcher = Searcher::new(&settings)?;
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing with the sources fetched so far");
            on_interrupt.cancel();
        }
    });

    let mut session = searcher.search(&args.query(), sources, cancel).await?;
    session.resort(args.sort);

    let article = match args.read {
        Some(n) => match session.results.nth(n) {
            Some(item) => Some(searcher.read(item.url().as_str(), Some(item.title())).await?),
            None => {
                warn!(n, available = session.results.len(), "No result with that number to read");
                None
            }
        },
        None => None,
    };

    let mut out = std::io::stdout().lock();
    match args.format {
        OutputFormat::Json => json::write_session(&session, article.as_ref(), &mut out)?,
        OutputFormat::Text => {
            text::write_results(&session, &mut out)?;
            if args.stats {
                text::write_stats(&session.results.stats(), &mut out)?;
            }
            if let Some(article) = &article {
                writeln!(out)?;
                text::write_content(article, &mut out)?;
            }
        }
    }
    Ok(())
}
