//! Command-line interface definitions for News Search.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The settings file path can also come from the environment.

use clap::{Args, Parser, Subcommand};

use crate::outputs::OutputFormat;
use crate::rank::SortKey;

/// Command-line arguments for the News Search application.
///
/// # Examples
///
/// ```sh
/// # Search every enabled source
/// news_search search climate policy
///
/// # Two sources, newest first, then read the top hit
/// news_search search election -s BBC -s NPR --sort date --read 1
///
/// # Read one article directly
/// news_search read https://www.npr.org/2025/05/06/1234/story --title "Story"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, env = "NEWS_SEARCH_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the enabled sources and print ranked headlines
    Search(SearchArgs),

    /// Fetch one article and print its text
    Read {
        url: String,

        /// Headline to show instead of the page's own title
        #[arg(long)]
        title: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the configured sources
    Sources,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search terms; several words form one query
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Only search these sources (repeatable, case-insensitive)
    #[arg(short = 's', long = "source")]
    pub sources: Vec<String>,

    #[arg(long, value_enum, default_value_t = SortKey::Relevance)]
    pub sort: SortKey,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print result statistics (JSON output always carries them)
    #[arg(long)]
    pub stats: bool,

    /// Read the Nth result (1-based) after listing
    #[arg(long, value_name = "N")]
    pub read: Option<usize>,

    /// Sources fetched at once (overrides the settings file)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Give up on unfinished sources after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

impl SearchArgs {
    pub fn query(&self) -> String {
        self.query.join(" ")
    }
}
