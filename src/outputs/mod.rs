//! Rendering of search sessions and article reads.
//!
//! # Submodules
//!
//! - [`json`]: machine-readable output, one JSON document per command
//! - [`text`]: the numbered listing, stats block and article view for terminals
//!
//! Both write to any [`std::io::Write`], so tests render into a `Vec<u8>`.

pub mod json;
pub mod text;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
