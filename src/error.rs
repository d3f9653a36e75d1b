//! Error types for stat dump analysis
//!
//! Every error here is local to one input file: a failure while analyzing
//! one dump never aborts the others in a comparison.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or analyzing a single stat dump
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Cannot read stat file {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No active core found: no numCycles or committedInsts lines for any cpu")]
    NoActiveCoreFound,

    /// Text captured by a numeric matcher failed to parse
    #[error("Malformed number for {field}: {text:?}")]
    MalformedNumber { field: &'static str, text: String },

    #[error("Invalid stat pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid report configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;
