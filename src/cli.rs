//! CLI argument parsing for gem5-stats

use crate::compare::Category;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for category tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Grid tables for the terminal (default)
    Text,
    /// Full records as JSON for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "gem5-stats")]
#[command(version)]
#[command(
    about = "Extract and compare statistics from gem5 stats.txt dumps",
    long_about = None
)]
pub struct Cli {
    /// Stat dumps to analyze; several are compared side by side
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Category of statistics to display
    #[arg(short = 'c', long = "category", value_enum)]
    pub category: Category,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// TOML report configuration file
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Text shown for metrics a dump does not report (overrides config)
    #[arg(long = "missing", value_name = "TEXT")]
    pub missing: Option<String>,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
