//! gem5-stats - statistics extraction for gem5 simulator dumps
//!
//! This library finds the active CPU core in a `stats.txt` dump, extracts
//! its counters (CPU, load/store queue, functional units, data cache,
//! memory dependence unit, branch prediction) together with every memory
//! controller, and lays several runs out side by side for comparison.

pub mod analyze;
pub mod cli;
pub mod compare;
pub mod config;
pub mod csv_output;
pub mod dump;
pub mod error;
pub mod extractor;
pub mod json_output;
pub mod selector;
pub mod stats;
pub mod text_output;

pub use error::{Result, StatsError};
pub use extractor::extract_statistics;
pub use selector::select_active_core;
