//! JSON output format for extracted statistics
//!
//! Always carries the full record for every run, whatever category was
//! selected. Absent metrics serialize as `null`.

use crate::analyze::RunReport;
use crate::error::StatsError;
use crate::selector::ActiveCore;
use crate::stats::RunStatistics;
use serde::Serialize;

/// One analyzed dump
#[derive(Debug, Clone, Serialize)]
pub struct JsonRun {
    /// Input path as given
    pub file: String,
    /// Core selected for detailed reporting
    pub active_core: ActiveCore,
    /// Everything extracted for that core
    pub statistics: RunStatistics,
}

/// A dump that could not be analyzed
#[derive(Debug, Clone, Serialize)]
pub struct JsonFileError {
    pub file: String,
    pub error: String,
}

/// Summary counts for the invocation
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of input files
    pub total_files: usize,
    /// Files analyzed successfully
    pub analyzed: usize,
    /// Files that failed to load or had no active core
    pub failed: usize,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Per-file records, in input order
    pub runs: Vec<JsonRun>,
    /// Per-file failures, in input order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonFileError>,
    /// Summary counts
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output structure
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "gem5-stats-json-v1".to_string(),
            runs: Vec::new(),
            errors: Vec::new(),
            summary: JsonSummary {
                total_files: 0,
                analyzed: 0,
                failed: 0,
            },
        }
    }

    /// Add an analyzed run to the output
    pub fn add_run(&mut self, report: &RunReport) {
        self.summary.total_files += 1;
        self.summary.analyzed += 1;
        self.runs.push(JsonRun {
            file: report.label.clone(),
            active_core: report.active_core.clone(),
            statistics: report.stats.clone(),
        });
    }

    /// Record a file that failed
    pub fn add_error(&mut self, file: &str, error: &StatsError) {
        self.summary.total_files += 1;
        self.summary.failed += 1;
        self.errors.push(JsonFileError {
            file: file.to_string(),
            error: error.to_string(),
        });
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}
