// Report configuration
//
// Loaded from an optional TOML file; command-line flags override individual
// fields afterwards.

use crate::error::{Result, StatsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings shared by the analysis pipeline and every renderer
///
/// # Example
/// ```
/// use gem5_stats::config::ReportConfig;
///
/// let config = ReportConfig::default();
/// assert_eq!(config.max_files, 3);
/// assert_eq!(config.missing_marker, "N/A");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum number of dumps compared side by side
    pub max_files: usize,

    /// Text shown in place of a metric the dump never reported
    pub missing_marker: String,

    /// Decimal places for bandwidth share percentages
    pub share_precision: usize,

    /// Analyze dumps on separate threads
    pub parallel: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_files: 3,
            missing_marker: "N/A".to_string(),
            share_precision: 2,
            parallel: true,
        }
    }
}

impl ReportConfig {
    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents =
            fs::read_to_string(path_ref).map_err(|source| StatsError::FileUnreadable {
                path: path_ref.to_path_buf(),
                source,
            })?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!("Loaded report configuration from {}", path_ref.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: ReportConfig =
            toml::from_str(contents).map_err(|e| StatsError::Config(e.to_string()))?;
        config.validate().map_err(StatsError::Config)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_files == 0 {
            return Err("max_files must be >= 1, got 0".to_string());
        }

        if self.share_precision > 10 {
            return Err(format!(
                "share_precision must be <= 10, got {}",
                self.share_precision
            ));
        }

        if self.missing_marker.is_empty() {
            return Err("missing_marker must not be empty".to_string());
        }

        Ok(())
    }
}
