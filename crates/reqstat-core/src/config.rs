use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReqstatError;
use crate::stats::percentile::check_targets;

/// Percentile targets printed in the latency distribution section.
pub const DEFAULT_PERCENTILES: [u8; 7] = [10, 25, 50, 75, 90, 95, 99];

/// Number of evenly spaced histogram buckets (one extra closes at `slowest`).
pub const DEFAULT_HISTOGRAM_BUCKETS: usize = 10;

/// Width in characters of the longest histogram bar.
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Output encoding of a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Human-readable sections.
    #[default]
    Text,
    /// One row per successful sample, arrival order.
    Csv,
    /// A single serialized [`crate::results::export::RunSummary`].
    Json,
}

/// How much of the text report is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detail {
    /// Summary-log line and error distribution only.
    #[default]
    Brief,
    /// Everything in `Brief` plus summary, phase details, percentiles,
    /// histogram and status-code distribution.
    Full,
}

/// Rendering options for a [`crate::results::Reporter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub detail: Detail,
    /// Ascending, distinct, each in `0..=100`.
    pub percentiles: Vec<u8>,
    pub histogram_buckets: usize,
    pub bar_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            detail: Detail::default(),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            histogram_buckets: DEFAULT_HISTOGRAM_BUCKETS,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }
}

impl ReportConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ReqstatError> {
        let config: ReportConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ReqstatError> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&content)
    }

    /// Return the first problem found, if any.
    pub fn validate(&self) -> Result<(), ReqstatError> {
        match validate_config(self).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Validate a [`ReportConfig`] and return every problem found.
///
/// An empty `Vec` means the config is usable.
pub fn validate_config(config: &ReportConfig) -> Vec<ReqstatError> {
    let mut errors = Vec::new();

    if let Err(e) = check_targets(&config.percentiles) {
        errors.push(e);
    }

    if config.histogram_buckets == 0 {
        errors.push(ReqstatError::Validation(
            "histogram_buckets must be at least 1".to_string(),
        ));
    }

    if config.bar_width == 0 {
        errors.push(ReqstatError::Validation(
            "bar_width must be at least 1".to_string(),
        ));
    }

    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
