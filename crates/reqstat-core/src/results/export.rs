use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ReportConfig;
use crate::engine::{Aggregate, DerivedStats};
use crate::error::ReqstatError;
use crate::results::{Phase, RunInfo};
use crate::stats::{percentiles_sorted, sort_latencies, Bucket, Histogram};

/// Column names of the per-sample CSV report.
pub const CSV_HEADER: [&str; 6] = [
    "response-time",
    "DNS+dialup",
    "DNS",
    "Request-write",
    "Response-delay",
    "Response-read",
];

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write one row per successful sample, in arrival order.
///
/// Every value is in seconds with four decimals. No sorting is applied.
pub fn write_csv<W: Write>(aggregate: &Aggregate, w: &mut W) -> Result<(), ReqstatError> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(CSV_HEADER)?;

    let columns = [
        aggregate.latencies(),
        aggregate.phase_latencies(Phase::Connect),
        aggregate.phase_latencies(Phase::Dns),
        aggregate.phase_latencies(Phase::RequestWrite),
        aggregate.phase_latencies(Phase::ResponseDelay),
        aggregate.phase_latencies(Phase::ResponseRead),
    ];
    for row in sample_rows(columns) {
        wtr.write_record(row.iter().map(|v| format!("{:.4}", v)))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Zip the columns into rows, stopping at the shortest column.
fn sample_rows(columns: [&[f64]; 6]) -> impl Iterator<Item = [f64; 6]> + '_ {
    let [total, connect, dns, write, delay, read] = columns;
    total
        .iter()
        .zip(connect)
        .zip(dns)
        .zip(write)
        .zip(delay)
        .zip(read)
        .map(|(((((&t, &c), &d), &w), &dl), &r)| [t, c, d, w, dl, r])
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Machine-readable digest of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub run: RunInfo,
    pub duration_secs: f64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub requests_per_second: f64,
    pub total_bytes: u64,
    /// Absent when no request succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DerivedStats>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub percentiles: BTreeMap<u8, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub histogram: Vec<Bucket>,
    pub status_codes: BTreeMap<u16, u64>,
    pub errors: BTreeMap<String, u64>,
}

impl RunSummary {
    /// Compute the digest of `aggregate` using the config's percentile
    /// targets and bucket count.
    pub fn from_aggregate(aggregate: &Aggregate, config: &ReportConfig) -> Result<Self, ReqstatError> {
        let (stats, percentiles, histogram) = match aggregate.stats() {
            Ok(stats) => {
                let mut sorted = aggregate.latencies().to_vec();
                sort_latencies(&mut sorted);
                let percentiles = percentiles_sorted(&sorted, &config.percentiles)?;
                let histogram = Histogram::build_sorted(&sorted, config.histogram_buckets)?;
                (
                    Some(stats.clone()),
                    percentiles,
                    histogram.buckets().to_vec(),
                )
            }
            Err(ReqstatError::EmptySample) => (None, BTreeMap::new(), Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            run: aggregate.run(),
            duration_secs: aggregate.run_duration().as_secs_f64(),
            successful_requests: aggregate.sample_count() as u64,
            failed_requests: aggregate.error_count(),
            requests_per_second: aggregate.rps(),
            total_bytes: aggregate.total_bytes(),
            stats,
            percentiles,
            histogram,
            status_codes: aggregate.status_code_counts().clone(),
            errors: aggregate.error_counts().clone(),
        })
    }
}

/// Write the [`RunSummary`] of `aggregate` as pretty-printed JSON.
pub fn write_json<W: Write>(
    aggregate: &Aggregate,
    config: &ReportConfig,
    w: &mut W,
) -> Result<(), ReqstatError> {
    let summary = RunSummary::from_aggregate(aggregate, config)?;
    serde_json::to_writer_pretty(&mut *w, &summary)?;
    writeln!(w)?;
    Ok(())
}
