use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ReqstatError;
use crate::results::{Phase, RequestTiming, ResultRecord, RunInfo};

// ---------------------------------------------------------------------------
// PhaseSamples — per-phase latency sequences
// ---------------------------------------------------------------------------

/// Per-phase latencies in seconds, index-aligned with the total latencies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseSamples {
    pub connect: Vec<f64>,
    pub dns: Vec<f64>,
    pub request_write: Vec<f64>,
    pub response_delay: Vec<f64>,
    pub response_read: Vec<f64>,
}

impl PhaseSamples {
    pub fn get(&self, phase: Phase) -> &[f64] {
        match phase {
            Phase::Connect => &self.connect,
            Phase::Dns => &self.dns,
            Phase::RequestWrite => &self.request_write,
            Phase::ResponseDelay => &self.response_delay,
            Phase::ResponseRead => &self.response_read,
        }
    }

    fn get_mut(&mut self, phase: Phase) -> &mut Vec<f64> {
        match phase {
            Phase::Connect => &mut self.connect,
            Phase::Dns => &mut self.dns,
            Phase::RequestWrite => &mut self.request_write,
            Phase::ResponseDelay => &mut self.response_delay,
            Phase::ResponseRead => &mut self.response_read,
        }
    }

    fn push(&mut self, timing: &RequestTiming) {
        for phase in Phase::ALL {
            self.get_mut(phase).push(phase.of(timing).as_secs_f64());
        }
    }
}

// ---------------------------------------------------------------------------
// DerivedStats — computed once when the stream closes
// ---------------------------------------------------------------------------

/// Mean, fastest and slowest of one latency sequence, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LatencySummary {
    pub average: f64,
    pub fastest: f64,
    pub slowest: f64,
}

impl LatencySummary {
    fn of(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut fastest = f64::INFINITY;
        let mut slowest = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &s in samples {
            fastest = fastest.min(s);
            slowest = slowest.max(s);
            sum += s;
        }
        Some(Self {
            average: sum / samples.len() as f64,
            fastest,
            slowest,
        })
    }
}

/// Statistics that only exist when at least one request succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DerivedStats {
    pub total: LatencySummary,
    pub connect: LatencySummary,
    pub dns: LatencySummary,
    pub request_write: LatencySummary,
    pub response_delay: LatencySummary,
    pub response_read: LatencySummary,
}

impl DerivedStats {
    pub fn phase(&self, phase: Phase) -> &LatencySummary {
        match phase {
            Phase::Connect => &self.connect,
            Phase::Dns => &self.dns,
            Phase::RequestWrite => &self.request_write,
            Phase::ResponseDelay => &self.response_delay,
            Phase::ResponseRead => &self.response_read,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate — finalized, read-only run state
// ---------------------------------------------------------------------------

/// Everything collected from one run's result stream.
///
/// Built by [`Aggregator::finish`] and never mutated afterwards. Only the
/// aggregator constructs one, so every phase sequence has exactly one entry
/// per successful latency.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    run: RunInfo,
    run_duration: Duration,
    /// Successful total latencies in arrival order.
    latencies: Vec<f64>,
    phases: PhaseSamples,
    status_code_counts: BTreeMap<u16, u64>,
    error_counts: BTreeMap<String, u64>,
    total_bytes: u64,
    rps: f64,
    stats: Option<DerivedStats>,
}

impl Aggregate {
    pub fn run(&self) -> RunInfo {
        self.run
    }

    pub fn run_duration(&self) -> Duration {
        self.run_duration
    }

    /// Number of successful requests.
    pub fn sample_count(&self) -> usize {
        self.latencies.len()
    }

    /// Number of failed requests.
    pub fn error_count(&self) -> u64 {
        self.error_counts.values().sum()
    }

    /// Number of records consumed from the stream.
    pub fn total_records(&self) -> u64 {
        self.sample_count() as u64 + self.error_count()
    }

    /// Successful total latencies in seconds, arrival order.
    pub fn latencies(&self) -> &[f64] {
        &self.latencies
    }

    pub fn phase_latencies(&self, phase: Phase) -> &[f64] {
        self.phases.get(phase)
    }

    /// Status code to response count, ascending by code.
    pub fn status_code_counts(&self) -> &BTreeMap<u16, u64> {
        &self.status_code_counts
    }

    /// Error message to occurrence count, ascending by message.
    pub fn error_counts(&self) -> &BTreeMap<String, u64> {
        &self.error_counts
    }

    /// Sum of the positive content lengths of successful responses.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Successful requests per second of run time; 0 for a zero-length run.
    pub fn rps(&self) -> f64 {
        self.rps
    }

    /// Means and extremes, or [`ReqstatError::EmptySample`] when nothing
    /// succeeded.
    pub fn stats(&self) -> Result<&DerivedStats, ReqstatError> {
        self.stats.as_ref().ok_or(ReqstatError::EmptySample)
    }
}

// ---------------------------------------------------------------------------
// Aggregator — single consumer of the result stream
// ---------------------------------------------------------------------------

/// Accumulates result records for one run.
#[derive(Debug, Default)]
pub struct Aggregator {
    run: RunInfo,
    latencies: Vec<f64>,
    phases: PhaseSamples,
    status_code_counts: BTreeMap<u16, u64>,
    error_counts: BTreeMap<String, u64>,
    total_bytes: u64,
}

impl Aggregator {
    pub fn new(run: RunInfo) -> Self {
        Self {
            run,
            ..Self::default()
        }
    }

    /// Fold a single record into the running totals.
    pub fn record(&mut self, record: ResultRecord) {
        match record {
            ResultRecord::Failure { error } => {
                *self.error_counts.entry(error).or_insert(0) += 1;
            }
            ResultRecord::Success(timing) => {
                self.latencies.push(timing.total.as_secs_f64());
                self.phases.push(&timing);
                *self.status_code_counts.entry(timing.status_code).or_insert(0) += 1;
                if timing.content_length > 0 {
                    self.total_bytes += timing.content_length as u64;
                }
            }
        }
    }

    /// Number of records seen so far.
    pub fn records_seen(&self) -> u64 {
        self.latencies.len() as u64 + self.error_counts.values().sum::<u64>()
    }

    /// Close the run and compute the derived statistics.
    pub fn finish(self, run_duration: Duration) -> Aggregate {
        let n = self.latencies.len();
        let secs = run_duration.as_secs_f64();
        let rps = if secs > 0.0 { n as f64 / secs } else { 0.0 };

        let stats = LatencySummary::of(&self.latencies).and_then(|total| {
            Some(DerivedStats {
                total,
                connect: LatencySummary::of(&self.phases.connect)?,
                dns: LatencySummary::of(&self.phases.dns)?,
                request_write: LatencySummary::of(&self.phases.request_write)?,
                response_delay: LatencySummary::of(&self.phases.response_delay)?,
                response_read: LatencySummary::of(&self.phases.response_read)?,
            })
        });

        tracing::debug!(
            records = self.records_seen(),
            samples = n,
            rps,
            "result stream drained"
        );

        Aggregate {
            run: self.run,
            run_duration,
            latencies: self.latencies,
            phases: self.phases,
            status_code_counts: self.status_code_counts,
            error_counts: self.error_counts,
            total_bytes: self.total_bytes,
            rps,
            stats,
        }
    }
}

/// Drain `rx` until every sender has been dropped, then finalize.
///
/// `run_duration` is the already-measured wall-clock length of the run.
pub async fn finalize(
    run: RunInfo,
    mut rx: mpsc::Receiver<ResultRecord>,
    run_duration: Duration,
) -> Aggregate {
    let mut agg = Aggregator::new(run);
    while let Some(record) = rx.recv().await {
        agg.record(record);
    }
    agg.finish(run_duration)
}

/// Same as [`finalize`] for any stream of records.
pub async fn finalize_stream<S>(run: RunInfo, stream: S, run_duration: Duration) -> Aggregate
where
    S: Stream<Item = ResultRecord>,
{
    let mut agg = Aggregator::new(run);
    let mut stream = std::pin::pin!(stream);
    while let Some(record) = stream.next().await {
        agg.record(record);
    }
    agg.finish(run_duration)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
