pub mod export;
pub mod summary_log;
pub mod text;

use std::io::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ReportConfig, ReportFormat};
use crate::engine::Aggregate;
use crate::error::ReqstatError;

pub use summary_log::SummaryLog;

// ---------------------------------------------------------------------------
// ResultRecord — one request outcome produced by a worker
// ---------------------------------------------------------------------------

/// Timing breakdown of a request that received a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestTiming {
    /// Wall-clock time from request start to the last response byte.
    pub total: Duration,
    /// DNS lookup plus TCP dial.
    pub connect: Duration,
    pub dns: Duration,
    pub request_write: Duration,
    /// Time between the request being written and the first response byte.
    pub response_delay: Duration,
    pub response_read: Duration,
    pub status_code: u16,
    /// Declared body length; negative when the server did not send one.
    pub content_length: i64,
}

/// Outcome of a single request, as streamed by the worker pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResultRecord {
    Success(RequestTiming),
    /// Network-level failure: no status code, no timings.
    Failure { error: String },
}

impl ResultRecord {
    pub fn success(timing: RequestTiming) -> Self {
        ResultRecord::Success(timing)
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ResultRecord::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultRecord::Success(_))
    }
}

/// Parameters of the run the records belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunInfo {
    /// Number of requests the run was configured to issue.
    pub size: usize,
    /// Number of concurrent workers.
    pub concurrency: usize,
}

// ---------------------------------------------------------------------------
// Phase — the sub-durations that make up a request's latency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Connect,
    Dns,
    RequestWrite,
    ResponseDelay,
    ResponseRead,
}

impl Phase {
    /// All phases, in report order.
    pub const ALL: [Phase; 5] = [
        Phase::Connect,
        Phase::Dns,
        Phase::RequestWrite,
        Phase::ResponseDelay,
        Phase::ResponseRead,
    ];

    /// Row label used in the details section.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Connect => "DNS+dialup",
            Phase::Dns => "DNS-lookup",
            Phase::RequestWrite => "req write",
            Phase::ResponseDelay => "resp wait",
            Phase::ResponseRead => "resp read",
        }
    }

    /// Duration of this phase within `timing`.
    pub fn of(self, timing: &RequestTiming) -> Duration {
        match self {
            Phase::Connect => timing.connect,
            Phase::Dns => timing.dns,
            Phase::RequestWrite => timing.request_write,
            Phase::ResponseDelay => timing.response_delay,
            Phase::ResponseRead => timing.response_read,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// Renders a finalized [`Aggregate`] to an output sink.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    /// Build a reporter, rejecting an invalid config up front.
    pub fn new(config: ReportConfig) -> Result<Self, ReqstatError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Write the report for `aggregate` to `sink`.
    ///
    /// In text mode the run's summary line is also appended to
    /// `summary_log` when one is given. The first failed write aborts the
    /// render and is returned; whatever was written before stays written.
    pub fn render<W: Write>(
        &self,
        aggregate: &Aggregate,
        sink: &mut W,
        summary_log: Option<&mut SummaryLog>,
    ) -> Result<(), ReqstatError> {
        match self.config.format {
            ReportFormat::Csv => export::write_csv(aggregate, sink),
            ReportFormat::Json => export::write_json(aggregate, &self.config, sink),
            ReportFormat::Text => {
                if let Some(log) = summary_log {
                    if aggregate.sample_count() > 0 {
                        log.append(aggregate)?;
                    }
                }
                text::write_text(aggregate, &self.config, sink)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
