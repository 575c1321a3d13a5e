pub mod config;
pub mod engine;
pub mod error;
pub mod results;
pub mod stats;

pub use config::{Detail, ReportConfig, ReportFormat};
pub use engine::{finalize, finalize_stream, Aggregate, Aggregator, DerivedStats};
pub use error::ReqstatError;
pub use results::{Phase, Reporter, RequestTiming, ResultRecord, RunInfo, SummaryLog};
