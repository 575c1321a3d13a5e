pub mod histogram;
pub mod percentile;

pub use histogram::{Bucket, Histogram};
pub use percentile::{percentiles, percentiles_sorted, sort_latencies};
