pub mod aggregator;

pub use aggregator::{
    finalize, finalize_stream, Aggregate, Aggregator, DerivedStats, LatencySummary, PhaseSamples,
};
