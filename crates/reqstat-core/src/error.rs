use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ReqstatError {
    #[error("No successful samples to compute statistics from")]
    EmptySample,

    /// Reading config or writing to an output sink failed. Sink writes are
    /// never retried.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Serialize for ReqstatError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
