use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::engine::Aggregate;
use crate::error::ReqstatError;

/// Append-only log collecting one line per run across repeated runs.
///
/// The caller opens it before the run and drops it afterwards; dropping
/// closes the underlying file even when rendering failed.
pub struct SummaryLog {
    inner: Box<dyn Write + Send>,
}

impl SummaryLog {
    /// Open `path` for appending, creating it if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReqstatError> {
        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::from_writer(file))
    }

    /// Wrap an already-open writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Box::new(writer),
        }
    }

    /// Append the run's summary line and flush it.
    pub fn append(&mut self, aggregate: &Aggregate) -> Result<(), ReqstatError> {
        self.inner.write_all(summary_line(aggregate).as_bytes())?;
        self.inner.flush()?;
        tracing::info!(
            concurrency = aggregate.run().concurrency,
            "run summary appended"
        );
        Ok(())
    }
}

impl std::fmt::Debug for SummaryLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryLog").finish_non_exhaustive()
    }
}

/// `"<size>, <concurrency>, <rps>\n"` with rps to four decimals.
pub fn summary_line(aggregate: &Aggregate) -> String {
    let run = aggregate.run();
    format!("{}, {}, {:.4}\n", run.size, run.concurrency, aggregate.rps())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::tests::{make_aggregate, make_success};

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn summary_line_format() {
        let agg = make_aggregate(
            vec![
                make_success(0.1, 200, 0),
                make_success(0.2, 200, 0),
                make_success(0.3, 200, 0),
            ],
            0.7,
        );
        assert_eq!(summary_line(&agg), "3, 2, 4.2857\n");
    }

    #[test]
    fn append_accumulates_across_runs() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("Output.csv");

        let first = make_aggregate(vec![make_success(0.1, 200, 0)], 1.0);
        let second = make_aggregate(
            vec![make_success(0.1, 200, 0), make_success(0.1, 200, 0)],
            0.5,
        );

        for agg in [&first, &second] {
            let mut log = SummaryLog::open(&path).expect("open should succeed");
            log.append(agg).expect("append should succeed");
        }

        let content = std::fs::read_to_string(&path).expect("log should be readable");
        assert_eq!(content, "1, 2, 1.0000\n2, 2, 4.0000\n");
    }

    #[test]
    fn open_fails_for_missing_directory() {
        let result = SummaryLog::open("/nonexistent/reqstat/Output.csv");
        assert!(matches!(result, Err(ReqstatError::Io(_))));
    }

    #[test]
    fn append_propagates_write_failure() {
        let agg = make_aggregate(vec![make_success(0.1, 200, 0)], 1.0);
        let mut log = SummaryLog::from_writer(FailingWriter);
        assert!(matches!(log.append(&agg), Err(ReqstatError::Io(_))));
    }
}
