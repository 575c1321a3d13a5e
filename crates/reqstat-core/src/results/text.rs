use std::io::Write;

use crate::config::{Detail, ReportConfig};
use crate::engine::{Aggregate, DerivedStats};
use crate::error::ReqstatError;
use crate::results::Phase;
use crate::stats::{percentiles_sorted, sort_latencies, Histogram};

const BAR_CHAR: &str = "∎";

/// Write the plain-text report.
///
/// The error distribution is always written when errors occurred. With
/// [`Detail::Full`] and at least one successful sample the statistical
/// sections follow; with no samples they are skipped rather than failing.
pub fn write_text<W: Write>(
    aggregate: &Aggregate,
    config: &ReportConfig,
    w: &mut W,
) -> Result<(), ReqstatError> {
    if !aggregate.error_counts().is_empty() {
        write_errors(aggregate, w)?;
    }

    if config.detail == Detail::Full {
        if let Ok(stats) = aggregate.stats() {
            let mut sorted = aggregate.latencies().to_vec();
            sort_latencies(&mut sorted);

            write_summary(aggregate, stats, w)?;
            write_latencies(&sorted, &config.percentiles, w)?;
            write_histogram(&sorted, config, w)?;
            write_details(stats, w)?;
            write_status_codes(aggregate, w)?;
        }
    }

    writeln!(w)?;
    Ok(())
}

fn write_summary<W: Write>(
    aggregate: &Aggregate,
    stats: &DerivedStats,
    w: &mut W,
) -> Result<(), ReqstatError> {
    let size_per_request = aggregate.total_bytes() / aggregate.sample_count().max(1) as u64;

    writeln!(w, "\nSummary:")?;
    writeln!(w, "  Total:\t{:.4} secs", aggregate.run_duration().as_secs_f64())?;
    writeln!(w, "  Slowest:\t{:.4} secs", stats.total.slowest)?;
    writeln!(w, "  Fastest:\t{:.4} secs", stats.total.fastest)?;
    writeln!(w, "  Average:\t{:.4} secs", stats.total.average)?;
    writeln!(w, "  Requests/sec:\t{:.4}", aggregate.rps())?;
    writeln!(w, "  Total data:\t{} bytes", aggregate.total_bytes())?;
    writeln!(w, "  Size/request:\t{} bytes", size_per_request)?;
    Ok(())
}

fn write_histogram<W: Write>(
    sorted: &[f64],
    config: &ReportConfig,
    w: &mut W,
) -> Result<(), ReqstatError> {
    let histogram = Histogram::build_sorted(sorted, config.histogram_buckets)?;
    let bars = histogram.bar_lengths(config.bar_width);

    writeln!(w, "\nResponse time histogram:")?;
    for (bucket, bar) in histogram.buckets().iter().zip(bars) {
        writeln!(
            w,
            "  {:.4} [{}]\t|{}",
            bucket.upper_bound,
            bucket.count,
            BAR_CHAR.repeat(bar)
        )?;
    }
    Ok(())
}

fn write_latencies<W: Write>(
    sorted: &[f64],
    targets: &[u8],
    w: &mut W,
) -> Result<(), ReqstatError> {
    let pctls = percentiles_sorted(sorted, targets)?;

    writeln!(w, "\nLatency distribution:")?;
    for (p, value) in &pctls {
        writeln!(w, "  {}% in {:.4} secs", p, value)?;
    }
    Ok(())
}

fn write_details<W: Write>(stats: &DerivedStats, w: &mut W) -> Result<(), ReqstatError> {
    writeln!(w, "\nDetails (average, fastest, slowest):")?;
    for phase in Phase::ALL {
        let s = stats.phase(phase);
        writeln!(
            w,
            "  {}:\t{:.4} secs, {:.4} secs, {:.4} secs",
            phase.label(),
            s.average,
            s.fastest,
            s.slowest
        )?;
    }
    Ok(())
}

fn write_status_codes<W: Write>(aggregate: &Aggregate, w: &mut W) -> Result<(), ReqstatError> {
    writeln!(w, "\nStatus code distribution:")?;
    for (code, count) in aggregate.status_code_counts() {
        writeln!(w, "  [{}]\t{} responses", code, count)?;
    }
    Ok(())
}

fn write_errors<W: Write>(aggregate: &Aggregate, w: &mut W) -> Result<(), ReqstatError> {
    writeln!(w, "\nError distribution:")?;
    for (message, count) in aggregate.error_counts() {
        writeln!(w, "  [{}]\t{}", count, message)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::tests::{make_aggregate, make_success};
    use crate::results::ResultRecord;

    fn full() -> ReportConfig {
        ReportConfig {
            detail: Detail::Full,
            ..ReportConfig::default()
        }
    }

    fn render(aggregate: &Aggregate, config: &ReportConfig) -> String {
        let mut out = Vec::new();
        write_text(aggregate, config, &mut out).expect("render should succeed");
        String::from_utf8(out).expect("report should be utf8")
    }

    fn tenths() -> Aggregate {
        make_aggregate(
            (1..=10)
                .map(|i| make_success(i as f64 / 10.0, 200, 100))
                .collect(),
            1.0,
        )
    }

    #[test]
    fn brief_report_without_errors_is_a_blank_line() {
        let out = render(&tenths(), &ReportConfig::default());
        assert_eq!(out, "\n");
    }

    #[test]
    fn error_distribution_lists_each_message_sorted() {
        let agg = make_aggregate(
            vec![
                ResultRecord::failure("timeout"),
                make_success(0.1, 200, 0),
                ResultRecord::failure("connection refused"),
                ResultRecord::failure("timeout"),
            ],
            1.0,
        );
        let out = render(&agg, &ReportConfig::default());
        assert_eq!(
            out,
            "\nError distribution:\n  [1]\tconnection refused\n  [2]\ttimeout\n\n"
        );
    }

    #[test]
    fn full_report_has_every_section_in_order() {
        let out = render(&tenths(), &full());
        let order = [
            "Summary:",
            "Latency distribution:",
            "Response time histogram:",
            "Details (average, fastest, slowest):",
            "Status code distribution:",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|s| out.find(s).unwrap_or_else(|| panic!("missing section {s}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!out.contains("Error distribution:"));
    }

    #[test]
    fn summary_section_values() {
        let out = render(&tenths(), &full());
        assert!(out.contains("  Total:\t1.0000 secs\n"));
        assert!(out.contains("  Slowest:\t1.0000 secs\n"));
        assert!(out.contains("  Fastest:\t0.1000 secs\n"));
        assert!(out.contains("  Average:\t0.5500 secs\n"));
        assert!(out.contains("  Requests/sec:\t10.0000\n"));
        assert!(out.contains("  Total data:\t1000 bytes\n"));
        assert!(out.contains("  Size/request:\t100 bytes\n"));
    }

    #[test]
    fn latency_lines_use_four_decimals() {
        let out = render(&tenths(), &full());
        assert!(out.contains("  50% in 0.6000 secs\n"));
        assert!(out.contains("  10% in 0.2000 secs\n"));
        assert!(out.contains("  99% in 1.0000 secs\n"));
    }

    #[test]
    fn histogram_lines_have_bound_count_and_bar() {
        let agg = make_aggregate(
            vec![make_success(0.5, 200, 0), make_success(0.5, 200, 0)],
            1.0,
        );
        let config = ReportConfig {
            histogram_buckets: 2,
            bar_width: 4,
            ..full()
        };
        let out = render(&agg, &config);
        assert!(out.contains("\nResponse time histogram:\n  0.5000 [2]\t|∎∎∎∎\n  0.5000 [0]\t|\n  0.5000 [0]\t|\n"));
    }

    #[test]
    fn status_codes_are_sorted_by_code() {
        let agg = make_aggregate(
            vec![
                make_success(0.1, 404, 0),
                make_success(0.1, 200, 0),
                make_success(0.1, 200, 0),
            ],
            1.0,
        );
        let out = render(&agg, &full());
        assert!(out.ends_with(
            "\nStatus code distribution:\n  [200]\t2 responses\n  [404]\t1 responses\n\n"
        ));
    }

    #[test]
    fn details_list_every_phase() {
        let out = render(&tenths(), &full());
        assert!(out.contains("  DNS+dialup:\t0.0550 secs, 0.0100 secs, 0.1000 secs\n"));
        assert!(out.contains("  resp wait:\t0.2750 secs, 0.0500 secs, 0.5000 secs\n"));
        for phase in Phase::ALL {
            assert!(out.contains(&format!("  {}:\t", phase.label())));
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_write_failure_is_returned() {
        let agg = make_aggregate(
            vec![make_success(0.1, 200, 0), ResultRecord::failure("timeout")],
            1.0,
        );
        for config in [ReportConfig::default(), full()] {
            let result = write_text(&agg, &config, &mut FailingWriter);
            assert!(matches!(result, Err(ReqstatError::Io(_))));
        }
    }

    #[test]
    fn full_report_without_samples_skips_statistics() {
        let agg = make_aggregate(
            vec![
                ResultRecord::failure("timeout"),
                ResultRecord::failure("timeout"),
                ResultRecord::failure("timeout"),
            ],
            1.0,
        );
        let out = render(&agg, &full());
        assert_eq!(out, "\nError distribution:\n  [3]\ttimeout\n\n");
    }
}
