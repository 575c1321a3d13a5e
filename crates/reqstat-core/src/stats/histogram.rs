use serde::{Deserialize, Serialize};

use crate::error::ReqstatError;
use crate::stats::percentile::sort_latencies;

/// One histogram bucket: samples `<= upper_bound` not claimed by an
/// earlier bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Bucket {
    pub upper_bound: f64,
    pub count: u64,
}

/// Response-time histogram with evenly spaced bucket bounds between the
/// fastest and slowest sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    buckets: Vec<Bucket>,
}

impl Histogram {
    /// Build from unsorted latencies. The input is not modified.
    pub fn build(latencies: &[f64], bucket_count: usize) -> Result<Self, ReqstatError> {
        let mut sorted = latencies.to_vec();
        sort_latencies(&mut sorted);
        Self::build_sorted(&sorted, bucket_count)
    }

    /// Build from ascending latencies.
    ///
    /// Produces `bucket_count + 1` buckets. Bucket `i < bucket_count` is
    /// bounded by `fastest + width * i`; the last is bounded by `slowest`
    /// exactly. Each sample is counted in the lowest bucket whose bound is
    /// at least the sample, so when every sample is identical they all land
    /// in bucket 0 and the remaining buckets stay empty.
    pub fn build_sorted(sorted: &[f64], bucket_count: usize) -> Result<Self, ReqstatError> {
        let (Some(&fastest), Some(&slowest)) = (sorted.first(), sorted.last()) else {
            return Err(ReqstatError::EmptySample);
        };
        if bucket_count == 0 {
            return Err(ReqstatError::Validation(
                "bucket count must be at least 1".to_string(),
            ));
        }

        let width = (slowest - fastest) / bucket_count as f64;
        let mut buckets: Vec<Bucket> = (0..bucket_count)
            .map(|i| Bucket {
                upper_bound: fastest + width * i as f64,
                count: 0,
            })
            .collect();
        buckets.push(Bucket {
            upper_bound: slowest,
            count: 0,
        });

        let last = buckets.len() - 1;
        let mut bi = 0;
        for &value in sorted {
            while bi < last && value > buckets[bi].upper_bound {
                bi += 1;
            }
            buckets[bi].count += 1;
        }

        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Largest single-bucket count.
    pub fn max_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Bar length for every bucket, scaled so the fullest bucket is
    /// `max_width` wide.
    pub fn bar_lengths(&self, max_width: usize) -> Vec<usize> {
        let max = self.max_count();
        self.buckets
            .iter()
            .map(|b| bar_len(b.count, max, max_width))
            .collect()
    }
}

/// `round(count * max_width / max_count)`, rounding halves up. Zero when
/// `max_count` is zero.
pub fn bar_len(count: u64, max_count: u64, max_width: usize) -> usize {
    if max_count == 0 {
        return 0;
    }
    ((count * max_width as u64 + max_count / 2) / max_count) as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
