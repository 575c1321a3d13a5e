use std::collections::BTreeMap;

use crate::error::ReqstatError;

/// Sort latencies ascending in place.
pub fn sort_latencies(latencies: &mut [f64]) {
    latencies.sort_by(|a, b| a.total_cmp(b));
}

/// Check that percentile targets are ascending, distinct and at most 100.
pub fn check_targets(targets: &[u8]) -> Result<(), ReqstatError> {
    if let Some(&p) = targets.iter().find(|&&p| p > 100) {
        return Err(ReqstatError::Validation(format!(
            "percentile {p} is out of range 0..=100"
        )));
    }
    if targets.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ReqstatError::Validation(
            "percentiles must be sorted ascending without duplicates".to_string(),
        ));
    }
    Ok(())
}

/// Rank-based percentiles of `latencies`.
///
/// Works on a sorted copy; the input slice is left untouched.
pub fn percentiles(latencies: &[f64], targets: &[u8]) -> Result<BTreeMap<u8, f64>, ReqstatError> {
    let mut sorted = latencies.to_vec();
    sort_latencies(&mut sorted);
    percentiles_sorted(&sorted, targets)
}

/// Rank-based percentiles of an already ascending `sorted` slice.
///
/// Target `p` takes the first sample whose index reaches `p * n / 100`
/// (integer division), so p50 of an odd-length sample is its exact median
/// and p50 of ten samples is the sixth. All targets are resolved in one
/// pass over the samples. A target no index reaches (only p100) is left
/// out of the map.
pub fn percentiles_sorted(
    sorted: &[f64],
    targets: &[u8],
) -> Result<BTreeMap<u8, f64>, ReqstatError> {
    if sorted.is_empty() {
        return Err(ReqstatError::EmptySample);
    }
    check_targets(targets)?;

    let n = sorted.len();
    let mut out = BTreeMap::new();
    let mut j = 0;
    for (i, &value) in sorted.iter().enumerate() {
        while j < targets.len() && i >= targets[j] as usize * n / 100 {
            out.insert(targets[j], value);
            j += 1;
        }
        if j == targets.len() {
            break;
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
