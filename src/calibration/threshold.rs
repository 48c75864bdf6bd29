//! Percentile-based per-sensor threshold calibration.
//!
//! Mirrors the separation-then-degrade pattern used elsewhere in this corpus
//! for pluck/silence threshold derivation: take a high percentile of the
//! negative-class (organic) score distribution as the candidate threshold,
//! but only trust it if the positive-class (synthetic) median clears it by
//! a margin; otherwise fall back to a conservative floor.

use log::warn;

const MIN_SEPARATION_MARGIN: f64 = 0.05;
const FALLBACK_THRESHOLD: f64 = 0.7;

/// Floor-based percentile, matching the indexing convention used by the
/// calibration tooling this module is grounded on.
pub fn percentile(values: &[f64], p: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let idx = ((p as f64 / 100.0) * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn compute_threshold(organic_scores: &[f64], synthetic_scores: &[f64], percentile_pct: usize, sensor_name: &str) -> f64 {
    if organic_scores.is_empty() {
        warn!("no organic samples to calibrate '{sensor_name}', using fallback threshold");
        return FALLBACK_THRESHOLD;
    }

    let organic_p = percentile(organic_scores, percentile_pct);
    let synthetic_median = percentile(synthetic_scores, 50);

    if synthetic_scores.is_empty() || synthetic_median <= organic_p + MIN_SEPARATION_MARGIN {
        warn!(
            "'{sensor_name}' shows poor class separation (organic p{percentile_pct}={organic_p:.3}, synthetic median={synthetic_median:.3}), falling back"
        );
        return organic_p.max(FALLBACK_THRESHOLD).min(0.95);
    }

    organic_p.clamp(0.3, 0.9)
}
