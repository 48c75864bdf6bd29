//! Grid-search calibration of the adaptive veto thresholds (§4.4, §9).
//!
//! Searches a coarse grid of `(moderate, high_confidence)` pairs against the
//! calibration corpus's prosecution risk scores and keeps the pair with the
//! best true-positive rate among candidates whose false-positive rate on
//! organic audio stays at or below the target.

use log::{info, warn};

use crate::fusion::VetoThresholds;

const GRID_STEP: f64 = 0.05;

fn false_positive_rate(organic_risk: &[f64], threshold: f64) -> f64 {
    if organic_risk.is_empty() {
        return 0.0;
    }
    organic_risk.iter().filter(|&&r| r > threshold).count() as f64 / organic_risk.len() as f64
}

fn true_positive_rate(synthetic_risk: &[f64], threshold: f64) -> f64 {
    if synthetic_risk.is_empty() {
        return 0.0;
    }
    synthetic_risk.iter().filter(|&&r| r > threshold).count() as f64 / synthetic_risk.len() as f64
}

/// `organic_risk`/`synthetic_risk` are the per-clip `risk` values the fusion
/// engine would have produced (max prosecution sensor score). Falls back to
/// [`VetoThresholds::default`] when the corpus can't support a search.
pub fn calibrate_veto(organic_risk: &[f64], synthetic_risk: &[f64], target_fpr: f64) -> VetoThresholds {
    if organic_risk.is_empty() || synthetic_risk.is_empty() {
        warn!("cannot calibrate veto thresholds without both classes present, using defaults");
        return VetoThresholds::default();
    }

    let mut best_high: Option<(f64, f64)> = None; // (threshold, tpr)
    let mut grid = 0.5;
    while grid <= 0.95 {
        let fpr = false_positive_rate(organic_risk, grid);
        if fpr <= target_fpr {
            let tpr = true_positive_rate(synthetic_risk, grid);
            if best_high.map(|(_, best_tpr)| tpr > best_tpr).unwrap_or(true) {
                best_high = Some((grid, tpr));
            }
        }
        grid += GRID_STEP;
    }

    let high_confidence = best_high.map(|(t, _)| t).unwrap_or(0.85);
    let moderate = (high_confidence - 0.10).max(0.05);

    info!("calibrated veto thresholds: moderate={moderate:.2}, high={high_confidence:.2}");

    VetoThresholds { high_confidence, moderate, moderate_blend: (0.4, 0.6) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_without_both_classes() {
        let veto = calibrate_veto(&[], &[0.9], 0.05);
        assert_eq!(veto.high_confidence, VetoThresholds::default().high_confidence);
    }

    #[test]
    fn test_moderate_always_below_high() {
        let organic = vec![0.1, 0.2, 0.15, 0.25, 0.3];
        let synthetic = vec![0.9, 0.85, 0.95, 0.8, 0.9];
        let veto = calibrate_veto(&organic, &synthetic, 0.05);
        assert!(veto.moderate < veto.high_confidence);
    }

    #[test]
    fn test_fpr_computation() {
        assert_eq!(false_positive_rate(&[0.1, 0.9], 0.5), 0.5);
    }
}
