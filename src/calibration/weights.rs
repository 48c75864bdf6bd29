//! Discrimination-based per-sensor weight calibration.
//!
//! A sensor that never separates organic from synthetic audio contributes
//! noise to the physics stage; this scales each sensor's weight by how well
//! it discriminates on the calibration corpus, then renormalizes so the
//! profile's total raw weight is unchanged (§4.3's weighted-sum math assumes
//! a stable total, only the split across sensors moves).

use std::collections::HashMap;

use log::warn;

/// `|mean(synthetic_scores) - mean(organic_scores)|`, clamped to `[0, 1]`.
///
/// Absolute, not signed: a prosecution sensor separates by scoring synthetic
/// audio higher, a defense sensor by scoring organic audio higher (it emits
/// trust-domain scores), and both are equally discriminating. Signing this
/// by raw score direction would drive every well-functioning defense sensor
/// to the floor weight regardless of how cleanly it separates the classes.
fn discrimination(organic_scores: &[f64], synthetic_scores: &[f64]) -> f64 {
    if organic_scores.is_empty() || synthetic_scores.is_empty() {
        return 0.0;
    }
    let organic_mean = organic_scores.iter().sum::<f64>() / organic_scores.len() as f64;
    let synthetic_mean = synthetic_scores.iter().sum::<f64>() / synthetic_scores.len() as f64;
    (synthetic_mean - organic_mean).abs().clamp(0.0, 1.0)
}

/// Recomputes a profile's per-sensor weights from discrimination scores,
/// holding the total raw weight fixed. Sensors with zero discrimination
/// keep a small floor weight rather than vanishing outright, so a
/// momentarily under-represented sensor isn't permanently zeroed by one
/// calibration run.
pub fn calibrate_weights(
    current_weights: &HashMap<String, f64>,
    scores_by_sensor: &HashMap<String, (Vec<f64>, Vec<f64>)>,
) -> HashMap<String, f64> {
    const FLOOR_FRACTION: f64 = 0.1;

    let total_raw_weight: f64 = current_weights.values().sum();
    if total_raw_weight <= 0.0 {
        warn!("cannot calibrate weights: total raw weight is zero");
        return current_weights.clone();
    }

    let discriminations: HashMap<String, f64> = current_weights
        .keys()
        .map(|name| {
            let score = scores_by_sensor
                .get(name)
                .map(|(organic, synthetic)| discrimination(organic, synthetic))
                .unwrap_or(0.0);
            (name.clone(), score)
        })
        .collect();

    let floor = total_raw_weight * FLOOR_FRACTION / current_weights.len().max(1) as f64;
    let raised: HashMap<String, f64> = discriminations
        .into_iter()
        .map(|(name, d)| (name, d.max(floor)))
        .collect();

    let sum: f64 = raised.values().sum();
    if sum <= 0.0 {
        return current_weights.clone();
    }

    raised.into_iter().map(|(name, d)| (name, d / sum * total_raw_weight)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrimination_positive_when_synthetic_scores_higher() {
        assert!(discrimination(&[0.2, 0.2], &[0.8, 0.8]) > 0.5);
    }

    #[test]
    fn test_discrimination_symmetric_for_defense_sensors() {
        // A defense sensor scores organic (real) audio higher than synthetic;
        // it should discriminate just as strongly as a prosecution sensor
        // whose scores run the other way.
        let prosecution = discrimination(&[0.2, 0.2], &[0.8, 0.8]);
        let defense = discrimination(&[0.8, 0.8], &[0.2, 0.2]);
        assert!((prosecution - defense).abs() < f64::EPSILON);
        assert!(defense > 0.5);
    }

    #[test]
    fn test_discrimination_zero_when_classes_overlap() {
        assert_eq!(discrimination(&[0.5, 0.5], &[0.5, 0.5]), 0.0);
    }

    #[test]
    fn test_calibrate_weights_preserves_total() {
        let mut current = HashMap::new();
        current.insert("A".to_string(), 0.5);
        current.insert("B".to_string(), 0.5);

        let mut scores = HashMap::new();
        scores.insert("A".to_string(), (vec![0.1, 0.1], vec![0.9, 0.9]));
        scores.insert("B".to_string(), (vec![0.5, 0.5], vec![0.5, 0.5]));

        let calibrated = calibrate_weights(&current, &scores);
        let total: f64 = calibrated.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(calibrated["A"] > calibrated["B"]);
    }

    #[test]
    fn test_calibrate_weights_favors_defense_sensor_with_real_separation() {
        let mut current = HashMap::new();
        current.insert("DefenseSensor".to_string(), 0.5);
        current.insert("NoiseSensor".to_string(), 0.5);

        let mut scores = HashMap::new();
        // Defense sensor: trust-domain, organic scores high, synthetic low.
        scores.insert("DefenseSensor".to_string(), (vec![0.9, 0.9], vec![0.1, 0.1]));
        scores.insert("NoiseSensor".to_string(), (vec![0.5, 0.5], vec![0.5, 0.5]));

        let calibrated = calibrate_weights(&current, &scores);
        assert!(calibrated["DefenseSensor"] > calibrated["NoiseSensor"]);
    }
}
