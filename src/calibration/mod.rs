//! Offline calibration (§4.5): derives per-sensor thresholds, per-sensor
//! weights, and adaptive veto thresholds from a labeled organic/synthetic
//! corpus, and persists the result as a [`PipelineConfig`] document.

pub mod corpus;
pub mod persist;
pub mod threshold;
pub mod veto;
pub mod weights;

use std::collections::HashMap;
use std::path::Path;

use log::info;

use crate::config::PipelineConfig;
use crate::pipeline::build_registry;
use crate::preprocessor::{self, CANONICAL_SAMPLE_RATE};
use crate::sensors::{SensorCategory, SensorContext};

use corpus::Corpus;

pub struct CalibrationOptions {
    pub percentile: usize,
    pub target_fpr: f64,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self { percentile: 99, target_fpr: 0.05 }
    }
}

/// Per-sensor `(organic_scores, synthetic_scores)` collected across the
/// whole corpus, plus the per-clip prosecution risk used for veto search.
struct CorpusScores {
    by_sensor: HashMap<String, (Vec<f64>, Vec<f64>)>,
    organic_risk: Vec<f64>,
    synthetic_risk: Vec<f64>,
}

fn score_corpus(corpus: &Corpus) -> CorpusScores {
    let registry = build_registry(&PipelineConfig::default_config());
    let context = SensorContext::default();

    let mut by_sensor: HashMap<String, (Vec<f64>, Vec<f64>)> = HashMap::new();
    for name in registry.names() {
        by_sensor.insert(name.to_string(), (Vec::new(), Vec::new()));
    }
    let mut organic_risk = Vec::new();
    let mut synthetic_risk = Vec::new();

    for file in &corpus.organic {
        let Ok(prepared) = preprocessor::prepare(&file.samples, file.sample_rate, 1) else { continue };
        let results = registry.analyze_all(&prepared.samples, CANONICAL_SAMPLE_RATE, &context);
        let mut risk = 0.0f64;
        for result in &results {
            if result.passed.is_none() {
                continue;
            }
            by_sensor.entry(result.name.clone()).or_default().0.push(result.score);
            if result.category == SensorCategory::Prosecution {
                risk = risk.max(result.score);
            }
        }
        organic_risk.push(risk);
    }

    for file in &corpus.synthetic {
        let Ok(prepared) = preprocessor::prepare(&file.samples, file.sample_rate, 1) else { continue };
        let results = registry.analyze_all(&prepared.samples, CANONICAL_SAMPLE_RATE, &context);
        let mut risk = 0.0f64;
        for result in &results {
            if result.passed.is_none() {
                continue;
            }
            by_sensor.entry(result.name.clone()).or_default().1.push(result.score);
            if result.category == SensorCategory::Prosecution {
                risk = risk.max(result.score);
            }
        }
        synthetic_risk.push(risk);
    }

    CorpusScores { by_sensor, organic_risk, synthetic_risk }
}

/// Runs the full calibration pipeline against `<root>/organic` and
/// `<root>/synthetic` WAV directories and returns a ready-to-persist config.
pub fn calibrate(root: &Path, options: &CalibrationOptions) -> Result<PipelineConfig, String> {
    let corpus = Corpus::load(root)?;
    if corpus.organic.len() < 5 || corpus.synthetic.len() < 5 {
        return Err(format!(
            "insufficient corpus size: {} organic, {} synthetic (need >= 5 each)",
            corpus.organic.len(),
            corpus.synthetic.len()
        ));
    }
    info!("calibrating on {} organic and {} synthetic clips", corpus.organic.len(), corpus.synthetic.len());

    let scores = score_corpus(&corpus);

    let mut config = PipelineConfig::default_config();

    for (sensor_name, (organic, synthetic)) in &scores.by_sensor {
        let sensor_threshold = threshold::compute_threshold(organic, synthetic, options.percentile, sensor_name);
        config.sensors.insert(sensor_name.clone(), sensor_threshold);
    }

    for profile in config.fusion.profiles.values_mut() {
        profile.weights = weights::calibrate_weights(&profile.weights, &scores.by_sensor);
    }

    config.fusion.veto = veto::calibrate_veto(&scores.organic_risk, &scores.synthetic_risk, options.target_fpr);

    persist::stamp_meta(&mut config, corpus.fingerprint());

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibrate_rejects_missing_corpus() {
        let result = calibrate(Path::new("/nonexistent/corpus"), &CalibrationOptions::default());
        assert!(result.is_err());
    }
}
