//! Fusion engine — combines stage scores and applies the adaptive
//! prosecution veto (§4.4).

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::sensors::{SensorCategory, SensorResult};
use crate::stages::StageResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Synthetic,
    Uncertain,
}

/// Veto thresholds, §3 "Veto thresholds": `0 < moderate < high <= 1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VetoThresholds {
    pub high_confidence: f64,
    pub moderate: f64,
    /// Blend weights `(base_weight, risk_weight)` for the moderate-veto
    /// branch, config-backed per the decision in §9 Open Questions (b).
    pub moderate_blend: (f64, f64),
}

impl Default for VetoThresholds {
    fn default() -> Self {
        Self { high_confidence: 0.85, moderate: 0.75, moderate_blend: (0.4, 0.6) }
    }
}

/// Fully serializable result of a single `analyze` call (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionResult {
    pub final_score: f64,
    pub verdict: Verdict,
    pub base_score: f64,
    pub risk: f64,
    pub trust: f64,
    pub decision_logic: String,
    pub profile_used: String,
    pub rolloff_hz: f64,
    pub stage_scores: HashMap<String, f64>,
    pub sensor_results: HashMap<String, SensorResult>,
}

impl FusionResult {
    /// §4.4 "Failure semantics": every stage failed.
    pub fn insufficient_evidence() -> Self {
        Self {
            final_score: 0.5,
            verdict: Verdict::Uncertain,
            base_score: 0.5,
            risk: 0.0,
            trust: 0.5,
            decision_logic: "insufficient evidence".to_string(),
            profile_used: "none".to_string(),
            rolloff_hz: 0.0,
            stage_scores: HashMap::new(),
            sensor_results: HashMap::new(),
        }
    }
}

pub struct FusionEngine {
    pub veto: VetoThresholds,
}

impl FusionEngine {
    pub fn new(veto: VetoThresholds) -> Self {
        Self { veto }
    }

    /// `stage_weights` need not sum to exactly 1.0 here — that invariant is
    /// enforced once at config load (§7); this function renormalizes over
    /// whichever stages actually succeeded (§4.4 "Stage score extraction").
    pub fn fuse(
        &self,
        stages: &HashMap<String, StageResult>,
        stage_weights: &HashMap<String, f64>,
        sensor_results: HashMap<String, SensorResult>,
        profile_used: String,
        rolloff_hz: f64,
        synthetic_threshold: f64,
        real_threshold: f64,
    ) -> FusionResult {
        let mut stage_scores = HashMap::new();
        let mut weighted_sum = 0.0f64;
        let mut total_weight = 0.0f64;

        for (name, result) in stages {
            if !result.success {
                continue;
            }
            let score = result.score.unwrap_or(0.5).clamp(0.0, 1.0);
            stage_scores.insert(name.clone(), score);
            let weight = *stage_weights.get(name).unwrap_or(&0.0);
            weighted_sum += weight * score;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            info!("fusion: no stage produced a usable score");
            let mut result = FusionResult::insufficient_evidence();
            result.profile_used = profile_used;
            result.rolloff_hz = rolloff_hz;
            result.sensor_results = sensor_results;
            return result;
        }

        let base_score = (weighted_sum / total_weight).clamp(0.0, 1.0);

        let risk_scores: Vec<f64> = sensor_results
            .values()
            .filter(|r| r.category == SensorCategory::Prosecution && r.passed.is_some())
            .map(|r| r.score.clamp(0.0, 1.0))
            .collect();
        let trust_scores: Vec<f64> = sensor_results
            .values()
            .filter(|r| r.category == SensorCategory::Defense && r.passed.is_some())
            .map(|r| r.score.clamp(0.0, 1.0))
            .collect();

        let risk = risk_scores.iter().cloned().fold(0.0f64, f64::max);
        let trust = if trust_scores.is_empty() {
            0.5
        } else {
            trust_scores.iter().sum::<f64>() / trust_scores.len() as f64
        };

        let (final_score, decision_logic) = if risk > self.veto.high_confidence {
            (risk, "high-confidence prosecution veto")
        } else if risk > self.veto.moderate {
            let (w_base, w_risk) = self.veto.moderate_blend;
            (w_base * base_score + w_risk * risk, "prosecution influence")
        } else {
            (base_score, "balanced fusion")
        };
        let final_score = final_score.clamp(0.0, 1.0);

        let verdict = if final_score >= synthetic_threshold {
            Verdict::Synthetic
        } else if final_score <= real_threshold {
            Verdict::Real
        } else {
            Verdict::Uncertain
        };

        FusionResult {
            final_score,
            verdict,
            base_score,
            risk,
            trust,
            decision_logic: decision_logic.to_string(),
            profile_used,
            rolloff_hz,
            stage_scores,
            sensor_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorResult as SR;

    fn stage(name: &str, score: f64) -> (String, StageResult) {
        (name.to_string(), StageResult::ok(score))
    }

    fn weights(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_high_confidence_veto_overrides_base() {
        let engine = FusionEngine::new(VetoThresholds::default());
        let stages = HashMap::from([stage("physics", 0.1)]);
        let stage_weights = weights(&[("physics", 1.0)]);
        let mut sensors = HashMap::new();
        sensors.insert(
            "GlottalInertiaSensor".to_string(),
            SR::new("GlottalInertiaSensor", SensorCategory::Prosecution, Some(false), 0.9, 0.9, 0.7),
        );
        let result = engine.fuse(&stages, &stage_weights, sensors, "default".into(), 8000.0, 0.65, 0.35);
        assert!((result.final_score - 0.9).abs() < 1e-9);
        assert_eq!(result.decision_logic, "high-confidence prosecution veto");
        assert_eq!(result.verdict, Verdict::Synthetic);
    }

    #[test]
    fn test_moderate_veto_blends() {
        let engine = FusionEngine::new(VetoThresholds::default());
        let stages = HashMap::from([stage("physics", 0.2)]);
        let stage_weights = weights(&[("physics", 1.0)]);
        let mut sensors = HashMap::new();
        sensors.insert(
            "GlottalInertiaSensor".to_string(),
            SR::new("GlottalInertiaSensor", SensorCategory::Prosecution, Some(false), 0.8, 0.8, 0.7),
        );
        let result = engine.fuse(&stages, &stage_weights, sensors, "default".into(), 8000.0, 0.65, 0.35);
        assert!((result.final_score - 0.56).abs() < 1e-9);
        assert_eq!(result.decision_logic, "prosecution influence");
    }

    #[test]
    fn test_balanced_fusion_when_risk_low() {
        let engine = FusionEngine::new(VetoThresholds::default());
        let stages = HashMap::from([stage("physics", 0.3)]);
        let stage_weights = weights(&[("physics", 1.0)]);
        let result = engine.fuse(&stages, &stage_weights, HashMap::new(), "default".into(), 8000.0, 0.65, 0.35);
        assert!((result.final_score - 0.3).abs() < 1e-9);
        assert_eq!(result.decision_logic, "balanced fusion");
        assert_eq!(result.risk, 0.0);
        assert_eq!(result.trust, 0.5);
    }

    #[test]
    fn test_no_stages_is_insufficient_evidence() {
        let engine = FusionEngine::new(VetoThresholds::default());
        let result = engine.fuse(&HashMap::new(), &HashMap::new(), HashMap::new(), "default".into(), 8000.0, 0.65, 0.35);
        assert_eq!(result.decision_logic, "insufficient evidence");
        assert_eq!(result.verdict, Verdict::Uncertain);
        assert!((result.final_score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_informational_sensor_excluded_from_risk_and_trust() {
        let engine = FusionEngine::new(VetoThresholds::default());
        let stages = HashMap::from([stage("physics", 0.4)]);
        let stage_weights = weights(&[("physics", 1.0)]);
        let mut sensors = HashMap::new();
        sensors.insert(
            "BandwidthSensor".to_string(),
            SR::new("BandwidthSensor", SensorCategory::Informational, None, 0.9, 6321.0, 4000.0),
        );
        let result = engine.fuse(&stages, &stage_weights, sensors, "default".into(), 8000.0, 0.65, 0.35);
        assert_eq!(result.risk, 0.0);
        assert_eq!(result.trust, 0.5);
    }

    #[test]
    fn test_serde_roundtrip() {
        let engine = FusionEngine::new(VetoThresholds::default());
        let stages = HashMap::from([stage("physics", 0.4)]);
        let stage_weights = weights(&[("physics", 1.0)]);
        let result = engine.fuse(&stages, &stage_weights, HashMap::new(), "default".into(), 8000.0, 0.65, 0.35);
        let json = serde_json::to_string(&result).unwrap();
        let back: FusionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.verdict, result.verdict);
        assert!((back.final_score - result.final_score).abs() < 1e-12);
    }
}
