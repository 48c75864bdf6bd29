//! Standardized sensor result structure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which side of the real/synthetic question a sensor argues for.
///
/// `Informational` sensors never enter risk or trust aggregation; they only
/// feed profile selection (bandwidth is the only current example).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorCategory {
    /// High score argues the audio is synthetic.
    Prosecution,
    /// High score argues the audio is real.
    Defense,
    /// Feeds profile selection only, never risk or trust.
    Informational,
}

/// Uniform per-sensor output.
///
/// # Invariant
/// `score` is always in `[0, 1]` once a result leaves [`crate::sensors::Sensor::analyze`].
/// Its domain depends on `category`: prosecution and informational sensors
/// emit risk domain directly (1.0 = most suspicious); defense sensors emit
/// trust domain (1.0 = most convincingly real). Aggregators that combine
/// sensors into a single risk-domain sum (see
/// [`crate::physics::PhysicsStage::run`]) invert defense scores (`1.0 -
/// score`) before folding them in; the fusion engine's own trust statistic
/// reads defense scores directly, matching this domain. `passed = None`
/// marks an abstention and excludes the result from aggregation regardless
/// of category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorResult {
    pub name: String,
    pub category: SensorCategory,
    pub passed: Option<bool>,
    pub score: f64,
    pub value: f64,
    pub threshold: f64,
    pub reason: Option<String>,
    pub detail: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl SensorResult {
    pub fn new(
        name: impl Into<String>,
        category: SensorCategory,
        passed: Option<bool>,
        score: f64,
        value: f64,
        threshold: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            passed,
            score: score.clamp(0.0, 1.0),
            value,
            threshold,
            reason: None,
            detail: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// An abstention: the sensor could not reach a verdict on this input.
    /// Neutral score per the sensor contract (never contaminates aggregation
    /// since `passed.is_none()` excludes it regardless of the score value).
    pub fn abstain(name: impl Into<String>, category: SensorCategory, threshold: f64, reason: impl Into<String>) -> Self {
        Self::new(name, category, None, 0.5, 0.0, threshold).with_reason(reason)
    }

    pub fn is_pass(&self) -> bool {
        self.passed.unwrap_or(false)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self.passed, Some(false))
    }

    pub fn is_abstention(&self) -> bool {
        self.passed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_score() {
        let r = SensorResult::new("x", SensorCategory::Prosecution, Some(true), 1.4, 0.0, 0.5);
        assert!((r.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_abstain_excluded_by_passed() {
        let r = SensorResult::abstain("x", SensorCategory::Defense, 0.5, "insufficient_data");
        assert!(r.is_abstention());
        assert_eq!(r.reason.as_deref(), Some("insufficient_data"));
    }

    #[test]
    fn test_builder_chain() {
        let r = SensorResult::new("x", SensorCategory::Informational, None, 0.0, 6321.0, 4000.0)
            .with_detail("rolloff computed")
            .with_metadata("unit", "hz");
        assert_eq!(r.metadata.get("unit").map(String::as_str), Some("hz"));
        assert_eq!(r.detail.as_deref(), Some("rolloff computed"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let r = SensorResult::new("GlottalInertiaSensor", SensorCategory::Prosecution, Some(false), 0.9, 0.9, 0.7);
        let json = serde_json::to_string(&r).unwrap();
        let back: SensorResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, r.name);
        assert!((back.score - r.score).abs() < f64::EPSILON);
    }
}
