//! Fusion profiles — codec-aware weight and threshold bundles.
//!
//! A profile is selected per call from the preprocessor's bandwidth
//! estimate (§4.1, §4.3): narrowband channels (phone, VoIP) zero-weight
//! sensors that rely on high-frequency resonance detail.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Verdict boundaries for a profile. `real < synthetic` is enforced by
/// [`crate::config::PipelineConfig::validate`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VerdictThresholds {
    pub synthetic: f64,
    pub real: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionProfile {
    pub weights: HashMap<String, f64>,
    pub thresholds: VerdictThresholds,
}

impl FusionProfile {
    /// Weight for `sensor_name`, falling back to the "unknown sensor" default
    /// per §4.3 step 3 so a sensor added without updating config still
    /// participates rather than silently vanishing.
    pub fn weight_for(&self, sensor_name: &str) -> f64 {
        const UNKNOWN_SENSOR_DEFAULT_WEIGHT: f64 = 0.05;
        *self.weights.get(sensor_name).unwrap_or(&UNKNOWN_SENSOR_DEFAULT_WEIGHT)
    }

    pub fn total_raw_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn default_wideband() -> Self {
        let weights = [
            ("GlottalInertiaSensor", 0.15),
            ("PitchVelocitySensor", 0.15),
            ("DigitalSilenceSensor", 0.10),
            ("FormantTrajectorySensor", 0.15),
            ("GlobalFormantsSensor", 0.10),
            ("CoarticulationSensor", 0.10),
            ("BreathSensor", 0.10),
            ("DynamicRangeSensor", 0.05),
            ("ProsodicContinuitySensor", 0.10),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            weights,
            thresholds: VerdictThresholds { synthetic: 0.65, real: 0.35 },
        }
    }

    /// Phone/VoIP profile: resonance-detail sensors above ~3.5kHz are
    /// unreliable once the channel has band-limited the signal, so their
    /// weight is zeroed rather than left to decay gracefully (§3 "Fusion
    /// profile").
    pub fn default_narrowband() -> Self {
        let weights = [
            ("GlottalInertiaSensor", 0.20),
            ("PitchVelocitySensor", 0.20),
            ("DigitalSilenceSensor", 0.15),
            ("FormantTrajectorySensor", 0.10),
            ("GlobalFormantsSensor", 0.0),
            ("CoarticulationSensor", 0.0),
            ("BreathSensor", 0.15),
            ("DynamicRangeSensor", 0.05),
            ("ProsodicContinuitySensor", 0.15),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            weights,
            thresholds: VerdictThresholds { synthetic: 0.60, real: 0.40 },
        }
    }
}
