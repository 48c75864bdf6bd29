//! Physics analysis stage — weighted aggregation of sensor outcomes.
//!
//! Runs the sensor registry, selects a fusion profile from the observed
//! bandwidth, and reduces the per-sensor evidence to a single risk score
//! (§4.3). This is the one stage that consumes the raw sensor registry;
//! every other stage (§`stages`) is independent of it.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::audio::to_f64;
use crate::profile::FusionProfile;
use crate::sensors::bandwidth::BandwidthSensor;
use crate::sensors::{Registry, SensorCategory, SensorContext, SensorResult};

/// Narrowband cutoff for profile selection (§2, §4.3): below this, switch
/// from the `default` to the `narrowband` profile.
pub const NARROWBAND_ROLLOFF_HZ: f64 = 4000.0;

pub struct PhysicsResult {
    pub success: bool,
    pub physics_score: f64,
    pub sensor_results: HashMap<String, SensorResult>,
    pub profile_used: String,
    pub rolloff_hz: f64,
}

pub struct PhysicsStage<'a> {
    pub default_profile: &'a FusionProfile,
    pub narrowband_profile: &'a FusionProfile,
}

impl<'a> PhysicsStage<'a> {
    pub fn new(default_profile: &'a FusionProfile, narrowband_profile: &'a FusionProfile) -> Self {
        Self { default_profile, narrowband_profile }
    }

    pub fn run(&self, registry: &Registry, audio: &[f32], sample_rate: u32, context: &SensorContext) -> PhysicsResult {
        let results = registry.analyze_all(audio, sample_rate, context);

        let rolloff_hz = BandwidthSensor::rolloff_hz(&to_f64(audio), sample_rate);
        let (profile, profile_name) = if rolloff_hz < NARROWBAND_ROLLOFF_HZ {
            (self.narrowband_profile, "narrowband")
        } else {
            (self.default_profile, "default")
        };
        info!("physics stage selected profile={profile_name} rolloff={rolloff_hz:.0}Hz");

        let mut weighted_sum = 0.0f64;
        let mut total_weight = 0.0f64;
        let mut by_name = HashMap::with_capacity(results.len());

        for result in results {
            let name = result.name.clone();

            if result.passed.is_none() || result.category == SensorCategory::Informational {
                by_name.insert(name, result);
                continue;
            }

            let weight = profile.weight_for(&result.name);
            if weight <= 0.0 {
                by_name.insert(name, result);
                continue;
            }

            let mut risk = result.score.clamp(0.0, 1.0);
            if !result.score.is_finite() {
                warn!("sensor {} emitted non-finite score, treating as abstention", result.name);
                by_name.insert(name, result);
                continue;
            }
            if result.score < 0.0 || result.score > 1.0 {
                warn!("sensor {} score {} out of [0,1], clamped", result.name, result.score);
            }

            // Prosecution sensors already emit risk-domain scores. Defense
            // sensors emit trust-domain scores (probability of being real),
            // so invert before folding into the same risk sum.
            if result.category == SensorCategory::Defense {
                risk = 1.0 - result.score;
            }

            debug!("sensor {} weight={weight:.3} risk_contribution={risk:.3}", result.name);
            weighted_sum += risk * weight;
            total_weight += weight;
            by_name.insert(name, result);
        }

        let physics_score = if total_weight <= 0.0 {
            info!("physics stage: no active sensors, emitting neutral score");
            0.5
        } else {
            (weighted_sum / total_weight).clamp(0.0, 1.0)
        };

        PhysicsResult {
            success: true,
            physics_score,
            sensor_results: by_name,
            profile_used: profile_name.to_string(),
            rolloff_hz,
        }
    }
}
