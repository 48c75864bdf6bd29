//! Sensor framework: a uniform contract over heterogeneous detectors.
//!
//! - `result`: the per-sensor output structure ([`SensorResult`]) and its
//!   category tag ([`SensorCategory`]).
//! - one module per required detector (see the catalog in the crate docs).
//!
//! A [`Registry`] holds the active sensor set in insertion order and runs
//! them independently via [`Registry::analyze_all`].

pub mod bandwidth;
pub mod breath;
pub mod coarticulation;
pub mod digital_silence;
pub mod dynamic_range;
pub mod formant_trajectory;
pub mod glottal_inertia;
pub mod global_formants;
pub mod hf_deepfake;
pub mod pitch_velocity;
pub mod prosodic_continuity;
pub mod result;

use std::time::Duration;

use log::debug;
use rayon::prelude::*;

pub use result::{SensorCategory, SensorResult};

/// Per-call context threaded through every sensor. Immutable, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct SensorContext {
    /// Soft wall-clock budget for this sensor's own work. A sensor whose
    /// inference would exceed this must abstain rather than block the
    /// pipeline (§5 "suspension points").
    pub deadline: Option<Duration>,
}

/// Uniform contract over every detector in the registry.
///
/// Implementations must be a pure function of their inputs, must never
/// panic, and must never block beyond `context.deadline` when set.
pub trait Sensor: Send + Sync {
    fn name(&self) -> &str;
    fn category(&self) -> SensorCategory;
    fn analyze(&self, audio: &[f32], sample_rate: u32, context: &SensorContext) -> SensorResult;
}

/// Insertion-ordered set of active sensors.
///
/// Order is preserved through parallel execution: [`Registry::analyze_all`]
/// uses an indexed parallel map, so the returned vector's order matches
/// registration order regardless of which sensor finishes first.
pub struct Registry {
    sensors: Vec<Box<dyn Sensor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self { sensors: Vec::new() }
    }

    pub fn register(&mut self, sensor: Box<dyn Sensor>) -> &mut Self {
        self.sensors.push(sensor);
        self
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sensors.iter().map(|s| s.name()).collect()
    }

    /// Run every registered sensor against `audio`, in registration order.
    pub fn analyze_all(&self, audio: &[f32], sample_rate: u32, context: &SensorContext) -> Vec<SensorResult> {
        let results: Vec<SensorResult> = self
            .sensors
            .par_iter()
            .map(|sensor| {
                let result = sensor.analyze(audio, sample_rate, context);
                debug!("sensor {} scored {:.4} (passed={:?})", sensor.name(), result.score, result.passed);
                result
            })
            .collect();
        results
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sine_tone;

    struct AlwaysAbstain;
    impl Sensor for AlwaysAbstain {
        fn name(&self) -> &str {
            "AlwaysAbstain"
        }
        fn category(&self) -> SensorCategory {
            SensorCategory::Prosecution
        }
        fn analyze(&self, _audio: &[f32], _sample_rate: u32, _context: &SensorContext) -> SensorResult {
            SensorResult::abstain(self.name(), self.category(), 0.5, "test_stub")
        }
    }

    #[test]
    fn test_registry_preserves_insertion_order() {
        let mut registry = Registry::new();
        registry.register(Box::new(AlwaysAbstain));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["AlwaysAbstain"]);

        let audio = sine_tone(440.0, 16000, 1.0);
        let results = registry.analyze_all(&audio, 16000, &SensorContext::default());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_abstention());
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        let results = registry.analyze_all(&[], 16000, &SensorContext::default());
        assert!(results.is_empty());
    }
}
