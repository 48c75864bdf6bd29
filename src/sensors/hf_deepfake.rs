//! HF Deepfake Sensor — ML ensemble (optional, fail-open, prosecution).
//!
//! A placeholder for an externally-trained model ensemble. No model is
//! bundled with this crate; the sensor degrades to fail-open per §4.2 and
//! logs its unavailability once per instance rather than once per call.

use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

pub struct HfDeepfakeSensor {
    pub threshold: f64,
    pub name: String,
    available: bool,
    warned: AtomicBool,
}

impl HfDeepfakeSensor {
    /// `model_path` is accepted for interface symmetry with a future real
    /// ensemble; any value currently leaves the sensor unavailable.
    pub fn new(threshold: Option<f64>, model_path: Option<&str>) -> Self {
        Self {
            threshold: threshold.unwrap_or(0.8).clamp(0.0, 1.0),
            name: "HfDeepfakeSensor".to_string(),
            available: model_path.is_some() && Self::try_load(model_path.unwrap()),
            warned: AtomicBool::new(false),
        }
    }

    fn try_load(_path: &str) -> bool {
        false
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}

impl Sensor for HfDeepfakeSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::Prosecution
    }

    fn analyze(&self, _audio: &[f32], _sample_rate: u32, _context: &SensorContext) -> SensorResult {
        if !self.available {
            if !self.warned.swap(true, Ordering::Relaxed) {
                warn!("{} unavailable: no model loaded, sensor is fail-open", self.name);
            }
            return SensorResult::abstain(self.name(), self.category(), self.threshold, "model_unavailable");
        }

        // Unreachable until a real ensemble is wired in; kept so the trait
        // contract has a non-stub arm once `available` can become true.
        SensorResult::abstain(self.name(), self.category(), self.threshold, "not_implemented")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sine_tone;

    #[test]
    fn test_unavailable_sensor_always_abstains() {
        let sensor = HfDeepfakeSensor::new(None, None);
        assert!(!sensor.is_available());
        let audio = sine_tone(200.0, 16000, 1.0);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.is_abstention());
        assert_eq!(result.reason.as_deref(), Some("model_unavailable"));
    }

    #[test]
    fn test_warns_only_once() {
        let sensor = HfDeepfakeSensor::new(None, None);
        let audio = sine_tone(200.0, 16000, 0.1);
        sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(sensor.warned.load(Ordering::Relaxed));
        // Second call should not panic or re-trigger logic paths beyond the swap.
        sensor.analyze(&audio, 16000, &SensorContext::default());
    }
}
