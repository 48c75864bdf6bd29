//! Glottal Inertia Sensor — vocal-fold rise-time plausibility.
//!
//! The vocal folds are a mechanical system with mass and elasticity: energy
//! cannot ramp from silence to full voicing instantaneously. This sensor
//! measures the fastest amplitude-envelope rise in the clip and flags rises
//! faster than any documented human phonation onset.

use crate::audio::{calculate_rms, frame_audio, to_f64, validate_audio_input};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.7;
const FRAME_SIZE: usize = 160; // 10ms at 16kHz
const HOP_SIZE: usize = 80; // 5ms at 16kHz

/// Fastest physiologically plausible envelope rise, in RMS units per second.
/// Above this, an onset is more consistent with a vocoder's frame boundary
/// than with a larynx accelerating from rest.
const MAX_PLAUSIBLE_RISE_PER_SEC: f64 = 40.0;

pub struct GlottalInertiaSensor {
    pub threshold: f64,
    pub name: String,
}

impl GlottalInertiaSensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "GlottalInertiaSensor".to_string(),
        }
    }

    fn max_rise_rate(&self, audio: &[f64], sample_rate: u32) -> Option<f64> {
        let frame_size = (sample_rate as usize * FRAME_SIZE) / 16000;
        let hop_size = (sample_rate as usize * HOP_SIZE) / 16000;
        let frames = frame_audio(audio, frame_size.max(1), hop_size.max(1));
        if frames.len() < 2 {
            return None;
        }

        let envelope: Vec<f64> = frames.iter().map(|f| calculate_rms(f)).collect();
        let hop_seconds = hop_size.max(1) as f64 / sample_rate as f64;

        let mut max_rate = 0.0f64;
        for pair in envelope.windows(2) {
            let rise = (pair[1] - pair[0]).max(0.0);
            let rate = rise / hop_seconds;
            if rate > max_rate {
                max_rate = rate;
            }
        }
        Some(max_rate)
    }
}

impl Sensor for GlottalInertiaSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::Prosecution
    }

    fn analyze(&self, audio: &[f32], sample_rate: u32, _context: &SensorContext) -> SensorResult {
        let audio64 = to_f64(audio);
        if let Err(e) = validate_audio_input(&audio64, sample_rate) {
            return SensorResult::abstain(self.name(), self.category(), self.threshold, e.to_string());
        }

        let rate = match self.max_rise_rate(&audio64, sample_rate) {
            Some(r) => r,
            None => return SensorResult::abstain(self.name(), self.category(), self.threshold, "insufficient_frames"),
        };

        if !rate.is_finite() {
            return SensorResult::abstain(self.name(), self.category(), self.threshold, "non_finite_rate");
        }

        let risk = ((rate - MAX_PLAUSIBLE_RISE_PER_SEC) / MAX_PLAUSIBLE_RISE_PER_SEC).clamp(0.0, 1.0);
        let passed = risk < self.threshold;

        let detail = if passed {
            format!("onset rise rate {:.1}/s within plausible range", rate)
        } else {
            format!("onset rise rate {:.1}/s exceeds plausible vocal-fold inertia", rate)
        };

        SensorResult::new(self.name(), self.category(), Some(passed), risk, rate, self.threshold).with_detail(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{concat, sine_tone, silence};

    #[test]
    fn test_gradual_onset_low_risk() {
        let sensor = GlottalInertiaSensor::new(None);
        let audio = concat(&[silence(16000, 0.5), sine_tone(200.0, 16000, 1.0)]);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.score <= 1.0 && result.score >= 0.0);
    }

    #[test]
    fn test_abrupt_onset_flagged() {
        let sensor = GlottalInertiaSensor::new(None);
        // A tone starting at full amplitude from true digital zero is an
        // instantaneous rise, well above any physiological onset rate.
        let audio = concat(&[silence(16000, 0.1), sine_tone(200.0, 16000, 0.5)]);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.value > 0.0);
    }

    #[test]
    fn test_abstains_on_empty() {
        let sensor = GlottalInertiaSensor::new(None);
        let result = sensor.analyze(&[], 16000, &SensorContext::default());
        assert!(result.is_abstention());
    }

    #[test]
    fn test_threshold_clamped() {
        let sensor = GlottalInertiaSensor::new(Some(5.0));
        assert!((sensor.threshold - 1.0).abs() < f64::EPSILON);
    }
}
