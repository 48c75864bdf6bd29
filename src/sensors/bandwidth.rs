//! Bandwidth Sensor — spectral roll-off estimate (informational).
//!
//! Feeds fusion-profile selection only. Never enters risk or trust
//! aggregation: a historical bug let this sensor's raw Hz value leak into
//! the risk sum, so its `score` field here is a normalized, clamped
//! placeholder — the fusion engine must read `value` from the physics
//! stage's `rolloff_hz`, never from this sensor's score.

use crate::audio::{to_f64, validate_audio_input};
use crate::fft::{spectral_rolloff_hz, welch_periodogram};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

/// Matches the preprocessor's own minimum Welch frame length (§4.1).
const MIN_WELCH_FRAME: usize = 2048;
const ROLLOFF_FRACTION: f64 = 0.95;

pub struct BandwidthSensor {
    pub threshold: f64,
    pub name: String,
}

impl BandwidthSensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(4000.0),
            name: "BandwidthSensor".to_string(),
        }
    }

    pub fn rolloff_hz(audio: &[f64], sample_rate: u32) -> f64 {
        let nyquist = sample_rate as f64 / 2.0;
        if audio.len() < MIN_WELCH_FRAME {
            return nyquist;
        }
        let (power, freqs) = welch_periodogram(audio, sample_rate, MIN_WELCH_FRAME);
        spectral_rolloff_hz(&power, &freqs, ROLLOFF_FRACTION, nyquist)
    }
}

impl Sensor for BandwidthSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::Informational
    }

    fn analyze(&self, audio: &[f32], sample_rate: u32, _context: &SensorContext) -> SensorResult {
        let audio64 = to_f64(audio);
        if let Err(e) = validate_audio_input(&audio64, sample_rate) {
            return SensorResult::abstain(self.name(), self.category(), self.threshold, e.to_string());
        }

        let rolloff = Self::rolloff_hz(&audio64, sample_rate);
        let nyquist = sample_rate as f64 / 2.0;
        let normalized = (rolloff / nyquist.max(1.0)).clamp(0.0, 1.0);

        let detail = format!("spectral rolloff {:.0} Hz (95% energy)", rolloff);
        SensorResult::new(self.name(), self.category(), None, normalized, rolloff, self.threshold).with_detail(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sine_tone;

    #[test]
    fn test_low_tone_low_rolloff() {
        let sensor = BandwidthSensor::new(None);
        let audio = sine_tone(300.0, 16000, 1.0);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.value < 4000.0);
        assert!(result.is_abstention()); // informational: always passed = None
    }

    #[test]
    fn test_short_buffer_returns_nyquist() {
        let sensor = BandwidthSensor::new(None);
        let audio = sine_tone(300.0, 16000, 0.05);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!((result.value - 8000.0).abs() < 1.0);
    }
}
