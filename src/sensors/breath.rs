//! Breath Sensor — natural phonation duration limits (defense).
//!
//! A human speaker cannot sustain voiced phonation indefinitely without
//! inhaling; continuous voiced runs are bounded by lung capacity. TTS and
//! voice-conversion systems, which synthesize frame-by-frame rather than
//! breath-by-breath, can produce runs of sustained voicing well past any
//! human breath-hold.

use crate::audio::{calculate_rms, frame_audio, to_f64, validate_audio_input};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.6;
const FRAME_SIZE: usize = 160; // 10ms at 16kHz
const HOP_SIZE: usize = 160; // non-overlapping, one decision per 10ms
const VOICED_RMS_FLOOR: f64 = 0.02;
/// Longest sustained voiced run observed in trained speakers without a
/// breath, in seconds. Generous on purpose: this sensor should not punish
/// legitimate long phrases, only runs that are physically implausible.
const MAX_PLAUSIBLE_BREATH_HOLD_S: f64 = 22.0;

pub struct BreathSensor {
    pub threshold: f64,
    pub name: String,
}

impl BreathSensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "BreathSensor".to_string(),
        }
    }

    fn longest_voiced_run_seconds(audio: &[f64], sample_rate: u32) -> f64 {
        let frame_size = (sample_rate as usize * FRAME_SIZE) / 16000;
        let hop_size = (sample_rate as usize * HOP_SIZE) / 16000;
        let frames = frame_audio(audio, frame_size.max(1), hop_size.max(1));
        let frame_duration = hop_size.max(1) as f64 / sample_rate as f64;

        let mut longest = 0usize;
        let mut current = 0usize;
        for frame in &frames {
            if calculate_rms(frame) >= VOICED_RMS_FLOOR {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        longest as f64 * frame_duration
    }
}

impl Sensor for BreathSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::Defense
    }

    fn analyze(&self, audio: &[f32], sample_rate: u32, _context: &SensorContext) -> SensorResult {
        let audio64 = to_f64(audio);
        if let Err(e) = validate_audio_input(&audio64, sample_rate) {
            return SensorResult::abstain(self.name(), self.category(), self.threshold, e.to_string());
        }

        let longest_run_s = Self::longest_voiced_run_seconds(&audio64, sample_rate);
        if longest_run_s <= 0.0 {
            return SensorResult::abstain(self.name(), self.category(), self.threshold, "no_voiced_segments");
        }

        let trust = (MAX_PLAUSIBLE_BREATH_HOLD_S / longest_run_s).clamp(0.0, 1.0);
        let passed = trust >= self.threshold;

        let detail = format!("longest sustained voicing {:.2}s", longest_run_s);
        SensorResult::new(self.name(), self.category(), Some(passed), trust, longest_run_s, self.threshold).with_detail(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sine_tone, silence};

    #[test]
    fn test_short_utterance_high_trust() {
        let sensor = BreathSensor::new(None);
        let audio = sine_tone(200.0, 16000, 2.0);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.score > 0.9);
    }

    #[test]
    fn test_abstains_on_silence() {
        let sensor = BreathSensor::new(None);
        let audio = silence(16000, 1.0);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.is_abstention());
    }
}
