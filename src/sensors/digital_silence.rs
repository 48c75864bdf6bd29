//! Digital Silence Sensor — splice and gap detection.
//!
//! Real recordings carry a non-zero noise floor even during pauses (room
//! tone, preamp hiss). A run of bit-exact zero samples is not a "quiet"
//! moment, it's a digital insert: a splice point, a TTS frame boundary, or a
//! concatenated clip edge.

use crate::audio::{to_f64, validate_audio_input};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.7;
const EXACT_ZERO_EPS: f64 = 1e-9;
/// Shortest exact-zero run treated as a deliberate digital gap rather than
/// coincidental zero-crossings, in samples (5ms at 16kHz).
const MIN_GAP_SAMPLES_AT_16K: usize = 80;

pub struct DigitalSilenceSensor {
    pub threshold: f64,
    pub name: String,
}

impl DigitalSilenceSensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "DigitalSilenceSensor".to_string(),
        }
    }

    /// Fraction of the buffer covered by exact-zero runs at least
    /// `min_gap` samples long, plus the count of such runs.
    fn exact_zero_coverage(audio: &[f64], min_gap: usize) -> (f64, usize) {
        let mut covered = 0usize;
        let mut run_count = 0usize;
        let mut run_len = 0usize;

        for &sample in audio {
            if sample.abs() < EXACT_ZERO_EPS {
                run_len += 1;
            } else {
                if run_len >= min_gap {
                    covered += run_len;
                    run_count += 1;
                }
                run_len = 0;
            }
        }
        if run_len >= min_gap {
            covered += run_len;
            run_count += 1;
        }

        (covered as f64 / audio.len().max(1) as f64, run_count)
    }
}

impl Sensor for DigitalSilenceSensor {
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

        let min_gap = (MIN_GAP_SAMPLES_AT_16K * sample_rate as usize / 16000).max(1);
        let (coverage, run_count) = Self::exact_zero_coverage(&audio64, min_gap);

        // A handful of true digital gaps in a long clip is unremarkable
        // (recording start/stop); a high fraction of the clip made of exact
        // zero, or many short runs, is the splice signature.
        let run_density = run_count as f64 / (audio64.len() as f64 / sample_rate as f64).max(0.1);
        let risk = (coverage * 2.0 + (run_density / 5.0)).clamp(0.0, 1.0);
        let passed = risk < self.threshold;

        let detail = format!(
            "exact-zero coverage {:.2}% across {} run(s)",
            coverage * 100.0,
            run_count
        );

        SensorResult::new(self.name(), self.category(), Some(passed), risk, coverage, self.threshold).with_detail(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{concat, sine_tone, silence};

    #[test]
    fn test_clean_speech_low_risk() {
        let sensor = DigitalSilenceSensor::new(None);
        let audio = sine_tone(200.0, 16000, 1.0);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.score < 0.3);
    }

    #[test]
    fn test_spliced_gap_flagged() {
        let sensor = DigitalSilenceSensor::new(None);
        let audio = concat(&[
            sine_tone(200.0, 16000, 0.3),
            silence(16000, 0.3),
            sine_tone(200.0, 16000, 0.3),
        ]);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.value > 0.0);
    }

    #[test]
    fn test_abstains_on_empty() {
        let sensor = DigitalSilenceSensor::new(None);
        let result = sensor.analyze(&[], 16000, &SensorContext::default());
        assert!(result.is_abstention());
    }
}
