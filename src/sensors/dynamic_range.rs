//! Dynamic Range Sensor — natural crest-factor envelope (defense).
//!
//! Human speech has a characteristic peak-to-RMS ratio driven by vocal
//! effort and the glottal pulse shape. Over-compressed synthetic audio
//! (common when a TTS model's output is normalized and limited) collapses
//! this ratio; heavily clipped or artificially peaky audio inflates it.

use crate::audio::{calculate_rms, to_f64, validate_audio_input};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.6;
/// Natural speech crest factor bounds, in dB.
const MIN_NATURAL_CREST_DB: f64 = 6.0;
const MAX_NATURAL_CREST_DB: f64 = 24.0;

pub struct DynamicRangeSensor {
    pub threshold: f64,
    pub name: String,
}

impl DynamicRangeSensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "DynamicRangeSensor".to_string(),
        }
    }

    fn crest_factor_db(audio: &[f64]) -> Option<f64> {
        let rms = calculate_rms(audio);
        if rms < 1e-9 {
            return None;
        }
        let peak = audio.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
        if peak < 1e-9 {
            return None;
        }
        Some(20.0 * (peak / rms).log10())
    }
}

impl Sensor for DynamicRangeSensor {
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

        let crest_db = match Self::crest_factor_db(&audio64) {
            Some(c) if c.is_finite() => c,
            _ => return SensorResult::abstain(self.name(), self.category(), self.threshold, "silent_buffer"),
        };

        let trust = if crest_db < MIN_NATURAL_CREST_DB {
            (crest_db / MIN_NATURAL_CREST_DB).clamp(0.0, 1.0)
        } else if crest_db > MAX_NATURAL_CREST_DB {
            (MAX_NATURAL_CREST_DB / crest_db).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let passed = trust >= self.threshold;

        let detail = format!("crest factor {:.1} dB", crest_db);
        SensorResult::new(self.name(), self.category(), Some(passed), trust, crest_db, self.threshold).with_detail(detail)
    }
}
