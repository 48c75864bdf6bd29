//! Prosodic Continuity Sensor — abrupt frame-to-frame prosodic breaks (prosecution).
//!
//! Prosody (the energy and pitch contour of an utterance) evolves smoothly
//! within a breath group. A sudden jump in frame energy with no
//! corresponding acoustic event is the signature of a cut-and-paste splice
//! or a TTS unit-selection boundary.

use crate::audio::{calculate_rms, frame_audio, to_f64, validate_audio_input};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.7;
const FRAME_SIZE: usize = 160; // 10ms at 16kHz
const HOP_SIZE: usize = 80; // 5ms at 16kHz
/// Frame-to-frame RMS ratio beyond which an energy jump is implausible for
/// continuous phonation rather than a splice.
const MAX_NATURAL_ENERGY_RATIO: f64 = 6.0;

pub struct ProsodicContinuitySensor {
    pub threshold: f64,
    pub name: String,
}

impl ProsodicContinuitySensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "ProsodicContinuitySensor".to_string(),
        }
    }

    fn max_energy_ratio(audio: &[f64], sample_rate: u32) -> Option<f64> {
        let frame_size = (sample_rate as usize * FRAME_SIZE) / 16000;
        let hop_size = (sample_rate as usize * HOP_SIZE) / 16000;
        let frames = frame_audio(audio, frame_size.max(1), hop_size.max(1));
        if frames.len() < 2 {
            return None;
        }

        let energies: Vec<f64> = frames.iter().map(|f| calculate_rms(f)).collect();
        let mut max_ratio = 0.0f64;
        for pair in energies.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a < 1e-6 && b < 1e-6 {
                continue;
            }
            let ratio = (a.max(b) + 1e-9) / (a.min(b) + 1e-9);
            max_ratio = max_ratio.max(ratio);
        }
        Some(max_ratio)
    }
}

impl Sensor for ProsodicContinuitySensor {
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

        let ratio = match Self::max_energy_ratio(&audio64, sample_rate) {
            Some(r) if r.is_finite() => r,
            _ => return SensorResult::abstain(self.name(), self.category(), self.threshold, "insufficient_frames"),
        };

        let risk = ((ratio - MAX_NATURAL_ENERGY_RATIO) / MAX_NATURAL_ENERGY_RATIO).clamp(0.0, 1.0);
        let passed = risk < self.threshold;

        let detail = format!("max frame-to-frame energy ratio {:.1}x", ratio);
        SensorResult::new(self.name(), self.category(), Some(passed), risk, ratio, self.threshold).with_detail(detail)
    }
}
