//! Pitch Velocity Sensor — laryngeal pitch-glide plausibility.
//!
//! Human F0 glides are bounded by how fast the cricothyroid and vocalis
//! muscles can retune the vocal folds. This sensor tracks frame-to-frame F0
//! (via autocorrelation) and flags glide rates beyond documented human
//! limits, a common artifact of pitch-shifted or vocoded speech.

use crate::audio::{frame_audio, to_f64, validate_audio_input};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.7;
const FRAME_SIZE: usize = 640; // 40ms at 16kHz, long enough for low pitches
const HOP_SIZE: usize = 160; // 10ms at 16kHz
const MIN_F0_HZ: f64 = 60.0;
const MAX_F0_HZ: f64 = 500.0;

/// Fastest documented voluntary pitch glide, in semitones per second.
const MAX_PLAUSIBLE_GLIDE_SEMITONES_PER_SEC: f64 = 48.0;

pub struct PitchVelocitySensor {
    pub threshold: f64,
    pub name: String,
}

impl PitchVelocitySensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "PitchVelocitySensor".to_string(),
        }
    }

    /// Autocorrelation F0 estimate for a single frame, `None` if unvoiced.
    fn estimate_f0(frame: &[f64], sample_rate: u32) -> Option<f64> {
        let min_lag = (sample_rate as f64 / MAX_F0_HZ) as usize;
        let max_lag = (sample_rate as f64 / MIN_F0_HZ) as usize;
        if frame.len() <= max_lag.max(min_lag) {
            return None;
        }

        let energy: f64 = frame.iter().map(|x| x * x).sum();
        if energy < 1e-9 {
            return None;
        }

        let mut best_lag = 0usize;
        let mut best_corr = 0.0f64;
        for lag in min_lag.max(1)..=max_lag {
            let mut corr = 0.0;
            for i in 0..frame.len() - lag {
                corr += frame[i] * frame[i + lag];
            }
            let normalized = corr / energy;
            if normalized > best_corr {
                best_corr = normalized;
                best_lag = lag;
            }
        }

        if best_lag == 0 || best_corr < 0.3 {
            return None;
        }
        Some(sample_rate as f64 / best_lag as f64)
    }

    fn max_glide_rate(&self, audio: &[f64], sample_rate: u32) -> Option<f64> {
        let frames = frame_audio(audio, FRAME_SIZE.min(audio.len().max(1)), HOP_SIZE.max(1));
        if frames.len() < 2 {
            return None;
        }

        let hop_seconds = HOP_SIZE as f64 / sample_rate as f64;
        let f0_track: Vec<Option<f64>> = frames.iter().map(|f| Self::estimate_f0(f, sample_rate)).collect();

        let mut max_rate = 0.0f64;
        for pair in f0_track.windows(2) {
            if let (Some(f0_prev), Some(f0_next)) = (pair[0], pair[1]) {
                let semitones = 12.0 * (f0_next / f0_prev).log2();
                let rate = semitones.abs() / hop_seconds;
                if rate > max_rate {
                    max_rate = rate;
                }
            }
        }
        Some(max_rate)
    }
}

impl Sensor for PitchVelocitySensor {
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

        let rate = match self.max_glide_rate(&audio64, sample_rate) {
            Some(r) if r.is_finite() => r,
            _ => return SensorResult::abstain(self.name(), self.category(), self.threshold, "no_voiced_transitions"),
        };

        let risk = ((rate - MAX_PLAUSIBLE_GLIDE_SEMITONES_PER_SEC) / MAX_PLAUSIBLE_GLIDE_SEMITONES_PER_SEC).clamp(0.0, 1.0);
        let passed = risk < self.threshold;

        let detail = if passed {
            format!("max pitch glide {:.1} semitones/s within vocal range", rate)
        } else {
            format!("max pitch glide {:.1} semitones/s exceeds laryngeal limits", rate)
        };

        SensorResult::new(self.name(), self.category(), Some(passed), risk, rate, self.threshold).with_detail(detail)
    }
}
