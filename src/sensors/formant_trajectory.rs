//! Formant Trajectory Sensor — natural formant continuity (defense).
//!
//! Vocal-tract resonances move continuously between phonemes because the
//! articulators are physical masses. This sensor tracks the spectral
//! centroid (a coarse formant proxy) frame-to-frame and rewards smooth
//! transitions with a high trust score.

use crate::audio::{apply_hamming_window, calculate_rms, frame_audio, to_f64, validate_audio_input};
use crate::fft::{compute_fft, frequency_bins, magnitude_spectrum, spectral_centroid};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.6;
const FRAME_SIZE: usize = 320; // 20ms at 16kHz
const HOP_SIZE: usize = 160; // 10ms at 16kHz
/// Frame-to-frame centroid jump above which a transition looks like a
/// concatenation boundary rather than continuous articulation, in Hz.
const MAX_NATURAL_JUMP_HZ: f64 = 250.0;

pub struct FormantTrajectorySensor {
    pub threshold: f64,
    pub name: String,
}

impl FormantTrajectorySensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "FormantTrajectorySensor".to_string(),
        }
    }

    fn centroid_track(&self, audio: &[f64], sample_rate: u32) -> Vec<f64> {
        let frame_size = (sample_rate as usize * FRAME_SIZE) / 16000;
        let hop_size = (sample_rate as usize * HOP_SIZE) / 16000;
        let frames = frame_audio(audio, frame_size.max(1), hop_size.max(1));

        let mut track = Vec::with_capacity(frames.len());
        for frame in &frames {
            let windowed = apply_hamming_window(frame);
            if calculate_rms(&windowed) < 1e-6 {
                continue;
            }
            if let Ok(fft_result) = compute_fft(&windowed) {
                let magnitudes = magnitude_spectrum(&fft_result);
                let freqs = frequency_bins(windowed.len(), sample_rate);
                track.push(spectral_centroid(&magnitudes, &freqs));
            }
        }
        track
    }
}

impl Sensor for FormantTrajectorySensor {
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

        let track = self.centroid_track(&audio64, sample_rate);
        if track.len() < 3 {
            return SensorResult::abstain(self.name(), self.category(), self.threshold, "insufficient_voiced_frames");
        }

        let mean_jump: f64 = track.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>() / (track.len() - 1) as f64;

        // Trust domain: smooth transitions score near 1.0, abrupt ones near 0.0.
        let trust = if mean_jump <= MAX_NATURAL_JUMP_HZ {
            1.0
        } else {
            (MAX_NATURAL_JUMP_HZ / mean_jump).clamp(0.0, 1.0)
        };
        let passed = trust >= self.threshold;

        let detail = format!("mean formant-proxy jump {:.1} Hz", mean_jump);
        SensorResult::new(self.name(), self.category(), Some(passed), trust, mean_jump, self.threshold).with_detail(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sine_tone;

    #[test]
    fn test_steady_tone_high_trust() {
        let sensor = FormantTrajectorySensor::new(None);
        let audio = sine_tone(220.0, 16000, 1.0);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.score > 0.8);
    }

    #[test]
    fn test_abstains_on_silence() {
        let sensor = FormantTrajectorySensor::new(None);
        let audio = vec![0.0f32; 16000];
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.is_abstention());
    }
}
