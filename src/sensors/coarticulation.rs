//! Coarticulation Sensor — natural motor-planning continuity (defense).
//!
//! Neighboring phonemes influence each other's articulation because the
//! tongue and jaw are already moving toward the next target before the
//! current one finishes. That shows up as smooth, non-random spectral flux
//! between consecutive frames; frame-independent synthesis (or naive
//! concatenation) tends to produce flux that is either too uniform or too
//! erratic.

use crate::audio::{apply_hamming_window, calculate_rms, frame_audio, to_f64, validate_audio_input};
use crate::fft::{compute_fft, magnitude_spectrum};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.6;
const FRAME_SIZE: usize = 320; // 20ms at 16kHz
const HOP_SIZE: usize = 160; // 10ms at 16kHz
const MIN_EXPECTED_FLUX_STD: f64 = 0.01;
const MAX_EXPECTED_FLUX_STD: f64 = 5.0;

pub struct CoarticulationSensor {
    pub threshold: f64,
    pub name: String,
}

impl CoarticulationSensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "CoarticulationSensor".to_string(),
        }
    }

    /// L1 spectral flux between consecutive magnitude spectra, normalized by
    /// frame energy so loud and quiet passages are comparable.
    fn flux_track(&self, audio: &[f64], sample_rate: u32) -> Vec<f64> {
        let frame_size = (sample_rate as usize * FRAME_SIZE) / 16000;
        let hop_size = (sample_rate as usize * HOP_SIZE) / 16000;
        let frames = frame_audio(audio, frame_size.max(1), hop_size.max(1));

        let mut spectra: Vec<Vec<f64>> = Vec::with_capacity(frames.len());
        for frame in &frames {
            let windowed = apply_hamming_window(frame);
            if calculate_rms(&windowed) < 1e-6 {
                continue;
            }
            if let Ok(fft_result) = compute_fft(&windowed) {
                spectra.push(magnitude_spectrum(&fft_result));
            }
        }

        spectra
            .windows(2)
            .map(|pair| {
                let energy: f64 = pair[0].iter().sum::<f64>().max(1e-9);
                let flux: f64 = pair[0].iter().zip(pair[1].iter()).map(|(a, b)| (b - a).abs()).sum();
                flux / energy
            })
            .collect()
    }
}

impl Sensor for CoarticulationSensor {
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

        let flux = self.flux_track(&audio64, sample_rate);
        if flux.len() < 3 {
            return SensorResult::abstain(self.name(), self.category(), self.threshold, "insufficient_voiced_frames");
        }

        let mean = flux.iter().sum::<f64>() / flux.len() as f64;
        let variance = flux.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / (flux.len() - 1).max(1) as f64;
        let std_dev = variance.sqrt();

        let trust = if std_dev < MIN_EXPECTED_FLUX_STD {
            (std_dev / MIN_EXPECTED_FLUX_STD).clamp(0.0, 1.0)
        } else if std_dev > MAX_EXPECTED_FLUX_STD {
            (MAX_EXPECTED_FLUX_STD / std_dev).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let passed = trust >= self.threshold;

        let detail = format!("spectral flux std {:.4}", std_dev);
        SensorResult::new(self.name(), self.category(), Some(passed), trust, std_dev, self.threshold).with_detail(detail)
    }
}
