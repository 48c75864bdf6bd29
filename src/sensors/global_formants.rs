//! Global Formants Sensor — speaker-consistent resonance (defense).
//!
//! A single speaker's vocal tract length is fixed for the duration of an
//! utterance, so the utterance-wide spectral centroid and bandwidth should
//! vary only within a natural range. TTS voices stitched from multiple
//! source speakers, or post-processed with pitch/formant shifting, tend to
//! drift outside it.
//!
//! Unreliable once the channel is band-limited (the resonances this sensor
//! tracks live above 3.5kHz for some vowels), so narrowband profiles zero
//! its weight rather than trusting a degraded signal.

use crate::audio::{apply_hamming_window, calculate_rms, frame_audio, to_f64, validate_audio_input};
use crate::fft::{compute_fft, frequency_bins, magnitude_spectrum, spectral_bandwidth, spectral_centroid};
use crate::sensors::{Sensor, SensorCategory, SensorContext, SensorResult};

const DEFAULT_THRESHOLD: f64 = 0.6;
const FRAME_SIZE: usize = 400; // 25ms at 16kHz
const HOP_SIZE: usize = 160; // 10ms at 16kHz
const EXPECTED_CENTROID_STD_MIN_HZ: f64 = 50.0;
const EXPECTED_CENTROID_STD_MAX_HZ: f64 = 600.0;

pub struct GlobalFormantsSensor {
    pub threshold: f64,
    pub name: String,
}

impl GlobalFormantsSensor {
    pub fn new(threshold: Option<f64>) -> Self {
        Self {
            threshold: threshold.unwrap_or(DEFAULT_THRESHOLD).clamp(0.0, 1.0),
            name: "GlobalFormantsSensor".to_string(),
        }
    }

    fn frame_features(&self, audio: &[f64], sample_rate: u32) -> Vec<(f64, f64)> {
        let frame_size = (sample_rate as usize * FRAME_SIZE) / 16000;
        let hop_size = (sample_rate as usize * HOP_SIZE) / 16000;
        let frames = frame_audio(audio, frame_size.max(1), hop_size.max(1));

        let mut features = Vec::with_capacity(frames.len());
        for frame in &frames {
            let windowed = apply_hamming_window(frame);
            if calculate_rms(&windowed) < 1e-6 {
                continue;
            }
            if let Ok(fft_result) = compute_fft(&windowed) {
                let magnitudes = magnitude_spectrum(&fft_result);
                let freqs = frequency_bins(windowed.len(), sample_rate);
                let centroid = spectral_centroid(&magnitudes, &freqs);
                let bandwidth = spectral_bandwidth(&magnitudes, &freqs, centroid);
                features.push((centroid, bandwidth));
            }
        }
        features
    }
}

impl Sensor for GlobalFormantsSensor {
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

        let features = self.frame_features(&audio64, sample_rate);
        if features.len() < 3 {
            return SensorResult::abstain(self.name(), self.category(), self.threshold, "insufficient_voiced_frames");
        }

        let centroids: Vec<f64> = features.iter().map(|f| f.0).collect();
        let mean = centroids.iter().sum::<f64>() / centroids.len() as f64;
        let variance = centroids.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (centroids.len() - 1).max(1) as f64;
        let std_dev = variance.sqrt();

        let trust = if std_dev < EXPECTED_CENTROID_STD_MIN_HZ {
            (std_dev / EXPECTED_CENTROID_STD_MIN_HZ).clamp(0.0, 1.0)
        } else if std_dev > EXPECTED_CENTROID_STD_MAX_HZ {
            (EXPECTED_CENTROID_STD_MAX_HZ / std_dev).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let passed = trust >= self.threshold;

        let detail = format!("utterance-wide centroid std {:.1} Hz", std_dev);
        SensorResult::new(self.name(), self.category(), Some(passed), trust, std_dev, self.threshold).with_detail(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::concat;
    use crate::testutil::sine_tone;

    #[test]
    fn test_varied_tones_plausible_trust() {
        let sensor = GlobalFormantsSensor::new(None);
        let audio = concat(&[
            sine_tone(180.0, 16000, 0.3),
            sine_tone(420.0, 16000, 0.3),
            sine_tone(260.0, 16000, 0.3),
        ]);
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.score >= 0.0 && result.score <= 1.0);
    }

    #[test]
    fn test_abstains_on_silence() {
        let sensor = GlobalFormantsSensor::new(None);
        let audio = vec![0.0f32; 16000];
        let result = sensor.analyze(&audio, 16000, &SensorContext::default());
        assert!(result.is_abstention());
    }
}
