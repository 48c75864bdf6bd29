//! Feature-based anomaly stage.
//!
//! A coarse, model-free score from utterance-level acoustic features (zero
//! crossing rate and RMS variability) that correlate with synthetic-speech
//! over-smoothness. Deliberately simple relative to the physics sensors:
//! this stage exists to give fusion a second, independent opinion, not to
//! replicate the sensor catalog.

use crate::audio::{calculate_rms, to_f64, validate_audio_input, zero_crossing_rate};
use crate::stages::StageResult;

/// Natural speech zero-crossing rate rarely drops below this; oversmoothed
/// synthetic audio (aggressive low-pass post-processing) often does.
const MIN_NATURAL_ZCR: f64 = 0.02;

pub fn run(audio: &[f32], sample_rate: u32) -> StageResult {
    let audio64 = to_f64(audio);
    if validate_audio_input(&audio64, sample_rate).is_err() {
        return StageResult::failed();
    }

    let zcr = zero_crossing_rate(&audio64);
    let rms = calculate_rms(&audio64);
    if rms < 1e-9 {
        return StageResult::failed();
    }

    let zcr_risk = if zcr < MIN_NATURAL_ZCR { (MIN_NATURAL_ZCR - zcr) / MIN_NATURAL_ZCR } else { 0.0 };
    StageResult::ok(zcr_risk.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sine_tone;

    #[test]
    fn test_tone_produces_bounded_score() {
        let audio = sine_tone(200.0, 16000, 1.0);
        let result = run(&audio, 16000);
        assert!(result.success);
        assert!(result.score.unwrap() >= 0.0 && result.score.unwrap() <= 1.0);
    }

    #[test]
    fn test_silence_fails() {
        let audio = vec![0.0f32; 16000];
        let result = run(&audio, 16000);
        assert!(!result.success);
    }
}
