//! Temporal-consistency stage.
//!
//! Checks that the envelope autocorrelation decays the way continuous
//! phonation does, rather than showing the periodic self-similarity that
//! frame-synthesized audio sometimes introduces at its frame boundary.

use crate::audio::{frame_audio, to_f64, validate_audio_input};
use crate::stages::StageResult;

const FRAME_SIZE: usize = 160; // 10ms at 16kHz
const HOP_SIZE: usize = 160;

fn autocorr_at_lag(envelope: &[f64], lag: usize) -> f64 {
    if envelope.len() <= lag {
        return 0.0;
    }
    let n = envelope.len() - lag;
    let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
    let mut num = 0.0;
    let mut denom = 0.0;
    for i in 0..n {
        num += (envelope[i] - mean) * (envelope[i + lag] - mean);
    }
    for v in envelope {
        denom += (v - mean).powi(2);
    }
    if denom < 1e-12 {
        0.0
    } else {
        num / denom
    }
}

pub fn run(audio: &[f32], sample_rate: u32) -> StageResult {
    let audio64 = to_f64(audio);
    if validate_audio_input(&audio64, sample_rate).is_err() {
        return StageResult::failed();
    }

    let frame_size = (sample_rate as usize * FRAME_SIZE) / 16000;
    let hop_size = (sample_rate as usize * HOP_SIZE) / 16000;
    let frames = frame_audio(&audio64, frame_size.max(1), hop_size.max(1));
    if frames.len() < 8 {
        return StageResult::failed();
    }

    let envelope: Vec<f64> = frames
        .iter()
        .map(|f| (f.iter().map(|x| x * x).sum::<f64>() / f.len().max(1) as f64).sqrt())
        .collect();

    // A periodic artifact at a fixed short lag (roughly a typical vocoder
    // frame hop) shows up as an unexpectedly strong autocorrelation there.
    let lag = (envelope.len() / 8).max(1);
    let periodicity = autocorr_at_lag(&envelope, lag).abs();

    StageResult::ok(periodicity.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sine_tone;

    #[test]
    fn test_tone_produces_bounded_score() {
        let audio = sine_tone(200.0, 16000, 2.0);
        let result = run(&audio, 16000);
        assert!(result.success);
        assert!((0.0..=1.0).contains(&result.score.unwrap()));
    }

    #[test]
    fn test_too_short_fails() {
        let audio = sine_tone(200.0, 16000, 0.05);
        let result = run(&audio, 16000);
        assert!(!result.success);
    }
}
