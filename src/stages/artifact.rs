//! Artifact stage — clipping and quantization-step detection.
//!
//! Looks for two concrete digital-processing fingerprints: samples pinned
//! at full scale (clipping from gain staging or a limiter) and a sample
//! alphabet far smaller than the buffer length (heavy quantization or a
//! low-bitrate codec round-trip).

use crate::audio::{to_f64, validate_audio_input};
use crate::stages::StageResult;

const CLIP_THRESHOLD: f64 = 0.999;

pub fn run(audio: &[f32], sample_rate: u32) -> StageResult {
    let audio64 = to_f64(audio);
    if validate_audio_input(&audio64, sample_rate).is_err() {
        return StageResult::failed();
    }

    let clipped = audio64.iter().filter(|&&x| x.abs() >= CLIP_THRESHOLD).count();
    let clip_ratio = clipped as f64 / audio64.len() as f64;

    let unique_levels: std::collections::HashSet<i64> = audio64.iter().map(|&x| (x * 32768.0).round() as i64).collect();
    let alphabet_ratio = unique_levels.len() as f64 / audio64.len() as f64;
    // A rich natural signal uses most of the available quantization steps;
    // heavy requantization collapses this ratio well below 1.
    let quantization_risk = if alphabet_ratio < 0.1 { 1.0 - alphabet_ratio * 10.0 } else { 0.0 };

    let risk = (clip_ratio * 5.0 + quantization_risk).clamp(0.0, 1.0);
    StageResult::ok(risk)
}
