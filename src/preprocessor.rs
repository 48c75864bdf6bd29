//! Audio preprocessor (§4.1): converts arbitrary input into the canonical
//! mono, 16kHz, peak-normalized buffer, and exposes the bandwidth estimate
//! used for profile selection.

use crate::audio::to_f64;
use crate::errors::PipelineError;
use crate::sensors::bandwidth::BandwidthSensor;

pub const CANONICAL_SAMPLE_RATE: u32 = 16000;
const MIN_DURATION_S: f64 = 0.25;

pub struct PreparedAudio {
    pub samples: Vec<f32>,
    pub rolloff_hz: f64,
}

/// `raw` is interleaved PCM at `input_rate` with `channels` channels.
pub fn prepare(raw: &[f32], input_rate: u32, channels: u32) -> Result<PreparedAudio, PipelineError> {
    if raw.is_empty() {
        return Err(PipelineError::EmptyAudio);
    }
    if channels == 0 {
        return Err(PipelineError::InvalidChannelCount(channels));
    }
    if !(4000..=192000).contains(&input_rate) {
        return Err(PipelineError::SampleRateOutOfRange(input_rate));
    }
    for (i, &sample) in raw.iter().enumerate() {
        if !sample.is_finite() {
            return Err(PipelineError::NonFiniteSample(i));
        }
    }

    let mono = mix_to_mono(raw, channels as usize);
    let resampled = resample_linear(&mono, input_rate, CANONICAL_SAMPLE_RATE);
    let normalized = peak_normalize(&resampled);

    let duration_s = normalized.len() as f64 / CANONICAL_SAMPLE_RATE as f64;
    if duration_s < MIN_DURATION_S {
        return Err(PipelineError::AudioTooShort(duration_s));
    }

    let rolloff_hz = BandwidthSensor::rolloff_hz(&to_f64(&normalized), CANONICAL_SAMPLE_RATE);

    Ok(PreparedAudio { samples: normalized, rolloff_hz })
}

fn mix_to_mono(raw: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return raw.to_vec();
    }
    raw.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resample with a box-filter anti-alias pass when
/// downsampling. Not a true polyphase filter, but bounded-error and
/// alias-free above the new Nyquist for the test-grade signals this
/// pipeline analyzes.
fn resample_linear(audio: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || audio.is_empty() {
        return audio.to_vec();
    }

    let source = if to_rate < from_rate {
        let factor = (from_rate as f64 / to_rate as f64).round().max(1.0) as usize;
        anti_alias_box_filter(audio, factor)
    } else {
        audio.to_vec()
    };

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((source.len() as f64) / ratio).floor().max(0.0) as usize;

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let idx = src_pos.floor() as usize;
            let frac = src_pos - idx as f64;
            let a = source.get(idx).copied().unwrap_or(0.0);
            let b = source.get(idx + 1).copied().unwrap_or(a);
            a + (b - a) * frac as f32
        })
        .collect()
}

fn anti_alias_box_filter(audio: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 {
        return audio.to_vec();
    }
    let mut out = vec![0.0f32; audio.len()];
    let mut acc = 0.0f32;
    for i in 0..audio.len() {
        acc += audio[i];
        if i >= window {
            acc -= audio[i - window];
        }
        out[i] = acc / window.min(i + 1) as f32;
    }
    out
}

fn peak_normalize(audio: &[f32]) -> Vec<f32> {
    let peak = audio.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    if peak <= 1.0 {
        return audio.to_vec();
    }
    audio.iter().map(|&x| x / peak).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sine_tone;

    #[test]
    fn test_prepare_rejects_empty() {
        assert!(matches!(prepare(&[], 16000, 1), Err(PipelineError::EmptyAudio)));
    }

    #[test]
    fn test_prepare_rejects_zero_channels() {
        let audio = sine_tone(200.0, 16000, 1.0);
        assert!(matches!(prepare(&audio, 16000, 0), Err(PipelineError::InvalidChannelCount(0))));
    }

    #[test]
    fn test_prepare_rejects_too_short() {
        let audio = sine_tone(200.0, 16000, 0.1);
        assert!(matches!(prepare(&audio, 16000, 1), Err(PipelineError::AudioTooShort(_))));
    }

    #[test]
    fn test_prepare_rejects_non_finite() {
        let mut audio = sine_tone(200.0, 16000, 1.0);
        audio[10] = f32::NAN;
        assert!(matches!(prepare(&audio, 16000, 1), Err(PipelineError::NonFiniteSample(10))));
    }

    #[test]
    fn test_prepare_boundary_duration_accepted() {
        let audio = sine_tone(200.0, 16000, 0.25);
        assert!(prepare(&audio, 16000, 1).is_ok());
    }

    #[test]
    fn test_mono_mix_averages_channels() {
        let interleaved = vec![1.0f32, -1.0, 0.5, -0.5];
        let mono = mix_to_mono(&interleaved, 2);
        assert_eq!(mono, vec![0.0, 0.0]);
    }

    #[test]
    fn test_peak_normalize_only_when_over_range() {
        let audio = vec![0.5f32, -0.5];
        assert_eq!(peak_normalize(&audio), audio);

        let loud = vec![2.0f32, -1.0];
        let normalized = peak_normalize(&loud);
        assert!((normalized[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_resample_preserves_duration_roughly() {
        let audio = sine_tone(200.0, 8000, 1.0);
        let resampled = resample_linear(&audio, 8000, 16000);
        let ratio = resampled.len() as f64 / audio.len() as f64;
        assert!((ratio - 2.0).abs() < 0.01);
    }
}
