//! Synthetic-signal generators shared by sensor and fusion tests.
//!
//! Kept test-only so the library never ships fixture audio.

pub fn sine_tone(freq_hz: f64, sample_rate: u32, duration_s: f64) -> Vec<f32> {
    let n = (sample_rate as f64 * duration_s) as usize;
    (0..n)
        .map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / sample_rate as f64).sin() as f32)
        .collect()
}

pub fn silence(sample_rate: u32, duration_s: f64) -> Vec<f32> {
    vec![0.0; (sample_rate as f64 * duration_s) as usize]
}

/// Band-limited white noise via repeated box-filtering, cheap substitute for
/// a real low-pass when tests only need a rough spectral shape.
pub fn band_limited_noise(sample_rate: u32, duration_s: f64, cutoff_hz: f64, seed: u64) -> Vec<f32> {
    let n = (sample_rate as f64 * duration_s) as usize;
    let mut state = seed.max(1);
    let mut raw: Vec<f32> = (0..n)
        .map(|_| {
            // xorshift64, deterministic and dependency-free for test fixtures
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ((state % 2000) as f32 / 1000.0) - 1.0
        })
        .collect();

    let smoothing = ((sample_rate as f64 / cutoff_hz.max(1.0)) as usize).max(1);
    for _ in 0..3 {
        raw = box_filter(&raw, smoothing);
    }
    raw
}

fn box_filter(x: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 || x.is_empty() {
        return x.to_vec();
    }
    let mut out = vec![0.0f32; x.len()];
    let mut acc = 0.0f32;
    for i in 0..x.len() {
        acc += x[i];
        if i >= window {
            acc -= x[i - window];
        }
        out[i] = acc / window.min(i + 1) as f32;
    }
    out
}

pub fn concat(parts: &[Vec<f32>]) -> Vec<f32> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}
