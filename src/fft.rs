//! FFT operations with bounds checking
//!
//! Provides safe FFT operations for spectral analysis.

use crate::errors::{SensorFault, SensorResultType};
use rustfft::{num_complex::Complex, FftPlanner};

/// Compute FFT of real-valued audio data
///
/// # Arguments
/// * `audio` - Audio samples as f64 slice
///
/// # Returns
/// Complex FFT result
///
/// # Security
/// - Validates input is non-empty
/// - Uses bounds-checked operations
pub fn compute_fft(audio: &[f64]) -> SensorResultType<Vec<Complex<f64>>> {
    if audio.is_empty() {
        return Err(SensorFault::invalid_input("Cannot compute FFT of empty data"));
    }

    let n = audio.len();

    // Convert to complex
    let mut buffer: Vec<Complex<f64>> = audio.iter().map(|&x| Complex::new(x, 0.0)).collect();

    // Create FFT planner and perform FFT
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    fft.process(&mut buffer);

    Ok(buffer)
}

/// Compute magnitude spectrum from FFT result
///
/// # Arguments
/// * `fft_result` - Complex FFT output
///
/// # Returns
/// Magnitude spectrum (positive frequencies only)
///
/// # Security
/// - Returns only positive frequency bins (N/2 + 1)
pub fn magnitude_spectrum(fft_result: &[Complex<f64>]) -> Vec<f64> {
    if fft_result.is_empty() {
        return Vec::new();
    }

    // Only positive frequencies (N/2 + 1 bins)
    let n_positive = fft_result.len() / 2 + 1;

    fft_result
        .iter()
        .take(n_positive)
        .map(|c| c.norm())
        .collect()
}

/// Compute power spectrum from FFT result
///
/// # Arguments
/// * `fft_result` - Complex FFT output
///
/// # Returns
/// Power spectrum (magnitude squared)
pub fn power_spectrum(fft_result: &[Complex<f64>]) -> Vec<f64> {
    if fft_result.is_empty() {
        return Vec::new();
    }

    let n_positive = fft_result.len() / 2 + 1;

    fft_result
        .iter()
        .take(n_positive)
        .map(|c| c.norm_sqr())
        .collect()
}

/// Compute frequency bins for FFT result
///
/// # Arguments
/// * `n_samples` - Number of samples in original audio
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// Vector of frequency values in Hz
pub fn frequency_bins(n_samples: usize, sample_rate: u32) -> Vec<f64> {
    if n_samples == 0 {
        return Vec::new();
    }

    let n_positive = n_samples / 2 + 1;
    let freq_resolution = sample_rate as f64 / n_samples as f64;

    (0..n_positive)
        .map(|i| i as f64 * freq_resolution)
        .collect()
}

/// Find spectral centroid (center of mass of spectrum)
///
/// # Arguments
/// * `magnitudes` - Magnitude spectrum
/// * `frequencies` - Corresponding frequency bins
///
/// # Returns
/// Spectral centroid in Hz
pub fn spectral_centroid(magnitudes: &[f64], frequencies: &[f64]) -> f64 {
    if magnitudes.is_empty() || frequencies.is_empty() {
        return 0.0;
    }

    let min_len = magnitudes.len().min(frequencies.len());

    let weighted_sum: f64 = magnitudes
        .iter()
        .take(min_len)
        .zip(frequencies.iter())
        .map(|(&m, &f)| m * f)
        .sum();

    let total_magnitude: f64 = magnitudes.iter().take(min_len).sum();

    if total_magnitude < f64::EPSILON {
        return 0.0;
    }

    weighted_sum / total_magnitude
}

/// Find spectral bandwidth (spread of spectrum around centroid)
///
/// # Arguments
/// * `magnitudes` - Magnitude spectrum
/// * `frequencies` - Corresponding frequency bins
/// * `centroid` - Spectral centroid
///
/// # Returns
/// Spectral bandwidth in Hz
pub fn spectral_bandwidth(magnitudes: &[f64], frequencies: &[f64], centroid: f64) -> f64 {
    if magnitudes.is_empty() || frequencies.is_empty() {
        return 0.0;
    }

    let min_len = magnitudes.len().min(frequencies.len());

    let weighted_variance: f64 = magnitudes
        .iter()
        .take(min_len)
        .zip(frequencies.iter())
        .map(|(&m, &f)| m * (f - centroid).powi(2))
        .sum();

    let total_magnitude: f64 = magnitudes.iter().take(min_len).sum();

    if total_magnitude < f64::EPSILON {
        return 0.0;
    }

    (weighted_variance / total_magnitude).sqrt()
}

/// Hamming window, shared with the framing helpers in [`crate::audio`].
fn hamming(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let n_f64 = n as f64;
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / (n_f64 - 1.0).max(1.0)).cos())
        .collect()
}

/// Welch periodogram: average power spectrum over overlapping, windowed
/// frames. Used by the preprocessor to estimate spectral roll-off (§4.1)
/// more robustly than a single FFT over the whole buffer.
///
/// Frames shorter than `frame_len` are dropped. Returns `(power, freqs)`
/// where both are `frame_len / 2 + 1` long.
pub fn welch_periodogram(audio: &[f64], sample_rate: u32, frame_len: usize) -> (Vec<f64>, Vec<f64>) {
    if audio.is_empty() || frame_len == 0 {
        return (Vec::new(), Vec::new());
    }

    let hop = (frame_len / 2).max(1);
    let window = hamming(frame_len);
    let n_positive = frame_len / 2 + 1;
    let mut accum = vec![0.0f64; n_positive];
    let mut n_frames = 0usize;

    let mut start = 0;
    while start + frame_len <= audio.len() {
        let windowed: Vec<f64> = audio[start..start + frame_len]
            .iter()
            .zip(window.iter())
            .map(|(&x, &w)| x * w)
            .collect();

        if let Ok(fft_result) = compute_fft(&windowed) {
            let power = power_spectrum(&fft_result);
            for (a, p) in accum.iter_mut().zip(power.iter()) {
                *a += p;
            }
            n_frames += 1;
        }
        start += hop;
    }

    if n_frames == 0 {
        return (Vec::new(), Vec::new());
    }

    for a in accum.iter_mut() {
        *a /= n_frames as f64;
    }

    let freqs = frequency_bins(frame_len, sample_rate);
    (accum, freqs)
}

/// Frequency below which `fraction` of total spectral energy lies.
///
/// Operates on a power spectrum produced by [`welch_periodogram`]. Returns
/// Nyquist if the spectrum is empty or carries no energy.
pub fn spectral_rolloff_hz(power: &[f64], freqs: &[f64], fraction: f64, nyquist_hz: f64) -> f64 {
    if power.is_empty() || freqs.is_empty() {
        return nyquist_hz;
    }

    let total: f64 = power.iter().sum();
    if total < f64::EPSILON {
        return nyquist_hz;
    }

    let target = total * fraction.clamp(0.0, 1.0);
    let mut cumulative = 0.0;
    for (i, &p) in power.iter().enumerate() {
        cumulative += p;
        if cumulative >= target {
            return freqs.get(i).copied().unwrap_or(nyquist_hz);
        }
    }
    nyquist_hz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welch_periodogram_tone() {
        let sr = 16000u32;
        let n = sr as usize * 2;
        // 1 kHz tone should put most energy well below Nyquist (8 kHz).
        let audio: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / sr as f64).sin())
            .collect();

        let (power, freqs) = welch_periodogram(&audio, sr, 2048);
        assert!(!power.is_empty());
        let rolloff = spectral_rolloff_hz(&power, &freqs, 0.95, sr as f64 / 2.0);
        assert!(rolloff < 4000.0, "rolloff={rolloff} should be well below Nyquist for a 1kHz tone");
    }

    #[test]
    fn test_spectral_rolloff_hz_empty() {
        let rolloff = spectral_rolloff_hz(&[], &[], 0.95, 8000.0);
        assert!((rolloff - 8000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compute_fft() {
        // Simple sine wave
        let n = 64;
        let audio: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 4.0 * i as f64 / n as f64).sin())
            .collect();

        let result = compute_fft(&audio).unwrap();
        assert_eq!(result.len(), n);
    }

    #[test]
    fn test_compute_fft_empty() {
        let audio: Vec<f64> = vec![];
        assert!(compute_fft(&audio).is_err());
    }

    #[test]
    fn test_magnitude_spectrum() {
        let fft_result = vec![
            Complex::new(1.0, 0.0),
            Complex::new(0.0, 1.0),
            Complex::new(0.5, 0.5),
            Complex::new(0.0, 0.0),
        ];

        let mags = magnitude_spectrum(&fft_result);
        assert_eq!(mags.len(), 3); // N/2 + 1

        assert!((mags[0] - 1.0).abs() < 1e-10);
        assert!((mags[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_frequency_bins() {
        let bins = frequency_bins(100, 10000);
        assert_eq!(bins.len(), 51); // N/2 + 1
        assert!((bins[0] - 0.0).abs() < f64::EPSILON);
        assert!((bins[1] - 100.0).abs() < f64::EPSILON); // 10000/100 = 100 Hz resolution
    }

    #[test]
    fn test_spectral_centroid() {
        let magnitudes = vec![0.0, 1.0, 0.0, 0.0];
        let frequencies = vec![0.0, 100.0, 200.0, 300.0];

        let centroid = spectral_centroid(&magnitudes, &frequencies);
        assert!((centroid - 100.0).abs() < f64::EPSILON);
    }

}
