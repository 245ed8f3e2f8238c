//! Log-mel spectrogram computation
//!
//! Frames a chunk with a Hann window, computes power spectra via realfft,
//! applies a triangular mel filterbank, and converts to a dB scale
//! referenced to the chunk's own maximum. Referencing to the per-chunk
//! max makes every chunk independently loudness-normalized, so ensemble
//! votes are comparable across quiet and loud passages.

use ndarray::Array2;
use realfft::RealFftPlanner;

use crate::error::{AnalysisError, Result};

/// Lower clip for dB conversion, relative to the reference maximum
const TOP_DB: f32 = 80.0;

/// Power floor to avoid log of zero
const AMIN: f32 = 1e-10;

/// Compute a power mel spectrogram of one chunk
///
/// Returns a `[n_mels, n_frames]` matrix of mel band energies. Frames
/// advance by `hop_length`; a chunk shorter than one FFT window or
/// containing non-finite samples is a per-chunk failure.
pub fn mel_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    n_fft: usize,
    hop_length: usize,
    n_mels: usize,
) -> Result<Array2<f32>> {
    if samples.is_empty() {
        return Err(AnalysisError::FeatureExtraction(
            "empty chunk".to_string(),
        ));
    }
    if samples.len() < n_fft {
        return Err(AnalysisError::FeatureExtraction(format!(
            "chunk too short for FFT window: {} < {}",
            samples.len(),
            n_fft
        )));
    }
    if samples.iter().any(|s| !s.is_finite()) {
        return Err(AnalysisError::FeatureExtraction(
            "chunk contains non-finite samples".to_string(),
        ));
    }

    let n_bins = n_fft / 2 + 1;
    let n_frames = (samples.len() - n_fft) / hop_length + 1;

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);

    let window = hann_window(n_fft);
    let filterbank = mel_filterbank(n_mels, n_fft, sample_rate as f32);

    let mut mel = Array2::<f32>::zeros((n_mels, n_frames));
    let mut frame_buf = vec![0.0f32; n_fft];
    let mut spectrum = fft.make_output_vec();
    let mut scratch = fft.make_scratch_vec();
    let mut power = vec![0.0f32; n_bins];

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_length;

        for i in 0..n_fft {
            frame_buf[i] = samples[start + i] * window[i];
        }

        fft.process_with_scratch(&mut frame_buf, &mut spectrum, &mut scratch)
            .map_err(|e| AnalysisError::FeatureExtraction(format!("FFT failed: {}", e)))?;

        for (bin, c) in spectrum.iter().enumerate() {
            power[bin] = c.norm_sqr();
        }

        for (band, filter) in filterbank.iter().enumerate() {
            let mut energy = 0.0f32;
            for (&coeff, &p) in filter.iter().zip(power.iter()) {
                energy += coeff * p;
            }
            mel[[band, frame_idx]] = energy;
        }
    }

    Ok(mel)
}

/// Convert a power mel spectrogram to dB, referenced to its own maximum
///
/// The loudest cell maps to 0 dB and everything else is negative, floored
/// at -[`TOP_DB`] dB.
pub fn power_to_db(power: &Array2<f32>) -> Array2<f32> {
    let reference = power.iter().copied().fold(AMIN, f32::max);
    let ref_db = 10.0 * reference.log10();

    power.mapv(|p| {
        let db = 10.0 * p.max(AMIN).log10() - ref_db;
        db.max(-TOP_DB)
    })
}

/// Generate a Hann window of given size
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Create mel filterbank matrix
///
/// Returns `n_mels` triangular filters, each with `n_fft/2 + 1` coefficients.
fn mel_filterbank(n_mels: usize, n_fft: usize, sample_rate: f32) -> Vec<Vec<f32>> {
    let n_bins = n_fft / 2 + 1;
    let f_max = sample_rate / 2.0;

    let mel_min = hz_to_mel(0.0);
    let mel_max = hz_to_mel(f_max);

    // Evenly-spaced points on the mel axis, including both edges
    let n_points = n_mels + 2;
    let mel_points: Vec<f32> = (0..n_points)
        .map(|i| mel_min + (mel_max - mel_min) * i as f32 / (n_points - 1) as f32)
        .collect();

    let hz_points: Vec<f32> = mel_points.iter().map(|&m| mel_to_hz(m)).collect();
    let bin_points: Vec<f32> = hz_points
        .iter()
        .map(|&hz| hz * n_fft as f32 / sample_rate)
        .collect();

    let mut filterbank = Vec::with_capacity(n_mels);
    for band in 0..n_mels {
        let mut filter = vec![0.0f32; n_bins];
        let left = bin_points[band];
        let center = bin_points[band + 1];
        let right = bin_points[band + 2];

        for bin in 0..n_bins {
            let bin_f = bin as f32;
            if bin_f >= left && bin_f <= center && (center - left) > 0.0 {
                filter[bin] = (bin_f - left) / (center - left);
            } else if bin_f > center && bin_f <= right && (right - center) > 0.0 {
                filter[bin] = (right - bin_f) / (right - center);
            }
        }
        filterbank.push(filter);
    }

    filterbank
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}
