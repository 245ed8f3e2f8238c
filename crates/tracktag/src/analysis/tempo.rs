//! Tempo estimation
//!
//! Spectral-flux onset envelope over a log-mel spectrogram, then
//! autocorrelation over the lag range implied by the configured BPM
//! bounds. Candidate lags are weighted by a log-normal prior centered at
//! 120 BPM so octave-related peaks resolve toward common musical tempi.

use crate::config::TempoConfig;
use crate::decode::AudioSignal;
use crate::error::{AnalysisError, Result};
use crate::features::mel::{mel_spectrogram, power_to_db};

/// Fixed analysis parameters for the onset envelope
const TEMPO_SAMPLE_RATE: u32 = 22050;
const TEMPO_N_FFT: usize = 2048;
const TEMPO_HOP: usize = 512;
const TEMPO_N_MELS: usize = 128;

/// Center of the tempo prior in BPM
const PRIOR_CENTER_BPM: f32 = 120.0;

/// Width of the tempo prior in octaves
const PRIOR_OCTAVE_STD: f32 = 1.0;

/// Estimate the dominant tempo of a track in BPM
pub fn estimate_bpm(signal: &AudioSignal, cfg: &TempoConfig) -> Result<f32> {
    let resampled = signal.resampled(TEMPO_SAMPLE_RATE);
    let envelope = onset_envelope(&resampled.samples)?;

    let frame_rate = TEMPO_SAMPLE_RATE as f32 / TEMPO_HOP as f32;

    // BPM bounds translate inversely to a lag range in frames
    let lag_min = ((60.0 * frame_rate / cfg.max_bpm).ceil() as usize).max(1);
    let lag_max = (60.0 * frame_rate / cfg.min_bpm).ceil() as usize;

    if envelope.len() <= lag_max * 2 {
        return Err(AnalysisError::FeatureExtraction(format!(
            "track too short for tempo estimation: {} onset frames, need more than {}",
            envelope.len(),
            lag_max * 2
        )));
    }

    // Mean-centered autocorrelation keeps a flat envelope from dominating
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let centered: Vec<f32> = envelope.iter().map(|&x| x - mean).collect();

    let energy: f32 = centered.iter().map(|x| x * x).sum();
    if energy <= f32::EPSILON {
        return Err(AnalysisError::FeatureExtraction(
            "onset envelope carries no periodicity".to_string(),
        ));
    }

    let mut best_lag = lag_min;
    let mut best_score = f32::MIN;
    for lag in lag_min..=lag_max {
        let mut acf = 0.0f32;
        for t in 0..(centered.len() - lag) {
            acf += centered[t] * centered[t + lag];
        }
        let acf = acf / energy;

        let bpm = 60.0 * frame_rate / lag as f32;
        let score = acf * tempo_prior(bpm);
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }

    let bpm = 60.0 * frame_rate / best_lag as f32;
    log::info!(
        "estimate_bpm: {:.1} BPM (lag {} frames, score {:.4})",
        bpm,
        best_lag,
        best_score
    );

    Ok(bpm)
}

/// Rectified spectral-flux onset strength per frame
fn onset_envelope(samples: &[f32]) -> Result<Vec<f32>> {
    let mel = mel_spectrogram(samples, TEMPO_SAMPLE_RATE, TEMPO_N_FFT, TEMPO_HOP, TEMPO_N_MELS)?;
    let db = power_to_db(&mel);

    let (n_mels, n_frames) = (db.shape()[0], db.shape()[1]);
    if n_frames < 2 {
        return Err(AnalysisError::FeatureExtraction(
            "not enough frames for an onset envelope".to_string(),
        ));
    }

    let mut envelope = Vec::with_capacity(n_frames - 1);
    for t in 1..n_frames {
        let mut flux = 0.0f32;
        for band in 0..n_mels {
            flux += (db[[band, t]] - db[[band, t - 1]]).max(0.0);
        }
        envelope.push(flux / n_mels as f32);
    }

    Ok(envelope)
}

/// Log-normal weight over BPM candidates
fn tempo_prior(bpm: f32) -> f32 {
    let octaves = (bpm / PRIOR_CENTER_BPM).log2() / PRIOR_OCTAVE_STD;
    (-0.5 * octaves * octaves).exp()
}
