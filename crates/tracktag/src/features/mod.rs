//! Feature extraction: chunk -> model input tensor
//!
//! Both pipelines start from the same log-mel spectrogram; they diverge in
//! the final representation:
//!
//! - Genre: rasterized to a fixed-size RGB grid ([`raster`]), shape
//!   `[image_size, image_size, 3]`.
//! - Mood: the dB matrix itself with a trailing singleton channel axis,
//!   shape `[n_mels, n_frames, 1]`.
//!
//! Shapes are invariant across chunks of one pipeline configuration; the
//! model adapter relies on this for batching.

pub mod mel;
pub mod raster;

use ndarray::{Array3, Axis};

use crate::config::{GenreConfig, MoodConfig};
use crate::error::Result;

pub use mel::{mel_spectrogram, power_to_db};
pub use raster::{ensure_rgb, rasterize};

/// Build the genre model input for one chunk
pub fn genre_feature(chunk: &[f32], cfg: &GenreConfig) -> Result<Array3<f32>> {
    let mel = mel_spectrogram(
        chunk,
        cfg.sample_rate,
        cfg.n_fft,
        cfg.hop_length,
        cfg.n_mels,
    )?;
    let db = power_to_db(&mel);
    Ok(rasterize(&db, cfg.image_size))
}

/// Build the mood model input for one chunk
pub fn mood_feature(chunk: &[f32], cfg: &MoodConfig) -> Result<Array3<f32>> {
    let mel = mel_spectrogram(
        chunk,
        cfg.sample_rate,
        cfg.n_fft,
        cfg.hop_length,
        cfg.n_mels,
    )?;
    let db = power_to_db(&mel);
    Ok(db.insert_axis(Axis(2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, secs: f32, sr: f32) -> Vec<f32> {
        (0..(sr * secs) as usize)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sr).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_genre_feature_shape() {
        let cfg = GenreConfig {
            chunk_secs: 2.0,
            overlap_secs: 1.0,
            image_size: 64,
            ..GenreConfig::default()
        };
        let chunk = sine(440.0, 2.0, cfg.sample_rate as f32);
        let feature = genre_feature(&chunk, &cfg).unwrap();
        assert_eq!(feature.shape(), &[64, 64, 3]);
    }

    #[test]
    fn test_mood_feature_has_trailing_channel_axis() {
        let cfg = MoodConfig {
            segment_secs: 1.0,
            ..MoodConfig::default()
        };
        let chunk = sine(440.0, 1.0, cfg.sample_rate as f32);
        let feature = mood_feature(&chunk, &cfg).unwrap();
        let expected_frames = (chunk.len() - cfg.n_fft) / cfg.hop_length + 1;
        assert_eq!(feature.shape(), &[cfg.n_mels, expected_frames, 1]);
    }

    #[test]
    fn test_feature_shape_invariant_across_chunks() {
        let cfg = MoodConfig {
            segment_secs: 1.0,
            ..MoodConfig::default()
        };
        let a = sine(220.0, 1.0, cfg.sample_rate as f32);
        let b = sine(3000.0, 1.0, cfg.sample_rate as f32);
        assert_eq!(
            mood_feature(&a, &cfg).unwrap().shape(),
            mood_feature(&b, &cfg).unwrap().shape()
        );
    }

    #[test]
    fn test_empty_chunk_is_recoverable_failure() {
        let cfg = GenreConfig::default();
        let err = genre_feature(&[], &cfg).unwrap_err();
        assert!(err.is_recoverable());
    }
}
