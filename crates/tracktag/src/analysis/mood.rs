//! Mood regression pipeline
//!
//! Non-overlapping 5-second segments, single-channel log-mel features,
//! normalized model outputs mapped back onto the bounded valence/arousal
//! scale, then pooled into one (valence, arousal, confidence, category)
//! verdict.

use rayon::prelude::*;

use crate::config::MoodConfig;
use crate::decode::AudioSignal;
use crate::ensemble::{aggregate_regression, RegressionEnsemble};
use crate::error::{AnalysisError, Result};
use crate::features::mood_feature;
use crate::model::ModelAdapter;
use crate::segment::fixed_chunks;

/// Predict the mood of a whole track
pub fn predict_mood(
    signal: &AudioSignal,
    cfg: &MoodConfig,
    adapter: &dyn ModelAdapter,
) -> Result<RegressionEnsemble> {
    let resampled = signal.resampled(cfg.sample_rate);
    let chunks = fixed_chunks(&resampled.samples, cfg.window_samples())?;
    log::info!(
        "predict_mood: {} segments of {:.0}s",
        chunks.len(),
        cfg.segment_secs
    );

    let features: Vec<_> = chunks
        .par_iter()
        .map(|chunk| (chunk.start, mood_feature(chunk.samples, cfg)))
        .collect();

    let scale_span = cfg.scale_max - cfg.scale_min;
    let mut vectors = Vec::with_capacity(features.len());
    for (start, feature) in features {
        let feature = match feature {
            Ok(f) => f,
            Err(e) => {
                log::warn!(
                    "Segment at sample {}: feature extraction failed: {}",
                    start,
                    e
                );
                continue;
            }
        };

        let outputs = match adapter.infer(std::slice::from_ref(&feature)) {
            Ok(o) => o,
            Err(e) => {
                log::warn!("Segment at sample {}: inference failed: {}", start, e);
                continue;
            }
        };

        let Some(raw) = outputs.into_iter().next() else {
            log::warn!("Segment at sample {}: model returned no output", start);
            continue;
        };
        if raw.len() != 2 {
            return Err(AnalysisError::Inference(format!(
                "mood model returned {} values per segment, expected 2",
                raw.len()
            )));
        }

        // Model outputs are normalized to [0, 1]; map back onto the
        // configured scale before pooling.
        let scaled: Vec<f32> = raw.iter().map(|y| cfg.scale_min + y * scale_span).collect();
        log::debug!(
            "Segment at sample {}: valence={:.2} arousal={:.2}",
            start,
            scaled[0],
            scaled[1]
        );
        vectors.push(scaled);
    }

    let result = aggregate_regression(&vectors, cfg.threshold, cfg.margin)?;

    log::info!(
        "predict_mood: {} (valence={:.2}, arousal={:.2}, confidence={:.2})",
        result.category,
        result.valence,
        result.arousal,
        result.confidence
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Adapter that returns the same normalized (valence, arousal) pair
    /// for every segment
    struct ConstantAdapter(f32, f32);

    impl ModelAdapter for ConstantAdapter {
        fn infer(&self, batch: &[Array3<f32>]) -> Result<Vec<Vec<f32>>> {
            Ok(batch.iter().map(|_| vec![self.0, self.1]).collect())
        }
    }

    fn test_config() -> MoodConfig {
        MoodConfig {
            segment_secs: 1.0,
            ..MoodConfig::default()
        }
    }

    fn tone(secs: f32, sr: u32) -> AudioSignal {
        let samples = (0..(secs * sr as f32) as usize)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sr as f32).sin() * 0.3)
            .collect();
        AudioSignal::new(samples, sr)
    }

    #[test]
    fn test_identical_segments_full_confidence() {
        let cfg = test_config();
        let signal = tone(3.5, cfg.sample_rate);
        // 0.625 on [0,1] maps to 6.0 on the 1-9 scale
        let result = predict_mood(&signal, &cfg, &ConstantAdapter(0.625, 0.625)).unwrap();
        assert!((result.valence - 6.0).abs() < 1e-5);
        assert!((result.arousal - 6.0).abs() < 1e-5);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.category, "Happy / Excited");
    }

    #[test]
    fn test_low_valence_low_arousal_is_sad_calm() {
        let cfg = test_config();
        let signal = tone(2.0, cfg.sample_rate);
        // 0.25 maps to 3.0
        let result = predict_mood(&signal, &cfg, &ConstantAdapter(0.25, 0.25)).unwrap();
        assert_eq!(result.category, "Sad / Calm");
    }

    #[test]
    fn test_partial_trailing_segment_dropped() {
        let cfg = test_config();
        // 2.7 seconds -> exactly 2 full segments, the 0.7s tail is dropped
        let signal = tone(2.7, cfg.sample_rate);
        let resampled = signal.resampled(cfg.sample_rate);
        let chunks = fixed_chunks(&resampled.samples, cfg.window_samples()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(predict_mood(&signal, &cfg, &ConstantAdapter(0.5, 0.5)).is_ok());
    }

    #[test]
    fn test_track_shorter_than_segment_is_error() {
        let cfg = test_config();
        let signal = tone(0.4, cfg.sample_rate);
        let err = predict_mood(&signal, &cfg, &ConstantAdapter(0.5, 0.5)).unwrap_err();
        assert!(matches!(err, AnalysisError::TrackTooShort { .. }));
    }

    #[test]
    fn test_wrong_output_dimension_rejected() {
        struct ThreeDims;
        impl ModelAdapter for ThreeDims {
            fn infer(&self, batch: &[Array3<f32>]) -> Result<Vec<Vec<f32>>> {
                Ok(batch.iter().map(|_| vec![0.5, 0.5, 0.5]).collect())
            }
        }
        let cfg = test_config();
        let signal = tone(2.0, cfg.sample_rate);
        assert!(predict_mood(&signal, &cfg, &ThreeDims).is_err());
    }
}
