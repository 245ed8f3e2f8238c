//! Genre classification pipeline
//!
//! Overlapping 30-second chunks, rasterized log-mel features, one model
//! call per chunk, three-policy ensemble fusion. A chunk that fails
//! featurization or inference is dropped and the run continues; only an
//! empty ensemble is fatal.

use rayon::prelude::*;

use crate::config::GenreConfig;
use crate::decode::AudioSignal;
use crate::ensemble::{aggregate_classification, ChunkPrediction, ClassificationEnsemble};
use crate::error::{AnalysisError, Result};
use crate::features::genre_feature;
use crate::model::ModelAdapter;
use crate::segment::overlapping_chunks;

/// Classify the genre of a whole track
pub fn classify_genre(
    signal: &AudioSignal,
    cfg: &GenreConfig,
    adapter: &dyn ModelAdapter,
) -> Result<ClassificationEnsemble> {
    let resampled = signal.resampled(cfg.sample_rate);
    let window = cfg.window_samples();

    let chunks = overlapping_chunks(&resampled.samples, window, cfg.overlap_samples())?;
    if chunks.is_empty() {
        return Err(AnalysisError::TrackTooShort {
            samples: resampled.samples.len(),
            window,
        });
    }
    log::info!(
        "classify_genre: {} chunks of {:.0}s ({}s overlap)",
        chunks.len(),
        cfg.chunk_secs,
        cfg.overlap_secs
    );

    // Featurization is independent per chunk; inference stays sequential
    // so a single bad chunk only costs itself.
    let features: Vec<_> = chunks
        .par_iter()
        .map(|chunk| (chunk.start, genre_feature(chunk.samples, cfg)))
        .collect();

    let mut predictions = Vec::with_capacity(features.len());
    for (start, feature) in features {
        let feature = match feature {
            Ok(f) => f,
            Err(e) => {
                log::warn!("Chunk at sample {}: feature extraction failed: {}", start, e);
                continue;
            }
        };

        let outputs = match adapter.infer(std::slice::from_ref(&feature)) {
            Ok(o) => o,
            Err(e) => {
                log::warn!("Chunk at sample {}: inference failed: {}", start, e);
                continue;
            }
        };

        let Some(probabilities) = outputs.into_iter().next() else {
            log::warn!("Chunk at sample {}: model returned no output", start);
            continue;
        };

        match ChunkPrediction::from_probabilities(probabilities) {
            Ok(pred) => {
                log::debug!(
                    "Chunk at sample {}: {} ({:.3})",
                    start,
                    cfg.labels
                        .get(pred.label_index)
                        .map(String::as_str)
                        .unwrap_or("?"),
                    pred.top_probability
                );
                predictions.push(pred);
            }
            Err(e) => log::warn!("Chunk at sample {}: {}", start, e),
        }
    }

    let result = aggregate_classification(&predictions, &cfg.labels)?;

    log::info!(
        "classify_genre: majority={} ({}/{}), weighted={}, average={} ({:.3})",
        result.majority_label,
        result.majority_count,
        result.chunk_votes.len(),
        result.weighted_label,
        result.average_label,
        result.average_confidence
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Adapter that votes a fixed sequence of probability vectors
    struct ScriptedAdapter {
        outputs: Vec<Vec<f32>>,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl ScriptedAdapter {
        fn new(outputs: Vec<Vec<f32>>) -> Self {
            Self {
                outputs,
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }
    }

    impl ModelAdapter for ScriptedAdapter {
        fn infer(&self, batch: &[Array3<f32>]) -> Result<Vec<Vec<f32>>> {
            let i = self
                .calls
                .fetch_add(batch.len(), std::sync::atomic::Ordering::SeqCst);
            Ok((0..batch.len())
                .map(|k| self.outputs[(i + k) % self.outputs.len()].clone())
                .collect())
        }
    }

    /// Adapter that always fails
    struct BrokenAdapter;

    impl ModelAdapter for BrokenAdapter {
        fn infer(&self, _batch: &[Array3<f32>]) -> Result<Vec<Vec<f32>>> {
            Err(AnalysisError::Inference("scripted failure".to_string()))
        }
    }

    fn test_config() -> GenreConfig {
        GenreConfig {
            chunk_secs: 1.0,
            overlap_secs: 0.5,
            image_size: 32,
            labels: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..GenreConfig::default()
        }
    }

    fn tone(secs: f32, sr: u32) -> AudioSignal {
        let samples = (0..(secs * sr as f32) as usize)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr as f32).sin() * 0.3)
            .collect();
        AudioSignal::new(samples, sr)
    }

    #[test]
    fn test_classify_genre_end_to_end() {
        let cfg = test_config();
        let signal = tone(3.0, cfg.sample_rate);
        let adapter = ScriptedAdapter::new(vec![vec![0.1, 0.8, 0.1]]);

        let result = classify_genre(&signal, &cfg, &adapter).unwrap();
        assert_eq!(result.average_label, "b");
        assert_eq!(result.majority_label, "b");
        assert_eq!(result.weighted_label, "b");
        assert!((result.average_confidence - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_track_shorter_than_window_is_fatal() {
        let cfg = test_config();
        let signal = tone(0.5, cfg.sample_rate);
        let err = classify_genre(&signal, &cfg, &ScriptedAdapter::new(vec![vec![1.0, 0.0, 0.0]]))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TrackTooShort { .. }));
    }

    #[test]
    fn test_all_chunks_failing_inference_is_no_valid_chunks() {
        let cfg = test_config();
        let signal = tone(3.0, cfg.sample_rate);
        let err = classify_genre(&signal, &cfg, &BrokenAdapter).unwrap_err();
        assert!(matches!(err, AnalysisError::NoValidChunks));
    }

    #[test]
    fn test_signal_resampled_to_model_rate() {
        let cfg = test_config();
        // 44.1kHz input must be resampled down, not mis-windowed
        let signal = tone(3.0, 44100);
        let adapter = ScriptedAdapter::new(vec![vec![0.6, 0.2, 0.2]]);
        let result = classify_genre(&signal, &cfg, &adapter).unwrap();
        assert_eq!(result.average_label, "a");
    }
}
