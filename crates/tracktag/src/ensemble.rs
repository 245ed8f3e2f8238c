//! Ensemble aggregation
//!
//! Fuses per-chunk model outputs into one track-level verdict.
//!
//! Classification runs three fusion policies over the same valid-chunk
//! set — majority vote, confidence-weighted vote, and probability
//! averaging — and surfaces all three so a caller can recompute any of
//! them from the recorded per-chunk data. The probability average is
//! authoritative for the returned result.
//!
//! Regression pools per-chunk (valence, arousal) vectors into means, maps
//! the spread to a confidence score, and derives a categorical mood label
//! from a fixed-threshold quadrant rule.
//!
//! All policies are defined over the unordered multiset of chunk outputs;
//! chunk order only matters for deterministic tie-breaking, which always
//! resolves to the first label in canonical order.

use crate::error::{AnalysisError, Result};

/// Spread normalizer for regression confidence: the maximal expected
/// per-dimension standard deviation on the 1-9 scale. A fixed design
/// constant, not a computed bound; changing it breaks numeric
/// compatibility with previously reported confidences.
const MAX_EXPECTED_STD: f32 = 4.0;

/// Model output for one chunk of a classification run
#[derive(Debug, Clone)]
pub struct ChunkPrediction {
    /// Index of the winning label in canonical order
    pub label_index: usize,
    /// Probability assigned to the winning label
    pub top_probability: f32,
    /// Full probability vector over the label set
    pub probabilities: Vec<f32>,
}

impl ChunkPrediction {
    /// Build a prediction from a raw probability vector
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self> {
        if probabilities.is_empty() {
            return Err(AnalysisError::Inference(
                "empty probability vector".to_string(),
            ));
        }
        let label_index = argmax(&probabilities);
        let top_probability = probabilities[label_index];
        Ok(Self {
            label_index,
            top_probability,
            probabilities,
        })
    }
}

/// Aggregate over all valid chunks of one classification run
#[derive(Debug, Clone)]
pub struct ClassificationEnsemble {
    /// Majority-vote winner
    pub majority_label: String,
    /// Number of chunks that voted for the majority winner
    pub majority_count: usize,
    /// Confidence-weighted-vote winner
    pub weighted_label: String,
    /// Probability-average winner (authoritative for the final result)
    pub average_label: String,
    /// Mean probability of the average winner
    pub average_confidence: f32,
    /// Element-wise mean of all chunk probability vectors
    pub mean_probabilities: Vec<f32>,
    /// Per-chunk (label, top-probability) diagnostics, in chunk order
    pub chunk_votes: Vec<(String, f32)>,
}

/// Fuse per-chunk classification outputs into one ensemble verdict
///
/// Failed chunks must already be excluded; an empty list is the
/// "no valid chunks" condition. Ties in every policy break to the first
/// label in canonical order.
pub fn aggregate_classification(
    predictions: &[ChunkPrediction],
    labels: &[String],
) -> Result<ClassificationEnsemble> {
    if predictions.is_empty() {
        return Err(AnalysisError::NoValidChunks);
    }
    for pred in predictions {
        if pred.probabilities.len() != labels.len() {
            return Err(AnalysisError::InvalidConfig(format!(
                "probability vector length {} does not match label set size {}",
                pred.probabilities.len(),
                labels.len()
            )));
        }
    }

    // Policy 1: majority vote
    let mut counts = vec![0usize; labels.len()];
    for pred in predictions {
        counts[pred.label_index] += 1;
    }
    let majority_index = argmax_usize(&counts);

    // Policy 2: confidence-weighted vote
    let mut weighted = vec![0.0f32; labels.len()];
    for pred in predictions {
        weighted[pred.label_index] += pred.top_probability;
    }
    let weighted_index = argmax(&weighted);

    // Policy 3: probability averaging (authoritative)
    let mut mean_probabilities = vec![0.0f32; labels.len()];
    for pred in predictions {
        for (sum, &p) in mean_probabilities.iter_mut().zip(&pred.probabilities) {
            *sum += p;
        }
    }
    let n = predictions.len() as f32;
    for p in &mut mean_probabilities {
        *p /= n;
    }
    let average_index = argmax(&mean_probabilities);

    let chunk_votes = predictions
        .iter()
        .map(|p| (labels[p.label_index].clone(), p.top_probability))
        .collect();

    Ok(ClassificationEnsemble {
        majority_label: labels[majority_index].clone(),
        majority_count: counts[majority_index],
        weighted_label: labels[weighted_index].clone(),
        average_label: labels[average_index].clone(),
        average_confidence: mean_probabilities[average_index],
        mean_probabilities,
        chunk_votes,
    })
}

/// Aggregate over all chunks of one regression run
#[derive(Debug, Clone)]
pub struct RegressionEnsemble {
    /// Mean valence across chunks (1-9 scale)
    pub valence: f32,
    /// Mean arousal across chunks (1-9 scale)
    pub arousal: f32,
    /// Ensemble confidence derived from per-dimension spread, in [0, 1]
    pub confidence: f32,
    /// Categorical mood from the quadrant rule
    pub category: &'static str,
}

/// Pool per-chunk (valence, arousal) vectors into one mood verdict
///
/// Confidence is `1 - mean(std_valence, std_arousal) / 4.0`, clamped to
/// [0, 1]; stds are population standard deviations.
pub fn aggregate_regression(
    vectors: &[Vec<f32>],
    threshold: f32,
    margin: f32,
) -> Result<RegressionEnsemble> {
    if vectors.is_empty() {
        return Err(AnalysisError::NoValidChunks);
    }
    let dims = vectors[0].len();
    if dims != 2 {
        return Err(AnalysisError::InvalidConfig(format!(
            "mood regression expects 2 dimensions (valence, arousal), got {}",
            dims
        )));
    }
    if vectors.iter().any(|v| v.len() != dims) {
        return Err(AnalysisError::InvalidConfig(
            "regression vectors have differing dimensions".to_string(),
        ));
    }

    let n = vectors.len() as f32;
    let mut means = vec![0.0f32; dims];
    for v in vectors {
        for (m, &x) in means.iter_mut().zip(v) {
            *m += x;
        }
    }
    for m in &mut means {
        *m /= n;
    }

    let mut stds = vec![0.0f32; dims];
    for v in vectors {
        for (s, (&x, &m)) in stds.iter_mut().zip(v.iter().zip(&means)) {
            *s += (x - m) * (x - m);
        }
    }
    for s in &mut stds {
        *s = (*s / n).sqrt();
    }

    let mean_std = (stds[0] + stds[1]) / 2.0;
    let confidence = (1.0 - mean_std / MAX_EXPECTED_STD).clamp(0.0, 1.0);

    let (valence, arousal) = (means[0], means[1]);
    Ok(RegressionEnsemble {
        valence,
        arousal,
        confidence,
        category: categorize_mood(valence, arousal, threshold, margin),
    })
}

/// Map mean (valence, arousal) to a mood quadrant
///
/// Clause order is part of the contract: the corner conditions overlap
/// inclusively at the threshold boundary, so exact-threshold values with
/// zero margin resolve to the first matching clause ("Happy / Excited"),
/// not to "Mixed". Do not reorder or symmetrize.
pub fn categorize_mood(valence: f32, arousal: f32, threshold: f32, margin: f32) -> &'static str {
    if valence >= threshold + margin && arousal >= threshold + margin {
        "Happy / Excited"
    } else if valence <= threshold - margin && arousal >= threshold + margin {
        "Angry / Tense"
    } else if valence <= threshold - margin && arousal <= threshold - margin {
        "Sad / Calm"
    } else if valence >= threshold + margin && arousal <= threshold - margin {
        "Calm / Relaxed"
    } else {
        "Mixed / Uncertain Mood"
    }
}

/// Index of the first maximal element
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn argmax_usize(values: &[usize]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
