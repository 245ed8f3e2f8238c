//! Stable output records
//!
//! Packages ensemble verdicts into the JSON shape callers consume.
//! Confidence is always clamped to [0, 1] and formatted with exactly two
//! decimals; fatal pipeline failures surface as the "unknown" sentinel
//! record rather than an error, so batch callers are never halted by a
//! single bad track.

use serde::Serialize;

/// One labeled verdict: prediction plus two-decimal confidence string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRecord {
    pub prediction: String,
    pub confidence: String,
}

impl LabelRecord {
    /// Build a record, clamping confidence to [0, 1] before formatting
    pub fn new(prediction: impl Into<String>, confidence: f32) -> Self {
        Self {
            prediction: prediction.into(),
            confidence: format!("{:.2}", confidence.clamp(0.0, 1.0)),
        }
    }

    /// Sentinel for fatal pipeline failures
    pub fn unknown() -> Self {
        Self {
            prediction: "unknown".to_string(),
            confidence: "0.00".to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.prediction == "unknown"
    }
}

/// Complete per-track report
#[derive(Debug, Clone, Serialize)]
pub struct TrackReport {
    /// Genre verdict (probability-average ensemble)
    pub genre: LabelRecord,
    /// Mood category verdict
    pub mood: LabelRecord,
    /// Estimated tempo, rounded to whole BPM (0 when estimation failed)
    pub bpm: u32,
    /// Mean valence on the 1-9 scale, rounded to two decimals
    pub valence: f32,
    /// Mean arousal on the 1-9 scale, rounded to two decimals
    pub arousal: f32,
}

/// Round to two decimal places for reporting
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
