//! Pipeline error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while analyzing a track
///
/// Per-chunk failures ([`AnalysisError::FeatureExtraction`],
/// [`AnalysisError::Inference`]) are recoverable: the offending chunk is
/// dropped from the ensemble and processing continues. The remaining
/// variants are fatal for the invocation and are converted into the
/// "unknown" sentinel record at the track boundary.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No model matching '{prefix}' found in {}", dir.display())]
    ModelNotFound { prefix: String, dir: PathBuf },

    #[error("Failed to load model {}: {message}", path.display())]
    ModelLoadFailed { path: PathBuf, message: String },

    #[error("Failed to read audio file: {}", path.display())]
    AudioReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Track too short: {samples} samples, need at least {window}")]
    TrackTooShort { samples: usize, window: usize },

    #[error("No valid chunks survived processing")]
    NoValidChunks,

    #[error("Feature extraction failed: {0}")]
    FeatureExtraction(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Whether the error only affects a single chunk (the run continues)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::FeatureExtraction(_) | AnalysisError::Inference(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
