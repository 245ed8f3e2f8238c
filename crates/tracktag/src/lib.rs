//! tracktag - genre, mood, and tempo tagging for audio tracks
//!
//! The pipeline decodes a track to a mono waveform, cuts it into chunks,
//! renders per-chunk log-mel features, scores each chunk with a trained
//! ONNX model, and fuses the per-chunk outputs into one track-level
//! verdict:
//!
//! - **Genre**: overlapping 30 s chunks rasterized to fixed-size RGB
//!   spectrogram grids, fused by a three-policy classification ensemble.
//! - **Mood**: non-overlapping 5 s segments on a log-mel matrix, pooled
//!   into mean (valence, arousal) with a spread-based confidence and a
//!   quadrant mood category.
//! - **Tempo**: spectral-flux onset envelope plus autocorrelation, no
//!   model involved.
//!
//! Chunk-level failures are tolerated (the run continues on the remaining
//! chunks); track-level failures surface as sentinel records so batch
//! callers are never halted by one bad file.
//!
//! ```no_run
//! use std::path::Path;
//! use tracktag::analysis::analyze_track;
//! use tracktag::config::Config;
//! use tracktag::decode::decode_file;
//! use tracktag::model::{ModelSelection, OnnxAdapter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let signal = decode_file(Path::new("track.mp3"))?;
//!
//! let genre = OnnxAdapter::load(
//!     &ModelSelection::LatestByTimestamp {
//!         dir: "models".into(),
//!         prefix: "genre_classifier".into(),
//!     },
//!     "input",
//! )?;
//! let mood = OnnxAdapter::load(
//!     &ModelSelection::LatestByTimestamp {
//!         dir: "models".into(),
//!         prefix: "mood_regressor".into(),
//!     },
//!     "input",
//! )?;
//!
//! let report = analyze_track(&signal, &config, &genre, &mood);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod decode;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod model;
pub mod report;
pub mod segment;

pub use analysis::analyze_track;
pub use config::{load_config, Config};
pub use decode::{decode_file, AudioSignal};
pub use error::{AnalysisError, Result};
pub use model::{ModelAdapter, ModelSelection, OnnxAdapter};
pub use report::{LabelRecord, TrackReport};
