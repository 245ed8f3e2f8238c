//! Track analysis orchestration
//!
//! Runs the genre, mood and tempo pipelines over one decoded signal and
//! assembles the final [`TrackReport`]. Analysis never fails at the track
//! boundary: a pipeline that errors out contributes its sentinel value
//! ("unknown"/0.00 records, BPM 0) and the other pipelines still report.

pub mod genre;
pub mod mood;
pub mod tempo;

pub use genre::classify_genre;
pub use mood::predict_mood;
pub use tempo::estimate_bpm;

use crate::config::Config;
use crate::decode::AudioSignal;
use crate::model::ModelAdapter;
use crate::report::{round2, LabelRecord, TrackReport};

/// Analyze one track and assemble the complete report
pub fn analyze_track(
    signal: &AudioSignal,
    config: &Config,
    genre_model: &dyn ModelAdapter,
    mood_model: &dyn ModelAdapter,
) -> TrackReport {
    log::info!(
        "analyze_track: {:.1}s of audio at {} Hz",
        signal.duration_secs(),
        signal.sample_rate
    );

    let genre = match classify_genre(signal, &config.genre, genre_model) {
        Ok(ensemble) => LabelRecord::new(ensemble.average_label, ensemble.average_confidence),
        Err(e) => {
            log::warn!("Genre classification failed: {}", e);
            LabelRecord::unknown()
        }
    };

    let (mood, valence, arousal) = match predict_mood(signal, &config.mood, mood_model) {
        Ok(ensemble) => (
            LabelRecord::new(ensemble.category, ensemble.confidence),
            round2(ensemble.valence),
            round2(ensemble.arousal),
        ),
        Err(e) => {
            log::warn!("Mood prediction failed: {}", e);
            (LabelRecord::unknown(), 0.0, 0.0)
        }
    };

    let bpm = match estimate_bpm(signal, &config.tempo) {
        Ok(bpm) => bpm.round() as u32,
        Err(e) => {
            log::warn!("Tempo estimation failed: {}", e);
            0
        }
    };

    TrackReport {
        genre,
        mood,
        bpm,
        valence,
        arousal,
    }
}
