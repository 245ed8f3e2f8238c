//! End-to-end pipeline tests over real WAV fixtures
//!
//! Fixtures are generated with hound into a temp directory, decoded with
//! the real Symphonia path, and run through the full analysis with mock
//! model adapters standing in for the trained networks.

use std::path::PathBuf;

use ndarray::Array3;

use tracktag::analysis::analyze_track;
use tracktag::config::{Config, GenreConfig, MoodConfig};
use tracktag::decode::decode_file;
use tracktag::error::{AnalysisError, Result};
use tracktag::model::ModelAdapter;

/// Adapter returning the same output vector for every tensor
struct ConstantAdapter(Vec<f32>);

impl ModelAdapter for ConstantAdapter {
    fn infer(&self, batch: &[Array3<f32>]) -> Result<Vec<Vec<f32>>> {
        Ok(batch.iter().map(|_| self.0.clone()).collect())
    }
}

/// Adapter that always fails
struct FailingAdapter;

impl ModelAdapter for FailingAdapter {
    fn infer(&self, _batch: &[Array3<f32>]) -> Result<Vec<Vec<f32>>> {
        Err(AnalysisError::Inference("scripted failure".to_string()))
    }
}

/// Write a mono 16-bit WAV of a sine at the given frequency
fn write_sine_wav(dir: &tempfile::TempDir, name: &str, freq: f32, secs: f32, sr: u32) -> PathBuf {
    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sr,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..(secs * sr as f32) as usize {
        let s = (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin() * 0.5;
        writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

/// Write a stereo WAV with different content per channel
fn write_stereo_wav(dir: &tempfile::TempDir, name: &str, secs: f32, sr: u32) -> PathBuf {
    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sr,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..(secs * sr as f32) as usize {
        let t = i as f32 / sr as f32;
        let left = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
        let right = (2.0 * std::f32::consts::PI * 660.0 * t).sin() * 0.5;
        writer.write_sample((left * i16::MAX as f32) as i16).unwrap();
        writer.write_sample((right * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

/// Write a mono WAV of noise bursts at the given tempo
fn write_click_wav(dir: &tempfile::TempDir, name: &str, bpm: f32, secs: f32, sr: u32) -> PathBuf {
    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sr,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    let period = (60.0 / bpm * sr as f32) as usize;
    let total = (secs * sr as f32) as usize;
    for i in 0..total {
        let phase = i % period;
        let s = if phase < 1024 {
            let t = phase as f32 / sr as f32;
            (2.0 * std::f32::consts::PI * 1000.0 * t).sin() * (1.0 - phase as f32 / 1024.0) * 0.8
        } else {
            0.0
        };
        writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

/// Fast test configuration: 1-second windows instead of 30/5 seconds
fn test_config() -> Config {
    Config {
        genre: GenreConfig {
            chunk_secs: 1.0,
            overlap_secs: 0.5,
            image_size: 32,
            labels: vec!["blues".into(), "jazz".into(), "rock".into()],
            ..GenreConfig::default()
        },
        mood: MoodConfig {
            segment_secs: 1.0,
            ..MoodConfig::default()
        },
        ..Config::default()
    }
}

#[test]
fn test_wav_decode_duration_and_rate() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sine_wav(&dir, "tone.wav", 440.0, 2.0, 22050);

    let signal = decode_file(&path).unwrap();
    assert_eq!(signal.sample_rate, 22050);
    assert!((signal.duration_secs() - 2.0).abs() < 0.05);
    // A pure sine must survive decoding as a non-silent waveform
    let peak = signal.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak > 0.4 && peak <= 1.0);
}

#[test]
fn test_stereo_wav_downmixed_to_mono() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_stereo_wav(&dir, "stereo.wav", 1.0, 44100);

    let signal = decode_file(&path).unwrap();
    // Frame count, not interleaved sample count
    assert!((signal.duration_secs() - 1.0).abs() < 0.05);
    assert_eq!(signal.sample_rate, 44100);
}

#[test]
fn test_missing_file_is_read_error() {
    let err = decode_file(std::path::Path::new("/nonexistent/track.wav")).unwrap_err();
    assert!(matches!(err, AnalysisError::AudioReadError { .. }));
}

#[test]
fn test_full_analysis_over_real_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sine_wav(&dir, "track.wav", 440.0, 4.0, 22050);
    let signal = decode_file(&path).unwrap();

    let config = test_config();
    let genre_model = ConstantAdapter(vec![0.1, 0.7, 0.2]);
    // 0.625 normalized maps to 6.0 on the 1-9 scale
    let mood_model = ConstantAdapter(vec![0.625, 0.625]);

    let report = analyze_track(&signal, &config, &genre_model, &mood_model);

    assert_eq!(report.genre.prediction, "jazz");
    assert_eq!(report.genre.confidence, "0.70");
    assert_eq!(report.mood.prediction, "Happy / Excited");
    assert_eq!(report.mood.confidence, "1.00");
    assert!((report.valence - 6.0).abs() < 0.01);
    assert!((report.arousal - 6.0).abs() < 0.01);
}

#[test]
fn test_report_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sine_wav(&dir, "track.wav", 440.0, 3.0, 22050);
    let signal = decode_file(&path).unwrap();

    let report = analyze_track(
        &signal,
        &test_config(),
        &ConstantAdapter(vec![0.8, 0.1, 0.1]),
        &ConstantAdapter(vec![0.25, 0.75]),
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["genre"]["prediction"], "blues");
    assert!(json["bpm"].is_u64());
    assert!(json["valence"].is_f64());
}

#[test]
fn test_failed_models_yield_sentinel_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sine_wav(&dir, "track.wav", 440.0, 3.0, 22050);
    let signal = decode_file(&path).unwrap();

    let report = analyze_track(&signal, &test_config(), &FailingAdapter, &FailingAdapter);

    assert_eq!(report.genre.prediction, "unknown");
    assert_eq!(report.genre.confidence, "0.00");
    assert_eq!(report.mood.prediction, "unknown");
    assert_eq!(report.valence, 0.0);
    assert_eq!(report.arousal, 0.0);
}

#[test]
fn test_tempo_from_click_track_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_click_wav(&dir, "clicks.wav", 120.0, 15.0, 22050);
    let signal = decode_file(&path).unwrap();

    let report = analyze_track(
        &signal,
        &test_config(),
        &ConstantAdapter(vec![0.5, 0.3, 0.2]),
        &ConstantAdapter(vec![0.5, 0.5]),
    );

    assert!(
        (100..=140).contains(&report.bpm),
        "expected roughly 120 BPM, got {}",
        report.bpm
    );
}

#[test]
fn test_track_too_short_for_any_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sine_wav(&dir, "blip.wav", 440.0, 0.3, 22050);
    let signal = decode_file(&path).unwrap();

    let report = analyze_track(
        &signal,
        &test_config(),
        &ConstantAdapter(vec![0.5, 0.3, 0.2]),
        &ConstantAdapter(vec![0.5, 0.5]),
    );

    // Every pipeline fails on a 0.3s track; all sentinels, no panic
    assert!(report.genre.is_unknown());
    assert!(report.mood.is_unknown());
    assert_eq!(report.bpm, 0);
}
