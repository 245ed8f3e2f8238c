//! Global configuration for tracktag
//!
//! Configuration is stored as YAML. Default location:
//! ~/.config/tracktag/config.yaml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Canonical genre label set, in model output order
///
/// The order is part of the model contract: ensemble tie-breaking picks
/// the first label in this order, so reordering changes results.
pub const GENRE_LABELS: [&str; 10] = [
    "blues", "classical", "country", "disco", "hiphop",
    "jazz", "metal", "pop", "reggae", "rock",
];

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Genre classification pipeline settings
    pub genre: GenreConfig,
    /// Mood regression pipeline settings
    pub mood: MoodConfig,
    /// Tempo estimation settings
    pub tempo: TempoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            genre: GenreConfig::default(),
            mood: MoodConfig::default(),
            tempo: TempoConfig::default(),
        }
    }
}

impl Config {
    /// Validate and clamp all sections to supported ranges
    pub fn validate(&mut self) -> Result<()> {
        self.genre.validate()?;
        self.mood.validate()?;
        self.tempo.validate();
        Ok(())
    }
}

/// Genre classification configuration
///
/// The genre model scores 30-second excerpts rendered as fixed-size RGB
/// spectrogram grids. Chunks overlap so the ensemble sees every part of
/// the track at least once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreConfig {
    /// Sample rate the model was trained at (Hz)
    pub sample_rate: u32,
    /// Analysis window duration in seconds
    pub chunk_secs: f32,
    /// Overlap between consecutive windows in seconds
    pub overlap_secs: f32,
    /// Number of mel bands
    pub n_mels: usize,
    /// FFT window length in samples
    pub n_fft: usize,
    /// Hop between successive FFT frames in samples
    pub hop_length: usize,
    /// Side length of the square RGB grid fed to the model (pixels)
    pub image_size: usize,
    /// Ordered label set; must match the model's output dimension
    pub labels: Vec<String>,
}

impl Default for GenreConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            chunk_secs: 30.0,
            overlap_secs: 15.0,
            n_mels: 128,
            n_fft: 2048,
            hop_length: 512,
            image_size: 288,
            labels: GENRE_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GenreConfig {
    /// Window length in samples
    pub fn window_samples(&self) -> usize {
        (self.chunk_secs * self.sample_rate as f32) as usize
    }

    /// Overlap in samples
    pub fn overlap_samples(&self) -> usize {
        (self.overlap_secs * self.sample_rate as f32) as usize
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.sample_rate > 0, "genre.sample_rate must be positive");
        anyhow::ensure!(self.chunk_secs > 0.0, "genre.chunk_secs must be positive");
        anyhow::ensure!(
            self.overlap_secs < self.chunk_secs,
            "genre.overlap_secs must be smaller than chunk_secs"
        );
        anyhow::ensure!(!self.labels.is_empty(), "genre.labels must not be empty");
        anyhow::ensure!(
            self.n_fft > 0 && self.hop_length > 0 && self.n_mels > 0,
            "genre spectrogram parameters must be positive"
        );
        Ok(())
    }
}

/// Mood regression configuration
///
/// The mood model maps 5-second log-mel excerpts to a (valence, arousal)
/// pair. Segments never overlap and a trailing partial segment is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    /// Sample rate the model was trained at (Hz)
    pub sample_rate: u32,
    /// Segment duration in seconds
    pub segment_secs: f32,
    /// Number of mel bands
    pub n_mels: usize,
    /// FFT window length in samples
    pub n_fft: usize,
    /// Hop between successive FFT frames in samples
    pub hop_length: usize,
    /// Lower bound of the valence/arousal scale
    pub scale_min: f32,
    /// Upper bound of the valence/arousal scale
    pub scale_max: f32,
    /// Quadrant threshold for mood categorization (midpoint of the scale)
    pub threshold: f32,
    /// Symmetric margin around the threshold; values inside the band on
    /// either axis categorize as "Mixed / Uncertain Mood"
    pub margin: f32,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            segment_secs: 5.0,
            n_mels: 128,
            n_fft: 2048,
            hop_length: 512,
            scale_min: 1.0,
            scale_max: 9.0,
            threshold: 5.0,
            margin: 0.0,
        }
    }
}

impl MoodConfig {
    /// Segment length in samples
    pub fn window_samples(&self) -> usize {
        (self.segment_secs * self.sample_rate as f32) as usize
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.sample_rate > 0, "mood.sample_rate must be positive");
        anyhow::ensure!(self.segment_secs > 0.0, "mood.segment_secs must be positive");
        anyhow::ensure!(
            self.scale_min < self.scale_max,
            "mood scale bounds must satisfy scale_min < scale_max"
        );
        anyhow::ensure!(
            self.threshold >= self.scale_min && self.threshold <= self.scale_max,
            "mood.threshold must lie within the scale bounds"
        );
        anyhow::ensure!(self.margin >= 0.0, "mood.margin must be non-negative");
        Ok(())
    }
}

/// Tempo estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    /// Minimum expected tempo in BPM
    pub min_bpm: f32,
    /// Maximum expected tempo in BPM
    pub max_bpm: f32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            min_bpm: 40.0,
            max_bpm: 208.0,
        }
    }
}

impl TempoConfig {
    /// Validate and clamp values to a sane range
    pub fn validate(&mut self) {
        self.min_bpm = self.min_bpm.clamp(20.0, 180.0);
        self.max_bpm = self.max_bpm.clamp(60.0, 300.0);

        // Ensure min < max with at least 20 BPM gap
        if self.min_bpm >= self.max_bpm {
            self.max_bpm = (self.min_bpm + 20.0).min(300.0);
        }
    }
}

/// Get the default config file path
///
/// Returns: ~/.config/tracktag/config.yaml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tracktag")
        .join("config.yaml")
}

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config(path: &Path) -> Config {
    log::info!("load_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_config: Config file doesn't exist, using defaults");
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
            Ok(mut config) => {
                if let Err(e) = config.validate() {
                    log::warn!("load_config: Invalid config: {}, using defaults", e);
                    return Config::default();
                }
                config
            }
            Err(e) => {
                log::warn!("load_config: Failed to parse config: {}, using defaults", e);
                Config::default()
            }
        },
        Err(e) => {
            log::warn!("load_config: Failed to read config file: {}, using defaults", e);
            Config::default()
        }
    }
}

/// Save configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    log::info!("save_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config)
        .context("Failed to serialize config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
