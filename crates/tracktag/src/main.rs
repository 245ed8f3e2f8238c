//! tracktag command-line interface
//!
//! Decodes a track, loads the newest genre and mood models from the model
//! directory, runs the full analysis, and prints the report as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use tracktag::analysis::analyze_track;
use tracktag::config::{default_config_path, load_config};
use tracktag::decode::decode_file;
use tracktag::model::{ModelSelection, OnnxAdapter};

/// Filename prefix of exported genre classifier models
const GENRE_MODEL_PREFIX: &str = "genre_classifier";

/// Filename prefix of exported mood regressor models
const MOOD_MODEL_PREFIX: &str = "mood_regressor";

/// Model graph input name shared by both exported models
const MODEL_INPUT_NAME: &str = "input";

#[derive(Parser, Debug)]
#[command(name = "tracktag", version, about = "Tag audio tracks with genre, mood, and tempo")]
struct Args {
    /// Audio file to analyze
    audio: PathBuf,

    /// Directory holding exported .onnx models
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,

    /// Path to a specific genre model (overrides --model-dir discovery)
    #[arg(long)]
    genre_model: Option<PathBuf>,

    /// Path to a specific mood model (overrides --model-dir discovery)
    #[arg(long)]
    mood_model: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn selection(explicit: Option<PathBuf>, dir: &PathBuf, prefix: &str) -> ModelSelection {
    match explicit {
        Some(path) => ModelSelection::Path(path),
        None => ModelSelection::LatestByTimestamp {
            dir: dir.clone(),
            prefix: prefix.to_string(),
        },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = load_config(&config_path);

    let genre_model = OnnxAdapter::load(
        &selection(args.genre_model, &args.model_dir, GENRE_MODEL_PREFIX),
        MODEL_INPUT_NAME,
    )
    .context("failed to load genre model")?;

    let mood_model = OnnxAdapter::load(
        &selection(args.mood_model, &args.model_dir, MOOD_MODEL_PREFIX),
        MODEL_INPUT_NAME,
    )
    .context("failed to load mood model")?;

    let signal = decode_file(&args.audio)
        .with_context(|| format!("failed to decode {:?}", args.audio))?;

    let report = analyze_track(&signal, &config, &genre_model, &mood_model);

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
