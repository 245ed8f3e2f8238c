//! Model file selection
//!
//! Trained models are exported with an embedded timestamp,
//! `<prefix>_<YYYYMMDD>_<HHMMSS>.onnx`, so a model directory can hold
//! several generations side by side. Selection is an explicit policy
//! passed into adapter construction: either a fixed path or
//! "latest by embedded timestamp". A directory with no matching file is
//! an explicit error, never a process exit.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{AnalysisError, Result};

/// Policy for choosing which trained model file to load
#[derive(Debug, Clone)]
pub enum ModelSelection {
    /// Load exactly this file
    Path(PathBuf),
    /// Load the newest `<prefix>_<YYYYMMDD>_<HHMMSS>.onnx` in `dir`
    LatestByTimestamp { dir: PathBuf, prefix: String },
}

impl ModelSelection {
    /// Resolve the policy to a concrete model file path
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            ModelSelection::Path(path) => {
                if path.exists() {
                    Ok(path.clone())
                } else {
                    Err(AnalysisError::ModelLoadFailed {
                        path: path.clone(),
                        message: "file does not exist".to_string(),
                    })
                }
            }
            ModelSelection::LatestByTimestamp { dir, prefix } => {
                latest_by_timestamp(dir, prefix)
            }
        }
    }
}

/// Find the model file with the newest embedded timestamp
fn latest_by_timestamp(dir: &Path, prefix: &str) -> Result<PathBuf> {
    // YYYYMMDD_HHMMSS sorts lexicographically in chronological order
    let pattern = Regex::new(&format!(
        r"^{}_(\d{{8}}_\d{{6}})\.onnx$",
        regex::escape(prefix)
    ))
    .map_err(|e| AnalysisError::InvalidConfig(format!("bad model prefix: {}", e)))?;

    let mut best: Option<(String, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        if let Some(captures) = pattern.captures(name) {
            let stamp = captures[1].to_string();
            let newer = best
                .as_ref()
                .is_none_or(|(current, _)| stamp > *current);
            if newer {
                best = Some((stamp, entry.path()));
            }
        }
    }

    match best {
        Some((stamp, path)) => {
            log::info!(
                "Model selection: '{}' resolved to {:?} (timestamp {})",
                prefix,
                path.file_name().unwrap_or_default(),
                stamp
            );
            Ok(path)
        }
        None => Err(AnalysisError::ModelNotFound {
            prefix: prefix.to_string(),
            dir: dir.to_path_buf(),
        }),
    }
}
