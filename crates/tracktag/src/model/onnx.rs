//! ONNX Runtime model adapter
//!
//! Wraps an `ort` session behind [`ModelAdapter`]. The session is loaded
//! once at construction (load once, invoke many times, dropped with the
//! adapter) and guarded by a mutex because `ort` requires `&mut` to run;
//! callers only ever see `&self`.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array3, Array4};
use ort::session::Session;
use ort::value::Tensor;

use super::{ModelAdapter, ModelSelection};
use crate::error::{AnalysisError, Result};

/// [`ModelAdapter`] backed by an ONNX Runtime session
pub struct OnnxAdapter {
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxAdapter {
    /// Load a model according to the given selection policy
    pub fn load(selection: &ModelSelection, input_name: &str) -> Result<Self> {
        let path = selection.resolve()?;
        Self::from_file(&path, input_name)
    }

    /// Load a model from a concrete file path
    pub fn from_file(path: &Path, input_name: &str) -> Result<Self> {
        let session = Session::builder()
            .and_then(|b| Ok(b.with_intra_threads(1)?))
            .and_then(|mut b| b.commit_from_file(path))
            .map_err(|e| AnalysisError::ModelLoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        log::info!("Loaded ONNX model from {:?}", path);

        Ok(Self {
            session: Mutex::new(session),
            input_name: input_name.to_string(),
        })
    }
}

impl ModelAdapter for OnnxAdapter {
    fn infer(&self, batch: &[Array3<f32>]) -> Result<Vec<Vec<f32>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        // All tensors in a batch must share the pipeline's fixed shape
        let shape = batch[0].raw_dim();
        if batch.iter().any(|t| t.raw_dim() != shape) {
            return Err(AnalysisError::Inference(
                "feature tensors in one batch have differing shapes".to_string(),
            ));
        }

        let (h, w, c) = (shape[0], shape[1], shape[2]);
        let n = batch.len();

        let mut flat = Vec::with_capacity(n * h * w * c);
        for tensor in batch {
            flat.extend(tensor.iter().copied());
        }

        let input = Array4::from_shape_vec((n, h, w, c), flat)
            .map_err(|e| AnalysisError::Inference(format!("input shape error: {}", e)))?;

        let input_tensor = Tensor::from_array(input)
            .map_err(|e| AnalysisError::Inference(format!("tensor creation error: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AnalysisError::Inference("model session poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| AnalysisError::Inference(e.to_string()))?;

        let (_, value) = outputs
            .iter()
            .next()
            .ok_or_else(|| AnalysisError::Inference("model produced no output".to_string()))?;

        let (_shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| AnalysisError::Inference(format!("output extraction error: {}", e)))?;

        if data.is_empty() || data.len() % n != 0 {
            return Err(AnalysisError::Inference(format!(
                "output length {} is not divisible by batch size {}",
                data.len(),
                n
            )));
        }

        let dim = data.len() / n;
        Ok(data.chunks_exact(dim).map(|row| row.to_vec()).collect())
    }
}
