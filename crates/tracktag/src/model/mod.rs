//! Model adapter boundary
//!
//! The pipeline never talks to a model runtime directly; it goes through
//! the [`ModelAdapter`] trait, which maps a batch of fixed-shape feature
//! tensors to one output vector per tensor. Classification models return
//! probability vectors over the configured label set, regression models
//! return continuous vectors; the pipeline, not the adapter, knows which
//! interpretation applies.
//!
//! Adapters are constructed explicitly with a [`ModelSelection`] policy
//! and passed into the pipelines — no global singletons, and tests swap
//! in mock adapters freely.

pub mod discovery;
pub mod onnx;

pub use discovery::ModelSelection;
pub use onnx::OnnxAdapter;

use ndarray::Array3;

use crate::error::Result;

/// Opaque trained model: feature tensors in, score vectors out
///
/// Implementations must be idempotent, side-effect-free, and safe for
/// concurrent invocation through `&self`.
pub trait ModelAdapter: Send + Sync {
    /// Score a batch of feature tensors
    ///
    /// All tensors in one batch share the pipeline's fixed shape. Returns
    /// one vector per input tensor, in input order; every vector has the
    /// model's fixed output dimension.
    fn infer(&self, batch: &[Array3<f32>]) -> Result<Vec<Vec<f32>>>;
}
