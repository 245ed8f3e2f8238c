//! Waveform segmentation
//!
//! Slices a decoded waveform into fixed-length analysis chunks. Two modes
//! exist, matching the two model pipelines:
//!
//! - [`overlapping_chunks`] (genre): windows advance by `window - overlap`
//!   samples, plus a tail window anchored at the end of the track so the
//!   outro is always represented.
//! - [`fixed_chunks`] (mood): back-to-back windows, trailing partial
//!   window dropped. A track shorter than one window is an error.
//!
//! Chunks are read-only views into the signal, emitted in chronological
//! order.

use crate::error::{AnalysisError, Result};

/// A fixed-length excerpt of a waveform, tagged with its start offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk<'a> {
    /// Read-only view of the underlying samples
    pub samples: &'a [f32],
    /// Offset of the first sample within the source signal
    pub start: usize,
}

impl<'a> Chunk<'a> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Slice a waveform into overlapping windows
///
/// Emits a window every `window - overlap` samples while a full window
/// still fits. If the final `window` samples of the signal are not
/// already exactly the last emitted window, one more chunk anchored at
/// `len - window` is appended, so the end of the track is always covered
/// even when the stride does not land on it.
///
/// A signal shorter than `window` yields an empty list; the caller treats
/// the resulting empty ensemble as a total failure.
pub fn overlapping_chunks(samples: &[f32], window: usize, overlap: usize) -> Result<Vec<Chunk<'_>>> {
    if window == 0 {
        return Err(AnalysisError::InvalidConfig(
            "segmentation window must be positive".to_string(),
        ));
    }
    if overlap >= window {
        return Err(AnalysisError::InvalidConfig(format!(
            "overlap ({}) must be smaller than window ({})",
            overlap, window
        )));
    }

    let hop = window - overlap;
    let mut chunks = Vec::new();

    let mut start = 0;
    while start + window <= samples.len() {
        chunks.push(Chunk {
            samples: &samples[start..start + window],
            start,
        });
        start += hop;
    }

    // Tail coverage: anchor one extra window at the very end unless the
    // stride already produced it.
    if samples.len() > window {
        let tail_start = samples.len() - window;
        let tail = &samples[tail_start..];
        let covered = chunks
            .last()
            .is_some_and(|last| last.samples == tail);
        if !covered {
            chunks.push(Chunk {
                samples: tail,
                start: tail_start,
            });
        }
    }

    Ok(chunks)
}

/// Slice a waveform into disjoint full-length windows
///
/// The trailing `len % window` samples are dropped rather than padded: a
/// segment is only analyzed if it is full-length. Zero complete segments
/// is a precondition failure.
pub fn fixed_chunks(samples: &[f32], window: usize) -> Result<Vec<Chunk<'_>>> {
    if window == 0 {
        return Err(AnalysisError::InvalidConfig(
            "segmentation window must be positive".to_string(),
        ));
    }

    let chunks: Vec<Chunk<'_>> = samples
        .chunks_exact(window)
        .enumerate()
        .map(|(i, s)| Chunk {
            samples: s,
            start: i * window,
        })
        .collect();

    if chunks.is_empty() {
        return Err(AnalysisError::TrackTooShort {
            samples: samples.len(),
            window,
        });
    }

    Ok(chunks)
}
