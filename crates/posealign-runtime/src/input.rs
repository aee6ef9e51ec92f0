//! Pose-estimator output decoding
//!
//! The estimator emits one JSON array per frame holding every pose it found:
//!
//! ```json
//! [[{"keypoints": [{"name": "nose", "x": 1.0, "y": 2.0, "score": 0.9}], "score": 0.8}], []]
//! ```
//!
//! A `null` frame is treated like an empty one. The first pose of each frame
//! is the one compared.

use std::fs;
use std::path::Path;

use posealign_core::{select_sequence, Pose, PoseAlignError, PoseAlignResult, Sequence};
use tracing::debug;

/// Every pose of every frame, before selection
pub fn decode_detections(json: &str) -> PoseAlignResult<Vec<Vec<Pose>>> {
    let frames: Vec<Option<Vec<Pose>>> =
        serde_json::from_str(json).map_err(|e| PoseAlignError::Decode(e.to_string()))?;
    Ok(frames.into_iter().map(Option::unwrap_or_default).collect())
}

/// Decode estimator output into a single-pose sequence
pub fn decode_sequence(json: &str) -> PoseAlignResult<Sequence> {
    let detections = decode_detections(json)?;
    let sequence = select_sequence(&detections);
    debug!(
        frames = sequence.len(),
        empty = sequence.iter().filter(|f| f.is_none()).count(),
        "decoded pose sequence"
    );
    Ok(sequence)
}

pub fn read_sequence(path: impl AsRef<Path>) -> PoseAlignResult<Sequence> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| PoseAlignError::Decode(format!("cannot read {}: {}", path.display(), e)))?;
    decode_sequence(&contents)
}
