//! Error types for posealign

use thiserror::Error;

/// Core posealign errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseAlignError {
    // Metric errors
    #[error("Keypoint shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    // Scoring errors
    #[error("Aligned length mismatch: reference {reference}, target {target}")]
    LengthMismatch { reference: usize, target: usize },

    #[error("Frame index {index} out of range for {len} frames")]
    FrameOutOfRange { index: usize, len: usize },

    // Alignment errors
    #[error("Alignment too large: {cells} cost cells exceed limit {limit}")]
    AlignmentTooLarge { cells: usize, limit: usize },

    // Configuration and input errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for posealign operations
pub type PoseAlignResult<T> = Result<T, PoseAlignError>;
