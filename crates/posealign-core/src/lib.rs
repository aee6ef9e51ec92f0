//! posealign Core - Pose model and joint-angle primitives
//!
//! This crate defines the types every other posealign crate builds on:
//! - Keypoints, poses, frames and sequences as delivered by a pose estimator
//! - Joint-angle extraction (right-side elbow, knee, armpit, trunk)
//! - Keypoint normalization (hip-centered, shoulder-width scaled)
//! - Frame clock for index/time conversions
//! - The shared error type

pub mod angle;
pub mod clock;
pub mod error;
pub mod keypoint;
pub mod normalize;

pub use angle::*;
pub use clock::*;
pub use error::*;
pub use keypoint::*;
pub use normalize::*;
