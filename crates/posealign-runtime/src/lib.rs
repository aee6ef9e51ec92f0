//! posealign Runtime - Comparison pipeline for pose sequences
//!
//! This crate ties the pipeline together for a host application:
//! 1. Decode pose-estimator output into single-pose sequences
//! 2. Extract joint angles
//! 3. Align reference and target with DTW
//! 4. Score per-angle deviation along the path
//! 5. Remap deviation onto target frames
//! 6. Package everything in a serializable report
//!
//! Configuration comes from [`ComparisonConfig`]; logging setup lives in
//! [`logging`].

pub mod config;
pub mod engine;
pub mod input;
pub mod logging;
pub mod report;

pub use config::*;
pub use engine::*;
pub use input::*;
pub use logging::{try_init as init_logging, LogFormat};
pub use report::*;
