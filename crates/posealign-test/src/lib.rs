//! posealign Test Harness - Synthetic motion, fuzzing and scenarios
//!
//! This crate provides:
//! - Seeded synthetic pose sequences
//! - Alignment pipeline fuzzing with invariant checks
//! - End-to-end comparison scenarios
//! - Criterion benchmarks (see `benches/`)

pub mod fuzzer;
pub mod scenarios;
pub mod synth;

pub use fuzzer::*;
pub use scenarios::*;
pub use synth::*;
