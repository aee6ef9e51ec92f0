//! posealign Score - Deviation scoring over an alignment
//!
//! - Per-angle degree differences along the aligned path ([`score_deviation`])
//! - Projection back onto the target video's frames with gap filling
//! - Per-angle cosine similarity for diagnostics
//! - Severity tiers and their propagation to skeleton segments

pub mod deviation;
pub mod remap;
pub mod severity;
pub mod similarity;

pub use deviation::*;
pub use remap::*;
pub use severity::*;
pub use similarity::*;
