//! posealign DTW - Time alignment of two motion sequences
//!
//! - Frame distance metrics behind one [`FrameMetric`] trait
//! - The cumulative [`CostMatrix`] and its backtracking
//! - [`DtwAligner`], producing the [`AlignmentPath`] and aligned sequences

pub mod aligner;
pub mod cost;
pub mod metric;
pub mod path;

pub use aligner::*;
pub use cost::*;
pub use metric::*;
pub use path::*;
