//! DTW Aligner - Minimum-cost monotonic alignment of two sequences

use posealign_core::{PoseAlignError, PoseAlignResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AlignmentPath, CostMatrix, FrameMetric};

/// Aligner configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Refuse alignments whose cost matrix would exceed this many cells
    pub max_cells: Option<usize>,
}

/// Result of aligning two sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment<T> {
    /// `aligned_reference[k] = reference[path[k].reference]`
    pub aligned_reference: Vec<T>,
    /// `aligned_target[k] = target[path[k].target]`
    pub aligned_target: Vec<T>,
    pub path: AlignmentPath,
    /// Accumulated cost at the final cell
    pub total_cost: f64,
}

impl<T> Alignment<T> {
    pub fn empty() -> Self {
        Self {
            aligned_reference: Vec::new(),
            aligned_target: Vec::new(),
            path: AlignmentPath::default(),
            total_cost: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Dynamic time warping over any [`FrameMetric`]
#[derive(Debug, Clone, Default)]
pub struct DtwAligner {
    config: AlignerConfig,
}

impl DtwAligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Fail before allocating if the matrix would exceed the configured cap
    pub fn check_size(&self, reference_len: usize, target_len: usize) -> PoseAlignResult<()> {
        let limit = self.config.max_cells.unwrap_or(usize::MAX);
        match reference_len.checked_mul(target_len) {
            Some(cells) if cells <= limit => Ok(()),
            Some(cells) => Err(PoseAlignError::AlignmentTooLarge { cells, limit }),
            None => Err(PoseAlignError::AlignmentTooLarge {
                cells: usize::MAX,
                limit,
            }),
        }
    }

    /// Align `target` against `reference`
    ///
    /// Frames in the returned sequences are the caller's originals, repeated
    /// wherever the path visits an index more than once.
    pub fn align<T, M>(
        &self,
        reference: &[T],
        target: &[T],
        metric: &M,
    ) -> PoseAlignResult<Alignment<T>>
    where
        T: Clone,
        M: FrameMetric<T> + ?Sized,
    {
        if reference.is_empty() || target.is_empty() {
            debug!(
                reference = reference.len(),
                target = target.len(),
                "empty sequence, nothing to align"
            );
            return Ok(Alignment::empty());
        }
        self.check_size(reference.len(), target.len())?;

        let prepared_reference: Vec<T> = reference.iter().map(|f| metric.prepare(f)).collect();
        let prepared_target: Vec<T> = target.iter().map(|f| metric.prepare(f)).collect();

        let matrix = CostMatrix::build(&prepared_reference, &prepared_target, metric)?;
        let path = matrix.backtrack();

        let aligned_reference = path.iter().map(|s| reference[s.reference].clone()).collect();
        let aligned_target = path.iter().map(|s| target[s.target].clone()).collect();

        debug!(
            metric = metric.name(),
            rows = matrix.rows(),
            cols = matrix.cols(),
            path_len = path.len(),
            total_cost = matrix.total_cost(),
            "aligned sequences"
        );

        Ok(Alignment {
            aligned_reference,
            aligned_target,
            path,
            total_cost: matrix.total_cost(),
        })
    }
}

/// [`DtwAligner::align`] without a size cap
pub fn align<T, M>(reference: &[T], target: &[T], metric: &M) -> PoseAlignResult<Alignment<T>>
where
    T: Clone,
    M: FrameMetric<T> + ?Sized,
{
    DtwAligner::default().align(reference, target, metric)
}
