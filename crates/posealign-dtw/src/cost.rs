//! Cost matrix - Cumulative alignment cost and backtracking
//!
//! `cost[i][j] = d(ref[i], tgt[j]) + min(cost[i-1][j], cost[i][j-1], cost[i-1][j-1])`
//!
//! Cells in the first row or first column add nothing for their missing
//! predecessors: their cost is the bare frame distance. This is not the usual
//! cumulative-border variant and it does change the path near the sequence
//! edges; alignments produced elsewhere with this rule stay reproducible.

use posealign_core::{PoseAlignError, PoseAlignResult};

use crate::{AlignmentPath, AlignmentStep, FrameMetric};

/// Dense `rows x cols` grid of cumulative costs, row-major
#[derive(Debug, Clone)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl CostMatrix {
    /// Fill the matrix for two prepared sequences
    ///
    /// Fails with `AlignmentTooLarge` when `rows * cols` overflows `usize`.
    pub fn build<T, M>(reference: &[T], target: &[T], metric: &M) -> PoseAlignResult<Self>
    where
        T: Clone,
        M: FrameMetric<T> + ?Sized,
    {
        let rows = reference.len();
        let cols = target.len();
        let size = rows
            .checked_mul(cols)
            .ok_or(PoseAlignError::AlignmentTooLarge {
                cells: usize::MAX,
                limit: usize::MAX,
            })?;
        let mut cells = vec![0.0f64; size];

        for i in 0..rows {
            for j in 0..cols {
                let distance = metric.distance(&reference[i], &target[j])?;
                let prev = if i > 0 && j > 0 {
                    let up = cells[(i - 1) * cols + j];
                    let left = cells[i * cols + j - 1];
                    let diag = cells[(i - 1) * cols + j - 1];
                    up.min(left).min(diag)
                } else {
                    0.0
                };
                cells[i * cols + j] = distance + prev;
            }
        }

        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.rows && j < self.cols {
            Some(self.cells[i * self.cols + j])
        } else {
            None
        }
    }

    /// Accumulated cost at `(rows - 1, cols - 1)`, 0 for an empty matrix
    pub fn total_cost(&self) -> f64 {
        self.cells.last().copied().unwrap_or(0.0)
    }

    /// Walk back from the last cell to `(0, 0)`
    ///
    /// Interior cells step to the cheapest of diagonal, left and up, ties
    /// resolved in that order. First-row cells can only move left and
    /// first-column cells only up.
    pub fn backtrack(&self) -> AlignmentPath {
        if self.rows == 0 || self.cols == 0 {
            return AlignmentPath::default();
        }

        let at = |i: usize, j: usize| self.cells[i * self.cols + j];
        let mut i = self.rows - 1;
        let mut j = self.cols - 1;
        let mut steps = Vec::with_capacity(self.rows + self.cols - 1);

        loop {
            steps.push(AlignmentStep::new(i, j));
            match (i, j) {
                (0, 0) => break,
                (0, _) => j -= 1,
                (_, 0) => i -= 1,
                _ => {
                    let diag = at(i - 1, j - 1);
                    let left = at(i, j - 1);
                    let up = at(i - 1, j);
                    if diag <= left && diag <= up {
                        i -= 1;
                        j -= 1;
                    } else if left <= up {
                        j -= 1;
                    } else {
                        i -= 1;
                    }
                }
            }
        }

        steps.reverse();
        AlignmentPath::new(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EuclideanAngles;
    use posealign_core::AngleVector;

    fn scalar(values: &[f64]) -> Vec<AngleVector> {
        values
            .iter()
            .map(|v| AngleVector::new([*v, 0.0, 0.0, 0.0]))
            .collect()
    }

    #[test]
    fn test_border_cells_hold_bare_distance() {
        let reference = scalar(&[0.0, 5.0, 9.0]);
        let target = scalar(&[1.0, 2.0]);
        let matrix = CostMatrix::build(&reference, &target, &EuclideanAngles).unwrap();

        // first row and column are not cumulative
        assert_eq!(matrix.get(0, 1), Some(2.0));
        assert_eq!(matrix.get(2, 0), Some(8.0));
        // interior: d(5,2)=3 + min(up=2, left=4, diag=1)
        assert_eq!(matrix.get(1, 1), Some(4.0));
        // d(9,2)=7 + min(up=4, left=8, diag=4)
        assert_eq!(matrix.total_cost(), 11.0);
    }

    #[test]
    fn test_backtrack_prefers_diagonal_on_ties() {
        let same = scalar(&[3.0, 3.0, 3.0]);
        let matrix = CostMatrix::build(&same, &same, &EuclideanAngles).unwrap();
        let path = matrix.backtrack();

        assert_eq!(path, AlignmentPath::from(vec![(0, 0), (1, 1), (2, 2)]));
    }

    #[test]
    fn test_backtrack_border_walks() {
        let reference = scalar(&[0.0]);
        let target = scalar(&[0.0, 1.0, 2.0]);
        let path = CostMatrix::build(&reference, &target, &EuclideanAngles)
            .unwrap()
            .backtrack();

        assert_eq!(path, AlignmentPath::from(vec![(0, 0), (0, 1), (0, 2)]));
    }

    struct Constant;

    impl FrameMetric<()> for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }

        fn distance(&self, _: &(), _: &()) -> PoseAlignResult<f64> {
            Ok(1.0)
        }
    }

    #[test]
    fn test_overflowing_size_is_rejected() {
        // zero-sized frames make huge sequences free to hold
        let reference = vec![(); usize::MAX / 2];
        let target = vec![(); 3];

        assert_eq!(
            CostMatrix::build(&reference, &target, &Constant).map(|m| m.rows()),
            Err(PoseAlignError::AlignmentTooLarge {
                cells: usize::MAX,
                limit: usize::MAX,
            })
        );
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = CostMatrix::build(&scalar(&[]), &scalar(&[1.0]), &EuclideanAngles).unwrap();
        assert_eq!(matrix.total_cost(), 0.0);
        assert!(matrix.backtrack().is_empty());
        assert_eq!(matrix.get(0, 0), None);
    }
}
