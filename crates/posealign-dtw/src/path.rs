//! Alignment path - Index pairs produced by DTW backtracking

use serde::{Deserialize, Serialize};

/// One matched pair: `reference[reference]` is aligned with `target[target]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentStep {
    pub reference: usize,
    pub target: usize,
}

impl AlignmentStep {
    pub const fn new(reference: usize, target: usize) -> Self {
        Self { reference, target }
    }
}

impl From<(usize, usize)> for AlignmentStep {
    fn from((reference, target): (usize, usize)) -> Self {
        Self { reference, target }
    }
}

/// Monotonic path from `(0, 0)` to `(n - 1, m - 1)`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlignmentPath {
    steps: Vec<AlignmentStep>,
}

impl AlignmentPath {
    pub fn new(steps: Vec<AlignmentStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[AlignmentStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<AlignmentStep> {
        self.steps.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlignmentStep> {
        self.steps.iter()
    }

    pub fn first(&self) -> Option<AlignmentStep> {
        self.steps.first().copied()
    }

    pub fn last(&self) -> Option<AlignmentStep> {
        self.steps.last().copied()
    }

    /// Does every step advance by (1,0), (0,1) or (1,1) between the two corners?
    ///
    /// An empty path is valid only when one of the sequences is empty.
    pub fn is_valid_for(&self, reference_len: usize, target_len: usize) -> bool {
        if reference_len == 0 || target_len == 0 {
            return self.is_empty();
        }
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return false;
        };
        if first != AlignmentStep::new(0, 0)
            || last != AlignmentStep::new(reference_len - 1, target_len - 1)
        {
            return false;
        }
        self.steps.windows(2).all(|pair| {
            let di = pair[1].reference.checked_sub(pair[0].reference);
            let dj = pair[1].target.checked_sub(pair[0].target);
            matches!((di, dj), (Some(0), Some(1)) | (Some(1), Some(0)) | (Some(1), Some(1)))
        })
    }

    /// Does every step pair equal indices?
    pub fn is_diagonal(&self) -> bool {
        self.steps.iter().all(|s| s.reference == s.target)
    }
}

impl<'a> IntoIterator for &'a AlignmentPath {
    type Item = &'a AlignmentStep;
    type IntoIter = std::slice::Iter<'a, AlignmentStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl From<Vec<(usize, usize)>> for AlignmentPath {
    fn from(pairs: Vec<(usize, usize)>) -> Self {
        Self::new(pairs.into_iter().map(AlignmentStep::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_path() {
        let path = AlignmentPath::from(vec![(0, 0), (1, 0), (2, 1), (2, 2)]);
        assert!(path.is_valid_for(3, 3));
        assert!(!path.is_valid_for(3, 4));
    }

    #[test]
    fn test_path_rejects_jumps_and_stalls() {
        let jump = AlignmentPath::from(vec![(0, 0), (2, 1), (2, 2)]);
        assert!(!jump.is_valid_for(3, 3));

        let stall = AlignmentPath::from(vec![(0, 0), (0, 0), (1, 1)]);
        assert!(!stall.is_valid_for(2, 2));

        let backwards = AlignmentPath::from(vec![(0, 0), (1, 1), (0, 1), (1, 1)]);
        assert!(!backwards.is_valid_for(2, 2));
    }

    #[test]
    fn test_empty_path_validity() {
        assert!(AlignmentPath::default().is_valid_for(0, 5));
        assert!(!AlignmentPath::default().is_valid_for(1, 1));
    }

    #[test]
    fn test_diagonal() {
        assert!(AlignmentPath::from(vec![(0, 0), (1, 1)]).is_diagonal());
        assert!(!AlignmentPath::from(vec![(0, 0), (0, 1)]).is_diagonal());
    }

    #[test]
    fn test_path_serializes_as_pairs() {
        let path = AlignmentPath::from(vec![(0, 0), (1, 0)]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(
            json,
            r#"[{"reference":0,"target":0},{"reference":1,"target":0}]"#
        );
    }
}
