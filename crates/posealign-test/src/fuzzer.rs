//! Alignment Fuzzer - Randomized checks of the comparison pipeline
//!
//! Tests:
//! - Path validity (corners, monotonic unit steps)
//! - Aligned length invariant
//! - Identity alignment is free and diagonal
//! - Deviation entries follow the path; skipped steps leave no entry
//! - Remapped output covers every target frame, last write wins

use posealign_core::{AngleVector, ANGLE_CHANNELS};
use posealign_runtime::{ComparisonEngine, ComparisonReport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct AlignmentFuzzConfig {
    /// Number of random comparisons
    pub iterations: usize,
    /// Longest generated sequence (sequences may be empty)
    pub max_frames: usize,
    /// Probability that a generated frame is undetected
    pub undetected_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for AlignmentFuzzConfig {
    fn default() -> Self {
        AlignmentFuzzConfig {
            iterations: 200,
            max_frames: 48,
            undetected_prob: 0.15,
            seed: 42,
        }
    }
}

impl AlignmentFuzzConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        AlignmentFuzzConfig {
            iterations: 40,
            max_frames: 16,
            undetected_prob: 0.1,
            seed: 42,
        }
    }

    /// Long sequences, mostly undetected frames
    pub fn stress() -> Self {
        AlignmentFuzzConfig {
            iterations: 100,
            max_frames: 200,
            undetected_prob: 0.6,
            seed: 42,
        }
    }
}

/// Invariant violations counted over a fuzz run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignmentFuzzResult {
    pub iterations: usize,
    /// Comparisons that returned an error
    pub errors: u32,
    pub invalid_paths: u32,
    pub length_violations: u32,
    pub identity_violations: u32,
    pub deviation_violations: u32,
    pub coverage_violations: u32,
}

impl AlignmentFuzzResult {
    pub fn is_valid(&self) -> bool {
        self.errors == 0
            && self.invalid_paths == 0
            && self.length_violations == 0
            && self.identity_violations == 0
            && self.deviation_violations == 0
            && self.coverage_violations == 0
    }
}

/// Alignment fuzzer
pub struct AlignmentFuzzer {
    config: AlignmentFuzzConfig,
    engine: ComparisonEngine,
    rng: StdRng,
}

impl AlignmentFuzzer {
    pub fn new(config: AlignmentFuzzConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        AlignmentFuzzer {
            config,
            engine: ComparisonEngine::new(),
            rng,
        }
    }

    /// Random angle sequence of `len` frames
    pub fn random_angles(&mut self, len: usize) -> Vec<AngleVector> {
        let undetected = self.config.undetected_prob.clamp(0.0, 1.0);
        (0..len)
            .map(|_| {
                if self.rng.gen_bool(undetected) {
                    AngleVector::UNDETECTED
                } else {
                    let mut values = [0.0; ANGLE_CHANNELS];
                    for v in values.iter_mut() {
                        *v = self.rng.gen_range(0.0..=180.0);
                    }
                    AngleVector::new(values)
                }
            })
            .collect()
    }

    /// Run the fuzzer
    pub fn run(&mut self) -> AlignmentFuzzResult {
        let mut result = AlignmentFuzzResult {
            iterations: self.config.iterations,
            ..AlignmentFuzzResult::default()
        };

        for _ in 0..self.config.iterations {
            let n = self.rng.gen_range(0..=self.config.max_frames);
            let m = self.rng.gen_range(0..=self.config.max_frames);
            let reference = self.random_angles(n);
            let target = self.random_angles(m);

            let Ok(report) = self.engine.compare_angles(&reference, &target) else {
                result.errors += 1;
                continue;
            };
            if !report.path.is_valid_for(n, m) {
                result.invalid_paths += 1;
            }
            if !properties::aligned_lengths_match(&report) {
                result.length_violations += 1;
            }
            if !properties::deviation_follows_path(&report) {
                result.deviation_violations += 1;
            }
            if !properties::remap_is_last_write(&report, m) {
                result.coverage_violations += 1;
            }

            match self.engine.compare_angles(&reference, &reference) {
                Ok(identity) => {
                    if identity.total_cost != 0.0 || !identity.path.is_diagonal() {
                        result.identity_violations += 1;
                    }
                }
                Err(_) => result.errors += 1,
            }
        }

        result
    }
}

/// Invariants of a single [`ComparisonReport`]
pub mod properties {
    use super::*;

    /// Aligned sequences and similarities have one entry per path step
    pub fn aligned_lengths_match(report: &ComparisonReport) -> bool {
        let len = report.path.len();
        report.aligned_reference.len() == len
            && report.aligned_target.len() == len
            && report.similarity.iter().all(|channel| channel.len() == len)
            && report.deviation.path_len() == len
    }

    /// Entry `k` is the difference at path step `steps[k]`, and exactly the
    /// steps with two detections are scored
    pub fn deviation_follows_path(report: &ComparisonReport) -> bool {
        let steps = report.deviation.steps();
        if steps.windows(2).any(|pair| pair[0] >= pair[1]) {
            return false;
        }
        let expected_scored = report
            .aligned_reference
            .iter()
            .zip(&report.aligned_target)
            .filter(|(r, t)| r.detected && t.detected)
            .count();
        if expected_scored != report.deviation.len() {
            return false;
        }
        steps.iter().enumerate().all(|(k, &step)| {
            let expected =
                report.aligned_reference[step].abs_diff(&report.aligned_target[step]);
            report.deviation.entry(k) == Some(expected)
        })
    }

    /// Every target frame is set; measured frames hold the last entry mapped to them
    pub fn remap_is_last_write(report: &ComparisonReport, target_len: usize) -> bool {
        let frames = &report.frame_deviations;
        if frames.len() != target_len {
            return false;
        }

        let mut last = vec![None; target_len];
        for (k, &step) in report.deviation.steps().iter().enumerate() {
            let Some(path_step) = report.path.get(step) else {
                return false;
            };
            last[path_step.target] = report.deviation.entry(k);
        }

        (0..target_len).all(|frame| match last[frame] {
            Some(expected) => frames.is_measured(frame) && frames.get(frame) == Some(&expected),
            None => {
                !frames.is_measured(frame)
                    && frames
                        .get(frame)
                        .is_some_and(|v| v.iter().all(|x| x.is_finite()))
            }
        })
    }
}
