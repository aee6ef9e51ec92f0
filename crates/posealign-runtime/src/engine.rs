//! Comparison engine - Extract, align, score, remap
//!
//! One call runs the whole pipeline for a reference/target pair:
//! 1. Select the aligned representation (angle vectors or raw poses)
//! 2. Align with DTW under the configured metric
//! 3. Score per-angle deviation along the path
//! 4. Remap onto target frames and fill gaps
//!
//! The engine holds no mutable state, so one instance can serve concurrent
//! requests; [`ComparisonEngine::compare_batch`] runs a batch on the rayon pool.

use posealign_core::{AngleExtractor, AngleVector, Frame, PoseAlignResult, Sequence};
use posealign_dtw::{Alignment, CosineKeypoints, DtwAligner, EuclideanAngles, MetricKind};
use posealign_score::{remap_to_target_frames, score_deviation, similarity_per_angle};
use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::{ComparisonConfig, ComparisonReport, ComparisonStats};

/// A reference/target pair for batch comparison
#[derive(Debug, Clone, Default)]
pub struct ComparisonRequest {
    pub reference: Sequence,
    pub target: Sequence,
}

impl ComparisonRequest {
    pub fn new(reference: Sequence, target: Sequence) -> Self {
        Self { reference, target }
    }
}

/// Pose comparison engine
#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    config: ComparisonConfig,
    extractor: AngleExtractor,
    aligner: DtwAligner,
    cosine: CosineKeypoints,
}

impl ComparisonEngine {
    /// Engine with the default configuration
    pub fn new() -> Self {
        Self::build(ComparisonConfig::default())
    }

    /// Engine with a validated configuration
    pub fn with_config(config: ComparisonConfig) -> PoseAlignResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ComparisonConfig) -> Self {
        Self {
            extractor: AngleExtractor::new(config.extractor),
            aligner: DtwAligner::new(config.aligner),
            cosine: CosineKeypoints::new(config.cosine.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Compare two pose sequences under the configured metric
    pub fn compare(
        &self,
        reference: &[Frame],
        target: &[Frame],
    ) -> PoseAlignResult<ComparisonReport> {
        let span = info_span!(
            "compare",
            metric = %self.config.metric,
            reference_frames = reference.len(),
            target_frames = target.len()
        );
        let _enter = span.enter();

        let alignment = match self.config.metric {
            MetricKind::EuclideanAngles => {
                let reference_angles = self.extractor.extract_sequence(reference);
                let target_angles = self.extractor.extract_sequence(target);
                self.aligner
                    .align(&reference_angles, &target_angles, &EuclideanAngles)?
            }
            MetricKind::CosineKeypoints => {
                let poses = self.aligner.align(reference, target, &self.cosine)?;
                Alignment {
                    aligned_reference: self.extractor.extract_sequence(&poses.aligned_reference),
                    aligned_target: self.extractor.extract_sequence(&poses.aligned_target),
                    path: poses.path,
                    total_cost: poses.total_cost,
                }
            }
        };

        self.score(self.config.metric, alignment, reference.len(), target.len())
    }

    /// Compare two already-extracted angle sequences
    ///
    /// Angle vectors carry no keypoints, so this always aligns with
    /// [`EuclideanAngles`] whatever the configured metric.
    pub fn compare_angles(
        &self,
        reference: &[AngleVector],
        target: &[AngleVector],
    ) -> PoseAlignResult<ComparisonReport> {
        let span = info_span!(
            "compare_angles",
            reference_frames = reference.len(),
            target_frames = target.len()
        );
        let _enter = span.enter();

        let alignment = self.aligner.align(reference, target, &EuclideanAngles)?;
        self.score(
            MetricKind::EuclideanAngles,
            alignment,
            reference.len(),
            target.len(),
        )
    }

    /// Run independent comparisons in parallel, results in request order
    pub fn compare_batch(
        &self,
        requests: &[ComparisonRequest],
    ) -> Vec<PoseAlignResult<ComparisonReport>> {
        debug!(requests = requests.len(), "running comparison batch");
        requests
            .par_iter()
            .map(|request| self.compare(&request.reference, &request.target))
            .collect()
    }

    fn score(
        &self,
        metric: MetricKind,
        alignment: Alignment<AngleVector>,
        reference_frames: usize,
        target_frames: usize,
    ) -> PoseAlignResult<ComparisonReport> {
        let Alignment {
            aligned_reference,
            aligned_target,
            path,
            total_cost,
        } = alignment;

        let deviation = score_deviation(&aligned_reference, &aligned_target)?;
        let frame_deviations =
            remap_to_target_frames(&deviation, &path, target_frames, self.config.gap_fill)?;
        let similarity = similarity_per_angle(&aligned_reference, &aligned_target)?;
        let stats = ComparisonStats::collect(reference_frames, &deviation, &frame_deviations);

        info!(
            path_len = stats.path_len,
            scored = stats.scored_steps,
            skipped = stats.skipped_steps,
            total_cost,
            "comparison complete"
        );

        Ok(ComparisonReport {
            metric,
            path,
            total_cost,
            aligned_reference,
            aligned_target,
            deviation,
            frame_deviations,
            similarity,
            stats,
            thresholds: self.config.severity,
            clock: self.config.clock(),
        })
    }
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new()
    }
}
