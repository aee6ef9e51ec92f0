//! Comparison report - Everything one comparison produces
//!
//! The frame-major [`FrameDeviations`] is what an overlay renders. The path,
//! aligned angle sequences and angle-major deviation are kept for diagnostics.

use posealign_core::{AngleChannel, AngleVector, ChannelValues, FrameClock, ANGLE_CHANNELS};
use posealign_dtw::{AlignmentPath, MetricKind};
use posealign_score::{
    segment_tiers, DeviationMatrix, FrameDeviations, SeverityThresholds, SeverityTier,
    SEGMENT_COUNT,
};
use serde::{Deserialize, Serialize};

/// Summary of one channel's deviation over the scored steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub channel: AngleChannel,
    /// `None` when no step was scored
    pub mean: Option<f64>,
    pub max: Option<f64>,
}

/// Comparison counters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonStats {
    pub reference_frames: usize,
    pub target_frames: usize,
    pub path_len: usize,
    /// Aligned steps with a detection on both sides
    pub scored_steps: usize,
    pub skipped_steps: usize,
    /// Target frames that received a value before gap filling
    pub measured_frames: usize,
    pub channels: Vec<ChannelStats>,
}

impl ComparisonStats {
    pub(crate) fn collect(
        reference_frames: usize,
        deviation: &DeviationMatrix,
        frames: &FrameDeviations,
    ) -> Self {
        Self {
            reference_frames,
            target_frames: frames.len(),
            path_len: deviation.path_len(),
            scored_steps: deviation.len(),
            skipped_steps: deviation.skipped(),
            measured_frames: frames.measured_count(),
            channels: AngleChannel::all()
                .into_iter()
                .map(|channel| ChannelStats {
                    channel,
                    mean: deviation.mean(channel),
                    max: deviation.max(channel),
                })
                .collect(),
        }
    }

    pub fn channel(&self, channel: AngleChannel) -> Option<&ChannelStats> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

/// Result of comparing a target performance against a reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub metric: MetricKind,
    pub path: AlignmentPath,
    pub total_cost: f64,
    /// Angles of `reference[path[k].reference]` for every step `k`
    pub aligned_reference: Vec<AngleVector>,
    /// Angles of `target[path[k].target]` for every step `k`
    pub aligned_target: Vec<AngleVector>,
    /// Per-channel differences of the scored steps, with their path indices
    pub deviation: DeviationMatrix,
    /// One difference vector per target frame
    pub frame_deviations: FrameDeviations,
    /// Per-channel cosine similarity for every path step
    pub similarity: [Vec<f64>; ANGLE_CHANNELS],
    pub stats: ComparisonStats,
    pub thresholds: SeverityThresholds,
    pub clock: FrameClock,
}

impl ComparisonReport {
    /// Deviation shown for target frame `frame`
    pub fn deviation_at(&self, frame: usize) -> Option<&ChannelValues> {
        self.frame_deviations.get(frame)
    }

    /// Per-channel tier of target frame `frame`
    pub fn severity_at(&self, frame: usize) -> Option<[SeverityTier; ANGLE_CHANNELS]> {
        self.deviation_at(frame)
            .map(|values| self.thresholds.classify_frame(values))
    }

    /// Per-segment tier of target frame `frame`, in [`posealign_score::SkeletonSegment`] order
    pub fn segment_severity_at(&self, frame: usize) -> Option<[SeverityTier; SEGMENT_COUNT]> {
        self.deviation_at(frame)
            .map(|values| segment_tiers(values, &self.thresholds))
    }

    /// Target frame at playback time `seconds`, `None` past the last frame
    pub fn frame_at_time(&self, seconds: f64) -> Option<usize> {
        self.clock
            .frame_at(seconds)
            .filter(|frame| *frame < self.frame_deviations.len())
    }

    /// Worst tier over every channel of every target frame
    pub fn worst_severity(&self) -> SeverityTier {
        self.frame_deviations
            .values()
            .iter()
            .flat_map(|values| self.thresholds.classify_frame(values))
            .max()
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
