//! Severity tiers and skeleton segment propagation
//!
//! Raw degree differences are bucketed against two thresholds. Each angle
//! colors the two skeleton segments around its vertex; a segment shared by
//! two angles takes the more severe tier.

use posealign_core::{
    AngleChannel, BodyPart, ChannelValues, PoseAlignError, PoseAlignResult, ANGLE_CHANNELS,
};
use serde::{Deserialize, Serialize};

/// Thresholds in degrees, both exclusive lower bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    /// Above this a difference is at least medium
    pub medium: f64,
    /// Above this a difference is high
    pub high: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            medium: 10.0,
            high: 20.0,
        }
    }
}

impl SeverityThresholds {
    pub fn validate(&self) -> PoseAlignResult<()> {
        if !(self.medium.is_finite() && self.high.is_finite()) {
            return Err(PoseAlignError::InvalidConfig(
                "severity thresholds must be finite".into(),
            ));
        }
        if self.medium < 0.0 || self.medium > self.high {
            return Err(PoseAlignError::InvalidConfig(format!(
                "severity thresholds out of order: medium {} high {}",
                self.medium, self.high
            )));
        }
        Ok(())
    }

    pub fn classify(&self, difference: f64) -> SeverityTier {
        if difference > self.high {
            SeverityTier::High
        } else if difference > self.medium {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }

    /// Tier of every channel of one frame
    pub fn classify_frame(&self, values: &ChannelValues) -> [SeverityTier; ANGLE_CHANNELS] {
        values.map(|v| self.classify(v))
    }
}

/// Severity of a deviation, ordered low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    #[default]
    Low,
    Medium,
    High,
}

impl SeverityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

/// Right-side skeleton line segments drawn by an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonSegment {
    ShoulderElbow,
    ElbowWrist,
    HipShoulder,
    HipKnee,
    KneeAnkle,
}

pub const SEGMENT_COUNT: usize = 5;

impl SkeletonSegment {
    pub fn all() -> [SkeletonSegment; SEGMENT_COUNT] {
        [
            SkeletonSegment::ShoulderElbow,
            SkeletonSegment::ElbowWrist,
            SkeletonSegment::HipShoulder,
            SkeletonSegment::HipKnee,
            SkeletonSegment::KneeAnkle,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn endpoints(self) -> (BodyPart, BodyPart) {
        match self {
            SkeletonSegment::ShoulderElbow => (BodyPart::RightShoulder, BodyPart::RightElbow),
            SkeletonSegment::ElbowWrist => (BodyPart::RightElbow, BodyPart::RightWrist),
            SkeletonSegment::HipShoulder => (BodyPart::RightHip, BodyPart::RightShoulder),
            SkeletonSegment::HipKnee => (BodyPart::RightHip, BodyPart::RightKnee),
            SkeletonSegment::KneeAnkle => (BodyPart::RightKnee, BodyPart::RightAnkle),
        }
    }
}

/// The two segments meeting at a channel's vertex
pub fn channel_segments(channel: AngleChannel) -> [SkeletonSegment; 2] {
    match channel {
        AngleChannel::Elbow => [SkeletonSegment::ShoulderElbow, SkeletonSegment::ElbowWrist],
        AngleChannel::Knee => [SkeletonSegment::HipKnee, SkeletonSegment::KneeAnkle],
        AngleChannel::Armpit => [SkeletonSegment::HipShoulder, SkeletonSegment::ShoulderElbow],
        AngleChannel::Trunk => [SkeletonSegment::HipShoulder, SkeletonSegment::HipKnee],
    }
}

/// Per-segment tier of one frame, most severe angle wins
pub fn segment_tiers(
    values: &ChannelValues,
    thresholds: &SeverityThresholds,
) -> [SeverityTier; SEGMENT_COUNT] {
    let mut tiers = [SeverityTier::Low; SEGMENT_COUNT];
    for channel in AngleChannel::all() {
        let tier = thresholds.classify(values[channel.index()]);
        for segment in channel_segments(channel) {
            let slot = &mut tiers[segment.index()];
            *slot = (*slot).max(tier);
        }
    }
    tiers
}
