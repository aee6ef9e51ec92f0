//! Angle Extractor - Joint angles from one frame's keypoints
//!
//! Every frame is reduced to four right-side included angles in degrees:
//! elbow, knee, armpit and trunk. A pose missing any of the six required
//! keypoints yields [`AngleVector::UNDETECTED`], which carries an explicit
//! `detected = false` flag next to its all-zero values.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BodyPart, Frame, Pose};

/// Number of tracked angle channels
pub const ANGLE_CHANNELS: usize = 4;

/// Per-channel values in [`AngleChannel`] order
pub type ChannelValues = [f64; ANGLE_CHANNELS];

/// Default keypoint confidence threshold (exclusive)
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

/// Tracked joint-angle definitions, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleChannel {
    /// shoulder - elbow - wrist
    Elbow = 0,
    /// hip - knee - ankle
    Knee = 1,
    /// hip - shoulder - elbow
    Armpit = 2,
    /// shoulder - hip - knee
    Trunk = 3,
}

impl AngleChannel {
    /// All channels in vector order
    pub fn all() -> [AngleChannel; ANGLE_CHANNELS] {
        [
            AngleChannel::Elbow,
            AngleChannel::Knee,
            AngleChannel::Armpit,
            AngleChannel::Trunk,
        ]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// (proximal, vertex, distal) keypoints of the angle
    pub fn joints(self) -> (BodyPart, BodyPart, BodyPart) {
        match self {
            AngleChannel::Elbow => (
                BodyPart::RightShoulder,
                BodyPart::RightElbow,
                BodyPart::RightWrist,
            ),
            AngleChannel::Knee => (BodyPart::RightHip, BodyPart::RightKnee, BodyPart::RightAnkle),
            AngleChannel::Armpit => (
                BodyPart::RightHip,
                BodyPart::RightShoulder,
                BodyPart::RightElbow,
            ),
            AngleChannel::Trunk => (
                BodyPart::RightShoulder,
                BodyPart::RightHip,
                BodyPart::RightKnee,
            ),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AngleChannel::Elbow => "elbow",
            AngleChannel::Knee => "knee",
            AngleChannel::Armpit => "armpit",
            AngleChannel::Trunk => "trunk",
        }
    }
}

/// Keypoints that must all be confident for a frame to produce angles
pub const REQUIRED_PARTS: [BodyPart; 6] = [
    BodyPart::RightShoulder,
    BodyPart::RightElbow,
    BodyPart::RightWrist,
    BodyPart::RightHip,
    BodyPart::RightKnee,
    BodyPart::RightAnkle,
];

/// Four joint angles in degrees plus a detection flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleVector {
    pub values: ChannelValues,
    pub detected: bool,
}

impl AngleVector {
    /// Sentinel for a frame without a usable detection
    pub const UNDETECTED: AngleVector = AngleVector {
        values: [0.0; ANGLE_CHANNELS],
        detected: false,
    };

    /// A detected reading
    pub const fn new(values: ChannelValues) -> Self {
        Self {
            values,
            detected: true,
        }
    }

    #[inline]
    pub fn get(&self, channel: AngleChannel) -> f64 {
        self.values[channel.index()]
    }

    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Per-channel absolute difference in degrees
    pub fn abs_diff(&self, other: &AngleVector) -> ChannelValues {
        let mut out = [0.0; ANGLE_CHANNELS];
        for (c, slot) in out.iter_mut().enumerate() {
            *slot = (self.values[c] - other.values[c]).abs();
        }
        out
    }
}

impl Default for AngleVector {
    fn default() -> Self {
        Self::UNDETECTED
    }
}

/// Included angle at `b` between rays b->a and b->c, in degrees within [0, 180]
pub fn included_angle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let radians = (c.1 - b.1).atan2(c.0 - b.0) - (a.1 - b.1).atan2(a.0 - b.0);
    let degrees = (radians.to_degrees()).abs();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Extractor configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// A keypoint qualifies only when its score is strictly above this
    pub min_score: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Converts poses to angle vectors
#[derive(Debug, Clone, Default)]
pub struct AngleExtractor {
    config: ExtractorConfig,
}

impl AngleExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Angles for one pose, [`AngleVector::UNDETECTED`] if a required keypoint is missing
    pub fn extract(&self, pose: &Pose) -> AngleVector {
        let mut points = [(0.0, 0.0); REQUIRED_PARTS.len()];
        for (slot, part) in points.iter_mut().zip(REQUIRED_PARTS.iter()) {
            match pose.find_confident(part.as_str(), self.config.min_score) {
                Some(kp) => *slot = (kp.x, kp.y),
                None => return AngleVector::UNDETECTED,
            }
        }

        let [shoulder, elbow, wrist, hip, knee, ankle] = points;
        AngleVector::new([
            included_angle(shoulder, elbow, wrist),
            included_angle(hip, knee, ankle),
            included_angle(hip, shoulder, elbow),
            included_angle(shoulder, hip, knee),
        ])
    }

    pub fn extract_frame(&self, frame: &Frame) -> AngleVector {
        frame
            .as_ref()
            .map_or(AngleVector::UNDETECTED, |pose| self.extract(pose))
    }

    /// One angle vector per frame, in order
    pub fn extract_sequence(&self, frames: &[Frame]) -> Vec<AngleVector> {
        let angles: Vec<AngleVector> = frames.iter().map(|f| self.extract_frame(f)).collect();
        debug!(
            frames = angles.len(),
            undetected = angles.iter().filter(|a| !a.detected).count(),
            "extracted angle sequence"
        );
        angles
    }
}

/// [`AngleExtractor::extract`] with the default threshold
pub fn extract_angles(pose: &Pose) -> AngleVector {
    AngleExtractor::default().extract(pose)
}

/// [`AngleExtractor::extract_sequence`] with the default threshold
pub fn extract_sequence(frames: &[Frame]) -> Vec<AngleVector> {
    AngleExtractor::default().extract_sequence(frames)
}
