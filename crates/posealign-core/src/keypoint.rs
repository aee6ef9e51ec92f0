//! Keypoint model - What the pose estimator hands us
//!
//! A video is a [`Sequence`] of frames. Each frame holds at most one selected
//! [`Pose`]; the pose is an ordered list of named 2D [`Keypoint`]s in the
//! estimator's pixel space.

use serde::{Deserialize, Serialize};

/// Named body landmark, COCO-17 layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    /// All parts in layout order
    pub fn all() -> &'static [BodyPart] {
        &[
            BodyPart::Nose,
            BodyPart::LeftEye,
            BodyPart::RightEye,
            BodyPart::LeftEar,
            BodyPart::RightEar,
            BodyPart::LeftShoulder,
            BodyPart::RightShoulder,
            BodyPart::LeftElbow,
            BodyPart::RightElbow,
            BodyPart::LeftWrist,
            BodyPart::RightWrist,
            BodyPart::LeftHip,
            BodyPart::RightHip,
            BodyPart::LeftKnee,
            BodyPart::RightKnee,
            BodyPart::LeftAnkle,
            BodyPart::RightAnkle,
        ]
    }

    /// Keypoint name as emitted by the estimator
    pub fn as_str(self) -> &'static str {
        match self {
            BodyPart::Nose => "nose",
            BodyPart::LeftEye => "left_eye",
            BodyPart::RightEye => "right_eye",
            BodyPart::LeftEar => "left_ear",
            BodyPart::RightEar => "right_ear",
            BodyPart::LeftShoulder => "left_shoulder",
            BodyPart::RightShoulder => "right_shoulder",
            BodyPart::LeftElbow => "left_elbow",
            BodyPart::RightElbow => "right_elbow",
            BodyPart::LeftWrist => "left_wrist",
            BodyPart::RightWrist => "right_wrist",
            BodyPart::LeftHip => "left_hip",
            BodyPart::RightHip => "right_hip",
            BodyPart::LeftKnee => "left_knee",
            BodyPart::RightKnee => "right_knee",
            BodyPart::LeftAnkle => "left_ankle",
            BodyPart::RightAnkle => "right_ankle",
        }
    }

    /// Parse from an estimator keypoint name
    pub fn from_name(name: &str) -> Option<Self> {
        BodyPart::all().iter().copied().find(|p| p.as_str() == name)
    }
}

/// A named 2D landmark with detection confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Landmark name (e.g. "right_shoulder")
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Confidence in [0, 1]; absent scores decode as 0
    #[serde(default)]
    pub score: f64,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64, score: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score,
        }
    }

    /// Confidence strictly above `min_score`
    #[inline]
    pub fn is_confident(&self, min_score: f64) -> bool {
        self.score > min_score
    }
}

/// One detected body in one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    /// Overall detection score, if the estimator reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            score: None,
        }
    }

    /// Number of keypoints
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// First keypoint with the given name
    pub fn find(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }

    /// First keypoint with the given name whose score exceeds `min_score`
    pub fn find_confident(&self, name: &str, min_score: f64) -> Option<&Keypoint> {
        self.keypoints
            .iter()
            .find(|kp| kp.name == name && kp.is_confident(min_score))
    }

    pub fn part(&self, part: BodyPart) -> Option<&Keypoint> {
        self.find(part.as_str())
    }
}

/// A frame's selected pose, `None` when nothing was detected
pub type Frame = Option<Pose>;

/// All frames of one video, in timeline order
pub type Sequence = Vec<Frame>;

/// Pick the pose the engine compares: the first one detected in the frame
pub fn select_primary(poses: &[Pose]) -> Frame {
    poses.first().cloned()
}

/// Reduce per-frame detections to a single-pose sequence
pub fn select_sequence<P: AsRef<[Pose]>>(frames: &[P]) -> Sequence {
    frames.iter().map(|poses| select_primary(poses.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(name: &str, score: f64) -> Keypoint {
        Keypoint::new(name, 1.0, 2.0, score)
    }

    #[test]
    fn test_body_part_names_round_trip() {
        for part in BodyPart::all() {
            assert_eq!(BodyPart::from_name(part.as_str()), Some(*part));
        }
        assert_eq!(BodyPart::all().len(), 17);
        assert_eq!(BodyPart::from_name("tail"), None);
    }

    #[test]
    fn test_find_confident_is_exclusive() {
        let pose = Pose::new(vec![kp("right_elbow", 0.3), kp("right_wrist", 0.31)]);

        assert!(pose.find("right_elbow").is_some());
        assert!(pose.find_confident("right_elbow", 0.3).is_none());
        assert!(pose.find_confident("right_wrist", 0.3).is_some());
    }

    #[test]
    fn test_find_confident_skips_low_duplicate() {
        let pose = Pose::new(vec![kp("right_hip", 0.1), kp("right_hip", 0.9)]);
        let found = pose.find_confident("right_hip", 0.3).map(|k| k.score);
        assert_eq!(found, Some(0.9));
    }

    #[test]
    fn test_select_primary_takes_first() {
        let a = Pose::new(vec![kp("nose", 0.9)]);
        let b = Pose::new(vec![kp("nose", 0.5), kp("left_eye", 0.5)]);

        assert_eq!(select_primary(&[a.clone(), b]), Some(a));
        assert_eq!(select_primary(&[]), None);
    }

    #[test]
    fn test_select_sequence_keeps_frame_count() {
        let frames: Vec<Vec<Pose>> = vec![vec![], vec![Pose::default()], vec![]];
        let seq = select_sequence(&frames);
        assert_eq!(seq.len(), 3);
        assert!(seq[0].is_none());
        assert!(seq[1].is_some());
    }

    #[test]
    fn test_keypoint_decodes_without_score() {
        let k: Keypoint = serde_json::from_str(r#"{"name":"nose","x":1.5,"y":2.5}"#).unwrap();
        assert_eq!(k.score, 0.0);
        assert_eq!(k.name, "nose");
    }
}
