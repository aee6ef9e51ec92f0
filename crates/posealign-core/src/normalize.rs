//! Keypoint normalization
//!
//! Removes frame position and subject scale before keypoint-level comparison:
//! coordinates are re-centered on the hip midpoint and divided by shoulder width.

use crate::{BodyPart, Keypoint, Pose};

/// Hip midpoint and shoulder width, if the pose has all four anchor keypoints
pub fn body_frame(pose: &Pose) -> Option<((f64, f64), f64)> {
    let left_hip = pose.part(BodyPart::LeftHip)?;
    let right_hip = pose.part(BodyPart::RightHip)?;
    let left_shoulder = pose.part(BodyPart::LeftShoulder)?;
    let right_shoulder = pose.part(BodyPart::RightShoulder)?;

    let center = (
        (left_hip.x + right_hip.x) / 2.0,
        (left_hip.y + right_hip.y) / 2.0,
    );
    let width = (left_shoulder.x - right_shoulder.x).hypot(left_shoulder.y - right_shoulder.y);
    // zero width keeps the centering but skips the scaling
    let scale = if width > 0.0 { width } else { 1.0 };
    Some((center, scale))
}

/// Hip-centered, shoulder-width scaled copy of `pose`
///
/// Poses without both hips and both shoulders are returned unchanged.
pub fn normalize_pose(pose: &Pose) -> Pose {
    let Some(((cx, cy), scale)) = body_frame(pose) else {
        return pose.clone();
    };

    Pose {
        keypoints: pose
            .keypoints
            .iter()
            .map(|kp| Keypoint {
                name: kp.name.clone(),
                x: (kp.x - cx) / scale,
                y: (kp.y - cy) / scale,
                score: kp.score,
            })
            .collect(),
        score: pose.score,
    }
}
