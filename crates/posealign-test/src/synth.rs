//! Motion Synthesizer - Seeded synthetic pose sequences
//!
//! Generates a repetitive exercise (arm raise with a squat) as full 17-keypoint
//! poses in pixel space. A performance can be replayed at another tempo or
//! amplitude, with positional jitter, low-confidence keypoints and dropped
//! frames, so comparisons can be exercised without a pose estimator.

use std::f64::consts::PI;

use posealign_core::{BodyPart, Keypoint, Pose, Sequence};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthesizer configuration
#[derive(Clone, Debug)]
pub struct SynthConfig {
    /// Frames per generated sequence
    pub frames: usize,
    /// Exercise repetitions per sequence
    pub cycles: f64,
    /// Peak arm raise in degrees; the other joints move in proportion
    pub amplitude: f64,
    /// Uniform positional noise in pixels
    pub jitter_px: f64,
    /// Probability that a frame has no detection
    pub dropout_prob: f64,
    /// Probability that one keypoint of a frame drops below the confidence threshold
    pub low_confidence_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            frames: 90,
            cycles: 2.0,
            amplitude: 90.0,
            jitter_px: 1.0,
            dropout_prob: 0.05,
            low_confidence_prob: 0.05,
            seed: 7,
        }
    }
}

impl SynthConfig {
    /// Noise-free motion for exact expectations
    pub fn clean() -> Self {
        SynthConfig {
            jitter_px: 0.0,
            dropout_prob: 0.0,
            low_confidence_prob: 0.0,
            ..SynthConfig::default()
        }
    }

    /// Long, noisy sequences
    pub fn stress() -> Self {
        SynthConfig {
            frames: 600,
            cycles: 8.0,
            jitter_px: 4.0,
            dropout_prob: 0.15,
            low_confidence_prob: 0.15,
            ..SynthConfig::default()
        }
    }
}

const HIP_CENTER: (f64, f64) = (320.0, 300.0);
const HIP_HALF_WIDTH: f64 = 25.0;
const TORSO: f64 = 150.0;
const UPPER_ARM: f64 = 70.0;
const FOREARM: f64 = 60.0;
const THIGH: f64 = 90.0;
const SHIN: f64 = 90.0;
const HIGH_SCORE: f64 = 0.9;
const LOW_SCORE: f64 = 0.1;

/// End of a limb of `length` leaving `from` at `degrees` from straight down
///
/// `side` is -1 for the right side of the body and +1 for the left.
fn limb(from: (f64, f64), length: f64, degrees: f64, side: f64) -> (f64, f64) {
    let radians = degrees.to_radians();
    (
        from.0 + side * length * radians.sin(),
        from.1 + length * radians.cos(),
    )
}

/// Seeded pose sequence generator
pub struct MotionSynth {
    config: SynthConfig,
    rng: StdRng,
}

impl MotionSynth {
    pub fn new(config: SynthConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        MotionSynth { config, rng }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Exercise progress in [0, 1] at frame `t`, played at `tempo`
    fn progress(&self, t: f64, tempo: f64) -> f64 {
        let period = self.config.frames.max(1) as f64 / self.config.cycles;
        0.5 - 0.5 * (2.0 * PI * t * tempo / period).cos()
    }

    /// Noise-free keypoint positions at exercise progress `s`, in [`BodyPart::all`] order
    pub fn skeleton(&self, s: f64, amplitude: f64) -> Vec<(f64, f64)> {
        let arm_raise = amplitude * s;
        let elbow_flex = amplitude * 0.5 * s;
        let hip_flex = amplitude * 0.4 * s;
        let knee_flex = amplitude * 0.8 * s;
        let lean = amplitude * 0.1 * s;

        let mut points = Vec::with_capacity(BodyPart::all().len());
        for part in BodyPart::all() {
            let side = if part.as_str().starts_with("left") {
                1.0
            } else {
                -1.0
            };
            let hip = (HIP_CENTER.0 + side * HIP_HALF_WIDTH, HIP_CENTER.1);
            let shoulder = limb(hip, TORSO, 180.0 + lean, side);
            let elbow = limb(shoulder, UPPER_ARM, arm_raise, side);
            let knee = limb(hip, THIGH, hip_flex, side);
            let neck = (HIP_CENTER.0, shoulder.1);

            let point = match part {
                BodyPart::Nose => (neck.0, neck.1 - 40.0),
                BodyPart::LeftEye | BodyPart::RightEye => (neck.0 + side * 8.0, neck.1 - 48.0),
                BodyPart::LeftEar | BodyPart::RightEar => (neck.0 + side * 16.0, neck.1 - 44.0),
                BodyPart::LeftShoulder | BodyPart::RightShoulder => shoulder,
                BodyPart::LeftElbow | BodyPart::RightElbow => elbow,
                BodyPart::LeftWrist | BodyPart::RightWrist => {
                    limb(elbow, FOREARM, arm_raise + elbow_flex, side)
                }
                BodyPart::LeftHip | BodyPart::RightHip => hip,
                BodyPart::LeftKnee | BodyPart::RightKnee => knee,
                BodyPart::LeftAnkle | BodyPart::RightAnkle => {
                    limb(knee, SHIN, hip_flex - knee_flex, side)
                }
            };
            points.push(point);
        }
        points
    }

    /// One noisy pose at exercise progress `s`
    pub fn pose_at(&mut self, s: f64, amplitude: f64) -> Pose {
        let jitter = self.config.jitter_px;
        let mut keypoints: Vec<Keypoint> = BodyPart::all()
            .iter()
            .zip(self.skeleton(s, amplitude))
            .map(|(part, (x, y))| {
                let (dx, dy) = if jitter > 0.0 {
                    (
                        self.rng.gen_range(-jitter..jitter),
                        self.rng.gen_range(-jitter..jitter),
                    )
                } else {
                    (0.0, 0.0)
                };
                Keypoint::new(part.as_str(), x + dx, y + dy, HIGH_SCORE)
            })
            .collect();

        if self.rng.gen_bool(self.config.low_confidence_prob.clamp(0.0, 1.0)) {
            let index = self.rng.gen_range(0..keypoints.len());
            keypoints[index].score = LOW_SCORE;
        }

        let mut pose = Pose::new(keypoints);
        pose.score = Some(HIGH_SCORE);
        pose
    }

    /// A performance of `frames` frames at `tempo`
    ///
    /// At tempo 1.0 the exercise repeats `cycles` times every `frames` configured frames.
    pub fn performance(&mut self, frames: usize, tempo: f64, amplitude: f64) -> Sequence {
        (0..frames)
            .map(|t| {
                if self.rng.gen_bool(self.config.dropout_prob.clamp(0.0, 1.0)) {
                    return None;
                }
                let s = self.progress(t as f64, tempo);
                Some(self.pose_at(s, amplitude))
            })
            .collect()
    }

    /// A performance with the configured length, tempo 1 and amplitude
    pub fn sequence(&mut self) -> Sequence {
        let (frames, amplitude) = (self.config.frames, self.config.amplitude);
        self.performance(frames, 1.0, amplitude)
    }

    /// Raw estimator-style detections: every frame holds 0..=2 poses, the first
    /// one being the performer
    pub fn detections(&mut self, frames: usize) -> Vec<Vec<Pose>> {
        let amplitude = self.config.amplitude;
        self.performance(frames, 1.0, amplitude)
            .into_iter()
            .map(|frame| match frame {
                None => Vec::new(),
                Some(performer) => {
                    let mut poses = vec![performer];
                    if self.rng.gen_bool(0.2) {
                        let s = self.rng.gen_range(0.0..1.0);
                        poses.push(self.pose_at(s, amplitude));
                    }
                    poses
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posealign_core::{extract_sequence, AngleChannel};

    #[test]
    fn test_same_seed_same_sequence() {
        let a = MotionSynth::new(SynthConfig::default()).sequence();
        let b = MotionSynth::new(SynthConfig::default()).sequence();
        assert_eq!(a, b);
    }

    #[test]
    fn test_clean_sequence_is_fully_detected() {
        let sequence = MotionSynth::new(SynthConfig::clean()).sequence();
        assert_eq!(sequence.len(), 90);

        let angles = extract_sequence(&sequence);
        assert!(angles.iter().all(|a| a.detected));
        for a in &angles {
            for channel in AngleChannel::all() {
                let v = a.get(channel);
                assert!((0.0..=180.0).contains(&v), "{channel:?} {v}");
            }
        }
    }

    #[test]
    fn test_rest_pose_has_straight_limbs() {
        let synth = MotionSynth::new(SynthConfig::clean());
        let points = synth.skeleton(0.0, 90.0);
        let angles = posealign_core::extract_angles(&Pose::new(
            BodyPart::all()
                .iter()
                .zip(points)
                .map(|(part, (x, y))| Keypoint::new(part.as_str(), x, y, 0.9))
                .collect(),
        ));

        assert!((angles.get(AngleChannel::Elbow) - 180.0).abs() < 1e-6);
        assert!((angles.get(AngleChannel::Knee) - 180.0).abs() < 1e-6);
        assert!(angles.get(AngleChannel::Armpit) < 1e-6);
        assert!((angles.get(AngleChannel::Trunk) - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_amplitude_moves_the_elbow() {
        let synth = MotionSynth::new(SynthConfig::clean());
        let pose = |s: f64| {
            Pose::new(
                BodyPart::all()
                    .iter()
                    .zip(synth.skeleton(s, 90.0))
                    .map(|(part, (x, y))| Keypoint::new(part.as_str(), x, y, 0.9))
                    .collect(),
            )
        };
        let rest = posealign_core::extract_angles(&pose(0.0));
        let peak = posealign_core::extract_angles(&pose(1.0));

        // elbow flexes by half the amplitude; the armpit opens by the raise minus the lean
        let elbow_flex = rest.get(AngleChannel::Elbow) - peak.get(AngleChannel::Elbow);
        assert!((elbow_flex - 45.0).abs() < 1e-6);
        assert!((peak.get(AngleChannel::Armpit) - 81.0).abs() < 1e-6);
        assert!((peak.get(AngleChannel::Knee) - 108.0).abs() < 1e-6);
    }

    #[test]
    fn test_dropout_produces_empty_frames() {
        let config = SynthConfig {
            dropout_prob: 1.0,
            ..SynthConfig::default()
        };
        let sequence = MotionSynth::new(config).performance(10, 1.0, 90.0);
        assert!(sequence.iter().all(Option::is_none));
    }

    #[test]
    fn test_detections_put_performer_first() {
        let mut synth = MotionSynth::new(SynthConfig::clean());
        let detections = synth.detections(40);
        assert_eq!(detections.len(), 40);
        assert!(detections.iter().all(|poses| !poses.is_empty() && poses.len() <= 2));
    }
}
