//! End-to-end comparison scenarios
//!
//! Each scenario builds its inputs and runs the pipeline, returning either a
//! pass/fail flag or the produced result for the caller to inspect.

use posealign_core::{
    extract_angles, AngleChannel, AngleVector, Keypoint, Pose, PoseAlignError, PoseAlignResult,
    REQUIRED_PARTS,
};
use posealign_dtw::{AlignmentPath, MetricKind};
use posealign_runtime::{decode_sequence, ComparisonConfig, ComparisonEngine, ComparisonReport};
use posealign_score::{remap_to_target_frames, score_deviation, FrameDeviations, GapFill};

use crate::{MotionSynth, SynthConfig};

const EPSILON: f64 = 1e-6;

// ============================================================================
// ANGLE EXTRACTION
// ============================================================================

fn right_side(points: [(f64, f64); 6]) -> Pose {
    Pose::new(
        REQUIRED_PARTS
            .iter()
            .zip(points)
            .map(|(part, (x, y))| Keypoint::new(part.as_str(), x, y, 0.9))
            .collect(),
    )
}

/// Collinear shoulder-elbow-wrist gives 180, a square corner gives 90
pub fn scenario_angle_correctness() -> bool {
    let straight = right_side([
        (0.0, 0.0),
        (0.0, 10.0),
        (0.0, 20.0),
        (50.0, 0.0),
        (50.0, 10.0),
        (60.0, 10.0),
    ]);
    let angles = extract_angles(&straight);

    (angles.get(AngleChannel::Elbow) - 180.0).abs() < EPSILON
        && (angles.get(AngleChannel::Knee) - 90.0).abs() < EPSILON
}

/// Any missing required keypoint yields the undetected sentinel
pub fn scenario_sentinel_consistency() -> bool {
    let full = [
        (0.0, 0.0),
        (0.0, 10.0),
        (0.0, 20.0),
        (50.0, 0.0),
        (50.0, 10.0),
        (60.0, 10.0),
    ];
    (0..REQUIRED_PARTS.len()).all(|missing| {
        let mut pose = right_side(full);
        pose.keypoints.remove(missing);
        let angles = extract_angles(&pose);
        angles == AngleVector::UNDETECTED && angles.values == [0.0; 4]
    })
}

// ============================================================================
// ALIGNMENT
// ============================================================================

/// Three identical frames against themselves: zero everywhere
pub fn scenario_identical_sequences() -> PoseAlignResult<ComparisonReport> {
    let seq = vec![AngleVector::new([10.0, 20.0, 30.0, 40.0]); 3];
    ComparisonEngine::new().compare_angles(&seq, &seq)
}

/// Five well-separated reference frames against three target frames
pub fn scenario_unequal_lengths() -> PoseAlignResult<ComparisonReport> {
    let reference: Vec<AngleVector> = (0..5)
        .map(|i| AngleVector::new([20.0 * i as f64 + 10.0; 4]))
        .collect();
    let target: Vec<AngleVector> = [15.0, 55.0, 95.0]
        .iter()
        .map(|v| AngleVector::new([*v; 4]))
        .collect();
    ComparisonEngine::new().compare_angles(&reference, &target)
}

// ============================================================================
// REMAPPING
// ============================================================================

/// Ten target frames, only frames 2 and 7 scored with 5 and 30 degrees
pub fn scenario_sparse_remap(gap_fill: GapFill) -> PoseAlignResult<FrameDeviations> {
    let frames = 10;
    let reference = vec![AngleVector::new([0.0; 4]); frames];
    let mut target = vec![AngleVector::UNDETECTED; frames];
    target[2] = AngleVector::new([5.0; 4]);
    target[7] = AngleVector::new([30.0; 4]);

    let path = AlignmentPath::from((0..frames).map(|i| (i, i)).collect::<Vec<_>>());
    let deviation = score_deviation(&reference, &target)?;
    remap_to_target_frames(&deviation, &path, frames, gap_fill)
}

// ============================================================================
// SYNTHETIC PERFORMANCES
// ============================================================================

/// Largest per-frame deviation of a report, over all channels
pub fn peak_deviation(report: &ComparisonReport) -> f64 {
    report
        .frame_deviations
        .values()
        .iter()
        .flat_map(|v| v.iter().copied())
        .fold(0.0, f64::max)
}

/// The same exercise performed more slowly stays close after alignment
pub fn scenario_tempo_change(metric: MetricKind) -> PoseAlignResult<(f64, f64)> {
    // two repetitions in 60 frames, then the same two in 90 frames
    let mut synth = MotionSynth::new(SynthConfig::clean());
    let reference = synth.performance(60, 1.5, 90.0);
    let slower = synth.performance(90, 1.0, 90.0);
    let weaker = synth.performance(60, 1.5, 45.0);

    let config = ComparisonConfig {
        metric,
        ..ComparisonConfig::default()
    };
    let engine = ComparisonEngine::with_config(config)?;
    let same_motion = engine.compare(&reference, &slower)?;
    let other_motion = engine.compare(&reference, &weaker)?;
    Ok((peak_deviation(&same_motion), peak_deviation(&other_motion)))
}

/// Estimator JSON through decoding and comparison
pub fn scenario_decoded_input() -> PoseAlignResult<ComparisonReport> {
    let mut synth = MotionSynth::new(SynthConfig::default());
    let reference = synth.detections(30);
    let target = synth.detections(24);

    let to_json = |detections: Vec<Vec<Pose>>| {
        serde_json::to_string(&detections)
            .map_err(|e| PoseAlignError::Decode(e.to_string()))
    };
    let reference = decode_sequence(&to_json(reference)?)?;
    let target = decode_sequence(&to_json(target)?)?;
    ComparisonEngine::new().compare(&reference, &target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_scenarios() {
        assert!(scenario_angle_correctness());
        assert!(scenario_sentinel_consistency());
    }

    #[test]
    fn test_identical_sequences() {
        let report = scenario_identical_sequences().unwrap();

        assert_eq!(report.total_cost, 0.0);
        assert!(report.path.is_diagonal());
        assert_eq!(report.frame_deviations.values(), &[[0.0; 4]; 3]);
        for channel in report.deviation.channels() {
            assert_eq!(channel, &vec![0.0; 3]);
        }
    }

    #[test]
    fn test_unequal_lengths() {
        let report = scenario_unequal_lengths().unwrap();

        assert!(report.path.len() >= 5);
        assert!(report.path.is_valid_for(5, 3));
        assert!(report.total_cost > 0.0);
        assert_eq!(report.aligned_reference.len(), report.path.len());
        assert_eq!(report.aligned_target.len(), report.path.len());
        assert_eq!(report.frame_deviations.len(), 3);
    }

    #[test]
    fn test_sparse_remap_forward() {
        let frames = scenario_sparse_remap(GapFill::Forward).unwrap();

        for f in 0..7 {
            assert_eq!(frames.get(f), Some(&[5.0; 4]), "frame {f}");
        }
        for f in 7..10 {
            assert_eq!(frames.get(f), Some(&[30.0; 4]), "frame {f}");
        }
    }

    #[test]
    fn test_sparse_remap_linear() {
        let frames = scenario_sparse_remap(GapFill::Linear).unwrap();

        assert_eq!(frames.get(1), Some(&[5.0; 4]));
        assert_eq!(frames.get(8), Some(&[30.0; 4]));
        let mid = frames.get(4).unwrap()[0];
        assert!(mid > 5.0 && mid < 30.0);
    }

    #[test]
    fn test_tempo_change_euclidean() {
        let (same, other) = scenario_tempo_change(MetricKind::EuclideanAngles).unwrap();
        println!("euclidean: same motion {same:.2}, other motion {other:.2}");
        assert!(same < other);
        assert!(other > 20.0);
    }

    #[test]
    fn test_tempo_change_cosine() {
        let (same, other) = scenario_tempo_change(MetricKind::CosineKeypoints).unwrap();
        println!("cosine: same motion {same:.2}, other motion {other:.2}");
        assert!(same < other);
    }

    #[test]
    fn test_decoded_input() {
        let report = scenario_decoded_input().unwrap();

        assert_eq!(report.frame_deviations.len(), 24);
        assert!(report.path.is_valid_for(30, 24));
        assert!(report
            .frame_deviations
            .values()
            .iter()
            .all(|v| v.iter().all(|x| x.is_finite())));
    }
}
