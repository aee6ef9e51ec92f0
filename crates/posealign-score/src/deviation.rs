//! Deviation Scorer - Per-angle degree differences along an alignment
//!
//! A step is scored only when both aligned frames carry a detection. Skipped
//! steps leave no entry in any channel, so entry `k` of the result is not path
//! step `k`; [`DeviationMatrix::steps`] records which path step each entry
//! came from.

use posealign_core::{
    AngleChannel, AngleVector, ChannelValues, PoseAlignError, PoseAlignResult, ANGLE_CHANNELS,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Angle-major deviation: one list of degree differences per channel
///
/// Every channel holds one entry per element of `steps`, and `steps` ascends
/// strictly below `path_len`. Deserialization rejects data breaking this.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDeviationMatrix")]
pub struct DeviationMatrix {
    channels: [Vec<f64>; ANGLE_CHANNELS],
    /// Path step index of every entry
    steps: Vec<usize>,
    /// Number of aligned steps that were scored or skipped
    path_len: usize,
}

#[derive(Deserialize)]
struct RawDeviationMatrix {
    channels: [Vec<f64>; ANGLE_CHANNELS],
    steps: Vec<usize>,
    path_len: usize,
}

impl TryFrom<RawDeviationMatrix> for DeviationMatrix {
    type Error = PoseAlignError;

    fn try_from(raw: RawDeviationMatrix) -> PoseAlignResult<Self> {
        let entries = raw.steps.len();
        if let Some(channel) = raw.channels.iter().position(|c| c.len() != entries) {
            return Err(PoseAlignError::Decode(format!(
                "deviation channel {} has {} entries for {} steps",
                channel,
                raw.channels[channel].len(),
                entries
            )));
        }
        if raw.steps.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(PoseAlignError::Decode(
                "deviation steps are not strictly ascending".into(),
            ));
        }
        if let Some(&last) = raw.steps.last() {
            if last >= raw.path_len {
                return Err(PoseAlignError::Decode(format!(
                    "deviation step {} outside a path of {} steps",
                    last, raw.path_len
                )));
            }
        }
        Ok(Self {
            channels: raw.channels,
            steps: raw.steps,
            path_len: raw.path_len,
        })
    }
}

impl DeviationMatrix {
    /// Number of scored steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of aligned steps skipped for lack of a detection
    pub fn skipped(&self) -> usize {
        self.path_len.saturating_sub(self.steps.len())
    }

    pub fn path_len(&self) -> usize {
        self.path_len
    }

    pub fn channel(&self, channel: AngleChannel) -> &[f64] {
        &self.channels[channel.index()]
    }

    pub fn channels(&self) -> &[Vec<f64>; ANGLE_CHANNELS] {
        &self.channels
    }

    /// Path step index of each scored entry, ascending
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// All channels of scored entry `k`
    pub fn entry(&self, k: usize) -> Option<ChannelValues> {
        if k >= self.len() {
            return None;
        }
        let mut out = [0.0; ANGLE_CHANNELS];
        for (slot, channel) in out.iter_mut().zip(&self.channels) {
            *slot = *channel.get(k)?;
        }
        Some(out)
    }

    /// Entry-major transpose: one vector per scored step
    pub fn to_step_major(&self) -> Vec<ChannelValues> {
        (0..self.len()).filter_map(|k| self.entry(k)).collect()
    }

    /// Mean difference of a channel, `None` when nothing was scored
    pub fn mean(&self, channel: AngleChannel) -> Option<f64> {
        let values = self.channel(channel);
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Largest difference of a channel, `None` when nothing was scored
    pub fn max(&self, channel: AngleChannel) -> Option<f64> {
        self.channel(channel).iter().copied().reduce(f64::max)
    }
}

/// Absolute per-channel differences of two aligned angle sequences
///
/// Steps where either side is undetected are skipped. A detected reading whose
/// angles all happen to be zero is scored like any other.
pub fn score_deviation(
    aligned_reference: &[AngleVector],
    aligned_target: &[AngleVector],
) -> PoseAlignResult<DeviationMatrix> {
    if aligned_reference.len() != aligned_target.len() {
        return Err(PoseAlignError::LengthMismatch {
            reference: aligned_reference.len(),
            target: aligned_target.len(),
        });
    }

    let mut matrix = DeviationMatrix {
        path_len: aligned_reference.len(),
        ..DeviationMatrix::default()
    };

    for (k, (reference, target)) in aligned_reference.iter().zip(aligned_target).enumerate() {
        if !reference.detected || !target.detected {
            continue;
        }
        let diff = reference.abs_diff(target);
        for (channel, value) in matrix.channels.iter_mut().zip(diff) {
            channel.push(value);
        }
        matrix.steps.push(k);
    }

    if matrix.is_empty() && matrix.path_len > 0 {
        warn!(
            path_len = matrix.path_len,
            "no aligned step had detections on both sides"
        );
    } else {
        debug!(
            scored = matrix.len(),
            skipped = matrix.skipped(),
            "scored deviation"
        );
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detected(v: [f64; 4]) -> AngleVector {
        AngleVector::new(v)
    }

    #[test]
    fn test_identical_sequences_score_zero() {
        let seq = vec![detected([10.0, 20.0, 30.0, 40.0]); 3];
        let matrix = score_deviation(&seq, &seq).unwrap();

        assert_eq!(matrix.len(), 3);
        for channel in AngleChannel::all() {
            assert!(matrix.channel(channel).iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_absolute_difference() {
        let reference = vec![detected([10.0, 90.0, 45.0, 170.0])];
        let target = vec![detected([25.0, 60.0, 45.0, 180.0])];
        let matrix = score_deviation(&reference, &target).unwrap();

        assert_eq!(matrix.entry(0), Some([15.0, 30.0, 0.0, 10.0]));
        assert_eq!(matrix.entry(1), None);
    }

    #[test]
    fn test_undetected_steps_are_skipped() {
        let reference = vec![
            detected([1.0; 4]),
            AngleVector::UNDETECTED,
            detected([3.0; 4]),
            detected([4.0; 4]),
        ];
        let target = vec![
            detected([2.0; 4]),
            detected([2.0; 4]),
            AngleVector::UNDETECTED,
            detected([9.0; 4]),
        ];
        let matrix = score_deviation(&reference, &target).unwrap();

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.steps(), &[0, 3]);
        assert_eq!(matrix.skipped(), 2);
        assert_eq!(matrix.channel(AngleChannel::Knee), &[1.0, 5.0]);
    }

    #[test]
    fn test_detected_zero_reading_is_scored() {
        let reference = vec![detected([0.0; 4])];
        let target = vec![detected([12.0; 4])];
        let matrix = score_deviation(&reference, &target).unwrap();

        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.channel(AngleChannel::Trunk), &[12.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let result = score_deviation(&[detected([1.0; 4])], &[]);
        assert_eq!(
            result,
            Err(PoseAlignError::LengthMismatch {
                reference: 1,
                target: 0
            })
        );
    }

    #[test]
    fn test_empty_input() {
        let matrix = score_deviation(&[], &[]).unwrap();
        assert!(matrix.is_empty());
        assert_eq!(matrix.mean(AngleChannel::Elbow), None);
        assert_eq!(matrix.max(AngleChannel::Elbow), None);
    }

    #[test]
    fn test_stats_and_transpose() {
        let reference = vec![detected([0.0; 4]), detected([0.0; 4])];
        let target = vec![detected([10.0, 0.0, 0.0, 0.0]), detected([30.0, 4.0, 0.0, 0.0])];
        let matrix = score_deviation(&reference, &target).unwrap();

        assert_eq!(matrix.mean(AngleChannel::Elbow), Some(20.0));
        assert_eq!(matrix.max(AngleChannel::Knee), Some(4.0));
        assert_eq!(
            matrix.to_step_major(),
            vec![[10.0, 0.0, 0.0, 0.0], [30.0, 4.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn test_deserialize_round_trips_scored_matrix() {
        let reference = vec![detected([10.0, 0.0, 0.0, 0.0]), AngleVector::UNDETECTED];
        let target = vec![detected([4.0, 0.0, 0.0, 0.0]), detected([1.0; 4])];
        let matrix = score_deviation(&reference, &target).unwrap();

        let json = serde_json::to_string(&matrix).unwrap();
        let back: DeviationMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, matrix);
        assert_eq!(back.skipped(), 1);
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_matrix() {
        let malformed = [
            // step without entries, outside an empty path
            r#"{"channels":[[],[],[],[]],"steps":[0],"path_len":0}"#,
            // channels of unequal length
            r#"{"channels":[[1.0],[],[1.0],[1.0]],"steps":[0],"path_len":1}"#,
            // steps out of order
            r#"{"channels":[[1.0,2.0],[1.0,2.0],[1.0,2.0],[1.0,2.0]],"steps":[1,0],"path_len":2}"#,
        ];
        for json in malformed {
            assert!(serde_json::from_str::<DeviationMatrix>(json).is_err(), "{}", json);
        }
    }
}
