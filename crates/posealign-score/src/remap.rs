//! Path Remapper / Gap-Filler - Deviations back on target frame indices
//!
//! Scored entries are projected through the alignment path onto the target
//! video's own frames. When several entries land on one frame the later entry
//! wins. Frames that received nothing are filled from their neighbours
//! according to [`GapFill`]; raw degree values are never smoothed or clipped.

use std::fmt;
use std::str::FromStr;

use posealign_core::{
    AngleChannel, ChannelValues, PoseAlignError, PoseAlignResult, ANGLE_CHANNELS,
};
use posealign_dtw::AlignmentPath;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::DeviationMatrix;

/// How unset target frames are filled
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapFill {
    /// Copy the nearest preceding value; a leading gap takes the first value
    #[default]
    Forward,
    /// Interpolate linearly between the surrounding values; edges copy the nearest value
    Linear,
}

impl GapFill {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapFill::Forward => "forward",
            GapFill::Linear => "linear",
        }
    }
}

#[derive(Debug)]
pub struct GapFillParseError(pub String);

impl fmt::Display for GapFillParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown gap fill '{}'", self.0)
    }
}

impl std::error::Error for GapFillParseError {}

impl FromStr for GapFill {
    type Err = GapFillParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "forward" => Ok(GapFill::Forward),
            "linear" => Ok(GapFill::Linear),
            _ => Err(GapFillParseError(lower)),
        }
    }
}

/// Frame-major deviation: one 4-channel vector per target frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameDeviations {
    values: Vec<ChannelValues>,
    /// Whether each frame received a mapped value (as opposed to a filled one)
    measured: Vec<bool>,
}

impl FrameDeviations {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, frame: usize) -> Option<&ChannelValues> {
        self.values.get(frame)
    }

    pub fn values(&self) -> &[ChannelValues] {
        &self.values
    }

    pub fn is_measured(&self, frame: usize) -> bool {
        self.measured.get(frame).copied().unwrap_or(false)
    }

    /// Number of frames that received a mapped value
    pub fn measured_count(&self) -> usize {
        self.measured.iter().filter(|m| **m).count()
    }

    /// Angle-major transpose: one list per channel, indexed by target frame
    pub fn to_angle_major(&self) -> [Vec<f64>; ANGLE_CHANNELS] {
        let mut out: [Vec<f64>; ANGLE_CHANNELS] = Default::default();
        for channel in AngleChannel::all() {
            out[channel.index()] = self.values.iter().map(|v| v[channel.index()]).collect();
        }
        out
    }

    pub fn into_values(self) -> Vec<ChannelValues> {
        self.values
    }
}

/// Project scored entries onto `target_frame_count` frames and fill the gaps
pub fn remap_to_target_frames(
    deviations: &DeviationMatrix,
    path: &AlignmentPath,
    target_frame_count: usize,
    gap_fill: GapFill,
) -> PoseAlignResult<FrameDeviations> {
    let mut slots: Vec<Option<ChannelValues>> = vec![None; target_frame_count];

    for (k, &step_index) in deviations.steps().iter().enumerate() {
        let step = path.get(step_index).ok_or(PoseAlignError::FrameOutOfRange {
            index: step_index,
            len: path.len(),
        })?;
        let slot = slots
            .get_mut(step.target)
            .ok_or(PoseAlignError::FrameOutOfRange {
                index: step.target,
                len: target_frame_count,
            })?;
        *slot = deviations.entry(k);
    }

    let measured: Vec<bool> = slots.iter().map(Option::is_some).collect();
    let values = match gap_fill {
        GapFill::Forward => forward_fill(&slots),
        GapFill::Linear => linear_fill(&slots),
    };

    debug!(
        frames = target_frame_count,
        measured = measured.iter().filter(|m| **m).count(),
        gap_fill = gap_fill.as_str(),
        "remapped deviation onto target frames"
    );

    Ok(FrameDeviations { values, measured })
}

/// Forward fill, then back-fill any leading gap with the first set value
///
/// With no set value at all every frame becomes the zero vector.
pub fn forward_fill(slots: &[Option<ChannelValues>]) -> Vec<ChannelValues> {
    let Some(first) = slots.iter().flatten().next().copied() else {
        return vec![[0.0; ANGLE_CHANNELS]; slots.len()];
    };

    let mut last = first;
    slots
        .iter()
        .map(|slot| {
            if let Some(value) = slot {
                last = *value;
            }
            last
        })
        .collect()
}

/// Linear interpolation between set values, nearest value at the edges
///
/// With no set value at all every frame becomes the zero vector.
pub fn linear_fill(slots: &[Option<ChannelValues>]) -> Vec<ChannelValues> {
    let known: Vec<usize> = (0..slots.len()).filter(|&i| slots[i].is_some()).collect();
    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return vec![[0.0; ANGLE_CHANNELS]; slots.len()];
    };
    let value = |i: usize| slots[i].unwrap_or([0.0; ANGLE_CHANNELS]);

    let mut out = Vec::with_capacity(slots.len());
    let mut next_known = 0;
    for i in 0..slots.len() {
        if slots[i].is_some() {
            out.push(value(i));
            next_known += 1;
            continue;
        }
        if i < first {
            out.push(value(first));
        } else if i > last {
            out.push(value(last));
        } else {
            let prev = known[next_known - 1];
            let next = known[next_known];
            let ratio = (i - prev) as f64 / (next - prev) as f64;
            let (a, b) = (value(prev), value(next));
            let mut v = [0.0; ANGLE_CHANNELS];
            for c in 0..ANGLE_CHANNELS {
                v[c] = a[c] + ratio * (b[c] - a[c]);
            }
            out.push(v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score_deviation;
    use posealign_core::AngleVector;
    use proptest::prelude::*;

    /// Target of `frames` frames aligned 1:1 with a reference, only `hits` detected
    fn one_to_one(frames: usize, hits: &[(usize, f64)]) -> (DeviationMatrix, AlignmentPath) {
        let reference = vec![AngleVector::new([0.0; 4]); frames];
        let mut target = vec![AngleVector::UNDETECTED; frames];
        for (frame, value) in hits {
            target[*frame] = AngleVector::new([*value; 4]);
        }
        let path = AlignmentPath::from((0..frames).map(|i| (i, i)).collect::<Vec<_>>());
        (score_deviation(&reference, &target).unwrap(), path)
    }

    #[test]
    fn test_sparse_scenario_forward_fill() {
        let (deviations, path) = one_to_one(10, &[(2, 5.0), (7, 30.0)]);
        let frames = remap_to_target_frames(&deviations, &path, 10, GapFill::Forward).unwrap();

        assert_eq!(frames.len(), 10);
        for f in 0..7 {
            assert_eq!(frames.get(f), Some(&[5.0; 4]), "frame {f}");
        }
        for f in 7..10 {
            assert_eq!(frames.get(f), Some(&[30.0; 4]), "frame {f}");
        }
        assert_eq!(frames.measured_count(), 2);
        assert!(frames.is_measured(2) && frames.is_measured(7));
        assert!(!frames.is_measured(0));
    }

    #[test]
    fn test_sparse_scenario_linear_fill() {
        let (deviations, path) = one_to_one(10, &[(2, 5.0), (7, 30.0)]);
        let frames = remap_to_target_frames(&deviations, &path, 10, GapFill::Linear).unwrap();

        let knee = |f: usize| frames.get(f).unwrap()[AngleChannel::Knee.index()];
        assert_eq!(knee(0), 5.0);
        assert_eq!(knee(2), 5.0);
        assert!((knee(3) - 10.0).abs() < 1e-9);
        assert!((knee(6) - 25.0).abs() < 1e-9);
        assert_eq!(knee(7), 30.0);
        assert_eq!(knee(9), 30.0);
    }

    #[test]
    fn test_last_step_wins() {
        let reference = vec![
            AngleVector::new([0.0; 4]),
            AngleVector::new([0.0; 4]),
            AngleVector::new([0.0; 4]),
        ];
        let aligned_target = vec![
            AngleVector::new([4.0; 4]),
            AngleVector::new([8.0; 4]),
            AngleVector::new([1.0; 4]),
        ];
        // reference frames 0 and 1 both map onto target frame 0
        let path = AlignmentPath::from(vec![(0, 0), (1, 0), (2, 1)]);
        let deviations = score_deviation(&reference, &aligned_target).unwrap();
        let frames = remap_to_target_frames(&deviations, &path, 2, GapFill::Forward).unwrap();

        assert_eq!(frames.values(), &[[8.0; 4], [1.0; 4]]);
    }

    #[test]
    fn test_skipped_steps_keep_path_positions() {
        let reference = vec![AngleVector::UNDETECTED, AngleVector::new([0.0; 4])];
        let target = vec![AngleVector::new([9.0; 4]), AngleVector::new([3.0; 4])];
        let path = AlignmentPath::from(vec![(0, 0), (1, 1)]);
        let deviations = score_deviation(&reference, &target).unwrap();
        let frames = remap_to_target_frames(&deviations, &path, 2, GapFill::Forward).unwrap();

        // the single scored entry belongs to target frame 1, not frame 0
        assert!(!frames.is_measured(0));
        assert!(frames.is_measured(1));
        assert_eq!(frames.values(), &[[3.0; 4], [3.0; 4]]);
    }

    #[test]
    fn test_nothing_scored_fills_zero() {
        let (deviations, path) = one_to_one(4, &[]);
        for fill in [GapFill::Forward, GapFill::Linear] {
            let frames = remap_to_target_frames(&deviations, &path, 4, fill).unwrap();
            assert_eq!(frames.values(), &[[0.0; 4]; 4]);
        }
    }

    #[test]
    fn test_empty_target() {
        let frames = remap_to_target_frames(
            &DeviationMatrix::default(),
            &AlignmentPath::default(),
            0,
            GapFill::Forward,
        )
        .unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_out_of_range_target() {
        let (deviations, path) = one_to_one(3, &[(2, 1.0)]);
        let result = remap_to_target_frames(&deviations, &path, 2, GapFill::Forward);
        assert_eq!(
            result,
            Err(PoseAlignError::FrameOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_to_angle_major() {
        let (deviations, path) = one_to_one(2, &[(0, 1.0), (1, 2.0)]);
        let frames = remap_to_target_frames(&deviations, &path, 2, GapFill::Forward).unwrap();
        let channels = frames.to_angle_major();
        assert_eq!(channels[AngleChannel::Knee.index()], vec![1.0, 2.0]);
    }

    #[test]
    fn test_gap_fill_parse() {
        assert_eq!("Linear".parse::<GapFill>().unwrap(), GapFill::Linear);
        assert!("cubic".parse::<GapFill>().is_err());
    }

    proptest! {
        #[test]
        fn prop_every_frame_is_set(
            hits in proptest::collection::btree_map(0usize..40, 0.0f64..180.0, 1..10),
            linear in any::<bool>(),
        ) {
            let frames = 40;
            let hits: Vec<(usize, f64)> = hits.into_iter().collect();
            let (deviations, path) = one_to_one(frames, &hits);
            let fill = if linear { GapFill::Linear } else { GapFill::Forward };
            let out = remap_to_target_frames(&deviations, &path, frames, fill).unwrap();

            prop_assert_eq!(out.len(), frames);
            for (frame, value) in &hits {
                prop_assert_eq!(out.get(*frame), Some(&[*value; 4]));
            }
            let lo = hits.iter().map(|h| h.1).fold(f64::INFINITY, f64::min);
            let hi = hits.iter().map(|h| h.1).fold(f64::NEG_INFINITY, f64::max);
            for v in out.values() {
                prop_assert!(v[0] >= lo - 1e-9 && v[0] <= hi + 1e-9);
            }
        }
    }
}
