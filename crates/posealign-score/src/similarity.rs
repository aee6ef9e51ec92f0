//! Per-angle cosine similarity along an alignment
//!
//! Diagnostic companion to the deviation: for scalar angles the similarity is
//! the sign agreement of the two readings, 0 when either reading is zero.

use posealign_core::{AngleVector, PoseAlignError, PoseAlignResult, ANGLE_CHANNELS};

/// Angle-major similarity, one entry per aligned step and channel
///
/// Every step is kept, undetected frames included; their zero readings give 0.
pub fn similarity_per_angle(
    aligned_reference: &[AngleVector],
    aligned_target: &[AngleVector],
) -> PoseAlignResult<[Vec<f64>; ANGLE_CHANNELS]> {
    if aligned_reference.len() != aligned_target.len() {
        return Err(PoseAlignError::LengthMismatch {
            reference: aligned_reference.len(),
            target: aligned_target.len(),
        });
    }

    let mut out: [Vec<f64>; ANGLE_CHANNELS] = Default::default();
    for channel in out.iter_mut() {
        channel.reserve(aligned_reference.len());
    }
    for (reference, target) in aligned_reference.iter().zip(aligned_target) {
        for (c, channel) in out.iter_mut().enumerate() {
            channel.push(scalar_cosine(reference.values[c], target.values[c]));
        }
    }
    Ok(out)
}

#[inline]
fn scalar_cosine(a: f64, b: f64) -> f64 {
    let magnitude = a.abs() * b.abs();
    if magnitude == 0.0 {
        0.0
    } else {
        (a * b) / magnitude
    }
}
