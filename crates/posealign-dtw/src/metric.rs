//! Frame Distance Metric - Dissimilarity between two frames
//!
//! Two metrics share one trait:
//! - [`EuclideanAngles`]: distance between two angle vectors (the default)
//! - [`CosineKeypoints`]: `1 - cosine similarity` over raw keypoint coordinates
//!
//! Which one a comparison uses is picked with [`MetricKind`].

use std::fmt;
use std::str::FromStr;

use posealign_core::{
    normalize_pose, AngleVector, ChannelValues, Frame, Pose, PoseAlignError, PoseAlignResult,
};
use serde::{Deserialize, Serialize};

/// Distance between two frames of type `T`
///
/// Implementations must be symmetric and non-negative, and must return 0 for
/// identical inputs.
pub trait FrameMetric<T: Clone>: Send + Sync {
    /// Stable metric name used for logging and diagnostics
    fn name(&self) -> &'static str;

    /// Per-frame preprocessing, applied once to each input before the cost matrix is built
    fn prepare(&self, frame: &T) -> T {
        frame.clone()
    }

    /// Distance between two prepared frames
    fn distance(&self, a: &T, b: &T) -> PoseAlignResult<f64>;
}

/// Euclidean distance between two channel vectors
pub fn euclidean_distance(a: &ChannelValues, b: &ChannelValues) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Euclidean metric over angle vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanAngles;

impl FrameMetric<AngleVector> for EuclideanAngles {
    fn name(&self) -> &'static str {
        "euclidean-angles"
    }

    fn distance(&self, a: &AngleVector, b: &AngleVector) -> PoseAlignResult<f64> {
        Ok(euclidean_distance(&a.values, &b.values))
    }
}

/// Cosine metric configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosineConfig {
    /// A keypoint pair contributes only if both scores are strictly above this
    pub min_score: f64,
    /// Restrict the comparison to these keypoint names (all keypoints if `None`)
    pub subset: Option<Vec<String>>,
    /// Hip-center and shoulder-scale poses before comparing
    pub normalize: bool,
}

impl Default for CosineConfig {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            subset: None,
            normalize: true,
        }
    }
}

/// Cosine similarity of the concatenated (x, y) coordinates of two poses
///
/// Keypoints are paired by position, so both poses must share a layout: the
/// same count and the same name at every position, whatever the scores.
/// Returns 0 when either accumulated magnitude is zero.
pub fn cosine_similarity(a: &Pose, b: &Pose, config: &CosineConfig) -> PoseAlignResult<f64> {
    if a.len() != b.len() {
        return Err(PoseAlignError::ShapeMismatch {
            expected: format!("{} keypoints", a.len()),
            actual: format!("{} keypoints", b.len()),
        });
    }

    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;

    for (index, (ka, kb)) in a.keypoints.iter().zip(b.keypoints.iter()).enumerate() {
        if ka.name != kb.name {
            return Err(PoseAlignError::ShapeMismatch {
                expected: format!("'{}' at keypoint {}", ka.name, index),
                actual: format!("'{}'", kb.name),
            });
        }
        if !(ka.is_confident(config.min_score) && kb.is_confident(config.min_score)) {
            continue;
        }
        if let Some(subset) = &config.subset {
            if !subset.iter().any(|name| *name == ka.name) {
                continue;
            }
        }
        dot += ka.x * kb.x + ka.y * kb.y;
        mag_a += ka.x * ka.x + ka.y * ka.y;
        mag_b += kb.x * kb.x + kb.y * kb.y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (mag_a.sqrt() * mag_b.sqrt()))
}

/// Cosine distance over raw keypoints of the selected pose
#[derive(Debug, Clone, Default)]
pub struct CosineKeypoints {
    config: CosineConfig,
}

impl CosineKeypoints {
    pub fn new(config: CosineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CosineConfig {
        &self.config
    }
}

impl FrameMetric<Frame> for CosineKeypoints {
    fn name(&self) -> &'static str {
        "cosine-keypoints"
    }

    fn prepare(&self, frame: &Frame) -> Frame {
        match frame {
            Some(pose) if self.config.normalize => Some(normalize_pose(pose)),
            _ => frame.clone(),
        }
    }

    fn distance(&self, a: &Frame, b: &Frame) -> PoseAlignResult<f64> {
        match (a, b) {
            (Some(a), Some(b)) => Ok(1.0 - cosine_similarity(a, b, &self.config)?),
            (None, None) => Ok(0.0),
            // a frame without a pose has no magnitude: similarity 0
            _ => Ok(1.0),
        }
    }
}

/// Which metric a comparison aligns on
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    /// Extract angles first, align angle vectors with [`EuclideanAngles`]
    #[default]
    EuclideanAngles,
    /// Align raw poses with [`CosineKeypoints`], extract angles from the aligned poses
    CosineKeypoints,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::EuclideanAngles => "euclidean-angles",
            MetricKind::CosineKeypoints => "cosine-keypoints",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct MetricKindParseError(pub String);

impl fmt::Display for MetricKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown metric '{}'", self.0)
    }
}

impl std::error::Error for MetricKindParseError {}

impl FromStr for MetricKind {
    type Err = MetricKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "euclidean-angles" | "euclidean" => Ok(MetricKind::EuclideanAngles),
            "cosine-keypoints" | "cosine" => Ok(MetricKind::CosineKeypoints),
            _ => Err(MetricKindParseError(lower)),
        }
    }
}
