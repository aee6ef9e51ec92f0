//! Comparison configuration
//!
//! Every field has a default, so a JSON document only needs the keys it
//! overrides:
//!
//! ```json
//! { "metric": "cosine-keypoints", "gap_fill": "linear", "severity": { "high": 25.0 } }
//! ```

use std::fs;
use std::path::Path;

use posealign_core::{ExtractorConfig, FrameClock, PoseAlignError, PoseAlignResult, DEFAULT_FPS};
use posealign_dtw::{AlignerConfig, CosineConfig, MetricKind};
use posealign_score::{GapFill, SeverityThresholds};
use serde::{Deserialize, Serialize};

/// Comparison engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Which frame distance the aligner runs on
    pub metric: MetricKind,
    /// Keypoint confidence threshold for angle extraction
    pub extractor: ExtractorConfig,
    /// Cost matrix cap
    pub aligner: AlignerConfig,
    /// Keypoint cosine settings, used only with [`MetricKind::CosineKeypoints`]
    pub cosine: CosineConfig,
    /// How target frames without a scored step are filled
    pub gap_fill: GapFill,
    /// Tier thresholds for report helpers
    pub severity: SeverityThresholds,
    /// Frame rate of the detected-pose timeline
    pub fps: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            metric: MetricKind::default(),
            extractor: ExtractorConfig::default(),
            aligner: AlignerConfig::default(),
            cosine: CosineConfig::default(),
            gap_fill: GapFill::default(),
            severity: SeverityThresholds::default(),
            fps: DEFAULT_FPS,
        }
    }
}

impl ComparisonConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> PoseAlignResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PoseAlignError::Decode(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> PoseAlignResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            PoseAlignError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> PoseAlignResult<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(PoseAlignError::InvalidConfig(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        if self.extractor.min_score.is_nan() || self.extractor.min_score < 0.0 {
            return Err(PoseAlignError::InvalidConfig(format!(
                "extractor.min_score must be non-negative, got {}",
                self.extractor.min_score
            )));
        }
        if self.cosine.min_score.is_nan() || self.cosine.min_score < 0.0 {
            return Err(PoseAlignError::InvalidConfig(format!(
                "cosine.min_score must be non-negative, got {}",
                self.cosine.min_score
            )));
        }
        if self.aligner.max_cells == Some(0) {
            return Err(PoseAlignError::InvalidConfig(
                "aligner.max_cells must be at least 1".into(),
            ));
        }
        if matches!(&self.cosine.subset, Some(names) if names.is_empty()) {
            return Err(PoseAlignError::InvalidConfig(
                "cosine.subset must name at least one keypoint".into(),
            ));
        }
        self.severity.validate()
    }

    pub fn clock(&self) -> FrameClock {
        FrameClock::new(self.fps)
    }
}
