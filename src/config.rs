//! Scorer configuration
//!
//! All fields have defaults matching the outer-lip layout of the common
//! 14+ point lip contour, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ComputeError, Result};
use crate::transform::CoordinateTransform;

/// Default ratio above which an open mouth counts as a smile
pub const DEFAULT_SMILE_THRESHOLD: f64 = 0.9;

/// Landmark indices must fall below this contour length
pub const MAX_CONTOUR_POINTS: usize = 1024;

/// Contour indices of the four landmarks the scorer reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkIndices {
    pub top: usize,
    pub right_corner: usize,
    pub bottom: usize,
    pub left_corner: usize,
}

impl Default for LandmarkIndices {
    fn default() -> Self {
        Self {
            top: 3,
            right_corner: 7,
            bottom: 10,
            left_corner: 13,
        }
    }
}

impl LandmarkIndices {
    /// Smallest contour length that covers every index
    pub fn min_points(&self) -> usize {
        self.highest().saturating_add(1)
    }

    fn highest(&self) -> usize {
        self.top
            .max(self.right_corner)
            .max(self.bottom)
            .max(self.left_corner)
    }

    pub fn validate(&self) -> Result<()> {
        let highest = self.highest();
        if highest >= MAX_CONTOUR_POINTS {
            return Err(ComputeError::InvalidConfig(format!(
                "landmark index {} exceeds the {}-point contour limit",
                highest, MAX_CONTOUR_POINTS
            )));
        }
        Ok(())
    }
}

/// Configuration for [`crate::scorer::SmileScorer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Normalized-to-box projection
    pub transform: CoordinateTransform,
    /// Corner-to-bottom ratio that classifies an open-mouth smile
    pub smile_threshold: f64,
    /// Landmark positions within the contour
    pub landmarks: LandmarkIndices,
    /// Mouth heights at or below this value are degenerate
    pub min_height: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            transform: CoordinateTransform::default(),
            smile_threshold: DEFAULT_SMILE_THRESHOLD,
            landmarks: LandmarkIndices::default(),
            min_height: 0.0,
        }
    }
}

impl ScorerConfig {
    pub fn min_points(&self) -> usize {
        self.landmarks.min_points()
    }

    pub fn with_transform(mut self, transform: CoordinateTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_threshold(mut self, smile_threshold: f64) -> Self {
        self.smile_threshold = smile_threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.smile_threshold.is_finite() || self.smile_threshold < 0.0 {
            return Err(ComputeError::InvalidConfig(format!(
                "smile_threshold must be a non-negative number, got {}",
                self.smile_threshold
            )));
        }
        if !self.min_height.is_finite() || self.min_height < 0.0 {
            return Err(ComputeError::InvalidConfig(format!(
                "min_height must be a non-negative number, got {}",
                self.min_height
            )));
        }
        self.landmarks.validate()
    }

    /// Parse and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScorerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }
}
