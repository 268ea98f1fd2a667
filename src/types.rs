//! Core data types
//!
//! This module defines the types that flow through the smile pipeline:
//! lip-contour samples coming in from a face-landmark detector, the
//! intermediate mouth geometry, and per-frame results going out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Schema version for frame records (`smile.frame.v1`)
pub const SCHEMA_VERSION: &str = "smile.frame.v1";

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned rectangle (origin plus size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Finite origin and strictly positive, finite size
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// One video frame's worth of outer-lip geometry.
///
/// `points` are normalized (0-1) relative to `face_bounding_box`, which is
/// expressed in the coordinate space of the rendered preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LipContourSample {
    /// Outer-lip contour points in detector order
    pub points: Vec<Point>,
    /// Detected face bounding box
    pub face_bounding_box: Rect,
}

impl LipContourSample {
    pub fn new(points: Vec<Point>, face_bounding_box: Rect) -> Self {
        Self {
            points,
            face_bounding_box,
        }
    }

    /// Whether the contour carries at least `min_points` points
    pub fn has_enough_points(&self, min_points: usize) -> bool {
        self.points.len() >= min_points
    }
}

/// The four lip landmarks used for scoring, projected into box space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouthLandmarks {
    pub top: Point,
    pub right_corner: Point,
    pub bottom: Point,
    pub left_corner: Point,
}

/// Intermediate measurements derived from [`MouthLandmarks`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouthGeometry {
    /// Mean height of the two mouth corners
    pub average_y: f64,
    /// `top.y - bottom.y`
    pub height: f64,
    /// `top.y - average_y`
    pub difference: f64,
    /// `(average_y - bottom.y) / height`; absent when height is degenerate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
}

/// Classification and intensity for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmileResult {
    pub is_smiling: bool,
    /// 0-100 intensity, present only while smiling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl SmileResult {
    pub const fn smiling(score: u8) -> Self {
        Self {
            is_smiling: true,
            score: Some(score),
        }
    }

    pub const fn not_smiling() -> Self {
        Self {
            is_smiling: false,
            score: None,
        }
    }
}

/// Why a frame produced no score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The detector found no face in the frame
    NoFace,
    /// Fewer contour points than the configured landmark indices need
    InsufficientLandmarks,
    /// Vertical mouth span was zero or negative
    DegenerateGeometry,
}

/// Detailed outcome of evaluating a single frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvaluation {
    NoFace,
    InsufficientLandmarks {
        found: usize,
        required: usize,
    },
    /// Scored as not smiling because the mouth span was unusable
    Degenerate {
        landmarks: MouthLandmarks,
        geometry: MouthGeometry,
    },
    Scored {
        landmarks: MouthLandmarks,
        geometry: MouthGeometry,
        result: SmileResult,
    },
}

impl FrameEvaluation {
    /// The result a display should receive, if any
    pub fn result(&self) -> Option<SmileResult> {
        match self {
            FrameEvaluation::NoFace | FrameEvaluation::InsufficientLandmarks { .. } => None,
            FrameEvaluation::Degenerate { .. } => Some(SmileResult::not_smiling()),
            FrameEvaluation::Scored { result, .. } => Some(*result),
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            FrameEvaluation::NoFace => Some(SkipReason::NoFace),
            FrameEvaluation::InsufficientLandmarks { .. } => {
                Some(SkipReason::InsufficientLandmarks)
            }
            FrameEvaluation::Degenerate { .. } => Some(SkipReason::DegenerateGeometry),
            FrameEvaluation::Scored { .. } => None,
        }
    }

    pub fn geometry(&self) -> Option<MouthGeometry> {
        match self {
            FrameEvaluation::Degenerate { geometry, .. }
            | FrameEvaluation::Scored { geometry, .. } => Some(*geometry),
            _ => None,
        }
    }
}

/// A frame as delivered by a landmark source over JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Position of the frame in its stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u64>,
    /// Capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Detected lip contour; absent when no face was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<LipContourSample>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl FrameRecord {
    pub fn new(sample: Option<LipContourSample>) -> Self {
        Self {
            schema_version: default_schema_version(),
            frame_index: None,
            timestamp: None,
            sample,
        }
    }

    /// Validate the record's envelope and geometry.
    ///
    /// Short contours are valid here; they are a per-frame skip, not a
    /// malformed record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if let Some(sample) = &self.sample {
            if let Some(index) = sample.points.iter().position(|p| !p.is_finite()) {
                return Err(ValidationError::NonFinitePoint { index });
            }
            if !sample.face_bounding_box.is_valid() {
                return Err(ValidationError::InvalidBoundingBox);
            }
        }

        Ok(())
    }
}

/// Output record for one processed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFrame {
    pub frame_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Result to hand to the display; null leaves it untouched
    pub result: Option<SmileResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<MouthGeometry>,
}
