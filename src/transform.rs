//! Landmark projection
//!
//! Landmark detectors report contour points normalized to the face box, but
//! the camera buffer is usually rotated relative to the preview. The
//! transform decides how normalized axes map onto box space.

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;
use crate::types::{Point, Rect};

/// How normalized landmark coordinates map into face-box coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateTransform {
    /// Buffer rotated 90 degrees against the preview: normalized `y` scales
    /// the box height along x, normalized `x` scales the box width along y.
    #[default]
    RotatedQuarterTurn,
    /// Buffer and preview share orientation.
    Identity,
    /// Quarter turn with the vertical axis mirrored (front camera without
    /// mirroring in the preview layer).
    MirroredQuarterTurn,
}

impl CoordinateTransform {
    /// Project a normalized landmark into the coordinate space of `rect`
    pub fn project(&self, point: Point, rect: &Rect) -> Point {
        match self {
            CoordinateTransform::RotatedQuarterTurn => Point::new(
                point.y * rect.height + rect.x,
                point.x * rect.width + rect.y,
            ),
            CoordinateTransform::Identity => Point::new(
                point.x * rect.width + rect.x,
                point.y * rect.height + rect.y,
            ),
            CoordinateTransform::MirroredQuarterTurn => Point::new(
                point.y * rect.height + rect.x,
                (1.0 - point.x) * rect.width + rect.y,
            ),
        }
    }

    /// Parse a transform from its command-line name
    pub fn from_name(name: &str) -> Result<Self, ComputeError> {
        match name.to_lowercase().replace('-', "_").as_str() {
            "rotated_quarter_turn" | "rotated" | "rotate90" => {
                Ok(CoordinateTransform::RotatedQuarterTurn)
            }
            "identity" | "none" => Ok(CoordinateTransform::Identity),
            "mirrored_quarter_turn" | "mirrored" => Ok(CoordinateTransform::MirroredQuarterTurn),
            _ => Err(ComputeError::InvalidConfig(format!(
                "Unknown coordinate transform: {name}"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CoordinateTransform::RotatedQuarterTurn => "rotated_quarter_turn",
            CoordinateTransform::Identity => "identity",
            CoordinateTransform::MirroredQuarterTurn => "mirrored_quarter_turn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: Rect = Rect::new(10.0, 20.0, 200.0, 100.0);

    #[test]
    fn test_rotated_swaps_axes() {
        let projected = CoordinateTransform::RotatedQuarterTurn.project(Point::new(0.25, 0.5), &BOX);
        // x = 0.5 * 100 + 10, y = 0.25 * 200 + 20
        assert_eq!(projected, Point::new(60.0, 70.0));
    }

    #[test]
    fn test_identity_keeps_axes() {
        let projected = CoordinateTransform::Identity.project(Point::new(0.1, 0.5), &BOX);
        // x = 0.1 * 200 + 10, y = 0.5 * 100 + 20
        assert_eq!(projected, Point::new(30.0, 70.0));
    }

    #[test]
    fn test_mirrored_flips_vertical() {
        let projected =
            CoordinateTransform::MirroredQuarterTurn.project(Point::new(0.25, 0.5), &BOX);
        assert_eq!(projected, Point::new(60.0, 0.75 * 200.0 + 20.0));
    }

    #[test]
    fn test_default_is_rotated() {
        assert_eq!(
            CoordinateTransform::default(),
            CoordinateTransform::RotatedQuarterTurn
        );
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            CoordinateTransform::from_name("identity").unwrap(),
            CoordinateTransform::Identity
        );
        assert_eq!(
            CoordinateTransform::from_name("Mirrored-Quarter-Turn").unwrap(),
            CoordinateTransform::MirroredQuarterTurn
        );
        assert!(CoordinateTransform::from_name("sideways").is_err());
    }

    #[test]
    fn test_name_round_trips_through_from_name() {
        for t in [
            CoordinateTransform::RotatedQuarterTurn,
            CoordinateTransform::Identity,
            CoordinateTransform::MirroredQuarterTurn,
        ] {
            assert_eq!(CoordinateTransform::from_name(t.name()).unwrap(), t);
        }
    }
}
