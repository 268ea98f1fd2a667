//! Smile scoring
//!
//! Turns one frame's outer-lip contour into a smiling classification and a
//! 0-100 intensity score. The scorer is a pure function of its input: it
//! keeps no state between frames and can be shared across threads.
//!
//! Per frame:
//! 1. Project the top, right-corner, bottom and left-corner landmarks into
//!    face-box space.
//! 2. `average_y` = mean corner height, `height` = `top.y - bottom.y`.
//! 3. `difference` = `top.y - average_y`, `ratio` = `(average_y - bottom.y) / height`.
//! 4. Smiling when `difference >= 0` or `ratio >= threshold`; the score is
//!    `ratio * 100`, rounded and clamped to 0-100.

use log::debug;

use crate::config::ScorerConfig;
use crate::error::Result;
use crate::types::{
    FrameEvaluation, LipContourSample, MouthGeometry, MouthLandmarks, SmileResult,
};

/// Highest reportable smile score
pub const MAX_SCORE: u8 = 100;

/// Stateless smile scorer
#[derive(Debug, Clone, Default)]
pub struct SmileScorer {
    config: ScorerConfig,
}

impl SmileScorer {
    /// Create a scorer, rejecting invalid configuration
    pub fn new(config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score one sample.
    ///
    /// Returns `None` when the contour is too short to locate the mouth.
    /// Degenerate mouth geometry yields a not-smiling result.
    pub fn score(&self, sample: &LipContourSample) -> Option<SmileResult> {
        self.evaluate(Some(sample)).result()
    }

    /// Evaluate a frame, keeping the intermediate geometry and skip reason
    pub fn evaluate(&self, sample: Option<&LipContourSample>) -> FrameEvaluation {
        let Some(sample) = sample else {
            return FrameEvaluation::NoFace;
        };

        let required = self.config.min_points();
        if !sample.has_enough_points(required) {
            debug!(
                "Skipping frame: {} lip points, need {}",
                sample.points.len(),
                required
            );
            return FrameEvaluation::InsufficientLandmarks {
                found: sample.points.len(),
                required,
            };
        }

        let landmarks = self.project_landmarks(sample);
        let geometry = self.measure(&landmarks);

        let Some(ratio) = geometry.ratio else {
            debug!("Degenerate mouth height {:.4}", geometry.height);
            return FrameEvaluation::Degenerate {
                landmarks,
                geometry,
            };
        };

        let is_smiling = geometry.difference >= 0.0 || ratio >= self.config.smile_threshold;
        let result = if is_smiling {
            SmileResult::smiling(ratio_to_score(ratio))
        } else {
            SmileResult::not_smiling()
        };

        FrameEvaluation::Scored {
            landmarks,
            geometry,
            result,
        }
    }

    fn project_landmarks(&self, sample: &LipContourSample) -> MouthLandmarks {
        let indices = &self.config.landmarks;
        let rect = &sample.face_bounding_box;
        let project = |i: usize| self.config.transform.project(sample.points[i], rect);

        MouthLandmarks {
            top: project(indices.top),
            right_corner: project(indices.right_corner),
            bottom: project(indices.bottom),
            left_corner: project(indices.left_corner),
        }
    }

    fn measure(&self, landmarks: &MouthLandmarks) -> MouthGeometry {
        let average_y = (landmarks.right_corner.y + landmarks.left_corner.y) / 2.0;
        let height = landmarks.top.y - landmarks.bottom.y;
        let difference = landmarks.top.y - average_y;

        let ratio = if height > self.config.min_height {
            Some((average_y - landmarks.bottom.y) / height).filter(|r| r.is_finite())
        } else {
            None
        };

        MouthGeometry {
            average_y,
            height,
            difference,
            ratio,
        }
    }
}

/// Convert a corner-to-bottom ratio into a 0-100 score
fn ratio_to_score(ratio: f64) -> u8 {
    (ratio * 100.0).round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}
