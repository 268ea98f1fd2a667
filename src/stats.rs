//! Session statistics
//!
//! Running counts over every frame a processor has seen. The scorer itself
//! stays stateless; this is the only place frame history accumulates, and
//! it can be saved and restored as JSON between app launches.

use serde::{Deserialize, Serialize};

use crate::types::FrameEvaluation;

/// Rolling aggregate of frame outcomes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    frames_total: u64,
    frames_without_face: u64,
    frames_insufficient: u64,
    frames_degenerate: u64,
    frames_scored: u64,
    smiling_frames: u64,
    /// Sum of smiling scores, for the mean
    score_sum: u64,
    peak_score: Option<u8>,
    longest_smile_streak: u64,
    current_smile_streak: u64,
}

/// Point-in-time view of [`SessionStats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames_total: u64,
    pub frames_without_face: u64,
    pub frames_insufficient: u64,
    pub frames_degenerate: u64,
    pub frames_scored: u64,
    pub smiling_frames: u64,
    /// Smiling frames over frames with a result (0-1)
    pub smile_fraction: Option<f64>,
    /// Mean score across smiling frames
    pub mean_score: Option<f64>,
    pub peak_score: Option<u8>,
    pub longest_smile_streak: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame into the running totals.
    ///
    /// Counters saturate, so restored stats near `u64::MAX` stay usable.
    pub fn record(&mut self, evaluation: &FrameEvaluation) {
        bump(&mut self.frames_total);

        match evaluation {
            FrameEvaluation::NoFace => bump(&mut self.frames_without_face),
            FrameEvaluation::InsufficientLandmarks { .. } => bump(&mut self.frames_insufficient),
            FrameEvaluation::Degenerate { .. } => {
                bump(&mut self.frames_degenerate);
                self.current_smile_streak = 0;
            }
            FrameEvaluation::Scored { result, .. } => {
                bump(&mut self.frames_scored);
                match result.score {
                    Some(score) if result.is_smiling => {
                        bump(&mut self.smiling_frames);
                        self.score_sum = self.score_sum.saturating_add(u64::from(score));
                        self.peak_score = Some(self.peak_score.map_or(score, |p| p.max(score)));
                        bump(&mut self.current_smile_streak);
                        self.longest_smile_streak =
                            self.longest_smile_streak.max(self.current_smile_streak);
                    }
                    _ => self.current_smile_streak = 0,
                }
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let with_result = self.frames_scored.saturating_add(self.frames_degenerate);
        let smile_fraction = if with_result > 0 {
            Some(self.smiling_frames as f64 / with_result as f64)
        } else {
            None
        };
        let mean_score = if self.smiling_frames > 0 {
            Some(self.score_sum as f64 / self.smiling_frames as f64)
        } else {
            None
        };

        SessionSummary {
            frames_total: self.frames_total,
            frames_without_face: self.frames_without_face,
            frames_insufficient: self.frames_insufficient,
            frames_degenerate: self.frames_degenerate,
            frames_scored: self.frames_scored,
            smiling_frames: self.smiling_frames,
            smile_fraction,
            mean_score,
            peak_score: self.peak_score,
            longest_smile_streak: self.longest_smile_streak,
        }
    }

    pub fn frames_total(&self) -> u64 {
        self.frames_total
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Serialize to JSON for persistence
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MouthGeometry, MouthLandmarks, Point, SmileResult};
    use pretty_assertions::assert_eq;

    fn landmarks() -> MouthLandmarks {
        MouthLandmarks {
            top: Point::new(0.0, 1.0),
            right_corner: Point::new(1.0, 0.8),
            bottom: Point::new(0.0, 0.0),
            left_corner: Point::new(-1.0, 0.8),
        }
    }

    fn scored(result: SmileResult) -> FrameEvaluation {
        FrameEvaluation::Scored {
            landmarks: landmarks(),
            geometry: MouthGeometry {
                average_y: 0.8,
                height: 1.0,
                difference: 0.2,
                ratio: Some(0.8),
            },
            result,
        }
    }

    fn degenerate() -> FrameEvaluation {
        FrameEvaluation::Degenerate {
            landmarks: landmarks(),
            geometry: MouthGeometry {
                average_y: 0.0,
                height: 0.0,
                difference: 0.0,
                ratio: None,
            },
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = SessionStats::new().summary();
        assert_eq!(summary.frames_total, 0);
        assert_eq!(summary.smile_fraction, None);
        assert_eq!(summary.mean_score, None);
        assert_eq!(summary.peak_score, None);
    }

    #[test]
    fn test_counts_each_outcome() {
        let mut stats = SessionStats::new();
        stats.record(&FrameEvaluation::NoFace);
        stats.record(&FrameEvaluation::InsufficientLandmarks {
            found: 4,
            required: 14,
        });
        stats.record(&degenerate());
        stats.record(&scored(SmileResult::smiling(80)));
        stats.record(&scored(SmileResult::smiling(60)));
        stats.record(&scored(SmileResult::not_smiling()));

        let summary = stats.summary();
        assert_eq!(summary.frames_total, 6);
        assert_eq!(summary.frames_without_face, 1);
        assert_eq!(summary.frames_insufficient, 1);
        assert_eq!(summary.frames_degenerate, 1);
        assert_eq!(summary.frames_scored, 3);
        assert_eq!(summary.smiling_frames, 2);
        assert_eq!(summary.peak_score, Some(80));
        assert_eq!(summary.mean_score, Some(70.0));
        // 2 smiling out of 4 frames with a result
        assert_eq!(summary.smile_fraction, Some(0.5));
    }

    #[test]
    fn test_streak_survives_skipped_frames() {
        let mut stats = SessionStats::new();
        stats.record(&scored(SmileResult::smiling(50)));
        stats.record(&FrameEvaluation::NoFace);
        stats.record(&scored(SmileResult::smiling(50)));
        stats.record(&scored(SmileResult::not_smiling()));
        stats.record(&scored(SmileResult::smiling(50)));

        assert_eq!(stats.summary().longest_smile_streak, 2);
    }

    #[test]
    fn test_degenerate_breaks_streak() {
        let mut stats = SessionStats::new();
        stats.record(&scored(SmileResult::smiling(50)));
        stats.record(&degenerate());
        stats.record(&scored(SmileResult::smiling(50)));

        assert_eq!(stats.summary().longest_smile_streak, 1);
    }

    #[test]
    fn test_serialization_restores_state() {
        let mut stats = SessionStats::new();
        stats.record(&scored(SmileResult::smiling(90)));
        stats.record(&scored(SmileResult::smiling(90)));

        let mut restored = SessionStats::from_json(&stats.to_json().unwrap()).unwrap();
        assert_eq!(restored, stats);

        // the open streak carries over
        restored.record(&scored(SmileResult::smiling(10)));
        assert_eq!(restored.summary().longest_smile_streak, 3);
    }

    #[test]
    fn test_counters_saturate() {
        let mut stats = SessionStats::from_json(
            r#"{
                "frames_total": 18446744073709551615,
                "frames_scored": 18446744073709551615,
                "frames_degenerate": 18446744073709551615,
                "smiling_frames": 18446744073709551615,
                "score_sum": 18446744073709551615,
                "current_smile_streak": 18446744073709551615
            }"#,
        )
        .unwrap();

        stats.record(&scored(SmileResult::smiling(80)));
        stats.record(&FrameEvaluation::NoFace);

        let summary = stats.summary();
        assert_eq!(summary.frames_total, u64::MAX);
        assert_eq!(summary.frames_scored, u64::MAX);
        assert_eq!(summary.smiling_frames, u64::MAX);
        assert_eq!(summary.frames_without_face, 1);
        assert_eq!(summary.longest_smile_streak, u64::MAX);
        assert_eq!(summary.peak_score, Some(80));
        assert!(summary.smile_fraction.is_some());
    }

    #[test]
    fn test_clear() {
        let mut stats = SessionStats::new();
        stats.record(&FrameEvaluation::NoFace);
        stats.clear();
        assert_eq!(stats, SessionStats::default());
    }
}
