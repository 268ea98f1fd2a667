//! Score presentation
//!
//! The display owns what is on screen. Each update replaces the previous
//! state outright; nothing is layered on top of an earlier frame.

use crate::types::SmileResult;

/// Sink for per-frame smile results
pub trait ScoreDisplay {
    /// Show the given score
    fn show_score(&mut self, score: u8);

    /// Hide any score currently shown
    fn hide_score(&mut self);
}

/// Route one frame's outcome to a display.
///
/// `None` (no usable mouth this frame) leaves the display as it was.
pub fn apply_result<D: ScoreDisplay + ?Sized>(display: &mut D, result: Option<SmileResult>) {
    match result {
        Some(SmileResult {
            is_smiling: true,
            score: Some(score),
        }) => display.show_score(score),
        Some(_) => display.hide_score(),
        None => {}
    }
}

/// In-memory score label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLabel {
    text: String,
    visible: bool,
}

impl ScoreLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl ScoreDisplay for ScoreLabel {
    fn show_score(&mut self, score: u8) {
        self.text = format!("Smile Score: {score}");
        self.visible = true;
    }

    fn hide_score(&mut self) {
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_starts_empty_and_hidden() {
        let label = ScoreLabel::new();
        assert_eq!(label.text(), "");
        assert!(!label.is_visible());
    }

    #[test]
    fn test_smiling_shows_score() {
        let mut label = ScoreLabel::new();
        apply_result(&mut label, Some(SmileResult::smiling(80)));
        assert_eq!(label.text(), "Smile Score: 80");
        assert!(label.is_visible());
    }

    #[test]
    fn test_not_smiling_hides() {
        let mut label = ScoreLabel::new();
        apply_result(&mut label, Some(SmileResult::smiling(42)));
        apply_result(&mut label, Some(SmileResult::not_smiling()));
        assert!(!label.is_visible());
    }

    #[test]
    fn test_skipped_frame_leaves_label() {
        let mut label = ScoreLabel::new();
        apply_result(&mut label, Some(SmileResult::smiling(55)));
        let before = label.clone();

        apply_result(&mut label, None);
        assert_eq!(label, before);
    }

    #[test]
    fn test_update_replaces_previous_score() {
        let mut label = ScoreLabel::new();
        apply_result(&mut label, Some(SmileResult::smiling(10)));
        apply_result(&mut label, Some(SmileResult::smiling(90)));
        assert_eq!(label.text(), "Smile Score: 90");
    }

    #[test]
    fn test_works_through_trait_object() {
        let mut label = ScoreLabel::new();
        let display: &mut dyn ScoreDisplay = &mut label;
        apply_result(display, Some(SmileResult::smiling(3)));
        assert_eq!(label.text(), "Smile Score: 3");
    }
}
