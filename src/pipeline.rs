//! Pipeline orchestration
//!
//! This module provides the public API for Smile Flux. It carries frames
//! from a landmark source through validation, scoring and session
//! statistics, and produces per-frame output records.

use log::{info, warn};

use crate::config::ScorerConfig;
use crate::encoder::{SmileReport, SmileReportEncoder};
use crate::error::{ComputeError, Result, ValidationError};
use crate::scorer::SmileScorer;
use crate::source::FaceLandmarkSource;
use crate::stats::{SessionStats, SessionSummary};
use crate::types::{FrameRecord, ScoredFrame};

/// Score a single frame record given as JSON (stateless, one-shot).
///
/// # Arguments
/// * `frame_json` - One `smile.frame.v1` record
///
/// # Returns
/// A `ScoredFrame` JSON object
///
/// # Example
/// ```ignore
/// let scored = score_frame_json(r#"{"frame_index": 0}"#)?;
/// ```
pub fn score_frame_json(frame_json: &str) -> Result<String> {
    let frame: FrameRecord = serde_json::from_str(frame_json)?;
    let mut processor = SmileProcessor::new();
    let scored = processor.process_frame(frame)?;
    serde_json::to_string(&scored).map_err(ComputeError::JsonError)
}

/// Stateful processor for a stream of frames.
///
/// Scoring stays per-frame; the processor only adds frame numbering and
/// session statistics on top.
pub struct SmileProcessor {
    scorer: SmileScorer,
    stats: SessionStats,
    encoder: SmileReportEncoder,
    next_index: u64,
}

impl Default for SmileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SmileProcessor {
    /// Create a processor with the default scorer configuration
    pub fn new() -> Self {
        Self {
            scorer: SmileScorer::default(),
            stats: SessionStats::new(),
            encoder: SmileReportEncoder::new(),
            next_index: 0,
        }
    }

    /// Create a processor with a custom scorer configuration
    pub fn with_config(config: ScorerConfig) -> Result<Self> {
        Ok(Self {
            scorer: SmileScorer::new(config)?,
            ..Self::new()
        })
    }

    pub fn scorer(&self) -> &SmileScorer {
        &self.scorer
    }

    /// Validate and score one frame
    pub fn process_frame(&mut self, frame: FrameRecord) -> Result<ScoredFrame> {
        frame.validate()?;

        let frame_index = frame.frame_index.unwrap_or(self.next_index);
        self.next_index = frame_index
            .checked_add(1)
            .ok_or(ValidationError::FrameIndexOutOfRange { index: frame_index })?;

        let evaluation = self.scorer.evaluate(frame.sample.as_ref());
        self.stats.record(&evaluation);

        Ok(ScoredFrame {
            frame_index,
            timestamp: frame.timestamp,
            result: evaluation.result(),
            skipped: evaluation.skip_reason(),
            geometry: evaluation.geometry(),
        })
    }

    /// Parse and score one frame given as JSON
    pub fn process_json(&mut self, frame_json: &str) -> Result<ScoredFrame> {
        let frame: FrameRecord = serde_json::from_str(frame_json)?;
        self.process_frame(frame)
    }

    /// Score every frame a source yields, stopping at the first error
    pub fn drain<S: FaceLandmarkSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Vec<ScoredFrame>> {
        let mut scored = Vec::new();
        while let Some(frame) = source.next_frame() {
            match frame.and_then(|f| self.process_frame(f)) {
                Ok(out) => scored.push(out),
                Err(e) => {
                    warn!("Stopping after {} frames: {}", scored.len(), e);
                    return Err(e);
                }
            }
        }
        info!("Scored {} frames", scored.len());
        Ok(scored)
    }

    pub fn summary(&self) -> SessionSummary {
        self.stats.summary()
    }

    /// Build a session report from the statistics so far
    pub fn report(&self) -> SmileReport {
        self.encoder.encode(self.scorer.config(), &self.stats)
    }

    pub fn report_json(&self) -> Result<String> {
        self.encoder.encode_to_json(self.scorer.config(), &self.stats)
    }

    /// Save session statistics to JSON for persistence
    pub fn save_stats(&self) -> Result<String> {
        self.stats
            .to_json()
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Load session statistics from JSON
    pub fn load_stats(&mut self, json: &str) -> Result<()> {
        self.stats =
            SessionStats::from_json(json).map_err(|e| ComputeError::ParseError(e.to_string()))?;
        Ok(())
    }

    /// Number of frames folded into the statistics
    pub fn frame_count(&self) -> u64 {
        self.stats.frames_total()
    }

    /// Clear statistics and restart frame numbering
    pub fn reset(&mut self) {
        self.stats.clear();
        self.next_index = 0;
    }
}
