//! Session report encoder
//!
//! Encodes session statistics into a self-describing JSON report that the
//! host app can attach to a journal entry or share with a therapist.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ScorerConfig;
use crate::error::{ComputeError, Result};
use crate::stats::{SessionStats, SessionSummary};
use crate::transform::CoordinateTransform;
use crate::{PRODUCER_NAME, SMILE_FLUX_VERSION};

/// Current report schema version
pub const REPORT_VERSION: &str = "smile.report.v1";

/// Share of frames with a face below which coverage is flagged
const LOW_FACE_COVERAGE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmileReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub config: ReportConfig,
    pub summary: SessionSummary,
    pub quality: ReportQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// The scorer settings a report was produced under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub transform: CoordinateTransform,
    pub smile_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportQuality {
    /// Frames with a usable mouth over all frames (0-1)
    pub coverage: f64,
    pub flags: Vec<QualityFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    NoFrames,
    LowFaceCoverage,
    DegenerateGeometry,
}

/// Session report encoder
pub struct SmileReportEncoder {
    instance_id: String,
}

impl Default for SmileReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SmileReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(&self, config: &ScorerConfig, stats: &SessionStats) -> SmileReport {
        let summary = stats.summary();
        let quality = build_quality(&summary);

        SmileReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: SMILE_FLUX_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            config: ReportConfig {
                transform: config.transform,
                smile_threshold: config.smile_threshold,
            },
            summary,
            quality,
        }
    }

    /// Encode to pretty-printed JSON
    pub fn encode_to_json(&self, config: &ScorerConfig, stats: &SessionStats) -> Result<String> {
        let report = self.encode(config, stats);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}

fn build_quality(summary: &SessionSummary) -> ReportQuality {
    let mut flags = Vec::new();

    if summary.frames_total == 0 {
        flags.push(QualityFlag::NoFrames);
        return ReportQuality {
            coverage: 0.0,
            flags,
        };
    }

    let usable = summary.frames_scored + summary.frames_degenerate;
    let coverage = usable as f64 / summary.frames_total as f64;

    if coverage < LOW_FACE_COVERAGE {
        flags.push(QualityFlag::LowFaceCoverage);
    }
    if summary.frames_degenerate > 0 {
        flags.push(QualityFlag::DegenerateGeometry);
    }

    ReportQuality { coverage, flags }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameEvaluation;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_session_flags_no_frames() {
        let encoder = SmileReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&ScorerConfig::default(), &SessionStats::new());

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.quality.flags, vec![QualityFlag::NoFrames]);
        assert_eq!(report.quality.coverage, 0.0);
    }

    #[test]
    fn test_low_face_coverage() {
        let mut stats = SessionStats::new();
        stats.record(&FrameEvaluation::NoFace);
        stats.record(&FrameEvaluation::NoFace);
        stats.record(&FrameEvaluation::InsufficientLandmarks {
            found: 2,
            required: 14,
        });

        let report = SmileReportEncoder::new().encode(&ScorerConfig::default(), &stats);
        assert_eq!(report.quality.coverage, 0.0);
        assert_eq!(report.quality.flags, vec![QualityFlag::LowFaceCoverage]);
    }

    #[test]
    fn test_json_shape() {
        let config = ScorerConfig::default().with_transform(CoordinateTransform::Identity);
        let json = SmileReportEncoder::new()
            .encode_to_json(&config, &SessionStats::new())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["report_version"], "smile.report.v1");
        assert_eq!(value["config"]["transform"], "identity");
        assert_eq!(value["config"]["smile_threshold"], 0.9);
        assert_eq!(value["quality"]["flags"][0], "no_frames");
        assert!(value["computed_at_utc"].is_string());
        assert!(Uuid::parse_str(value["producer"]["instance_id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_unique_instance_ids() {
        assert_ne!(
            SmileReportEncoder::new().instance_id(),
            SmileReportEncoder::new().instance_id()
        );
    }
}
