//! Smile Flux - On-device smile scoring from facial lip landmarks
//!
//! Flux turns the outer-lip contour reported by a face-landmark detector into
//! a per-frame smiling classification and a 0-100 smile score:
//! landmark source → projection → mouth geometry → classification → display.
//!
//! ## Modules
//!
//! - **Scorer**: the stateless per-frame calculation
//! - **Pipeline**: frame streams, session statistics and reports around it
//! - **FFI**: C bindings for the host mobile app

pub mod config;
pub mod display;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod scorer;
pub mod source;
pub mod stats;
pub mod transform;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{LandmarkIndices, ScorerConfig};
pub use display::{apply_result, ScoreDisplay, ScoreLabel};
pub use error::{ComputeError, Result, ValidationError};
pub use pipeline::{score_frame_json, SmileProcessor};
pub use scorer::SmileScorer;
pub use source::{FaceLandmarkSource, NdjsonFrameSource, VecFrameSource};
pub use transform::CoordinateTransform;
pub use types::{
    FrameEvaluation, FrameRecord, LipContourSample, Point, Rect, ScoredFrame, SkipReason,
    SmileResult, SCHEMA_VERSION,
};

/// Flux version embedded in all reports
pub const SMILE_FLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "smile-flux";
