//! Frame sources
//!
//! A [`FaceLandmarkSource`] hands the pipeline one frame at a time. The
//! scorer never drives capture; it consumes whatever the source yields.

use std::collections::VecDeque;
use std::io::BufRead;

use crate::error::{ComputeError, Result};
use crate::types::FrameRecord;

/// Supplier of per-frame lip landmarks
pub trait FaceLandmarkSource {
    /// Next frame, or `None` once the stream has ended
    fn next_frame(&mut self) -> Option<Result<FrameRecord>>;
}

/// Frames held in memory
#[derive(Debug, Clone, Default)]
pub struct VecFrameSource {
    frames: VecDeque<FrameRecord>,
}

impl VecFrameSource {
    pub fn new(frames: Vec<FrameRecord>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FaceLandmarkSource for VecFrameSource {
    fn next_frame(&mut self) -> Option<Result<FrameRecord>> {
        self.frames.pop_front().map(Ok)
    }
}

/// Newline-delimited JSON frames read from any buffered reader.
///
/// Blank lines are skipped; a malformed line is reported with its line
/// number and does not end the stream.
pub struct NdjsonFrameSource<R: BufRead> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl<R: BufRead> NdjsonFrameSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> FaceLandmarkSource for NdjsonFrameSource<R> {
    fn next_frame(&mut self) -> Option<Result<FrameRecord>> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(ComputeError::Io(e))),
            }
            self.line_number += 1;

            let trimmed = self.buffer.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(parse_line(trimmed, self.line_number));
        }
    }
}

fn parse_line(line: &str, line_number: usize) -> Result<FrameRecord> {
    serde_json::from_str::<FrameRecord>(line).map_err(|e| {
        ComputeError::ParseError(format!("Failed to parse line {line_number}: {e}"))
    })
}

/// Parse NDJSON text into frame records, failing on the first bad line
pub fn parse_ndjson(ndjson: &str) -> Result<Vec<FrameRecord>> {
    ndjson
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(line.trim(), idx + 1))
        .collect()
}

/// Parse a JSON array of frame records
pub fn parse_array(json: &str) -> Result<Vec<FrameRecord>> {
    let frames: Vec<FrameRecord> = serde_json::from_str(json)?;
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const NDJSON: &str = r#"{"frame_index": 0}

{"frame_index": 1, "sample": {"points": [{"x": 0.1, "y": 0.2}], "face_bounding_box": {"x": 0, "y": 0, "width": 10, "height": 10}}}
"#;

    #[test]
    fn test_ndjson_source_skips_blank_lines() {
        let mut source = NdjsonFrameSource::new(Cursor::new(NDJSON));

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.frame_index, Some(0));
        assert!(first.sample.is_none());

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.frame_index, Some(1));
        assert_eq!(second.sample.unwrap().points.len(), 1);
        assert_eq!(source.line_number(), 3);

        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_ndjson_source_reports_line_and_continues() {
        let input = "{\"frame_index\": 0}\nnot json\n{\"frame_index\": 2}\n";
        let mut source = NdjsonFrameSource::new(Cursor::new(input));

        assert!(source.next_frame().unwrap().is_ok());
        let err = source.next_frame().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert_eq!(
            source.next_frame().unwrap().unwrap().frame_index,
            Some(2)
        );
    }

    #[test]
    fn test_vec_source_drains_in_order() {
        let frames = (0..3)
            .map(|i| FrameRecord {
                frame_index: Some(i),
                ..FrameRecord::new(None)
            })
            .collect();
        let mut source = VecFrameSource::new(frames);
        assert_eq!(source.remaining(), 3);

        let indices: Vec<_> = std::iter::from_fn(|| source.next_frame())
            .map(|f| f.unwrap().frame_index.unwrap())
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_parse_ndjson() {
        let frames = parse_ndjson(NDJSON).unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_error_line() {
        let err = parse_ndjson("{}\n{broken").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_array() {
        let frames = parse_array(r#"[{"frame_index": 7}, {}]"#).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].frame_index, Some(7));
        assert!(parse_array("{}").is_err());
    }
}
