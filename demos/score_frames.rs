//! Score a short synthetic clip and print the per-frame label and report

use smile_flux::{apply_result, ScoreLabel, SmileProcessor};

fn main() {
    let frames = [
        r#"{ "frame_index": 0 }"#,
        r#"{ "frame_index": 1, "sample": { "points": [
            {"x": 0.30, "y": 0.5}, {"x": 0.32, "y": 0.4}, {"x": 0.35, "y": 0.3}, {"x": 0.40, "y": 0.5},
            {"x": 0.35, "y": 0.7}, {"x": 0.32, "y": 0.6}, {"x": 0.30, "y": 0.8}, {"x": 0.36, "y": 0.9},
            {"x": 0.30, "y": 0.8}, {"x": 0.28, "y": 0.6}, {"x": 0.20, "y": 0.5}, {"x": 0.28, "y": 0.4},
            {"x": 0.30, "y": 0.2}, {"x": 0.36, "y": 0.1}
          ], "face_bounding_box": { "x": 40.0, "y": 120.0, "width": 200.0, "height": 240.0 } } }"#,
        r#"{ "frame_index": 2, "sample": { "points": [{"x": 0.5, "y": 0.5}],
          "face_bounding_box": { "x": 0.0, "y": 0.0, "width": 1.0, "height": 1.0 } } }"#,
    ];

    let mut processor = SmileProcessor::new();
    let mut label = ScoreLabel::new();

    for frame in frames {
        match processor.process_json(frame) {
            Ok(scored) => {
                apply_result(&mut label, scored.result);
                let shown = if label.is_visible() { label.text() } else { "(hidden)" };
                println!("frame {}: {}", scored.frame_index, shown);
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    match processor.report_json() {
        Ok(report) => println!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
