// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::alert::{Alert, AlertLevel};
use crate::cli::args::ReplayArgs;
use crate::error::{ProximityError, Result};
use crate::pipeline::FramePipeline;
use crate::{VERSION, alert, error, section, verbose, warn};

/// One recorded detector output, as stored in a replay file.
#[derive(Debug, Deserialize)]
pub struct RecordedFrame {
    /// Capture time in milliseconds since the start of the recording.
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub image_width: u32,
    #[serde(default)]
    pub image_height: u32,
    #[serde(default)]
    pub shape: Vec<usize>,
    #[serde(default)]
    pub data: Vec<f32>,
    /// Marks a camera re-bind; the alert history is cleared.
    #[serde(default)]
    pub session_restart: bool,
}

impl RecordedFrame {
    /// Parse one line of a replay file.
    ///
    /// # Errors
    ///
    /// Returns [`ProximityError::ParseError`] if the line is not a valid frame.
    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Whether the line only restarts the session and carries no tensor.
    #[must_use]
    pub fn is_marker(&self) -> bool {
        self.session_restart && self.data.is_empty()
    }
}

/// Running totals over a replay.
#[derive(Debug, Default)]
struct ReplayStats {
    frames: usize,
    skipped: usize,
    vehicles: usize,
    warnings: usize,
    dangers: usize,
    total_ms: f64,
}

impl ReplayStats {
    fn record_alert(&mut self, alert: &Alert) {
        match alert.level {
            AlertLevel::Warning => self.warnings += 1,
            AlertLevel::Danger => self.dangers += 1,
        }
    }
}

/// Replay recorded frames through the proximity pipeline.
#[allow(clippy::cast_precision_loss)]
pub fn run_replay(args: &ReplayArgs) {
    let config = match args.tuning.resolve() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    let file = match File::open(&args.frames) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to open {}: {e}", args.frames.display());
            process::exit(1);
        }
    };

    let mut pipeline = match FramePipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            error!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    println!("Vehicle Proximity {VERSION} 🚗 replay {}", args.frames.display());
    let config = pipeline.config();
    verbose!(
        "conf={} iou={} warning={} danger={} cooldown={}ms imgsz={} classes={}",
        config.confidence_threshold,
        config.iou_threshold,
        config.warning_threshold,
        config.danger_threshold,
        config.cooldown.as_millis(),
        config.input_size,
        config.classes.len()
    );

    let stats = replay_lines(BufReader::new(file), &mut pipeline);

    section!("Summary");
    verbose!(
        "{} frames, {} skipped, {} vehicle detections",
        stats.frames,
        stats.skipped,
        stats.vehicles
    );
    verbose!(
        "{} alerts ({} danger, {} warning)",
        stats.warnings + stats.dangers,
        stats.dangers,
        stats.warnings
    );
    verbose!(
        "Speed: {:.3}ms postprocess per frame",
        stats.total_ms / stats.frames.max(1) as f64
    );
}

/// Feed every frame line of `reader` through `pipeline`.
///
/// Blank lines are ignored. Malformed lines and frames the pipeline rejects are
/// reported and counted as skipped. A line with `session_restart` resets the
/// pipeline before its frame, if any, is processed.
fn replay_lines<R: BufRead>(reader: R, pipeline: &mut FramePipeline) -> ReplayStats {
    let start = Instant::now();
    let mut stats = ReplayStats::default();

    for (line_idx, line) in reader.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("line {line_no}: read failed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let frame = match RecordedFrame::from_json_line(&line) {
            Ok(f) => f,
            Err(e) => {
                warn!("line {line_no}: {e}, skipping");
                stats.skipped += 1;
                continue;
            }
        };

        if frame.session_restart {
            pipeline.reset();
            verbose!("line {line_no}: session restart, alert history cleared");
            if frame.is_marker() {
                continue;
            }
        }

        if let Err(e) = replay_frame(pipeline, &frame, start, &mut stats) {
            warn!("line {line_no}: {e}, frame dropped");
            stats.skipped += 1;
        }
    }

    stats
}

/// Run one frame and report it.
fn replay_frame(
    pipeline: &mut FramePipeline,
    frame: &RecordedFrame,
    start: Instant,
    stats: &mut ReplayStats,
) -> Result<()> {
    if frame.shape.is_empty() {
        return Err(ProximityError::InvalidInputShape(
            "frame has no tensor shape".to_string(),
        ));
    }

    let now = start + Duration::from_millis(frame.timestamp_ms);
    let image_size = (frame.image_width, frame.image_height);
    let mut on_alert = |alert: &Alert| {
        stats.record_alert(alert);
        alert!(alert.level, "{}", alert.phrase());
    };
    let result =
        pipeline.process_with_sink(&frame.data, &frame.shape, image_size, now, &mut on_alert)?;

    stats.frames += 1;
    stats.vehicles += result.len();
    stats.total_ms += result.speed.total();

    verbose!(
        "frame {} @{}ms {}x{}: {}{} (closest {:.0}%), {:.3}ms",
        stats.frames,
        frame.timestamp_ms,
        frame.image_width,
        frame.image_height,
        result.verbose(),
        result.summary.status_text(),
        result.summary.closest_proximity * 100.0,
        result.speed.total()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn danger_line(timestamp_ms: u64) -> String {
        let mut data = vec![0.0_f32; 84];
        data[..4].copy_from_slice(&[320.0, 320.0, 200.0, 320.0]);
        data[4 + 2] = 0.9;
        format!(
            r#"{{"timestamp_ms": {timestamp_ms}, "image_width": 640, "image_height": 640, "shape": [1, 84, 1], "data": {}}}"#,
            serde_json::to_string(&data).unwrap()
        )
    }

    #[test]
    fn test_parse_frame_line() {
        let frame = RecordedFrame::from_json_line(
            r#"{"timestamp_ms": 500, "image_width": 640, "image_height": 480, "shape": [1, 84, 1], "data": [0.0]}"#,
        )
        .unwrap();
        assert_eq!(frame.timestamp_ms, 500);
        assert_eq!((frame.image_width, frame.image_height), (640, 480));
        assert_eq!(frame.shape, vec![1, 84, 1]);
        assert!(!frame.session_restart);
        assert!(!frame.is_marker());
    }

    #[test]
    fn test_parse_restart_marker() {
        let frame = RecordedFrame::from_json_line(r#"{"session_restart": true}"#).unwrap();
        assert!(frame.is_marker());
    }

    #[test]
    fn test_parse_bad_line() {
        let err = RecordedFrame::from_json_line("{\"shape\": \"wide\"}").unwrap_err();
        assert!(matches!(err, ProximityError::ParseError(_)));
    }

    #[test]
    fn test_replay_frame_counts_alerts() {
        let mut pipeline = FramePipeline::new(crate::ProximityConfig::default()).unwrap();
        let mut data = vec![0.0; 84];
        data[..4].copy_from_slice(&[320.0, 320.0, 200.0, 320.0]);
        data[4 + 2] = 0.9;
        let frame = RecordedFrame {
            timestamp_ms: 0,
            image_width: 640,
            image_height: 640,
            shape: vec![1, 84, 1],
            data,
            session_restart: false,
        };

        let mut stats = ReplayStats::default();
        replay_frame(&mut pipeline, &frame, Instant::now(), &mut stats).unwrap();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.vehicles, 1);
        assert_eq!(stats.dangers, 1);

        let empty = RecordedFrame {
            shape: Vec::new(),
            ..frame
        };
        assert!(replay_frame(&mut pipeline, &empty, Instant::now(), &mut stats).is_err());
    }

    #[test]
    fn test_replay_lines_restart_and_skip() {
        let lines = [
            danger_line(0),
            "{not json".to_string(),
            String::new(),
            r#"{"session_restart": true}"#.to_string(),
            danger_line(100),
        ];
        let reader = Cursor::new(lines.join("\n"));

        let mut pipeline = FramePipeline::new(crate::ProximityConfig::default()).unwrap();
        let stats = replay_lines(reader, &mut pipeline);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.dangers, 2);
        assert_eq!(stats.warnings, 0);
    }

    #[test]
    fn test_replay_lines_cooldown_without_restart() {
        let reader = Cursor::new(format!("{}\n{}\n", danger_line(0), danger_line(100)));

        let mut pipeline = FramePipeline::new(crate::ProximityConfig::default()).unwrap();
        let stats = replay_lines(reader, &mut pipeline);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.dangers, 1);
    }
}
