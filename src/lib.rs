// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # Vehicle Proximity
//!
//! Turns the raw output tensor of a YOLO-style object detector into a filtered,
//! de-duplicated set of nearby-vehicle detections, and decides when to raise a
//! proximity alert from that set.
//!
//! Camera capture, model inference, overlay drawing and speech playback are
//! left to the caller: it feeds one tensor per frame and receives the
//! detections plus zero or one [`Alert`].
//!
//! ## Pipeline
//!
//! ```text
//! tensor -> decode -> nms -> classify -> AlertController -> Option<Alert>
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Instant;
//! use vehicle_proximity::{AlertLevel, FramePipeline, ProximityConfig, ProximityLevel};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = FramePipeline::new(ProximityConfig::default())?;
//!
//! // YOLOv8 output for an 80-class model: [1, 84, anchors]. One anchor here:
//! // a car (class 2) at 0.9 confidence, half the input height.
//! let mut output = vec![0.0_f32; 84];
//! output[..4].copy_from_slice(&[320.0, 320.0, 200.0, 320.0]);
//! output[4 + 2] = 0.9;
//!
//! let result = pipeline.process(&output, &[1, 84, 1], (1000, 1000), Instant::now())?;
//! assert_eq!(result.detections[0].label, "car");
//! assert_eq!(result.summary.level, ProximityLevel::Danger);
//! assert_eq!(result.alert.map(|a| a.level), Some(AlertLevel::Danger));
//! # Ok(())
//! # }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Replay recorded detector outputs (one JSON frame per line)
//! vehicle-proximity replay --frames frames.jsonl
//!
//! # With custom thresholds
//! vehicle-proximity replay -f frames.jsonl --conf 0.4 --warning 0.2 --danger 0.35
//!
//! # Print the effective configuration
//! vehicle-proximity config --config proximity.json
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`geometry`] | [`Rect`] and `IoU` |
//! | [`postprocessing`] | Tensor decoding and NMS entry point |
//! | [`utils`] | Class-agnostic NMS |
//! | [`proximity`] | [`ProximityLevel`] classification |
//! | [`alert`] | [`AlertController`] cooldown state machine |
//! | [`pipeline`] | [`FramePipeline`] per-frame driver |
//! | [`config`] | [`ProximityConfig`] builder and JSON loading |
//! | [`error`] | Error types ([`ProximityError`], [`Result`]) |

// Modules
pub mod alert;
pub mod classes;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod postprocessing;
pub mod proximity;
pub mod results;
pub mod utils;

// Re-export main types for convenience
pub use alert::{Alert, AlertController, AlertLevel, AlertSink};
pub use classes::ClassFilter;
pub use config::ProximityConfig;
pub use error::{ProximityError, Result};
pub use geometry::Rect;
pub use pipeline::FramePipeline;
pub use postprocessing::{decode, postprocess};
pub use proximity::{ProximityLevel, ProximitySummary, ProximityThresholds, classify};
pub use results::{Detection, FrameResult, Speed};
pub use utils::nms;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
