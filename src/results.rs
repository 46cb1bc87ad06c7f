// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Result types for per-frame pipeline output.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::alert::Alert;
use crate::geometry::Rect;
use crate::proximity::{ProximityLevel, ProximitySummary, ProximityThresholds};
use crate::utils::pluralize;

/// A single retained vehicle detection.
///
/// Lives only within one frame's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Bounding box in image-pixel space.
    pub rect: Rect,
    /// Detector class ID.
    pub class_id: usize,
    /// Label from the class filter.
    pub label: String,
    /// Best class score, in (0, 1].
    pub confidence: f32,
    /// Box height divided by image height, in [0, 1].
    ///
    /// A monotonic proxy for how close the object appears, not a distance.
    pub proximity: f32,
}

impl Detection {
    /// Level of this detection alone, used to colour individual boxes.
    #[must_use]
    pub fn level(&self, thresholds: &ProximityThresholds) -> ProximityLevel {
        thresholds.level(self.proximity)
    }
}

/// Timing information for pipeline stages (in milliseconds).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Speed {
    /// Time spent decoding the tensor.
    pub decode: f64,
    /// Time spent on suppression.
    pub suppress: f64,
    /// Time spent classifying and evaluating alerts.
    pub classify: f64,
}

impl Speed {
    #[must_use]
    pub const fn new(decode: f64, suppress: f64, classify: f64) -> Self {
        Self {
            decode,
            suppress,
            classify,
        }
    }

    /// Sum of all stage timings in milliseconds.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.decode + self.suppress + self.classify
    }
}

/// Everything the pipeline produces for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameResult {
    /// Suppressed detections in confidence-descending order.
    pub detections: Vec<Detection>,
    /// Vehicle count, closest proximity and level.
    pub summary: ProximitySummary,
    /// Alert raised by this frame, if any.
    pub alert: Option<Alert>,
    /// Image dimensions (width, height) the boxes refer to.
    pub image_size: (u32, u32),
    /// Stage timings.
    pub speed: Speed,
}

impl FrameResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Per-class counts, e.g. `"2 cars, 1 bus, "`.
    #[must_use]
    pub fn verbose(&self) -> String {
        if self.is_empty() {
            return "(no vehicles), ".to_string();
        }

        let mut counts: BTreeMap<usize, (&str, usize)> = BTreeMap::new();
        for d in &self.detections {
            counts.entry(d.class_id).or_insert((d.label.as_str(), 0)).1 += 1;
        }

        let parts: Vec<String> = counts
            .values()
            .map(|&(label, count)| {
                if count > 1 {
                    format!("{count} {}", pluralize(label))
                } else {
                    format!("{count} {label}")
                }
            })
            .collect();
        format!("{}, ", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(class_id: usize, label: &str, proximity: f32) -> Detection {
        Detection {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            class_id,
            label: label.to_string(),
            confidence: 0.8,
            proximity,
        }
    }

    fn frame(detections: Vec<Detection>) -> FrameResult {
        FrameResult {
            detections,
            summary: ProximitySummary::default(),
            alert: None,
            image_size: (640, 480),
            speed: Speed::default(),
        }
    }

    #[test]
    fn test_speed() {
        let speed = Speed::new(1.5, 0.5, 0.25);
        assert!((speed.total() - 2.25).abs() < 1e-9);
        assert!(Speed::default().total().abs() < 1e-9);
    }

    #[test]
    fn test_verbose_empty() {
        assert_eq!(frame(vec![]).verbose(), "(no vehicles), ");
    }

    #[test]
    fn test_verbose_counts() {
        let result = frame(vec![
            detection(5, "bus", 0.1),
            detection(2, "car", 0.2),
            detection(5, "bus", 0.3),
            detection(2, "car", 0.2),
            detection(7, "truck", 0.1),
        ]);
        assert_eq!(result.len(), 5);
        assert_eq!(result.verbose(), "2 cars, 2 buses, 1 truck, ");
    }

    #[test]
    fn test_detection_level() {
        let thresholds = ProximityThresholds::default();
        assert_eq!(detection(2, "car", 0.1).level(&thresholds), ProximityLevel::Safe);
        assert_eq!(detection(2, "car", 0.3).level(&thresholds), ProximityLevel::Warning);
        assert_eq!(detection(2, "car", 0.6).level(&thresholds), ProximityLevel::Danger);
    }
}
