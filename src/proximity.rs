// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Proximity classification.
//!
//! Maps a frame's detection set to a discrete [`ProximityLevel`] using the
//! detection that appears nearest, i.e. the one with the largest proximity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProximityError, Result};
use crate::results::Detection;

/// How close the nearest vehicle appears, ordered `Safe < Warning < Danger`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProximityLevel {
    /// Nothing at or above the warning cut point.
    #[default]
    Safe,
    /// Above the warning cut point, at or below the danger cut point.
    Warning,
    /// Above the danger cut point.
    Danger,
}

impl ProximityLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for ProximityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cut points separating the proximity levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityThresholds {
    /// Proximity strictly above this is at least [`ProximityLevel::Warning`].
    pub warning: f32,
    /// Proximity strictly above this is [`ProximityLevel::Danger`].
    pub danger: f32,
}

impl Default for ProximityThresholds {
    fn default() -> Self {
        Self {
            warning: 0.25,
            danger: 0.4,
        }
    }
}

impl ProximityThresholds {
    #[must_use]
    pub const fn new(warning: f32, danger: f32) -> Self {
        Self { warning, danger }
    }

    /// Check `0 < warning < danger < 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ProximityError::ConfigError`] if the cut points are out of
    /// range or misordered.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f32| v > 0.0 && v < 1.0;
        if !in_unit(self.warning) || !in_unit(self.danger) {
            return Err(ProximityError::ConfigError(format!(
                "proximity thresholds must lie in (0, 1), got warning={} danger={}",
                self.warning, self.danger
            )));
        }
        if self.warning >= self.danger {
            return Err(ProximityError::ConfigError(format!(
                "warning threshold ({}) must be below danger threshold ({})",
                self.warning, self.danger
            )));
        }
        Ok(())
    }

    /// Level for a single proximity value.
    #[must_use]
    pub fn level(&self, proximity: f32) -> ProximityLevel {
        if proximity > self.danger {
            ProximityLevel::Danger
        } else if proximity > self.warning {
            ProximityLevel::Warning
        } else {
            ProximityLevel::Safe
        }
    }
}

/// Per-frame proximity summary handed to display collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ProximitySummary {
    /// Number of detections in the frame.
    pub vehicle_count: usize,
    /// Largest proximity in the frame, 0 when there are no detections.
    pub closest_proximity: f32,
    /// Level derived from `closest_proximity`.
    pub level: ProximityLevel,
}

impl ProximitySummary {
    /// Status line, e.g. `"Vehicles: 2 | DANGER"` or `"Vehicles: 0 | No vehicles detected"`.
    #[must_use]
    pub fn status_text(&self) -> String {
        let status = match self.level {
            ProximityLevel::Danger => "DANGER",
            ProximityLevel::Warning => "WARNING",
            ProximityLevel::Safe if self.vehicle_count > 0 => "SAFE",
            ProximityLevel::Safe => "No vehicles detected",
        };
        format!("Vehicles: {} | {status}", self.vehicle_count)
    }
}

/// Classify a detection set by its nearest detection.
#[must_use]
pub fn classify(detections: &[Detection], thresholds: &ProximityThresholds) -> ProximitySummary {
    let closest_proximity = detections
        .iter()
        .map(|d| d.proximity)
        .reduce(f32::max)
        .unwrap_or(0.0);

    ProximitySummary {
        vehicle_count: detections.len(),
        closest_proximity,
        level: thresholds.level(closest_proximity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn detection_with_proximity(proximity: f32) -> Detection {
        Detection {
            rect: Rect::new(0.0, 0.0, 10.0, proximity * 100.0),
            class_id: 2,
            label: "car".to_string(),
            confidence: 0.9,
            proximity,
        }
    }

    #[test]
    fn test_level_cut_points() {
        let t = ProximityThresholds::default();
        assert_eq!(t.level(0.0), ProximityLevel::Safe);
        assert_eq!(t.level(0.25), ProximityLevel::Safe);
        assert_eq!(t.level(0.26), ProximityLevel::Warning);
        assert_eq!(t.level(0.4), ProximityLevel::Warning);
        assert_eq!(t.level(0.41), ProximityLevel::Danger);
        assert_eq!(t.level(1.0), ProximityLevel::Danger);
    }

    #[test]
    fn test_level_ordering() {
        assert!(ProximityLevel::Safe < ProximityLevel::Warning);
        assert!(ProximityLevel::Warning < ProximityLevel::Danger);
    }

    #[test]
    fn test_classify_empty() {
        let summary = classify(&[], &ProximityThresholds::default());
        assert_eq!(summary.vehicle_count, 0);
        assert_eq!(summary.closest_proximity, 0.0);
        assert_eq!(summary.level, ProximityLevel::Safe);
        assert_eq!(summary.status_text(), "Vehicles: 0 | No vehicles detected");
    }

    #[test]
    fn test_classify_uses_nearest() {
        let detections = vec![
            detection_with_proximity(0.1),
            detection_with_proximity(0.3),
            detection_with_proximity(0.2),
        ];
        let summary = classify(&detections, &ProximityThresholds::default());
        assert_eq!(summary.vehicle_count, 3);
        assert!((summary.closest_proximity - 0.3).abs() < 1e-6);
        assert_eq!(summary.level, ProximityLevel::Warning);
        assert_eq!(summary.status_text(), "Vehicles: 3 | WARNING");
    }

    #[test]
    fn test_status_text_safe_and_danger() {
        let safe = classify(
            &[detection_with_proximity(0.05)],
            &ProximityThresholds::default(),
        );
        assert_eq!(safe.status_text(), "Vehicles: 1 | SAFE");

        let danger = classify(
            &[detection_with_proximity(0.5)],
            &ProximityThresholds::default(),
        );
        assert_eq!(danger.status_text(), "Vehicles: 1 | DANGER");
    }

    #[test]
    fn test_thresholds_validate() {
        assert!(ProximityThresholds::default().validate().is_ok());
        assert!(ProximityThresholds::new(0.4, 0.25).validate().is_err());
        assert!(ProximityThresholds::new(0.3, 0.3).validate().is_err());
        assert!(ProximityThresholds::new(0.0, 0.5).validate().is_err());
        assert!(ProximityThresholds::new(0.2, 1.0).validate().is_err());
    }

    #[test]
    fn test_level_display() {
        assert_eq!(ProximityLevel::Safe.to_string(), "safe");
        assert_eq!(ProximityLevel::Warning.to_string(), "warning");
        assert_eq!(ProximityLevel::Danger.to_string(), "danger");
    }
}
