// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pipeline configuration.
//!
//! This module defines [`ProximityConfig`], which controls decoding, Non-Maximum
//! Suppression (NMS), proximity classification and alert rate limiting. Every
//! field can be set through the builder methods or loaded from a JSON file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::alert::DEFAULT_COOLDOWN;
use crate::classes::ClassFilter;
use crate::error::{ProximityError, Result};
use crate::proximity::ProximityThresholds;

/// Configuration for the frame pipeline.
///
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use vehicle_proximity::ProximityConfig;
///
/// let config = ProximityConfig::new()
///     .with_confidence(0.3)
///     .with_iou(0.45)
///     .with_thresholds(0.25, 0.4)
///     .with_cooldown(Duration::from_secs(2));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Side length of the square model input the tensor coordinates refer to.
    pub input_size: usize,
    /// Number of class scores per anchor.
    pub num_classes: usize,
    /// Expected anchor count. If `None`, any anchor count is accepted.
    pub num_anchors: Option<usize>,
    /// Confidence threshold for detections (0.0 to 1.0).
    /// Only anchors scoring strictly above this value are kept.
    pub confidence_threshold: f32,
    /// Intersection over Union (IoU) threshold for Non-Maximum Suppression (NMS) (0.0 to 1.0).
    /// A candidate overlapping an accepted detection by more than this is discarded.
    pub iou_threshold: f32,
    /// Maximum number of detections to return per frame. If `None`, every
    /// suppressed detection is returned.
    ///
    /// The cap only limits the returned list; proximity is always classified
    /// over the full suppressed set.
    pub max_detections: Option<usize>,
    /// Proximity strictly above this raises a warning.
    pub warning_threshold: f32,
    /// Proximity strictly above this raises a danger alert.
    pub danger_threshold: f32,
    /// Minimum time between two alerts.
    #[serde(rename = "cooldown_ms", with = "duration_ms")]
    pub cooldown: Duration,
    /// Classes to keep, with their labels.
    pub classes: ClassFilter,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        let thresholds = ProximityThresholds::default();
        Self {
            input_size: 640,
            num_classes: 80,
            num_anchors: None,
            confidence_threshold: 0.3,
            iou_threshold: 0.45,
            max_detections: None,
            warning_threshold: thresholds.warning,
            danger_threshold: thresholds.danger,
            cooldown: DEFAULT_COOLDOWN,
            classes: ClassFilter::vehicles(),
        }
    }
}

impl ProximityConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or the
    /// resulting configuration fails [`validate`](Self::validate).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProximityError::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from a JSON string. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON or the configuration is invalid.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ProximityError::ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(ProximityError::ConfigError(
                "input_size must be greater than 0".to_string(),
            ));
        }
        if self.num_classes == 0 {
            return Err(ProximityError::ConfigError(
                "num_classes must be greater than 0".to_string(),
            ));
        }
        if self.num_anchors == Some(0) {
            return Err(ProximityError::ConfigError(
                "num_anchors must be greater than 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.confidence_threshold) {
            return Err(ProximityError::ConfigError(format!(
                "confidence_threshold must lie in [0, 1), got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ProximityError::ConfigError(format!(
                "iou_threshold must lie in [0, 1], got {}",
                self.iou_threshold
            )));
        }
        if self.max_detections == Some(0) {
            return Err(ProximityError::ConfigError(
                "max_detections must be greater than 0".to_string(),
            ));
        }
        self.thresholds().validate()?;
        if self.classes.is_empty() {
            return Err(ProximityError::ConfigError(
                "class filter must retain at least one class".to_string(),
            ));
        }
        if let Some(max_id) = self.classes.max_class_id()
            && max_id >= self.num_classes
        {
            return Err(ProximityError::ConfigError(format!(
                "class id {max_id} is out of range for {} classes",
                self.num_classes
            )));
        }
        Ok(())
    }

    /// Proximity cut points.
    #[must_use]
    pub const fn thresholds(&self) -> ProximityThresholds {
        ProximityThresholds::new(self.warning_threshold, self.danger_threshold)
    }

    /// Number of values per anchor: 4 box coordinates plus the class scores.
    #[must_use]
    pub const fn num_features(&self) -> usize {
        4 + self.num_classes
    }

    /// Set the confidence threshold.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the IoU threshold for Non-Maximum Suppression (NMS).
    #[must_use]
    pub const fn with_iou(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Set the maximum number of detections to return.
    #[must_use]
    pub const fn with_max_detections(mut self, max: usize) -> Self {
        self.max_detections = Some(max);
        self
    }

    /// Set the model input size the tensor coordinates are expressed in.
    #[must_use]
    pub const fn with_input_size(mut self, size: usize) -> Self {
        self.input_size = size;
        self
    }

    /// Set the number of class scores per anchor.
    #[must_use]
    pub const fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    /// Require tensors to carry exactly `num_anchors` anchors.
    #[must_use]
    pub const fn with_num_anchors(mut self, num_anchors: usize) -> Self {
        self.num_anchors = Some(num_anchors);
        self
    }

    /// Set the warning and danger proximity cut points.
    #[must_use]
    pub const fn with_thresholds(mut self, warning: f32, danger: f32) -> Self {
        self.warning_threshold = warning;
        self.danger_threshold = danger;
        self
    }

    /// Set the minimum time between two alerts.
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Replace the class filter.
    #[must_use]
    pub fn with_classes(mut self, classes: ClassFilter) -> Self {
        self.classes = classes;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
