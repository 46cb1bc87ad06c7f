// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-frame pipeline.
//!
//! [`FramePipeline`] chains decoding, suppression, proximity classification and
//! alert evaluation for one camera session.

use std::time::Instant;

use crate::alert::{AlertController, AlertSink};
use crate::config::ProximityConfig;
use crate::error::Result;
use crate::postprocessing::{decode, limit, suppress};
use crate::proximity::classify;
use crate::results::{FrameResult, Speed};

/// Frame pipeline for one camera session.
///
/// `process` takes `&mut self`, so exactly one frame is in flight per
/// pipeline. Callers that receive frames faster than they are processed should
/// keep only the latest one. To share a pipeline across threads, wrap it in a
/// `Mutex`.
///
/// # Example
///
/// ```rust
/// use std::time::Instant;
/// use vehicle_proximity::{FramePipeline, ProximityConfig};
///
/// let mut pipeline = FramePipeline::new(ProximityConfig::default())?;
///
/// // One anchor, no class scores above threshold
/// let output = vec![0.0_f32; 84];
/// let result = pipeline.process(&output, &[1, 84, 1], (1280, 720), Instant::now())?;
/// assert!(result.is_empty());
/// assert!(result.alert.is_none());
/// # Ok::<(), vehicle_proximity::ProximityError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FramePipeline {
    config: ProximityConfig,
    alerts: AlertController,
}

impl FramePipeline {
    /// Create a pipeline with no alert history.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ProximityConfig) -> Result<Self> {
        config.validate()?;
        let alerts = AlertController::new(config.cooldown);
        Ok(Self { config, alerts })
    }

    #[must_use]
    pub const fn config(&self) -> &ProximityConfig {
        &self.config
    }

    #[must_use]
    pub const fn alert_controller(&self) -> &AlertController {
        &self.alerts
    }

    /// Run one frame through the pipeline.
    ///
    /// # Arguments
    ///
    /// * `output` - Flat detector output tensor.
    /// * `shape` - Tensor shape.
    /// * `image_size` - Source image (width, height).
    /// * `now` - Frame timestamp used for alert rate limiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor shape is invalid. The alert state is left
    /// untouched in that case, so the frame can simply be dropped.
    pub fn process(
        &mut self,
        output: &[f32],
        shape: &[usize],
        image_size: (u32, u32),
        now: Instant,
    ) -> Result<FrameResult> {
        let t0 = Instant::now();
        let candidates = decode(output, shape, image_size, &self.config)?;
        let t1 = Instant::now();

        let mut detections = suppress(candidates, &self.config);
        let t2 = Instant::now();

        // Classified over the full suppressed set; the cap only trims the list
        let summary = classify(&detections, &self.config.thresholds());
        let alert = self.alerts.evaluate(summary.level, now);
        limit(&mut detections, &self.config);
        let t3 = Instant::now();

        let speed = Speed::new(
            (t1 - t0).as_secs_f64() * 1000.0,
            (t2 - t1).as_secs_f64() * 1000.0,
            (t3 - t2).as_secs_f64() * 1000.0,
        );

        Ok(FrameResult {
            detections,
            summary,
            alert,
            image_size,
            speed,
        })
    }

    /// Run one frame and forward its alert, if any, to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor shape is invalid.
    pub fn process_with_sink<S: AlertSink + ?Sized>(
        &mut self,
        output: &[f32],
        shape: &[usize],
        image_size: (u32, u32),
        now: Instant,
        sink: &mut S,
    ) -> Result<FrameResult> {
        let result = self.process(output, shape, image_size, now)?;
        if let Some(alert) = &result.alert {
            sink.on_alert(alert);
        }
        Ok(result)
    }

    /// Start a new camera session: forget the alert history.
    pub fn reset(&mut self) {
        self.alerts.reset();
    }
}
