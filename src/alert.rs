// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Cooldown-gated proximity alerts.
//!
//! [`AlertController`] owns the only mutable, time-dependent state of the
//! pipeline: the instant of the last alert. It is evaluated once per frame and
//! emits at most one [`Alert`], staying silent while the cooldown window that
//! started at the previous alert is still open.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::proximity::ProximityLevel;

/// Default minimum time between two alerts.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Severity of an emitted alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Danger,
}

impl AlertLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Spoken phrase for audio sinks; danger is the more urgent one.
    #[must_use]
    pub const fn phrase(&self) -> &'static str {
        match self {
            Self::Warning => "Warning! Car approaching",
            Self::Danger => "Danger! Car very close!",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outbound alert event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
}

impl Alert {
    #[must_use]
    pub const fn new(level: AlertLevel) -> Self {
        Self { level }
    }

    #[must_use]
    pub const fn phrase(&self) -> &'static str {
        self.level.phrase()
    }
}

/// Consumer of alert events, e.g. a speech or sound player.
///
/// Sinks handle their own playback queuing.
pub trait AlertSink {
    fn on_alert(&mut self, alert: &Alert);
}

impl<F: FnMut(&Alert)> AlertSink for F {
    fn on_alert(&mut self, alert: &Alert) {
        self(alert);
    }
}

/// Turns per-frame proximity levels into rate-limited alerts.
///
/// A safe frame never touches the timer, so a later warning or danger frame
/// still respects the window opened by the previous alert.
#[derive(Debug, Clone)]
pub struct AlertController {
    last_alert: Option<Instant>,
    cooldown: Duration,
}

impl Default for AlertController {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl AlertController {
    /// Create a controller with no alert history.
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            last_alert: None,
            cooldown,
        }
    }

    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Instant of the most recent alert, if any.
    #[must_use]
    pub const fn last_alert(&self) -> Option<Instant> {
        self.last_alert
    }

    /// Whether an alert at `now` would be suppressed.
    ///
    /// A clock that runs backwards saturates to zero elapsed time, which keeps
    /// the window closed.
    #[must_use]
    pub fn in_cooldown(&self, now: Instant) -> bool {
        self.last_alert
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
    }

    /// Evaluate one frame.
    ///
    /// # Returns
    ///
    /// `Some(alert)` when the level is warning or danger and no cooldown is in
    /// effect; the alert instant is then recorded. `None` otherwise, with the
    /// state unchanged.
    pub fn evaluate(&mut self, level: ProximityLevel, now: Instant) -> Option<Alert> {
        if self.in_cooldown(now) {
            return None;
        }

        let alert_level = match level {
            ProximityLevel::Danger => AlertLevel::Danger,
            ProximityLevel::Warning => AlertLevel::Warning,
            ProximityLevel::Safe => return None,
        };

        self.last_alert = Some(now);
        Some(Alert::new(alert_level))
    }

    /// Forget the alert history, e.g. when the camera session restarts.
    pub fn reset(&mut self) {
        self.last_alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_first_danger_alerts_immediately() {
        let mut controller = AlertController::default();
        let t0 = Instant::now();
        assert_eq!(
            controller.evaluate(ProximityLevel::Danger, t0),
            Some(Alert::new(AlertLevel::Danger))
        );
        assert_eq!(controller.last_alert(), Some(t0));
    }

    #[test]
    fn test_cooldown_suppresses_repeat() {
        let mut controller = AlertController::new(ms(2000));
        let t0 = Instant::now();

        let alerts: Vec<_> = [t0, t0 + ms(500)]
            .into_iter()
            .filter_map(|now| controller.evaluate(ProximityLevel::Danger, now))
            .collect();
        assert_eq!(alerts, vec![Alert::new(AlertLevel::Danger)]);
    }

    #[test]
    fn test_cooldown_expires() {
        let mut controller = AlertController::new(ms(2000));
        let t0 = Instant::now();

        let alerts: Vec<_> = [t0, t0 + ms(2500)]
            .into_iter()
            .filter_map(|now| controller.evaluate(ProximityLevel::Danger, now))
            .collect();
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive_of_expiry() {
        let mut controller = AlertController::new(ms(2000));
        let t0 = Instant::now();
        assert!(controller.evaluate(ProximityLevel::Warning, t0).is_some());
        assert!(controller.evaluate(ProximityLevel::Warning, t0 + ms(1999)).is_none());
        assert!(controller.evaluate(ProximityLevel::Warning, t0 + ms(2000)).is_some());
    }

    #[test]
    fn test_danger_never_reported_as_warning() {
        let mut controller = AlertController::new(Duration::ZERO);
        let t0 = Instant::now();
        for step in 0..5 {
            let alert = controller.evaluate(ProximityLevel::Danger, t0 + ms(step * 10));
            assert_eq!(alert.map(|a| a.level), Some(AlertLevel::Danger));
        }
    }

    #[test]
    fn test_safe_frame_does_not_reset_cooldown() {
        let mut controller = AlertController::new(ms(2000));
        let t0 = Instant::now();

        assert!(controller.evaluate(ProximityLevel::Warning, t0).is_some());
        assert!(controller.evaluate(ProximityLevel::Safe, t0 + ms(1000)).is_none());
        assert_eq!(controller.last_alert(), Some(t0));
        // Still inside the window opened at t0
        assert!(controller.evaluate(ProximityLevel::Danger, t0 + ms(1500)).is_none());
        assert!(controller.evaluate(ProximityLevel::Danger, t0 + ms(2100)).is_some());
    }

    #[test]
    fn test_safe_never_alerts() {
        let mut controller = AlertController::default();
        assert!(controller.evaluate(ProximityLevel::Safe, Instant::now()).is_none());
        assert!(controller.last_alert().is_none());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut controller = AlertController::new(ms(2000));
        let t0 = Instant::now();
        assert!(controller.evaluate(ProximityLevel::Danger, t0).is_some());

        controller.reset();
        assert!(controller.last_alert().is_none());
        assert!(controller.evaluate(ProximityLevel::Danger, t0 + ms(100)).is_some());
    }

    #[test]
    fn test_backwards_clock_stays_in_cooldown() {
        let mut controller = AlertController::new(ms(2000));
        let t0 = Instant::now() + ms(5000);
        assert!(controller.evaluate(ProximityLevel::Danger, t0).is_some());
        assert!(controller.in_cooldown(t0 - ms(1000)));
    }

    #[test]
    fn test_phrases() {
        assert_eq!(AlertLevel::Danger.phrase(), "Danger! Car very close!");
        assert_eq!(AlertLevel::Warning.phrase(), "Warning! Car approaching");
        assert_eq!(AlertLevel::Danger.to_string(), "danger");
    }

    #[test]
    fn test_closure_sink() {
        let mut spoken = Vec::new();
        let mut sink = |alert: &Alert| spoken.push(alert.phrase());
        sink.on_alert(&Alert::new(AlertLevel::Warning));
        sink.on_alert(&Alert::new(AlertLevel::Danger));
        assert_eq!(
            spoken,
            vec!["Warning! Car approaching", "Danger! Car very close!"]
        );
    }
}
