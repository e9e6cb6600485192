use log::{debug, warn};

use crate::gnc::Mode;
use crate::telemetry::TelemetrySample;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    EnteredDeadband,
    LeftDeadband,
    WheelBrakeStart,
    WheelBrakeEnd,
    Custom(String),
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive samples and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &TelemetrySample, current: &TelemetrySample) -> Option<EventKind>;
}

/// Reports every crossing of the deadband boundary. No hysteresis, so this can
/// fire on consecutive ticks near the threshold. Ticks without a mode (skipped,
/// or from a controller that doesn't report one) are stepped over.
#[derive(Debug, Default)]
pub struct DeadbandDetector {
    last: Option<Mode>,
}

impl EventDetector for DeadbandDetector {
    fn check(&mut self, prev: &TelemetrySample, current: &TelemetrySample) -> Option<EventKind> {
        // `prev` on the first call is the opening sample, never seen as `current`.
        if self.last.is_none() {
            self.last = prev.mode;
        }
        let mode = current.mode?;
        match (self.last.replace(mode)?, mode) {
            (Mode::Active, Mode::Deadband) => {
                debug!("t={:.3}s entered deadband", current.time);
                Some(EventKind::EnteredDeadband)
            }
            (Mode::Deadband, Mode::Active) => {
                debug!("t={:.3}s left deadband", current.time);
                Some(EventKind::LeftDeadband)
            }
            _ => None,
        }
    }
}

/// Reports onset and end of wheel over-speed braking.
pub struct WheelBrakeDetector;

impl EventDetector for WheelBrakeDetector {
    fn check(&mut self, prev: &TelemetrySample, current: &TelemetrySample) -> Option<EventKind> {
        match (prev.braking, current.braking) {
            (false, true) => {
                warn!(
                    "t={:.3}s wheel over speed ({:.0} RPM), braking",
                    current.time, current.wheel_rpm
                );
                Some(EventKind::WheelBrakeStart)
            }
            (true, false) => Some(EventKind::WheelBrakeEnd),
            _ => None,
        }
    }
}

/// Detects when |heading error| first drops below a threshold.
pub struct ErrorThresholdDetector {
    pub threshold_deg: f64,
    fired: bool,
}

impl ErrorThresholdDetector {
    pub fn new(threshold_deg: f64) -> Self {
        Self { threshold_deg, fired: false }
    }
}

impl EventDetector for ErrorThresholdDetector {
    fn check(&mut self, prev: &TelemetrySample, current: &TelemetrySample) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if prev.error_deg.abs() >= self.threshold_deg && current.error_deg.abs() < self.threshold_deg {
            self.fired = true;
            Some(EventKind::Custom(format!("Error below {:.1} deg", self.threshold_deg)))
        } else {
            None
        }
    }
}
