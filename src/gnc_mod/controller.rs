use crate::dynamics::state::{BodyKinematics, TorqueCommand};
use crate::error::ControlResult;
use super::manual::ManualDirection;
use super::pid::Mode;

/// What a controller did on its last successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub mode: Mode,
    /// Wheel torque came from the over-speed brake rather than the reaction pair.
    pub braking: bool,
}

/// Trait for single-axis stabilizers.
///
/// Implement this to plug a different control law into the simulation loop.
pub trait Controller {
    /// Compute torque commands from the current measurement. An `Err` means
    /// the tick was skipped and the controller's memory is unchanged.
    fn control(&mut self, kinematics: &BodyKinematics, dt: f64) -> ControlResult<TorqueCommand>;

    /// Torque for a manual override event. Defaults to none.
    fn manual_torque(&self, _direction: ManualDirection) -> TorqueCommand {
        TorqueCommand::ZERO
    }

    /// Reset controller internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Branch taken by the most recent `Ok` from `control`. Controllers that
    /// don't classify their ticks report nothing.
    fn last_tick(&self) -> Option<TickReport> {
        None
    }

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
