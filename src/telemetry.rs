use crate::config::rad_s_to_rpm;
use crate::dynamics::state::{BodyKinematics, TorqueCommand};
use crate::gnc::{yaw_error, ManualDirection, Mode, TickReport};

// ---------------------------------------------------------------------------
// Display strings for the host UI
// ---------------------------------------------------------------------------

pub fn pid_output_text(control_torque: f64) -> String {
    format!("PID Output: {:.2} Nm", control_torque)
}

pub fn current_rpm_text(rpm: f64) -> String {
    format!("Current RPM: {:.2} RPM", rpm)
}

// ---------------------------------------------------------------------------
// Per-tick record
// ---------------------------------------------------------------------------

/// One control tick: what was measured and what was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetrySample {
    pub time: f64,           // s
    pub yaw_deg: f64,        // deg, 0..360
    pub error_deg: f64,      // deg
    pub body_rate: f64,      // rad/s
    pub wheel_rate: f64,     // rad/s
    pub wheel_rpm: f64,
    pub control_torque: f64, // Nm, controller body output
    pub applied: TorqueCommand, // controller output + manual override
    pub mode: Option<Mode>,     // as reported by the controller, none if skipped
    pub braking: bool,
    pub manual: Option<ManualDirection>,
    pub skipped: bool,
}

impl TelemetrySample {
    /// Build a record from a measurement and the controller's response.
    /// `tick` is the controller's own account of the branch it took.
    pub fn record(
        time: f64,
        kin: &BodyKinematics,
        control: TorqueCommand,
        applied: TorqueCommand,
        tick: Option<TickReport>,
    ) -> Self {
        Self {
            control_torque: control.body_torque,
            applied,
            mode: tick.map(|t| t.mode),
            braking: tick.is_some_and(|t| t.braking),
            ..Self::measured(time, kin)
        }
    }

    /// Record a tick the controller rejected. Nothing was computed, so no
    /// mode and no braking; `applied` holds only what the host added.
    pub fn skipped(time: f64, kin: &BodyKinematics, applied: TorqueCommand) -> Self {
        Self { applied, skipped: true, ..Self::measured(time, kin) }
    }

    fn measured(time: f64, kin: &BodyKinematics) -> Self {
        Self {
            time,
            yaw_deg: kin.yaw_deg,
            error_deg: yaw_error(kin.yaw_deg),
            body_rate: kin.body_rate,
            wheel_rate: kin.wheel_rate,
            wheel_rpm: rad_s_to_rpm(kin.wheel_rate.abs()),
            ..Self::default()
        }
    }

    pub fn pid_output_text(&self) -> String {
        pid_output_text(self.control_torque)
    }

    pub fn rpm_text(&self) -> String {
        current_rpm_text(self.wheel_rpm)
    }
}
