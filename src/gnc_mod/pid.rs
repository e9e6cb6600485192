// ---------------------------------------------------------------------------
// Reaction wheel PID stabilizer (single axis)
// ---------------------------------------------------------------------------

use log::warn;

use crate::config::{rad_s_to_rpm, ControllerConfig, ParameterField};
use crate::dynamics::state::{BodyKinematics, TorqueCommand};
use crate::error::{ControlError, ControlResult};
use crate::physics::InertiaModel;
use super::controller::TickReport;
use super::manual::ManualDirection;

/// Heading error (deg) under which a tick may fall in the deadband.
pub const DEADBAND_ERROR_DEG: f64 = 0.1;
/// Body rate (rad/s) under which a tick may fall in the deadband. Both bounds
/// must hold for the controller to hold off and clear the integrator.
pub const DEADBAND_RATE: f64 = 0.1;

/// Map a 0..360 heading into (-180, 180].
pub fn normalize_angle(deg: f64) -> f64 {
    if deg > 180.0 {
        deg - 360.0
    } else {
        deg
    }
}

/// Heading error driving the control law. Negated yaw: this sign sets the
/// actuation direction.
pub fn yaw_error(yaw_deg: f64) -> f64 {
    -normalize_angle(yaw_deg)
}

/// Which branch a tick takes. Evaluated fresh every tick, no hysteresis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Active,
    Deadband,
}

impl Mode {
    pub fn classify(error: f64, body_rate: f64) -> Mode {
        if error.abs() < DEADBAND_ERROR_DEG && body_rate.abs() < DEADBAND_RATE {
            Mode::Deadband
        } else {
            Mode::Active
        }
    }
}

/// Mutable controller memory.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerState {
    pub previous_error: f64, // deg
    pub integral: f64,       // deg·s, unbounded
    pub current_rpm: f64,    // telemetry
}

#[derive(Debug, Clone)]
pub struct WheelPid {
    config: ControllerConfig,
    state: ControllerState,
    inertia: InertiaModel,
    last_command: TorqueCommand,
    last_tick: Option<TickReport>,
}

impl WheelPid {
    pub fn new(config: ControllerConfig) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: ControllerState::default(),
            inertia: InertiaModel::default(),
            last_command: TorqueCommand::ZERO,
            last_tick: None,
        })
    }

    /// Attach inertia telemetry. Never read by `step`.
    pub fn with_inertia(mut self, inertia: InertiaModel) -> Self {
        self.inertia = inertia;
        self
    }

    /// Run one control tick.
    ///
    /// `dt` must be the same fixed cadence every call for the derivative and
    /// integral terms to mean anything. A non-positive or non-finite `dt`, or
    /// non-finite kinematics, skips the tick and leaves all state untouched.
    pub fn step(&mut self, kin: &BodyKinematics, dt: f64) -> ControlResult<TorqueCommand> {
        if !(dt.is_finite() && dt > 0.0) {
            warn!("skipping control tick: dt = {}", dt);
            return Err(ControlError::InvalidTimestep { dt });
        }
        if let Err(e) = kin.validate() {
            warn!("skipping control tick: {}", e);
            return Err(e);
        }

        let error = yaw_error(kin.yaw_deg);

        if Mode::classify(error, kin.body_rate) == Mode::Deadband {
            self.state.integral = 0.0;
            self.state.previous_error = error;
            self.last_command = TorqueCommand::ZERO;
            self.last_tick = Some(TickReport { mode: Mode::Deadband, braking: false });
            return Ok(TorqueCommand::ZERO);
        }

        let cfg = &self.config;
        self.state.integral += error * dt;
        let derivative = (error - self.state.previous_error) / dt;

        let control_torque = (cfg.kp * error + cfg.kd * derivative + cfg.ki * self.state.integral)
            .clamp(-cfg.max_torque, cfg.max_torque);

        // Reaction pair, unless the wheel is over speed: then brake it at full torque.
        let braking = kin.wheel_rate.abs() > cfg.wheel_speed_limit();
        let wheel_torque = if braking {
            -kin.wheel_rate.signum() * cfg.max_torque
        } else {
            -control_torque
        };

        self.state.current_rpm = rad_s_to_rpm(kin.wheel_rate.abs());
        self.state.previous_error = error;

        let cmd = TorqueCommand { body_torque: control_torque, wheel_torque };
        self.last_command = cmd;
        self.last_tick = Some(TickReport { mode: Mode::Active, braking });
        Ok(cmd)
    }

    /// Constant override torque on the body only. PID memory is not touched.
    pub fn apply_manual_torque(&self, direction: ManualDirection) -> TorqueCommand {
        TorqueCommand::body_only(direction.sign() * self.config.manual_torque_multiplier)
    }

    pub fn set_kp(&mut self, value: f64) -> ControlResult<()> {
        self.config.set_kp(value)
    }

    pub fn set_kd(&mut self, value: f64) -> ControlResult<()> {
        self.config.set_kd(value)
    }

    pub fn set_ki(&mut self, value: f64) -> ControlResult<()> {
        self.config.set_ki(value)
    }

    pub fn set_target_angular_velocity(&mut self, value: f64) -> ControlResult<()> {
        self.config.set_target_angular_velocity(value)
    }

    /// Text-entry hook: applies parsed input, silently keeps the old value otherwise.
    pub fn update_from_text(&mut self, field: ParameterField, text: &str) -> bool {
        self.config.update_from_text(field, text)
    }

    pub fn reset(&mut self) {
        self.state = ControllerState::default();
        self.last_command = TorqueCommand::ZERO;
        self.last_tick = None;
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn inertia(&self) -> &InertiaModel {
        &self.inertia
    }

    pub fn previous_error(&self) -> f64 {
        self.state.previous_error
    }

    pub fn integral(&self) -> f64 {
        self.state.integral
    }

    pub fn current_rpm(&self) -> f64 {
        self.state.current_rpm
    }

    /// Body torque of the last completed tick (zero after a deadband tick).
    pub fn control_torque(&self) -> f64 {
        self.last_command.body_torque
    }

    pub fn last_command(&self) -> TorqueCommand {
        self.last_command
    }

    /// Branch taken by the last completed tick, `None` before the first one.
    pub fn last_tick(&self) -> Option<TickReport> {
        self.last_tick
    }
}

impl Default for WheelPid {
    fn default() -> Self {
        Self {
            config: ControllerConfig::default(),
            state: ControllerState::default(),
            inertia: InertiaModel::default(),
            last_command: TorqueCommand::ZERO,
            last_tick: None,
        }
    }
}

impl super::Controller for WheelPid {
    fn control(&mut self, kin: &BodyKinematics, dt: f64) -> ControlResult<TorqueCommand> {
        self.step(kin, dt)
    }

    fn manual_torque(&self, direction: ManualDirection) -> TorqueCommand {
        self.apply_manual_torque(direction)
    }

    fn reset(&mut self) {
        WheelPid::reset(self);
    }

    fn last_tick(&self) -> Option<TickReport> {
        WheelPid::last_tick(self)
    }

    fn name(&self) -> &str {
        "WheelPid"
    }
}
