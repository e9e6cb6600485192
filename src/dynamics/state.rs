use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::error::{ControlError, ControlResult};

// ---------------------------------------------------------------------------
// Per-tick measurement handed to the controller
// ---------------------------------------------------------------------------

/// Snapshot of the controlled axis. Supplied fresh every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyKinematics {
    pub yaw_deg: f64,    // deg, 0..360 convention
    pub body_rate: f64,  // rad/s about the control axis
    pub wheel_rate: f64, // rad/s about the control axis
}

impl BodyKinematics {
    pub fn new(yaw_deg: f64, body_rate: f64, wheel_rate: f64) -> Self {
        Self { yaw_deg, body_rate, wheel_rate }
    }

    /// Read the control axis (body Y) out of full rigid-body states.
    pub fn from_rigid_bodies(body: &RigidBodyState, wheel: &RigidBodyState) -> Self {
        Self {
            yaw_deg: body.yaw_deg(),
            body_rate: body.axis_rate(),
            wheel_rate: wheel.axis_rate(),
        }
    }

    pub(crate) fn validate(&self) -> ControlResult<()> {
        let fields = [
            ("yaw_deg", self.yaw_deg),
            ("body_rate", self.body_rate),
            ("wheel_rate", self.wheel_rate),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some(&(field, _)) => Err(ControlError::InvalidKinematics { field }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TorqueCommand {
    pub body_torque: f64,  // Nm about the control axis
    pub wheel_torque: f64, // Nm about the control axis
}

impl TorqueCommand {
    pub const ZERO: TorqueCommand = TorqueCommand { body_torque: 0.0, wheel_torque: 0.0 };

    pub fn body_only(body_torque: f64) -> Self {
        Self { body_torque, wheel_torque: 0.0 }
    }

    pub fn is_zero(&self) -> bool {
        self.body_torque == 0.0 && self.wheel_torque == 0.0
    }
}

impl std::ops::Add for TorqueCommand {
    type Output = TorqueCommand;

    fn add(self, rhs: TorqueCommand) -> TorqueCommand {
        TorqueCommand {
            body_torque: self.body_torque + rhs.body_torque,
            wheel_torque: self.wheel_torque + rhs.wheel_torque,
        }
    }
}

// ---------------------------------------------------------------------------
// Rigid-body state (attitude + angular rate), control axis = body Y
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyState {
    pub quat: UnitQuaternion<f64>, // body→world rotation
    pub omega: Vector3<f64>,       // rad/s, body frame angular velocity
}

impl RigidBodyState {
    pub fn at_rest() -> Self {
        Self { quat: UnitQuaternion::identity(), omega: Vector3::zeros() }
    }

    /// Body rotated `yaw_deg` about Y and spinning at `rate` rad/s about Y.
    pub fn with_yaw(yaw_deg: f64, rate: f64) -> Self {
        Self {
            quat: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw_deg.to_radians()),
            omega: Vector3::new(0.0, rate, 0.0),
        }
    }

    /// Heading about Y in degrees, wrapped to [0, 360).
    pub fn yaw_deg(&self) -> f64 {
        let fwd = self.quat * Vector3::x();
        let yaw = (-fwd.z).atan2(fwd.x).to_degrees().rem_euclid(360.0);
        // rem_euclid can round tiny negatives up to exactly 360
        if yaw >= 360.0 { 0.0 } else { yaw }
    }

    pub fn axis_rate(&self) -> f64 {
        self.omega.y
    }
}

// ---------------------------------------------------------------------------
// Plant state: controlled body + reaction wheel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PlantState {
    pub time: f64,
    pub body: RigidBodyState,
    pub wheel: RigidBodyState,
}

impl PlantState {
    pub fn new(initial_yaw_deg: f64, initial_body_rate: f64) -> Self {
        Self {
            time: 0.0,
            body: RigidBodyState::with_yaw(initial_yaw_deg, initial_body_rate),
            wheel: RigidBodyState::at_rest(),
        }
    }

    pub fn kinematics(&self) -> BodyKinematics {
        BodyKinematics::from_rigid_bodies(&self.body, &self.wheel)
    }

    pub fn apply(&self, d: &Deriv, dt: f64) -> PlantState {
        PlantState {
            time: self.time + dt,
            body: RigidBodyState {
                quat: UnitQuaternion::new_normalize(self.body.quat.quaternion() + d.body_dquat * dt),
                omega: self.body.omega + d.body_domega * dt,
            },
            wheel: RigidBodyState {
                quat: UnitQuaternion::new_normalize(
                    self.wheel.quat.quaternion() + d.wheel_dquat * dt,
                ),
                omega: self.wheel.omega + d.wheel_domega * dt,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Deriv {
    pub body_dquat: Quaternion<f64>, // NOT unit — raw quaternion derivative
    pub body_domega: Vector3<f64>,
    pub wheel_dquat: Quaternion<f64>,
    pub wheel_domega: Vector3<f64>,
}
