use nalgebra::{Quaternion, Vector3};

use crate::dynamics::state::{Deriv, PlantState, RigidBodyState, TorqueCommand};
use crate::physics::InertiaModel;

// ---------------------------------------------------------------------------
// Single-axis plant: body and wheel as independent rigid bodies
// ---------------------------------------------------------------------------

/// Physical parameters of the plant.
#[derive(Debug, Clone, Copy)]
pub struct PlantParams {
    pub inertia: InertiaModel,
    pub angular_drag: f64, // 1/s, linear rate damping
}

impl Default for PlantParams {
    fn default() -> Self {
        Self { inertia: InertiaModel::default(), angular_drag: 0.05 }
    }
}

/// Compute plant derivatives under a torque command held constant over the step.
///
/// Torques act about body Y:
///   1. `body_torque` on the controlled body
///   2. `wheel_torque` on the reaction wheel
///   3. Linear angular drag on both
pub fn derivatives(state: &PlantState, params: &PlantParams, cmd: &TorqueCommand) -> Deriv {
    let (body_dquat, body_domega) =
        body_rates(&state.body, cmd.body_torque, params.inertia.body, params.angular_drag);
    let (wheel_dquat, wheel_domega) =
        body_rates(&state.wheel, cmd.wheel_torque, params.inertia.wheel, params.angular_drag);

    Deriv { body_dquat, body_domega, wheel_dquat, wheel_domega }
}

fn body_rates(
    body: &RigidBodyState,
    torque_y: f64,
    inertia: f64,
    drag: f64,
) -> (Quaternion<f64>, Vector3<f64>) {
    // Symmetric about Y: the gyroscopic term vanishes for rotation about that axis.
    let domega = Vector3::y() * (torque_y / inertia) - body.omega * drag;

    // --- Quaternion kinematics: dq/dt = 0.5 * q * omega_quat ---
    let omega_quat = Quaternion::new(0.0, body.omega.x, body.omega.y, body.omega.z);
    let dquat = body.quat.quaternion() * omega_quat * 0.5;

    (dquat, domega)
}
