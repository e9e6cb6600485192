use nalgebra::UnitQuaternion;

use crate::dynamics::plant::{derivatives, PlantParams};
use crate::dynamics::state::{PlantState, RigidBodyState, TorqueCommand};

// ---------------------------------------------------------------------------
// RK4 integrator with constant torque command over the step
// ---------------------------------------------------------------------------

/// Single RK4 step with constant torque command over the step.
pub fn rk4_step(state: &PlantState, params: &PlantParams, cmd: &TorqueCommand, dt: f64) -> PlantState {
    let k1 = derivatives(state, params, cmd);
    let k2 = derivatives(&state.apply(&k1, dt * 0.5), params, cmd);
    let k3 = derivatives(&state.apply(&k2, dt * 0.5), params, cmd);
    let k4 = derivatives(&state.apply(&k3, dt), params, cmd);

    let body_quat_raw = state.body.quat.quaternion()
        + (k1.body_dquat + k2.body_dquat * 2.0 + k3.body_dquat * 2.0 + k4.body_dquat) * (dt / 6.0);
    let wheel_quat_raw = state.wheel.quat.quaternion()
        + (k1.wheel_dquat + k2.wheel_dquat * 2.0 + k3.wheel_dquat * 2.0 + k4.wheel_dquat)
            * (dt / 6.0);

    PlantState {
        time: state.time + dt,
        body: RigidBodyState {
            quat: UnitQuaternion::new_normalize(body_quat_raw),
            omega: state.body.omega
                + (k1.body_domega + 2.0 * k2.body_domega + 2.0 * k3.body_domega + k4.body_domega)
                    * (dt / 6.0),
        },
        wheel: RigidBodyState {
            quat: UnitQuaternion::new_normalize(wheel_quat_raw),
            omega: state.wheel.omega
                + (k1.wheel_domega + 2.0 * k2.wheel_domega + 2.0 * k3.wheel_domega + k4.wheel_domega)
                    * (dt / 6.0),
        },
    }
}

/// Clamp angular speed magnitude, as physics engines do with their per-body cap.
pub fn cap_angular_velocity(body: &mut RigidBodyState, max_rate: f64) {
    let speed = body.omega.norm();
    if speed > max_rate {
        body.omega *= max_rate / speed;
    }
}
