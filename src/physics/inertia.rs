use serde::Deserialize;

use crate::error::{ControlError, ControlResult};

// ---------------------------------------------------------------------------
// Solid-disk moments of inertia for the body and the reaction wheel
// ---------------------------------------------------------------------------

pub const BODY_MASS: f64 = 5.0; // kg
pub const BODY_RADIUS: f64 = 0.06; // m
pub const WHEEL_MASS: f64 = 0.370; // kg
pub const WHEEL_RADIUS: f64 = 0.05; // m

/// Moment of inertia of a solid disk about its symmetry axis: J = m r^2 / 2.
pub fn disk_inertia(mass: f64, radius: f64) -> f64 {
    0.5 * mass * radius * radius
}

/// Mass/radius parameters for body and wheel.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InertiaConfig {
    pub body_mass: f64,
    pub body_radius: f64,
    pub wheel_mass: f64,
    pub wheel_radius: f64,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            body_mass: BODY_MASS,
            body_radius: BODY_RADIUS,
            wheel_mass: WHEEL_MASS,
            wheel_radius: WHEEL_RADIUS,
        }
    }
}

impl InertiaConfig {
    pub fn validate(&self) -> ControlResult<()> {
        let fields = [
            ("body_mass", self.body_mass),
            ("body_radius", self.body_radius),
            ("wheel_mass", self.wheel_mass),
            ("wheel_radius", self.wheel_radius),
        ];
        for (name, v) in fields {
            if !v.is_finite() || v <= 0.0 {
                return Err(ControlError::config(format!("{name} must be > 0, got {v}")));
            }
        }
        Ok(())
    }

    pub fn model(&self) -> InertiaModel {
        InertiaModel {
            body: disk_inertia(self.body_mass, self.body_radius),
            wheel: disk_inertia(self.wheel_mass, self.wheel_radius),
        }
    }
}

/// Derived inertias (kg·m^2). Reported as telemetry; the control law never reads them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertiaModel {
    pub body: f64,
    pub wheel: f64,
}

impl Default for InertiaModel {
    fn default() -> Self {
        InertiaConfig::default().model()
    }
}
