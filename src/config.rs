use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{check_finite, ControlError, ControlResult};
use crate::physics::InertiaConfig;

// ---------------------------------------------------------------------------
// Controller configuration
// ---------------------------------------------------------------------------

/// Gains and actuator limits of the stabilizer.
///
/// `target_angular_velocity` is stored and settable but does not enter the
/// control law; the wheel speed limit is always derived from `max_wheel_rpm`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub kp: f64,
    pub kd: f64,
    pub ki: f64,
    pub target_angular_velocity: f64, // rad/s
    pub max_torque: f64,              // Nm
    pub max_wheel_rpm: f64,
    pub manual_torque_multiplier: f64, // Nm
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            kp: 19.1,
            kd: 9.5,
            ki: 0.0,
            target_angular_velocity: 0.0,
            max_torque: 11.0,
            max_wheel_rpm: 4000.0,
            manual_torque_multiplier: 2000.0,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> ControlResult<()> {
        for (name, v) in [
            ("kp", self.kp),
            ("kd", self.kd),
            ("ki", self.ki),
            ("target_angular_velocity", self.target_angular_velocity),
            ("manual_torque_multiplier", self.manual_torque_multiplier),
        ] {
            if !v.is_finite() {
                return Err(ControlError::config(format!("{name} must be finite, got {v}")));
            }
        }
        if !(self.max_torque.is_finite() && self.max_torque > 0.0) {
            return Err(ControlError::config(format!(
                "max_torque must be > 0, got {}",
                self.max_torque
            )));
        }
        if !(self.max_wheel_rpm.is_finite() && self.max_wheel_rpm > 0.0) {
            return Err(ControlError::config(format!(
                "max_wheel_rpm must be > 0, got {}",
                self.max_wheel_rpm
            )));
        }
        Ok(())
    }

    /// Wheel speed above which the braking branch takes over (rad/s).
    pub fn wheel_speed_limit(&self) -> f64 {
        rpm_to_rad_s(self.max_wheel_rpm)
    }

    pub fn set_kp(&mut self, value: f64) -> ControlResult<()> {
        self.kp = check_finite("kp", value)?;
        info!("kp set to {}", value);
        Ok(())
    }

    pub fn set_kd(&mut self, value: f64) -> ControlResult<()> {
        self.kd = check_finite("kd", value)?;
        info!("kd set to {}", value);
        Ok(())
    }

    pub fn set_ki(&mut self, value: f64) -> ControlResult<()> {
        self.ki = check_finite("ki", value)?;
        info!("ki set to {}", value);
        Ok(())
    }

    pub fn set_target_angular_velocity(&mut self, value: f64) -> ControlResult<()> {
        self.target_angular_velocity = check_finite("target_angular_velocity", value)?;
        info!("target angular velocity set to {} rad/s", value);
        Ok(())
    }

    pub fn set(&mut self, field: ParameterField, value: f64) -> ControlResult<()> {
        match field {
            ParameterField::Kp => self.set_kp(value),
            ParameterField::Kd => self.set_kd(value),
            ParameterField::Ki => self.set_ki(value),
            ParameterField::TargetAngularVelocity => self.set_target_angular_velocity(value),
        }
    }

    /// Parse user text and apply it. Unparsable or non-finite text is dropped
    /// and the current value kept; returns whether the value changed hands.
    pub fn update_from_text(&mut self, field: ParameterField, text: &str) -> bool {
        let Ok(value) = text.trim().parse::<f64>() else {
            debug!("ignoring {:?} input {:?}: not a number", field, text);
            return false;
        };
        match self.set(field, value) {
            Ok(()) => true,
            Err(e) => {
                debug!("ignoring {:?} input {:?}: {}", field, text, e);
                false
            }
        }
    }
}

/// Tunables exposed to the host's text-entry layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterField {
    Kp,
    Kd,
    Ki,
    TargetAngularVelocity,
}

pub fn rpm_to_rad_s(rpm: f64) -> f64 {
    rpm * 2.0 * std::f64::consts::PI / 60.0
}

pub fn rad_s_to_rpm(rate: f64) -> f64 {
    rate * 60.0 / (2.0 * std::f64::consts::PI)
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
    pub initial_yaw_deg: f64,
    pub initial_body_rate: f64,
    pub angular_drag: f64,
    pub max_angular_velocity: Option<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,        // 50 Hz fixed physics tick
            max_time: 10.0,
            initial_yaw_deg: 30.0,
            initial_body_rate: 0.0,
            angular_drag: 0.05,
            max_angular_velocity: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ControlError::config(format!("dt must be > 0, got {}", self.dt)));
        }
        if !(self.max_time.is_finite() && self.max_time >= 0.0) {
            return Err(ControlError::config(format!(
                "max_time must be >= 0, got {}",
                self.max_time
            )));
        }
        if !self.initial_yaw_deg.is_finite() || !self.initial_body_rate.is_finite() {
            return Err(ControlError::config("initial conditions must be finite"));
        }
        if !(self.angular_drag.is_finite() && self.angular_drag >= 0.0) {
            return Err(ControlError::config(format!(
                "angular_drag must be >= 0, got {}",
                self.angular_drag
            )));
        }
        if let Some(cap) = self.max_angular_velocity {
            if !(cap.is_finite() && cap > 0.0) {
                return Err(ControlError::config(format!(
                    "max_angular_velocity must be > 0, got {cap}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top-level file layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    pub controller: ControllerConfig,
    pub inertia: InertiaConfig,
    pub sim: SimConfig,
}

impl StabilizerConfig {
    pub fn from_toml_str(s: &str) -> ControlResult<Self> {
        let cfg: StabilizerConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> ControlResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&text)?;
        info!("loaded configuration from {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> ControlResult<()> {
        self.controller.validate()?;
        self.inertia.validate()?;
        self.sim.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_update_applies_number() {
        let mut cfg = ControllerConfig::default();
        assert!(cfg.update_from_text(ParameterField::Kp, "5.5"));
        assert_eq!(cfg.kp, 5.5);
    }

    #[test]
    fn text_update_ignores_garbage() {
        let mut cfg = ControllerConfig::default();
        assert!(!cfg.update_from_text(ParameterField::Kp, "abc"));
        assert_eq!(cfg.kp, 19.1);
    }

    #[test]
    fn text_update_ignores_non_finite() {
        let mut cfg = ControllerConfig::default();
        assert!(!cfg.update_from_text(ParameterField::Kd, "NaN"));
        assert!(!cfg.update_from_text(ParameterField::Ki, "inf"));
        assert_eq!(cfg.kd, 9.5);
        assert_eq!(cfg.ki, 0.0);
    }

    #[test]
    fn text_update_trims_whitespace() {
        let mut cfg = ControllerConfig::default();
        assert!(cfg.update_from_text(ParameterField::TargetAngularVelocity, " 1.25 \n"));
        assert_eq!(cfg.target_angular_velocity, 1.25);
    }

    #[test]
    fn setters_reject_non_finite() {
        let mut cfg = ControllerConfig::default();
        assert!(cfg.set_ki(f64::NEG_INFINITY).is_err());
        assert_eq!(cfg.ki, 0.0);
    }

    #[test]
    fn wheel_limit_from_rpm() {
        let cfg = ControllerConfig::default();
        // 4000 rpm ≈ 418.879 rad/s
        assert!((cfg.wheel_speed_limit() - 418.879_020_478_639).abs() < 1e-6);
    }

    #[test]
    fn rpm_conversion_round_trip() {
        assert!((rad_s_to_rpm(2.0 * std::f64::consts::PI) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn toml_partial_file_keeps_defaults() {
        let cfg = StabilizerConfig::from_toml_str(
            r#"
            [controller]
            kp = 2.0
            [sim]
            dt = 0.01
            max_angular_velocity = 7.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.controller.kp, 2.0);
        assert_eq!(cfg.controller.kd, 9.5);
        assert_eq!(cfg.sim.dt, 0.01);
        assert_eq!(cfg.sim.max_angular_velocity, Some(7.0));
        assert_eq!(cfg.inertia, InertiaConfig::default());
    }

    #[test]
    fn toml_rejects_bad_limits() {
        let err = StabilizerConfig::from_toml_str("[controller]\nmax_torque = -1.0\n").unwrap_err();
        assert!(matches!(err, ControlError::InvalidConfig { .. }));
    }

    #[test]
    fn toml_rejects_zero_dt() {
        assert!(StabilizerConfig::from_toml_str("[sim]\ndt = 0.0\n").is_err());
    }

    #[test]
    fn toml_syntax_error_surfaces() {
        let err = StabilizerConfig::from_toml_str("[controller\nkp = 1").unwrap_err();
        assert!(matches!(err, ControlError::ConfigParse(_)));
    }
}
