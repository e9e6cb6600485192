use thiserror::Error;

/// Errors raised by the stabilizer core and its configuration layer.
#[derive(Error, Debug)]
pub enum ControlError {
    /// Timestep was zero, negative or not finite. The tick is skipped.
    #[error("invalid timestep: {dt} s (must be finite and > 0)")]
    InvalidTimestep { dt: f64 },

    /// A kinematics field carried NaN or infinity.
    #[error("invalid kinematics: {field} is not finite")]
    InvalidKinematics { field: &'static str },

    /// A parameter setter received a non-finite value.
    #[error("invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Loaded configuration failed validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl ControlError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        ControlError::InvalidConfig { message: message.into() }
    }
}

/// Result alias used across the crate.
pub type ControlResult<T> = Result<T, ControlError>;

/// Reject NaN and infinities for a named scalar.
pub(crate) fn check_finite(name: &'static str, value: f64) -> ControlResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ControlError::InvalidParameter { name, value })
    }
}
