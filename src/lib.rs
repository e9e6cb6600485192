pub mod config;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod physics;
pub mod sim;
pub mod telemetry;
mod gnc_mod;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use config::{ControllerConfig, ParameterField, SimConfig, StabilizerConfig};
pub use dynamics::state::{BodyKinematics, TorqueCommand};
pub use error::{ControlError, ControlResult};
pub use gnc::{Controller, ManualDirection, ManualInput, TickReport, WheelPid};
pub use physics::{InertiaConfig, InertiaModel};
