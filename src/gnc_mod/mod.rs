pub mod controller;
pub mod manual;
pub mod pid;

pub use controller::{Controller, TickReport};
pub use manual::{ManualDirection, ManualInput};
pub use pid::{normalize_angle, yaw_error, ControllerState, Mode, WheelPid};
