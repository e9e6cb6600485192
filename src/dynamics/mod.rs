pub mod plant;
pub mod state;

pub use plant::{derivatives, PlantParams};
pub use state::{BodyKinematics, Deriv, PlantState, RigidBodyState, TorqueCommand};
