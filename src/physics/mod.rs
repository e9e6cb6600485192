pub mod inertia;

pub use inertia::{disk_inertia, InertiaConfig, InertiaModel};
