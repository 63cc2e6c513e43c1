pub mod integrator;

pub use integrator::{apply_force, apply_force_polygon, integrate};
