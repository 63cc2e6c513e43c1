pub mod rigid_body;

pub use rigid_body::{BodyHandle, RigidBody, DEFAULT_RESTITUTION, INFINITE_MASS};
