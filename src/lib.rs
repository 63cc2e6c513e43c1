//! A small 2D rigid-body physics core: semi-implicit Euler integration,
//! circle / rectangle / convex-polygon collision detection and response,
//! damped springs and a spatial-hash broadphase.
//!
//! Bodies live in a [`PhysicsWorld`] and are addressed by [`BodyHandle`].
//! The detection and response functions in [`collision`] are also usable on
//! their own for callers that run their own pipeline.

pub mod collision;
pub mod constraints;
pub mod error;
pub mod integration;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod world;

// Re-export key types for easier use
pub use collision::{ImpulseConfig, SpatialGrid, AABB};
pub use constraints::{Constraint, Spring};
pub use error::{PhysicsError, Result};
pub use math::vec2::Vec2;
pub use objects::rigid_body::{BodyHandle, RigidBody, INFINITE_MASS};
pub use shapes::{Circle, Polygon, Rectangle, Shape};
pub use world::{PhysicsWorld, StepStats, WorldConfig};
