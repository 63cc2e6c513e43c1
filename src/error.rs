//! Error types for body, grid and world construction.

use thiserror::Error;

/// Precondition violations rejected at construction time.
///
/// Runtime physics edge cases (zero-length normals, separating pairs,
/// immovable bodies) are silent no-ops and never produce one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// A movable body needs a finite, positive mass.
    #[error("movable body requires a positive finite mass, got {mass}")]
    NonPositiveMass { mass: f64 },

    /// Polygons need at least three vertices.
    #[error("polygon requires at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    /// A shape dimension was not positive and finite.
    #[error("invalid {name}: {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    /// Broadphase cells must have a positive finite size.
    #[error("grid cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    /// A handle that does not refer to a body in the world.
    #[error("no body with handle {0}")]
    UnknownBody(usize),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
