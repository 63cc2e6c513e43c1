pub mod aabb;
pub mod detection;
pub mod resolution;
pub mod spatial_grid;

// Re-export key types
pub use aabb::AABB;
pub use detection::*;
pub use resolution::*;
pub use spatial_grid::SpatialGrid;
