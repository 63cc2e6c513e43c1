use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;

/// An axis-aligned rectangle. The owning body's position is its top-left
/// (minimum) corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(PhysicsError::InvalidDimension { name, value });
            }
        }
        Ok(Self { width, height })
    }

    /// Offset from the top-left corner to the center.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}
