use crate::error::{PhysicsError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(PhysicsError::InvalidDimension {
                name: "radius",
                value: radius,
            });
        }
        Ok(Self { radius })
    }
}
