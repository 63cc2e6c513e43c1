use crate::collision::AABB;
use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;
use crate::shapes::{Circle, Polygon, Rectangle, Shape};

/// Mass used for bodies that should barely respond to impulses.
/// Prefer `movable = false` when a body must never move at all.
pub const INFINITE_MASS: f64 = 1e12;

/// Restitution given to bodies that don't set one explicitly.
pub const DEFAULT_RESTITUTION: f64 = 1.0;

/// Opaque reference to a body owned by a [`PhysicsWorld`](crate::world::PhysicsWorld).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) usize);

impl BodyHandle {
    /// Position of the body in the world's body list.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub shape: Shape,

    /// Circle: center. Rectangle: top-left corner. Polygon: vertex centroid,
    /// derived from the vertices and never set independently.
    pub position: Vec2,
    pub velocity: Vec2,
    /// Force used by the most recent integration step.
    pub force: Vec2,

    /// Must be positive and finite while `movable` is set. Writing this or
    /// `movable` directly skips that check; prefer [`set_movable`](Self::set_movable).
    pub mass: f64,
    /// Immovable bodies ignore forces and impulses regardless of mass.
    pub movable: bool,
    /// Coefficient used when a resolver is not given an explicit one.
    pub restitution: f64,

    // Polygon spin: `rotation` is the angle applied per integration step,
    // `torque` accumulates torque impulses from contacts.
    pub rotation: f64,
    pub torque: f64,
}

impl RigidBody {
    /// Creates a body from any shape. For polygons `position` is ignored and
    /// replaced by the vertex centroid.
    ///
    /// A movable body must have a positive, finite mass.
    pub fn new(shape: Shape, position: Vec2, mass: f64, movable: bool) -> Result<Self> {
        check_mass(mass, movable)?;
        let position = match &shape {
            Shape::Polygon(polygon) => polygon.calculate_centroid(),
            Shape::Circle(_) | Shape::Rectangle(_) => position,
        };
        Ok(Self {
            shape,
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            mass,
            movable,
            restitution: DEFAULT_RESTITUTION,
            rotation: 0.0,
            torque: 0.0,
        })
    }

    pub fn circle(center: Vec2, radius: f64, mass: f64, movable: bool) -> Result<Self> {
        Self::new(Shape::Circle(Circle::new(radius)?), center, mass, movable)
    }

    pub fn rectangle(
        top_left: Vec2,
        width: f64,
        height: f64,
        mass: f64,
        movable: bool,
    ) -> Result<Self> {
        Self::new(
            Shape::Rectangle(Rectangle::new(width, height)?),
            top_left,
            mass,
            movable,
        )
    }

    pub fn polygon(vertices: Vec<Vec2>, mass: f64, movable: bool) -> Result<Self> {
        Self::new(Shape::Polygon(Polygon::new(vertices)?), Vec2::ZERO, mass, movable)
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the default restitution, clamped to [0, 1].
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Switches the body between movable and immovable. Fails, leaving the
    /// body unchanged, when it would become movable without a usable mass.
    pub fn set_movable(&mut self, movable: bool) -> Result<()> {
        check_mass(self.mass, movable)?;
        self.movable = movable;
        Ok(())
    }

    /// `1 / mass` for movable bodies, `0` for immovable ones.
    pub fn inv_mass(&self) -> f64 {
        if self.movable {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// Geometric center of the shape, used for contact normals.
    pub fn center(&self) -> Vec2 {
        match &self.shape {
            Shape::Circle(_) | Shape::Polygon(_) => self.position,
            Shape::Rectangle(rect) => self.position + rect.half_extents(),
        }
    }

    /// World-space bounding box of the body.
    pub fn calculate_aabb(&self) -> AABB {
        match &self.shape {
            Shape::Circle(circle) => {
                let radius_vec = Vec2::new(circle.radius, circle.radius);
                AABB::new(self.position - radius_vec, self.position + radius_vec)
            }
            Shape::Rectangle(rect) => AABB::new(
                self.position,
                self.position + Vec2::new(rect.width, rect.height),
            ),
            Shape::Polygon(polygon) => AABB::from_points(&polygon.vertices)
                .unwrap_or_else(|| AABB::new(self.position, self.position)),
        }
    }

    /// Moves the body. Polygons move their vertices and re-derive the centroid.
    pub fn translate(&mut self, displacement: Vec2) {
        match &mut self.shape {
            Shape::Polygon(polygon) => {
                polygon.translate(displacement);
                self.position = polygon.calculate_centroid();
            }
            Shape::Circle(_) | Shape::Rectangle(_) => self.position += displacement,
        }
    }

    /// Changes velocity by `impulse / mass`. No-op for immovable bodies.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.movable {
            self.velocity += impulse * self.inv_mass();
        }
    }

    /// Accumulates a torque impulse. No-op for immovable bodies.
    pub fn apply_torque(&mut self, torque: f64) {
        if self.movable {
            self.torque += torque;
        }
    }

    /// Re-derives the polygon centroid and the per-step spin angle.
    pub fn update_position(&mut self) {
        if let Shape::Polygon(polygon) = &self.shape {
            self.position = polygon.calculate_centroid();
            self.rotation = self.torque / self.mass;
        }
    }
}

fn check_mass(mass: f64, movable: bool) -> Result<()> {
    if movable && !(mass > 0.0 && mass.is_finite()) {
        return Err(PhysicsError::NonPositiveMass { mass });
    }
    Ok(())
}
