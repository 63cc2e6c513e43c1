use super::Constraint;
use crate::error::{PhysicsError, Result};
use crate::objects::rigid_body::{BodyHandle, RigidBody};

/// Sub-step used to turn the spring force into a velocity change.
pub const DEFAULT_SPRING_TIME_STEP: f64 = 0.1;

/// A damped Hookean spring between two bodies.
///
/// The spring does not accumulate a force. Each [`apply`](Constraint::apply)
/// adds `(F / m) * time_step` directly to the velocity of each movable end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub rest_length: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub time_step: f64,
}

impl Spring {
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        rest_length: f64,
        stiffness: f64,
        damping: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            rest_length,
            stiffness,
            damping,
            time_step: DEFAULT_SPRING_TIME_STEP,
        }
    }

    /// Creates a spring whose rest length is the current distance between
    /// the two bodies.
    pub fn relaxed(
        bodies: &[RigidBody],
        body_a: BodyHandle,
        body_b: BodyHandle,
        stiffness: f64,
        damping: f64,
    ) -> Result<Self> {
        let a = bodies.get(body_a.0).ok_or(PhysicsError::UnknownBody(body_a.0))?;
        let b = bodies.get(body_b.0).ok_or(PhysicsError::UnknownBody(body_b.0))?;
        let rest_length = a.position.distance(b.position);
        Ok(Self::new(body_a, body_b, rest_length, stiffness, damping))
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }
}

impl Constraint for Spring {
    fn apply(&self, bodies: &mut [RigidBody]) {
        let Some((body_a, body_b)) =
            super::get_mutable_body_pair(bodies, self.body_a.0, self.body_b.0)
        else {
            log::warn!(
                "spring between bodies {} and {} skipped: invalid handle",
                self.body_a.0,
                self.body_b.0
            );
            return;
        };

        // 1. Hooke's law along the line from A to B
        let delta = body_b.position - body_a.position;
        let distance = delta.magnitude();
        let force = delta.normalize() * (self.stiffness * (distance - self.rest_length));

        // 2. Damping from the relative velocity along that line
        let relative_velocity = (body_b.velocity - body_a.velocity).component_along(delta);
        let total = force + relative_velocity * self.damping;

        // 3. Pull the ends together (or push apart) through their velocities
        if body_a.movable {
            body_a.velocity += total * (self.time_step / body_a.mass);
        }
        if body_b.movable {
            body_b.velocity -= total * (self.time_step / body_b.mass);
        }
    }
}
