use crate::collision::{
    bounce_on_collision, collided, prevent_circle_overlap, prevent_circle_polygon_overlap,
    prevent_circle_rectangle_overlap, prevent_rectangle_overlap, resolve_collision, ImpulseConfig,
    SpatialGrid,
};
use crate::constraints::{get_mutable_body_pair, Constraint, Spring};
use crate::error::{PhysicsError, Result};
use crate::integration::integrate;
use crate::math::vec2::Vec2;
use crate::objects::rigid_body::{BodyHandle, RigidBody};
use crate::shapes::Shape;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Acceleration applied to every movable body each step (positive y is down).
    pub gravity: Vec2,
    /// Broadphase cell size. Should exceed the largest body radius.
    pub cell_size: f64,
    /// Restitution used for every contact. When `None`, the smaller of the
    /// two bodies' own coefficients is used.
    pub restitution: Option<f64>,
    pub impulse: ImpulseConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 981.0),
            cell_size: 50.0,
            restitution: None,
            impulse: ImpulseConfig::default(),
        }
    }
}

/// Counters from one [`PhysicsWorld::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Pairs produced by the broadphase.
    pub candidate_pairs: usize,
    /// Pairs confirmed by the narrowphase and resolved.
    pub contacts: usize,
}

/// Owns bodies and springs and advances them one tick at a time.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    bodies: Vec<RigidBody>,
    springs: Vec<Spring>,
    // Force for the next step, summed from `add_force` calls
    pending_forces: Vec<Vec2>,
    config: WorldConfig,
    grid: SpatialGrid<BodyHandle>,
}

impl PhysicsWorld {
    /// Creates a new, empty physics world. Fails if the cell size is invalid.
    pub fn new(config: WorldConfig) -> Result<Self> {
        Ok(Self {
            bodies: Vec::new(),
            springs: Vec::new(),
            pending_forces: Vec::new(),
            grid: SpatialGrid::new(config.cell_size)?,
            config,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Mutable access to the settings. The cell size is fixed at creation.
    pub fn config_mut(&mut self) -> &mut WorldConfig {
        &mut self.config
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len());
        self.bodies.push(body);
        self.pending_forces.push(Vec2::ZERO);
        handle
    }

    /// Adds a spring. Both ends must be bodies of this world.
    pub fn add_spring(&mut self, spring: Spring) -> Result<usize> {
        for handle in [spring.body_a, spring.body_b] {
            if handle.0 >= self.bodies.len() {
                return Err(PhysicsError::UnknownBody(handle.0));
            }
        }
        self.springs.push(spring);
        Ok(self.springs.len() - 1)
    }

    /// Adds a spring whose rest length is the current distance between `a` and `b`.
    pub fn connect(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
        stiffness: f64,
        damping: f64,
    ) -> Result<usize> {
        let spring = Spring::relaxed(&self.bodies, a, b, stiffness, damping)?;
        self.add_spring(spring)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0)
    }

    /// All bodies in insertion order; the index of each is its handle.
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> {
        (0..self.bodies.len()).map(BodyHandle)
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Adds `force` to the force applied to `handle` during the next step.
    /// Calls within one tick are summed; the total is cleared after the step.
    pub fn add_force(&mut self, handle: BodyHandle, force: Vec2) -> Result<()> {
        let pending = self
            .pending_forces
            .get_mut(handle.0)
            .ok_or(PhysicsError::UnknownBody(handle.0))?;
        *pending += force;
        Ok(())
    }

    /// Advances the simulation by one time step `dt`.
    ///
    /// 1. Springs correct velocities.
    /// 2. The broadphase grid is rebuilt and candidate pairs gathered.
    /// 3. Each colliding pair is resolved according to its shapes.
    /// 4. Every body is integrated once with its pending force plus gravity.
    ///
    /// Does nothing when `dt` is not positive.
    pub fn step(&mut self, dt: f64) -> StepStats {
        if !(dt > 0.0) {
            return StepStats::default();
        }

        // 1. Springs
        for spring in &self.springs {
            spring.apply(&mut self.bodies);
        }

        // 2. Broadphase
        self.grid.clear();
        for (i, body) in self.bodies.iter().enumerate() {
            self.grid.insert_aabb(BodyHandle(i), &body.calculate_aabb());
        }
        let pairs = self.grid.potential_pairs();

        // 3. Narrowphase and response
        let mut contacts = 0;
        for &(handle_a, handle_b) in &pairs {
            let Some((a, b)) = get_mutable_body_pair(&mut self.bodies, handle_a.0, handle_b.0)
            else {
                continue;
            };
            if !a.movable && !b.movable {
                continue;
            }
            if !collided(a, b) {
                continue;
            }
            contacts += 1;
            let e = self
                .config
                .restitution
                .unwrap_or_else(|| a.restitution.min(b.restitution));
            resolve_contact(a, b, e, &self.config.impulse);
        }

        // 4. Integration
        let gravity = self.config.gravity;
        for (body, force) in self.bodies.iter_mut().zip(self.pending_forces.iter_mut()) {
            let total = *force + gravity * body.mass;
            integrate(body, total, dt);
            *force = Vec2::ZERO;
        }

        log::debug!(
            "step dt={dt}: {} bodies, {} candidate pairs, {contacts} contacts",
            self.bodies.len(),
            pairs.len()
        );
        StepStats {
            candidate_pairs: pairs.len(),
            contacts,
        }
    }
}

/// Picks the response for a confirmed contact by shape pair.
fn resolve_contact(a: &mut RigidBody, b: &mut RigidBody, e: f64, impulse: &ImpulseConfig) {
    let normal = match (&a.shape, &b.shape) {
        (Shape::Circle(_), Shape::Circle(_)) => prevent_circle_overlap(a, b),
        (Shape::Rectangle(_), Shape::Rectangle(_)) => prevent_rectangle_overlap(a, b),
        (Shape::Circle(_), Shape::Rectangle(_)) | (Shape::Rectangle(_), Shape::Circle(_)) => {
            prevent_circle_rectangle_overlap(a, b)
        }
        (Shape::Circle(_), Shape::Polygon(_)) | (Shape::Polygon(_), Shape::Circle(_)) => {
            prevent_circle_polygon_overlap(a, b)
        }
        (Shape::Polygon(_), Shape::Polygon(_)) => {
            resolve_collision(a, b, e, impulse);
            return;
        }
        (Shape::Rectangle(_), Shape::Polygon(_)) | (Shape::Polygon(_), Shape::Rectangle(_)) => {
            log::trace!("no response for {} / {} contact", a.shape.kind(), b.shape.kind());
            return;
        }
    };
    bounce_if_approaching(a, b, e, normal);
}

/// Bounces only pairs still closing in along the contact normal, so a pair
/// that is already separating is not pulled back.
///
/// `normal` points from `b` toward `a`. Without one (a circle whose center
/// sank into a rectangle) the line between the shape centers stands in.
fn bounce_if_approaching(a: &mut RigidBody, b: &mut RigidBody, e: f64, normal: Option<Vec2>) {
    let normal = normal.unwrap_or_else(|| (a.center() - b.center()).normalize());
    if (a.velocity - b.velocity).dot(normal) < 0.0 {
        bounce_on_collision(a, b, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::rigid_body::INFINITE_MASS;
    const EPSILON: f64 = 1e-9;

    fn weightless() -> PhysicsWorld {
        PhysicsWorld::new(WorldConfig {
            gravity: Vec2::ZERO,
            ..WorldConfig::default()
        })
        .unwrap()
    }

    fn square(x: f64, y: f64, size: f64) -> RigidBody {
        RigidBody::polygon(
            vec![
                Vec2::new(x, y),
                Vec2::new(x + size, y),
                Vec2::new(x + size, y + size),
                Vec2::new(x, y + size),
            ],
            1.0,
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_world_new() {
        let world = PhysicsWorld::new(WorldConfig::default()).unwrap();
        assert!(world.bodies().is_empty());
        assert!(world.springs().is_empty());
        assert_eq!(world.config().gravity, Vec2::new(0.0, 981.0));
        assert_eq!(world.config().cell_size, 50.0);
        assert_eq!(world.config().restitution, None);
    }

    #[test]
    fn test_world_new_invalid_cell_size() {
        let config = WorldConfig {
            cell_size: 0.0,
            ..WorldConfig::default()
        };
        assert_eq!(PhysicsWorld::new(config).unwrap_err(), PhysicsError::InvalidCellSize(0.0));
    }

    #[test]
    fn test_add_body() {
        let mut world = weightless();
        let h1 = world.add_body(RigidBody::circle(Vec2::ZERO, 1.0, 1.0, true).unwrap());
        let h2 = world.add_body(RigidBody::circle(Vec2::new(5.0, 0.0), 1.0, 2.0, true).unwrap());
        assert_eq!(h1.index(), 0);
        assert_eq!(h2.index(), 1);
        assert_eq!(world.bodies().len(), 2);
        assert_eq!(world.body(h2).unwrap().mass, 2.0);
        assert_eq!(world.handles().collect::<Vec<_>>(), vec![h1, h2]);
        assert!(world.body(BodyHandle(7)).is_none());
    }

    #[test]
    fn test_step_gravity() {
        let mut world = PhysicsWorld::new(WorldConfig {
            gravity: Vec2::new(0.0, -10.0),
            ..WorldConfig::default()
        })
        .unwrap();
        let h = world.add_body(RigidBody::circle(Vec2::ZERO, 1.0, 3.0, true).unwrap());
        let dt = 0.1;

        world.step(dt);
        let body = world.body(h).unwrap();
        assert!(body.velocity.x.abs() < EPSILON);
        assert!((body.velocity.y - -1.0).abs() < EPSILON);
        assert!((body.position.y - -0.1).abs() < EPSILON);
    }

    #[test]
    fn test_step_immovable_never_moves() {
        let mut world = PhysicsWorld::new(WorldConfig::default()).unwrap();
        let floor = world.add_body(
            RigidBody::rectangle(Vec2::new(0.0, 100.0), 200.0, 20.0, INFINITE_MASS, false).unwrap(),
        );
        world.add_body(RigidBody::circle(Vec2::new(100.0, 95.0), 10.0, 1.0, true).unwrap());
        world.add_force(floor, Vec2::new(1e9, 1e9)).unwrap();
        let initial_state = world.body(floor).unwrap().clone();

        for _ in 0..50 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(world.body(floor).unwrap(), &initial_state);
    }

    #[test]
    fn test_step_non_positive_dt_is_noop() {
        let mut world = weightless();
        let h = world.add_body(
            RigidBody::circle(Vec2::ZERO, 1.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(1.0, 0.0)),
        );
        assert_eq!(world.step(0.0), StepStats::default());
        assert_eq!(world.step(-1.0), StepStats::default());
        assert_eq!(world.body(h).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_add_force_sums_and_clears() {
        let mut world = weightless();
        let h = world.add_body(RigidBody::circle(Vec2::ZERO, 1.0, 2.0, true).unwrap());
        world.add_force(h, Vec2::new(10.0, 0.0)).unwrap();
        world.add_force(h, Vec2::new(10.0, 4.0)).unwrap();
        assert_eq!(world.add_force(BodyHandle(3), Vec2::ZERO), Err(PhysicsError::UnknownBody(3)));

        world.step(1.0);
        let body = world.body(h).unwrap();
        assert_eq!(body.force, Vec2::new(20.0, 4.0));
        assert!((body.velocity.x - 10.0).abs() < EPSILON);
        assert!((body.velocity.y - 2.0).abs() < EPSILON);

        // Nothing pending on the next step
        world.step(1.0);
        assert_eq!(world.body(h).unwrap().force, Vec2::ZERO);
    }

    #[test]
    fn test_step_circles_swap_velocities() {
        let mut world = weightless();
        let a = world.add_body(
            RigidBody::circle(Vec2::new(0.0, 0.0), 1.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(10.0, 0.0)),
        );
        let b = world.add_body(
            RigidBody::circle(Vec2::new(1.5, 0.0), 1.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(-10.0, 0.0)),
        );

        let stats = world.step(0.01);

        assert_eq!(stats, StepStats { candidate_pairs: 1, contacts: 1 });
        assert!((world.body(a).unwrap().velocity.x - -10.0).abs() < EPSILON);
        assert!((world.body(b).unwrap().velocity.x - 10.0).abs() < EPSILON);
        let gap = world.body(b).unwrap().position.x - world.body(a).unwrap().position.x;
        assert!(gap > 2.0);
    }

    #[test]
    fn test_step_ball_bounces_off_floor() {
        let mut world = weightless();
        let floor = world.add_body(
            RigidBody::rectangle(Vec2::new(0.0, 100.0), 200.0, 20.0, INFINITE_MASS, false).unwrap(),
        );
        let ball = world.add_body(
            RigidBody::circle(Vec2::new(100.0, 95.0), 10.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(0.0, 50.0)),
        );

        let stats = world.step(0.01);

        assert_eq!(stats.contacts, 1);
        let ball = world.body(ball).unwrap();
        assert!((ball.velocity.y - -50.0).abs() < EPSILON);
        assert!((ball.position.y - 89.5).abs() < 1e-6);
        assert_eq!(world.body(floor).unwrap().position, Vec2::new(0.0, 100.0));
    }

    fn wide_floor() -> RigidBody {
        RigidBody::rectangle(Vec2::new(0.0, 100.0), 2000.0, 20.0, INFINITE_MASS, false).unwrap()
    }

    #[test]
    fn test_step_ball_bounces_off_floor_far_from_its_center() {
        let mut world = weightless();
        world.add_body(wide_floor());
        let ball = world.add_body(
            RigidBody::circle(Vec2::new(100.0, 95.0), 10.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(-30.0, 50.0)),
        );

        let stats = world.step(0.01);

        assert_eq!(stats.contacts, 1);
        let body = world.body(ball).unwrap();
        assert!((body.velocity.y - -50.0).abs() < EPSILON);
        assert!((body.position.y - 89.5).abs() < 1e-6);

        // Once bounced it leaves the floor for good
        for _ in 0..200 {
            world.step(0.01);
        }
        let body = world.body(ball).unwrap();
        assert!((body.velocity.y - -50.0).abs() < EPSILON);
        assert!(body.position.y < 0.0);
    }

    #[test]
    fn test_step_box_lands_on_floor_far_from_its_center() {
        let mut world = weightless();
        world.add_body(wide_floor());
        let crate_box = world.add_body(
            RigidBody::rectangle(Vec2::new(900.0, 91.0), 10.0, 10.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(-30.0, 50.0)),
        );

        let stats = world.step(0.01);

        assert_eq!(stats.contacts, 1);
        let body = world.body(crate_box).unwrap();
        assert!((body.velocity.y - -50.0).abs() < EPSILON);
        assert!((body.position.y - 89.5).abs() < 1e-6);
    }

    #[test]
    fn test_step_ball_bounces_off_wide_polygon() {
        let mut world = weightless();
        let slab = vec![
            Vec2::new(0.0, 100.0),
            Vec2::new(2000.0, 100.0),
            Vec2::new(2000.0, 120.0),
            Vec2::new(0.0, 120.0),
        ];
        world.add_body(RigidBody::polygon(slab, INFINITE_MASS, false).unwrap());
        let ball = world.add_body(
            RigidBody::circle(Vec2::new(100.0, 95.0), 10.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(-30.0, 50.0)),
        );

        let stats = world.step(0.01);

        assert_eq!(stats.contacts, 1);
        let body = world.body(ball).unwrap();
        assert!((body.velocity.y - -50.0).abs() < EPSILON);
        assert!((body.position.y - 89.5).abs() < 1e-6);
    }

    #[test]
    fn test_step_with_far_away_bodies() {
        let mut world = weightless();
        let far = world.add_body(
            RigidBody::circle(Vec2::new(1e21, 0.0), 1.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(1.0, 0.0)),
        );
        world.add_body(RigidBody::circle(Vec2::new(-1e21, 0.0), 1.0, 1.0, true).unwrap());
        world.add_body(RigidBody::circle(Vec2::ZERO, 1.0, 1.0, true).unwrap());

        let stats = world.step(0.01);

        assert_eq!(stats, StepStats::default());
        assert_eq!(world.body(far).unwrap().velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_step_restitution_override() {
        let mut world = PhysicsWorld::new(WorldConfig {
            gravity: Vec2::ZERO,
            restitution: Some(0.5),
            ..WorldConfig::default()
        })
        .unwrap();
        world.add_body(
            RigidBody::rectangle(Vec2::new(0.0, 100.0), 200.0, 20.0, INFINITE_MASS, false).unwrap(),
        );
        let ball = world.add_body(
            RigidBody::circle(Vec2::new(100.0, 95.0), 10.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(0.0, 50.0)),
        );

        world.step(0.01);
        assert!((world.body(ball).unwrap().velocity.y - -25.0).abs() < EPSILON);
    }

    #[test]
    fn test_step_body_restitution_minimum() {
        let mut world = weightless();
        world.add_body(
            RigidBody::rectangle(Vec2::new(0.0, 100.0), 200.0, 20.0, INFINITE_MASS, false)
                .unwrap()
                .with_restitution(0.2),
        );
        let ball = world.add_body(
            RigidBody::circle(Vec2::new(100.0, 95.0), 10.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(0.0, 50.0)),
        );

        world.step(0.01);
        assert!((world.body(ball).unwrap().velocity.y - -10.0).abs() < EPSILON);
    }

    #[test]
    fn test_step_polygons_collide() {
        let mut world = weightless();
        let a = world.add_body(square(0.0, 0.0, 2.0).with_velocity(Vec2::new(1.0, 0.0)));
        let b = world.add_body(square(1.5, 0.0, 2.0).with_velocity(Vec2::new(-1.0, 0.0)));

        let stats = world.step(0.01);

        assert_eq!(stats.contacts, 1);
        assert!((world.body(a).unwrap().velocity.x - -1.0).abs() < EPSILON);
        assert!((world.body(b).unwrap().velocity.x - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_step_circle_polygon() {
        let mut world = weightless();
        let mut block = square(0.0, 0.0, 40.0);
        block.movable = false;
        world.add_body(block);
        let ball = world.add_body(
            RigidBody::circle(Vec2::new(20.0, -3.0), 5.0, 1.0, true)
                .unwrap()
                .with_velocity(Vec2::new(0.0, 30.0)),
        );

        let stats = world.step(0.01);

        assert_eq!(stats.contacts, 1);
        let ball = world.body(ball).unwrap();
        assert!((ball.velocity.y - -30.0).abs() < EPSILON);
        assert!(ball.position.y < -5.0);
    }

    #[test]
    fn test_rectangle_polygon_pair_is_skipped() {
        let mut world = weightless();
        let r = world.add_body(RigidBody::rectangle(Vec2::ZERO, 2.0, 2.0, 1.0, true).unwrap());
        world.add_body(square(0.5, 0.5, 1.0));

        let stats = world.step(0.01);

        assert_eq!(stats, StepStats { candidate_pairs: 1, contacts: 0 });
        assert_eq!(world.body(r).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_spring_in_world() {
        let mut world = weightless();
        let anchor = world.add_body(
            RigidBody::circle(Vec2::ZERO, 1.0, INFINITE_MASS, false).unwrap(),
        );
        let ball = world.add_body(
            RigidBody::circle(Vec2::new(100.0, 0.0), 1.0, 1.0, true).unwrap(),
        );
        let index = world.connect(anchor, ball, 2.0, 0.0).unwrap();
        assert_eq!(index, 0);
        assert!((world.springs()[0].rest_length - 100.0).abs() < EPSILON);

        // Stretch it and let one step pull the ball back
        world.body_mut(ball).unwrap().position = Vec2::new(110.0, 0.0);
        world.step(0.1);
        // v = -(2 * 10 / 1) * 0.1
        assert!((world.body(ball).unwrap().velocity.x - -2.0).abs() < EPSILON);
    }

    #[test]
    fn test_add_spring_unknown_body() {
        let mut world = weightless();
        let a = world.add_body(RigidBody::circle(Vec2::ZERO, 1.0, 1.0, true).unwrap());
        let spring = Spring::new(a, BodyHandle(5), 1.0, 1.0, 0.0);
        assert_eq!(world.add_spring(spring), Err(PhysicsError::UnknownBody(5)));
        assert_eq!(world.connect(a, BodyHandle(2), 1.0, 0.0), Err(PhysicsError::UnknownBody(2)));
    }
}
