use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;
use crate::shapes::Shape;

/// Integrates the body's state forward in time using Semi-Implicit Euler.
///
/// `force` replaces `body.force`; it is not added to it. Callers combining
/// several sources (gravity, springs, input) must sum them first and call
/// this once per body per tick. Immovable bodies are left untouched.
pub fn apply_force(body: &mut RigidBody, force: Vec2, dt: f64) {
    if !body.movable {
        return;
    }

    body.force = force;
    // v = v + (F/m)*dt, then p = p + v*dt
    let acceleration = force / body.mass;
    body.velocity += acceleration * dt;
    let displacement = body.velocity * dt;
    body.translate(displacement);
}

/// Polygon variant of [`apply_force`]: moves the vertices instead of the
/// position, then spins them about the fresh centroid by `body.rotation`.
///
/// Non-polygon bodies are integrated with [`apply_force`].
pub fn apply_force_polygon(body: &mut RigidBody, force: Vec2, dt: f64) {
    if !body.movable {
        return;
    }
    let Shape::Polygon(polygon) = &mut body.shape else {
        apply_force(body, force, dt);
        return;
    };

    body.force = force;
    let acceleration = force / body.mass;
    body.velocity += acceleration * dt;

    // 1. Translate every vertex
    polygon.translate(body.velocity * dt);

    // 2. Rotate about the centroid of the translated vertices
    let centroid = polygon.calculate_centroid();
    polygon.rotate_about(centroid, body.rotation);

    // 3. Refresh derived state
    body.update_position();
}

/// Integrates any body, picking the polygon path when needed.
pub fn integrate(body: &mut RigidBody, force: Vec2, dt: f64) {
    match body.shape {
        Shape::Polygon(_) => apply_force_polygon(body, force, dt),
        Shape::Circle(_) | Shape::Rectangle(_) => apply_force(body, force, dt),
    }
}
