//! Collision responses: velocity bounce, positional correction and polygon
//! impulse resolution. Each is independent; the caller picks the order.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::detection::find_mtv;
use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;
use crate::shapes::Shape;

/// Extra distance added by positional correction so that the strict
/// narrowphase tests report the pair as separated afterwards.
pub const SEPARATION_SLOP: f64 = 1e-9;

/// Tuning for [`resolve_collision`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImpulseConfig {
    /// Ceiling on the impulse magnitude applied per contact.
    pub max_impulse_magnitude: f64,
    /// Scale applied to the contact torque term.
    pub torque_coefficient: f64,
}

impl Default for ImpulseConfig {
    fn default() -> Self {
        Self {
            max_impulse_magnitude: 50.0,
            torque_coefficient: 0.1,
        }
    }
}

/// Exchanges velocity between two colliding bodies with restitution `e`.
///
/// * Both movable: velocities are split along the line between the shape
///   centers. The components along that line follow the 1-D collision
///   formula; the perpendicular components are kept.
/// * One movable: its velocity becomes `velocity * -e`.
/// * Neither movable: nothing happens.
pub fn bounce_on_collision(a: &mut RigidBody, b: &mut RigidBody, e: f64) {
    match (a.movable, b.movable) {
        (true, true) => {
            let normal = (b.center() - a.center()).normalize();
            if normal == Vec2::ZERO {
                return;
            }
            let (m1, m2) = (a.mass, b.mass);
            let va = a.velocity.dot(normal);
            let vb = b.velocity.dot(normal);

            let va_new = ((m1 - e * m2) * va + (1.0 + e) * m2 * vb) / (m1 + m2);
            let vb_new = ((m2 - e * m1) * vb + (1.0 + e) * m1 * va) / (m1 + m2);

            a.velocity += normal * (va_new - va);
            b.velocity += normal * (vb_new - vb);
        }
        (true, false) => a.velocity = a.velocity * -e,
        (false, true) => b.velocity = b.velocity * -e,
        (false, false) => {}
    }
}

/// Moves `a` by `correction` and `b` by its negation, split 50/50 when both
/// are movable and given entirely to the one movable body otherwise.
fn separate(a: &mut RigidBody, b: &mut RigidBody, correction: Vec2) {
    match (a.movable, b.movable) {
        (true, true) => {
            a.translate(correction * 0.5);
            b.translate(-correction * 0.5);
        }
        (true, false) => a.translate(correction),
        (false, true) => b.translate(-correction),
        (false, false) => {}
    }
}

/// Pushes two overlapping circles apart along the line between their centers.
/// Coincident centers are left alone.
///
/// Like the other `prevent_*` functions, returns the unit contact normal
/// pointing from `b` toward `a`, or `None` when there was nothing to correct.
pub fn prevent_circle_overlap(a: &mut RigidBody, b: &mut RigidBody) -> Option<Vec2> {
    let (Shape::Circle(ca), Shape::Circle(cb)) = (&a.shape, &b.shape) else {
        return None;
    };
    let delta = a.position - b.position;
    let distance = delta.magnitude();
    let overlap = ca.radius + cb.radius - distance;
    if distance <= 0.0 || overlap <= 0.0 {
        return None;
    }
    let normal = delta / distance;
    separate(a, b, normal * (overlap + SEPARATION_SLOP));
    Some(normal)
}

/// Pushes two overlapping rectangles apart along the axis of least overlap.
pub fn prevent_rectangle_overlap(a: &mut RigidBody, b: &mut RigidBody) -> Option<Vec2> {
    if !matches!((&a.shape, &b.shape), (Shape::Rectangle(_), Shape::Rectangle(_))) {
        return None;
    }
    let depth = a.calculate_aabb().overlap_depth(&b.calculate_aabb());
    if depth.x <= 0.0 || depth.y <= 0.0 {
        return None;
    }
    let diff = a.center() - b.center();
    let direction = |d: f64| if d < 0.0 { -1.0 } else { 1.0 };
    let (normal, overlap) = if depth.x < depth.y {
        (Vec2::new(direction(diff.x), 0.0), depth.x)
    } else {
        (Vec2::new(0.0, direction(diff.y)), depth.y)
    };
    separate(a, b, normal * (overlap + SEPARATION_SLOP));
    Some(normal)
}

/// Pushes a circle out of a rectangle along the vector from the closest
/// point on the rectangle to the circle center. Accepts either argument order.
///
/// A circle whose center lies inside the rectangle has no such vector and is
/// left alone.
pub fn prevent_circle_rectangle_overlap(a: &mut RigidBody, b: &mut RigidBody) -> Option<Vec2> {
    if matches!((&a.shape, &b.shape), (Shape::Rectangle(_), Shape::Circle(_))) {
        return prevent_circle_rectangle_overlap(b, a).map(|normal| -normal);
    }
    let (Shape::Circle(circle), Shape::Rectangle(_)) = (&a.shape, &b.shape) else {
        return None;
    };
    let closest = b.calculate_aabb().clamp_point(a.position);
    let delta = a.position - closest;
    let distance = delta.magnitude();
    if distance <= 0.0 || distance >= circle.radius {
        return None;
    }
    let normal = delta / distance;
    separate(a, b, normal * (circle.radius - distance + SEPARATION_SLOP));
    Some(normal)
}

/// Pushes a circle out of a convex polygon. Accepts either argument order.
///
/// Outside the polygon the circle is moved away from the closest boundary
/// point; with its center inside, it is moved through the nearest edge.
pub fn prevent_circle_polygon_overlap(a: &mut RigidBody, b: &mut RigidBody) -> Option<Vec2> {
    if matches!((&a.shape, &b.shape), (Shape::Polygon(_), Shape::Circle(_))) {
        return prevent_circle_polygon_overlap(b, a).map(|normal| -normal);
    }
    let (Shape::Circle(circle), Shape::Polygon(polygon)) = (&a.shape, &b.shape) else {
        return None;
    };
    let center = a.position;
    let closest = polygon.closest_point(center);
    let distance = center.distance(closest);

    let (normal, depth) = if polygon.contains_point(center) {
        ((closest - center).normalize(), distance + circle.radius)
    } else if distance >= circle.radius {
        return None;
    } else if distance > 0.0 {
        ((center - closest) / distance, circle.radius - distance)
    } else {
        // Center exactly on the boundary
        ((center - polygon.calculate_centroid()).normalize(), circle.radius)
    };
    if normal == Vec2::ZERO {
        return None;
    }
    separate(a, b, normal * (depth + SEPARATION_SLOP));
    Some(normal)
}

/// Resolves a polygon-polygon contact with an impulse along the MTV.
///
/// 1. Both polygons are moved apart by half the MTV each (all of it goes to
///    the movable one when only one can move).
/// 2. If they are approaching along the MTV normal, an impulse of magnitude
///    `-(1 + e) * v_n / (1/m1 + 1/m2)`, capped at
///    `config.max_impulse_magnitude`, is applied to both.
/// 3. A torque proportional to the lever arm of the contact point and the
///    penetration depth is accumulated on each polygon.
///
/// Non-overlapping pairs and non-polygon bodies are ignored.
pub fn resolve_collision(a: &mut RigidBody, b: &mut RigidBody, e: f64, config: &ImpulseConfig) {
    let mtv = match (&a.shape, &b.shape) {
        (Shape::Polygon(pa), Shape::Polygon(pb)) => find_mtv(pa, pb),
        _ => return,
    };
    if mtv == Vec2::ZERO {
        log::trace!("resolve_collision: no penetration, skipping");
        return;
    }

    separate(a, b, mtv);

    let normal = mtv.normalize();
    let velocity_along_normal = (a.velocity - b.velocity).dot(normal);
    if velocity_along_normal > 0.0 {
        return;
    }

    let inv_mass_sum = a.inv_mass() + b.inv_mass();
    if inv_mass_sum == 0.0 {
        return;
    }
    let j = -(1.0 + e) * velocity_along_normal / inv_mass_sum;
    let impulse = normal * j.min(config.max_impulse_magnitude);
    a.apply_impulse(impulse);
    b.apply_impulse(-impulse);

    // Contact point: between the faces of a and b that meet along the normal
    let contact = match (&a.shape, &b.shape) {
        (Shape::Polygon(pa), Shape::Polygon(pb)) => {
            (pa.support(-normal) + pb.support(normal)) * 0.5
        }
        _ => return,
    };
    let depth = mtv.magnitude();
    let arm_a = (contact - a.position).cross(normal);
    let arm_b = (contact - b.position).cross(normal);
    a.apply_torque(arm_a * depth * config.torque_coefficient);
    b.apply_torque(-arm_b * depth * config.torque_coefficient);
}
