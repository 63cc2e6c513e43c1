use crate::math::vec2::Vec2;
use crate::objects::rigid_body::RigidBody;
use crate::shapes::{Polygon, Shape};

/// Checks for collision between two axis-aligned rectangles.
/// Rectangles that only share an edge are not colliding.
pub fn rectangle_collided(rect_a: &RigidBody, rect_b: &RigidBody) -> bool {
    match (&rect_a.shape, &rect_b.shape) {
        (Shape::Rectangle(_), Shape::Rectangle(_)) => {
            rect_a.calculate_aabb().overlaps(&rect_b.calculate_aabb())
        }
        _ => false,
    }
}

/// Checks for collision between two circles.
/// Touching circles (`distance == ra + rb`) are not colliding.
pub fn circle_collided(circle_a: &RigidBody, circle_b: &RigidBody) -> bool {
    let (Shape::Circle(a), Shape::Circle(b)) = (&circle_a.shape, &circle_b.shape) else {
        return false;
    };
    circle_a.position.distance(circle_b.position) < a.radius + b.radius
}

/// Checks for collision between a circle and a rectangle, in either order.
///
/// The circle center is clamped to the rectangle bounds and the distance to
/// the clamped point is compared against the radius.
pub fn circle_rectangle_collided(a: &RigidBody, b: &RigidBody) -> bool {
    let (circle, rect) = match (&a.shape, &b.shape) {
        (Shape::Circle(_), Shape::Rectangle(_)) => (a, b),
        (Shape::Rectangle(_), Shape::Circle(_)) => (b, a),
        _ => return false,
    };
    let Shape::Circle(c) = &circle.shape else {
        return false;
    };
    let closest = rect.calculate_aabb().clamp_point(circle.position);
    circle.position.distance(closest) < c.radius
}

// --- SAT ---

/// Separating Axis Theorem test for two convex polygons.
///
/// Every edge normal of both polygons is tried; the first axis on which the
/// projections don't overlap ends the test. Intervals that only touch still
/// count as overlapping here.
pub fn polygon_collision(poly_a: &Polygon, poly_b: &Polygon) -> bool {
    let axes = poly_a.edge_normals().into_iter().chain(poly_b.edge_normals());
    for axis in axes {
        let (min_a, max_a) = poly_a.project(axis);
        let (min_b, max_b) = poly_b.project(axis);
        if max_a < min_b || max_b < min_a {
            return false;
        }
    }
    true
}

/// Minimum translation vector separating `poly_a` from `poly_b`.
///
/// The magnitude is the smallest positive overlap over all edge normals of
/// both polygons. The result points from `poly_b` toward `poly_a`, so moving
/// `poly_a` by it (or `poly_b` by its negation) separates them. Returns
/// [`Vec2::ZERO`] if any axis has an overlap `<= 0`.
pub fn find_mtv(poly_a: &Polygon, poly_b: &Polygon) -> Vec2 {
    let mut min_overlap = f64::INFINITY;
    let mut mtv_axis = Vec2::ZERO;

    let axes = poly_a.edge_normals().into_iter().chain(poly_b.edge_normals());
    for axis in axes {
        if axis.magnitude_squared() < 1e-12 {
            continue;
        }
        let (min_a, max_a) = poly_a.project(axis);
        let (min_b, max_b) = poly_b.project(axis);

        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return Vec2::ZERO;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            mtv_axis = axis;
        }
    }

    if mtv_axis == Vec2::ZERO {
        return Vec2::ZERO;
    }

    // Point from b toward a
    let b_to_a = poly_a.calculate_centroid() - poly_b.calculate_centroid();
    if b_to_a.dot(mtv_axis) < 0.0 {
        mtv_axis = -mtv_axis;
    }
    mtv_axis * min_overlap
}

/// Checks for collision between a circle and a convex polygon, in either order.
///
/// Uses the closest point on the polygon boundary (every edge segment is
/// considered). A circle whose center is inside the polygon always collides.
pub fn circle_polygon_collided(a: &RigidBody, b: &RigidBody) -> bool {
    let (center, radius, polygon) = match (&a.shape, &b.shape) {
        (Shape::Circle(c), Shape::Polygon(p)) => (a.position, c.radius, p),
        (Shape::Polygon(p), Shape::Circle(c)) => (b.position, c.radius, p),
        _ => return false,
    };
    if polygon.contains_point(center) {
        return true;
    }
    let closest = polygon.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Dispatches to the narrowphase test for the pair's shapes. Symmetric in
/// its arguments. Rectangle-polygon pairs are unsupported and never collide.
pub fn collided(a: &RigidBody, b: &RigidBody) -> bool {
    match (&a.shape, &b.shape) {
        (Shape::Circle(_), Shape::Circle(_)) => circle_collided(a, b),
        (Shape::Rectangle(_), Shape::Rectangle(_)) => rectangle_collided(a, b),
        (Shape::Circle(_), Shape::Rectangle(_)) | (Shape::Rectangle(_), Shape::Circle(_)) => {
            circle_rectangle_collided(a, b)
        }
        (Shape::Circle(_), Shape::Polygon(_)) | (Shape::Polygon(_), Shape::Circle(_)) => {
            circle_polygon_collided(a, b)
        }
        (Shape::Polygon(pa), Shape::Polygon(pb)) => polygon_collision(pa, pb),
        (Shape::Rectangle(_), Shape::Polygon(_)) | (Shape::Polygon(_), Shape::Rectangle(_)) => {
            false
        }
    }
}
