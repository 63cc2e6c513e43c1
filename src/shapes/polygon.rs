use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;

/// A convex polygon defined by its world-space vertices.
/// Edges run `vertices[i] -> vertices[(i + 1) % n]`; any consistent winding works.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vec2>,
}

impl Polygon {
    /// Creates a new polygon from a vector of vertices.
    ///
    /// Fails if fewer than 3 vertices are provided or a coordinate is not finite.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::TooFewVertices {
                count: vertices.len(),
            });
        }
        if let Some(bad) = vertices.iter().find(|v| !(v.x.is_finite() && v.y.is_finite())) {
            let value = if bad.x.is_finite() { bad.y } else { bad.x };
            return Err(PhysicsError::InvalidDimension {
                name: "vertex",
                value,
            });
        }
        Ok(Polygon { vertices })
    }

    /// Mean of the vertices. This is the polygon's reference position.
    pub fn calculate_centroid(&self) -> Vec2 {
        let mut sum = Vec2::ZERO;
        for v in &self.vertices {
            sum += *v;
        }
        sum / self.vertices.len() as f64
    }

    /// Unit normals of every edge, in edge order.
    pub fn edge_normals(&self) -> Vec<Vec2> {
        self.edges()
            .map(|(v1, v2)| (v2 - v1).perpendicular().normalize())
            .collect()
    }

    /// Iterates edges as `(start, end)` pairs, wrapping around.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Projects every vertex onto `axis` and returns the `(min, max)` interval.
    pub fn project(&self, axis: Vec2) -> (f64, f64) {
        let mut min_proj = f64::INFINITY;
        let mut max_proj = f64::NEG_INFINITY;
        for vertex in &self.vertices {
            let projection = vertex.dot(axis);
            min_proj = min_proj.min(projection);
            max_proj = max_proj.max(projection);
        }
        (min_proj, max_proj)
    }

    /// The point furthest along `direction`. When several vertices tie (an
    /// edge faces `direction`), their mean is returned.
    pub fn support(&self, direction: Vec2) -> Vec2 {
        let (_, max_proj) = self.project(direction);
        let tolerance = 1e-9 * (1.0 + max_proj.abs());
        let mut sum = Vec2::ZERO;
        let mut count = 0usize;
        for &v in &self.vertices {
            if max_proj - v.dot(direction) <= tolerance {
                sum += v;
                count += 1;
            }
        }
        sum / count.max(1) as f64
    }

    /// Moves every vertex by `displacement`.
    pub fn translate(&mut self, displacement: Vec2) {
        for v in self.vertices.iter_mut() {
            *v += displacement;
        }
    }

    /// Rotates every vertex about `center` by `angle` radians.
    pub fn rotate_about(&mut self, center: Vec2, angle: f64) {
        if angle == 0.0 {
            return;
        }
        for v in self.vertices.iter_mut() {
            *v = center + (*v - center).rotate(angle);
        }
    }

    /// Closest point on the polygon boundary to `point`, checking every edge segment.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let mut best = self.vertices[0];
        let mut best_dist_sq = f64::INFINITY;
        for (a, b) in self.edges() {
            let (candidate, _) = closest_point_on_segment(a, b, point);
            let dist_sq = candidate.distance_squared(point);
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best = candidate;
            }
        }
        best
    }

    /// True if `point` lies strictly inside the (convex) polygon.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let mut sign = 0.0;
        for (a, b) in self.edges() {
            let side = (b - a).cross(point - a);
            if side == 0.0 {
                return false;
            }
            if sign == 0.0 {
                sign = side.signum();
            } else if side.signum() != sign {
                return false;
            }
        }
        true
    }
}

/// Finds the point on a line segment closest to a given point.
/// Returns the closest point and the parameter `t` (0 <= t <= 1) along the segment.
pub fn closest_point_on_segment(segment_a: Vec2, segment_b: Vec2, point: Vec2) -> (Vec2, f64) {
    let segment_vec = segment_b - segment_a;
    let length_sq = segment_vec.magnitude_squared();
    if length_sq < 1e-12 {
        return (segment_a, 0.0);
    }

    let t = ((point - segment_a).dot(segment_vec) / length_sq).clamp(0.0, 1.0);
    (segment_a + segment_vec * t, t)
}
