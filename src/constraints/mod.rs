use crate::objects::rigid_body::RigidBody;

pub mod spring;

pub use spring::Spring;

/// A trait representing a two-body physics constraint.
pub trait Constraint {
    /// Applies the constraint for one tick.
    /// Takes a mutable slice of all bodies in the world.
    fn apply(&self, bodies: &mut [RigidBody]);
}

/// Helper to safely get mutable references to two different bodies in a slice.
/// Returns `None` if the indices are equal or out of bounds.
pub(crate) fn get_mutable_body_pair(
    bodies: &mut [RigidBody],
    idx_a: usize,
    idx_b: usize,
) -> Option<(&mut RigidBody, &mut RigidBody)> {
    if idx_a == idx_b || idx_a >= bodies.len() || idx_b >= bodies.len() {
        return None;
    }

    // Ensure a < b for split_at_mut
    if idx_a < idx_b {
        let (slice_a, slice_b) = bodies.split_at_mut(idx_b);
        Some((&mut slice_a[idx_a], &mut slice_b[0]))
    } else {
        let (slice_b, slice_a) = bodies.split_at_mut(idx_a);
        Some((&mut slice_a[0], &mut slice_b[idx_b]))
    }
}
