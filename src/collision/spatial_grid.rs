// Implements a uniform spatial hash for broadphase collision detection.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::collision::AABB;
use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;

/// Integer cell coordinates `(floor(x / cell_size), floor(y / cell_size))`.
/// Coordinates beyond the `i64` range saturate at its ends.
pub type Cell = (i64, i64);

/// Boxes covering more cells than this are not bucketed. They are kept on a
/// separate list and paired with every other entry instead.
pub const MAX_CELLS_PER_ENTRY: u64 = 4096;

/// One inserted item and the block of cells it occupies.
#[derive(Debug, Clone, Copy)]
struct Entry<H> {
    handle: H,
    min_cell: Cell,
    max_cell: Cell,
    oversized: bool,
}

/// An unbounded uniform grid bucketing opaque handles by position.
///
/// Buckets are created lazily. Iteration order depends only on insertion
/// order, never on hash order, so results are reproducible.
#[derive(Debug, Clone)]
pub struct SpatialGrid<H> {
    cell_size: f64,
    inv_cell_size: f64, // 1.0 / cell_size, cached
    cells: HashMap<Cell, Vec<H>>,
    entries: Vec<Entry<H>>,
    oversized: Vec<H>,
}

impl<H: Copy + Eq + Hash> SpatialGrid<H> {
    /// Creates an empty grid. `cell_size` must be positive and finite, and
    /// should exceed the largest body extent that is inserted by position.
    pub fn new(cell_size: f64) -> Result<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(PhysicsError::InvalidCellSize(cell_size));
        }
        log::debug!("creating spatial grid: cell_size={cell_size}");
        Ok(SpatialGrid {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            entries: Vec::new(),
            oversized: Vec::new(),
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Converts world coordinates to cell coordinates.
    #[inline]
    pub fn cell_of(&self, position: Vec2) -> Cell {
        (
            (position.x * self.inv_cell_size).floor() as i64,
            (position.y * self.inv_cell_size).floor() as i64,
        )
    }

    /// Discards all bucket contents.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.oversized.clear();
    }

    /// Number of inserted handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `handle` to the bucket containing `position`.
    pub fn insert(&mut self, handle: H, position: Vec2) {
        let cell = self.cell_of(position);
        self.cells.entry(cell).or_default().push(handle);
        self.entries.push(Entry {
            handle,
            min_cell: cell,
            max_cell: cell,
            oversized: false,
        });
    }

    /// Adds `handle` to every bucket overlapped by `aabb`. Use this for
    /// bodies larger than a cell.
    ///
    /// A box spanning more than [`MAX_CELLS_PER_ENTRY`] cells is kept off the
    /// buckets; every query and every other entry is paired with it.
    pub fn insert_aabb(&mut self, handle: H, aabb: &AABB) {
        let min_cell = self.cell_of(aabb.min);
        let max_cell = self.cell_of(aabb.max);
        let columns = max_cell.0.abs_diff(min_cell.0).saturating_add(1);
        let rows = max_cell.1.abs_diff(min_cell.1).saturating_add(1);
        let oversized = columns.saturating_mul(rows) > MAX_CELLS_PER_ENTRY;

        if oversized {
            log::trace!("box spans {columns}x{rows} cells, tracking it outside the buckets");
            self.oversized.push(handle);
        } else {
            for cx in min_cell.0..=max_cell.0 {
                for cy in min_cell.1..=max_cell.1 {
                    self.cells.entry((cx, cy)).or_default().push(handle);
                }
            }
        }
        self.entries.push(Entry {
            handle,
            min_cell,
            max_cell,
            oversized,
        });
    }

    /// Collects the distinct handles in the cells from `min` to `max`
    /// (inclusive), expanded by one cell on every side, followed by every
    /// oversized handle.
    fn collect_neighbors(&self, min: Cell, max: Cell) -> Vec<H> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for cx in min.0.saturating_sub(1)..=max.0.saturating_add(1) {
            for cy in min.1.saturating_sub(1)..=max.1.saturating_add(1) {
                let Some(bucket) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for &handle in bucket {
                    if seen.insert(handle) {
                        found.push(handle);
                    }
                }
            }
        }
        for &handle in &self.oversized {
            if seen.insert(handle) {
                found.push(handle);
            }
        }
        found
    }

    /// Handles in the 3x3 block of cells around `position`.
    ///
    /// Anything closer than `cell_size` to `position` is guaranteed to be
    /// returned; items up to about two cells away may be returned as well.
    pub fn query(&self, position: Vec2) -> Vec<H> {
        let cell = self.cell_of(position);
        self.collect_neighbors(cell, cell)
    }

    /// Candidate pairs for narrowphase testing, each reported once, ordered by
    /// the insertion order of the first handle and then discovery order.
    pub fn potential_pairs(&self) -> Vec<(H, H)> {
        let mut order = HashMap::with_capacity(self.entries.len());
        for (i, entry) in self.entries.iter().enumerate() {
            order.entry(entry.handle).or_insert(i);
        }

        let mut pairs = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let neighbors: Vec<H> = if entry.oversized {
                self.entries.iter().map(|other| other.handle).collect()
            } else {
                self.collect_neighbors(entry.min_cell, entry.max_cell)
            };
            for other in neighbors {
                // Each unordered pair is emitted by its earlier-inserted member
                if order.get(&other).is_some_and(|&j| j > i) {
                    pairs.push((entry.handle, other));
                }
            }
        }
        pairs
    }
}
