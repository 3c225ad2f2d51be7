//! Uniform-cell spatial grid for broad-phase collision queries
//!
//! Entries are bucketed into every cell their bounding box covers. The grid
//! can be cleared and refilled each tick (balls move every frame) or kept
//! up to date with `insert`/`remove` (hazards and ejecta barely move).
//! Queries only visit the cells under the query box, never the whole
//! population.

use std::collections::HashMap;
use std::hash::Hash;

use super::geometry::Aabb;

/// Inclusive cell-coordinate rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

/// Hash grid over the square map
#[derive(Debug, Clone)]
pub struct SpatialGrid<K> {
    cell_size: f64,
    cols: usize,
    cells: Vec<Vec<K>>,
    ranges: HashMap<K, CellRange>,
}

impl<K: Copy + Eq + Hash + Ord> SpatialGrid<K> {
    /// Grid covering `[0, map_size]` on both axes
    pub fn new(map_size: f64, cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("Invalid grid cell size {cell_size}, using 100");
            100.0
        };
        let cols = ((map_size / cell_size).floor() as usize + 1).max(1);
        Self {
            cell_size,
            cols,
            cells: vec![Vec::new(); cols * cols],
            ranges: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cells per axis
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Cell coordinate of a map coordinate, clamped to the grid
    #[inline]
    fn cell_of(&self, v: f64) -> usize {
        if !v.is_finite() || v <= 0.0 {
            return 0;
        }
        ((v / self.cell_size) as usize).min(self.cols - 1)
    }

    /// Cells covered by a box
    pub fn cell_range(&self, aabb: &Aabb) -> CellRange {
        CellRange {
            x0: self.cell_of(aabb.min.x),
            y0: self.cell_of(aabb.min.y),
            x1: self.cell_of(aabb.max.x),
            y1: self.cell_of(aabb.max.y),
        }
    }

    /// Index `id` under every cell `aabb` covers (re-inserting moves it)
    pub fn insert(&mut self, id: K, aabb: Aabb) {
        self.remove(id);
        let range = self.cell_range(&aabb);
        for y in range.y0..=range.y1 {
            for x in range.x0..=range.x1 {
                self.cells[y * self.cols + x].push(id);
            }
        }
        self.ranges.insert(id, range);
    }

    /// Drop `id` from the grid; returns whether it was indexed
    pub fn remove(&mut self, id: K) -> bool {
        let Some(range) = self.ranges.remove(&id) else {
            return false;
        };
        for y in range.y0..=range.y1 {
            for x in range.x0..=range.x1 {
                let cell = &mut self.cells[y * self.cols + x];
                if let Some(pos) = cell.iter().position(|k| *k == id) {
                    cell.swap_remove(pos);
                }
            }
        }
        true
    }

    pub fn contains(&self, id: K) -> bool {
        self.ranges.contains_key(&id)
    }

    /// Forget everything but keep cell allocations (per-tick rebuild)
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.ranges.clear();
    }

    /// Ids whose cells intersect `aabb`, deduplicated and in ascending order
    pub fn query_into(&self, aabb: &Aabb, out: &mut Vec<K>) {
        out.clear();
        let range = self.cell_range(aabb);
        for y in range.y0..=range.y1 {
            for x in range.x0..=range.x1 {
                out.extend_from_slice(&self.cells[y * self.cols + x]);
            }
        }
        out.sort_unstable();
        out.dedup();
    }

    pub fn query(&self, aabb: &Aabb) -> Vec<K> {
        let mut out = Vec::new();
        self.query_into(aabb, &mut out);
        out
    }

    /// Query around a circle, padded by `slack` so entries whose center sits
    /// in a neighbouring cell are still returned
    pub fn query_circle(
        &self,
        center: glam::DVec2,
        radius: f64,
        slack: f64,
        out: &mut Vec<K>,
    ) {
        self.query_into(&Aabb::around(center, radius + slack), out);
    }
}
