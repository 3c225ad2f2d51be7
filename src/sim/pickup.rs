//! Pickups: the static food grid
//!
//! One pickup per grid cell, jittered inside its cell. Inactive pickups wait
//! in a shuffled pending queue and are switched on a few at a time; eaten
//! pickups go to the back of that queue.

use glam::DVec2;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

use super::geometry::clamp_margin;
use super::rng::Lcg;
use crate::tuning::MatchConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub pos: DVec2,
    pub active: bool,
    pub color: [u8; 3],
}

#[derive(Debug, Clone)]
pub struct PickupField {
    cols: usize,
    cell: f64,
    mass: u32,
    /// Row-major by cell; `None` for a cell that could not be placed
    cells: Vec<Option<Pickup>>,
    pending: VecDeque<usize>,
}

impl PickupField {
    /// Lay out the grid and activate the first quarter of the shuffled queue
    pub fn new(cfg: &MatchConfig, rng: &mut Lcg) -> Self {
        let cols = cfg.pickup_columns;
        let cell = cfg.pickup_cell();
        let jitter = cfg.pickup_jitter();
        let mut cells = Vec::with_capacity(cols * cols);
        for y in 0..cols {
            for x in 0..cols {
                let base = DVec2::new((x as f64 + 0.5) * cell, (y as f64 + 0.5) * cell);
                let offset = DVec2::new(
                    rng.range_i32(-jitter, jitter) as f64,
                    rng.range_i32(-jitter, jitter) as f64,
                );
                let pos = clamp_margin(base + offset, cfg.pickup_edge_margin, cfg.map_size);
                if !pos.is_finite() {
                    log::warn!("Skipping pickup cell ({x}, {y}): position {pos} is not finite");
                    cells.push(None);
                    continue;
                }
                cells.push(Some(Pickup {
                    pos,
                    active: false,
                    color: rng.color(),
                }));
            }
        }

        let mut order: Vec<usize> = (0..cells.len()).filter(|i| cells[*i].is_some()).collect();
        order.shuffle(rng);
        let mut field = Self {
            cols,
            cell,
            mass: cfg.pickup_mass,
            cells,
            pending: order.into(),
        };
        let initial = field.pending.len() / 4;
        field.refill(initial);
        log::info!(
            "Pickup grid ready: {cols}x{cols} cells of {cell}, {} active",
            field.active_count()
        );
        field
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Pickup> {
        if x >= self.cols || y >= self.cols {
            return None;
        }
        self.cells[y * self.cols + x].as_ref()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Pickup> {
        self.cells.iter().flatten().filter(|p| p.active)
    }

    /// Switch on up to `count` pickups from the front of the queue
    pub fn refill(&mut self, count: usize) -> usize {
        let mut activated = 0;
        while activated < count {
            let Some(idx) = self.pending.pop_front() else {
                break;
            };
            if let Some(p) = self.cells[idx].as_mut() {
                p.active = true;
                activated += 1;
            }
        }
        activated
    }

    /// Cell span searched for a circle: its covered cells plus one ring
    fn span(&self, lo: f64, hi: f64) -> (usize, usize) {
        let last = self.cols as i64 - 1;
        let first = ((lo / self.cell).floor() as i64 - 1).clamp(0, last);
        let end = ((hi / self.cell).floor() as i64 + 1).clamp(0, last);
        (first as usize, end as usize)
    }

    /// Eat every active pickup whose point lies inside the circle; returns the
    /// mass gained
    pub fn consume(&mut self, center: DVec2, radius: f64) -> u32 {
        if !center.is_finite() || !radius.is_finite() {
            return 0;
        }
        let (x0, x1) = self.span(center.x - radius, center.x + radius);
        let (y0, y1) = self.span(center.y - radius, center.y + radius);
        let r2 = radius * radius;
        let mut eaten = 0u32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let idx = y * self.cols + x;
                let Some(p) = self.cells[idx].as_mut() else {
                    continue;
                };
                if p.active && p.pos.distance_squared(center) <= r2 {
                    p.active = false;
                    self.pending.push_back(idx);
                    eaten += 1;
                }
            }
        }
        eaten * self.mass
    }

    #[cfg(test)]
    pub(crate) fn deactivate_all(&mut self) {
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            if let Some(p) = cell.as_mut().filter(|p| p.active) {
                p.active = false;
                self.pending.push_back(idx);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn activate_cell(&mut self, x: usize, y: usize) {
        let idx = y * self.cols + x;
        self.pending.retain(|i| *i != idx);
        if let Some(p) = self.cells[idx].as_mut() {
            p.active = true;
        }
    }
}
