//! Hazards: spiked bodies that burst any ball heavy enough to strike them
//!
//! Hazards never move, so their grid is maintained incrementally on spawn
//! and removal instead of being rebuilt every tick.

use glam::DVec2;
use std::f64::consts::TAU;

use super::arena::{Arena, Handle};
use super::ball::{Ball, BallMetrics};
use super::geometry::{Aabb, up_rotated};
use super::grid::SpatialGrid;
use super::rng::Lcg;
use crate::tuning::MatchConfig;

pub type HazardId = Handle<Hazard>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub mass: u32,
    pub radius: f64,
    pub pos: DVec2,
}

impl Hazard {
    /// The ball is heavy enough and deep enough inside to burst
    pub fn struck_by(&self, ball: &Ball, mass_ratio: f64) -> bool {
        if ball.mass as f64 <= self.mass as f64 * mass_ratio {
            return false;
        }
        let reach = (self.radius - ball.radius).abs() * mass_ratio;
        ball.pos.distance_squared(self.pos) < reach * reach
    }
}

/// Evenly spaced burst directions for 1..=max pieces, starting straight up
fn burst_fans(max: usize) -> Vec<Vec<DVec2>> {
    (0..=max)
        .map(|count| {
            (0..count)
                .map(|i| up_rotated(TAU * i as f64 / count as f64))
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct HazardField {
    arena: Arena<Hazard>,
    grid: SpatialGrid<HazardId>,
    fans: Vec<Vec<DVec2>>,
    scratch: Vec<HazardId>,
}

impl HazardField {
    /// Empty field; call `populate` to seed the starting hazards
    pub fn new(cfg: &MatchConfig) -> Self {
        Self {
            arena: Arena::with_capacity(cfg.hazard_max),
            grid: SpatialGrid::new(cfg.map_size, cfg.body_cell),
            fans: burst_fans(cfg.hazard_max_split),
            scratch: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HazardId, &Hazard)> {
        self.arena.iter()
    }

    pub fn get(&self, id: HazardId) -> Option<&Hazard> {
        self.arena.get(id)
    }

    /// Burst directions for `count` pieces (clamped to the largest fan)
    pub fn fan(&self, count: usize) -> &[DVec2] {
        let count = count.min(self.fans.len() - 1);
        &self.fans[count]
    }

    /// Place a hazard with explicit mass and position
    pub fn insert(&mut self, mass: u32, pos: DVec2, metrics: &mut BallMetrics) -> HazardId {
        let radius = metrics.radius(mass);
        let id = self.arena.insert(Hazard { mass, radius, pos });
        self.grid.insert(id, Aabb::around(pos, radius));
        id
    }

    /// Random tier at a random spot inside the spawn margin
    pub fn spawn(&mut self, cfg: &MatchConfig, rng: &mut Lcg, metrics: &mut BallMetrics) -> HazardId {
        let tiers = &cfg.hazard_mass_tiers;
        let mass = tiers.get(rng.index(tiers.len())).copied().unwrap_or(cfg.start_mass);
        let hi = cfg.map_size as i32 - cfg.spawn_margin;
        let pos = DVec2::new(
            rng.range_i32(cfg.spawn_margin, hi) as f64,
            rng.range_i32(cfg.spawn_margin, hi) as f64,
        );
        self.insert(mass, pos, metrics)
    }

    /// Spawn up to `count` hazards without exceeding the cap
    pub fn refill(
        &mut self,
        count: usize,
        cfg: &MatchConfig,
        rng: &mut Lcg,
        metrics: &mut BallMetrics,
    ) -> usize {
        let room = cfg.hazard_max.saturating_sub(self.len());
        let spawned = count.min(room);
        for _ in 0..spawned {
            self.spawn(cfg, rng, metrics);
        }
        if spawned > 0 {
            log::debug!("Spawned {spawned} hazards ({} on the map)", self.len());
        }
        spawned
    }

    /// Starting population: half the cap
    pub fn populate(&mut self, cfg: &MatchConfig, rng: &mut Lcg, metrics: &mut BallMetrics) {
        self.refill(cfg.hazard_max / 2, cfg, rng, metrics);
    }

    /// First hazard (in handle order) the ball strikes, if any
    pub fn find_strike(&mut self, ball: &Ball, mass_ratio: f64) -> Option<HazardId> {
        let mut scratch = std::mem::take(&mut self.scratch);
        self.grid
            .query_circle(ball.pos, ball.radius, self.grid.cell_size(), &mut scratch);
        let hit = scratch.iter().copied().find(|id| {
            self.arena
                .get(*id)
                .is_some_and(|h| h.struck_by(ball, mass_ratio))
        });
        self.scratch = scratch;
        hit
    }

    pub fn remove(&mut self, id: HazardId) -> Option<Hazard> {
        self.grid.remove(id);
        self.arena.remove(id)
    }
}
