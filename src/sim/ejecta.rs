//! Ejecta: mass packets thrown by `shoot`
//!
//! A packet flies a short scripted path, then lands and becomes edible. Only
//! landed packets are indexed in the grid.

use glam::DVec2;

use super::arena::{Arena, Handle};
use super::ball::{ActorId, Flight};
use super::geometry::Aabb;
use super::grid::SpatialGrid;

pub type EjectaId = Handle<Ejecta>;

#[derive(Debug, Clone)]
pub struct Ejecta {
    pub owner: ActorId,
    pub mass: u32,
    pub radius: f64,
    pub pos: DVec2,
    pub color: [u8; 3],
    pub flight: Option<Flight>,
}

impl Ejecta {
    /// Landed and edible
    pub fn collidable(&self) -> bool {
        self.flight.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct EjectaField {
    arena: Arena<Ejecta>,
    grid: SpatialGrid<EjectaId>,
    scratch: Vec<EjectaId>,
}

impl EjectaField {
    pub fn new(map_size: f64, cell_size: f64) -> Self {
        Self {
            arena: Arena::new(),
            grid: SpatialGrid::new(map_size, cell_size),
            scratch: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Landed packets in the grid
    pub fn landed(&self) -> usize {
        self.grid.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EjectaId, &Ejecta)> {
        self.arena.iter()
    }

    /// Throw a packet from its current position to `to`
    pub fn launch(&mut self, mut ejecta: Ejecta, to: DVec2, duration: f64) -> EjectaId {
        ejecta.flight = Some(Flight::new(ejecta.pos, to, duration));
        self.arena.insert(ejecta)
    }

    /// Progress flights and index packets that land
    pub fn advance(&mut self, dt: f64) {
        for (id, ejecta) in self.arena.iter_mut() {
            let Some(flight) = ejecta.flight.as_mut() else {
                continue;
            };
            let (pos, done) = flight.advance(dt);
            ejecta.pos = pos;
            if done {
                ejecta.flight = None;
                self.grid.insert(id, Aabb::around(pos, ejecta.radius));
            }
        }
    }

    /// Eat every landed packet whose center lies inside the circle; returns
    /// the mass gained
    pub fn consume(&mut self, center: DVec2, radius: f64) -> u32 {
        let mut scratch = std::mem::take(&mut self.scratch);
        self.grid
            .query_circle(center, radius, self.grid.cell_size(), &mut scratch);
        let mut gained = 0u32;
        for &id in &scratch {
            let inside = self
                .arena
                .get(id)
                .is_some_and(|e| e.pos.distance_squared(center) <= radius * radius);
            if inside {
                self.grid.remove(id);
                if let Some(eaten) = self.arena.remove(id) {
                    gained = gained.saturating_add(eaten.mass);
                }
            }
        }
        self.scratch = scratch;
        gained
    }

    pub fn clear(&mut self) {
        self.arena = Arena::new();
        self.grid.clear();
    }
}
