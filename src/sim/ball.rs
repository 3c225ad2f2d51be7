//! Balls: the mass-bearing circles every actor steers
//!
//! Radius and speed are pure functions of mass. `BallMetrics` evaluates them
//! and memoizes the radius per whole mass unit.

use glam::DVec2;

use super::arena::Handle;
use super::geometry::{Aabb, clamp_inset};
use crate::tuning::MatchConfig;

pub type BallId = Handle<Ball>;

/// Owner key (index into the world's actor list)
pub type ActorId = u32;

/// Radius/speed derivation shared by every ball in a match
#[derive(Debug, Clone)]
pub struct BallMetrics {
    min_radius: f64,
    radius_scale: f64,
    max_speed: f64,
    min_speed: f64,
    speed_decay_mass: f64,
    radius_cache: Vec<f64>,
}

/// Largest mass whose radius is memoized
const RADIUS_CACHE_LIMIT: u32 = 1 << 20;

impl BallMetrics {
    pub fn new(cfg: &MatchConfig) -> Self {
        Self {
            min_radius: cfg.min_radius,
            radius_scale: cfg.radius_scale,
            max_speed: cfg.max_speed,
            min_speed: cfg.min_speed,
            speed_decay_mass: cfg.speed_decay_mass,
            radius_cache: Vec::new(),
        }
    }

    /// `min_radius + sqrt(mass) * radius_scale`
    pub fn radius(&mut self, mass: u32) -> f64 {
        if mass >= RADIUS_CACHE_LIMIT {
            return self.compute_radius(mass);
        }
        let idx = mass as usize;
        if idx >= self.radius_cache.len() {
            let start = self.radius_cache.len() as u32;
            // Grow in chunks so a slowly growing ball doesn't resize every tick
            let end = (mass + 1).max(start * 2).min(RADIUS_CACHE_LIMIT);
            for m in start..end {
                let r = self.compute_radius(m);
                self.radius_cache.push(r);
            }
        }
        self.radius_cache[idx]
    }

    fn compute_radius(&self, mass: u32) -> f64 {
        self.min_radius + (mass as f64).sqrt() * self.radius_scale
    }

    /// Linear ramp down from `max_speed`, never below `min_speed`
    pub fn speed(&self, mass: u32) -> f64 {
        let ramp = self.max_speed - self.max_speed * mass as f64 / self.speed_decay_mass;
        ramp.max(self.min_speed)
    }
}

/// Scripted straight-line move that ignores steering (split fly-out)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flight {
    pub from: DVec2,
    pub to: DVec2,
    pub elapsed: f64,
    pub duration: f64,
}

impl Flight {
    pub fn new(from: DVec2, to: DVec2, duration: f64) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
        }
    }

    /// Advance and return the new position and whether the flight finished
    pub fn advance(&mut self, dt: f64) -> (DVec2, bool) {
        self.elapsed += dt;
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            return (self.to, true);
        }
        let t = self.elapsed / self.duration;
        (self.from.lerp(self.to, t), false)
    }
}

/// A ball entity
#[derive(Debug, Clone)]
pub struct Ball {
    pub owner: ActorId,
    pub mass: u32,
    pub radius: f64,
    pub speed: f64,
    pub pos: DVec2,
    /// Current movement direction (unit or zero)
    pub direction: DVec2,
    /// Facing derived from the owner's intent; split and shoot use it
    pub heading: DVec2,
    /// Simulation time of the last split this ball took part in
    pub last_split: f64,
    /// In-flight animation; the ball is not movable while set
    pub flight: Option<Flight>,
    /// Separation displacement queued for the next movement step
    pub push: DVec2,
}

impl Ball {
    pub fn new(owner: ActorId, mass: u32, pos: DVec2, now: f64, metrics: &mut BallMetrics) -> Self {
        Self {
            owner,
            mass,
            radius: metrics.radius(mass),
            speed: metrics.speed(mass),
            pos,
            direction: DVec2::ZERO,
            heading: DVec2::ZERO,
            last_split: now,
            flight: None,
            push: DVec2::ZERO,
        }
    }

    /// Not in a split/hazard fly-out
    #[inline]
    pub fn movable(&self) -> bool {
        self.flight.is_none()
    }

    /// Change mass and refresh the derived radius and speed
    pub fn set_mass(&mut self, mass: u32, metrics: &mut BallMetrics) {
        self.mass = mass;
        self.radius = metrics.radius(mass);
        self.speed = metrics.speed(mass);
    }

    pub fn add_mass(&mut self, gain: u32, metrics: &mut BallMetrics) {
        self.set_mass(self.mass.saturating_add(gain), metrics);
    }

    /// Set the movement direction. Facing follows it unless the ball is told
    /// to stand still, in which case it keeps the last facing.
    pub fn set_direction(&mut self, direction: DVec2) {
        self.direction = direction;
        if direction != DVec2::ZERO {
            self.heading = direction;
        }
    }

    /// Facing for split/shoot, straight up for a ball that never moved
    pub fn facing(&self) -> DVec2 {
        if self.heading == DVec2::ZERO {
            DVec2::Y
        } else {
            self.heading
        }
    }

    /// Merge cooldown has elapsed
    #[inline]
    pub fn cooled_down(&self, now: f64, cooldown: f64) -> bool {
        now - self.last_split > cooldown
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::around(self.pos, self.radius)
    }

    /// One movement step. In-flight balls follow their flight; others move
    /// along `direction` at `speed * magnitude`, plus any queued push, and
    /// are clamped so their inset square stays on the map.
    pub fn advance(&mut self, magnitude: f64, dt: f64, inset: f64, map_size: f64) {
        if let Some(flight) = self.flight.as_mut() {
            let (pos, done) = flight.advance(dt);
            self.pos = clamp_inset(pos, self.radius, inset, map_size);
            if done {
                self.flight = None;
            }
            self.push = DVec2::ZERO;
            return;
        }
        let step = self.direction * self.speed * magnitude * dt + self.push;
        self.push = DVec2::ZERO;
        self.pos = clamp_inset(self.pos + step, self.radius, inset, map_size);
    }
}
