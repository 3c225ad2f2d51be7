//! Simulation context
//!
//! `World` owns everything a tick mutates: the actor registry, the ball
//! arena and its grid, the pickup/hazard/ejecta fields, the RNG and the
//! simulation clock. Nothing outside the tick writes to it except through
//! `submit` and the explicit lifecycle calls below.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::actor::{Actor, Bodies, Command, Controller, Life};
use super::arena::Arena;
use super::ball::{ActorId, Ball, BallId, BallMetrics};
use super::bot::BotBrain;
use super::ejecta::EjectaField;
use super::grid::SpatialGrid;
use super::hazard::HazardField;
use super::pickup::PickupField;
use super::rng::Lcg;
use crate::tuning::MatchConfig;

/// Simulation transitions reported to the presentation and audio layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Split { actor: ActorId },
    Shoot { actor: ActorId, packets: usize },
    Absorbed { by: ActorId, victim: ActorId, mass: u32 },
    HazardBurst { actor: ActorId, pieces: usize },
    ActorDied { actor: ActorId, killer: Option<ActorId> },
    ActorRespawned { actor: ActorId },
    MatchEnded,
}

/// Shown to the human while their actor is dead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathNotice {
    pub killer_name: String,
    pub respawn_countdown: f64,
}

/// Accumulators for the low-frequency tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timers {
    pub decay: f64,
    pub pickup_refill: f64,
    pub hazard_refill: f64,
}

#[derive(Debug, Clone)]
pub struct World {
    pub cfg: MatchConfig,
    pub seed: u64,
    pub rng: Lcg,
    /// Simulation clock in seconds
    pub now: f64,
    pub metrics: BallMetrics,
    pub balls: Arena<Ball>,
    /// Registry keyed by id; iteration order is id order
    pub actors: BTreeMap<ActorId, Actor>,
    pub ball_grid: SpatialGrid<BallId>,
    pub hazards: HazardField,
    pub pickups: PickupField,
    pub ejecta: EjectaField,
    pub human: Option<ActorId>,
    pub death_notice: Option<DeathNotice>,
    pub timers: Timers,
    events: Vec<GameEvent>,
    next_actor: ActorId,
}

impl World {
    /// Empty arena with pickups laid out and the starting hazards placed
    pub fn new(cfg: MatchConfig) -> Self {
        let cfg = cfg.validated();
        let seed = cfg.seed.unwrap_or_else(crate::platform::now_millis);
        let mut rng = Lcg::new(seed);
        let mut metrics = BallMetrics::new(&cfg);
        let pickups = PickupField::new(&cfg, &mut rng);
        let mut hazards = HazardField::new(&cfg);
        hazards.populate(&cfg, &mut rng, &mut metrics);
        log::info!(
            "World ready: seed {seed}, map {}, {} hazards",
            cfg.map_size,
            hazards.len()
        );
        Self {
            ball_grid: SpatialGrid::new(cfg.map_size, cfg.body_cell),
            ejecta: EjectaField::new(cfg.map_size, cfg.ejecta_cell),
            seed,
            rng,
            now: 0.0,
            metrics,
            balls: Arena::new(),
            actors: BTreeMap::new(),
            hazards,
            pickups,
            human: None,
            death_notice: None,
            timers: Timers::default(),
            events: Vec::new(),
            next_actor: 0,
            cfg,
        }
    }

    /// Run `f` with one actor and the shared ball state borrowed together
    pub fn with_actor<R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut Actor, &mut Bodies, &mut Lcg, &mut EjectaField) -> R,
    ) -> Option<R> {
        let actor = self.actors.get_mut(&id)?;
        let mut bodies = Bodies {
            balls: &mut self.balls,
            metrics: &mut self.metrics,
            cfg: &self.cfg,
            now: self.now,
        };
        Some(f(actor, &mut bodies, &mut self.rng, &mut self.ejecta))
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn human_actor(&self) -> Option<&Actor> {
        self.human.and_then(|id| self.actors.get(&id))
    }

    /// Uniform spawn point inside the spawn margin
    pub fn random_spawn_point(&mut self) -> DVec2 {
        let lo = self.cfg.spawn_margin;
        let hi = self.cfg.map_size as i32 - lo;
        DVec2::new(
            self.rng.range_i32(lo, hi) as f64,
            self.rng.range_i32(lo, hi) as f64,
        )
    }

    /// Register an actor with one start-mass ball at a random spot
    pub fn add_actor(&mut self, name: String, controller: Controller) -> ActorId {
        let id = self.next_actor;
        self.next_actor += 1;
        let colors = (self.rng.color(), self.rng.color());
        let human = matches!(controller, Controller::Human(_));
        self.actors.insert(id, Actor::new(id, name, colors, controller));
        if human {
            if let Some(previous) = self.human.replace(id) {
                log::warn!("Replacing human actor {previous} with {id}");
            }
        }
        let pos = self.random_spawn_point();
        self.with_actor(id, |actor, bodies, _, _| actor.respawn(bodies, pos));
        id
    }

    pub fn add_human(&mut self, name: String) -> ActorId {
        self.add_actor(name, Controller::Human(Default::default()))
    }

    pub fn add_bot(&mut self, name: String) -> ActorId {
        self.add_actor(name, Controller::Autonomous(BotBrain::new()))
    }

    /// Give an actor an extra ball
    pub fn spawn_ball(&mut self, actor: ActorId, pos: DVec2, mass: u32) -> Option<BallId> {
        self.with_actor(actor, |a, bodies, _, _| a.spawn_ball(bodies, pos, mass))
    }

    /// Drop an actor and every ball it owns, from the arena and the grid
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let actor = self.actors.remove(&id)?;
        for ball in &actor.balls {
            self.ball_grid.remove(*ball);
            self.balls.remove(*ball);
        }
        if self.human == Some(id) {
            self.human = None;
            self.death_notice = None;
        }
        log::debug!("Removed actor {id} ({})", actor.name);
        Some(actor)
    }

    /// Queue a command for the human-controlled actor `id`
    pub fn submit(&mut self, id: ActorId, command: Command) -> bool {
        match self.actors.get_mut(&id).map(|a| &mut a.controller) {
            Some(Controller::Human(queue)) => {
                queue.push_back(command);
                true
            }
            Some(Controller::Autonomous(_)) => {
                log::debug!("Ignoring {command:?} for autonomous actor {id}");
                false
            }
            None => false,
        }
    }

    /// Split every eligible ball of a live actor
    pub fn split(&mut self, id: ActorId) -> bool {
        let split = self
            .with_actor(id, |actor, bodies, _, _| {
                if !actor.is_alive() {
                    return false;
                }
                actor.steer(bodies);
                actor.split(bodies)
            })
            .unwrap_or(false);
        if split {
            self.emit(GameEvent::Split { actor: id });
        }
        split
    }

    /// Throw ejecta from every eligible ball of a live actor
    pub fn shoot(&mut self, id: ActorId) -> bool {
        let packets = self
            .with_actor(id, |actor, bodies, _, ejecta| {
                if !actor.is_alive() {
                    return 0;
                }
                actor.steer(bodies);
                actor.shoot(bodies, ejecta)
            })
            .unwrap_or(0);
        if packets > 0 {
            self.emit(GameEvent::Shoot { actor: id, packets });
        }
        packets > 0
    }

    /// Death transition: any balls left are dropped and the actor waits to
    /// respawn (humans for the countdown, bots until the end of the tick)
    pub fn kill(&mut self, id: ActorId, killer: Option<ActorId>) {
        let countdown = self.cfg.respawn_countdown_secs;
        let killer_name = killer
            .and_then(|k| self.actors.get(&k))
            .map(|k| k.name.clone())
            .unwrap_or_default();
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        if !actor.is_alive() {
            return;
        }
        let human = actor.is_human();
        for ball in actor.balls.drain(..) {
            self.ball_grid.remove(ball);
            self.balls.remove(ball);
        }
        actor.life = Life::Dead {
            killer,
            countdown: if human { countdown } else { 0.0 },
        };
        actor.score = 0;
        log::debug!("Actor {id} ({}) eaten by {killer_name:?}", actor.name);
        if human {
            self.death_notice = Some(DeathNotice {
                killer_name,
                respawn_countdown: countdown,
            });
        }
        self.emit(GameEvent::ActorDied { actor: id, killer });
    }

    /// Bring a dead actor back with a fresh ball
    pub fn respawn(&mut self, id: ActorId) -> bool {
        if self.actors.get(&id).is_none_or(Actor::is_alive) {
            return false;
        }
        let pos = self.random_spawn_point();
        self.with_actor(id, |actor, bodies, _, _| {
            actor.respawn(bodies, pos);
        });
        if self.human == Some(id) {
            self.death_notice = None;
        }
        log::debug!("Actor {id} respawned at {pos}");
        self.emit(GameEvent::ActorRespawned { actor: id });
        true
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Sum of all ball masses
    pub fn total_ball_mass(&self) -> u64 {
        self.balls.iter().map(|(_, b)| b.mass as u64).sum()
    }

    pub fn recompute_scores(&mut self) {
        for actor in self.actors.values_mut() {
            actor.recompute_score(&self.balls);
        }
    }
}

/// World with no bots, hazards, active pickups or periodic tasks
#[cfg(test)]
pub(crate) fn test_world() -> World {
    let cfg = MatchConfig {
        seed: Some(7),
        bot_count: 0,
        hazard_max: 0,
        pickup_refill_secs: 1e9,
        hazard_refill_secs: 1e9,
        decay_interval_secs: 1e9,
        ..MatchConfig::default()
    };
    let mut world = World::new(cfg);
    world.pickups.deactivate_all();
    world
}
