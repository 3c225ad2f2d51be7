//! Actors and the per-actor ball state machine
//!
//! An actor owns a list of ball handles into the shared ball arena. Human and
//! autonomous actors are the same type; only the intent source differs.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::arena::Arena;
use super::ball::{ActorId, Ball, BallId, BallMetrics, Flight};
use super::bot::BotBrain;
use super::ejecta::{Ejecta, EjectaField};
use super::geometry::{centroid, circles_overlapping, clamp_inset, clamp_margin, point_along};
use crate::tuning::MatchConfig;

/// Normalized steering input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Unit vector, or zero to stand still
    pub direction: DVec2,
    /// Speed fraction in [0, 1]
    pub magnitude: f64,
}

impl Intent {
    /// Build a sanitized intent. Non-finite or zero directions become zero,
    /// others are normalized; magnitude is clamped and NaN becomes 0.
    pub fn new(direction: DVec2, magnitude: f64) -> Self {
        let direction = if direction.is_finite() {
            direction.normalize_or_zero()
        } else {
            DVec2::ZERO
        };
        let magnitude = if magnitude.is_nan() {
            0.0
        } else {
            magnitude.clamp(0.0, 1.0)
        };
        Self {
            direction,
            magnitude,
        }
    }

    /// Resting intent after (re)spawn
    pub fn idle(cfg: &MatchConfig) -> Self {
        Self::new(DVec2::ZERO, cfg.idle_magnitude)
    }

    pub fn stopped() -> Self {
        Self::new(DVec2::ZERO, 0.0)
    }
}

/// Discrete input from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Move { direction: DVec2, magnitude: f64 },
    Split,
    Shoot,
    Stop,
    /// Skip the remaining death countdown
    Respawn,
}

/// Where an actor's intents come from
#[derive(Debug, Clone)]
pub enum Controller {
    /// Commands queued by the input collaborator, drained each tick
    Human(VecDeque<Command>),
    Autonomous(BotBrain),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Life {
    Alive,
    Dead {
        killer: Option<ActorId>,
        /// Seconds until an automatic respawn
        countdown: f64,
    },
}

/// How mass left over from integer division is assigned during a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// Voluntary split: each new ball gets `floor(total / (count + 1))`, the
    /// source keeps the rest
    KeepOnSource,
    /// Hazard strike: pieces get up to the piece cap; if that leaves more than
    /// the floor mass over, the source keeps it, otherwise the source is
    /// consumed and the remainder is dealt one unit at a time to the pieces
    RoundRobinToPieces,
}

/// Result of dividing mass between a source ball and new pieces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shares {
    /// Mass left on the source; 0 means the source is consumed
    pub source: u32,
    pub pieces: Vec<u32>,
}

/// Divide `total` mass between the source ball and `count` new pieces
pub fn share_mass(
    total: u32,
    count: usize,
    policy: RemainderPolicy,
    max_piece: u32,
    floor_mass: u32,
) -> Shares {
    let count = count.min(total as usize);
    if count == 0 {
        return Shares {
            source: total,
            pieces: Vec::new(),
        };
    }
    let n = count as u32;
    match policy {
        RemainderPolicy::KeepOnSource => {
            let piece = total / (n + 1);
            if piece == 0 {
                return Shares {
                    source: total,
                    pieces: Vec::new(),
                };
            }
            Shares {
                source: total - piece * n,
                pieces: vec![piece; count],
            }
        }
        RemainderPolicy::RoundRobinToPieces => {
            let piece = (total / n).min(max_piece.max(1));
            let dealt = piece * n;
            if dealt + floor_mass < total {
                return Shares {
                    source: total - dealt,
                    pieces: vec![piece; count],
                };
            }
            let mut pieces = vec![piece; count];
            for unit in 0..(total - dealt) as usize {
                pieces[unit % count] += 1;
            }
            Shares { source: 0, pieces }
        }
    }
}

/// Mutable view of the shared ball state handed to actor operations
pub struct Bodies<'a> {
    pub balls: &'a mut Arena<Ball>,
    pub metrics: &'a mut BallMetrics,
    pub cfg: &'a MatchConfig,
    /// Simulation clock
    pub now: f64,
}

/// Split request for one source ball
#[derive(Debug, Clone, Copy)]
pub struct SplitPlan<'d> {
    pub directions: &'d [DVec2],
    pub extra_mass: u32,
    pub policy: RemainderPolicy,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub body_color: [u8; 3],
    pub ejecta_color: [u8; 3],
    pub intent: Intent,
    pub balls: Vec<BallId>,
    /// Sum of live ball masses
    pub score: u32,
    pub controller: Controller,
    pub life: Life,
}

impl Actor {
    pub fn new(id: ActorId, name: String, colors: ([u8; 3], [u8; 3]), controller: Controller) -> Self {
        Self {
            id,
            name,
            body_color: colors.0,
            ejecta_color: colors.1,
            intent: Intent::stopped(),
            balls: Vec::new(),
            score: 0,
            controller,
            life: Life::Alive,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self.controller, Controller::Human(_))
    }

    pub fn is_alive(&self) -> bool {
        self.life == Life::Alive
    }

    /// Put a new ball into play for this actor
    pub fn spawn_ball(&mut self, bodies: &mut Bodies, pos: DVec2, mass: u32) -> BallId {
        let ball = Ball::new(self.id, mass, pos, bodies.now, bodies.metrics);
        let id = bodies.balls.insert(ball);
        self.balls.push(id);
        id
    }

    /// Forget a ball that was removed from the arena
    pub fn detach(&mut self, ball: BallId) -> bool {
        match self.balls.iter().position(|b| *b == ball) {
            Some(idx) => {
                self.balls.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Back to a single start-mass ball at `pos`
    pub fn respawn(&mut self, bodies: &mut Bodies, pos: DVec2) -> BallId {
        for id in self.balls.drain(..) {
            bodies.balls.remove(id);
        }
        self.intent = Intent::idle(bodies.cfg);
        self.life = Life::Alive;
        let mass = bodies.cfg.start_mass;
        let id = self.spawn_ball(bodies, pos, mass);
        self.score = mass;
        id
    }

    pub fn recompute_score(&mut self, balls: &Arena<Ball>) -> u32 {
        self.score = self
            .balls
            .iter()
            .filter_map(|id| balls.get(*id))
            .map(|b| b.mass)
            .sum();
        self.score
    }

    /// Centroid of the actor's ball centers
    pub fn center(&self, balls: &Arena<Ball>) -> Option<DVec2> {
        centroid(self.balls.iter().filter_map(|id| balls.get(*id)).map(|b| b.pos))
    }

    /// Turn the intent into per-ball directions. A lone ball follows the
    /// intent; several balls converge on a point projected ahead of their
    /// centroid so they regroup while moving.
    pub fn steer(&self, bodies: &mut Bodies) {
        match self.balls.as_slice() {
            [] => {}
            [only] => {
                if let Some(ball) = bodies.balls.get_mut(*only) {
                    ball.set_direction(self.intent.direction);
                }
            }
            many => {
                let Some(center) = self.center(bodies.balls) else {
                    return;
                };
                let target = point_along(center, self.intent.direction, bodies.cfg.direction_projection);
                for id in many {
                    if let Some(ball) = bodies.balls.get_mut(*id) {
                        ball.set_direction((target - ball.pos).normalize_or_zero());
                    }
                }
            }
        }
    }

    /// Ball handles ordered by descending mass, ties by handle
    fn by_mass_desc(&self, balls: &Arena<Ball>) -> Vec<(BallId, u32)> {
        let mut order: Vec<(BallId, u32)> = self
            .balls
            .iter()
            .filter_map(|id| balls.get(*id).map(|b| (*id, b.mass)))
            .collect();
        order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        order
    }

    /// Voluntary split: every ball heavy enough halves itself, heaviest first,
    /// until the ball cap is reached. Returns whether any ball was created.
    pub fn split(&mut self, bodies: &mut Bodies) -> bool {
        let capacity = bodies.cfg.max_balls.saturating_sub(self.balls.len());
        let sources: Vec<BallId> = self
            .by_mass_desc(bodies.balls)
            .into_iter()
            .filter(|(_, mass)| *mass >= bodies.cfg.min_split_mass)
            .take(capacity)
            .map(|(id, _)| id)
            .collect();
        let mut created = 0;
        for source in sources {
            let Some(facing) = bodies.balls.get(source).map(Ball::facing) else {
                continue;
            };
            let plan = SplitPlan {
                directions: &[facing],
                extra_mass: 0,
                policy: RemainderPolicy::KeepOnSource,
            };
            created += self.split_ball(bodies, source, plan).len();
        }
        created > 0
    }

    /// Split one ball into `plan.directions.len()` new pieces plus whatever
    /// the policy leaves on the source. Returns the new balls.
    pub fn split_ball(&mut self, bodies: &mut Bodies, source: BallId, plan: SplitPlan) -> Vec<BallId> {
        let cfg = bodies.cfg;
        let now = bodies.now;
        let Some(src) = bodies.balls.get(source) else {
            return Vec::new();
        };
        let (origin, src_radius, src_direction) = (src.pos, src.radius, src.direction);
        let total = src.mass.saturating_add(plan.extra_mass);
        let shares = share_mass(
            total,
            plan.directions.len(),
            plan.policy,
            cfg.hazard_max_piece_mass(),
            cfg.start_mass,
        );

        let mut created = Vec::with_capacity(shares.pieces.len());
        for (mass, dir) in shares.pieces.iter().zip(plan.directions) {
            let radius = bodies.metrics.radius(*mass);
            let (from, to) = match plan.policy {
                RemainderPolicy::KeepOnSource => {
                    let reach = (radius * cfg.split_distance_factor).max(cfg.split_min_distance);
                    (origin, point_along(origin, *dir, reach))
                }
                RemainderPolicy::RoundRobinToPieces => (
                    point_along(origin, *dir, src_radius),
                    point_along(origin, *dir, src_radius + cfg.hazard_piece_travel),
                ),
            };
            let from = clamp_inset(from, radius, cfg.edge_inset, cfg.map_size);
            let to = clamp_inset(to, radius, cfg.edge_inset, cfg.map_size);
            let id = self.spawn_ball(bodies, from, *mass);
            if let Some(piece) = bodies.balls.get_mut(id) {
                piece.heading = *dir;
                piece.direction = match plan.policy {
                    RemainderPolicy::KeepOnSource => src_direction,
                    RemainderPolicy::RoundRobinToPieces => *dir,
                };
                piece.flight = Some(Flight::new(from, to, cfg.split_flight_secs));
            }
            created.push(id);
        }

        if shares.source == 0 {
            bodies.balls.remove(source);
            self.detach(source);
        } else if let Some(src) = bodies.balls.get_mut(source) {
            src.set_mass(shares.source, bodies.metrics);
            if !created.is_empty() {
                src.last_split = now;
            }
        }
        log::trace!(
            "actor {} split {:?} into {} pieces (source keeps {})",
            self.id,
            source,
            created.len(),
            shares.source
        );
        created
    }

    /// Collapse every mergeable pair, repeating until a full pass finds none.
    /// Returns the number of merges.
    pub fn merge_pass(&mut self, bodies: &mut Bodies) -> usize {
        let cooldown = bodies.cfg.merge_cooldown_secs;
        let slack = bodies.cfg.merge_slack;
        let mut merges = 0;
        'pass: loop {
            let order = self.by_mass_desc(bodies.balls);
            for (i, (big_id, _)) in order.iter().enumerate() {
                for (small_id, _) in &order[i + 1..] {
                    let (Some(big), Some(small)) = (bodies.balls.get(*big_id), bodies.balls.get(*small_id))
                    else {
                        continue;
                    };
                    let eligible = (big.cooled_down(bodies.now, cooldown)
                        || small.cooled_down(bodies.now, cooldown))
                        && big.movable()
                        && small.movable()
                        && circles_overlapping(big.pos, big.radius, small.pos, small.radius, slack);
                    if !eligible {
                        continue;
                    }
                    let Some(eaten) = bodies.balls.remove(*small_id) else {
                        continue;
                    };
                    self.detach(*small_id);
                    if let Some(big) = bodies.balls.get_mut(*big_id) {
                        big.add_mass(eaten.mass, bodies.metrics);
                    }
                    merges += 1;
                    continue 'pass;
                }
            }
            break;
        }
        merges
    }

    /// Queue a push apart for overlapping balls that are still cooling down.
    /// Each side moves by the other side's share of the combined mass, so the
    /// lighter ball gives way more.
    pub fn separation_pass(&self, bodies: &mut Bodies) {
        let cooldown = bodies.cfg.merge_cooldown_secs;
        for (i, a_id) in self.balls.iter().enumerate() {
            for b_id in &self.balls[i + 1..] {
                let (Some(a), Some(b)) = (bodies.balls.get(*a_id), bodies.balls.get(*b_id)) else {
                    continue;
                };
                if !a.movable() || !b.movable() {
                    continue;
                }
                if a.cooled_down(bodies.now, cooldown) || b.cooled_down(bodies.now, cooldown) {
                    continue;
                }
                let delta = b.pos - a.pos;
                let dist = delta.length();
                let depth = a.radius + b.radius - dist;
                if depth <= 0.0 {
                    continue;
                }
                let normal = if dist > f64::EPSILON { delta / dist } else { DVec2::X };
                let total = (a.mass + b.mass).max(1) as f64;
                let a_push = -normal * depth * (b.mass as f64 / total);
                let b_push = normal * depth * (a.mass as f64 / total);
                if let Some(a) = bodies.balls.get_mut(*a_id) {
                    a.push += a_push;
                }
                if let Some(b) = bodies.balls.get_mut(*b_id) {
                    b.push += b_push;
                }
            }
        }
    }

    /// Every ball heavy enough throws one packet along its facing. Returns the
    /// number of packets thrown.
    pub fn shoot(&mut self, bodies: &mut Bodies, ejecta: &mut EjectaField) -> usize {
        let cfg = bodies.cfg;
        let packet_radius = bodies.metrics.radius(cfg.ejecta_mass);
        let mut thrown = 0;
        for id in &self.balls {
            let Some(ball) = bodies.balls.get_mut(*id) else {
                continue;
            };
            if ball.mass < cfg.min_shoot_mass || ball.mass <= cfg.ejecta_mass {
                continue;
            }
            let facing = ball.facing();
            let begin = point_along(ball.pos, facing, ball.radius * cfg.ejecta_launch_factor);
            let target = clamp_margin(
                point_along(begin, facing, cfg.ejecta_travel),
                cfg.ejecta_edge_margin,
                cfg.map_size,
            );
            let mass = ball.mass - cfg.ejecta_mass;
            ball.set_mass(mass, bodies.metrics);
            ejecta.launch(
                Ejecta {
                    owner: self.id,
                    mass: cfg.ejecta_mass,
                    radius: packet_radius,
                    pos: begin,
                    color: self.ejecta_color,
                    flight: None,
                },
                target,
                cfg.ejecta_flight_secs,
            );
            thrown += 1;
        }
        thrown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Fixture {
        balls: Arena<Ball>,
        metrics: BallMetrics,
        cfg: MatchConfig,
        now: f64,
    }

    impl Fixture {
        fn new() -> Self {
            let cfg = MatchConfig::default();
            Self {
                balls: Arena::new(),
                metrics: BallMetrics::new(&cfg),
                cfg,
                now: 0.0,
            }
        }

        fn bodies(&mut self) -> Bodies<'_> {
            Bodies {
                balls: &mut self.balls,
                metrics: &mut self.metrics,
                cfg: &self.cfg,
                now: self.now,
            }
        }
    }

    fn bot(id: ActorId) -> Actor {
        Actor::new(id, format!("bot{id}"), ([1, 2, 3], [4, 5, 6]), Controller::Autonomous(BotBrain::new()))
    }

    fn total_mass(actor: &Actor, balls: &Arena<Ball>) -> u32 {
        actor.balls.iter().filter_map(|id| balls.get(*id)).map(|b| b.mass).sum()
    }

    #[test]
    fn test_intent_sanitized() {
        let i = Intent::new(DVec2::new(3.0, 4.0), 2.0);
        assert!((i.direction - DVec2::new(0.6, 0.8)).length() < 1e-12);
        assert_eq!(i.magnitude, 1.0);
        let i = Intent::new(DVec2::new(f64::NAN, 1.0), f64::NAN);
        assert_eq!(i.direction, DVec2::ZERO);
        assert_eq!(i.magnitude, 0.0);
        assert_eq!(Intent::new(DVec2::ZERO, -1.0).magnitude, 0.0);
    }

    #[test]
    fn test_start_mass_ball_splits_in_half() {
        let mut fx = Fixture::new();
        // Low split threshold so a start-mass ball qualifies
        fx.cfg.min_split_mass = 10;
        let mut actor = bot(0);
        let first = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1500.0, 1500.0), 10);
        fx.now = 4.0;
        assert!(actor.split(&mut fx.bodies()));
        assert_eq!(actor.balls.len(), 2);
        let masses: Vec<u32> = actor.balls.iter().map(|id| fx.balls.get(*id).unwrap().mass).collect();
        assert_eq!(masses, vec![5, 5]);
        // Both halves start the merge cooldown
        for id in &actor.balls {
            assert_eq!(fx.balls.get(*id).unwrap().last_split, 4.0);
        }
        // New ball flies straight up from the source (no heading yet)
        let new = fx.balls.get(actor.balls[1]).unwrap();
        assert!(!new.movable());
        let flight = new.flight.unwrap();
        assert_eq!(flight.from, DVec2::new(1500.0, 1500.0));
        assert!((flight.to - DVec2::new(1500.0, 1700.0)).length() < 1e-9);
        assert!(fx.balls.get(first).unwrap().movable());
    }

    #[test]
    fn test_odd_mass_leaves_remainder_on_source() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        let src = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1500.0, 1500.0), 41);
        assert!(actor.split(&mut fx.bodies()));
        assert_eq!(fx.balls.get(src).unwrap().mass, 21);
        assert_eq!(fx.balls.get(actor.balls[1]).unwrap().mass, 20);
    }

    #[test]
    fn test_split_below_threshold_does_nothing() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        actor.spawn_ball(&mut fx.bodies(), DVec2::new(1500.0, 1500.0), 36);
        assert!(!actor.split(&mut fx.bodies()));
        assert_eq!(actor.balls.len(), 1);
    }

    #[test]
    fn test_split_respects_cap_heaviest_first() {
        let mut fx = Fixture::new();
        fx.cfg.max_balls = 4;
        let mut actor = bot(0);
        let masses = [40, 100, 60];
        let ids: Vec<BallId> = masses
            .iter()
            .enumerate()
            .map(|(i, m)| actor.spawn_ball(&mut fx.bodies(), DVec2::new(500.0 + 300.0 * i as f64, 500.0), *m))
            .collect();
        assert!(actor.split(&mut fx.bodies()));
        assert_eq!(actor.balls.len(), 4);
        assert_eq!(fx.balls.get(ids[1]).unwrap().mass, 50);
        assert_eq!(fx.balls.get(ids[0]).unwrap().mass, 40);
        assert_eq!(fx.balls.get(ids[2]).unwrap().mass, 60);
        assert_eq!(total_mass(&actor, &fx.balls), 200);
        // Full: nothing more to do
        assert!(!actor.split(&mut fx.bodies()));
    }

    #[test]
    fn test_hazard_split_consumes_source_when_little_is_left() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        let src = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1500.0, 1500.0), 150);
        let dirs: Vec<DVec2> = (0..6)
            .map(|i| super::super::geometry::up_rotated(std::f64::consts::TAU * i as f64 / 6.0))
            .collect();
        let plan = SplitPlan {
            directions: &dirs,
            extra_mass: 100,
            policy: RemainderPolicy::RoundRobinToPieces,
        };
        let pieces = actor.split_ball(&mut fx.bodies(), src, plan);
        // 250 / 6 = 41, 41 * 6 = 246 >= 250 - 10, source consumed, 4 units dealt
        assert_eq!(pieces.len(), 6);
        assert!(!fx.balls.contains(src));
        assert_eq!(actor.balls.len(), 6);
        assert_eq!(total_mass(&actor, &fx.balls), 250);
    }

    #[test]
    fn test_hazard_split_keeps_large_source() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        let src = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1500.0, 1500.0), 1000);
        let dirs = [DVec2::X, DVec2::Y, DVec2::NEG_X];
        let plan = SplitPlan {
            directions: &dirs,
            extra_mass: 220,
            policy: RemainderPolicy::RoundRobinToPieces,
        };
        let pieces = actor.split_ball(&mut fx.bodies(), src, plan);
        assert_eq!(pieces.len(), 3);
        for id in &pieces {
            assert_eq!(fx.balls.get(*id).unwrap().mass, 54);
        }
        assert_eq!(fx.balls.get(src).unwrap().mass, 1220 - 162);
        // Pieces fly out from the rim of the struck ball
        let src_radius = fx.metrics.radius(1000);
        let flight = fx.balls.get(pieces[0]).unwrap().flight.unwrap();
        assert!((flight.from - DVec2::new(1500.0 + src_radius, 1500.0)).length() < 1e-9);
        assert!((flight.to - DVec2::new(1500.0 + src_radius + 150.0, 1500.0)).length() < 1e-9);
    }

    #[test]
    fn test_merge_after_cooldown() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        let a = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0, 1000.0), 60);
        actor.spawn_ball(&mut fx.bodies(), DVec2::new(1005.0, 1000.0), 40);
        // Still cooling down
        fx.now = 10.0;
        assert_eq!(actor.merge_pass(&mut fx.bodies()), 0);
        fx.now = 31.0;
        assert_eq!(actor.merge_pass(&mut fx.bodies()), 1);
        assert_eq!(actor.balls, vec![a]);
        assert_eq!(fx.balls.get(a).unwrap().mass, 100);
        assert_eq!(fx.balls.len(), 1);
    }

    #[test]
    fn test_merge_chain_collapses_in_one_pass() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        for (i, mass) in [30u32, 80, 50, 20].iter().enumerate() {
            actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0 + i as f64 * 2.0, 1000.0), *mass);
        }
        fx.now = 40.0;
        let before = total_mass(&actor, &fx.balls);
        assert_eq!(actor.merge_pass(&mut fx.bodies()), 3);
        assert_eq!(actor.balls.len(), 1);
        assert_eq!(total_mass(&actor, &fx.balls), before);
        // Fixed point: a second pass does nothing
        assert_eq!(actor.merge_pass(&mut fx.bodies()), 0);
    }

    #[test]
    fn test_in_flight_balls_never_merge() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0, 1000.0), 60);
        let b = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0, 1000.0), 40);
        fx.balls.get_mut(b).unwrap().flight = Some(Flight::new(DVec2::ZERO, DVec2::ONE, 1.0));
        fx.now = 100.0;
        assert_eq!(actor.merge_pass(&mut fx.bodies()), 0);
    }

    #[test]
    fn test_separation_lighter_moves_more() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        let heavy = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0, 1000.0), 300);
        let light = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1030.0, 1000.0), 100);
        fx.now = 1.0;
        actor.separation_pass(&mut fx.bodies());
        let hp = fx.balls.get(heavy).unwrap().push;
        let lp = fx.balls.get(light).unwrap().push;
        assert!(hp.x < 0.0 && lp.x > 0.0);
        assert!(lp.length() > hp.length());
        let depth = fx.metrics.radius(300) + fx.metrics.radius(100) - 30.0;
        assert!((hp.length() + lp.length() - depth).abs() < 1e-9);
    }

    #[test]
    fn test_steer_converges_on_projected_point() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        let a = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0, 1000.0), 20);
        let b = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1200.0, 1000.0), 20);
        actor.intent = Intent::new(DVec2::Y, 1.0);
        actor.steer(&mut fx.bodies());
        // Target is (1100, 3000)
        let da = fx.balls.get(a).unwrap().direction;
        let db = fx.balls.get(b).unwrap().direction;
        assert!((da - DVec2::new(100.0, 2000.0).normalize()).length() < 1e-12);
        assert!((db - DVec2::new(-100.0, 2000.0).normalize()).length() < 1e-12);
    }

    #[test]
    fn test_shoot_throws_from_heavy_balls_only() {
        let mut fx = Fixture::new();
        let mut ejecta = EjectaField::new(3000.0, 30.0);
        let mut actor = bot(0);
        let heavy = actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0, 1000.0), 28);
        let light = actor.spawn_ball(&mut fx.bodies(), DVec2::new(2000.0, 1000.0), 27);
        fx.balls.get_mut(heavy).unwrap().set_direction(DVec2::X);
        assert_eq!(actor.shoot(&mut fx.bodies(), &mut ejecta), 1);
        assert_eq!(fx.balls.get(heavy).unwrap().mass, 18);
        assert_eq!(fx.balls.get(light).unwrap().mass, 27);
        let (_, packet) = ejecta.iter().next().unwrap();
        let radius = fx.metrics.radius(28);
        assert!((packet.pos - DVec2::new(1000.0 + radius * 1.15, 1000.0)).length() < 1e-9);
        let flight = packet.flight.unwrap();
        assert!((flight.to.x - (1000.0 + radius * 1.15 + 150.0)).abs() < 1e-9);
    }

    #[test]
    fn test_respawn_resets_to_one_ball() {
        let mut fx = Fixture::new();
        let mut actor = bot(0);
        actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0, 1000.0), 300);
        actor.spawn_ball(&mut fx.bodies(), DVec2::new(1000.0, 1000.0), 300);
        actor.life = Life::Dead { killer: None, countdown: 0.0 };
        actor.respawn(&mut fx.bodies(), DVec2::new(400.0, 400.0));
        assert!(actor.is_alive());
        assert_eq!(actor.balls.len(), 1);
        assert_eq!(fx.balls.len(), 1);
        assert_eq!(actor.score, 10);
        assert_eq!(actor.intent.magnitude, 0.3);
    }

    proptest! {
        #[test]
        fn prop_share_mass_conserves(
            total in 1u32..100_000,
            count in 0usize..=16,
            hazard in proptest::bool::ANY,
        ) {
            let policy = if hazard {
                RemainderPolicy::RoundRobinToPieces
            } else {
                RemainderPolicy::KeepOnSource
            };
            let shares = share_mass(total, count, policy, 54, 10);
            let sum: u32 = shares.source + shares.pieces.iter().sum::<u32>();
            prop_assert_eq!(sum, total);
            if let (Some(lo), Some(hi)) = (shares.pieces.iter().min(), shares.pieces.iter().max()) {
                prop_assert!(hi - lo <= 1);
                prop_assert!(*lo >= 1);
            }
        }

        #[test]
        fn prop_voluntary_split_conserves_score(masses in proptest::collection::vec(1u32..5000, 1..16)) {
            let mut fx = Fixture::new();
            let mut actor = bot(0);
            for (i, m) in masses.iter().enumerate() {
                actor.spawn_ball(&mut fx.bodies(), DVec2::new(200.0 + i as f64 * 150.0, 1500.0), *m);
            }
            let before = total_mass(&actor, &fx.balls);
            actor.split(&mut fx.bodies());
            prop_assert!(actor.balls.len() <= 16);
            prop_assert_eq!(total_mass(&actor, &fx.balls), before);
        }
    }
}
