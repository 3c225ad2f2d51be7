//! Per-tick simulation step
//!
//! Order matters: own-ball merge/separation settles before absorption reads
//! positions, and hazard/pickup/ejecta passes see post-absorption masses.

use glam::DVec2;

use super::actor::{Command, Controller, Intent, Life};
use super::ball::ActorId;
use super::collision::{absorb_pass, ejecta_pass, hazard_pass, pickup_pass};
use super::decay::{apply_decay, decay_budget};
use super::state::World;
use crate::consts::MAX_FRAME_DT;

/// Advance the world by `dt` seconds
pub fn tick(world: &mut World, dt: f64) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let dt = dt.min(MAX_FRAME_DT);
    world.now += dt;

    apply_intents(world, dt);
    move_bodies(world, dt);
    settle_own_balls(world);
    absorb_pass(world);
    hazard_pass(world);
    pickup_pass(world);
    ejecta_pass(world);
    run_periodic(world, dt);
    run_lifecycle(world, dt);
    world.recompute_scores();
}

/// Drain human command queues and let bots reroll
fn apply_intents(world: &mut World, dt: f64) {
    // First ball of each live actor, for bots to chase
    let targets: Vec<DVec2> = world
        .actors
        .values()
        .filter(|a| a.is_alive())
        .filter_map(|a| a.balls.first().and_then(|b| world.balls.get(*b)))
        .map(|b| b.pos)
        .collect();
    let period = world.cfg.bot_reroll_secs;

    let ids: Vec<ActorId> = world.actors.keys().copied().collect();
    for id in ids {
        let Some(actor) = world.actors.get_mut(&id) else {
            continue;
        };
        let own_pos = actor
            .balls
            .first()
            .and_then(|b| world.balls.get(*b))
            .map(|b| b.pos);
        let alive = actor.life == Life::Alive;
        let commands: Vec<Command> = match &mut actor.controller {
            Controller::Human(queue) => queue.drain(..).collect(),
            Controller::Autonomous(brain) => {
                if alive {
                    if let Some(intent) = brain.think(dt, period, &mut world.rng, own_pos, &targets) {
                        actor.intent = intent;
                    }
                }
                continue;
            }
        };
        for command in commands {
            apply_command(world, id, command);
        }
    }
}

fn apply_command(world: &mut World, id: ActorId, command: Command) {
    match command {
        Command::Move {
            direction,
            magnitude,
        } => {
            if let Some(actor) = world.actors.get_mut(&id) {
                actor.intent = Intent::new(direction, magnitude);
            }
        }
        Command::Stop => {
            if let Some(actor) = world.actors.get_mut(&id) {
                actor.intent = Intent::stopped();
            }
        }
        Command::Split => {
            world.split(id);
        }
        Command::Shoot => {
            world.shoot(id);
        }
        Command::Respawn => {
            world.respawn(id);
        }
    }
}

/// Steer and move every ball, then fly ejecta
fn move_bodies(world: &mut World, dt: f64) {
    let ids: Vec<ActorId> = world.actors.keys().copied().collect();
    for id in &ids {
        world.with_actor(*id, |actor, bodies, _, _| actor.steer(bodies));
    }
    let (inset, map_size) = (world.cfg.edge_inset, world.cfg.map_size);
    for actor in world.actors.values() {
        for id in &actor.balls {
            if let Some(ball) = world.balls.get_mut(*id) {
                ball.advance(actor.intent.magnitude, dt, inset, map_size);
            }
        }
    }
    world.ejecta.advance(dt);
}

/// Merge cooled-down balls and push apart the rest, per actor
fn settle_own_balls(world: &mut World) {
    let ids: Vec<ActorId> = world.actors.keys().copied().collect();
    for id in ids {
        world.with_actor(id, |actor, bodies, _, _| {
            if actor.balls.len() < 2 {
                return;
            }
            actor.merge_pass(bodies);
            actor.separation_pass(bodies);
        });
    }
}

/// Low-frequency tasks on their own timers: decay, pickup and hazard refill
fn run_periodic(world: &mut World, dt: f64) {
    world.timers.decay += dt;
    if world.timers.decay >= world.cfg.decay_interval_secs {
        world.timers.decay -= world.cfg.decay_interval_secs;
        run_decay(world);
    }

    world.timers.pickup_refill += dt;
    if world.timers.pickup_refill >= world.cfg.pickup_refill_secs {
        world.timers.pickup_refill -= world.cfg.pickup_refill_secs;
        let count = world.cfg.pickup_refill_count();
        world.pickups.refill(count);
    }

    world.timers.hazard_refill += dt;
    if world.timers.hazard_refill >= world.cfg.hazard_refill_secs {
        world.timers.hazard_refill -= world.cfg.hazard_refill_secs;
        let World {
            cfg,
            rng,
            metrics,
            hazards,
            ..
        } = world;
        hazards.refill(cfg.hazard_refill_count, cfg, rng, metrics);
    }
}

fn run_decay(world: &mut World) {
    let (rate, scale, floor) = (
        world.cfg.decay_rate,
        world.cfg.decay_score_scale,
        world.cfg.start_mass,
    );
    let World {
        actors,
        balls,
        metrics,
        ..
    } = world;
    for actor in actors.values_mut() {
        let score = actor.recompute_score(balls);
        let budget = decay_budget(score, rate, scale);
        if budget > 0 {
            let taken = apply_decay(balls, metrics, &actor.balls, budget, floor);
            log::trace!("actor {} decayed by {taken}", actor.id);
        }
    }
}

/// Count down dead actors and respawn the ones whose time is up
fn run_lifecycle(world: &mut World, dt: f64) {
    let mut due = Vec::new();
    for actor in world.actors.values_mut() {
        if let Life::Dead { countdown, .. } = &mut actor.life {
            *countdown -= dt;
            if *countdown <= 0.0 {
                due.push(actor.id);
            }
        }
    }
    if let Some(notice) = world.death_notice.as_mut() {
        notice.respawn_countdown = (notice.respawn_countdown - dt).max(0.0);
    }
    for id in due {
        world.respawn(id);
    }
}
