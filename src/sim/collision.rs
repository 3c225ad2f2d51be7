//! Cross-entity collision passes
//!
//! Each pass fetches candidates from a spatial index and only tests those.
//! Passes run in a fixed order inside a tick; see `tick::tick`.

use glam::DVec2;

use super::actor::{RemainderPolicy, SplitPlan};
use super::ball::{ActorId, Ball, BallId};
use super::geometry::circles_overlapping;
use super::state::{GameEvent, World};
use crate::tuning::MatchConfig;

/// `big` may eat `small`: clearly heavier and covering it almost entirely
pub fn can_absorb(big: &Ball, small: &Ball, cfg: &MatchConfig) -> bool {
    let gap = big.mass.saturating_sub(small.mass) as f64;
    gap > small.mass as f64 * cfg.absorb_mass_ratio
        && circles_overlapping(big.pos, big.radius, small.pos, small.radius, cfg.absorb_slack)
}

/// Balls matching `keep`, ascending by mass then handle
fn by_mass_asc(world: &World, keep: impl Fn(&Ball) -> bool) -> Vec<BallId> {
    let mut order: Vec<(u32, BallId)> = world
        .balls
        .iter()
        .filter(|(_, b)| keep(b))
        .map(|(id, b)| (b.mass, id))
        .collect();
    order.sort_unstable();
    order.into_iter().map(|(_, id)| id).collect()
}

/// Actor-vs-actor absorption. Rebuilds the ball grid, then lets every ball
/// eat eligible neighbours of other actors. Eaten balls leave the arena, the
/// grid and their actor at once. Returns the number of balls eaten.
pub fn absorb_pass(world: &mut World) -> usize {
    world.ball_grid.clear();
    for (id, ball) in world.balls.iter() {
        world.ball_grid.insert(id, ball.bounds());
    }

    let slack = world.ball_grid.cell_size();
    let mut candidates = Vec::new();
    let mut emptied: Vec<(ActorId, ActorId)> = Vec::new();
    let mut eaten = 0;

    for a_id in world.balls.handles() {
        let Some(a) = world.balls.get(a_id) else {
            continue;
        };
        world
            .ball_grid
            .query_circle(a.pos, a.radius, slack, &mut candidates);

        for &b_id in &candidates {
            if b_id == a_id {
                continue;
            }
            let (Some(a), Some(b)) = (world.balls.get(a_id), world.balls.get(b_id)) else {
                continue;
            };
            if a.owner == b.owner {
                continue;
            }
            let (big_id, small_id) = if a.mass >= b.mass { (a_id, b_id) } else { (b_id, a_id) };
            let (big, small) = if big_id == a_id { (a, b) } else { (b, a) };
            if !can_absorb(big, small, &world.cfg) {
                continue;
            }
            let (by, victim) = (big.owner, small.owner);

            let Some(prey) = world.balls.remove(small_id) else {
                continue;
            };
            world.ball_grid.remove(small_id);
            if let Some(big) = world.balls.get_mut(big_id) {
                big.add_mass(prey.mass, &mut world.metrics);
                world.ball_grid.insert(big_id, big.bounds());
            }
            if let Some(owner) = world.actors.get_mut(&victim) {
                owner.detach(small_id);
                if owner.balls.is_empty() {
                    emptied.push((victim, by));
                }
            }
            log::trace!("ball {small_id:?} of actor {victim} eaten by actor {by}");
            world.emit(GameEvent::Absorbed {
                by,
                victim,
                mass: prey.mass,
            });
            eaten += 1;
            if small_id == a_id {
                break;
            }
        }
    }

    for (victim, killer) in emptied {
        world.kill(victim, Some(killer));
    }
    eaten
}

/// Balls heavy enough to beat the lightest hazard tier burst on the first
/// hazard they strike, lightest balls first. Returns the number of bursts.
pub fn hazard_pass(world: &mut World) -> usize {
    let ratio = world.cfg.hazard_mass_ratio;
    let Some(lightest) = world.cfg.hazard_mass_tiers.first().copied() else {
        return 0;
    };
    if world.hazards.is_empty() {
        return 0;
    }
    let threshold = lightest as f64 * ratio;
    let mut bursts = 0;

    for id in by_mass_asc(world, |b| b.mass as f64 > threshold) {
        let Some(ball) = world.balls.get(id) else {
            continue;
        };
        let Some(hazard_id) = world.hazards.find_strike(ball, ratio) else {
            continue;
        };
        let owner = ball.owner;
        let Some(hazard) = world.hazards.remove(hazard_id) else {
            continue;
        };
        let room = world
            .actor(owner)
            .map_or(0, |a| world.cfg.max_balls.saturating_sub(a.balls.len()));
        let fan: Vec<DVec2> = world
            .hazards
            .fan(room.min(world.cfg.hazard_max_split))
            .to_vec();
        let pieces = world
            .with_actor(owner, |actor, bodies, _, _| {
                let plan = SplitPlan {
                    directions: &fan,
                    extra_mass: hazard.mass,
                    policy: RemainderPolicy::RoundRobinToPieces,
                };
                actor.split_ball(bodies, id, plan).len()
            })
            .unwrap_or(0);
        log::trace!("actor {owner} burst on a {} hazard into {pieces} pieces", hazard.mass);
        world.emit(GameEvent::HazardBurst {
            actor: owner,
            pieces,
        });
        bursts += 1;
    }
    bursts
}

/// Balls eat the active pickups under them, lightest first
pub fn pickup_pass(world: &mut World) -> u32 {
    let mut gained_total = 0;
    for id in by_mass_asc(world, |_| true) {
        let Some(ball) = world.balls.get_mut(id) else {
            continue;
        };
        let gained = world.pickups.consume(ball.pos, ball.radius);
        if gained > 0 {
            ball.add_mass(gained, &mut world.metrics);
            gained_total += gained;
        }
    }
    gained_total
}

/// Balls that can digest ejecta eat landed packets under them, lightest first
pub fn ejecta_pass(world: &mut World) -> u32 {
    if world.ejecta.landed() == 0 {
        return 0;
    }
    let min_mass = world.cfg.min_digest_mass;
    let mut gained_total = 0;
    for id in by_mass_asc(world, |b| b.mass >= min_mass) {
        let Some(ball) = world.balls.get_mut(id) else {
            continue;
        };
        let gained = world.ejecta.consume(ball.pos, ball.radius);
        if gained > 0 {
            ball.add_mass(gained, &mut world.metrics);
            gained_total += gained;
        }
    }
    gained_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::Life;
    use crate::sim::geometry::Aabb;
    use crate::sim::state::test_world;

    /// Actor with a single ball of `mass` at `pos`
    fn actor_at(world: &mut World, name: &str, pos: DVec2, mass: u32) -> (ActorId, BallId) {
        let id = world.add_bot(name.into());
        let start = world.actor(id).unwrap().balls[0];
        let ball = world.balls.get_mut(start).unwrap();
        ball.pos = pos;
        ball.set_mass(mass, &mut world.metrics);
        (id, start)
    }

    #[test]
    fn test_absorption_moves_mass_and_removes_prey() {
        let mut world = test_world();
        let (big_actor, big) = actor_at(&mut world, "big", DVec2::new(1000.0, 1000.0), 100);
        let (small_actor, small) = actor_at(&mut world, "small", DVec2::new(1010.0, 1000.0), 50);
        assert_eq!(absorb_pass(&mut world), 1);
        assert_eq!(world.balls.get(big).unwrap().mass, 150);
        assert!(world.balls.get(small).is_none());
        assert!(!world.ball_grid.contains(small));
        assert!(world.actor(small_actor).unwrap().balls.is_empty());
        assert!(matches!(
            world.actor(small_actor).unwrap().life,
            Life::Dead { killer: Some(k), .. } if k == big_actor
        ));
        assert!(world.events().contains(&GameEvent::Absorbed {
            by: big_actor,
            victim: small_actor,
            mass: 50,
        }));
        // Winner is indexed with its grown bounds
        let hits = world
            .ball_grid
            .query(&Aabb::around(DVec2::new(1000.0, 1000.0), 1.0));
        assert_eq!(hits, vec![big]);
    }

    #[test]
    fn test_near_equal_masses_never_absorb() {
        let mut world = test_world();
        actor_at(&mut world, "a", DVec2::new(1000.0, 1000.0), 100);
        actor_at(&mut world, "b", DVec2::new(1000.0, 1000.0), 90);
        assert_eq!(absorb_pass(&mut world), 0);
    }

    #[test]
    fn test_touching_is_not_enough() {
        let mut world = test_world();
        actor_at(&mut world, "a", DVec2::new(1000.0, 1000.0), 400);
        // r(400) = 70, r(10) ~ 19.5; needs distance <= 50.5 + 3.9
        actor_at(&mut world, "b", DVec2::new(1060.0, 1000.0), 10);
        assert_eq!(absorb_pass(&mut world), 0);
    }

    #[test]
    fn test_own_balls_are_not_food() {
        let mut world = test_world();
        let (id, _) = actor_at(&mut world, "a", DVec2::new(1000.0, 1000.0), 400);
        world.spawn_ball(id, DVec2::new(1000.0, 1000.0), 10);
        assert_eq!(absorb_pass(&mut world), 0);
        assert_eq!(world.actor(id).unwrap().balls.len(), 2);
    }

    #[test]
    fn test_hazard_burst_conserves_mass() {
        let mut world = test_world();
        let (id, ball) = actor_at(&mut world, "a", DVec2::new(1500.0, 1500.0), 300);
        world.hazards.insert(100, DVec2::new(1500.0, 1500.0), &mut world.metrics);
        assert_eq!(hazard_pass(&mut world), 1);
        assert!(world.hazards.is_empty());
        let actor = world.actor(id).unwrap();
        // 400 / 6 = 66, capped at 54; 324 + 10 < 400 so the source keeps 76
        assert_eq!(actor.balls.len(), 7);
        assert_eq!(world.balls.get(ball).unwrap().mass, 76);
        assert_eq!(world.total_ball_mass(), 400);
        assert_eq!(
            world.events(),
            &[GameEvent::HazardBurst { actor: id, pieces: 6 }]
        );
    }

    #[test]
    fn test_hazard_burst_limited_by_ball_cap() {
        let mut world = test_world();
        let (id, _) = actor_at(&mut world, "a", DVec2::new(1500.0, 1500.0), 300);
        for i in 0..14 {
            world.spawn_ball(id, DVec2::new(300.0 + 100.0 * i as f64, 300.0), 10);
        }
        world.hazards.insert(140, DVec2::new(1500.0, 1500.0), &mut world.metrics);
        assert_eq!(hazard_pass(&mut world), 1);
        assert_eq!(world.actor(id).unwrap().balls.len(), 16);
        assert_eq!(world.total_ball_mass(), 300 + 14 * 10 + 140);
    }

    #[test]
    fn test_light_ball_passes_through_hazard() {
        let mut world = test_world();
        actor_at(&mut world, "a", DVec2::new(1500.0, 1500.0), 120);
        world.hazards.insert(100, DVec2::new(1500.0, 1500.0), &mut world.metrics);
        assert_eq!(hazard_pass(&mut world), 0);
        assert_eq!(world.hazards.len(), 1);
    }

    #[test]
    fn test_pickup_pass_credits_ball() {
        let mut world = test_world();
        let cell = world.pickups.cell_size();
        world.pickups.activate_cell(5, 5);
        let center = DVec2::splat(5.5 * cell);
        let (_, ball) = actor_at(&mut world, "a", center, 100);
        assert_eq!(pickup_pass(&mut world), 1);
        assert_eq!(world.balls.get(ball).unwrap().mass, 101);
        assert_eq!(pickup_pass(&mut world), 0);
    }

    #[test]
    fn test_ejecta_needs_digest_mass() {
        let mut world = test_world();
        let (shooter, _) = actor_at(&mut world, "s", DVec2::new(1000.0, 1000.0), 100);
        let (_, small) = actor_at(&mut world, "small", DVec2::new(2000.0, 2000.0), 17);
        world
            .balls
            .get_mut(world.actor(shooter).unwrap().balls[0])
            .unwrap()
            .set_direction(DVec2::X);
        assert!(world.shoot(shooter));
        world.ejecta.advance(1.0);
        let (_, packet) = world.ejecta.iter().next().unwrap();
        let landing = packet.pos;
        world.balls.get_mut(small).unwrap().pos = landing;
        assert_eq!(ejecta_pass(&mut world), 0);
        world.balls.get_mut(small).unwrap().set_mass(18, &mut world.metrics);
        assert_eq!(ejecta_pass(&mut world), 10);
        assert_eq!(world.balls.get(small).unwrap().mass, 28);
        assert!(world.ejecta.is_empty());
    }
}
