//! Read-only frame snapshot for the renderer and UI
//!
//! Everything here is plain serializable data; the renderer never touches
//! `World` directly.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ball::ActorId;
use super::state::{DeathNotice, World};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyKind {
    Ball { owner: ActorId },
    Hazard,
}

/// A ball or hazard, in draw order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyView {
    pub kind: BodyKind,
    pub pos: DVec2,
    pub radius: f64,
    pub mass: u32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DotView {
    pub pos: DVec2,
    pub radius: f64,
    pub color: [u8; 3],
    /// Ejecta still flying
    pub in_flight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub actor: ActorId,
    pub name: String,
    pub score: u32,
    /// The human's row
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    /// Seconds left in the match
    pub remaining: f64,
    /// Heavier bodies last so they draw on top
    pub bodies: Vec<BodyView>,
    pub pickups: Vec<DotView>,
    pub ejecta: Vec<DotView>,
    pub score: u32,
    pub ranking: Vec<RankEntry>,
    /// 1-based position of the human in the full ranking
    pub human_rank: Option<usize>,
    /// Center of the human's balls, for the camera
    pub focus: Option<DVec2>,
    pub death: Option<DeathNotice>,
}

/// Pickup dot radius
const PICKUP_RADIUS: f64 = 6.0;

impl World {
    /// All actors, best score first, ties by id
    pub fn ranking(&self) -> Vec<RankEntry> {
        let mut entries: Vec<RankEntry> = self
            .actors
            .values()
            .map(|a| RankEntry {
                actor: a.id,
                name: a.name.clone(),
                score: a.score,
                highlight: Some(a.id) == self.human,
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.actor.cmp(&b.actor)));
        entries
    }

    pub fn snapshot(&self, remaining: f64) -> FrameView {
        let mut bodies: Vec<BodyView> = self
            .balls
            .iter()
            .map(|(_, b)| BodyView {
                kind: BodyKind::Ball { owner: b.owner },
                pos: b.pos,
                radius: b.radius,
                mass: b.mass,
                color: self
                    .actors
                    .get(&b.owner)
                    .map_or([255, 255, 255], |a| a.body_color),
            })
            .chain(self.hazards.iter().map(|(_, h)| BodyView {
                kind: BodyKind::Hazard,
                pos: h.pos,
                radius: h.radius,
                mass: h.mass,
                color: [40, 200, 60],
            }))
            .collect();
        bodies.sort_by_key(|b| b.mass);

        let pickups = self
            .pickups
            .iter_active()
            .map(|p| DotView {
                pos: p.pos,
                radius: PICKUP_RADIUS,
                color: p.color,
                in_flight: false,
            })
            .collect();
        let ejecta = self
            .ejecta
            .iter()
            .map(|(_, e)| DotView {
                pos: e.pos,
                radius: e.radius,
                color: e.color,
                in_flight: !e.collidable(),
            })
            .collect();

        let full = self.ranking();
        let human_rank = full.iter().position(|r| r.highlight).map(|i| i + 1);
        let ranking = full.into_iter().take(self.cfg.ranking_size).collect();
        let human = self.human_actor();

        FrameView {
            remaining: remaining.max(0.0),
            bodies,
            pickups,
            ejecta,
            score: human.map_or(0, |a| a.score),
            ranking,
            human_rank,
            focus: human.and_then(|a| a.center(&self.balls)),
            death: self.death_notice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::test_world;

    #[test]
    fn test_ranking_top_ten_with_human_highlight() {
        let mut world = test_world();
        let human = world.add_human("me".into());
        for i in 0..12 {
            let id = world.add_bot(format!("bot{i}"));
            let ball = world.actor(id).unwrap().balls[0];
            world
                .balls
                .get_mut(ball)
                .unwrap()
                .set_mass(100 + i * 10, &mut world.metrics);
        }
        world.recompute_scores();
        let view = world.snapshot(100.0);
        assert_eq!(view.ranking.len(), 10);
        assert_eq!(view.ranking[0].name, "bot11");
        assert!(view.ranking.iter().all(|r| !r.highlight));
        assert_eq!(view.human_rank, Some(13));
        assert_eq!(view.score, 10);
        assert!(view.focus.is_some());
    }

    #[test]
    fn test_bodies_sorted_by_mass() {
        let mut world = test_world();
        let a = world.add_bot("a".into());
        world.spawn_ball(a, DVec2::new(800.0, 800.0), 500);
        world
            .hazards
            .insert(140, DVec2::new(1500.0, 1500.0), &mut world.metrics);
        let view = world.snapshot(-3.0);
        let masses: Vec<u32> = view.bodies.iter().map(|b| b.mass).collect();
        assert_eq!(masses, vec![10, 140, 500]);
        assert_eq!(view.bodies[1].kind, BodyKind::Hazard);
        assert_eq!(view.remaining, 0.0);
        // No human in this world
        assert_eq!(view.human_rank, None);
        assert!(view.death.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut world = test_world();
        world.add_human("me".into());
        let json = serde_json::to_string(&world.snapshot(12.0)).unwrap();
        assert!(json.contains("\"remaining\":12.0"));
    }
}
