//! One timed match: roster setup, the match clock and the final outcome

use serde::{Deserialize, Serialize};

use super::actor::Command;
use super::ball::ActorId;
use super::rng::Lcg;
use super::state::{GameEvent, World};
use super::tick::tick;
use super::view::{FrameView, RankEntry};
use crate::tuning::MatchConfig;

/// Names handed out to autonomous actors (and to a nameless human)
pub const ACTOR_NAMES: &[&str] = &[
    "Blinky", "Nibbles", "Orbit", "Pebble", "Quasar", "Mochi", "Dumpling", "Nebula", "Comet",
    "Biscuit", "Pixel", "Gumdrop", "Waffle", "Nova", "Sprout", "Tofu", "Marble", "Pudding",
    "Zephyr", "Bean", "Hopper", "Jellybean", "Noodle", "Pulsar", "Cosmo", "Muffin", "Bubbles",
    "Taro", "Kiwi", "Meteor", "Sesame", "Yuzu",
];

pub fn random_name(rng: &mut Lcg) -> String {
    ACTOR_NAMES[rng.index(ACTOR_NAMES.len())].to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub human_score: u32,
    pub ranking: Vec<RankEntry>,
}

#[derive(Debug, Clone)]
pub struct Match {
    world: World,
    elapsed: f64,
    phase: MatchPhase,
    outcome: Option<MatchOutcome>,
}

impl Match {
    /// Build the roster: the human (if any) plus the configured bots
    pub fn new(cfg: MatchConfig, human_name: Option<&str>) -> Self {
        let mut world = World::new(cfg);
        if let Some(name) = human_name {
            let name = match name.trim() {
                "" => random_name(&mut world.rng),
                trimmed => trimmed.to_string(),
            };
            world.add_human(name);
        }
        for _ in 0..world.cfg.bot_count {
            let name = random_name(&mut world.rng);
            world.add_bot(name);
        }
        log::info!(
            "Match started: seed {}, {} actors, {}s",
            world.seed,
            world.actors.len(),
            world.cfg.match_secs
        );
        Self {
            world,
            elapsed: 0.0,
            phase: MatchPhase::Running,
            outcome: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn human(&self) -> Option<ActorId> {
        self.world.human
    }

    pub fn remaining(&self) -> f64 {
        (self.world.cfg.match_secs - self.elapsed).max(0.0)
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    /// Queue a command for the human; false if there is none
    pub fn submit(&mut self, command: Command) -> bool {
        match self.world.human {
            Some(id) => self.world.submit(id, command),
            None => false,
        }
    }

    /// Advance the match; a finished match ignores further ticks
    pub fn tick(&mut self, dt: f64) -> MatchPhase {
        if self.phase == MatchPhase::Finished || !dt.is_finite() || dt <= 0.0 {
            return self.phase;
        }
        tick(&mut self.world, dt);
        self.elapsed += dt.min(crate::consts::MAX_FRAME_DT);
        if self.elapsed >= self.world.cfg.match_secs {
            self.finish();
        }
        self.phase
    }

    fn finish(&mut self) {
        self.phase = MatchPhase::Finished;
        let ranking: Vec<RankEntry> = self
            .world
            .ranking()
            .into_iter()
            .take(self.world.cfg.ranking_size)
            .collect();
        let human_score = self.world.human_actor().map_or(0, |a| a.score);
        log::info!("Match over, your score: {human_score}");
        for (place, entry) in ranking.iter().enumerate() {
            log::info!("  {:>2}. {:<12} {}", place + 1, entry.name, entry.score);
        }
        self.world.emit(GameEvent::MatchEnded);
        self.outcome = Some(MatchOutcome {
            human_score,
            ranking,
        });
    }

    pub fn snapshot(&self) -> FrameView {
        self.world.snapshot(self.remaining())
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world.drain_events()
    }
}
