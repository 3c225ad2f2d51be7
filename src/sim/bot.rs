//! Autonomous intent source
//!
//! Bots keep their current intent and, every reroll period, flip a coin to
//! decide whether to pick a new one: either a random heading or a beeline
//! toward some other actor.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::actor::Intent;
use super::rng::Lcg;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotBrain {
    /// Seconds since the last reroll check
    timer: f64,
}

impl BotBrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the reroll timer; returns a new intent when the bot decides to
    /// change course. `targets` holds positions of other live actors.
    pub fn think(
        &mut self,
        dt: f64,
        period: f64,
        rng: &mut Lcg,
        own_pos: Option<DVec2>,
        targets: &[DVec2],
    ) -> Option<Intent> {
        self.timer += dt;
        if self.timer < period {
            return None;
        }
        self.timer = 0.0;
        if rng.next_f64() >= 0.5 {
            return None;
        }
        let chase = rng.next_f64() >= 0.5;
        let direction = match (chase, own_pos) {
            (true, Some(pos)) if !targets.is_empty() => {
                let target = targets[rng.index(targets.len())];
                (target - pos).normalize_or_zero()
            }
            _ => random_direction(rng),
        };
        let direction = if direction == DVec2::ZERO {
            random_direction(rng)
        } else {
            direction
        };
        Some(Intent::new(direction, 1.0))
    }
}

fn random_direction(rng: &mut Lcg) -> DVec2 {
    let angle = rng.next_f64() * TAU;
    DVec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reroll_before_period() {
        let mut brain = BotBrain::new();
        let mut rng = Lcg::new(1);
        for _ in 0..100 {
            assert!(brain.think(0.04, 5.0, &mut rng, None, &[]).is_none());
        }
    }

    #[test]
    fn test_rerolls_are_unit_full_speed() {
        let mut brain = BotBrain::new();
        let mut rng = Lcg::new(99);
        let targets = [DVec2::new(100.0, 100.0), DVec2::new(2000.0, 50.0)];
        let mut rerolls = 0;
        for _ in 0..200 {
            if let Some(intent) =
                brain.think(5.0, 5.0, &mut rng, Some(DVec2::new(1500.0, 1500.0)), &targets)
            {
                rerolls += 1;
                assert!((intent.direction.length() - 1.0).abs() < 1e-9);
                assert_eq!(intent.magnitude, 1.0);
            }
        }
        // Coin flip: roughly half the checks reroll
        assert!(rerolls > 50 && rerolls < 150, "rerolls = {rerolls}");
    }
}
