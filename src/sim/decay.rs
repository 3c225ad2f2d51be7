//! Periodic mass attenuation
//!
//! Loss grows with the square of the score, so leaders bleed mass faster
//! than small actors. No ball is ever taken below the floor mass.

use super::arena::Arena;
use super::ball::{Ball, BallId, BallMetrics};

/// Mass an actor with `score` loses this interval:
/// `floor(score * rate * score / scale)`
pub fn decay_budget(score: u32, rate: f64, scale: f64) -> u32 {
    let score = score as f64;
    let loss = (score * rate * (score / scale)).floor();
    if loss.is_finite() && loss > 0.0 {
        loss.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Take up to `budget` mass from `ids`, never below `floor_mass`. A single
/// ball pays directly; several balls pay one unit at a time in turn, skipping
/// balls already at the floor. Returns the mass actually removed.
pub fn apply_decay(
    balls: &mut Arena<Ball>,
    metrics: &mut BallMetrics,
    ids: &[BallId],
    budget: u32,
    floor_mass: u32,
) -> u32 {
    if budget == 0 {
        return 0;
    }
    if let [only] = ids {
        let Some(ball) = balls.get_mut(*only) else {
            return 0;
        };
        let target = ball.mass.saturating_sub(budget).max(floor_mass).min(ball.mass);
        let taken = ball.mass - target;
        if taken > 0 {
            ball.set_mass(target, metrics);
        }
        return taken;
    }

    // Work on plain masses, then write back once per ball
    let mut masses: Vec<(BallId, u32, u32)> = ids
        .iter()
        .filter_map(|id| balls.get(*id).map(|b| (*id, b.mass, b.mass)))
        .collect();
    let mut remaining = budget;
    while remaining > 0 {
        let mut progressed = false;
        for (_, _, mass) in masses.iter_mut() {
            if remaining == 0 {
                break;
            }
            if *mass > floor_mass {
                *mass -= 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    for (id, before, after) in masses {
        if before != after {
            if let Some(ball) = balls.get_mut(id) {
                ball.set_mass(after, metrics);
            }
        }
    }
    budget - remaining
}
