//! Data-driven match balance
//!
//! Every knob defaults to the value in `crate::consts`. A JSON document may
//! override any subset of them before a match starts; the config is read-only
//! once the match is running.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Tuning load failures
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tuning file error: {0}")]
    Io(#[from] std::io::Error),
}

/// All match constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Fixed RNG seed (None = seed from the wall clock)
    pub seed: Option<u64>,
    pub map_size: f64,
    pub start_mass: u32,

    // === Ball physics ===
    pub min_radius: f64,
    pub radius_scale: f64,
    pub max_speed: f64,
    pub min_speed: f64,
    pub speed_decay_mass: f64,
    pub edge_inset: f64,

    // === Split / merge ===
    pub max_balls: usize,
    pub min_split_mass: u32,
    pub split_flight_secs: f64,
    pub split_distance_factor: f64,
    pub split_min_distance: f64,
    pub merge_cooldown_secs: f64,
    pub merge_slack: f64,
    pub absorb_slack: f64,
    pub absorb_mass_ratio: f64,
    pub direction_projection: f64,
    pub idle_magnitude: f64,

    // === Decay ===
    pub decay_rate: f64,
    pub decay_score_scale: f64,
    pub decay_interval_secs: f64,

    // === Pickups ===
    pub pickup_columns: usize,
    pub pickup_mass: u32,
    pub pickup_edge_margin: f64,
    pub pickup_refill_secs: f64,

    // === Hazards ===
    pub hazard_mass_tiers: Vec<u32>,
    pub hazard_max: usize,
    pub hazard_refill_count: usize,
    pub hazard_refill_secs: f64,
    pub hazard_max_split: usize,
    pub hazard_mass_ratio: f64,
    pub hazard_piece_travel: f64,
    pub spawn_margin: i32,

    // === Ejecta ===
    pub min_digest_mass: u32,
    pub min_shoot_mass: u32,
    pub ejecta_mass: u32,
    pub ejecta_launch_factor: f64,
    pub ejecta_travel: f64,
    pub ejecta_edge_margin: f64,
    pub ejecta_flight_secs: f64,
    pub ejecta_cell: f64,

    // === Grids ===
    pub body_cell: f64,

    // === Match ===
    pub bot_count: usize,
    pub bot_reroll_secs: f64,
    pub respawn_countdown_secs: f64,
    pub match_secs: f64,
    pub ranking_size: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            map_size: MAP_SIZE,
            start_mass: START_MASS,

            min_radius: MIN_RADIUS,
            radius_scale: RADIUS_SCALE,
            max_speed: MAX_SPEED,
            min_speed: MIN_SPEED,
            speed_decay_mass: SPEED_DECAY_MASS,
            edge_inset: EDGE_INSET,

            max_balls: MAX_BALLS,
            min_split_mass: MIN_SPLIT_MASS,
            split_flight_secs: SPLIT_FLIGHT_SECS,
            split_distance_factor: SPLIT_DISTANCE_FACTOR,
            split_min_distance: SPLIT_MIN_DISTANCE,
            merge_cooldown_secs: MERGE_COOLDOWN_SECS,
            merge_slack: MERGE_SLACK,
            absorb_slack: ABSORB_SLACK,
            absorb_mass_ratio: ABSORB_MASS_RATIO,
            direction_projection: DIRECTION_PROJECTION,
            idle_magnitude: IDLE_MAGNITUDE,

            decay_rate: DECAY_RATE,
            decay_score_scale: DECAY_SCORE_SCALE,
            decay_interval_secs: DECAY_INTERVAL_SECS,

            pickup_columns: PICKUP_COLUMNS,
            pickup_mass: PICKUP_MASS,
            pickup_edge_margin: PICKUP_EDGE_MARGIN,
            pickup_refill_secs: PICKUP_REFILL_SECS,

            hazard_mass_tiers: HAZARD_MASS_TIERS.to_vec(),
            hazard_max: HAZARD_MAX,
            hazard_refill_count: HAZARD_REFILL_COUNT,
            hazard_refill_secs: HAZARD_REFILL_SECS,
            hazard_max_split: HAZARD_MAX_SPLIT,
            hazard_mass_ratio: HAZARD_MASS_RATIO,
            hazard_piece_travel: HAZARD_PIECE_TRAVEL,
            spawn_margin: SPAWN_MARGIN,

            min_digest_mass: MIN_DIGEST_MASS,
            min_shoot_mass: MIN_SHOOT_MASS,
            ejecta_mass: EJECTA_MASS,
            ejecta_launch_factor: EJECTA_LAUNCH_FACTOR,
            ejecta_travel: EJECTA_TRAVEL,
            ejecta_edge_margin: EJECTA_EDGE_MARGIN,
            ejecta_flight_secs: EJECTA_FLIGHT_SECS,
            ejecta_cell: EJECTA_CELL,

            body_cell: BODY_CELL,

            bot_count: BOT_COUNT,
            bot_reroll_secs: BOT_REROLL_SECS,
            respawn_countdown_secs: RESPAWN_COUNTDOWN_SECS,
            match_secs: MATCH_SECS,
            ranking_size: RANKING_SIZE,
        }
    }
}

impl MatchConfig {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let cfg: Self = serde_json::from_str(json)?;
        Ok(cfg.validated())
    }

    /// Load from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let cfg = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(cfg)
    }

    /// Pickups activated per refill: one two-hundredth of the grid
    pub fn pickup_refill_count(&self) -> usize {
        (self.pickup_columns * self.pickup_columns / 200).max(1)
    }

    /// Spacing between pickup grid points
    pub fn pickup_cell(&self) -> f64 {
        self.map_size / self.pickup_columns as f64
    }

    /// Random offset range around each pickup grid point (half the spacing,
    /// minus a little so neighbours never overlap)
    pub fn pickup_jitter(&self) -> i32 {
        ((self.pickup_cell() / 2.0) - 5.0).max(0.0) as i32
    }

    /// Heaviest piece a hazard strike can produce
    pub fn hazard_max_piece_mass(&self) -> u32 {
        self.min_digest_mass * 3
    }

    /// Clamp out-of-range values back to something playable
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        fn positive(name: &str, value: &mut f64, fallback: f64) {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("tuning: {name}={value} is not positive, using {fallback}");
                *value = fallback;
            }
        }

        positive("map_size", &mut self.map_size, defaults.map_size);
        positive("max_speed", &mut self.max_speed, defaults.max_speed);
        positive("min_speed", &mut self.min_speed, defaults.min_speed);
        positive("speed_decay_mass", &mut self.speed_decay_mass, defaults.speed_decay_mass);
        positive("body_cell", &mut self.body_cell, defaults.body_cell);
        positive("ejecta_cell", &mut self.ejecta_cell, defaults.ejecta_cell);
        positive("decay_interval_secs", &mut self.decay_interval_secs, defaults.decay_interval_secs);
        positive("pickup_refill_secs", &mut self.pickup_refill_secs, defaults.pickup_refill_secs);
        positive("hazard_refill_secs", &mut self.hazard_refill_secs, defaults.hazard_refill_secs);
        positive("bot_reroll_secs", &mut self.bot_reroll_secs, defaults.bot_reroll_secs);
        positive("match_secs", &mut self.match_secs, defaults.match_secs);

        if self.start_mass == 0 {
            log::warn!("tuning: start_mass must be at least 1");
            self.start_mass = defaults.start_mass;
        }
        if self.max_balls == 0 {
            log::warn!("tuning: max_balls must be at least 1");
            self.max_balls = defaults.max_balls;
        }
        if self.pickup_columns == 0 {
            log::warn!("tuning: pickup_columns must be at least 1");
            self.pickup_columns = defaults.pickup_columns;
        }
        if self.hazard_mass_tiers.is_empty() {
            log::warn!("tuning: hazard_mass_tiers is empty, restoring defaults");
            self.hazard_mass_tiers = defaults.hazard_mass_tiers.clone();
        }
        self.hazard_mass_tiers.sort_unstable();
        self.edge_inset = self.edge_inset.clamp(0.0, 1.0);
        self.merge_slack = self.merge_slack.clamp(0.0, 1.0);
        self.absorb_slack = self.absorb_slack.clamp(0.0, 1.0);
        self.idle_magnitude = self.idle_magnitude.clamp(0.0, 1.0);
        self.min_speed = self.min_speed.min(self.max_speed);
        self.hazard_max_split = self.hazard_max_split.clamp(1, 6);
        let max_margin = (self.map_size / 2.0) as i32 - 1;
        self.spawn_margin = self.spawn_margin.clamp(0, max_margin.max(0));
        self
    }
}
