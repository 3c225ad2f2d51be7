//! Orb Arena - a mass-absorption arena simulation
//!
//! Core modules:
//! - `sim`: Per-tick simulation (movement, split/merge, absorption, hazards, pickups)
//! - `tuning`: Data-driven match balance
//! - `platform`: Browser/native platform abstraction (clock)
//! - `persistence`: Save/load of small JSON documents
//! - `settings` / `highscores`: Player preferences and the local scoreboard
//! - `audio`: Fire-and-forget sound cues

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::Scoreboard;
pub use settings::Settings;
pub use tuning::MatchConfig;

/// Match configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the native driver (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Largest frame delta fed into a single tick
    pub const MAX_FRAME_DT: f64 = 0.1;

    /// Side length of the square map
    pub const MAP_SIZE: f64 = 3000.0;
    /// Mass of a freshly spawned ball; also the decay floor
    pub const START_MASS: u32 = 10;

    /// Radius of a ball at zero mass
    pub const MIN_RADIUS: f64 = 10.0;
    /// Radius growth per sqrt(mass)
    pub const RADIUS_SCALE: f64 = 3.0;
    /// Speed of the lightest ball (map units per second)
    pub const MAX_SPEED: f64 = 200.0;
    /// No ball moves slower than this
    pub const MIN_SPEED: f64 = 15.0;
    /// Mass at which the linear speed ramp reaches zero
    pub const SPEED_DECAY_MASS: f64 = 5000.0;
    /// Fraction of the radius kept inside the map edge (inscribed square of the circle)
    pub const EDGE_INSET: f64 = 0.73;

    /// Maximum number of balls one actor may own
    pub const MAX_BALLS: usize = 16;
    /// Minimum mass for a voluntary split
    pub const MIN_SPLIT_MASS: u32 = 18 * 2 + 1;
    /// Split fly-out duration (seconds)
    pub const SPLIT_FLIGHT_SECS: f64 = 0.3;
    /// Split fly-out distance factor (times the source radius)
    pub const SPLIT_DISTANCE_FACTOR: f64 = 2.3;
    /// Minimum split fly-out distance
    pub const SPLIT_MIN_DISTANCE: f64 = 200.0;
    /// Seconds after a split before balls may merge again
    pub const MERGE_COOLDOWN_SECS: f64 = 30.0;
    /// Overlap slack for own-ball merging
    pub const MERGE_SLACK: f64 = 0.1;
    /// Overlap slack for absorbing another actor's ball
    pub const ABSORB_SLACK: f64 = 0.2;
    /// Required mass advantage (fraction of the smaller mass) to absorb
    pub const ABSORB_MASS_RATIO: f64 = 0.2;
    /// Distance of the steering point ahead of a multi-ball actor's centroid
    pub const DIRECTION_PROJECTION: f64 = 2000.0;
    /// Magnitude of the idle intent (stopped stick)
    pub const IDLE_MAGNITUDE: f64 = 0.3;

    /// Score decay rate per second
    pub const DECAY_RATE: f64 = 0.0005;
    /// Score at which the decay rate doubles
    pub const DECAY_SCORE_SCALE: f64 = 500.0;
    /// Decay interval (seconds)
    pub const DECAY_INTERVAL_SECS: f64 = 1.0;

    /// Pickup columns per axis (pickups are spread on a regular grid)
    pub const PICKUP_COLUMNS: usize = 50;
    /// Mass granted by one pickup
    pub const PICKUP_MASS: u32 = 1;
    /// Distance pickups keep from the map edge
    pub const PICKUP_EDGE_MARGIN: f64 = 8.0;
    /// Pickup refill interval (seconds)
    pub const PICKUP_REFILL_SECS: f64 = 1.0;

    /// Mass tiers a hazard can spawn with
    pub const HAZARD_MASS_TIERS: [u32; 4] = [100, 140, 180, 220];
    /// Hazard population cap
    pub const HAZARD_MAX: usize = 30;
    /// Hazards added per refill
    pub const HAZARD_REFILL_COUNT: usize = 5;
    /// Hazard refill interval (seconds)
    pub const HAZARD_REFILL_SECS: f64 = 10.0;
    /// Maximum pieces a hazard strike can produce
    pub const HAZARD_MAX_SPLIT: usize = 6;
    /// Mass advantage a ball needs over a hazard to strike it
    pub const HAZARD_MASS_RATIO: f64 = 1.2;
    /// Fly-out distance past the source radius for hazard pieces
    pub const HAZARD_PIECE_TRAVEL: f64 = 150.0;
    /// Keep-out margin for spawn positions (hazards and respawns)
    pub const SPAWN_MARGIN: i32 = 200;

    /// Minimum mass to consume ejecta
    pub const MIN_DIGEST_MASS: u32 = 18;
    /// Minimum mass to shoot ejecta
    pub const MIN_SHOOT_MASS: u32 = 28;
    /// Mass carried by one ejecta
    pub const EJECTA_MASS: u32 = 10;
    /// Ejecta launch offset (times the shooter radius)
    pub const EJECTA_LAUNCH_FACTOR: f64 = 1.15;
    /// Ejecta travel distance
    pub const EJECTA_TRAVEL: f64 = 150.0;
    /// Ejecta keep-out margin from the map edge
    pub const EJECTA_EDGE_MARGIN: f64 = 15.0;
    /// Ejecta flight duration (seconds)
    pub const EJECTA_FLIGHT_SECS: f64 = 0.3;
    /// Cell size of the ejecta grid
    pub const EJECTA_CELL: f64 = 30.0;

    /// Cell size of the ball and hazard grids
    pub const BODY_CELL: f64 = 100.0;

    /// Autonomous competitors per match
    pub const BOT_COUNT: usize = 30;
    /// Seconds between autonomous strategy rolls
    pub const BOT_REROLL_SECS: f64 = 5.0;
    /// Human respawn countdown (seconds)
    pub const RESPAWN_COUNTDOWN_SECS: f64 = 3.0;
    /// Match duration (seconds)
    pub const MATCH_SECS: f64 = 6.0 * 60.0;
    /// Rows in the ranking list
    pub const RANKING_SIZE: usize = 10;
}
