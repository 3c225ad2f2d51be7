//! Arena simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only advances through `tick` (simulation seconds, never wall time)
//! - Seeded RNG only
//! - Stable iteration order (actor id, then arena handle)
//! - No rendering, audio or platform dependencies

pub mod actor;
pub mod arena;
pub mod ball;
pub mod bot;
pub mod collision;
pub mod decay;
pub mod ejecta;
pub mod game;
pub mod geometry;
pub mod grid;
pub mod hazard;
pub mod pickup;
pub mod rng;
pub mod state;
pub mod tick;
pub mod view;

pub use actor::{Actor, Command, Controller, Intent, Life, RemainderPolicy, share_mass};
pub use arena::{Arena, Handle};
pub use ball::{ActorId, Ball, BallId, BallMetrics};
pub use game::{Match, MatchOutcome, MatchPhase};
pub use rng::Lcg;
pub use state::{DeathNotice, GameEvent, World};
pub use tick::tick;
pub use view::{BodyKind, BodyView, DotView, FrameView, RankEntry};
