//! Orb Arena entry point
//!
//! Native builds run one headless match with the human on autopilot and
//! record the result on the local scoreboard. The browser build is driven
//! from JavaScript through `orb_arena::web`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use glam::DVec2;

    use orb_arena::audio::{AudioManager, cues_for};
    use orb_arena::consts::SIM_DT;
    use orb_arena::highscores::{Scoreboard, format_age};
    use orb_arena::persistence::Store;
    use orb_arena::platform;
    use orb_arena::settings::Settings;
    use orb_arena::sim::rng::Lcg;
    use orb_arena::sim::{Command, Match, MatchPhase};
    use orb_arena::tuning::MatchConfig;

    /// Simulated seconds between ranking reports
    const REPORT_SECS: f64 = 30.0;
    /// Simulated seconds between autopilot steering changes
    const STEER_SECS: f64 = 2.0;

    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// JSON file overriding match constants
        tuning: Option<PathBuf>,

        /// Fixed RNG seed (overrides the tuning file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Match length in seconds (overrides the tuning file)
        #[arg(short, long)]
        match_secs: Option<f64>,

        /// Player name for this run (not saved)
        #[arg(short, long)]
        name: Option<String>,
    }

    /// Random wandering with the odd split and shot
    struct Autopilot {
        rng: Lcg,
        steer_timer: f64,
    }

    impl Autopilot {
        fn new(seed: u64) -> Self {
            Self {
                rng: Lcg::new(seed ^ 0x5eed),
                steer_timer: 0.0,
            }
        }

        fn drive(&mut self, game: &mut Match, dt: f64) {
            let world = game.world();
            if world.death_notice.is_some() {
                game.submit(Command::Respawn);
                return;
            }
            let score = world.human_actor().map_or(0, |a| a.score);
            let split_mass = world.cfg.min_split_mass * 2;
            let shoot_mass = world.cfg.min_shoot_mass * 4;

            self.steer_timer -= dt;
            if self.steer_timer > 0.0 {
                return;
            }
            self.steer_timer = STEER_SECS;
            let angle = self.rng.next_f64() * std::f64::consts::TAU;
            game.submit(Command::Move {
                direction: DVec2::from_angle(angle),
                magnitude: 1.0,
            });
            let roll = self.rng.next_f64();
            if score >= split_mass && roll < 0.2 {
                game.submit(Command::Split);
            } else if score >= shoot_mass && roll < 0.3 {
                game.submit(Command::Shoot);
            }
        }
    }

    fn report(game: &Match) {
        let world = game.world();
        log::info!("-- {:.0}s left --", game.remaining());
        for (place, entry) in world.ranking().iter().take(world.cfg.ranking_size).enumerate() {
            let marker = if entry.highlight { "*" } else { " " };
            log::info!("{marker}{:>2}. {:<12} {}", place + 1, entry.name, entry.score);
        }
    }

    pub fn run() -> anyhow::Result<()> {
        let args = Args::parse();
        platform::init_logging();
        log::info!("Orb Arena (headless) starting...");

        let mut cfg = match &args.tuning {
            Some(path) => MatchConfig::load(path)
                .with_context(|| format!("reading tuning from {}", path.display()))?,
            None => MatchConfig::default(),
        };
        if args.seed.is_some() {
            cfg.seed = args.seed;
        }
        if let Some(secs) = args.match_secs {
            cfg.match_secs = secs;
        }
        let cfg = cfg.validated();

        let store = Store::open_default();
        let settings = Settings::load(&store);
        let mut scoreboard = Scoreboard::load(&store);
        let mut audio = AudioManager::new();
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_background(settings.background_audio);

        let name = args
            .name
            .as_deref()
            .or(settings.display_name())
            .unwrap_or("");
        let mut game = Match::new(cfg, Some(name));
        let mut autopilot = Autopilot::new(game.world().seed);
        let mut next_report = REPORT_SECS;

        while game.phase() == MatchPhase::Running {
            autopilot.drive(&mut game, SIM_DT);
            game.tick(SIM_DT);
            for cue in cues_for(&game.drain_events(), game.human()) {
                audio.play(cue);
            }
            if game.world().now >= next_report {
                report(&game);
                next_report += REPORT_SECS;
            }
        }
        log::info!("{} sound cues played", audio.played());

        let score = game.outcome().map_or(0, |o| o.human_score);
        let now = platform::now_millis();
        match scoreboard.add_score(score, now) {
            Some(rank) => {
                log::info!("Score {score} placed #{rank} on the scoreboard");
                scoreboard
                    .save(&store)
                    .context("saving the scoreboard")?;
            }
            None => log::info!("Score {score} did not make the scoreboard"),
        }
        for (place, entry) in scoreboard.entries.iter().enumerate() {
            log::info!(
                "  {}. {:>6}  {}",
                place + 1,
                entry.score,
                format_age(entry.timestamp, now)
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `orb_arena::web::start`
}
