//! JavaScript bindings
//!
//! The page owns the canvas, input capture and the animation loop; it drives
//! a `WebArena` once per frame and draws from `snapshot_json`.

use glam::DVec2;
use wasm_bindgen::prelude::*;

use crate::audio::{AudioManager, SoundCue, cues_for};
use crate::highscores::Scoreboard;
use crate::persistence::Store;
use crate::platform;
use crate::settings::Settings;
use crate::sim::rng::Lcg;
use crate::sim::{Command, Match, MatchPhase};
use crate::tuning::MatchConfig;

#[wasm_bindgen(start)]
pub fn start() {
    platform::init_logging();
    log::info!("Orb Arena (web) starting...");
}

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebArena {
    game: Match,
    cfg: MatchConfig,
    store: Store,
    settings: Settings,
    scoreboard: Scoreboard,
    audio: AudioManager,
    cues: Vec<SoundCue>,
    /// Final score already written to the scoreboard
    recorded: bool,
}

#[wasm_bindgen]
impl WebArena {
    /// `tuning` is an optional JSON override of the match constants
    #[wasm_bindgen(constructor)]
    pub fn new(tuning: Option<String>) -> Result<WebArena, JsValue> {
        let cfg = match tuning {
            Some(json) => MatchConfig::from_json(&json).map_err(to_js)?,
            None => MatchConfig::default(),
        };
        let store = Store::open_default();
        let settings = Settings::load(&store);
        let scoreboard = Scoreboard::load(&store);
        let mut audio = AudioManager::new();
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_background(settings.background_audio);
        let game = Match::new(cfg.clone(), Some(settings.player_name.as_str()));
        Ok(Self {
            game,
            cfg,
            store,
            settings,
            scoreboard,
            audio,
            cues: Vec::new(),
            recorded: false,
        })
    }

    /// Advance by `dt` seconds; returns false once the match is over
    pub fn tick(&mut self, dt: f64) -> bool {
        let phase = self.game.tick(dt);
        let events = self.game.drain_events();
        self.cues.extend(cues_for(&events, self.game.human()));
        if phase == MatchPhase::Finished && !self.recorded {
            self.record_score();
        }
        phase == MatchPhase::Running
    }

    fn record_score(&mut self) {
        self.recorded = true;
        let Some(score) = self.game.outcome().map(|o| o.human_score) else {
            return;
        };
        if let Some(rank) = self.scoreboard.add_score(score, platform::now_millis()) {
            log::info!("New scoreboard entry #{rank}: {score}");
            if let Err(e) = self.scoreboard.save(&self.store) {
                log::warn!("Could not save scoreboard: {e}");
            }
        }
    }

    /// Steering stick: direction (any length) and magnitude in 0..=1
    pub fn set_intent(&mut self, x: f64, y: f64, magnitude: f64) {
        self.game.submit(Command::Move {
            direction: DVec2::new(x, y),
            magnitude,
        });
    }

    pub fn split(&mut self) {
        self.game.submit(Command::Split);
    }

    pub fn shoot(&mut self) {
        self.game.submit(Command::Shoot);
    }

    pub fn stop(&mut self) {
        self.game.submit(Command::Stop);
    }

    pub fn respawn(&mut self) {
        self.game.submit(Command::Respawn);
    }

    /// Start a new match with the same tuning
    pub fn restart(&mut self) {
        self.game = Match::new(self.cfg.clone(), Some(self.settings.player_name.as_str()));
        self.cues.clear();
        self.recorded = false;
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.snapshot()).map_err(to_js)
    }

    /// Play and return (as a JSON array) the cues raised since the last call
    pub fn take_cues(&mut self) -> Result<String, JsValue> {
        let cues = std::mem::take(&mut self.cues);
        for cue in &cues {
            self.audio.play(*cue);
        }
        serde_json::to_string(&cues).map_err(to_js)
    }

    /// Must be called from a user gesture before any sound plays
    pub fn resume_audio(&self) {
        self.audio.resume();
    }

    pub fn scoreboard_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.scoreboard).map_err(to_js)
    }

    pub fn player_name(&self) -> String {
        self.settings.player_name.clone()
    }

    /// Stores the cleaned-up name and returns it; applies from the next match
    pub fn set_player_name(&mut self, name: &str) -> Result<String, JsValue> {
        let mut rng = Lcg::from_clock();
        self.settings
            .set_player_name(name, &mut rng, &self.store)
            .map(str::to_string)
            .map_err(to_js)
    }

    pub fn set_background_audio(&mut self, on: bool) -> Result<(), JsValue> {
        self.settings
            .set_background_audio(on, &self.store)
            .map_err(to_js)?;
        self.audio.set_background(on);
        Ok(())
    }

    pub fn set_sfx_volume(&mut self, volume: f32) -> Result<(), JsValue> {
        self.settings
            .set_sfx_volume(volume, &self.store)
            .map_err(to_js)?;
        self.audio.set_sfx_volume(self.settings.sfx_volume);
        Ok(())
    }
}
