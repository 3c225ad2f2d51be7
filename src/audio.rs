//! Sound cues
//!
//! The simulation reports `GameEvent`s; only the human's own transitions make
//! a sound. Browser builds synthesize the cues with the Web Audio API, native
//! builds just log them.

use serde::{Deserialize, Serialize};

use crate::sim::{ActorId, GameEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Split,
    Shoot,
    Absorb,
}

/// The cue for an event, if it concerns the human
pub fn cue_for(event: &GameEvent, human: Option<ActorId>) -> Option<SoundCue> {
    let human = human?;
    match *event {
        GameEvent::Split { actor } | GameEvent::HazardBurst { actor, .. } if actor == human => {
            Some(SoundCue::Split)
        }
        GameEvent::Shoot { actor, .. } if actor == human => Some(SoundCue::Shoot),
        GameEvent::Absorbed { by, victim, .. } if by == human || victim == human => {
            Some(SoundCue::Absorb)
        }
        _ => None,
    }
}

/// Cues for a batch of events, in order
pub fn cues_for(events: &[GameEvent], human: Option<ActorId>) -> Vec<SoundCue> {
    events.iter().filter_map(|e| cue_for(e, human)).collect()
}

#[cfg(target_arch = "wasm32")]
pub use web_audio::AudioManager;

#[cfg(not(target_arch = "wasm32"))]
pub use log_audio::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web_audio {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundCue;

    pub struct AudioManager {
        ctx: Option<AudioContext>,
        sfx_volume: f32,
        muted: bool,
        /// Low drone running while background audio is on
        drone: Option<(OscillatorNode, GainNode)>,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                sfx_volume: 1.0,
                muted: false,
                drone: None,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            if muted {
                self.set_background(false);
            }
        }

        /// Start or stop the background drone
        pub fn set_background(&mut self, on: bool) {
            match (on && !self.muted, self.drone.take()) {
                (true, Some(drone)) => self.drone = Some(drone),
                (true, None) => {
                    let Some(ctx) = &self.ctx else { return };
                    if let Some((osc, gain)) = Self::create_osc(ctx, 55.0, OscillatorType::Sine) {
                        gain.gain().set_value(0.04);
                        osc.start().ok();
                        self.drone = Some((osc, gain));
                    }
                }
                (false, Some((osc, _))) => {
                    osc.stop().ok();
                }
                (false, None) => {}
            }
        }

        pub fn play(&mut self, cue: SoundCue) {
            let vol = if self.muted { 0.0 } else { self.sfx_volume };
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            match cue {
                SoundCue::Split => Self::play_split(ctx, vol),
                SoundCue::Shoot => Self::play_shoot(ctx, vol),
                SoundCue::Absorb => Self::play_absorb(ctx, vol),
            }
        }

        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((osc, gain))
        }

        /// Rising pop
        fn play_split(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 220.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.18)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(660.0, t + 0.12)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }

        /// Short blip
        fn play_shoot(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 520.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.07)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.09).ok();
        }

        /// Falling gulp
        fn play_absorb(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 300.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(80.0, t + 0.3)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod log_audio {
    use super::SoundCue;

    /// Headless stand-in: cues go to the log
    #[derive(Debug, Default)]
    pub struct AudioManager {
        sfx_volume: f32,
        muted: bool,
        background: bool,
        played: usize,
    }

    impl AudioManager {
        pub fn new() -> Self {
            Self {
                sfx_volume: 1.0,
                ..Self::default()
            }
        }

        pub fn resume(&self) {}

        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn set_background(&mut self, on: bool) {
            self.background = on && !self.muted;
            log::debug!("background audio {}", if self.background { "on" } else { "off" });
        }

        pub fn background(&self) -> bool {
            self.background
        }

        pub fn play(&mut self, cue: SoundCue) {
            if self.muted || self.sfx_volume <= 0.0 {
                return;
            }
            self.played += 1;
            log::debug!("cue {cue:?} at volume {:.2}", self.sfx_volume);
        }

        /// Cues played so far
        pub fn played(&self) -> usize {
            self.played
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_human_events_sound() {
        let me = Some(1);
        assert_eq!(cue_for(&GameEvent::Split { actor: 1 }, me), Some(SoundCue::Split));
        assert_eq!(cue_for(&GameEvent::Split { actor: 2 }, me), None);
        assert_eq!(
            cue_for(&GameEvent::Shoot { actor: 1, packets: 3 }, me),
            Some(SoundCue::Shoot)
        );
        assert_eq!(cue_for(&GameEvent::Split { actor: 1 }, None), None);
    }

    #[test]
    fn test_hazard_burst_sounds_like_split() {
        let event = GameEvent::HazardBurst {
            actor: 4,
            pieces: 5,
        };
        assert_eq!(cue_for(&event, Some(4)), Some(SoundCue::Split));
    }

    #[test]
    fn test_absorb_either_side() {
        let event = GameEvent::Absorbed {
            by: 1,
            victim: 2,
            mass: 40,
        };
        assert_eq!(cue_for(&event, Some(1)), Some(SoundCue::Absorb));
        assert_eq!(cue_for(&event, Some(2)), Some(SoundCue::Absorb));
        assert_eq!(cue_for(&event, Some(3)), None);
    }

    #[test]
    fn test_batch_keeps_order_and_skips_silent() {
        let events = vec![
            GameEvent::Shoot { actor: 1, packets: 1 },
            GameEvent::ActorRespawned { actor: 1 },
            GameEvent::MatchEnded,
            GameEvent::Split { actor: 1 },
        ];
        assert_eq!(cues_for(&events, Some(1)), vec![SoundCue::Shoot, SoundCue::Split]);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_muted_manager_plays_nothing() {
        let mut audio = AudioManager::new();
        audio.play(SoundCue::Split);
        audio.set_muted(true);
        audio.play(SoundCue::Absorb);
        assert_eq!(audio.played(), 1);
    }
}
