//! Player preferences
//!
//! Stored as one JSON document next to the scoreboard. Setters save only when
//! the value actually changes.

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistError, Store};
use crate::sim::game::random_name;
use crate::sim::rng::Lcg;

/// Longest display name kept, in characters
pub const MAX_NAME_CHARS: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display name; empty until the player picks one
    pub player_name: String,
    /// Ambient background track
    pub background_audio: bool,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            background_audio: true,
            sfx_volume: 1.0,
        }
    }
}

/// Strip whitespace and cap the length; a blank name gets a random one
pub fn sanitize_name(raw: &str, rng: &mut Lcg) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(MAX_NAME_CHARS)
        .collect();
    if cleaned.is_empty() {
        random_name(rng)
    } else {
        cleaned
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "settings";

    pub fn load(store: &Store) -> Self {
        let mut settings: Self = store.load_or_default(Self::STORAGE_KEY);
        if !settings.sfx_volume.is_finite() {
            settings.sfx_volume = 1.0;
        }
        settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        settings
    }

    pub fn save(&self, store: &Store) -> Result<(), PersistError> {
        store.save(Self::STORAGE_KEY, self)
    }

    /// Name to enter a match with, or `None` to let the match pick one
    pub fn display_name(&self) -> Option<&str> {
        match self.player_name.as_str() {
            "" => None,
            name => Some(name),
        }
    }

    /// Returns the stored name
    pub fn set_player_name(
        &mut self,
        raw: &str,
        rng: &mut Lcg,
        store: &Store,
    ) -> Result<&str, PersistError> {
        let name = sanitize_name(raw, rng);
        if name != self.player_name {
            self.player_name = name;
            self.save(store)?;
        }
        Ok(&self.player_name)
    }

    pub fn set_background_audio(&mut self, on: bool, store: &Store) -> Result<(), PersistError> {
        if on != self.background_audio {
            self.background_audio = on;
            self.save(store)?;
        }
        Ok(())
    }

    pub fn set_sfx_volume(&mut self, volume: f32, store: &Store) -> Result<(), PersistError> {
        if !volume.is_finite() {
            return Ok(());
        }
        let volume = volume.clamp(0.0, 1.0);
        if volume != self.sfx_volume {
            self.sfx_volume = volume;
            self.save(store)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::game::ACTOR_NAMES;

    #[test]
    fn test_sanitize_strips_whitespace() {
        let mut rng = Lcg::new(1);
        assert_eq!(sanitize_name("  Ada Love\tlace ", &mut rng), "AdaLovelace");
        assert_eq!(
            sanitize_name("abcdefghijklmnopqrstuvwxyz", &mut rng).chars().count(),
            MAX_NAME_CHARS
        );
    }

    #[test]
    fn test_blank_name_becomes_random() {
        let mut rng = Lcg::new(1);
        let name = sanitize_name(" \n ", &mut rng);
        assert!(ACTOR_NAMES.contains(&name.as_str()));
    }

    #[test]
    fn test_display_name() {
        let mut settings = Settings::default();
        assert_eq!(settings.display_name(), None);
        settings.player_name = "Ada".into();
        assert_eq!(settings.display_name(), Some("Ada"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_setters_persist_changes() {
        let store = crate::persistence::temp_store("settings");
        let mut rng = Lcg::new(3);
        let mut settings = Settings::load(&store);
        assert_eq!(settings, Settings::default());

        settings.set_player_name(" Ada ", &mut rng, &store).unwrap();
        settings.set_background_audio(false, &store).unwrap();
        settings.set_sfx_volume(4.0, &store).unwrap();

        let reloaded = Settings::load(&store);
        assert_eq!(reloaded.player_name, "Ada");
        assert!(!reloaded.background_audio);
        assert_eq!(reloaded.sfx_volume, 1.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_unchanged_value_is_not_written() {
        let store = crate::persistence::temp_store("settings-noop");
        let mut settings = Settings::default();
        settings.set_background_audio(true, &store).unwrap();
        assert!(store.load::<Settings>("settings").unwrap().is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_partial_document_fills_defaults() {
        let store = crate::persistence::temp_store("settings-partial");
        store
            .save("settings", &serde_json::json!({ "player_name": "Bo" }))
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.player_name, "Bo");
        assert!(settings.background_audio);
    }
}
