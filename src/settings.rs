//! User settings and tuning
//!
//! Persisted as one JSON value under `mini_arcade_settings`, separate from the
//! per-game high scores. Unknown or missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::StorageError;
use crate::persistence::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Morse playback speed (0.5 - 2.0)
    pub morse_speed: f32,

    // === Loop ===
    /// Upper bound on ticks run per frame
    pub max_substeps: u32,

    // === Difficulty ===
    /// Spawn placement retry cap
    pub spawn_attempts: u32,
    /// Ceiling for the Ball Avoidance speed multiplier
    pub max_speed_multiplier: f32,
    /// Floor for the Ball Avoidance spawn interval (seconds)
    pub min_spawn_interval: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            morse_speed: 1.0,

            max_substeps: consts::MAX_SUBSTEPS,

            spawn_attempts: consts::SPAWN_ATTEMPTS,
            max_speed_multiplier: 8.0,
            min_spawn_interval: 0.4,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "mini_arcade_settings";

    /// Clamp every field into its valid range
    pub fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.morse_speed = self.morse_speed.clamp(0.5, 2.0);
        self.max_substeps = self.max_substeps.clamp(1, 32);
        self.spawn_attempts = self.spawn_attempts.max(1);
        self.max_speed_multiplier = self.max_speed_multiplier.max(1.0);
        self.min_spawn_interval = self.min_spawn_interval.max(0.05);
        self
    }

    /// Load settings, falling back to defaults on missing or corrupt data
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Settings unreadable, using defaults: {e}"),
            },
            Ok(None) => log::info!("Using default settings"),
            Err(e) => log::warn!("Settings store unavailable, using defaults: {e}"),
        }
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_roundtrip_through_store() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            muted: true,
            morse_speed: 1.5,
            ..Settings::default()
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_corrupt_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "{\"muted\": ").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_json_fills_defaults_and_clamps() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"morse_speed": 9.0}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.morse_speed, 2.0);
        assert_eq!(settings.spawn_attempts, consts::SPAWN_ATTEMPTS);
    }
}
