//! Player settings and preferences
//!
//! Persisted separately from the coin ledger and unlocks. Changes are
//! written immediately but only take effect on the next session start.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StoreError, keys, load_record, save_record};
use crate::sim::Difficulty;

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === Audio ===
    pub sound_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,

    // === Visual Effects ===
    /// Flashes, shake and particles
    pub effects_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            sound_enabled: true,
            volume: 0.7,
            effects_enabled: true,
        }
    }
}

impl Settings {
    /// Clamp fields a hand-edited record could break
    pub fn sanitize(mut self) -> Self {
        self.volume = clamp_volume(self.volume);
        self
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    /// Volume actually applied (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.sound_enabled { self.volume } else { 0.0 }
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        let settings: Settings = load_record(store, keys::SETTINGS);
        settings.sanitize()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_record(store, keys::SETTINGS, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        Settings::default().volume
    } else {
        volume.clamp(0.0, 1.0)
    }
}
