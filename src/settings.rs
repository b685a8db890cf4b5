//! Game settings and preferences
//!
//! Persisted separately from game saves.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, SETTINGS_KEY, Storage};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Controls ===
    /// Multiplier on the base look sensitivity
    pub mouse_sensitivity: f32,
    /// Invert vertical look
    pub invert_y: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.7,
            sfx_volume: 0.8,
            music_volume: 0.5,
            mouse_sensitivity: 1.0,
            invert_y: false,
            show_fps: false,
        }
    }
}

impl Settings {
    pub const MIN_SENSITIVITY: f32 = 0.1;
    pub const MAX_SENSITIVITY: f32 = 5.0;

    /// Gain applied to sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    pub fn effective_music_volume(&self) -> f32 {
        self.master_volume * self.music_volume
    }

    /// Sensitivity multiplier fed to the camera
    pub fn look_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    /// Pull every value back into its valid range
    pub fn clamp(&mut self) {
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 };
        self.master_volume = unit(self.master_volume);
        self.sfx_volume = unit(self.sfx_volume);
        self.music_volume = unit(self.music_volume);
        self.mouse_sensitivity = if self.mouse_sensitivity.is_finite() {
            self.mouse_sensitivity.clamp(Self::MIN_SENSITIVITY, Self::MAX_SENSITIVITY)
        } else {
            1.0
        };
    }

    /// Load settings, falling back to defaults on a missing or bad entry
    pub fn load<S: KeyValueStore>(storage: &Storage<S>) -> Self {
        match storage.get_json::<Settings>(SETTINGS_KEY) {
            Ok(Some(mut settings)) => {
                settings.clamp();
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring stored settings: {}", err);
                Self::default()
            }
        }
    }

    /// Replace the current settings with `changed` (clamped) and persist them
    ///
    /// The new values apply even when the save fails.
    pub fn apply<S: KeyValueStore>(
        &mut self,
        mut changed: Settings,
        storage: &mut Storage<S>,
    ) -> crate::persistence::Result<()> {
        changed.clamp();
        *self = changed;
        self.save(storage)
    }

    pub fn save<S: KeyValueStore>(&self, storage: &mut Storage<S>) -> crate::persistence::Result<()> {
        storage.set_json(SETTINGS_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.master_volume, 0.7);
        assert_eq!(s.sfx_volume, 0.8);
        assert_eq!(s.music_volume, 0.5);
        assert_eq!(s.look_sensitivity(), 1.0);
        assert!(!s.invert_y);
        assert!(!s.show_fps);
        assert!((s.effective_sfx_volume() - 0.56).abs() < 1e-6);
    }

    #[test]
    fn test_clamp() {
        let mut s = Settings {
            master_volume: 1.5,
            sfx_volume: -0.2,
            music_volume: f32::NAN,
            mouse_sensitivity: 50.0,
            ..Default::default()
        };
        s.clamp();
        assert_eq!(s.master_volume, 1.0);
        assert_eq!(s.sfx_volume, 0.0);
        assert_eq!(s.music_volume, 1.0);
        assert_eq!(s.mouse_sensitivity, Settings::MAX_SENSITIVITY);
    }

    #[test]
    fn test_save_load() {
        let mut storage = Storage::new(MemoryStore::new());
        let s = Settings {
            invert_y: true,
            mouse_sensitivity: 2.0,
            ..Default::default()
        };
        s.save(&mut storage).unwrap();
        assert_eq!(Settings::load(&storage), s);
    }

    #[test]
    fn test_apply_clamps_and_persists() {
        let mut storage = Storage::new(MemoryStore::new());
        let mut current = Settings::load(&storage);
        current
            .apply(
                Settings {
                    sfx_volume: 3.0,
                    show_fps: true,
                    ..current.clone()
                },
                &mut storage,
            )
            .unwrap();

        assert_eq!(current.sfx_volume, 1.0);
        assert_eq!(Settings::load(&storage), current);
    }

    #[test]
    fn test_partial_entry_fills_defaults() {
        let mut store = MemoryStore::new();
        store.set("iron_golem_survival_settings", r#"{"masterVolume":0.3}"#).unwrap();
        let loaded = Settings::load(&Storage::new(store));
        assert_eq!(loaded.master_volume, 0.3);
        assert_eq!(loaded.sfx_volume, 0.8);
    }

    #[test]
    fn test_corrupt_entry_falls_back() {
        let mut store = MemoryStore::new();
        store.set("iron_golem_survival_settings", "{not json").unwrap();
        assert_eq!(Settings::load(&Storage::new(store)), Settings::default());
    }
}
