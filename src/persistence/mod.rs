//! Save/load persistence
//!
//! Everything is stored as JSON strings under prefixed keys in a
//! `KeyValueStore`:
//! - `save_game`: a versioned `SaveEnvelope` around the `GameState`
//! - `high_scores`: the leaderboard
//! - `settings`: player preferences

pub mod store;

pub use store::{KeyValueStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::GameState;

/// Prefix shared by every key this game writes
pub const KEY_PREFIX: &str = "iron_golem_survival_";
/// Save format version. Saves with another version are rejected.
pub const SAVE_VERSION: &str = "1.0.0";

pub const SAVE_GAME_KEY: &str = "save_game";
pub const HIGH_SCORES_KEY: &str = "high_scores";
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage is not available")]
    Unavailable,
    #[error("failed to serialize: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to deserialize: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("storage backend error: {0}")]
    Storage(String),
    #[error("save version {found} does not match {expected}")]
    VersionMismatch { found: String, expected: String },
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// On-disk wrapper around a saved run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEnvelope {
    pub version: String,
    /// Wall-clock time of the save (Unix ms)
    pub timestamp: f64,
    pub game_state: GameState,
}

/// Wall-clock time in Unix milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Prefixed JSON access to a key-value store
#[derive(Debug, Clone)]
pub struct Storage<S: KeyValueStore> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self::with_prefix(store, KEY_PREFIX)
    }

    pub fn with_prefix(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Read and parse a JSON value. Missing keys are `Ok(None)`.
    pub fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.store.get(&self.key(name))? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(PersistenceError::Deserialize),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&mut self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(PersistenceError::Serialize)?;
        let key = self.key(name);
        self.store.set(&key, &json)
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        let key = self.key(name);
        self.store.remove(&key)
    }

    /// Save the run, stamped with the current wall-clock time
    pub fn save_game(&mut self, state: &GameState) -> Result<()> {
        self.save_game_at(state, now_ms())
    }

    pub fn save_game_at(&mut self, state: &GameState, timestamp: f64) -> Result<()> {
        let envelope = SaveEnvelope {
            version: SAVE_VERSION.to_string(),
            timestamp,
            game_state: state.clone(),
        };
        self.set_json(SAVE_GAME_KEY, &envelope)?;
        log::info!("Game saved (wave {}, score {})", state.waves.current_wave, state.score);
        Ok(())
    }

    /// Load the saved run, if any
    ///
    /// The RNG is rebuilt from the seed and tick count, so a loaded run
    /// continues deterministically.
    pub fn load_game(&self) -> Result<Option<GameState>> {
        let Some(envelope) = self.get_json::<SaveEnvelope>(SAVE_GAME_KEY)? else {
            return Ok(None);
        };
        if envelope.version != SAVE_VERSION {
            return Err(PersistenceError::VersionMismatch {
                found: envelope.version,
                expected: SAVE_VERSION.to_string(),
            });
        }

        let mut state = envelope.game_state;
        state.reseed();
        state.normalize_order();
        log::info!("Game loaded (wave {}, tick {})", state.waves.current_wave, state.time_ticks);
        Ok(Some(state))
    }

    pub fn has_save(&self) -> Result<bool> {
        Ok(self.store.get(&self.key(SAVE_GAME_KEY))?.is_some())
    }

    pub fn clear_save(&mut self) -> Result<()> {
        self.remove(SAVE_GAME_KEY)
    }

    /// Remove every key under the prefix. Returns how many were removed.
    pub fn clear_all(&mut self) -> Result<usize> {
        let owned: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect();
        for key in &owned {
            self.store.remove(key)?;
        }
        log::info!("Cleared {} stored entries", owned.len());
        Ok(owned.len())
    }
}
