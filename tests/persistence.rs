//! Save/load through an in-memory store

use golem_survival::consts::SIM_DT;
use golem_survival::persistence::{KeyValueStore, MemoryStore, PersistenceError, SAVE_VERSION, Storage};
use golem_survival::sim::{GameState, TickInput, UpgradeKind, tick};
use golem_survival::{HighScores, Settings};

fn played(seed: u64, seconds: u32) -> GameState {
    let mut state = GameState::new(seed);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    for _ in 0..seconds * 60 {
        tick(&mut state, &input, SIM_DT);
    }
    state.drain_events();
    state
}

#[test]
fn saved_run_round_trips() {
    let mut state = played(21, 20);
    state.player.inventory.iron_ingots += 100;
    assert!(state.player.purchase_upgrade(UpgradeKind::Health));

    let mut storage = Storage::new(MemoryStore::new());
    storage.save_game(&state).unwrap();
    assert!(storage.has_save().unwrap());

    let loaded = storage.load_game().unwrap().expect("save present");
    assert_eq!(loaded.time_ticks, state.time_ticks);
    assert_eq!(loaded.score, state.score);
    assert_eq!(loaded.player.inventory, state.player.inventory);
    assert_eq!(loaded.player.upgrades, state.player.upgrades);
    assert_eq!(loaded.player.body.max_health, state.player.body.max_health);
    assert_eq!(loaded.enemies.len(), state.enemies.len());
    assert_eq!(loaded.waves.current_wave, state.waves.current_wave);
    assert_eq!(loaded.statics.len(), state.statics.len());
}

#[test]
fn loaded_runs_continue_identically() {
    let state = played(22, 10);
    let mut storage = Storage::new(MemoryStore::new());
    storage.save_game(&state).unwrap();

    let mut a = storage.load_game().unwrap().expect("save");
    let mut b = storage.load_game().unwrap().expect("save");
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    for _ in 0..10 * 60 {
        tick(&mut a, &input, SIM_DT);
        tick(&mut b, &input, SIM_DT);
    }
    assert_eq!(a.player.body.position, b.player.body.position);
    assert_eq!(a.kills, b.kills);
    assert_eq!(a.resources.len(), b.resources.len());
}

#[test]
fn foreign_version_is_rejected() {
    let mut storage = Storage::new(MemoryStore::new());
    storage.save_game(&GameState::new(1)).unwrap();

    let mut store = storage.into_inner();
    let key = "iron_golem_survival_save_game";
    let raw = store.get(key).unwrap().unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    value["version"] = "0.9.0".into();
    store.set(key, &value.to_string()).unwrap();

    match Storage::new(store).load_game() {
        Err(PersistenceError::VersionMismatch { found, expected }) => {
            assert_eq!(found, "0.9.0");
            assert_eq!(expected, SAVE_VERSION);
        }
        other => panic!("expected version mismatch, got {:?}", other.map(|s| s.is_some())),
    }
}

#[test]
fn corrupt_save_is_an_error() {
    let mut store = MemoryStore::new();
    store.set("iron_golem_survival_save_game", "{\"version\":").unwrap();
    let storage = Storage::new(store);
    assert!(matches!(storage.load_game(), Err(PersistenceError::Deserialize(_))));
}

#[test]
fn clear_save_keeps_scores_and_settings() {
    let mut storage = Storage::new(MemoryStore::new());
    storage.save_game(&GameState::new(3)).unwrap();

    let mut scores = HighScores::new();
    scores.add_score(420, 4, 1.0);
    scores.save(&mut storage).unwrap();
    Settings {
        show_fps: true,
        ..Default::default()
    }
    .save(&mut storage)
    .unwrap();

    storage.clear_save().unwrap();
    assert!(storage.load_game().unwrap().is_none());
    assert_eq!(HighScores::load(&storage).top_score(), Some(420));
    assert!(Settings::load(&storage).show_fps);

    assert_eq!(storage.clear_all().unwrap(), 2);
    assert!(HighScores::load(&storage).is_empty());
    assert_eq!(Settings::load(&storage), Settings::default());
}

#[test]
fn applied_settings_survive_reopening_storage() {
    let mut storage = Storage::new(MemoryStore::new());
    let mut settings = Settings::load(&storage);
    settings
        .apply(
            Settings {
                master_volume: -1.0,
                mouse_sensitivity: 2.5,
                invert_y: true,
                ..Default::default()
            },
            &mut storage,
        )
        .unwrap();

    let reopened = Storage::new(storage.into_inner());
    let loaded = Settings::load(&reopened);
    assert_eq!(loaded, settings);
    assert_eq!(loaded.master_volume, 0.0);
    assert_eq!(loaded.mouse_sensitivity, 2.5);
    assert!(loaded.invert_y);
}
