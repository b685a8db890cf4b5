//! Golem Survival entry point
//!
//! Native builds run a headless autopilot session. Browser builds export a
//! `WebGame` handle that the page drives once per animation frame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use golem_survival::audio::{LogAudio, dispatch_sounds};
    use golem_survival::hud::HudSnapshot;
    use golem_survival::persistence::{LocalStore, MemoryStore, Storage};
    use golem_survival::sim::{FrameClock, GamePhase, GameState, TickInput, UpgradeKind};
    use golem_survival::{HighScores, Settings};

    /// Either LocalStorage or, when it is blocked, a throwaway map
    enum Backend {
        Local(Storage<LocalStore>),
        Memory(Storage<MemoryStore>),
    }

    /// Game instance holding all state
    #[wasm_bindgen]
    pub struct WebGame {
        state: GameState,
        clock: FrameClock,
        input: TickInput,
        settings: Settings,
        high_scores: HighScores,
        storage: Backend,
        audio: LogAudio,
        // Track phase for auto-save
        last_phase: GamePhase,
    }

    macro_rules! with_storage {
        ($backend:expr, $s:ident => $body:expr) => {
            match $backend {
                Backend::Local($s) => $body,
                Backend::Memory($s) => $body,
            }
        };
    }

    #[wasm_bindgen]
    impl WebGame {
        #[wasm_bindgen(constructor)]
        pub fn new() -> WebGame {
            let storage = match LocalStore::open() {
                Ok(store) => Backend::Local(Storage::new(store)),
                Err(err) => {
                    log::warn!("{}, progress will not be kept", err);
                    Backend::Memory(Storage::new(MemoryStore::new()))
                }
            };
            let settings = with_storage!(&storage, s => Settings::load(s));
            let high_scores = with_storage!(&storage, s => HighScores::load(s));
            let seed = js_sys::Date::now() as u64;

            Self {
                state: GameState::new(seed),
                clock: FrameClock::new(),
                input: TickInput::default(),
                settings,
                high_scores,
                storage,
                audio: LogAudio::default(),
                last_phase: GamePhase::Playing,
            }
        }

        /// Resume the stored run. Returns false when there is none.
        pub fn continue_saved(&mut self) -> bool {
            match with_storage!(&self.storage, s => s.load_game()) {
                Ok(Some(state)) => {
                    self.state = state;
                    self.clock.reset();
                    true
                }
                Ok(None) => false,
                Err(err) => {
                    log::warn!("Discarding saved game: {}", err);
                    false
                }
            }
        }

        /// Advance by one animation frame (milliseconds since the last one)
        pub fn frame(&mut self, frame_ms: f64) {
            self.input.look_sensitivity = self.settings.look_sensitivity();
            self.input.invert_y = self.settings.invert_y;
            self.clock.advance(&mut self.state, &mut self.input, (frame_ms / 1000.0) as f32);

            let events = self.state.drain_events();
            dispatch_sounds(&events, &mut self.audio, &self.settings);

            let phase = self.state.phase;
            if phase != self.last_phase {
                match phase {
                    GamePhase::Paused => self.save(),
                    GamePhase::GameOver => self.record_run(),
                    GamePhase::Playing => {}
                }
                self.last_phase = phase;
            }
        }

        pub fn set_movement(&mut self, x: f32, y: f32) {
            self.input.movement = glam::Vec2::new(x, y);
        }

        pub fn look(&mut self, dx: f32, dy: f32) {
            self.input.look_delta += glam::Vec2::new(dx, dy);
        }

        pub fn attack(&mut self) {
            self.input.attack = true;
        }

        pub fn jump(&mut self) {
            self.input.jump = true;
        }

        pub fn toggle_pause(&mut self) {
            self.input.pause = true;
        }

        pub fn restart(&mut self) {
            self.input.restart = true;
        }

        pub fn repair(&mut self) {
            self.input.repair = true;
        }

        /// 0 = damage, 1 = health, 2 = attack speed
        pub fn purchase(&mut self, slot: u32) {
            self.input.purchase = UpgradeKind::ALL.get(slot as usize).copied();
        }

        pub fn set_idle_mode(&mut self, on: bool) {
            self.input.idle_mode = on;
            log::info!("Idle mode: {}", on);
        }

        /// HUD snapshot as JSON
        pub fn hud_json(&self) -> String {
            serde_json::to_string(&HudSnapshot::from_state(&self.state)).unwrap_or_default()
        }

        pub fn high_scores_json(&self) -> String {
            serde_json::to_string(&self.high_scores).unwrap_or_default()
        }

        pub fn save(&mut self) {
            if let Err(err) = with_storage!(&mut self.storage, s => s.save_game(&self.state)) {
                log::warn!("Save failed: {}", err);
            }
        }

        pub fn settings_json(&self) -> String {
            serde_json::to_string(&self.settings).unwrap_or_default()
        }

        /// Replace settings from JSON. Missing fields take defaults.
        pub fn set_settings_json(&mut self, json: &str) -> bool {
            let changed = match serde_json::from_str::<Settings>(json) {
                Ok(changed) => changed,
                Err(err) => {
                    log::warn!("Rejecting settings: {}", err);
                    return false;
                }
            };
            if let Err(err) = with_storage!(&mut self.storage, s => self.settings.apply(changed, s)) {
                log::warn!("Saving settings failed: {}", err);
            }
            true
        }

        pub fn clear_all_data(&mut self) {
            if let Err(err) = with_storage!(&mut self.storage, s => s.clear_all()) {
                log::warn!("Clearing storage failed: {}", err);
            }
            self.high_scores = HighScores::new();
            self.settings = Settings::default();
        }

        fn record_run(&mut self) {
            let now = golem_survival::persistence::now_ms();
            let wave = self.state.waves.current_wave;
            if self.high_scores.add_score(self.state.score, wave, now).is_some() {
                if let Err(err) = with_storage!(&mut self.storage, s => self.high_scores.save(s)) {
                    log::warn!("Saving high scores failed: {}", err);
                }
            }
            if let Err(err) = with_storage!(&mut self.storage, s => s.clear_save()) {
                log::warn!("Clearing save failed: {}", err);
            }
        }
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }
        log::info!("Golem Survival starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use golem_survival::audio::{LogAudio, dispatch_sounds};
    use golem_survival::hud::HudSnapshot;
    use golem_survival::persistence::{MemoryStore, Storage, now_ms};
    use golem_survival::sim::{FrameClock, GameEvent, GamePhase, GameState, TickInput};
    use golem_survival::{HighScores, Settings};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(300.0f32);
    log::info!("Golem Survival (native, headless) seed {} for {}s", seed, seconds);

    let mut storage = Storage::new(MemoryStore::new());
    let settings = Settings::load(&storage);
    let mut high_scores = HighScores::load(&storage);

    let mut state = GameState::new(seed);
    let mut clock = FrameClock::new();
    let mut audio = LogAudio::default();
    let mut input = TickInput {
        idle_mode: true,
        look_sensitivity: settings.look_sensitivity(),
        invert_y: settings.invert_y,
        ..Default::default()
    };

    // 60 FPS host frames
    let frame_dt = 1.0 / 60.0;
    let frames = (seconds / frame_dt) as u32;
    for _ in 0..frames {
        clock.advance(&mut state, &mut input, frame_dt);

        let events = state.drain_events();
        dispatch_sounds(&events, &mut audio, &settings);
        for event in &events {
            if let GameEvent::WaveCompleted { wave, .. } = event {
                let hud = HudSnapshot::from_state(&state);
                log::info!("{} | hp {:.0}/{:.0} | iron {}", hud.wave_label(), hud.health, hud.max_health, hud.iron_ingots);
                if let Err(err) = storage.save_game(&state) {
                    log::warn!("Save after wave {} failed: {}", wave, err);
                }
            }
        }

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    // A reloaded save continues from the same tick
    match storage.load_game() {
        Ok(Some(saved)) => log::info!("Last save: wave {}, tick {}", saved.waves.current_wave, saved.time_ticks),
        Ok(None) => log::info!("No wave was completed, nothing saved"),
        Err(err) => log::warn!("Reload failed: {}", err),
    }

    if let Some(rank) = high_scores.add_score(state.score, state.waves.current_wave, now_ms()) {
        log::info!("New high score, rank {}", rank);
        if let Err(err) = high_scores.save(&mut storage) {
            log::warn!("Saving high scores failed: {}", err);
        }
    }

    println!(
        "seed {}: survived {:.1}s, reached wave {}, {} kills ({} bosses), score {}, {} sound cues",
        seed,
        state.time,
        state.waves.current_wave,
        state.kills,
        state.boss_kills,
        state.score,
        audio.played
    );
}
