//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world one step at a time.

use glam::{Vec2, Vec3};

use super::collision::resolve_world;
use super::combat::{enemy_attack, player_attack};
use super::player::{REPAIR_COST, UpgradeKind};
use super::resource::ResourceKind;
use super::state::{GameEvent, GamePhase, GameState, WAVE_SCORE_PER_WAVE};
use super::wave::WaveEvent;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::ground;

/// Input commands for a single tick
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Strafe (x) and forward (y) in [-1, 1], camera-relative
    pub movement: Vec2,
    /// Mouse delta since the last tick (pixels)
    pub look_delta: Vec2,
    /// Look sensitivity multiplier from settings
    pub look_sensitivity: f32,
    pub invert_y: bool,
    pub attack: bool,
    pub jump: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start over after game over
    pub restart: bool,
    pub purchase: Option<UpgradeKind>,
    pub repair: bool,
    /// Idle/demo mode - AI plays the golem
    pub idle_mode: bool,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            movement: Vec2::ZERO,
            look_delta: Vec2::ZERO,
            look_sensitivity: 1.0,
            invert_y: false,
            attack: false,
            jump: false,
            pause: false,
            restart: false,
            purchase: None,
            repair: false,
            idle_mode: false,
        }
    }
}

impl TickInput {
    /// Clear one-shot inputs after a tick consumed them
    pub fn clear_one_shots(&mut self) {
        self.look_delta = Vec2::ZERO;
        self.attack = false;
        self.jump = false;
        self.pause = false;
        self.restart = false;
        self.purchase = None;
        self.repair = false;
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            GamePhase::GameOver => {}
        }
    }

    if input.restart && state.phase == GamePhase::GameOver {
        state.restart();
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time += dt as f64;
    state.time_ticks += 1;
    let now = state.time;

    let input = if input.idle_mode {
        autopilot(state, input)
    } else {
        input.clone()
    };

    apply_input(state, &input);

    // Golem movement and physics
    if state.player.update(dt, input.movement) {
        let position = state.player.body.position;
        state.emit_sound(SoundEffect::Footstep, Some(position));
    }

    resolve_world(&mut state.player.body, &mut state.enemies, &state.statics, &mut state.rng);

    if input.attack {
        player_attack(state);
    }

    update_waves(state, now);
    update_resources(state, dt, now);
    update_enemies(state, dt, now);

    if state.player.body.is_dead {
        state.phase = GamePhase::GameOver;
        let wave = state.waves.current_wave;
        log::info!("Game over: wave {}, score {}", wave, state.score);
        state.events.push(GameEvent::GameOver {
            score: state.score,
            wave,
        });
        state.emit_sound(SoundEffect::GameOver, None);
    }

    state.normalize_order();
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    if input.look_delta != Vec2::ZERO {
        state
            .player
            .rotate_camera(input.look_delta, input.look_sensitivity, input.invert_y);
    }

    if input.jump && state.player.jump() {
        let position = state.player.body.position;
        state.emit_sound(SoundEffect::Jump, Some(position));
    }

    if let Some(kind) = input.purchase {
        if state.player.purchase_upgrade(kind) {
            let level = state.player.upgrades.level(kind);
            state.events.push(GameEvent::UpgradePurchased { kind, level });
            state.emit_sound(SoundEffect::Purchase, None);
        }
    }

    if input.repair && state.player.repair() {
        state.events.push(GameEvent::Repaired);
        state.emit_sound(SoundEffect::Purchase, None);
    }
}

/// Materialize the director's events into the world
fn update_waves(state: &mut GameState, now: f64) {
    let events = state.waves.update(now, &mut state.rng);

    for event in events {
        match event {
            WaveEvent::Started {
                wave,
                boss_wave,
                spawns,
            } => {
                for order in &spawns {
                    state.spawn_enemy(order, wave);
                }
                state.events.push(GameEvent::WaveStarted {
                    wave,
                    enemies: spawns.len() as u32,
                    boss_wave,
                });
                state.emit_sound(SoundEffect::WaveStart, None);
            }
            WaveEvent::BossSpawned {
                wave,
                position,
                stats,
            } => {
                let id = state.spawn_boss(position, &stats, wave);
                state.events.push(GameEvent::BossSpawned { id, wave });
                state.emit_sound(SoundEffect::BossSpawn, Some(position));
            }
            WaveEvent::Completed { wave, reward, .. } => {
                state.player.inventory.add(ResourceKind::IronIngot, reward);
                state.score += WAVE_SCORE_PER_WAVE * wave as u64;
                state.events.push(GameEvent::WaveCompleted { wave, reward });
                state.emit_sound(SoundEffect::WaveComplete, None);
            }
        }
    }
}

/// Age items, collect what the golem touches, drop what is finished
fn update_resources(state: &mut GameState, dt: f32, now: f64) {
    let collector = state.player.body.position;
    let can_collect = !state.player.body.is_dead;
    let radius = state.config.drops.collection_radius;

    for i in 0..state.resources.len() {
        let item = &mut state.resources[i];
        if item.update(dt, now) {
            let id = item.id();
            state.events.push(GameEvent::ResourceExpired { id });
            continue;
        }
        if !can_collect {
            continue;
        }
        if let Some((kind, amount)) = item.try_collect(collector, radius) {
            let position = item.body.position;
            state.player.inventory.add(kind, amount);
            log::debug!("Collected {} {}", amount, kind.as_str());
            state.events.push(GameEvent::ResourceCollected { kind, amount });
            state.emit_sound(SoundEffect::ResourceCollect, Some(position));
        }
    }

    state.resources.retain(|r| !r.is_finished());
}

/// Enemy timers, boss behavior, AI and attacks, then death bookkeeping
fn update_enemies(state: &mut GameState, dt: f32, now: f64) {
    let mut intents = Vec::new();

    for i in 0..state.enemies.len() {
        let effect = state.enemies[i].update(dt, now);
        if effect.enraged {
            let id = state.enemies[i].id();
            let position = state.enemies[i].body.position;
            state.events.push(GameEvent::BossEnraged { id });
            state.emit_sound(SoundEffect::BossRage, Some(position));
        }

        let view = state.player_view();
        if let Some(intent) = state.enemies[i].think(view, dt, now, &mut state.rng) {
            intents.push(intent);
        }
    }

    for intent in intents {
        if enemy_attack(state, intent) {
            log::debug!("Enemy {} hit the golem for {:.1}", intent.attacker.0, intent.damage);
        }
    }

    // Any death not yet routed through the kill path
    let uncounted: Vec<_> = state
        .enemies
        .iter()
        .filter(|e| e.is_dead() && !e.kill_counted)
        .map(|e| e.id())
        .collect();
    for id in uncounted {
        state.on_enemy_killed(id);
    }

    state.enemies.retain(|e| !e.removal_due());
}

/// Demo AI for the golem: fight the nearest enemy, else gather loot
fn autopilot(state: &GameState, base: &TickInput) -> TickInput {
    let mut input = base.clone();
    let player = &state.player;
    let position = player.body.position;

    let nearest_enemy = state
        .enemies
        .iter()
        .filter(|e| !e.is_dead())
        .min_by(|a, b| {
            a.body
                .distance_to(position)
                .partial_cmp(&b.body.distance_to(position))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let nearest_item = state
        .resources
        .iter()
        .filter(|r| r.is_available())
        .min_by(|a, b| {
            a.body
                .horizontal_distance_to(position)
                .partial_cmp(&b.body.horizontal_distance_to(position))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let destination = match (nearest_enemy, nearest_item) {
        (Some(enemy), _) => {
            let distance = enemy.body.reach_distance(position);
            if distance <= player.attack_range {
                input.attack = player.can_attack();
                None
            } else {
                Some(enemy.body.position)
            }
        }
        (None, Some(item)) => Some(item.body.position),
        (None, None) => None,
    };

    input.movement = destination
        .map(|target| camera_relative(target - position, player.camera.yaw))
        .unwrap_or(Vec2::ZERO);

    if player.body.health_fraction() < 0.5 && player.inventory.has(ResourceKind::IronIngot, REPAIR_COST) {
        input.repair = true;
    } else {
        input.purchase = UpgradeKind::ALL
            .into_iter()
            .find(|kind| {
                player
                    .upgrades
                    .next_cost(*kind)
                    .is_some_and(|cost| player.inventory.has(ResourceKind::IronIngot, cost))
            });
    }

    input
}

/// Convert a world direction into (strafe, forward) input for a camera yaw
fn camera_relative(direction: Vec3, yaw: f32) -> Vec2 {
    let flat = ground(direction).normalize_or_zero();
    let (sin, cos) = yaw.sin_cos();
    let local_x = flat.x * cos - flat.y * sin;
    let local_z = flat.x * sin + flat.y * cos;
    Vec2::new(local_x, -local_z)
}

/// Fixed-step driver: accumulates frame time and runs whole ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many fixed ticks as the frame allows. Returns the tick count.
    ///
    /// One-shot inputs are cleared after the first tick that sees them.
    pub fn advance(&mut self, state: &mut GameState, input: &mut TickInput, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            input.clear_one_shots();
        }
        substeps
    }

    /// Fraction of a tick left over, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyStats;
    use crate::sim::wave::SpawnOrder;

    fn run(state: &mut GameState, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            tick(state, input, SIM_DT);
        }
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(12345);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, 1);

        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.time_ticks, 1);

        // Paused ticks do nothing
        run(&mut state, &TickInput::default(), 10);
        assert_eq!(state.time_ticks, 1);

        // Unpause
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_first_wave_spawns_on_schedule() {
        let mut state = GameState::new(1);
        run(&mut state, &TickInput::default(), 5 * 60 - 2);
        assert!(state.enemies.is_empty());

        run(&mut state, &TickInput::default(), 4);
        assert_eq!(state.enemies.len(), 7);
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::WaveStarted { wave: 1, enemies: 7, .. })));
    }

    #[test]
    fn test_enemy_reaches_and_hurts_golem() {
        let mut state = GameState::new(2);
        state.statics.clear();
        let order = SpawnOrder {
            position: Vec3::new(6.0, 0.0, 0.0),
            stats: EnemyStats::default(),
        };
        state.spawn_enemy(&order, 1);

        run(&mut state, &TickInput::default(), 4 * 60);
        assert!(state.player.body.current_health < 100.0);
    }

    #[test]
    fn test_collecting_resource_adds_exact_amount() {
        let mut state = GameState::new(3);
        let id = state.next_entity_id();
        state.resources.push(crate::sim::ResourceItem::new(
            id,
            ResourceKind::Emerald,
            2,
            Vec3::new(1.0, 0.0, 0.0),
            30.0,
        ));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.player.inventory.emeralds, 2);
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_game_over_and_restart() {
        let mut state = GameState::new(4);
        state.player.body.current_health = 1.0;
        state.player.body.take_damage(5.0, None);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        let before = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, before);

        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.player.body.is_dead);
    }

    #[test]
    fn test_camera_relative_round_trip() {
        for yaw in [0.0f32, 0.7, -2.1, 3.0] {
            let dir = Vec3::new(0.6, 0.0, -0.8);
            let input = camera_relative(dir, yaw);

            let mut g = crate::sim::Player::new(crate::sim::EntityId(1));
            g.camera.yaw = yaw;
            g.update(1.0, input);
            let moved = g.body.position.normalize();
            assert!(moved.distance(dir) < 1e-3, "yaw {} moved {:?}", yaw, moved);
        }
    }

    #[test]
    fn test_frame_clock_caps_substeps() {
        let mut state = GameState::new(5);
        let mut clock = FrameClock::new();
        let mut input = TickInput {
            jump: true,
            ..Default::default()
        };

        // A long stall still runs at most the cap
        let steps = clock.advance(&mut state, &mut input, 1.0);
        assert!(steps <= MAX_SUBSTEPS);
        assert_eq!(steps, 2);
        assert!(!input.jump);

        // Short frames accumulate
        assert_eq!(clock.advance(&mut state, &mut input, SIM_DT * 0.5), 0);
        assert_eq!(clock.advance(&mut state, &mut input, SIM_DT * 0.6), 1);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        run(&mut state1, &input, 20 * 60);
        run(&mut state2, &input, 20 * 60);

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.player.body.position, state2.player.body.position);
    }
}
