//! Game state and world registry
//!
//! All state that must be persisted for Continue lives here. Entity
//! collections are kept sorted by id for stable iteration.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{StaticCollider, village_layout};
use super::combat::CombatLog;
use super::enemy::{Enemy, TargetView};
use super::entity::{EntityId, VisualTransform};
use super::player::{Player, UpgradeKind};
use super::resource::{Drop, DropTable, ResourceItem, ResourceKind, boss_drops, roll_drops};
use super::wave::{SpawnOrder, WaveConfig, WaveDirector};
use super::boss::BossStats;
use crate::audio::SoundEffect;

/// Score for a regular kill
pub const KILL_SCORE: u64 = 10;
/// Score for a boss kill
pub const BOSS_KILL_SCORE: u64 = 100;
/// Score per wave number on completion
pub const WAVE_SCORE_PER_WAVE: u64 = 50;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// The golem fell
    GameOver,
}

/// Gameplay tunables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    pub waves: WaveConfig,
    pub drops: DropTable,
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound {
        effect: SoundEffect,
        position: Option<Vec3>,
    },
    WaveStarted {
        wave: u32,
        enemies: u32,
        boss_wave: bool,
    },
    WaveCompleted {
        wave: u32,
        reward: u32,
    },
    BossSpawned {
        id: EntityId,
        wave: u32,
    },
    BossEnraged {
        id: EntityId,
    },
    EnemyKilled {
        id: EntityId,
        boss: bool,
        position: Vec3,
    },
    PlayerDamaged {
        amount: f32,
        source: EntityId,
    },
    ResourceCollected {
        kind: ResourceKind,
        amount: u32,
    },
    ResourceExpired {
        id: EntityId,
    },
    UpgradePurchased {
        kind: UpgradeKind,
        level: u8,
    },
    Repaired,
    GameOver {
        score: u64,
        wave: u32,
    },
}

fn unseeded_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Rebuilt from seed and tick count after loading (see `reseed`)
    #[serde(skip, default = "unseeded_rng")]
    pub rng: Pcg32,
    /// Simulation clock (seconds)
    pub time: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub player: Player,
    /// Enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    /// Dropped items (sorted by id)
    pub resources: Vec<ResourceItem>,
    /// Buildings, trees and rocks
    pub statics: Vec<StaticCollider>,
    pub waves: WaveDirector,
    #[serde(skip)]
    pub combat_log: CombatLog,
    pub config: SimConfig,
    pub kills: u32,
    pub boss_kills: u32,
    pub score: u64,
    /// Events of the current frame (not persisted)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimConfig::default())
    }

    pub fn with_config(seed: u64, config: SimConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let statics = village_layout(&mut rng);

        let mut state = Self {
            seed,
            rng,
            time: 0.0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            player: Player::new(EntityId(0)),
            enemies: Vec::new(),
            resources: Vec::new(),
            statics,
            waves: WaveDirector::new(config.waves.clone()),
            combat_log: CombatLog::default(),
            config,
            kills: 0,
            boss_kills: 0,
            score: 0,
            events: Vec::new(),
            next_id: 1,
        };

        let id = state.next_entity_id();
        state.player = Player::new(id);
        log::info!("New game (seed {}), {} world colliders", seed, state.statics.len());
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Rebuild the RNG after deserialization
    pub fn reseed(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed ^ self.time_ticks.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn emit_sound(&mut self, effect: SoundEffect, position: Option<Vec3>) {
        self.events.push(GameEvent::Sound { effect, position });
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// What enemies see of the golem this tick
    pub fn player_view(&self) -> Option<TargetView> {
        let body = &self.player.body;
        if body.is_dead {
            return None;
        }
        Some(TargetView {
            id: body.id,
            position: body.position,
            radius: body.collision_radius,
            alive: true,
        })
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies
            .binary_search_by_key(&id, |e| e.id())
            .ok()
            .map(|i| &self.enemies[i])
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        match self.enemies.binary_search_by_key(&id, |e| e.id()) {
            Ok(i) => Some(&mut self.enemies[i]),
            Err(_) => None,
        }
    }

    /// The active boss, if one is alive
    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss() && !e.is_dead())
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead()).count()
    }

    /// Place a regular enemy from a wave spawn order
    pub fn spawn_enemy(&mut self, order: &SpawnOrder, wave: u32) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, order.position, order.stats.clone(), wave));
        id
    }

    pub fn spawn_boss(&mut self, position: Vec3, stats: &BossStats, wave: u32) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new_boss(id, position, stats, wave, self.time));
        log::info!("Boss spawned for wave {} ({:.0} HP)", wave, stats.base.max_health);
        id
    }

    fn spawn_drops(&mut self, origin: Vec3, drops: Vec<Drop>) {
        let lifetime = self.config.drops.item_lifetime;
        for drop in drops {
            let id = self.next_entity_id();
            self.resources
                .push(ResourceItem::new(id, drop.kind, drop.amount, origin + drop.offset, lifetime));
        }
    }

    /// Account for a dead enemy exactly once
    ///
    /// Counts the death against the wave, rolls drops (guaranteed for a boss)
    /// and awards score. Returns false if the enemy is alive, unknown, or was
    /// already counted.
    pub fn on_enemy_killed(&mut self, id: EntityId) -> bool {
        let Some(enemy) = self.enemy_mut(id) else {
            return false;
        };
        if !enemy.is_dead() || enemy.kill_counted {
            return false;
        }
        enemy.kill_counted = true;
        let position = enemy.body.position;
        let boss = enemy.is_boss();

        self.waves.on_enemy_defeated();

        let drops = if boss {
            boss_drops(&self.config.drops, &mut self.rng)
        } else {
            roll_drops(&self.config.drops, &mut self.rng)
        };
        log::debug!("Enemy {} defeated, {} drops", id.0, drops.len());
        self.spawn_drops(position, drops);

        self.kills += 1;
        if boss {
            self.boss_kills += 1;
            self.score += BOSS_KILL_SCORE;
            log::info!("Boss defeated");
        } else {
            self.score += KILL_SCORE;
        }

        self.events.push(GameEvent::EnemyKilled { id, boss, position });
        self.emit_sound(SoundEffect::EnemyDeath, Some(position));
        true
    }

    /// Start a fresh run in place. The golem is reset, not recreated.
    pub fn restart(&mut self) {
        self.player.reset();
        self.enemies.clear();
        self.resources.clear();
        self.waves.reset(self.time);
        self.combat_log.clear();
        self.kills = 0;
        self.boss_kills = 0;
        self.score = 0;
        self.phase = GamePhase::Playing;
        log::info!("Game restarted");
    }

    /// Transforms for every entity still in the world, for the rendering layer
    pub fn visual_transforms(&self) -> Vec<(EntityId, VisualTransform)> {
        let mut out = Vec::with_capacity(1 + self.enemies.len() + self.resources.len());
        out.push((self.player.id(), self.player.body.visual_transform()));
        out.extend(self.enemies.iter().map(|e| (e.id(), e.body.visual_transform())));
        out.extend(self.resources.iter().map(|r| (r.id(), r.body.visual_transform())));
        out
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id());
        self.resources.sort_by_key(|r| r.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyStats;
    use crate::sim::resource::AmountRange;

    fn kill(state: &mut GameState, id: EntityId) {
        if let Some(e) = state.enemy_mut(id) {
            e.body.die();
        }
    }

    #[test]
    fn test_new_state_layout() {
        let state = GameState::new(42);
        assert_eq!(state.player.id(), EntityId(1));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.statics.len(), 35);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = GameState::new(7);
        let b = GameState::new(7);
        for (x, y) in a.statics.iter().zip(&b.statics) {
            assert_eq!(x.position, y.position);
        }
    }

    #[test]
    fn test_kill_counted_once() {
        let mut state = GameState::new(1);
        let order = SpawnOrder {
            position: Vec3::new(5.0, 0.0, 0.0),
            stats: EnemyStats::default(),
        };
        let id = state.spawn_enemy(&order, 1);

        // Alive: not counted
        assert!(!state.on_enemy_killed(id));

        kill(&mut state, id);
        assert!(state.on_enemy_killed(id));
        assert!(!state.on_enemy_killed(id));
        assert_eq!(state.kills, 1);
        assert_eq!(state.score, KILL_SCORE);

        let killed = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(killed, 1);
    }

    #[test]
    fn test_boss_kill_drops_guaranteed_loot() {
        let mut state = GameState::new(2);
        let stats = state.config.waves.boss_stats(3);
        let id = state.spawn_boss(Vec3::ZERO, &stats, 3);
        kill(&mut state, id);

        assert!(state.on_enemy_killed(id));
        assert_eq!(state.score, BOSS_KILL_SCORE);
        assert!(state.resources.len() >= 27);
        assert!(state.resources.iter().all(|r| r.lifetime == 30.0));
    }

    #[test]
    fn test_drop_table_override() {
        let config = SimConfig {
            drops: DropTable {
                drop_chance: 1.0,
                iron: AmountRange::new(2, 2),
                bone_chance: 0.0,
                emerald_chance: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut state = GameState::with_config(3, config);
        let order = SpawnOrder {
            position: Vec3::ZERO,
            stats: EnemyStats::default(),
        };
        let id = state.spawn_enemy(&order, 1);
        kill(&mut state, id);
        state.on_enemy_killed(id);

        assert_eq!(state.resources.len(), 1);
        assert_eq!(state.resources[0].amount, 2);
        assert_eq!(state.resources[0].kind, ResourceKind::IronIngot);
    }

    #[test]
    fn test_restart_keeps_player_identity() {
        let mut state = GameState::new(4);
        let player_id = state.player.id();
        let order = SpawnOrder {
            position: Vec3::ZERO,
            stats: EnemyStats::default(),
        };
        state.spawn_enemy(&order, 1);
        state.score = 500;
        state.player.body.die();
        state.phase = GamePhase::GameOver;

        state.restart();
        assert_eq!(state.player.id(), player_id);
        assert!(!state.player.body.is_dead);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.statics.len(), 35);
    }

    #[test]
    fn test_visual_transforms_cover_world() {
        let mut state = GameState::new(5);
        let order = SpawnOrder {
            position: Vec3::new(3.0, 0.0, 4.0),
            stats: EnemyStats::default(),
        };
        let id = state.spawn_enemy(&order, 1);
        let transforms = state.visual_transforms();
        assert_eq!(transforms.len(), 2);
        assert_eq!(transforms[1].0, id);
        assert_eq!(transforms[1].1.position, Vec3::new(3.0, 0.0, 4.0));
    }

    #[test]
    fn test_player_view_hidden_when_dead() {
        let mut state = GameState::new(6);
        assert!(state.player_view().is_some());
        state.player.body.die();
        assert!(state.player_view().is_none());
    }

    #[test]
    fn test_serde_round_trip_then_reseed() {
        let mut state = GameState::new(8);
        state.time_ticks = 120;
        state.time = 2.0;
        let json = serde_json::to_string(&state).unwrap();
        let mut loaded: GameState = serde_json::from_str(&json).unwrap();
        loaded.reseed();
        assert_eq!(loaded.seed, 8);
        assert_eq!(loaded.time_ticks, 120);
        assert_eq!(loaded.player.id(), state.player.id());
        assert_eq!(loaded.statics.len(), state.statics.len());

        // Allocation continues after the saved counter
        assert_eq!(loaded.next_entity_id(), state.clone().next_entity_id());
    }
}
