//! Read-only HUD snapshots
//!
//! The HUD layer never touches `GameState` directly. It receives one
//! `HudSnapshot` per frame.

use glam::Vec3;
use serde::Serialize;

use crate::sim::{EntityId, GamePhase, GameState, UpgradeKind, WavePhase};

/// Wave banner state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum WaveStatus {
    /// Before the first wave
    Countdown { seconds: f32 },
    InProgress { remaining: u32 },
    BossFight { boss_health_fraction: f32 },
    /// Between waves
    Complete { next_wave_in: f32 },
}

/// One row of the upgrade shop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpgradeRow {
    pub kind: UpgradeKind,
    pub level: u8,
    pub cap: u8,
    /// None once capped
    pub next_cost: Option<u32>,
    pub affordable: bool,
}

/// Floating health bar over a damaged enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthBar {
    pub id: EntityId,
    pub position: Vec3,
    pub fraction: f32,
    pub boss: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub health: f32,
    pub max_health: f32,
    pub iron_ingots: u32,
    pub bones: u32,
    pub emeralds: u32,
    pub wave: u32,
    pub wave_status: WaveStatus,
    /// 0 = ready, 1 = just swung
    pub cooldown_fraction: f32,
    pub upgrades: [UpgradeRow; 3],
    pub can_repair: bool,
    pub enemies_alive: usize,
    pub health_bars: Vec<HealthBar>,
    pub score: u64,
    pub kills: u32,
    pub phase: GamePhase,
}

impl WaveStatus {
    fn from_state(state: &GameState) -> Self {
        match state.waves.status(state.time) {
            WavePhase::Preparing { seconds } => WaveStatus::Countdown { seconds },
            WavePhase::InProgress { remaining } => WaveStatus::InProgress { remaining },
            WavePhase::BossFight => WaveStatus::BossFight {
                boss_health_fraction: state.boss().map_or(0.0, |b| b.body.health_fraction()),
            },
            WavePhase::Complete { next_wave_in } => WaveStatus::Complete { next_wave_in },
        }
    }
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let player = &state.player;
        let inventory = &player.inventory;

        let upgrades = UpgradeKind::ALL.map(|kind| {
            let next_cost = player.upgrades.next_cost(kind);
            UpgradeRow {
                kind,
                level: player.upgrades.level(kind),
                cap: kind.cap(),
                next_cost,
                affordable: next_cost.is_some_and(|cost| inventory.iron_ingots >= cost),
            }
        });

        let health_bars = state
            .enemies
            .iter()
            .filter(|e| !e.is_dead() && e.body.health_fraction() < 1.0)
            .map(|e| HealthBar {
                id: e.id(),
                position: e.body.position,
                fraction: e.body.health_fraction(),
                boss: e.is_boss(),
            })
            .collect();

        Self {
            health: player.body.current_health,
            max_health: player.body.max_health,
            iron_ingots: inventory.iron_ingots,
            bones: inventory.bones,
            emeralds: inventory.emeralds,
            wave: state.waves.current_wave,
            wave_status: WaveStatus::from_state(state),
            cooldown_fraction: player.cooldown_fraction(),
            upgrades,
            can_repair: !player.body.is_dead
                && player.body.current_health < player.body.max_health
                && inventory.iron_ingots >= crate::sim::player::REPAIR_COST,
            enemies_alive: state.live_enemy_count(),
            health_bars,
            score: state.score,
            kills: state.kills,
            phase: state.phase,
        }
    }

    /// Banner text for the wave indicator
    pub fn wave_label(&self) -> String {
        match self.wave_status {
            WaveStatus::Countdown { seconds } => format!("First wave in {:.0}s", seconds.ceil()),
            WaveStatus::InProgress { remaining } => format!("Wave {}: {} left", self.wave, remaining),
            WaveStatus::BossFight { boss_health_fraction } => {
                format!("Wave {}: BOSS {:.0}%", self.wave, boss_health_fraction * 100.0)
            }
            WaveStatus::Complete { next_wave_in } => {
                format!("Wave {} cleared, next in {:.0}s", self.wave, next_wave_in.ceil())
            }
        }
    }
}
