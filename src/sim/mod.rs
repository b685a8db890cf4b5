//! Simulation module
//!
//! All gameplay logic lives here. This module must stay host-agnostic:
//! - Fixed timestep only, every timer reads the sim clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod combat;
pub mod enemy;
pub mod entity;
pub mod player;
pub mod resource;
pub mod state;
pub mod tick;
pub mod wave;

pub use boss::{Boss, BossEffect, BossStats};
pub use collision::{
    ColliderKind, CollisionResult, StaticCollider, circle_overlap, contain_in_world, resolve_pair,
    resolve_static, resolve_world, village_layout,
};
pub use combat::{CombatEvent, CombatLog, deal_area_damage, enemy_attack, player_attack, targets_in_range};
pub use enemy::{AiState, AttackIntent, Enemy, EnemyStats, TargetView};
pub use entity::{Aabb, Body, EntityId, VisualHandle, VisualTransform};
pub use player::{CameraAngles, Inventory, Player, UpgradeKind, Upgrades};
pub use resource::{AmountRange, Drop, DropTable, ResourceItem, ResourceKind, boss_drops, roll_drops};
pub use state::{GameEvent, GamePhase, GameState, SimConfig};
pub use tick::{FrameClock, TickInput, tick};
pub use wave::{SpawnOrder, WaveConfig, WaveDirector, WaveEvent, WavePhase};
