//! The Iron Golem: the player-controlled defender
//!
//! Holds the resource inventory and upgrade levels. Every purchase checks
//! cap and balance before touching state, so rejected actions leave the
//! golem unchanged.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId};
use super::resource::ResourceKind;
use crate::consts::{JUMP_VELOCITY, MAX_CAMERA_PITCH, MOUSE_SENSITIVITY};

pub const BASE_MAX_HEALTH: f32 = 100.0;
pub const BASE_MOVE_SPEED: f32 = 4.0;
pub const BASE_ATTACK_DAMAGE: f32 = 25.0;
pub const BASE_ATTACK_RANGE: f32 = 3.0;
pub const BASE_ATTACK_COOLDOWN: f32 = 2.0;

/// Damage added per damage upgrade level
pub const DAMAGE_PER_LEVEL: f32 = 5.0;
/// Max health added per health upgrade level
pub const HEALTH_PER_LEVEL: f32 = 25.0;
/// Cooldown multiplier per attack speed level
pub const COOLDOWN_FACTOR_PER_LEVEL: f32 = 0.8;

/// Health repair: ingot cost and amount healed
pub const REPAIR_COST: u32 = 10;
pub const REPAIR_AMOUNT: f32 = 20.0;

/// Resource counters (never negative)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub iron_ingots: u32,
    pub bones: u32,
    pub emeralds: u32,
}

impl Inventory {
    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::IronIngot => self.iron_ingots,
            ResourceKind::Bone => self.bones,
            ResourceKind::Emerald => self.emeralds,
        }
    }

    fn slot(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::IronIngot => &mut self.iron_ingots,
            ResourceKind::Bone => &mut self.bones,
            ResourceKind::Emerald => &mut self.emeralds,
        }
    }

    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(amount);
    }

    pub fn has(&self, kind: ResourceKind, amount: u32) -> bool {
        self.get(kind) >= amount
    }

    /// Spend resources. Rejected (and unchanged) if the balance is short.
    pub fn spend(&mut self, kind: ResourceKind, amount: u32) -> bool {
        let slot = self.slot(kind);
        if *slot < amount {
            return false;
        }
        *slot -= amount;
        true
    }
}

/// Purchasable upgrade types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Damage,
    Health,
    AttackSpeed,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 3] = [UpgradeKind::Damage, UpgradeKind::Health, UpgradeKind::AttackSpeed];

    /// Highest level this upgrade can reach
    pub fn cap(&self) -> u8 {
        match self {
            UpgradeKind::Damage => 3,
            UpgradeKind::Health => 3,
            UpgradeKind::AttackSpeed => 2,
        }
    }

    /// Iron ingot cost of buying the next level from `level`
    pub fn cost(&self, level: u8) -> u32 {
        let level = level as u32;
        match self {
            UpgradeKind::Damage => 15 + level * 10,
            UpgradeKind::Health => 25 + level * 15,
            UpgradeKind::AttackSpeed => 20 + level * 15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Damage => "damage",
            UpgradeKind::Health => "health",
            UpgradeKind::AttackSpeed => "attack speed",
        }
    }
}

/// Upgrade levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub damage: u8,
    pub health: u8,
    pub attack_speed: u8,
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u8 {
        match kind {
            UpgradeKind::Damage => self.damage,
            UpgradeKind::Health => self.health,
            UpgradeKind::AttackSpeed => self.attack_speed,
        }
    }

    fn level_mut(&mut self, kind: UpgradeKind) -> &mut u8 {
        match kind {
            UpgradeKind::Damage => &mut self.damage,
            UpgradeKind::Health => &mut self.health,
            UpgradeKind::AttackSpeed => &mut self.attack_speed,
        }
    }

    pub fn at_cap(&self, kind: UpgradeKind) -> bool {
        self.level(kind) >= kind.cap()
    }

    /// Cost of the next level, or None at cap
    pub fn next_cost(&self, kind: UpgradeKind) -> Option<u32> {
        if self.at_cap(kind) {
            None
        } else {
            Some(kind.cost(self.level(kind)))
        }
    }
}

/// Third-person camera orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraAngles {
    pub yaw: f32,
    pub pitch: f32,
}

/// The player's golem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub move_speed: f32,
    pub base_damage: f32,
    pub attack_range: f32,
    /// Remaining cooldown (seconds); attacks are rejected while > 0
    pub attack_cooldown: f32,
    pub base_attack_cooldown: f32,
    pub camera: CameraAngles,
    pub inventory: Inventory,
    pub upgrades: Upgrades,
    /// Whether the golem moved this tick (footstep cues)
    #[serde(skip)]
    pub is_moving: bool,
    #[serde(skip)]
    walk_time: f32,
    #[serde(skip)]
    last_footstep: f32,
}

impl Player {
    pub fn new(id: EntityId) -> Self {
        Self {
            body: Self::fresh_body(id),
            move_speed: BASE_MOVE_SPEED,
            base_damage: BASE_ATTACK_DAMAGE,
            attack_range: BASE_ATTACK_RANGE,
            attack_cooldown: 0.0,
            base_attack_cooldown: BASE_ATTACK_COOLDOWN,
            camera: CameraAngles::default(),
            inventory: Inventory::default(),
            upgrades: Upgrades::default(),
            is_moving: false,
            walk_time: 0.0,
            last_footstep: 0.0,
        }
    }

    fn fresh_body(id: EntityId) -> Body {
        Body::new(id, Vec3::ZERO)
            .with_health(BASE_MAX_HEALTH)
            .with_collision(1.5, 4.0)
    }

    pub fn id(&self) -> EntityId {
        self.body.id
    }

    /// Damage per swing including upgrades
    pub fn damage(&self) -> f32 {
        self.base_damage + self.upgrades.damage as f32 * DAMAGE_PER_LEVEL
    }

    /// Full cooldown duration including upgrades
    pub fn attack_cooldown_duration(&self) -> f32 {
        self.base_attack_cooldown * COOLDOWN_FACTOR_PER_LEVEL.powi(self.upgrades.attack_speed as i32)
    }

    /// 0.0 = ready, 1.0 = just attacked
    pub fn cooldown_fraction(&self) -> f32 {
        let full = self.attack_cooldown_duration();
        if full <= 0.0 {
            0.0
        } else {
            (self.attack_cooldown / full).clamp(0.0, 1.0)
        }
    }

    pub fn can_attack(&self) -> bool {
        !self.body.is_dead && self.attack_cooldown <= 0.0
    }

    /// Advance one tick. `movement` is (strafe, forward) input in [-1, 1].
    ///
    /// Returns true when a footstep cue is due.
    pub fn update(&mut self, dt: f32, movement: Vec2) -> bool {
        self.body.update(dt);

        if self.attack_cooldown > 0.0 {
            self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        }

        if self.body.is_dead {
            self.is_moving = false;
            return false;
        }

        self.apply_movement(dt, movement);
        self.body.update_bounds();
        self.footstep_due(dt)
    }

    fn apply_movement(&mut self, dt: f32, movement: Vec2) {
        if movement.length_squared() < 1e-6 {
            self.is_moving = false;
            self.body.velocity.x = 0.0;
            self.body.velocity.z = 0.0;
            return;
        }

        // Camera-relative: forward input moves along -Z rotated by yaw
        let local = Vec3::new(movement.x, 0.0, -movement.y).normalize();
        let (sin, cos) = self.camera.yaw.sin_cos();
        let world = Vec3::new(
            local.x * cos + local.z * sin,
            0.0,
            -local.x * sin + local.z * cos,
        );

        self.body.position += world * self.move_speed * dt;
        self.body.rotation.y = world.x.atan2(world.z);
        self.is_moving = true;
    }

    fn footstep_due(&mut self, dt: f32) -> bool {
        if !self.is_moving {
            return false;
        }
        self.walk_time += dt * 4.0;
        if self.walk_time - self.last_footstep > 0.8 {
            self.last_footstep = self.walk_time;
            return true;
        }
        false
    }

    /// Jump if standing on the ground
    pub fn jump(&mut self) -> bool {
        if self.body.is_dead || !self.body.is_grounded {
            return false;
        }
        self.body.velocity.y = JUMP_VELOCITY;
        self.body.is_grounded = false;
        true
    }

    /// Apply a mouse delta to the camera
    pub fn rotate_camera(&mut self, delta: Vec2, sensitivity: f32, invert_y: bool) {
        let scale = MOUSE_SENSITIVITY * sensitivity;
        let dy = if invert_y { -delta.y } else { delta.y };
        self.camera.yaw -= delta.x * scale;
        self.camera.pitch = (self.camera.pitch - dy * scale).clamp(-MAX_CAMERA_PITCH, MAX_CAMERA_PITCH);
        self.body.rotation.y = self.camera.yaw;
    }

    /// Start an attack if off cooldown. Target resolution is done by combat.
    pub fn try_begin_attack(&mut self) -> bool {
        if !self.can_attack() {
            log::debug!("Golem attack rejected (cooldown {:.2}s)", self.attack_cooldown);
            return false;
        }
        self.attack_cooldown = self.attack_cooldown_duration();
        true
    }

    /// Buy the next level of an upgrade with iron ingots
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> bool {
        if self.body.is_dead {
            log::warn!("Cannot buy {} upgrade while destroyed", kind.as_str());
            return false;
        }
        let Some(cost) = self.upgrades.next_cost(kind) else {
            log::warn!("Upgrade {} is already at max level", kind.as_str());
            return false;
        };

        if !self.inventory.spend(ResourceKind::IronIngot, cost) {
            log::warn!("Not enough iron ingots for {} upgrade (need {})", kind.as_str(), cost);
            return false;
        }

        *self.upgrades.level_mut(kind) += 1;
        self.apply_upgrade(kind);
        log::info!("Purchased {} upgrade level {}", kind.as_str(), self.upgrades.level(kind));
        true
    }

    fn apply_upgrade(&mut self, kind: UpgradeKind) {
        if kind == UpgradeKind::Health {
            let old_max = self.body.max_health;
            let new_max = BASE_MAX_HEALTH + self.upgrades.health as f32 * HEALTH_PER_LEVEL;
            self.body.set_max_health(new_max);
            self.body.heal(new_max - old_max);
        }
    }

    /// Spend ingots to restore health. Rejected at full health.
    pub fn repair(&mut self) -> bool {
        if self.body.is_dead {
            return false;
        }
        if self.body.current_health >= self.body.max_health {
            log::warn!("Health is already full");
            return false;
        }
        if !self.inventory.spend(ResourceKind::IronIngot, REPAIR_COST) {
            log::warn!("Not enough iron ingots for repair (need {})", REPAIR_COST);
            return false;
        }
        let healed = self.body.heal(REPAIR_AMOUNT);
        log::info!("Repaired {:.0} HP", healed);
        true
    }

    /// Reset for a new run. The golem keeps its identity.
    pub fn reset(&mut self) {
        let id = self.body.id;
        let visual = self.body.visual;
        *self = Self::new(id);
        self.body.visual = visual;
        log::info!("Iron Golem reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golem() -> Player {
        Player::new(EntityId(1))
    }

    #[test]
    fn test_spend_rejects_overdraft() {
        let mut inv = Inventory::default();
        inv.add(ResourceKind::IronIngot, 5);
        assert!(!inv.spend(ResourceKind::IronIngot, 6));
        assert_eq!(inv.iron_ingots, 5);
        assert!(inv.spend(ResourceKind::IronIngot, 5));
        assert_eq!(inv.iron_ingots, 0);
        assert!(!inv.spend(ResourceKind::Emerald, 1));
    }

    #[test]
    fn test_upgrade_costs_escalate() {
        assert_eq!(UpgradeKind::Damage.cost(0), 15);
        assert_eq!(UpgradeKind::Damage.cost(2), 35);
        assert_eq!(UpgradeKind::Health.cost(1), 40);
        assert_eq!(UpgradeKind::AttackSpeed.cost(1), 35);
    }

    #[test]
    fn test_upgrade_never_exceeds_cap() {
        let mut g = golem();
        g.inventory.add(ResourceKind::IronIngot, 1000);

        assert!(g.purchase_upgrade(UpgradeKind::AttackSpeed));
        assert!(g.purchase_upgrade(UpgradeKind::AttackSpeed));
        let before = g.inventory.iron_ingots;
        assert!(!g.purchase_upgrade(UpgradeKind::AttackSpeed));
        assert_eq!(g.upgrades.attack_speed, 2);
        assert_eq!(g.inventory.iron_ingots, before);
    }

    #[test]
    fn test_unaffordable_upgrade_leaves_state() {
        let mut g = golem();
        g.inventory.add(ResourceKind::IronIngot, 14);
        assert!(!g.purchase_upgrade(UpgradeKind::Damage));
        assert_eq!(g.upgrades.damage, 0);
        assert_eq!(g.inventory.iron_ingots, 14);
    }

    #[test]
    fn test_destroyed_golem_cannot_upgrade() {
        let mut g = golem();
        g.inventory.add(ResourceKind::IronIngot, 100);
        g.body.die();
        assert!(!g.purchase_upgrade(UpgradeKind::Damage));
        assert_eq!(g.upgrades.damage, 0);
        assert_eq!(g.inventory.iron_ingots, 100);
    }

    #[test]
    fn test_damage_upgrade_adds_bonus() {
        let mut g = golem();
        g.inventory.add(ResourceKind::IronIngot, 15);
        assert!(g.purchase_upgrade(UpgradeKind::Damage));
        assert_eq!(g.damage(), 30.0);
    }

    #[test]
    fn test_health_upgrade_raises_max_and_heals_increase() {
        let mut g = golem();
        g.body.current_health = 60.0;
        g.inventory.add(ResourceKind::IronIngot, 25);
        assert!(g.purchase_upgrade(UpgradeKind::Health));
        assert_eq!(g.body.max_health, 125.0);
        assert_eq!(g.body.current_health, 85.0);
    }

    #[test]
    fn test_attack_cooldown_gates_attacks() {
        let mut g = golem();
        assert!(g.try_begin_attack());
        assert!(!g.try_begin_attack());
        assert!((g.cooldown_fraction() - 1.0).abs() < 1e-5);

        for _ in 0..121 {
            g.update(1.0 / 60.0, Vec2::ZERO);
        }
        assert!(g.can_attack());
        assert!(g.try_begin_attack());
    }

    #[test]
    fn test_attack_speed_shortens_cooldown() {
        let mut g = golem();
        g.upgrades.attack_speed = 2;
        assert!((g.attack_cooldown_duration() - 1.28).abs() < 1e-4);
    }

    #[test]
    fn test_repair_requires_damage_and_ingots() {
        let mut g = golem();
        g.inventory.add(ResourceKind::IronIngot, 20);
        assert!(!g.repair()); // full health

        g.body.current_health = 50.0;
        assert!(g.repair());
        assert_eq!(g.body.current_health, 70.0);
        assert_eq!(g.inventory.iron_ingots, 10);
    }

    #[test]
    fn test_movement_is_camera_relative() {
        let mut g = golem();
        g.update(1.0, Vec2::new(0.0, 1.0));
        assert!(g.body.position.z < -3.9);

        let mut g = golem();
        g.camera.yaw = std::f32::consts::FRAC_PI_2;
        g.update(1.0, Vec2::new(0.0, 1.0));
        assert!(g.body.position.x < -3.9, "pos {:?}", g.body.position);
    }

    #[test]
    fn test_camera_pitch_is_clamped() {
        let mut g = golem();
        g.rotate_camera(Vec2::new(0.0, -10_000.0), 1.0, false);
        assert!((g.camera.pitch - MAX_CAMERA_PITCH).abs() < 1e-5);
        g.rotate_camera(Vec2::new(0.0, 10_000.0), 1.0, true);
        assert!((g.camera.pitch - MAX_CAMERA_PITCH).abs() < 1e-5);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut g = golem();
        assert!(g.jump());
        assert!(!g.jump());
    }

    #[test]
    fn test_reset_restores_start_state() {
        let mut g = golem();
        g.inventory.add(ResourceKind::Bone, 3);
        g.upgrades.damage = 2;
        g.body.position = Vec3::new(5.0, 0.0, 5.0);
        g.body.die();

        g.reset();
        assert_eq!(g.id(), EntityId(1));
        assert_eq!(g.inventory, Inventory::default());
        assert_eq!(g.upgrades, Upgrades::default());
        assert!(!g.body.is_dead);
        assert_eq!(g.body.current_health, BASE_MAX_HEALTH);
        assert_eq!(g.body.position, Vec3::ZERO);
    }
}
