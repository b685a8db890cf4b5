//! Dropped resources: rolling drop tables, floating pickups, collection
//!
//! Items age on the sim clock and expire after their lifetime. An expired or
//! collected item never grants anything.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId};
use crate::random_scatter;

/// Kinds of collectible resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Primary currency for upgrades and repairs
    IronIngot,
    /// Secondary resource
    Bone,
    /// Rare resource
    Emerald,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::IronIngot => "iron ingot",
            ResourceKind::Bone => "bone",
            ResourceKind::Emerald => "emerald",
        }
    }
}

/// Inclusive amount range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }
}

/// Drop probabilities and amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropTable {
    /// Chance a regular enemy drops anything at all
    pub drop_chance: f64,
    pub iron: AmountRange,
    pub bone_chance: f64,
    pub emerald_chance: f64,
    /// Half-width of the scatter square around the death point
    pub scatter: f32,
    pub boss_iron: AmountRange,
    pub boss_bones: AmountRange,
    pub boss_emeralds: AmountRange,
    pub boss_iron_scatter: f32,
    pub boss_bone_scatter: f32,
    pub boss_emerald_scatter: f32,
    /// Seconds before an uncollected item disappears
    pub item_lifetime: f32,
    /// Horizontal pickup distance
    pub collection_radius: f32,
}

impl Default for DropTable {
    fn default() -> Self {
        Self {
            drop_chance: 0.8,
            iron: AmountRange::new(1, 3),
            bone_chance: 0.3,
            emerald_chance: 0.05,
            scatter: 1.0,
            boss_iron: AmountRange::new(20, 30),
            boss_bones: AmountRange::new(5, 8),
            boss_emeralds: AmountRange::new(2, 3),
            boss_iron_scatter: 2.5,
            boss_bone_scatter: 2.0,
            boss_emerald_scatter: 1.5,
            item_lifetime: 30.0,
            collection_radius: 2.0,
        }
    }
}

/// One item to place in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drop {
    pub kind: ResourceKind,
    pub amount: u32,
    /// Offset from the death point
    pub offset: Vec3,
}

/// Roll a regular enemy's drops
pub fn roll_drops<R: Rng + ?Sized>(table: &DropTable, rng: &mut R) -> Vec<Drop> {
    let mut drops = Vec::new();
    if !rng.random_bool(table.drop_chance.clamp(0.0, 1.0)) {
        return drops;
    }

    drops.push(Drop {
        kind: ResourceKind::IronIngot,
        amount: table.iron.roll(rng),
        offset: random_scatter(rng, table.scatter),
    });

    if rng.random_bool(table.bone_chance.clamp(0.0, 1.0)) {
        drops.push(Drop {
            kind: ResourceKind::Bone,
            amount: 1,
            offset: random_scatter(rng, table.scatter),
        });
    }

    if rng.random_bool(table.emerald_chance.clamp(0.0, 1.0)) {
        drops.push(Drop {
            kind: ResourceKind::Emerald,
            amount: 1,
            offset: random_scatter(rng, table.scatter),
        });
    }

    drops
}

/// Roll a boss's guaranteed drops, one unit per item
pub fn boss_drops<R: Rng + ?Sized>(table: &DropTable, rng: &mut R) -> Vec<Drop> {
    let mut drops = Vec::new();
    let groups = [
        (ResourceKind::IronIngot, table.boss_iron, table.boss_iron_scatter),
        (ResourceKind::Bone, table.boss_bones, table.boss_bone_scatter),
        (ResourceKind::Emerald, table.boss_emeralds, table.boss_emerald_scatter),
    ];
    for (kind, range, scatter) in groups {
        for _ in 0..range.roll(rng) {
            drops.push(Drop {
                kind,
                amount: 1,
                offset: random_scatter(rng, scatter),
            });
        }
    }
    drops
}

const FLOAT_SPEED: f32 = 2.0;
const FLOAT_HEIGHT: f32 = 0.3;
const SPIN_SPEED: f32 = 1.0;
/// Resting height of a dropped item above the ground
const BASE_HEIGHT: f32 = 0.5;

/// A collectible item lying in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceItem {
    pub body: Body,
    pub kind: ResourceKind,
    pub amount: u32,
    pub base_y: f32,
    pub float_speed: f32,
    pub float_height: f32,
    pub spin_speed: f32,
    /// Seconds since the item dropped
    pub age: f32,
    pub lifetime: f32,
    pub expired: bool,
    pub collected: bool,
}

impl ResourceItem {
    pub fn new(id: EntityId, kind: ResourceKind, amount: u32, position: Vec3, lifetime: f32) -> Self {
        let position = Vec3::new(position.x, BASE_HEIGHT, position.z);
        Self {
            body: Body::new(id, position).with_collision(0.5, 1.0),
            kind,
            amount,
            base_y: BASE_HEIGHT,
            float_speed: FLOAT_SPEED,
            float_height: FLOAT_HEIGHT,
            spin_speed: SPIN_SPEED,
            age: 0.0,
            lifetime,
            expired: false,
            collected: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.body.id
    }

    /// Whether the item can still be picked up
    pub fn is_available(&self) -> bool {
        !self.expired && !self.collected
    }

    /// Whether the item should be removed from the world
    pub fn is_finished(&self) -> bool {
        self.expired || self.collected
    }

    /// Age the item and animate it. Returns true on the tick it expires.
    ///
    /// Items float on their own animation, so the body is not integrated.
    pub fn update(&mut self, dt: f32, now: f64) -> bool {
        if self.is_finished() {
            return false;
        }

        self.age += dt;
        if self.age >= self.lifetime {
            self.expired = true;
            log::debug!("{} item {} expired", self.kind.as_str(), self.id().0);
            return true;
        }

        self.body.position.y = self.base_y + ((now as f32) * self.float_speed).sin() * self.float_height;
        self.body.rotation.y += self.spin_speed * dt;
        self.body.update_bounds();
        false
    }

    /// Collect the item if the collector is within `radius` (ground distance)
    pub fn try_collect(&mut self, collector: Vec3, radius: f32) -> Option<(ResourceKind, u32)> {
        if !self.is_available() {
            return None;
        }
        if self.body.horizontal_distance_to(collector) > radius {
            return None;
        }
        self.collected = true;
        Some((self.kind, self.amount))
    }
}
