//! Base entity state shared by the golem, enemies and dropped items
//!
//! A `Body` carries transform, physics, health and collision data. Owners
//! (player, enemy, resource) embed one and add their own behavior on top.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY, INVULNERABILITY_WINDOW};
use crate::horizontal_distance;

/// Unique entity identifier, allocated by `GameState::next_entity_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Opaque handle into the rendering layer. The core never reads it back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualHandle(pub Option<u32>);

/// World-space axis-aligned box used for coarse collision queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box of the given footprint radius and height standing on `base`
    pub fn standing(base: Vec3, radius: f32, height: f32) -> Self {
        Self {
            min: Vec3::new(base.x - radius, base.y, base.z - radius),
            max: Vec3::new(base.x + radius, base.y + height, base.z + radius),
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

/// Transform mirrored onto the visual handle every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// Base entity: transform, physics, health and collision state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: EntityId,
    pub position: Vec3,
    /// Euler angles (radians); only yaw (`y`) is driven by gameplay
    pub rotation: Vec3,
    pub scale: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub mass: f32,
    /// Per-tick velocity retention factor
    pub friction: f32,
    pub is_grounded: bool,
    pub max_health: f32,
    pub current_health: f32,
    pub is_dead: bool,
    pub is_invulnerable: bool,
    /// Remaining invulnerability (seconds)
    pub invulnerability_time: f32,
    pub collision_radius: f32,
    pub collision_height: f32,
    pub bounds: Aabb,
    #[serde(skip)]
    pub visual: VisualHandle,
}

impl Body {
    pub fn new(id: EntityId, position: Vec3) -> Self {
        let mut body = Self {
            id,
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            mass: 1.0,
            friction: 0.9,
            is_grounded: position.y <= 0.0,
            max_health: 100.0,
            current_health: 100.0,
            is_dead: false,
            is_invulnerable: false,
            invulnerability_time: 0.0,
            collision_radius: 1.0,
            collision_height: 2.0,
            bounds: Aabb::default(),
            visual: VisualHandle::default(),
        };
        body.update_bounds();
        body
    }

    /// Builder-style health setup (full health)
    pub fn with_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health.max(1.0);
        self.current_health = self.max_health;
        self
    }

    /// Builder-style collision footprint
    pub fn with_collision(mut self, radius: f32, height: f32) -> Self {
        self.collision_radius = radius;
        self.collision_height = height;
        self.update_bounds();
        self
    }

    /// Advance physics and timers. Dead bodies are frozen.
    pub fn update(&mut self, dt: f32) {
        if self.is_dead {
            return;
        }
        self.integrate(dt);
        self.tick_invulnerability(dt);
        self.update_bounds();
    }

    fn integrate(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.velocity *= self.friction;

        if !self.is_grounded {
            self.velocity.y -= GRAVITY * dt;
        }

        self.position += self.velocity * dt;

        // Ground plane
        if self.position.y <= 0.0 {
            self.position.y = 0.0;
            self.velocity.y = 0.0;
            self.is_grounded = true;
        } else {
            self.is_grounded = false;
        }

        self.acceleration = Vec3::ZERO;
    }

    fn tick_invulnerability(&mut self, dt: f32) {
        if self.is_invulnerable {
            self.invulnerability_time -= dt;
            if self.invulnerability_time <= 0.0 {
                self.is_invulnerable = false;
                self.invulnerability_time = 0.0;
            }
        }
    }

    /// Recompute the world-space bounding box
    pub fn update_bounds(&mut self) {
        self.bounds = Aabb::standing(self.position, self.collision_radius, self.collision_height);
    }

    /// Apply damage. Returns whether the hit landed.
    ///
    /// Rejected while dead or inside the invulnerability window. An accepted
    /// hit opens a fresh window, and a hit that empties health kills.
    pub fn take_damage(&mut self, amount: f32, source: Option<EntityId>) -> bool {
        if self.is_dead || self.is_invulnerable {
            return false;
        }

        self.current_health = (self.current_health - amount.max(0.0)).max(0.0);
        log::debug!(
            "Entity {} took {:.1} damage from {:?} ({:.1}/{:.1} HP)",
            self.id.0,
            amount,
            source.map(|s| s.0),
            self.current_health,
            self.max_health
        );

        self.is_invulnerable = true;
        self.invulnerability_time = INVULNERABILITY_WINDOW;

        if self.current_health <= 0.0 {
            self.die();
        }
        true
    }

    /// Heal up to max health. Returns the healing actually applied.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_dead || amount <= 0.0 {
            return 0.0;
        }
        let before = self.current_health;
        self.current_health = (self.current_health + amount).min(self.max_health);
        self.current_health - before
    }

    pub fn die(&mut self) {
        if self.is_dead {
            return;
        }
        self.is_dead = true;
        self.current_health = 0.0;
        self.velocity = Vec3::ZERO;
        log::debug!("Entity {} died", self.id.0);
    }

    /// Change max health, keeping current health within bounds
    pub fn set_max_health(&mut self, max_health: f32) {
        self.max_health = max_health.max(1.0);
        self.current_health = self.current_health.min(self.max_health);
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.current_health / self.max_health
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn distance_to(&self, other: Vec3) -> f32 {
        self.position.distance(other)
    }

    pub fn horizontal_distance_to(&self, other: Vec3) -> f32 {
        horizontal_distance(self.position, other)
    }

    /// Distance from `from` to this body's collision surface
    ///
    /// Every attack and detection range is measured with this, never center to center.
    pub fn reach_distance(&self, from: Vec3) -> f32 {
        (self.distance_to(from) - self.collision_radius).max(0.0)
    }

    /// Turn to face a point (yaw only)
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.x != 0.0 || dir.z != 0.0 {
            self.rotation.y = dir.x.atan2(dir.z);
        }
    }

    /// Unit vector the body is facing on the ground plane
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.rotation.y.sin(), 0.0, self.rotation.y.cos())
    }

    pub fn visual_transform(&self) -> VisualTransform {
        VisualTransform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}
