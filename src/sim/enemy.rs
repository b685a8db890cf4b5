//! Enemy AI: a three-state machine over distance to the target
//!
//! idle -> chasing when the target is within detection range,
//! chasing -> attacking inside attack range, chasing -> idle past 1.5x
//! detection range, attacking -> chasing when the target steps out of range.
//! Death is the body flag, not a state. Targets are held by id and resolved
//! by the tick every frame.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, BossEffect, BossStats};
use super::entity::{Body, EntityId};
use crate::consts::{
    BOSS_REMOVAL_DELAY, CHASE_GIVE_UP_FACTOR, ENEMY_REMOVAL_DELAY, STUCK_MOVE_THRESHOLD,
    STUCK_TIME_LIMIT, UNSTUCK_DISTANCE,
};
use crate::random_ground_direction;

/// AI state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Idle,
    Chasing,
    Attacking,
}

/// Combat and movement stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyStats {
    pub max_health: f32,
    pub damage: f32,
    pub move_speed: f32,
    pub attack_range: f32,
    pub detection_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    pub collision_radius: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            max_health: 20.0,
            damage: 10.0,
            move_speed: 2.0,
            attack_range: 2.0,
            detection_range: 15.0,
            attack_cooldown: 1.5,
            collision_radius: 1.0,
        }
    }
}

/// What the tick resolved for a candidate target this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub id: EntityId,
    pub position: Vec3,
    /// Collision radius; ranges are measured to the target's surface
    pub radius: f32,
    pub alive: bool,
}

impl TargetView {
    fn distance_from(&self, point: Vec3) -> f32 {
        (self.position.distance(point) - self.radius).max(0.0)
    }
}

/// An attack the enemy wants to land this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackIntent {
    pub attacker: EntityId,
    pub target: EntityId,
    pub damage: f32,
    pub range: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub stats: EnemyStats,
    pub state: AiState,
    /// Sim time of the last landed attack
    pub last_attack_at: Option<f64>,
    pub target: Option<EntityId>,
    pub stuck_timer: f32,
    pub last_position: Vec3,
    /// Seconds since death
    pub death_timer: f32,
    /// Set once this death has been scored and counted by the wave
    pub kill_counted: bool,
    /// Wave that spawned this enemy
    pub wave: u32,
    pub boss: Option<Boss>,
}

impl Enemy {
    pub fn new(id: EntityId, position: Vec3, stats: EnemyStats, wave: u32) -> Self {
        let body = Body::new(id, position)
            .with_health(stats.max_health)
            .with_collision(stats.collision_radius, 2.0);
        Self {
            body,
            stats,
            state: AiState::Idle,
            last_attack_at: None,
            target: None,
            stuck_timer: 0.0,
            last_position: position,
            death_timer: 0.0,
            kill_counted: false,
            wave,
            boss: None,
        }
    }

    pub fn new_boss(id: EntityId, position: Vec3, stats: &BossStats, wave: u32, now: f64) -> Self {
        let mut enemy = Self::new(id, position, stats.base.clone(), wave);
        enemy.body.scale = Vec3::splat(2.0);
        enemy.body.collision_height = 4.0;
        enemy.body.update_bounds();
        enemy.boss = Some(Boss::new(stats, now));
        enemy
    }

    pub fn id(&self) -> EntityId {
        self.body.id
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.body.is_dead
    }

    /// Dead long enough to be removed from the world
    pub fn removal_due(&self) -> bool {
        let delay = if self.is_boss() {
            BOSS_REMOVAL_DELAY
        } else {
            ENEMY_REMOVAL_DELAY
        };
        self.body.is_dead && self.death_timer >= delay
    }

    pub fn can_attack(&self, now: f64) -> bool {
        match self.last_attack_at {
            None => true,
            Some(at) => now - at >= self.stats.attack_cooldown as f64,
        }
    }

    /// Physics and timers. Dead enemies only advance their removal timer.
    pub fn update(&mut self, dt: f32, now: f64) -> BossEffect {
        if self.body.is_dead {
            self.death_timer += dt;
            return BossEffect::default();
        }
        self.body.update(dt);

        match self.boss.as_mut() {
            Some(boss) => boss.update(&mut self.body, &mut self.stats, now),
            None => BossEffect::default(),
        }
    }

    /// Run one AI step against the resolved candidate target
    ///
    /// `candidate` is `None` when no valid target exists (e.g. the golem is
    /// dead). Returns an attack intent when an attack lands this tick.
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        candidate: Option<TargetView>,
        dt: f32,
        now: f64,
        rng: &mut R,
    ) -> Option<AttackIntent> {
        if self.body.is_dead {
            return None;
        }

        let target = self.resolve_target(candidate);
        let intent = match target {
            None => {
                self.state = AiState::Idle;
                None
            }
            Some(view) => self.step_state(view, dt, now),
        };

        self.check_if_stuck(dt, rng);
        intent
    }

    fn resolve_target(&mut self, candidate: Option<TargetView>) -> Option<TargetView> {
        let live = candidate.filter(|c| c.alive);

        if let Some(id) = self.target {
            match live.filter(|c| c.id == id) {
                Some(view) => return Some(view),
                None => {
                    log::debug!("Enemy {} lost target {}", self.id().0, id.0);
                    self.target = None;
                }
            }
        }

        let view = live?;
        if view.distance_from(self.body.position) <= self.stats.detection_range {
            self.target = Some(view.id);
            Some(view)
        } else {
            None
        }
    }

    fn step_state(&mut self, view: TargetView, dt: f32, now: f64) -> Option<AttackIntent> {
        let distance = view.distance_from(self.body.position);

        match self.state {
            AiState::Idle => {
                if distance <= self.stats.detection_range {
                    self.state = AiState::Chasing;
                }
                None
            }
            AiState::Chasing => {
                if distance <= self.stats.attack_range {
                    self.state = AiState::Attacking;
                } else if distance > self.stats.detection_range * CHASE_GIVE_UP_FACTOR {
                    self.state = AiState::Idle;
                } else {
                    self.move_towards(view.position, dt);
                }
                None
            }
            AiState::Attacking => {
                if distance > self.stats.attack_range {
                    self.state = AiState::Chasing;
                    None
                } else {
                    self.try_attack(view, now)
                }
            }
        }
    }

    fn move_towards(&mut self, target: Vec3, dt: f32) {
        let mut direction = target - self.body.position;
        direction.y = 0.0;
        let direction = direction.normalize_or_zero();

        self.body.position += direction * self.stats.move_speed * dt;
        self.body.look_at(target);
    }

    fn try_attack(&mut self, view: TargetView, now: f64) -> Option<AttackIntent> {
        if !self.can_attack(now) {
            return None;
        }
        self.last_attack_at = Some(now);
        self.body.look_at(view.position);
        Some(AttackIntent {
            attacker: self.id(),
            target: view.id,
            damage: self.stats.damage,
            range: self.stats.attack_range,
        })
    }

    /// Stalled progress while chasing accumulates; past the limit the enemy
    /// is nudged in a random direction.
    fn check_if_stuck<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        let moved = self.body.position.distance(self.last_position);

        if self.state == AiState::Chasing && moved < STUCK_MOVE_THRESHOLD * dt {
            self.stuck_timer += dt;
            if self.stuck_timer > STUCK_TIME_LIMIT {
                self.body.position += random_ground_direction(rng) * UNSTUCK_DISTANCE;
                self.stuck_timer = 0.0;
                log::debug!("Enemy {} unstuck", self.id().0);
            }
        } else {
            self.stuck_timer = 0.0;
        }

        self.last_position = self.body.position;
    }

    /// Take a hit. Aggro onto the attacker if it landed and no target is set.
    pub fn take_hit(&mut self, amount: f32, source: Option<EntityId>) -> bool {
        if !self.body.take_damage(amount, source) {
            return false;
        }
        if !self.body.is_dead && self.target.is_none() {
            if let Some(source) = source {
                self.target = Some(source);
                self.state = AiState::Chasing;
            }
        }
        true
    }
}
