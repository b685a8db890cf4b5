//! Combat resolution: range queries, damage application, combat log
//!
//! Every hit goes through `apply_hit`, which routes enemy deaths into
//! `GameState::on_enemy_killed`.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::enemy::AttackIntent;
use super::entity::EntityId;
use super::state::{GameEvent, GameState};
use crate::audio::SoundEffect;
use crate::consts::COMBAT_LOG_CAPACITY;

/// One landed hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub attacker: EntityId,
    pub target: EntityId,
    pub amount: f32,
    /// Sim time of the hit
    pub at: f64,
}

/// Bounded history of recent hits
#[derive(Debug, Clone)]
pub struct CombatLog {
    events: VecDeque<CombatEvent>,
    capacity: usize,
}

impl Default for CombatLog {
    fn default() -> Self {
        Self::with_capacity(COMBAT_LOG_CAPACITY)
    }
}

impl CombatLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, attacker: EntityId, target: EntityId, amount: f32, at: f64) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(CombatEvent {
            attacker,
            target,
            amount,
            at,
        });
    }

    /// Hits within `window` seconds of `now`, oldest first
    pub fn recent(&self, window: f64, now: f64) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter().filter(move |e| now - e.at <= window)
    }

    /// Total damage dealt by `attacker` within the window
    pub fn damage_by(&self, attacker: EntityId, window: f64, now: f64) -> f32 {
        self.recent(window, now)
            .filter(|e| e.attacker == attacker)
            .map(|e| e.amount)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Live entities whose collision surface is within `range` of `position`
///
/// Scans the golem first, then enemies in id order.
pub fn targets_in_range(state: &GameState, position: Vec3, range: f32, exclude: Option<EntityId>) -> Vec<EntityId> {
    let mut targets = Vec::new();

    let player = &state.player.body;
    if Some(player.id) != exclude && !player.is_dead && player.reach_distance(position) <= range {
        targets.push(player.id);
    }

    targets.extend(
        state
            .enemies
            .iter()
            .filter(|e| Some(e.id()) != exclude && !e.is_dead())
            .filter(|e| e.body.reach_distance(position) <= range)
            .map(|e| e.id()),
    );
    targets
}

/// Apply one hit to any entity. Returns whether it landed.
fn apply_hit(state: &mut GameState, target: EntityId, amount: f32, attacker: EntityId) -> bool {
    let now = state.time;

    if target == state.player.id() {
        if !state.player.body.take_damage(amount, Some(attacker)) {
            return false;
        }
        let position = state.player.body.position;
        state.combat_log.record(attacker, target, amount, now);
        state.events.push(GameEvent::PlayerDamaged {
            amount,
            source: attacker,
        });
        state.emit_sound(SoundEffect::Hit, Some(position));
        return true;
    }

    let Some(enemy) = state.enemy_mut(target) else {
        return false;
    };
    if !enemy.take_hit(amount, Some(attacker)) {
        return false;
    }
    let died = enemy.is_dead();
    let position = enemy.body.position;

    state.combat_log.record(attacker, target, amount, now);
    state.emit_sound(SoundEffect::Hit, Some(position));
    if died {
        state.on_enemy_killed(target);
    }
    true
}

/// Damage everything in range except the attacker. Returns hits landed.
pub fn deal_area_damage(state: &mut GameState, position: Vec3, range: f32, damage: f32, attacker: EntityId) -> usize {
    targets_in_range(state, position, range, Some(attacker))
        .into_iter()
        .filter(|&target| apply_hit(state, target, damage, attacker))
        .count()
}

/// Golem melee swing: hits every enemy in attack range
///
/// Returns false if the swing was rejected (dead or on cooldown).
pub fn player_attack(state: &mut GameState) -> bool {
    if !state.player.try_begin_attack() {
        return false;
    }

    let id = state.player.id();
    let position = state.player.body.position;
    let range = state.player.attack_range;
    let damage = state.player.damage();
    state.emit_sound(SoundEffect::Attack, Some(position));

    let landed = deal_area_damage(state, position, range, damage, id);
    log::debug!("Golem attack: {} hits for {:.0}", landed, damage);
    true
}

/// Resolve an enemy's attack against its target
///
/// The attacker must still be alive and the target within its range.
pub fn enemy_attack(state: &mut GameState, intent: AttackIntent) -> bool {
    let Some(attacker) = state.enemy(intent.attacker) else {
        return false;
    };
    if attacker.is_dead() {
        return false;
    }
    let origin = attacker.body.position;

    let in_range = if intent.target == state.player.id() {
        let player = &state.player.body;
        !player.is_dead && player.reach_distance(origin) <= intent.range
    } else {
        state
            .enemy(intent.target)
            .is_some_and(|e| !e.is_dead() && e.body.reach_distance(origin) <= intent.range)
    };
    if !in_range {
        return false;
    }

    state.emit_sound(SoundEffect::EnemyAttack, Some(origin));
    apply_hit(state, intent.target, intent.damage, intent.attacker)
}
