//! Boss behavior layered on an enemy: passive regeneration and one-shot rage

use serde::{Deserialize, Serialize};

use super::enemy::EnemyStats;
use super::entity::Body;

/// Boss base stats and behavior tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossStats {
    pub base: EnemyStats,
    /// Rage triggers at or below this health fraction
    pub rage_threshold: f32,
    pub rage_speed_multiplier: f32,
    pub rage_damage_multiplier: f32,
    pub rage_cooldown_multiplier: f32,
    /// Fixed heal per regeneration pulse (not scaled by dt)
    pub regen_amount: f32,
    /// Sim seconds between regeneration pulses
    pub regen_interval: f64,
}

impl Default for BossStats {
    fn default() -> Self {
        Self {
            base: EnemyStats {
                max_health: 200.0,
                damage: 35.0,
                move_speed: 1.2,
                attack_range: 4.0,
                detection_range: 30.0,
                attack_cooldown: 3.0,
                collision_radius: 2.0,
            },
            rage_threshold: 0.5,
            rage_speed_multiplier: 1.5,
            rage_damage_multiplier: 1.3,
            rage_cooldown_multiplier: 0.7,
            regen_amount: 2.0,
            regen_interval: 1.0,
        }
    }
}

/// What a boss update did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BossEffect {
    /// Health restored by regeneration
    pub regenerated: f32,
    /// Rage activated this tick
    pub enraged: bool,
}

/// Boss-only state carried by an enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub can_rage: bool,
    pub is_raging: bool,
    pub rage_threshold: f32,
    rage_speed_multiplier: f32,
    rage_damage_multiplier: f32,
    rage_cooldown_multiplier: f32,
    pub regen_amount: f32,
    pub regen_interval: f64,
    /// Sim time of the last regeneration pulse
    pub last_regen_at: f64,
}

impl Boss {
    pub fn new(stats: &BossStats, now: f64) -> Self {
        Self {
            can_rage: true,
            is_raging: false,
            rage_threshold: stats.rage_threshold,
            rage_speed_multiplier: stats.rage_speed_multiplier,
            rage_damage_multiplier: stats.rage_damage_multiplier,
            rage_cooldown_multiplier: stats.rage_cooldown_multiplier,
            regen_amount: stats.regen_amount,
            regen_interval: stats.regen_interval,
            last_regen_at: now,
        }
    }

    /// Regenerate, then check the rage threshold
    pub fn update(&mut self, body: &mut Body, stats: &mut EnemyStats, now: f64) -> BossEffect {
        let mut effect = BossEffect::default();
        if body.is_dead {
            return effect;
        }

        if now - self.last_regen_at >= self.regen_interval {
            self.last_regen_at = now;
            if body.current_health < body.max_health {
                effect.regenerated = body.heal(self.regen_amount);
            }
        }

        if self.can_rage && !self.is_raging && body.health_fraction() <= self.rage_threshold {
            self.activate_rage(stats);
            effect.enraged = true;
        }

        effect
    }

    fn activate_rage(&mut self, stats: &mut EnemyStats) {
        self.is_raging = true;
        self.can_rage = false;

        stats.move_speed *= self.rage_speed_multiplier;
        stats.damage *= self.rage_damage_multiplier;
        stats.attack_cooldown *= self.rage_cooldown_multiplier;

        log::info!(
            "Boss enraged: speed {:.2}, damage {:.1}, cooldown {:.2}s",
            stats.move_speed,
            stats.damage,
            stats.attack_cooldown
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityId;
    use glam::Vec3;

    fn setup() -> (Boss, Body, EnemyStats) {
        let stats = BossStats::default();
        let boss = Boss::new(&stats, 0.0);
        let body = Body::new(EntityId(1), Vec3::ZERO).with_health(stats.base.max_health);
        (boss, body, stats.base)
    }

    #[test]
    fn test_rage_fires_once_at_threshold() {
        let (mut boss, mut body, mut stats) = setup();

        body.current_health = 101.0;
        assert!(!boss.update(&mut body, &mut stats, 0.1).enraged);

        body.current_health = 100.0;
        let effect = boss.update(&mut body, &mut stats, 0.2);
        assert!(effect.enraged);
        assert!(boss.is_raging);
        assert!(!boss.can_rage);
        assert!((stats.move_speed - 1.8).abs() < 1e-4);
        assert!((stats.damage - 45.5).abs() < 1e-4);
        assert!((stats.attack_cooldown - 2.1).abs() < 1e-4);

        // Still low: no second application
        body.current_health = 40.0;
        assert!(!boss.update(&mut body, &mut stats, 0.3).enraged);
        assert!((stats.move_speed - 1.8).abs() < 1e-4);
    }

    #[test]
    fn test_regen_is_interval_gated() {
        let (mut boss, mut body, mut stats) = setup();
        body.current_health = 150.0;

        // Many ticks inside one interval heal nothing
        for i in 1..60 {
            let effect = boss.update(&mut body, &mut stats, i as f64 / 60.0);
            assert_eq!(effect.regenerated, 0.0);
        }
        let effect = boss.update(&mut body, &mut stats, 1.0);
        assert_eq!(effect.regenerated, 2.0);
        assert_eq!(body.current_health, 152.0);

        let effect = boss.update(&mut body, &mut stats, 1.5);
        assert_eq!(effect.regenerated, 0.0);
    }

    #[test]
    fn test_regen_stops_at_max_and_when_dead() {
        let (mut boss, mut body, mut stats) = setup();
        body.current_health = 199.0;
        assert_eq!(boss.update(&mut body, &mut stats, 1.0).regenerated, 1.0);
        assert_eq!(boss.update(&mut body, &mut stats, 2.0).regenerated, 0.0);

        body.die();
        assert_eq!(boss.update(&mut body, &mut stats, 10.0), BossEffect::default());
        assert_eq!(body.current_health, 0.0);
    }
}
