//! Wave director: timed enemy waves with boss gating
//!
//! The director never touches entities. `update` returns the events of the
//! tick (wave started with spawn orders, boss due, wave completed) and the
//! game state materializes them. Every death, boss included, comes back
//! through `on_enemy_defeated`.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::BossStats;
use super::enemy::EnemyStats;
use crate::random_ring_point;

/// Wave pacing, difficulty scaling and rewards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Seconds between the end of one wave and the start of the next
    pub interval: f64,
    /// Seconds before the first wave
    pub first_wave_delay: f64,
    pub base_count: u32,
    pub count_step: u32,
    pub max_count: u32,
    /// Boss waves: every `boss_every` waves starting at `first_boss_wave`
    pub first_boss_wave: u32,
    pub boss_every: u32,
    pub spawn_min_radius: f32,
    pub spawn_max_radius: f32,
    /// Regular enemy stats for wave 1
    pub enemy: EnemyStats,
    pub health_per_wave: f32,
    pub damage_per_wave: f32,
    pub speed_per_wave: f32,
    /// Boss stats for the first boss tier
    pub boss: BossStats,
    pub boss_health_per_tier: f32,
    pub boss_damage_per_tier: f32,
    /// Iron ingots per wave number on completion
    pub reward_per_wave: u32,
    /// Extra iron ingots per wave number on boss waves
    pub boss_bonus_per_wave: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            interval: 30.0,
            first_wave_delay: 5.0,
            base_count: 5,
            count_step: 2,
            max_count: 20,
            first_boss_wave: 3,
            boss_every: 3,
            spawn_min_radius: 20.0,
            spawn_max_radius: 30.0,
            enemy: EnemyStats::default(),
            health_per_wave: 5.0,
            damage_per_wave: 2.0,
            speed_per_wave: 0.2,
            boss: BossStats::default(),
            boss_health_per_tier: 100.0,
            boss_damage_per_tier: 10.0,
            reward_per_wave: 2,
            boss_bonus_per_wave: 1,
        }
    }
}

impl WaveConfig {
    pub fn enemy_count(&self, wave: u32) -> u32 {
        (self.base_count + wave * self.count_step).min(self.max_count)
    }

    pub fn is_boss_wave(&self, wave: u32) -> bool {
        self.boss_every > 0 && wave >= self.first_boss_wave && wave % self.boss_every == 0
    }

    /// Regular enemy stats scaled linearly from wave 1
    pub fn regular_stats(&self, wave: u32) -> EnemyStats {
        let step = wave.saturating_sub(1) as f32;
        EnemyStats {
            max_health: self.enemy.max_health + step * self.health_per_wave,
            damage: self.enemy.damage + step * self.damage_per_wave,
            move_speed: self.enemy.move_speed + step * self.speed_per_wave,
            ..self.enemy.clone()
        }
    }

    /// Boss stats scaled per tier (one tier per `boss_every` waves)
    pub fn boss_stats(&self, wave: u32) -> BossStats {
        let tier = wave / self.boss_every.max(1);
        let step = tier.saturating_sub(1) as f32;
        let mut stats = self.boss.clone();
        stats.base.max_health += step * self.boss_health_per_tier;
        stats.base.damage += step * self.boss_damage_per_tier;
        stats
    }

    pub fn reward(&self, wave: u32, boss_wave: bool) -> u32 {
        let bonus = if boss_wave {
            wave * self.boss_bonus_per_wave
        } else {
            0
        };
        wave * self.reward_per_wave + bonus
    }
}

/// A regular enemy to place in the world
#[derive(Debug, Clone)]
pub struct SpawnOrder {
    pub position: Vec3,
    pub stats: EnemyStats,
}

#[derive(Debug, Clone)]
pub enum WaveEvent {
    Started {
        wave: u32,
        boss_wave: bool,
        spawns: Vec<SpawnOrder>,
    },
    /// Regulars are down: the boss enters at the village center
    BossSpawned {
        wave: u32,
        position: Vec3,
        stats: BossStats,
    },
    Completed {
        wave: u32,
        reward: u32,
        boss_wave: bool,
    },
}

/// Where the director is in its cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WavePhase {
    /// Before the first wave
    Preparing { seconds: f32 },
    InProgress { remaining: u32 },
    BossFight,
    /// Between waves
    Complete { next_wave_in: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    pub config: WaveConfig,
    pub current_wave: u32,
    /// Sim time the last wave ended (negative before the first wave)
    pub last_wave_end: f64,
    pub is_wave_active: bool,
    pub enemies_spawned: u32,
    pub enemies_remaining: u32,
    pub should_spawn_boss: bool,
    pub boss_spawned: bool,
    pub waves_completed: u32,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new(WaveConfig::default())
    }
}

impl WaveDirector {
    pub fn new(config: WaveConfig) -> Self {
        let last_wave_end = config.first_wave_delay - config.interval;
        Self {
            config,
            current_wave: 0,
            last_wave_end,
            is_wave_active: false,
            enemies_spawned: 0,
            enemies_remaining: 0,
            should_spawn_boss: false,
            boss_spawned: false,
            waves_completed: 0,
        }
    }

    pub fn enemy_count(&self, wave: u32) -> u32 {
        self.config.enemy_count(wave)
    }

    pub fn is_boss_wave(&self, wave: u32) -> bool {
        self.config.is_boss_wave(wave)
    }

    pub fn regular_stats(&self, wave: u32) -> EnemyStats {
        self.config.regular_stats(wave)
    }

    pub fn boss_stats(&self, wave: u32) -> BossStats {
        self.config.boss_stats(wave)
    }

    pub fn time_until_next_wave(&self, now: f64) -> f32 {
        if self.is_wave_active {
            return 0.0;
        }
        (self.last_wave_end + self.config.interval - now).max(0.0) as f32
    }

    pub fn is_boss_fight(&self) -> bool {
        self.is_wave_active && self.boss_spawned
    }

    pub fn status(&self, now: f64) -> WavePhase {
        if self.is_wave_active {
            if self.boss_spawned {
                WavePhase::BossFight
            } else {
                WavePhase::InProgress {
                    remaining: self.enemies_remaining,
                }
            }
        } else if self.current_wave == 0 {
            WavePhase::Preparing {
                seconds: self.time_until_next_wave(now),
            }
        } else {
            WavePhase::Complete {
                next_wave_in: self.time_until_next_wave(now),
            }
        }
    }

    /// Advance the schedule
    pub fn update<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) -> Vec<WaveEvent> {
        let mut events = Vec::new();

        if !self.is_wave_active && now - self.last_wave_end >= self.config.interval {
            events.push(self.start_next_wave(rng));
        }

        if self.is_wave_active && self.enemies_remaining == 0 {
            if self.should_spawn_boss && !self.boss_spawned {
                events.push(self.spawn_boss());
            } else {
                events.push(self.complete_wave(now));
            }
        }

        events
    }

    fn start_next_wave<R: Rng + ?Sized>(&mut self, rng: &mut R) -> WaveEvent {
        self.current_wave += 1;
        let wave = self.current_wave;

        self.is_wave_active = true;
        self.enemies_spawned = self.config.enemy_count(wave);
        self.enemies_remaining = self.enemies_spawned;
        self.should_spawn_boss = self.config.is_boss_wave(wave);
        self.boss_spawned = false;

        let stats = self.config.regular_stats(wave);
        let spawns = (0..self.enemies_spawned)
            .map(|_| SpawnOrder {
                position: random_ring_point(rng, self.config.spawn_min_radius, self.config.spawn_max_radius),
                stats: stats.clone(),
            })
            .collect();

        log::info!(
            "Wave {} started: {} enemies{}",
            wave,
            self.enemies_spawned,
            if self.should_spawn_boss { " (boss wave)" } else { "" }
        );

        WaveEvent::Started {
            wave,
            boss_wave: self.should_spawn_boss,
            spawns,
        }
    }

    fn spawn_boss(&mut self) -> WaveEvent {
        self.boss_spawned = true;
        self.enemies_remaining = 1;
        log::info!("Wave {} boss incoming", self.current_wave);

        WaveEvent::BossSpawned {
            wave: self.current_wave,
            position: Vec3::ZERO,
            stats: self.config.boss_stats(self.current_wave),
        }
    }

    fn complete_wave(&mut self, now: f64) -> WaveEvent {
        let wave = self.current_wave;
        let boss_wave = self.should_spawn_boss;
        let reward = self.config.reward(wave, boss_wave);

        self.is_wave_active = false;
        self.last_wave_end = now;
        self.should_spawn_boss = false;
        self.boss_spawned = false;
        self.waves_completed += 1;

        log::info!("Wave {} complete, reward {} iron ingots", wave, reward);
        WaveEvent::Completed {
            wave,
            reward,
            boss_wave,
        }
    }

    /// Count one enemy death against the active wave
    pub fn on_enemy_defeated(&mut self) {
        if !self.is_wave_active {
            return;
        }
        self.enemies_remaining = self.enemies_remaining.saturating_sub(1);
    }

    /// Start the schedule over, counting the first-wave delay from `now`
    pub fn reset(&mut self, now: f64) {
        *self = Self::new(self.config.clone());
        self.last_wave_end += now;
    }
}
