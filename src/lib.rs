//! Golem Survival - simulation core for a village defense game
//!
//! Core modules:
//! - `sim`: Simulation (entities, AI, combat, waves, resources, game state)
//! - `hud`: Read-only snapshots for the HUD layer
//! - `audio`: Fire-and-forget sound cue vocabulary
//! - `persistence`: Key-value storage for save games
//! - `highscores`: Ranked leaderboard
//! - `settings`: Player preferences

pub mod audio;
pub mod highscores;
pub mod hud;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

use glam::{Vec2, Vec3};
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta fed to the accumulator (the 30 FPS floor)
    pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Downward acceleration for airborne bodies (units/s²)
    pub const GRAVITY: f32 = 9.81;
    /// Invulnerability window opened by every accepted hit (seconds)
    pub const INVULNERABILITY_WINDOW: f32 = 0.5;

    /// Radius of the playable disc around the village center
    pub const WORLD_RADIUS: f32 = 48.0;
    /// Radius of the village itself (no trees or rocks inside)
    pub const VILLAGE_RADIUS: f32 = 20.0;
    /// Side length of the square ground plane
    pub const WORLD_SIZE: f32 = 100.0;

    /// Seconds a dead enemy lingers before removal
    pub const ENEMY_REMOVAL_DELAY: f32 = 1.0;
    /// Seconds a dead boss lingers before removal
    pub const BOSS_REMOVAL_DELAY: f32 = 3.0;

    /// Stuck detection: progress below this rate (units/s) counts as stalled
    pub const STUCK_MOVE_THRESHOLD: f32 = 0.1;
    /// Stuck detection: stalled time before an unstuck nudge (seconds)
    pub const STUCK_TIME_LIMIT: f32 = 2.0;
    /// Distance of the unstuck nudge
    pub const UNSTUCK_DISTANCE: f32 = 2.0;
    /// Chasing gives up beyond this multiple of detection range
    pub const CHASE_GIVE_UP_FACTOR: f32 = 1.5;

    /// Combat events kept for the recent-window query
    pub const COMBAT_LOG_CAPACITY: usize = 64;
    /// Default recent-window for combat event queries (seconds)
    pub const COMBAT_RECENT_WINDOW: f64 = 5.0;

    /// Player jump impulse (units/s)
    pub const JUMP_VELOCITY: f32 = 8.0;
    /// Camera pitch limit (60 degrees up or down)
    pub const MAX_CAMERA_PITCH: f32 = std::f32::consts::FRAC_PI_3;
    /// Base mouse sensitivity (radians per pixel)
    pub const MOUSE_SENSITIVITY: f32 = 0.005;
}

/// Project a 3D position onto the ground plane (x, z)
#[inline]
pub fn ground(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Distance between two points ignoring height
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    ground(a).distance(ground(b))
}

/// Random point on a ground ring centered at the origin
pub fn random_ring_point<R: Rng + ?Sized>(rng: &mut R, min_radius: f32, max_radius: f32) -> Vec3 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    let distance = if max_radius > min_radius {
        rng.random_range(min_radius..max_radius)
    } else {
        min_radius
    };
    Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}

/// Random unit direction on the ground plane
pub fn random_ground_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Random offset in a ground square of half-width `spread`
pub fn random_scatter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> Vec3 {
    if spread <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.random_range(-spread..spread),
        0.0,
        rng.random_range(-spread..spread),
    )
}
