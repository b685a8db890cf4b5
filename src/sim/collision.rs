//! Circle-based collision detection and response
//!
//! Everything collides as an upright cylinder, so tests run on the ground
//! plane (x, z). Dynamic pairs split the correction 50/50; static world
//! objects only push the dynamic body; the world boundary keeps every body
//! inside the playable disc.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::entity::Body;
use crate::consts::{VILLAGE_RADIUS, WORLD_RADIUS, WORLD_SIZE};
use crate::{ground, random_ground_direction, random_ring_point};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit axis from the first shape toward the second (ground plane)
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two ground circles
///
/// Coincident centers report a hit with a zero normal; callers pick a
/// direction for that case.
pub fn circle_overlap(a_pos: Vec3, a_radius: f32, b_pos: Vec3, b_radius: f32) -> CollisionResult {
    let delta = ground(b_pos) - ground(a_pos);
    let dist = delta.length();
    let min_dist = a_radius + b_radius;

    if dist >= min_dist {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: delta.normalize_or_zero(),
        penetration: min_dist - dist,
    }
}

fn push_axis<R: Rng + ?Sized>(result: &CollisionResult, rng: &mut R) -> Vec3 {
    if result.normal.length_squared() < 0.5 {
        // Same position: any direction separates them
        random_ground_direction(rng)
    } else {
        Vec3::new(result.normal.x, 0.0, result.normal.y)
    }
}

/// Push two overlapping bodies apart, each by half the overlap
///
/// Returns true if a correction was applied.
pub fn resolve_pair<R: Rng + ?Sized>(a: &mut Body, b: &mut Body, rng: &mut R) -> bool {
    let result = circle_overlap(a.position, a.collision_radius, b.position, b.collision_radius);
    if !result.hit {
        return false;
    }

    let axis = push_axis(&result, rng);
    let half = result.penetration * 0.5;
    a.position -= axis * half;
    b.position += axis * half;
    true
}

/// Kinds of static world objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderKind {
    Building,
    Tree,
    Rock,
}

impl ColliderKind {
    pub fn radius(&self) -> f32 {
        match self {
            ColliderKind::Building => 3.0,
            ColliderKind::Tree => 0.8,
            ColliderKind::Rock => 1.0,
        }
    }
}

/// Immovable world object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticCollider {
    pub position: Vec3,
    pub radius: f32,
    pub kind: ColliderKind,
}

impl StaticCollider {
    pub fn new(kind: ColliderKind, x: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, 0.0, z),
            radius: kind.radius(),
            kind,
        }
    }
}

/// Push a body out of a static collider. The collider never moves.
pub fn resolve_static<R: Rng + ?Sized>(body: &mut Body, collider: &StaticCollider, rng: &mut R) -> bool {
    let result = circle_overlap(collider.position, collider.radius, body.position, body.collision_radius);
    if !result.hit {
        return false;
    }

    let axis = push_axis(&result, rng);
    body.position += axis * result.penetration;
    true
}

/// Keep a body inside the playable disc
///
/// Projects the body back onto the boundary and removes the outward
/// component of its velocity. Returns true if the body was outside.
pub fn contain_in_world(body: &mut Body, world_radius: f32) -> bool {
    let flat = ground(body.position);
    let limit = (world_radius - body.collision_radius).max(0.0);
    let dist = flat.length();

    if dist <= limit {
        return false;
    }

    let outward = flat / dist;
    let clamped = outward * limit;
    body.position.x = clamped.x;
    body.position.z = clamped.y;

    let outward_speed = body.velocity.x * outward.x + body.velocity.z * outward.y;
    if outward_speed > 0.0 {
        body.velocity.x -= outward.x * outward_speed;
        body.velocity.z -= outward.y * outward_speed;
    }
    true
}

/// One physics pass over the golem and every live enemy
///
/// Pairwise separation first (O(n²)), then static objects, then the world
/// boundary. Dead enemies no longer collide.
pub fn resolve_world<R: Rng + ?Sized>(
    player: &mut Body,
    enemies: &mut [Enemy],
    statics: &[StaticCollider],
    rng: &mut R,
) -> usize {
    let mut bodies: Vec<&mut Body> = std::iter::once(player)
        .chain(enemies.iter_mut().filter(|e| !e.is_dead()).map(|e| &mut e.body))
        .collect();

    let mut contacts = 0;
    for j in 1..bodies.len() {
        let (left, right) = bodies.split_at_mut(j);
        let b = &mut *right[0];
        for a in left.iter_mut() {
            if resolve_pair(a, b, rng) {
                contacts += 1;
            }
        }
    }

    for body in bodies.iter_mut() {
        for collider in statics {
            if resolve_static(body, collider, rng) {
                contacts += 1;
            }
        }
        contain_in_world(body, WORLD_RADIUS);
        body.update_bounds();
    }

    contacts
}

/// Generate the village and its surroundings as static colliders
///
/// Five buildings in the village, 20 trees and 10 rocks scattered outside it.
pub fn village_layout<R: Rng + ?Sized>(rng: &mut R) -> Vec<StaticCollider> {
    let mut colliders = vec![
        StaticCollider::new(ColliderKind::Building, 10.0, 10.0),
        StaticCollider::new(ColliderKind::Building, -10.0, 10.0),
        StaticCollider::new(ColliderKind::Building, 10.0, -10.0),
        StaticCollider::new(ColliderKind::Building, -10.0, -10.0),
        StaticCollider::new(ColliderKind::Building, 0.0, 15.0),
    ];

    // Ring between the village edge plus clearance and the reach of `extent`,
    // never past the world boundary
    let mut scatter = |kind: ColliderKind, count: usize, extent: f32, clearance: f32| {
        let inner = VILLAGE_RADIUS + clearance;
        let outer = (WORLD_SIZE * extent * 0.5).min(WORLD_RADIUS - kind.radius()).max(inner);
        for _ in 0..count {
            let position = random_ring_point(&mut *rng, inner, outer);
            colliders.push(StaticCollider::new(kind, position.x, position.z));
        }
    };

    scatter(ColliderKind::Tree, 20, 0.8, 5.0);
    scatter(ColliderKind::Rock, 10, 0.6, 2.0);

    colliders
}
