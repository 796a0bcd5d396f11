//! Reference broad-phase collision pass
//!
//! Hosts may supply their own overlap pairs; this pass exists so the demo
//! runner and tests can drive complete ticks. Every body is a circle, and
//! pairs are reported already filtered by category:
//! - player shot vs enemy
//! - enemy vs player
//! - enemy shot vs player

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Archetype, EntityRef, Projectile};
use super::player::Player;
use super::pool::{EnemyPools, SlotPool, SlotRef};

/// One side of an overlap pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyRef {
    Player,
    Enemy(EntityRef),
    PlayerShot(SlotRef),
    EnemyShot(SlotRef),
}

/// Two bodies that overlap this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    pub a: BodyRef,
    pub b: BodyRef,
}

impl Overlap {
    pub fn new(a: BodyRef, b: BodyRef) -> Self {
        Self { a, b }
    }
}

/// Result of a circle-circle check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the surface of `a` (if hit)
    pub point: Vec2,
    /// Normal pointing from `a` toward `b`
    pub normal: Vec2,
    /// Penetration depth
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check two circles for overlap
pub fn circle_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = b_pos - a_pos;
    let dist = delta.length();
    let reach = a_radius + b_radius;
    if dist >= reach {
        return CollisionResult::miss();
    }
    // Coincident centers: pick an arbitrary axis
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::X };
    CollisionResult {
        hit: true,
        point: a_pos + normal * a_radius,
        normal,
        penetration: reach - dist,
    }
}

/// Collect every overlapping pair, in pool order
pub fn broad_phase(
    enemies: &EnemyPools,
    player: &Player,
    player_shots: &SlotPool<Projectile>,
    enemy_shots: &SlotPool<Projectile>,
    out: &mut Vec<Overlap>,
) {
    out.clear();

    for (shot_ref, shot) in player_shots.iter_active() {
        for archetype in Archetype::ALL {
            enemies.for_each_active(archetype, |enemy_ref, enemy| {
                if circle_collision(shot.pos, shot.radius, enemy.pos, enemy.radius).hit {
                    out.push(Overlap::new(
                        BodyRef::PlayerShot(shot_ref),
                        BodyRef::Enemy(enemy_ref),
                    ));
                }
            });
        }
    }

    for archetype in Archetype::ALL {
        enemies.for_each_active(archetype, |enemy_ref, enemy| {
            if circle_collision(enemy.pos, enemy.radius, player.pos, player.radius()).hit {
                out.push(Overlap::new(BodyRef::Enemy(enemy_ref), BodyRef::Player));
            }
        });
    }

    for (shot_ref, shot) in enemy_shots.iter_active() {
        if circle_collision(shot.pos, shot.radius, player.pos, player.radius()).hit {
            out.push(Overlap::new(BodyRef::EnemyShot(shot_ref), BodyRef::Player));
        }
    }
}
