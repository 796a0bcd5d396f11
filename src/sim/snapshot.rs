//! Read-only views for the presentation layer

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Archetype, Faction, Tint, Variant};
use super::state::{GamePhase, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Player,
    Enemy(Archetype, Variant),
    Projectile(Faction),
}

/// What a renderer needs to draw one body this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub kind: BodyKind,
    pub pos: Vec2,
    pub rotation: f32,
    pub alpha: f32,
    pub tint: Tint,
    pub visible: bool,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub hp: i32,
    pub max_hp: i32,
    pub time_remaining_ms: u64,
    pub wave: u32,
    pub phase: GamePhase,
}

impl GameState {
    /// Fill `out` with every visible body: player first, then enemies by
    /// archetype in pool order, then projectiles.
    pub fn snapshot(&self, out: &mut Vec<EntitySnapshot>) {
        out.clear();
        out.push(EntitySnapshot {
            kind: BodyKind::Player,
            pos: self.player.pos,
            rotation: 0.0,
            alpha: 1.0,
            tint: self.player.tint,
            visible: self.player.visible,
            radius: self.player.radius(),
        });

        for archetype in Archetype::ALL {
            self.enemies.for_each_active(archetype, |_, enemy| {
                out.push(EntitySnapshot {
                    kind: BodyKind::Enemy(archetype, enemy.variant),
                    pos: enemy.pos,
                    rotation: enemy.rotation,
                    alpha: enemy.alpha,
                    tint: enemy.tint,
                    visible: true,
                    radius: enemy.radius,
                });
            });
        }

        let shots = [
            (Faction::Player, &self.player_shots),
            (Faction::Enemy, &self.enemy_shots),
        ];
        for (faction, pool) in shots {
            out.extend(pool.iter_active().map(|(_, shot)| EntitySnapshot {
                kind: BodyKind::Projectile(faction),
                pos: shot.pos,
                rotation: shot.vel.y.atan2(shot.vel.x),
                alpha: 1.0,
                tint: Tint::Base,
                visible: true,
                radius: shot.radius,
            }));
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            hp: self.player.hp,
            max_hp: self.player.max_hp,
            time_remaining_ms: self.time_remaining_ms,
            wave: self.wave,
            phase: self.phase,
        }
    }
}
