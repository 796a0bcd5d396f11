//! Combat resolution
//!
//! Consumes overlap pairs and applies damage, destruction and score.
//! Any pair whose entity or projectile reference has gone stale is dropped
//! whole; resolution never touches a recycled slot.

use glam::Vec2;

use super::collision::{BodyRef, Overlap};
use super::entity::{Archetype, EntityRef, Projectile};
use super::events::{EventSink, GameEvent};
use super::player::Player;
use super::pool::{EnemyPools, SlotPool, SlotRef};
use super::scheduler::{EffectHandle, EffectKind, EffectPayload, Scheduler, TargetRef, Timing};
use super::upgrades::UpgradeRegistry;
use crate::consts::*;

/// What damage did to an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Reference was stale; nothing happened
    Ignored,
    /// The hit was absorbed without effect
    Absorbed,
    Damaged,
    Destroyed,
}

/// Everything combat resolution may mutate
pub struct CombatCtx<'a> {
    pub enemies: &'a mut EnemyPools,
    pub player: &'a mut Player,
    pub upgrades: &'a UpgradeRegistry,
    pub player_shots: &'a mut SlotPool<Projectile>,
    pub enemy_shots: &'a mut SlotPool<Projectile>,
    pub scheduler: &'a mut Scheduler,
    pub score: &'a mut u64,
    pub events: &'a mut dyn EventSink,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatOutcome {
    pub enemies_destroyed: u32,
    /// The player's HP reached 0 during this pass
    pub player_destroyed: bool,
}

/// Resolve a batch of overlaps in order
pub fn resolve(pairs: &[Overlap], ctx: &mut CombatCtx<'_>) -> CombatOutcome {
    let mut outcome = CombatOutcome::default();
    for pair in pairs {
        match (pair.a, pair.b) {
            (BodyRef::PlayerShot(shot), BodyRef::Enemy(enemy))
            | (BodyRef::Enemy(enemy), BodyRef::PlayerShot(shot)) => {
                if shot_hits_enemy(shot, enemy, ctx) == DamageOutcome::Destroyed {
                    outcome.enemies_destroyed += 1;
                }
            }
            (BodyRef::Enemy(enemy), BodyRef::Player) | (BodyRef::Player, BodyRef::Enemy(enemy)) => {
                let (destroyed, player_destroyed) = enemy_hits_player(enemy, ctx);
                if destroyed {
                    outcome.enemies_destroyed += 1;
                }
                outcome.player_destroyed |= player_destroyed;
            }
            (BodyRef::EnemyShot(shot), BodyRef::Player) | (BodyRef::Player, BodyRef::EnemyShot(shot)) => {
                outcome.player_destroyed |= shot_hits_player(shot, ctx);
            }
            (a, b) => log::debug!("ignored overlap {:?} / {:?}", a, b),
        }
    }
    outcome
}

fn shot_hits_enemy(shot: SlotRef, r: EntityRef, ctx: &mut CombatCtx<'_>) -> DamageOutcome {
    if !ctx.enemies.is_live(r) {
        log::debug!("stale enemy {:?} in overlap, pair dropped", r);
        return DamageOutcome::Ignored;
    }
    let Some(damage) = ctx.player_shots.get(shot).map(|p| p.damage) else {
        log::debug!("stale player shot {:?} in overlap, pair dropped", shot);
        return DamageOutcome::Ignored;
    };
    ctx.player_shots.release(shot);

    let outcome = damage_enemy(ctx.enemies, ctx.scheduler, r, damage);
    match outcome {
        DamageOutcome::Destroyed => {
            destroy_enemy(r, ctx.enemies, ctx.scheduler, ctx.score, ctx.events);
        }
        DamageOutcome::Damaged => {
            if let Some(enemy) = ctx.enemies.get(r) {
                ctx.events.emit(GameEvent::Hit {
                    entity: r,
                    pos: enemy.pos,
                });
            }
            if ctx.upgrades.acid_rounds() {
                apply_acid(ctx.enemies, ctx.scheduler, r, ACID_DAMAGE);
            }
        }
        DamageOutcome::Absorbed | DamageOutcome::Ignored => {}
    }
    outcome
}

/// Returns (enemy destroyed, player destroyed)
fn enemy_hits_player(r: EntityRef, ctx: &mut CombatCtx<'_>) -> (bool, bool) {
    let Some(enemy) = ctx.enemies.get(r) else {
        log::debug!("stale enemy {:?} in overlap, pair dropped", r);
        return (false, false);
    };
    let contact_damage = enemy.contact_damage;
    let rams = enemy.archetype != Archetype::Mothership;

    let player_destroyed = damage_player(contact_damage, ctx);
    // Ramming costs the attacker its life; the mothership just keeps hovering
    let destroyed = rams && destroy_enemy(r, ctx.enemies, ctx.scheduler, ctx.score, ctx.events);
    (destroyed, player_destroyed)
}

fn shot_hits_player(shot: SlotRef, ctx: &mut CombatCtx<'_>) -> bool {
    let Some(damage) = ctx.enemy_shots.get(shot).map(|p| p.damage) else {
        log::debug!("stale enemy shot {:?} in overlap, pair dropped", shot);
        return false;
    };
    ctx.enemy_shots.release(shot);
    damage_player(damage, ctx)
}

fn damage_player(amount: i32, ctx: &mut CombatCtx<'_>) -> bool {
    if ctx.player.is_invincible() {
        return false;
    }
    let before = ctx.player.hp;
    let destroyed = ctx
        .player
        .take_damage(amount, ctx.upgrades, ctx.scheduler);
    ctx.events.emit(GameEvent::PlayerDamaged {
        amount: before - ctx.player.hp,
        hp: ctx.player.hp,
        max_hp: ctx.player.max_hp,
    });
    if destroyed {
        log::info!("player destroyed");
    }
    destroyed
}

/// Apply damage to an enemy and start its hit flash.
/// The caller decides what to do with a `Destroyed` outcome.
pub fn damage_enemy(
    enemies: &mut EnemyPools,
    scheduler: &mut Scheduler,
    r: EntityRef,
    amount: i32,
) -> DamageOutcome {
    let Some(enemy) = enemies.get_mut(r) else {
        return DamageOutcome::Ignored;
    };
    if !enemy.is_vulnerable() {
        return DamageOutcome::Absorbed;
    }
    if enemy.take_damage(amount) {
        return DamageOutcome::Destroyed;
    }

    // A new hit restarts the flash rather than stacking another
    let previous = enemy
        .active_effects
        .iter()
        .find(|e| e.kind == EffectKind::DamageFlashExpiry)
        .map(|e| e.handle);
    if let Some(handle) = previous {
        scheduler.cancel(handle);
        enemy.forget_effect(handle);
    }
    let handle = scheduler.schedule(
        TargetRef::Enemy(r),
        EffectKind::DamageFlashExpiry,
        Timing::Once {
            delay_ms: ENEMY_FLASH_MS,
        },
        EffectPayload::None,
    );
    enemy.track_effect(handle, EffectKind::DamageFlashExpiry);
    enemy.refresh_tint();
    DamageOutcome::Damaged
}

/// Award score, announce the kill and return the slot to its pool
pub fn destroy_enemy(
    r: EntityRef,
    enemies: &mut EnemyPools,
    scheduler: &mut Scheduler,
    score: &mut u64,
    events: &mut dyn EventSink,
) -> bool {
    let Some(enemy) = enemies.get(r) else {
        return false;
    };
    let (archetype, pos, score_value) = (enemy.archetype, enemy.pos, enemy.score_value);

    *score += u64::from(score_value);
    events.emit(GameEvent::Destroyed {
        entity: r,
        archetype,
        pos,
        score_value,
    });
    events.emit(GameEvent::ScoreChanged { score: *score });
    log::debug!("{:?} destroyed at ({:.0}, {:.0}), +{}", archetype, pos.x, pos.y, score_value);
    enemies.release(r, scheduler)
}

/// Schedule a delayed acid tick on a live enemy
pub fn apply_acid(
    enemies: &mut EnemyPools,
    scheduler: &mut Scheduler,
    r: EntityRef,
    damage: i32,
) -> Option<EffectHandle> {
    let enemy = enemies.get_mut(r)?;
    let handle = scheduler.schedule(
        TargetRef::Enemy(r),
        EffectKind::AcidTick,
        Timing::Once {
            delay_ms: ACID_DELAY_MS,
        },
        EffectPayload::Damage(damage),
    );
    enemy.track_effect(handle, EffectKind::AcidTick);
    enemy.refresh_tint();
    Some(handle)
}

/// Release projectiles that have left the world. No score.
pub fn cull_projectiles(pool: &mut SlotPool<Projectile>, scratch: &mut Vec<SlotRef>) -> usize {
    scratch.clear();
    scratch.extend(
        pool.iter_active()
            .filter(|(_, p)| is_offscreen(p.pos, p.radius))
            .map(|(r, _)| r),
    );
    for &r in scratch.iter() {
        pool.release(r);
    }
    scratch.len()
}

/// Outside the world rectangle grown by the culling margin
pub fn is_offscreen(pos: Vec2, radius: f32) -> bool {
    let m = OFFSCREEN_MARGIN + radius;
    pos.x < -m || pos.x > WORLD_WIDTH + m || pos.y < -m || pos.y > WORLD_HEIGHT + m
}
