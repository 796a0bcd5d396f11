//! Per-archetype movement and attack behaviors
//!
//! Dispatch goes through a static table of function pointers indexed by
//! [`Archetype`], so pools stay homogeneous and there is no trait object per
//! enemy. Each entry has an initializer (run once on spawn) and an update
//! (run once per tick while active).
//!
//! Effect timing lives in the scheduler; updates only derive display state
//! (tint) from the effects currently tracked on the enemy.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{
    Archetype, BehaviorState, BossPhase, Enemy, EntityRef, Faction, Projectile, Variant,
};
use super::events::{EventSink, GameEvent};
use super::pool::SlotPool;
use super::scheduler::{EffectKind, EffectPayload, Scheduler, TargetRef, Timing};
use crate::consts::*;

/// Kamikazes stop closing in below this distance to avoid jitter
pub const KAMIKAZE_STOP_DISTANCE: f32 = 10.0;

pub const GUNNER_FIRE_RATE_MS: u64 = 2500;
/// The first gunner shot comes this much earlier than a full period
pub const GUNNER_FIRST_SHOT_LEAD_MS: u64 = 1500;
pub const GUNNER_SHOT_SPEED: f32 = 300.0;
pub const GUNNER_LARGE_SHOT_SPEED: f32 = 200.0;
pub const GUNNER_SHOT_DAMAGE: i32 = 10;
pub const GUNNER_SHOT_RADIUS: f32 = 6.0;
pub const GUNNER_LARGE_SHOT_RADIUS: f32 = 9.0;

pub const LEAPER_AMPLITUDE: f32 = 100.0;
/// Radians per millisecond
pub const LEAPER_FREQUENCY: f32 = 0.003;
/// Vertical velocity per pixel of gap to the target Y (1/s)
pub const LEAPER_FOLLOW_GAIN: f32 = 6.0;

pub const MOTHERSHIP_DISSOLVE_MS: u64 = 2000;
pub const MOTHERSHIP_ENTER_MS: u64 = 3000;
pub const MOTHERSHIP_ENTRY: Vec2 = Vec2::new(WORLD_WIDTH + 60.0, WORLD_HEIGHT / 2.0);
pub const MOTHERSHIP_ANCHOR: Vec2 = Vec2::new(WORLD_WIDTH - 150.0, WORLD_HEIGHT / 2.0);
pub const MOTHERSHIP_BOB_AMPLITUDE: f32 = 20.0;
/// Radians per millisecond
pub const MOTHERSHIP_BOB_FREQUENCY: f32 = 0.002;
pub const MOTHERSHIP_FIRE_INTERVAL_MS: u64 = 1200;
pub const MOTHERSHIP_SHOT_SPEED: f32 = 250.0;
pub const MOTHERSHIP_SHOT_DAMAGE: i32 = 15;
pub const MOTHERSHIP_SHOT_RADIUS: f32 = 8.0;

/// Everything a behavior may touch besides its own enemy
pub struct BehaviorCtx<'a> {
    /// Logical clock (ms)
    pub now: u64,
    /// Tick length in seconds
    pub dt: f32,
    pub player_pos: Vec2,
    pub enemy_shots: &'a mut SlotPool<Projectile>,
    pub scheduler: &'a mut Scheduler,
    pub rng: &'a mut Pcg32,
    pub events: &'a mut dyn EventSink,
}

pub type BehaviorFn = fn(&mut Enemy, EntityRef, &mut BehaviorCtx<'_>);

/// Behavior table entry
pub struct Behavior {
    pub init: BehaviorFn,
    pub update: BehaviorFn,
}

static BEHAVIORS: [Behavior; Archetype::COUNT] = [
    Behavior {
        init: init_asteroid,
        update: update_asteroid,
    },
    Behavior {
        init: init_kamikaze,
        update: update_kamikaze,
    },
    Behavior {
        init: init_gunner,
        update: update_gunner,
    },
    Behavior {
        init: init_leaper,
        update: update_leaper,
    },
    Behavior {
        init: init_mothership,
        update: update_mothership,
    },
];

pub fn behavior_for(archetype: Archetype) -> &'static Behavior {
    &BEHAVIORS[archetype.index()]
}

/// Initialize a freshly acquired slot
pub fn spawn_enemy(
    enemy: &mut Enemy,
    r: EntityRef,
    variant: Variant,
    pos: Vec2,
    ctx: &mut BehaviorCtx<'_>,
) {
    enemy.activate(r.archetype, variant, pos);
    (behavior_for(r.archetype).init)(enemy, r, ctx);
}

/// Run one tick of behavior, then integrate velocity
pub fn update_enemy(enemy: &mut Enemy, r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    (behavior_for(enemy.archetype).update)(enemy, r, ctx);
    enemy.pos += enemy.vel * ctx.dt;
    enemy.refresh_tint();
}

// --- Asteroid: straight line ---

fn init_asteroid(enemy: &mut Enemy, _r: EntityRef, _ctx: &mut BehaviorCtx<'_>) {
    let speed = super::entity::variant_stats(enemy.archetype, enemy.variant).speed;
    enemy.vel = Vec2::new(-speed, 0.0);
}

fn update_asteroid(enemy: &mut Enemy, _r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    // Purely cosmetic spin
    enemy.rotation += 1.5 * ctx.dt;
}

// --- Kamikaze: homing ---

fn init_kamikaze(enemy: &mut Enemy, r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    update_kamikaze(enemy, r, ctx);
}

fn update_kamikaze(enemy: &mut Enemy, _r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    let speed = super::entity::variant_stats(enemy.archetype, enemy.variant).speed;
    let to_player = ctx.player_pos - enemy.pos;
    let distance = to_player.length();
    if distance < KAMIKAZE_STOP_DISTANCE {
        enemy.vel = Vec2::ZERO;
        return;
    }
    enemy.vel = to_player / distance * speed;
    enemy.rotation = enemy.vel.y.atan2(enemy.vel.x);
}

// --- Gunner: drift + periodic fire ---

fn gunner_shot(variant: Variant) -> (f32, f32) {
    match variant {
        Variant::Large => (GUNNER_LARGE_SHOT_SPEED, GUNNER_LARGE_SHOT_RADIUS),
        _ => (GUNNER_SHOT_SPEED, GUNNER_SHOT_RADIUS),
    }
}

fn init_gunner(enemy: &mut Enemy, _r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    let speed = super::entity::variant_stats(enemy.archetype, enemy.variant).speed;
    enemy.vel = Vec2::new(-speed, 0.0);
    enemy.behavior = BehaviorState::Gunner {
        next_fire_at: ctx.now + GUNNER_FIRE_RATE_MS - GUNNER_FIRST_SHOT_LEAD_MS,
    };
}

fn update_gunner(enemy: &mut Enemy, _r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    let BehaviorState::Gunner { next_fire_at } = enemy.behavior else {
        return;
    };
    if ctx.now < next_fire_at {
        return;
    }
    // The cadence moves on whether or not a slot was free
    enemy.behavior = BehaviorState::Gunner {
        next_fire_at: ctx.now + GUNNER_FIRE_RATE_MS,
    };
    let (speed, radius) = gunner_shot(enemy.variant);
    let muzzle = enemy.pos - Vec2::new(enemy.radius, 0.0);
    fire_enemy_shot(ctx, muzzle, Vec2::new(-speed, 0.0), GUNNER_SHOT_DAMAGE, radius);
}

// --- Leaper: sinusoidal ---

fn init_leaper(enemy: &mut Enemy, _r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    let speed = super::entity::variant_stats(enemy.archetype, enemy.variant).speed;
    enemy.vel = Vec2::new(-speed, 0.0);
    enemy.behavior = BehaviorState::Leaper {
        start_y: enemy.pos.y,
        started_at: ctx.now,
    };
}

fn update_leaper(enemy: &mut Enemy, _r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    let BehaviorState::Leaper {
        start_y,
        started_at,
    } = enemy.behavior
    else {
        return;
    };
    let elapsed = ctx.now.saturating_sub(started_at) as f32;
    let target_y = start_y + LEAPER_AMPLITUDE * (LEAPER_FREQUENCY * elapsed).sin();
    // Approach the target rather than snapping to it
    enemy.vel.y = (target_y - enemy.pos.y) * LEAPER_FOLLOW_GAIN;
}

// --- Mothership: phased boss ---

fn init_mothership(enemy: &mut Enemy, r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    enemy.pos = MOTHERSHIP_ENTRY;
    enemy.vel = Vec2::ZERO;
    enemy.alpha = 0.0;
    enemy.behavior = BehaviorState::Mothership {
        phase: BossPhase::Dissolving,
        phase_started_at: ctx.now,
        origin: enemy.pos,
        next_fire_at: u64::MAX,
    };
    let handle = ctx.scheduler.schedule(
        TargetRef::Enemy(r),
        EffectKind::BossPhaseAdvance,
        Timing::Once {
            delay_ms: MOTHERSHIP_DISSOLVE_MS,
        },
        EffectPayload::Phase(BossPhase::Entering),
    );
    enemy.track_effect(handle, EffectKind::BossPhaseAdvance);
}

fn update_mothership(enemy: &mut Enemy, _r: EntityRef, ctx: &mut BehaviorCtx<'_>) {
    let BehaviorState::Mothership {
        phase,
        phase_started_at,
        origin,
        next_fire_at,
    } = enemy.behavior
    else {
        return;
    };
    let elapsed = ctx.now.saturating_sub(phase_started_at);
    enemy.vel = Vec2::ZERO;

    match phase {
        BossPhase::Dissolving => {
            enemy.alpha = (elapsed as f32 / MOTHERSHIP_DISSOLVE_MS as f32).min(1.0);
        }
        BossPhase::Entering => {
            enemy.alpha = 1.0;
            let t = (elapsed as f32 / MOTHERSHIP_ENTER_MS as f32).clamp(0.0, 1.0);
            let eased = t * t * (3.0 - 2.0 * t);
            enemy.pos = origin.lerp(MOTHERSHIP_ANCHOR, eased);
        }
        BossPhase::Engaging => {
            let bob = (MOTHERSHIP_BOB_FREQUENCY * elapsed as f32).sin();
            enemy.pos.y = origin.y + MOTHERSHIP_BOB_AMPLITUDE * bob;

            if ctx.now >= next_fire_at {
                enemy.behavior = BehaviorState::Mothership {
                    phase,
                    phase_started_at,
                    origin,
                    next_fire_at: ctx.now + MOTHERSHIP_FIRE_INTERVAL_MS,
                };
                // Muzzle: random point inside the hull
                let angle = ctx.rng.random_range(0.0..std::f32::consts::TAU);
                let dist = enemy.radius * ctx.rng.random::<f32>().sqrt();
                let muzzle = enemy.pos + Vec2::new(angle.cos(), angle.sin()) * dist;
                let mut dir = (ctx.player_pos - muzzle).normalize_or_zero();
                if dir == Vec2::ZERO {
                    dir = Vec2::NEG_X;
                }
                fire_enemy_shot(
                    ctx,
                    muzzle,
                    dir * MOTHERSHIP_SHOT_SPEED,
                    MOTHERSHIP_SHOT_DAMAGE,
                    MOTHERSHIP_SHOT_RADIUS,
                );
            }
        }
    }
}

/// Move a mothership into `next`. Returns false if it is not a mothership or
/// is already in that phase.
pub fn advance_boss_phase(
    enemy: &mut Enemy,
    r: EntityRef,
    next: BossPhase,
    now: u64,
    scheduler: &mut Scheduler,
) -> bool {
    let BehaviorState::Mothership {
        phase,
        next_fire_at,
        ..
    } = enemy.behavior
    else {
        return false;
    };
    if phase == next {
        return false;
    }

    let next_fire_at = match next {
        BossPhase::Entering => {
            let handle = scheduler.schedule(
                TargetRef::Enemy(r),
                EffectKind::BossPhaseAdvance,
                Timing::Once {
                    delay_ms: MOTHERSHIP_ENTER_MS,
                },
                EffectPayload::Phase(BossPhase::Engaging),
            );
            enemy.track_effect(handle, EffectKind::BossPhaseAdvance);
            next_fire_at
        }
        BossPhase::Engaging => {
            enemy.alpha = 1.0;
            now + MOTHERSHIP_FIRE_INTERVAL_MS
        }
        BossPhase::Dissolving => next_fire_at,
    };
    enemy.behavior = BehaviorState::Mothership {
        phase: next,
        phase_started_at: now,
        origin: enemy.pos,
        next_fire_at,
    };
    log::info!("mothership {:?} -> {:?}", phase, next);
    true
}

/// Launch an enemy projectile. A full pool skips the shot.
fn fire_enemy_shot(ctx: &mut BehaviorCtx<'_>, pos: Vec2, vel: Vec2, damage: i32, radius: f32) -> bool {
    let Some(r) = ctx.enemy_shots.acquire() else {
        log::warn!("enemy shot pool exhausted, shot skipped");
        return false;
    };
    if let Some(shot) = ctx.enemy_shots.get_mut(r) {
        shot.launch(pos, vel, damage, radius);
    }
    ctx.events.emit(GameEvent::Fired {
        faction: Faction::Enemy,
        pos,
    });
    true
}
