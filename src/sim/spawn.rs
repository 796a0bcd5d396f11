//! Wave/spawn director
//!
//! One recurring interval per archetype. Each elapsed interval is one spawn
//! attempt; an attempt against a full pool is dropped and the interval keeps
//! its cadence. The director can be paused (timers frozen) or stopped
//! (timers cancelled) independently of the simulation pause.

use glam::Vec2;
use rand::Rng;

use super::behavior::{BehaviorCtx, spawn_enemy};
use super::entity::{Archetype, EntityRef, Variant};
use super::events::GameEvent;
use super::pool::EnemyPools;
use crate::config::SpawnIntervals;
use crate::consts::*;

/// Spawn cadence gets this much faster per wave...
pub const WAVE_INTERVAL_SCALE: f32 = 0.9;
/// ...but never below this fraction of the base interval
pub const MIN_INTERVAL_FRACTION: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct SpawnTimer {
    pub archetype: Archetype,
    /// 0 disables the timer
    pub interval_ms: u64,
    elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SpawnDirector {
    timers: [SpawnTimer; Archetype::COUNT],
    paused: bool,
    stopped: bool,
}

impl SpawnDirector {
    pub fn new(intervals: &SpawnIntervals) -> Self {
        let mut director = Self {
            timers: std::array::from_fn(|i| SpawnTimer {
                archetype: Archetype::ALL[i],
                interval_ms: 0,
                elapsed_ms: 0,
            }),
            paused: false,
            stopped: false,
        };
        director.restart(intervals, 0);
        director
    }

    /// Re-arm every interval for `wave`
    pub fn restart(&mut self, intervals: &SpawnIntervals, wave: u32) {
        let scale = WAVE_INTERVAL_SCALE
            .powi(wave as i32)
            .max(MIN_INTERVAL_FRACTION);
        for timer in &mut self.timers {
            let base = intervals.for_archetype(timer.archetype);
            timer.interval_ms = (base as f32 * scale).round() as u64;
            timer.elapsed_ms = 0;
        }
        self.paused = false;
        self.stopped = false;
    }

    pub fn timer(&self, archetype: Archetype) -> &SpawnTimer {
        &self.timers[archetype.index()]
    }

    /// Freeze or unfreeze the interval timers
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Cancel every interval until the next `restart`
    pub fn stop(&mut self) {
        self.stopped = true;
        for timer in &mut self.timers {
            timer.elapsed_ms = 0;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Advance the timers and collect the archetypes due for a spawn attempt
    pub fn update(&mut self, dt_ms: u64, due: &mut Vec<Archetype>) {
        due.clear();
        if self.paused || self.stopped {
            return;
        }
        for timer in &mut self.timers {
            if timer.interval_ms == 0 {
                continue;
            }
            timer.elapsed_ms += dt_ms;
            while timer.elapsed_ms >= timer.interval_ms {
                timer.elapsed_ms -= timer.interval_ms;
                due.push(timer.archetype);
            }
        }
    }
}

/// Pick an item from `(item, weight)` pairs. Weights need not sum to 1.
pub fn pick_weighted<T: Copy>(weights: &[(T, f32)], roll: f32) -> Option<T> {
    let total: f32 = weights.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return weights.first().map(|(item, _)| *item);
    }
    let mut target = roll.clamp(0.0, 1.0) * total;
    for (item, weight) in weights {
        let weight = weight.max(0.0);
        if target < weight {
            return Some(*item);
        }
        target -= weight;
    }
    weights.last().map(|(item, _)| *item)
}

/// Acquire a slot for `archetype` and initialize it at the right edge.
/// Returns `None` (and spawns nothing) when the pool is full.
pub fn spawn_archetype(
    archetype: Archetype,
    enemies: &mut EnemyPools,
    ctx: &mut BehaviorCtx<'_>,
) -> Option<EntityRef> {
    let r = enemies.acquire(archetype)?;
    let roll: f32 = ctx.rng.random();
    let variant = pick_weighted(archetype.variant_weights(), roll).unwrap_or(Variant::Normal);
    let y = ctx
        .rng
        .random_range(SPAWN_MARGIN_Y..WORLD_HEIGHT - SPAWN_MARGIN_Y);

    let enemy = enemies.get_mut(r)?;
    spawn_enemy(enemy, r, variant, Vec2::new(SPAWN_X, y), ctx);
    ctx.events.emit(GameEvent::Spawned {
        entity: r,
        archetype,
        variant,
        pos: enemy.pos,
    });
    Some(r)
}
