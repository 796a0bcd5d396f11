//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool order, archetype order)
//! - No rendering, audio or platform dependencies

pub mod behavior;
pub mod collision;
pub mod combat;
pub mod entity;
pub mod events;
pub mod player;
pub mod pool;
pub mod scheduler;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrades;

pub use collision::{BodyRef, CollisionResult, Overlap, broad_phase, circle_collision};
pub use combat::{CombatOutcome, DamageOutcome};
pub use entity::{Archetype, BossPhase, Enemy, EntityRef, Faction, Projectile, Tint, Variant};
pub use events::{EventSink, GameEvent};
pub use player::{Player, PlayerState};
pub use pool::{EnemyPools, Poolable, SlotPool, SlotRef};
pub use scheduler::{EffectHandle, EffectKind, EffectPayload, Scheduler, TargetRef, TimedEffect, Timing};
pub use snapshot::{BodyKind, EntitySnapshot, HudSnapshot};
pub use spawn::SpawnDirector;
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, tick, tick_with_overlaps};
pub use upgrades::{Multipliers, UpgradeId, UpgradeRegistry};
