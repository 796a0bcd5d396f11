//! Outbound simulation events
//!
//! Fire-and-forget notifications for the audio, HUD and rendering layers.
//! Consumers may drop or ignore any of them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Archetype, BossPhase, EntityRef, Faction, Variant};
use super::upgrades::UpgradeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned {
        entity: EntityRef,
        archetype: Archetype,
        variant: Variant,
        pos: Vec2,
    },
    Destroyed {
        entity: EntityRef,
        archetype: Archetype,
        pos: Vec2,
        score_value: u32,
    },
    /// A projectile left a muzzle
    Fired { faction: Faction, pos: Vec2 },
    /// An enemy took damage and survived
    Hit { entity: EntityRef, pos: Vec2 },
    PlayerDamaged { amount: i32, hp: i32, max_hp: i32 },
    ScoreChanged { score: u64 },
    PlayerHp { current: i32, max: i32 },
    TimeRemaining { ms: u64 },
    BossPhaseChanged { entity: EntityRef, phase: BossPhase },
    UpgradeApplied { id: UpgradeId },
    WaveStarted { wave: u32 },
    WaveComplete { wave: u32 },
    GameOver { score: u64, wave: u32 },
}

/// Receiver for [`GameEvent`]s
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}
