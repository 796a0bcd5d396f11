//! Upgrade registry
//!
//! Holds the unlocked permanent upgrades and a multiplier table derived from
//! them. The table is rebuilt on every unlock; nothing else stores derived
//! stats.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UpgradeId {
    /// Max HP x1.5
    Vitality,
    /// Fire rate x1.5
    RapidFire,
    /// Bullet speed x1.5
    VelocityRounds,
    /// Bullet scale and damage x1.5
    HeavyRounds,
    /// Movement speed x1.25
    Thrusters,
    /// Incoming damage x0.75
    Plating,
    /// Periodic self-repair
    Regenerator,
    /// Brief invincibility after every hit
    PhaseShield,
    /// Hits leave a delayed acid burn
    AcidRounds,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 9] = [
        UpgradeId::Vitality,
        UpgradeId::RapidFire,
        UpgradeId::VelocityRounds,
        UpgradeId::HeavyRounds,
        UpgradeId::Thrusters,
        UpgradeId::Plating,
        UpgradeId::Regenerator,
        UpgradeId::PhaseShield,
        UpgradeId::AcidRounds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeId::Vitality => "vitality",
            UpgradeId::RapidFire => "rapid_fire",
            UpgradeId::VelocityRounds => "velocity_rounds",
            UpgradeId::HeavyRounds => "heavy_rounds",
            UpgradeId::Thrusters => "thrusters",
            UpgradeId::Plating => "plating",
            UpgradeId::Regenerator => "regenerator",
            UpgradeId::PhaseShield => "phase_shield",
            UpgradeId::AcidRounds => "acid_rounds",
        }
    }

    /// Parse a menu id (case-insensitive, `-` and `_` interchangeable)
    pub fn from_name(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|id| id.as_str() == normalized)
    }
}

/// Derived stat multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub health: f32,
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_scale: f32,
    pub bullet_damage: f32,
    pub move_speed: f32,
    /// Applied to incoming damage (< 1 reduces it)
    pub damage_taken: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            health: 1.0,
            fire_rate: 1.0,
            bullet_speed: 1.0,
            bullet_scale: 1.0,
            bullet_damage: 1.0,
            move_speed: 1.0,
            damage_taken: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpgradeRegistry {
    unlocked: BTreeSet<UpgradeId>,
    multipliers: Multipliers,
    /// Bumped on every change so dependents can tell when to recompute
    revision: u64,
}

impl UpgradeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlock an upgrade. Re-applying one already held is a no-op.
    pub fn apply(&mut self, id: UpgradeId) -> bool {
        if !self.unlocked.insert(id) {
            log::warn!("upgrade {} already active, ignoring", id.as_str());
            return false;
        }
        self.recompute();
        log::info!("upgrade unlocked: {}", id.as_str());
        true
    }

    pub fn has(&self, id: UpgradeId) -> bool {
        self.unlocked.contains(&id)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = UpgradeId> + '_ {
        self.unlocked.iter().copied()
    }

    pub fn multipliers(&self) -> &Multipliers {
        &self.multipliers
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn auto_heal(&self) -> bool {
        self.has(UpgradeId::Regenerator)
    }

    pub fn invincible_on_hit(&self) -> bool {
        self.has(UpgradeId::PhaseShield)
    }

    pub fn acid_rounds(&self) -> bool {
        self.has(UpgradeId::AcidRounds)
    }

    /// Forget every upgrade (session restart)
    pub fn reset(&mut self) {
        self.unlocked.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        let mut m = Multipliers::default();
        for id in &self.unlocked {
            match id {
                UpgradeId::Vitality => m.health *= 1.5,
                UpgradeId::RapidFire => m.fire_rate *= 1.5,
                UpgradeId::VelocityRounds => m.bullet_speed *= 1.5,
                UpgradeId::HeavyRounds => {
                    m.bullet_scale *= 1.5;
                    m.bullet_damage *= 1.5;
                }
                UpgradeId::Thrusters => m.move_speed *= 1.25,
                UpgradeId::Plating => m.damage_taken *= 0.75,
                UpgradeId::Regenerator | UpgradeId::PhaseShield | UpgradeId::AcidRounds => {}
            }
        }
        self.multipliers = m;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_idempotent() {
        let mut reg = UpgradeRegistry::new();
        assert!(reg.apply(UpgradeId::RapidFire));
        let rev = reg.revision();
        assert!(!reg.apply(UpgradeId::RapidFire));
        assert_eq!(reg.revision(), rev);
        assert_eq!(reg.multipliers().fire_rate, 1.5);
    }

    #[test]
    fn test_multipliers_derived_from_set() {
        let mut reg = UpgradeRegistry::new();
        reg.apply(UpgradeId::HeavyRounds);
        reg.apply(UpgradeId::Plating);
        let m = reg.multipliers();
        assert_eq!(m.bullet_scale, 1.5);
        assert_eq!(m.bullet_damage, 1.5);
        assert_eq!(m.damage_taken, 0.75);
        assert_eq!(m.health, 1.0);

        reg.reset();
        assert_eq!(*reg.multipliers(), Multipliers::default());
        assert!(!reg.has(UpgradeId::HeavyRounds));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(UpgradeId::from_name("Phase-Shield"), Some(UpgradeId::PhaseShield));
        assert_eq!(UpgradeId::from_name("acid_rounds"), Some(UpgradeId::AcidRounds));
        assert_eq!(UpgradeId::from_name("laser"), None);
    }
}
