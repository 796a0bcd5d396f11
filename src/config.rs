//! Session configuration
//!
//! Everything a host may tune per run. Missing JSON fields fall back to the
//! defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::entity::Archetype;

/// Slots per pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolCapacities {
    pub asteroid: usize,
    pub kamikaze: usize,
    pub gunner: usize,
    pub leaper: usize,
    pub mothership: usize,
    pub player_shots: usize,
    pub enemy_shots: usize,
}

impl Default for PoolCapacities {
    fn default() -> Self {
        Self {
            asteroid: ASTEROID_CAPACITY,
            kamikaze: KAMIKAZE_CAPACITY,
            gunner: GUNNER_CAPACITY,
            leaper: LEAPER_CAPACITY,
            mothership: MOTHERSHIP_CAPACITY,
            player_shots: PLAYER_SHOT_CAPACITY,
            enemy_shots: ENEMY_SHOT_CAPACITY,
        }
    }
}

impl PoolCapacities {
    pub fn for_archetype(&self, archetype: Archetype) -> usize {
        match archetype {
            Archetype::Asteroid => self.asteroid,
            Archetype::Kamikaze => self.kamikaze,
            Archetype::Gunner => self.gunner,
            Archetype::Leaper => self.leaper,
            Archetype::Mothership => self.mothership,
        }
    }
}

/// Base spawn interval per archetype, in ms of logical time. 0 disables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnIntervals {
    pub asteroid_ms: u64,
    pub kamikaze_ms: u64,
    pub gunner_ms: u64,
    pub leaper_ms: u64,
    pub mothership_ms: u64,
}

impl Default for SpawnIntervals {
    fn default() -> Self {
        Self {
            asteroid_ms: 1500,
            kamikaze_ms: 3000,
            gunner_ms: 4000,
            leaper_ms: 3500,
            mothership_ms: 45_000,
        }
    }
}

impl SpawnIntervals {
    pub fn for_archetype(&self, archetype: Archetype) -> u64 {
        match archetype {
            Archetype::Asteroid => self.asteroid_ms,
            Archetype::Kamikaze => self.kamikaze_ms,
            Archetype::Gunner => self.gunner_ms,
            Archetype::Leaper => self.leaper_ms,
            Archetype::Mothership => self.mothership_ms,
        }
    }

    /// No spawning at all; handy for scripted scenarios
    pub fn disabled() -> Self {
        Self {
            asteroid_ms: 0,
            kamikaze_ms: 0,
            gunner_ms: 0,
            leaper_ms: 0,
            mothership_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// RNG seed; identical seeds and inputs replay identically
    pub seed: u64,
    pub wave_duration_ms: u64,
    pub capacities: PoolCapacities,
    pub spawn_intervals: SpawnIntervals,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            wave_duration_ms: WAVE_DURATION_MS,
            capacities: PoolCapacities::default(),
            spawn_intervals: SpawnIntervals::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
