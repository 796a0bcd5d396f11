//! Entity data model and archetype balance tables
//!
//! Enemies are a closed set of archetypes sharing one record layout, so every
//! pool stores the same `Enemy` type. Archetype-specific state lives in
//! [`BehaviorState`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::{Poolable, SlotRef};
use super::scheduler::{EffectHandle, EffectKind};

/// Enemy category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Archetype {
    #[default]
    Asteroid,
    Kamikaze,
    Gunner,
    Leaper,
    Mothership,
}

impl Archetype {
    pub const COUNT: usize = 5;
    pub const ALL: [Archetype; Self::COUNT] = [
        Archetype::Asteroid,
        Archetype::Kamikaze,
        Archetype::Gunner,
        Archetype::Leaper,
        Archetype::Mothership,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Subtype weights for the spawn draw
    pub fn variant_weights(self) -> &'static [(Variant, f32)] {
        match self {
            Archetype::Kamikaze => &[(Variant::Normal, 0.75), (Variant::Fast, 0.25)],
            Archetype::Gunner => &[(Variant::Normal, 0.7), (Variant::Large, 0.3)],
            _ => &[(Variant::Normal, 1.0)],
        }
    }
}

/// Archetype-specific variant chosen at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    Normal,
    /// Kamikaze only
    Fast,
    /// Gunner only
    Large,
}

/// Display tint handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tint {
    #[default]
    Base,
    /// Fast kamikaze marker
    Fast,
    /// Damage flash
    Hit,
    /// Acid damage pending
    Acid,
}

/// Per-variant balance values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantStats {
    pub max_hp: i32,
    /// Movement speed (px/s); homing speed for kamikazes
    pub speed: f32,
    pub score: u32,
    pub radius: f32,
    /// Damage dealt to the player on body contact
    pub contact_damage: i32,
    pub tint: Tint,
}

pub fn variant_stats(archetype: Archetype, variant: Variant) -> VariantStats {
    let base = VariantStats {
        max_hp: 30,
        speed: 150.0,
        score: 10,
        radius: 22.0,
        contact_damage: 10,
        tint: Tint::Base,
    };
    match (archetype, variant) {
        (Archetype::Asteroid, _) => base,
        (Archetype::Kamikaze, Variant::Fast) => VariantStats {
            max_hp: 20,
            speed: KAMIKAZE_FAST_SPEED,
            score: 30,
            radius: 16.0,
            contact_damage: 20,
            tint: Tint::Fast,
        },
        (Archetype::Kamikaze, _) => VariantStats {
            max_hp: 20,
            speed: KAMIKAZE_SPEED,
            score: 20,
            radius: 16.0,
            contact_damage: 20,
            tint: Tint::Base,
        },
        (Archetype::Gunner, Variant::Large) => VariantStats {
            max_hp: 80,
            speed: 80.0,
            score: 50,
            radius: 32.0,
            contact_damage: 25,
            tint: Tint::Base,
        },
        (Archetype::Gunner, _) => VariantStats {
            max_hp: 40,
            speed: 100.0,
            score: 30,
            radius: 20.0,
            contact_damage: 15,
            tint: Tint::Base,
        },
        (Archetype::Leaper, _) => VariantStats {
            max_hp: 30,
            speed: 120.0,
            score: 25,
            radius: 18.0,
            contact_damage: 15,
            tint: Tint::Base,
        },
        (Archetype::Mothership, _) => VariantStats {
            max_hp: 1000,
            speed: 0.0,
            score: 500,
            radius: 80.0,
            contact_damage: 30,
            tint: Tint::Base,
        },
    }
}

pub const KAMIKAZE_SPEED: f32 = 200.0;
pub const KAMIKAZE_FAST_SPEED: f32 = 320.0;

/// Mothership phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossPhase {
    /// Fading in (alpha 0 -> 1)
    #[default]
    Dissolving,
    /// Gliding to the on-screen anchor
    Entering,
    /// Hovering and firing
    Engaging,
}

/// Archetype-specific behavior fields
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BehaviorState {
    #[default]
    None,
    Gunner {
        next_fire_at: u64,
    },
    Leaper {
        start_y: f32,
        started_at: u64,
    },
    Mothership {
        phase: BossPhase,
        phase_started_at: u64,
        /// Position at the start of the current phase
        origin: Vec2,
        next_fire_at: u64,
    },
}

/// Weak reference to an enemy slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub archetype: Archetype,
    pub slot: SlotRef,
}

/// An effect currently aimed at an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    pub handle: EffectHandle,
    pub kind: EffectKind,
}

/// Pooled enemy record
#[derive(Debug, Clone)]
pub struct Enemy {
    pub archetype: Archetype,
    pub variant: Variant,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing (radians), for rendering
    pub rotation: f32,
    pub alpha: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub score_value: u32,
    pub radius: f32,
    pub contact_damage: i32,
    pub tint: Tint,
    pub active_effects: Vec<ActiveEffect>,
    pub behavior: BehaviorState,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            archetype: Archetype::Asteroid,
            variant: Variant::Normal,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            alpha: 1.0,
            hp: 0,
            max_hp: 0,
            score_value: 0,
            radius: 0.0,
            contact_damage: 0,
            tint: Tint::Base,
            active_effects: Vec::with_capacity(8),
            behavior: BehaviorState::None,
        }
    }
}

impl Poolable for Enemy {
    fn reset(&mut self) {
        // Position and velocity are left for the next occupant to overwrite
        self.hp = 0;
        self.active_effects.clear();
        self.tint = Tint::Base;
        self.behavior = BehaviorState::None;
    }
}

impl Enemy {
    /// Fill the common fields for a fresh activation
    pub fn activate(&mut self, archetype: Archetype, variant: Variant, pos: Vec2) {
        let stats = variant_stats(archetype, variant);
        self.archetype = archetype;
        self.variant = variant;
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.rotation = 0.0;
        self.alpha = 1.0;
        self.hp = stats.max_hp;
        self.max_hp = stats.max_hp;
        self.score_value = stats.score;
        self.radius = stats.radius;
        self.contact_damage = stats.contact_damage;
        self.tint = stats.tint;
        self.active_effects.clear();
        self.behavior = BehaviorState::None;
    }

    /// Apply damage, clamped to `[0, max_hp]`. Returns true when HP hits 0.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let amount = amount.max(0);
        self.hp = (self.hp - amount).clamp(0, self.max_hp);
        self.hp == 0
    }

    /// Whether projectile damage currently applies
    pub fn is_vulnerable(&self) -> bool {
        match self.behavior {
            BehaviorState::Mothership { phase, .. } => phase == BossPhase::Engaging,
            _ => true,
        }
    }

    pub fn track_effect(&mut self, handle: EffectHandle, kind: EffectKind) {
        self.active_effects.push(ActiveEffect { handle, kind });
    }

    pub fn forget_effect(&mut self, handle: EffectHandle) {
        self.active_effects.retain(|e| e.handle != handle);
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.active_effects.iter().any(|e| e.kind == kind)
    }

    /// Derive the display tint from pending effects. Flash wins over acid.
    pub fn refresh_tint(&mut self) {
        self.tint = if self.has_effect(EffectKind::DamageFlashExpiry) {
            Tint::Hit
        } else if self.has_effect(EffectKind::AcidTick) {
            Tint::Acid
        } else {
            variant_stats(self.archetype, self.variant).tint
        };
    }
}

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Faction {
    #[default]
    Player,
    Enemy,
}

/// Pooled projectile
#[derive(Debug, Clone, Default)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub radius: f32,
}

impl Poolable for Projectile {
    fn reset(&mut self) {
        self.damage = 0;
        self.vel = Vec2::ZERO;
    }
}

impl Projectile {
    pub fn launch(&mut self, pos: Vec2, vel: Vec2, damage: i32, radius: f32) {
        self.pos = pos;
        self.vel = vel;
        self.damage = damage;
        self.radius = radius;
    }
}
