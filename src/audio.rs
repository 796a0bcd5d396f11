//! Audio adapter
//!
//! Turns simulation events into sound cues for whatever backend the host
//! plays them with. Nothing here produces samples; a cue is just which sound
//! and how loud.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::entity::{Archetype, Faction};
use crate::sim::events::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player shot
    PlayerFire,
    /// Gunner or mothership shot
    EnemyFire,
    /// Enemy damaged but alive
    Hit,
    /// Small enemy destroyed
    Explosion,
    /// Mothership destroyed
    BigExplosion,
    /// Player took damage
    PlayerDamaged,
    /// Mothership changed phase
    BossPhase,
    /// Upgrade unlocked
    Upgrade,
    /// Wave timer ran out
    WaveClear,
    /// Player destroyed
    GameOver,
}

impl SoundEffect {
    /// The cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Fired {
                faction: Faction::Player,
                ..
            } => Some(SoundEffect::PlayerFire),
            GameEvent::Fired {
                faction: Faction::Enemy,
                ..
            } => Some(SoundEffect::EnemyFire),
            GameEvent::Hit { .. } => Some(SoundEffect::Hit),
            GameEvent::Destroyed {
                archetype: Archetype::Mothership,
                ..
            } => Some(SoundEffect::BigExplosion),
            GameEvent::Destroyed { .. } => Some(SoundEffect::Explosion),
            GameEvent::PlayerDamaged { .. } => Some(SoundEffect::PlayerDamaged),
            GameEvent::BossPhaseChanged { .. } => Some(SoundEffect::BossPhase),
            GameEvent::UpgradeApplied { .. } => Some(SoundEffect::Upgrade),
            GameEvent::WaveComplete { .. } => Some(SoundEffect::WaveClear),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }

    /// Relative loudness before volume settings
    fn base_gain(self) -> f32 {
        match self {
            SoundEffect::PlayerFire => 0.3,
            SoundEffect::EnemyFire => 0.35,
            SoundEffect::Hit => 0.4,
            SoundEffect::Explosion => 0.7,
            SoundEffect::BigExplosion => 1.0,
            SoundEffect::PlayerDamaged => 0.8,
            SoundEffect::BossPhase => 0.9,
            SoundEffect::Upgrade => 0.6,
            SoundEffect::WaveClear => 0.8,
            SoundEffect::GameOver => 1.0,
        }
    }
}

/// One sound for the backend to play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioCue {
    pub effect: SoundEffect,
    /// Final gain in 0.0 - 1.0
    pub volume: f32,
}

/// Audio manager for the game
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Cap on cues queued between drains; extras are dropped
    max_queued: usize,
    queue: Vec<AudioCue>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            max_queued: 32,
            queue: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut manager = Self::new();
        manager.apply_settings(settings);
        manager
    }

    /// Pick up volume and mute changes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Queue a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if self.queue.len() >= self.max_queued {
            log::debug!("audio queue full, {:?} dropped", effect);
            return;
        }
        self.queue.push(AudioCue {
            effect,
            volume: (vol * effect.base_gain()).clamp(0.0, 1.0),
        });
    }

    /// Queue cues for every event that has one
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    /// Hand queued cues to the backend
    pub fn drain_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityRef;
    use crate::sim::pool::SlotRef;
    use glam::Vec2;

    fn destroyed(archetype: Archetype) -> GameEvent {
        GameEvent::Destroyed {
            entity: EntityRef {
                archetype,
                slot: SlotRef {
                    index: 0,
                    generation: 1,
                },
            },
            archetype,
            pos: Vec2::ZERO,
            score_value: 10,
        }
    }

    #[test]
    fn test_events_map_to_cues() {
        assert_eq!(
            SoundEffect::for_event(&destroyed(Archetype::Asteroid)),
            Some(SoundEffect::Explosion)
        );
        assert_eq!(
            SoundEffect::for_event(&destroyed(Archetype::Mothership)),
            Some(SoundEffect::BigExplosion)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Fired {
                faction: Faction::Enemy,
                pos: Vec2::ZERO
            }),
            Some(SoundEffect::EnemyFire)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::ScoreChanged { score: 5 }), None);
    }

    #[test]
    fn test_muted_manager_queues_nothing() {
        let mut audio = AudioManager::new();
        audio.set_muted(true);
        audio.handle_events(&[destroyed(Archetype::Gunner)]);
        assert!(audio.drain_cues().is_empty());
    }

    #[test]
    fn test_volume_scales_cue() {
        let mut audio = AudioManager::new();
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0);
        audio.play(SoundEffect::GameOver);
        let cues = audio.drain_cues();
        assert_eq!(cues.len(), 1);
        assert!((cues[0].volume - 0.5).abs() < 1e-6);
        assert!(audio.drain_cues().is_empty());
    }

    #[test]
    fn test_queue_is_capped() {
        let mut audio = AudioManager::new();
        for _ in 0..100 {
            audio.play(SoundEffect::PlayerFire);
        }
        assert_eq!(audio.drain_cues().len(), 32);
    }

    #[test]
    fn test_settings_applied() {
        let mut settings = Settings::default();
        settings.muted = true;
        let mut audio = AudioManager::from_settings(&settings);
        audio.play(SoundEffect::Hit);
        assert!(audio.drain_cues().is_empty());
    }
}
