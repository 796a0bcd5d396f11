//! Player preferences
//!
//! Kept apart from session config: these survive restarts and only affect
//! presentation. Volume changes go through an edit/confirm workflow so a menu
//! can preview a value and then commit or discard it.

use serde::{Deserialize, Serialize};

/// Which volume slider an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeChannel {
    Master,
    Sfx,
    Music,
}

impl VolumeChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeChannel::Master => "master",
            VolumeChannel::Sfx => "sfx",
            VolumeChannel::Music => "music",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "master" => Some(VolumeChannel::Master),
            "sfx" | "effects" => Some(VolumeChannel::Sfx),
            "music" => Some(VolumeChannel::Music),
            _ => None,
        }
    }
}

/// An uncommitted volume change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingEdit {
    pub channel: VolumeChannel,
    pub value: f32,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Presentation ===
    /// Screen shake on explosions/impacts
    pub screen_shake: bool,
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (minimize shake, flashes)
    pub reduced_motion: bool,
    /// High contrast mode
    pub high_contrast: bool,

    #[serde(skip)]
    pending: Option<PendingEdit>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,

            screen_shake: true,
            show_fps: false,

            reduced_motion: false,
            high_contrast: false,

            pending: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.clamp_volumes();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    pub fn volume(&self, channel: VolumeChannel) -> f32 {
        match channel {
            VolumeChannel::Master => self.master_volume,
            VolumeChannel::Sfx => self.sfx_volume,
            VolumeChannel::Music => self.music_volume,
        }
    }

    fn volume_mut(&mut self, channel: VolumeChannel) -> &mut f32 {
        match channel {
            VolumeChannel::Master => &mut self.master_volume,
            VolumeChannel::Sfx => &mut self.sfx_volume,
            VolumeChannel::Music => &mut self.music_volume,
        }
    }

    fn clamp_volumes(&mut self) {
        for channel in [VolumeChannel::Master, VolumeChannel::Sfx, VolumeChannel::Music] {
            let v = self.volume_mut(channel);
            *v = v.clamp(0.0, 1.0);
        }
    }

    pub fn pending(&self) -> Option<PendingEdit> {
        self.pending
    }

    /// Start editing a channel from its current value. Replaces any edit
    /// already in progress.
    pub fn begin_edit(&mut self, channel: VolumeChannel) {
        if let Some(previous) = self.pending {
            log::warn!(
                "discarding pending {} edit to start {}",
                previous.channel.as_str(),
                channel.as_str()
            );
        }
        self.pending = Some(PendingEdit {
            channel,
            value: self.volume(channel),
        });
    }

    /// Nudge the pending value. No-op without a pending edit.
    pub fn adjust(&mut self, delta: f32) -> bool {
        match self.pending.as_mut() {
            Some(edit) => {
                edit.value = (edit.value + delta).clamp(0.0, 1.0);
                true
            }
            None => {
                log::warn!("adjust with no pending edit ignored");
                false
            }
        }
    }

    /// Commit the pending value
    pub fn confirm_edit(&mut self) -> bool {
        let Some(edit) = self.pending.take() else {
            log::warn!("confirm with no pending edit ignored");
            return false;
        };
        *self.volume_mut(edit.channel) = edit.value;
        log::info!("{} volume set to {:.2}", edit.channel.as_str(), edit.value);
        true
    }

    /// Drop the pending value
    pub fn cancel_edit(&mut self) -> bool {
        if self.pending.take().is_none() {
            log::warn!("cancel with no pending edit ignored");
            return false;
        }
        true
    }
}
