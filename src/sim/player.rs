//! Player controller
//!
//! Vertical movement, firing cadence, HP and the Normal/Invincible state
//! machine. Upgrade-derived stats are read from the [`UpgradeRegistry`] on
//! demand; only max HP is cached because current HP depends on its history.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Projectile, Tint};
use super::pool::{SlotPool, SlotRef};
use super::scheduler::{EffectHandle, EffectKind, EffectPayload, Scheduler, TargetRef, TimedEffect, Timing};
use super::upgrades::UpgradeRegistry;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Normal,
    Invincible,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub state: PlayerState,
    /// Toggled by the invincibility flicker
    pub visible: bool,
    pub tint: Tint,
    /// Session-clock time of the next allowed shot
    pub fire_ready_at: u64,
    flash: Option<EffectHandle>,
    flicker: Option<EffectHandle>,
    expiry: Option<EffectHandle>,
    auto_heal: Option<EffectHandle>,
    upgrade_revision: u64,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, WORLD_HEIGHT / 2.0),
            vel: Vec2::ZERO,
            hp: PLAYER_BASE_HP,
            max_hp: PLAYER_BASE_HP,
            state: PlayerState::Normal,
            visible: true,
            tint: Tint::Base,
            fire_ready_at: 0,
            flash: None,
            flicker: None,
            expiry: None,
            auto_heal: None,
            upgrade_revision: 0,
        }
    }

    /// Return to base stats in place, cancelling any effects still pending
    pub fn reset(&mut self, scheduler: &mut Scheduler) {
        scheduler.cancel_target(TargetRef::Player);
        *self = Self::new();
    }

    pub fn radius(&self) -> f32 {
        PLAYER_RADIUS
    }

    pub fn is_invincible(&self) -> bool {
        self.state == PlayerState::Invincible
    }

    /// Apply input flags for one tick. Y never leaves the play band.
    pub fn apply_movement(&mut self, up: bool, down: bool, dt: f32, upgrades: &UpgradeRegistry) {
        let speed = PLAYER_BASE_SPEED * upgrades.multipliers().move_speed;
        let mut dir = 0.0;
        if up {
            dir -= 1.0;
        }
        if down {
            dir += 1.0;
        }
        if (dir < 0.0 && self.pos.y <= PLAYER_MIN_Y) || (dir > 0.0 && self.pos.y >= PLAYER_MAX_Y) {
            dir = 0.0;
        }
        self.vel = Vec2::new(0.0, dir * speed);
        self.pos += self.vel * dt;
        self.pos.y = self.pos.y.clamp(PLAYER_MIN_Y, PLAYER_MAX_Y);
    }

    /// Take a hit. Returns true only on the hit that brings HP to 0.
    pub fn take_damage(
        &mut self,
        amount: i32,
        upgrades: &UpgradeRegistry,
        scheduler: &mut Scheduler,
    ) -> bool {
        if self.is_invincible() {
            return false;
        }
        let was_alive = self.hp > 0;
        let reduced = (amount.max(0) as f32 * upgrades.multipliers().damage_taken).ceil() as i32;
        self.hp = (self.hp - reduced).clamp(0, self.max_hp);

        if upgrades.invincible_on_hit() {
            self.activate_invincibility(scheduler);
        } else {
            self.start_flash(scheduler);
        }
        was_alive && self.hp == 0
    }

    /// Enter the Invincible state with its flicker and expiry effects
    pub fn activate_invincibility(&mut self, scheduler: &mut Scheduler) {
        for handle in [self.flicker.take(), self.expiry.take()].into_iter().flatten() {
            scheduler.cancel(handle);
        }
        self.state = PlayerState::Invincible;
        self.flicker = Some(scheduler.schedule(
            TargetRef::Player,
            EffectKind::FlickerToggle,
            Timing::Every {
                interval_ms: FLICKER_PERIOD_MS,
            },
            EffectPayload::None,
        ));
        self.expiry = Some(scheduler.schedule(
            TargetRef::Player,
            EffectKind::InvincibilityExpiry,
            Timing::Once {
                delay_ms: INVINCIBILITY_MS,
            },
            EffectPayload::None,
        ));
    }

    fn start_flash(&mut self, scheduler: &mut Scheduler) {
        if let Some(previous) = self.flash.take() {
            scheduler.cancel(previous);
        }
        self.tint = Tint::Hit;
        self.flash = Some(scheduler.schedule(
            TargetRef::Player,
            EffectKind::DamageFlashExpiry,
            Timing::Once {
                delay_ms: PLAYER_FLASH_MS,
            },
            EffectPayload::None,
        ));
    }

    /// Heal, never above max HP
    pub fn heal(&mut self, amount: i32) {
        if self.hp < self.max_hp {
            self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        }
    }

    /// Milliseconds between shots under the current upgrades
    pub fn fire_cooldown_ms(&self, upgrades: &UpgradeRegistry) -> u64 {
        let rate = upgrades.multipliers().fire_rate.max(0.01);
        (PLAYER_FIRE_INTERVAL_MS as f32 / rate).round() as u64
    }

    /// Fire one shot if the cooldown has elapsed and a projectile slot is free
    pub fn fire(
        &mut self,
        now: u64,
        upgrades: &UpgradeRegistry,
        shots: &mut SlotPool<Projectile>,
    ) -> Option<SlotRef> {
        if now < self.fire_ready_at {
            return None;
        }
        let Some(r) = shots.acquire() else {
            log::warn!("player shot pool exhausted, shot skipped");
            return None;
        };
        let m = upgrades.multipliers();
        if let Some(shot) = shots.get_mut(r) {
            shot.launch(
                self.pos + Vec2::new(self.radius(), 0.0),
                Vec2::new(PLAYER_SHOT_SPEED * m.bullet_speed, 0.0),
                (PLAYER_SHOT_DAMAGE as f32 * m.bullet_damage).round() as i32,
                PLAYER_SHOT_RADIUS * m.bullet_scale,
            );
        }
        self.fire_ready_at = now + self.fire_cooldown_ms(upgrades);
        Some(r)
    }

    /// Push absolute cooldown deadlines forward after a pause
    pub fn shift_cooldowns(&mut self, delta_ms: u64) {
        self.fire_ready_at += delta_ms;
    }

    /// Re-derive cached stats after the registry changed
    pub fn sync_upgrades(&mut self, upgrades: &UpgradeRegistry, scheduler: &mut Scheduler) {
        if self.upgrade_revision == upgrades.revision() {
            return;
        }
        self.upgrade_revision = upgrades.revision();

        let new_max = (PLAYER_BASE_HP as f32 * upgrades.multipliers().health).round() as i32;
        if new_max > self.max_hp {
            self.hp += new_max - self.max_hp;
        }
        self.max_hp = new_max;
        self.hp = self.hp.clamp(0, self.max_hp);

        match (upgrades.auto_heal(), self.auto_heal) {
            (true, None) => {
                self.auto_heal = Some(scheduler.schedule(
                    TargetRef::Player,
                    EffectKind::AutoHealTick,
                    Timing::Every {
                        interval_ms: AUTO_HEAL_PERIOD_MS,
                    },
                    EffectPayload::Heal(AUTO_HEAL_AMOUNT),
                ));
            }
            (false, Some(handle)) => {
                scheduler.cancel(handle);
                self.auto_heal = None;
            }
            _ => {}
        }
    }

    /// Run a fired effect aimed at the player
    pub fn on_effect(&mut self, effect: &TimedEffect, scheduler: &mut Scheduler) {
        match effect.kind {
            EffectKind::DamageFlashExpiry => {
                self.flash = None;
                self.tint = Tint::Base;
            }
            EffectKind::FlickerToggle => {
                self.visible = !self.visible;
            }
            EffectKind::InvincibilityExpiry => {
                self.expiry = None;
                if let Some(handle) = self.flicker.take() {
                    scheduler.cancel(handle);
                }
                self.state = PlayerState::Normal;
                self.visible = true;
            }
            EffectKind::AutoHealTick => {
                if let EffectPayload::Heal(amount) = effect.payload {
                    self.heal(amount);
                }
            }
            EffectKind::AcidTick | EffectKind::BossPhaseAdvance => {
                log::debug!("{:?} aimed at player ignored", effect.kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::upgrades::UpgradeId;
    use proptest::prelude::*;

    fn run_effects(player: &mut Player, scheduler: &mut Scheduler, dt: u64) {
        let mut due = Vec::new();
        scheduler.advance(dt);
        scheduler.drain_due(|_| true, &mut due);
        for effect in &due {
            if !scheduler.is_cancelled(effect.handle) {
                player.on_effect(effect, scheduler);
            }
        }
        scheduler.finish_batch();
    }

    #[test]
    fn test_damage_flash_then_restore() {
        let mut player = Player::new();
        let mut scheduler = Scheduler::new();
        let upgrades = UpgradeRegistry::new();

        assert!(!player.take_damage(30, &upgrades, &mut scheduler));
        assert_eq!(player.hp, 70);
        assert_eq!(player.tint, Tint::Hit);

        run_effects(&mut player, &mut scheduler, 100);
        assert_eq!(player.tint, Tint::Hit);
        run_effects(&mut player, &mut scheduler, 100);
        assert_eq!(player.tint, Tint::Base);
    }

    #[test]
    fn test_damage_reduction_rounds_up() {
        let mut player = Player::new();
        let mut scheduler = Scheduler::new();
        let mut upgrades = UpgradeRegistry::new();
        upgrades.apply(UpgradeId::Plating);

        player.take_damage(10, &upgrades, &mut scheduler);
        assert_eq!(player.hp, 100 - 8);
    }

    #[test]
    fn test_destroyed_reported_once() {
        let mut player = Player::new();
        let mut scheduler = Scheduler::new();
        let upgrades = UpgradeRegistry::new();
        assert!(player.take_damage(150, &upgrades, &mut scheduler));
        assert_eq!(player.hp, 0);
        assert!(!player.take_damage(10, &upgrades, &mut scheduler));
    }

    #[test]
    fn test_phase_shield_window() {
        let mut player = Player::new();
        let mut scheduler = Scheduler::new();
        let mut upgrades = UpgradeRegistry::new();
        upgrades.apply(UpgradeId::PhaseShield);

        player.take_damage(10, &upgrades, &mut scheduler);
        assert!(player.is_invincible());
        assert!(!player.take_damage(500, &upgrades, &mut scheduler));
        assert_eq!(player.hp, 90);

        run_effects(&mut player, &mut scheduler, FLICKER_PERIOD_MS);
        assert!(!player.visible);

        for _ in 0..(INVINCIBILITY_MS / FLICKER_PERIOD_MS) {
            run_effects(&mut player, &mut scheduler, FLICKER_PERIOD_MS);
        }
        assert_eq!(player.state, PlayerState::Normal);
        assert!(player.visible);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_fire_cooldown_and_pause_shift() {
        let mut player = Player::new();
        let upgrades = UpgradeRegistry::new();
        let mut shots: SlotPool<Projectile> = SlotPool::new(4);

        assert!(player.fire(1000, &upgrades, &mut shots).is_some());
        assert_eq!(player.fire_ready_at, 1250);
        assert!(player.fire(1100, &upgrades, &mut shots).is_none());

        player.shift_cooldowns(400);
        assert_eq!(player.fire_ready_at, 1650);
        assert!(player.fire(1300, &upgrades, &mut shots).is_none());
        assert!(player.fire(1650, &upgrades, &mut shots).is_some());
    }

    #[test]
    fn test_fire_skipped_when_pool_empty() {
        let mut player = Player::new();
        let upgrades = UpgradeRegistry::new();
        let mut shots: SlotPool<Projectile> = SlotPool::new(1);
        assert!(player.fire(0, &upgrades, &mut shots).is_some());
        assert!(player.fire(10_000, &upgrades, &mut shots).is_none());
        assert_eq!(player.fire_ready_at, 250);
    }

    #[test]
    fn test_upgraded_shot_stats() {
        let mut player = Player::new();
        let mut upgrades = UpgradeRegistry::new();
        upgrades.apply(UpgradeId::HeavyRounds);
        upgrades.apply(UpgradeId::RapidFire);
        let mut shots: SlotPool<Projectile> = SlotPool::new(4);

        let r = player.fire(0, &upgrades, &mut shots).unwrap();
        let shot = shots.get(r).unwrap();
        assert_eq!(shot.damage, 15);
        assert_eq!(shot.radius, PLAYER_SHOT_RADIUS * 1.5);
        assert_eq!(player.fire_ready_at, 167);
    }

    #[test]
    fn test_vitality_raises_current_hp_by_delta() {
        let mut player = Player::new();
        let mut scheduler = Scheduler::new();
        let mut upgrades = UpgradeRegistry::new();
        player.take_damage(40, &upgrades, &mut scheduler);

        upgrades.apply(UpgradeId::Vitality);
        player.sync_upgrades(&upgrades, &mut scheduler);
        assert_eq!(player.max_hp, 150);
        assert_eq!(player.hp, 110);
    }

    #[test]
    fn test_auto_heal_ticks() {
        let mut player = Player::new();
        let mut scheduler = Scheduler::new();
        let mut upgrades = UpgradeRegistry::new();
        upgrades.apply(UpgradeId::Regenerator);
        player.sync_upgrades(&upgrades, &mut scheduler);
        player.hp = 90;

        run_effects(&mut player, &mut scheduler, AUTO_HEAL_PERIOD_MS);
        assert_eq!(player.hp, 95);
        run_effects(&mut player, &mut scheduler, AUTO_HEAL_PERIOD_MS);
        run_effects(&mut player, &mut scheduler, AUTO_HEAL_PERIOD_MS);
        assert_eq!(player.hp, 100);
    }

    #[test]
    fn test_movement_clamped_to_band() {
        let mut player = Player::new();
        let upgrades = UpgradeRegistry::new();
        for _ in 0..200 {
            player.apply_movement(true, false, 0.05, &upgrades);
        }
        assert_eq!(player.pos.y, PLAYER_MIN_Y);
        assert_eq!(player.vel, Vec2::ZERO);

        player.apply_movement(false, true, 10.0, &upgrades);
        assert_eq!(player.pos.y, PLAYER_MAX_Y);
    }

    proptest! {
        #[test]
        fn prop_invincible_ignores_any_damage(amount in -100i32..10_000) {
            let mut player = Player::new();
            let mut scheduler = Scheduler::new();
            let upgrades = UpgradeRegistry::new();
            player.activate_invincibility(&mut scheduler);
            prop_assert!(!player.take_damage(amount, &upgrades, &mut scheduler));
            prop_assert_eq!(player.hp, PLAYER_BASE_HP);
        }

        #[test]
        fn prop_hp_within_bounds(hits in proptest::collection::vec(-20i32..80, 1..30)) {
            let mut player = Player::new();
            let mut scheduler = Scheduler::new();
            let upgrades = UpgradeRegistry::new();
            for amount in hits {
                player.take_damage(amount, &upgrades, &mut scheduler);
                prop_assert!(player.hp >= 0 && player.hp <= player.max_hp);
            }
        }
    }
}
