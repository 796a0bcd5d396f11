//! Session state
//!
//! Owns every pool, the scheduler, the player and the registries, and exposes
//! the session-level operations (pause, upgrades, wave flow). The per-tick
//! pipeline lives in [`super::tick`].

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::behavior::BehaviorCtx;
use super::collision::Overlap;
use super::entity::{Archetype, EntityRef, Projectile};
use super::events::GameEvent;
use super::player::Player;
use super::pool::{EnemyPools, SlotPool, SlotRef};
use super::scheduler::{Scheduler, TargetRef, TimedEffect};
use super::spawn::{SpawnDirector, spawn_archetype};
use super::upgrades::{UpgradeId, UpgradeRegistry};
use crate::config::SessionConfig;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Logical clock frozen
    Paused,
    /// Wave timer ran out; waiting for `next_wave`
    WaveComplete,
    /// Player destroyed; waiting for `restart`
    GameOver,
}

/// Last values pushed to the HUD, so only changes are emitted
#[derive(Debug, Clone, Copy, Default)]
struct HudCache {
    second: Option<u64>,
    hp: Option<(i32, i32)>,
}

/// Reusable per-tick buffers
#[derive(Debug, Clone, Default)]
pub(crate) struct Scratch {
    pub spawns: Vec<Archetype>,
    pub enemies: Vec<EntityRef>,
    pub shots: Vec<SlotRef>,
    pub overlaps: Vec<Overlap>,
    pub effects: Vec<TimedEffect>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SessionConfig,
    pub rng: Pcg32,
    /// 1-based wave number
    pub wave: u32,
    pub score: u64,
    pub phase: GamePhase,
    /// Wall-clock session time; keeps running while paused
    pub session_ms: u64,
    pub time_remaining_ms: u64,
    pub player: Player,
    pub upgrades: UpgradeRegistry,
    pub enemies: EnemyPools,
    pub player_shots: SlotPool<Projectile>,
    pub enemy_shots: SlotPool<Projectile>,
    pub scheduler: Scheduler,
    pub spawner: SpawnDirector,
    /// Undrained outbound events
    pub events: Vec<GameEvent>,
    paused_at: Option<u64>,
    hud: HudCache,
    pub(crate) scratch: Scratch,
}

impl GameState {
    pub fn new(config: SessionConfig) -> Self {
        let capacities = config.capacities;
        let mut state = Self {
            rng: Pcg32::seed_from_u64(config.seed),
            wave: 1,
            score: 0,
            phase: GamePhase::Playing,
            session_ms: 0,
            time_remaining_ms: config.wave_duration_ms,
            player: Player::new(),
            upgrades: UpgradeRegistry::new(),
            enemies: EnemyPools::new(&capacities),
            player_shots: SlotPool::new(capacities.player_shots),
            enemy_shots: SlotPool::new(capacities.enemy_shots),
            scheduler: Scheduler::new(),
            spawner: SpawnDirector::new(&config.spawn_intervals),
            events: Vec::new(),
            paused_at: None,
            hud: HudCache::default(),
            scratch: Scratch::default(),
            config,
        };
        state.begin_wave();
        state
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SessionConfig::with_seed(seed))
    }

    /// Logical clock (ms)
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Whether an effect target still refers to a live body
    pub fn is_live(&self, target: TargetRef) -> bool {
        match target {
            TargetRef::Player => true,
            TargetRef::Enemy(r) => self.enemies.is_live(r),
        }
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn one enemy of `archetype` at the right edge, bypassing the
    /// director's timers. `None` when the pool is full.
    pub fn request_spawn(&mut self, archetype: Archetype) -> Option<EntityRef> {
        let mut ctx = BehaviorCtx {
            now: self.scheduler.now(),
            dt: 0.0,
            player_pos: self.player.pos,
            enemy_shots: &mut self.enemy_shots,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        spawn_archetype(archetype, &mut self.enemies, &mut ctx)
    }

    /// Unlock an upgrade and re-derive player stats. Idempotent.
    pub fn apply_upgrade(&mut self, id: UpgradeId) -> bool {
        if !self.upgrades.apply(id) {
            return false;
        }
        self.player.sync_upgrades(&self.upgrades, &mut self.scheduler);
        self.events.push(GameEvent::UpgradeApplied { id });
        self.emit_hud();
        true
    }

    /// [`Self::apply_upgrade`] by snake_case name
    pub fn apply_upgrade_named(&mut self, name: &str) -> bool {
        match UpgradeId::from_name(name) {
            Some(id) => self.apply_upgrade(id),
            None => {
                log::warn!("unknown upgrade '{}'", name);
                false
            }
        }
    }

    /// Freeze the logical clock. No-op unless playing.
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            log::warn!("pause ignored in {:?}", self.phase);
            return false;
        }
        self.phase = GamePhase::Paused;
        self.paused_at = Some(self.session_ms);
        self.spawner.set_paused(true);
        log::info!("paused at {} ms", self.session_ms);
        true
    }

    /// Unfreeze, pushing player cooldowns forward by the pause length
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            log::warn!("resume ignored in {:?}", self.phase);
            return false;
        }
        let paused_for = self
            .paused_at
            .take()
            .map_or(0, |at| self.session_ms.saturating_sub(at));
        self.player.shift_cooldowns(paused_for);
        self.spawner.set_paused(false);
        self.phase = GamePhase::Playing;
        log::info!("resumed after {} ms", paused_for);
        true
    }

    /// Start the following wave. Only valid once the current one completed.
    pub fn next_wave(&mut self) -> bool {
        if self.phase != GamePhase::WaveComplete {
            log::warn!("next_wave ignored in {:?}", self.phase);
            return false;
        }
        self.clear_field();
        self.wave += 1;
        self.begin_wave();
        true
    }

    /// Reset to a fresh session with the same config, reusing every pool
    pub fn restart(&mut self) {
        self.clear_field();
        self.player.reset(&mut self.scheduler);
        self.scheduler.clear();
        self.upgrades.reset();
        self.rng = Pcg32::seed_from_u64(self.config.seed);
        self.wave = 1;
        self.score = 0;
        self.session_ms = 0;
        self.paused_at = None;
        self.hud = HudCache::default();
        log::info!("session restarted");
        self.begin_wave();
    }

    pub(crate) fn complete_wave(&mut self) {
        self.phase = GamePhase::WaveComplete;
        self.spawner.stop();
        self.events.push(GameEvent::WaveComplete { wave: self.wave });
        log::info!("wave {} complete, score {}", self.wave, self.score);
    }

    pub(crate) fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.spawner.stop();
        self.events.push(GameEvent::GameOver {
            score: self.score,
            wave: self.wave,
        });
        log::info!("game over on wave {} with score {}", self.wave, self.score);
    }

    /// Push HUD values that changed since the last call
    pub(crate) fn emit_hud(&mut self) {
        let second = self.time_remaining_ms.div_ceil(1000);
        if self.hud.second != Some(second) {
            self.hud.second = Some(second);
            self.events.push(GameEvent::TimeRemaining {
                ms: self.time_remaining_ms,
            });
        }
        let hp = (self.player.hp, self.player.max_hp);
        if self.hud.hp != Some(hp) {
            self.hud.hp = Some(hp);
            self.events.push(GameEvent::PlayerHp {
                current: hp.0,
                max: hp.1,
            });
        }
    }

    fn begin_wave(&mut self) {
        self.phase = GamePhase::Playing;
        self.time_remaining_ms = self.config.wave_duration_ms;
        self.spawner
            .restart(&self.config.spawn_intervals, self.wave.saturating_sub(1));
        self.player.sync_upgrades(&self.upgrades, &mut self.scheduler);
        self.events.push(GameEvent::WaveStarted { wave: self.wave });
        self.events.push(GameEvent::ScoreChanged { score: self.score });
        log::info!("wave {} started", self.wave);
        self.emit_hud();
    }

    /// Return every enemy and projectile to its pool
    fn clear_field(&mut self) {
        self.enemies.release_all(&mut self.scheduler);
        self.player_shots.release_all();
        self.enemy_shots.release_all();
    }
}
