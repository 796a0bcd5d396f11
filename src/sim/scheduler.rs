//! Timed-effect scheduler
//!
//! Owns every delayed or recurring piece of work in the simulation (damage
//! flash expiry, acid ticks, invincibility expiry and flicker, auto-heal,
//! boss phase transitions) as plain data polled once per tick.
//!
//! - The logical clock only moves through [`Scheduler::advance`], which the
//!   tick loop skips while paused.
//! - Effects scheduled during tick N are never due before tick N+1.
//! - Targets are weak references; a target that is no longer live drops its
//!   effect instead of firing it.
//! - Cancelling an effect that is already in the batch being run marks it
//!   cancelled; callers check [`Scheduler::is_cancelled`] before running it.

use serde::{Deserialize, Serialize};

use super::entity::{BossPhase, EntityRef};

/// Opaque handle to a scheduled effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectHandle(u64);

/// What an effect acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    Player,
    Enemy(EntityRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    DamageFlashExpiry,
    AcidTick,
    InvincibilityExpiry,
    FlickerToggle,
    AutoHealTick,
    BossPhaseAdvance,
}

/// One-shot delay or recurring period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    Once { delay_ms: u64 },
    Every { interval_ms: u64 },
}

/// Kind-specific data carried by an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EffectPayload {
    #[default]
    None,
    Damage(i32),
    Heal(i32),
    Phase(BossPhase),
}

/// A scheduled unit of work
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEffect {
    pub handle: EffectHandle,
    pub kind: EffectKind,
    pub target: TargetRef,
    pub due_at: u64,
    /// Period for recurring effects
    pub interval: Option<u64>,
    pub payload: EffectPayload,
    /// Tick in which the effect was (re)armed; it cannot fire in that tick
    armed_in: u64,
}

impl TimedEffect {
    pub fn recurring(&self) -> bool {
        self.interval.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: u64,
    ticks: u64,
    next_handle: u64,
    pending: Vec<TimedEffect>,
    /// Effects handed out by the last `drain_due`
    in_flight: Vec<(EffectHandle, TargetRef)>,
    /// Members of `in_flight` cancelled since the drain
    cancelled: Vec<EffectHandle>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(128),
            in_flight: Vec::with_capacity(32),
            cancelled: Vec::with_capacity(8),
            ..Default::default()
        }
    }

    /// Logical clock (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of ticks the clock has advanced
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Start a new tick, moving the logical clock forward
    pub fn advance(&mut self, dt_ms: u64) {
        self.now += dt_ms;
        self.ticks += 1;
    }

    pub fn schedule(
        &mut self,
        target: TargetRef,
        kind: EffectKind,
        timing: Timing,
        payload: EffectPayload,
    ) -> EffectHandle {
        self.next_handle += 1;
        let handle = EffectHandle(self.next_handle);
        let (due_at, interval) = match timing {
            Timing::Once { delay_ms } => (self.now + delay_ms, None),
            Timing::Every { interval_ms } => (self.now + interval_ms, Some(interval_ms)),
        };
        self.pending.push(TimedEffect {
            handle,
            kind,
            target,
            due_at,
            interval,
            payload,
            armed_in: self.ticks,
        });
        handle
    }

    /// Remove a pending effect, or stop one in the open batch from running.
    /// Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: EffectHandle) -> bool {
        let removed = match self.pending.iter().position(|e| e.handle == handle) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        };
        let stopped = self.in_flight.iter().any(|(h, _)| *h == handle) && self.mark_cancelled(handle);
        removed || stopped
    }

    /// Remove every effect aimed at `target`; returns how many were removed
    pub fn cancel_target(&mut self, target: TargetRef) -> usize {
        let before = self.pending.len();
        self.pending.retain(|e| e.target != target);
        for i in 0..self.in_flight.len() {
            let (handle, t) = self.in_flight[i];
            if t == target {
                self.mark_cancelled(handle);
            }
        }
        before - self.pending.len()
    }

    fn mark_cancelled(&mut self, handle: EffectHandle) -> bool {
        if self.cancelled.contains(&handle) {
            return false;
        }
        self.cancelled.push(handle);
        true
    }

    /// Whether a drained effect was cancelled before it got to run
    pub fn is_cancelled(&self, handle: EffectHandle) -> bool {
        self.cancelled.contains(&handle)
    }

    pub fn is_pending(&self, handle: EffectHandle) -> bool {
        self.pending.iter().any(|e| e.handle == handle)
    }

    pub fn pending_for(&self, target: TargetRef) -> impl Iterator<Item = &TimedEffect> {
        self.pending.iter().filter(move |e| e.target == target)
    }

    /// Collect every effect due at the current clock, in deadline order.
    ///
    /// One-shot effects leave the pending set; recurring effects are re-armed
    /// for `now + interval`. Effects whose target fails `is_live` are dropped.
    /// Until [`Scheduler::finish_batch`], the returned batch can still be
    /// cancelled.
    pub fn drain_due(&mut self, is_live: impl Fn(TargetRef) -> bool, out: &mut Vec<TimedEffect>) {
        out.clear();
        self.finish_batch();
        let now = self.now;
        let ticks = self.ticks;

        self.pending.retain_mut(|effect| {
            if !is_live(effect.target) {
                log::debug!("dropping {:?} for stale target {:?}", effect.kind, effect.target);
                return false;
            }
            if effect.armed_in >= ticks || effect.due_at > now {
                return true;
            }
            out.push(*effect);
            match effect.interval {
                Some(interval) => {
                    effect.due_at = now + interval;
                    effect.armed_in = ticks;
                    true
                }
                None => false,
            }
        });

        out.sort_by_key(|e| (e.due_at, e.handle.0));
        self.in_flight.extend(out.iter().map(|e| (e.handle, e.target)));
    }

    /// Close the batch from the last `drain_due` once it has run
    pub fn finish_batch(&mut self) {
        self.in_flight.clear();
        self.cancelled.clear();
    }

    /// Drop every pending effect (session restart)
    pub fn clear(&mut self) {
        self.pending.clear();
        self.finish_batch();
    }
}
