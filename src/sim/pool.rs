//! Fixed-capacity slot pools
//!
//! Every pooled object lives in a slot allocated once at startup. Slots are
//! activated and deactivated, never constructed per spawn. A [`SlotRef`]
//! carries the slot generation, so a handle held across a release/acquire of
//! the same slot no longer resolves.

use serde::{Deserialize, Serialize};

use super::entity::{Archetype, Enemy, EntityRef};
use super::scheduler::{Scheduler, TargetRef};
use crate::config::PoolCapacities;

/// Weak handle to a pool slot (index + generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub index: u32,
    pub generation: u32,
}

/// Objects that can live in a [`SlotPool`]
pub trait Poolable: Default {
    /// Return the object to its inactive state. Called on release.
    fn reset(&mut self);
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    active: bool,
    item: T,
}

/// Fixed-size pool; never grows after construction
#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    slots: Vec<Slot<T>>,
    active_count: usize,
}

impl<T: Poolable> SlotPool<T> {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                active: false,
                item: T::default(),
            })
            .collect();
        Self {
            slots,
            active_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn is_full(&self) -> bool {
        self.active_count == self.slots.len()
    }

    /// Activate the first inactive slot, or `None` if every slot is in use
    pub fn acquire(&mut self) -> Option<SlotRef> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| !s.active)?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.active = true;
        self.active_count += 1;
        Some(SlotRef {
            index: index as u32,
            generation: slot.generation,
        })
    }

    /// Deactivate a slot. Returns false for stale or inactive handles.
    pub fn release(&mut self, r: SlotRef) -> bool {
        let Some(slot) = self.slot_mut(r) else {
            return false;
        };
        slot.active = false;
        slot.item.reset();
        self.active_count -= 1;
        true
    }

    /// Deactivate every slot
    pub fn release_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.active = false;
            slot.item.reset();
        }
        self.active_count = 0;
    }

    pub fn is_live(&self, r: SlotRef) -> bool {
        self.slots
            .get(r.index as usize)
            .is_some_and(|s| s.active && s.generation == r.generation)
    }

    pub fn get(&self, r: SlotRef) -> Option<&T> {
        self.slots
            .get(r.index as usize)
            .filter(|s| s.active && s.generation == r.generation)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, r: SlotRef) -> Option<&mut T> {
        self.slot_mut(r).map(|s| &mut s.item)
    }

    /// Active slots in pool order
    pub fn iter_active(&self) -> impl Iterator<Item = (SlotRef, &T)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(i, s)| {
            (
                SlotRef {
                    index: i as u32,
                    generation: s.generation,
                },
                &s.item,
            )
        })
    }

    /// Active slots in pool order, mutably
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (SlotRef, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| {
                (
                    SlotRef {
                        index: i as u32,
                        generation: s.generation,
                    },
                    &mut s.item,
                )
            })
    }

    /// Collect handles of active slots (for passes that mutate other state)
    pub fn active_refs(&self, out: &mut Vec<SlotRef>) {
        out.clear();
        out.extend(self.iter_active().map(|(r, _)| r));
    }

    fn slot_mut(&mut self, r: SlotRef) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(r.index as usize)
            .filter(|s| s.active && s.generation == r.generation)
    }
}

/// One enemy pool per archetype
#[derive(Debug, Clone)]
pub struct EnemyPools {
    pools: [SlotPool<Enemy>; Archetype::COUNT],
}

impl EnemyPools {
    pub fn new(capacities: &PoolCapacities) -> Self {
        Self {
            pools: std::array::from_fn(|i| {
                SlotPool::new(capacities.for_archetype(Archetype::ALL[i]))
            }),
        }
    }

    pub fn pool(&self, archetype: Archetype) -> &SlotPool<Enemy> {
        &self.pools[archetype.index()]
    }

    /// Claim a slot for `archetype`. A full pool drops the request.
    pub fn acquire(&mut self, archetype: Archetype) -> Option<EntityRef> {
        match self.pools[archetype.index()].acquire() {
            Some(slot) => Some(EntityRef { archetype, slot }),
            None => {
                log::warn!("{:?} pool full, spawn dropped", archetype);
                None
            }
        }
    }

    /// Release an enemy slot, cancelling every effect that targets it
    pub fn release(&mut self, r: EntityRef, scheduler: &mut Scheduler) -> bool {
        let pool = &mut self.pools[r.archetype.index()];
        let Some(enemy) = pool.get_mut(r.slot) else {
            log::debug!("release of stale {:?}", r);
            return false;
        };
        for effect in enemy.active_effects.drain(..) {
            scheduler.cancel(effect.handle);
        }
        scheduler.cancel_target(TargetRef::Enemy(r));
        pool.release(r.slot)
    }

    /// Release every active enemy of every archetype
    pub fn release_all(&mut self, scheduler: &mut Scheduler) {
        let mut refs = Vec::new();
        for archetype in Archetype::ALL {
            self.active_refs(archetype, &mut refs);
            for &r in &refs {
                self.release(r, scheduler);
            }
        }
    }

    pub fn is_live(&self, r: EntityRef) -> bool {
        self.pools[r.archetype.index()].is_live(r.slot)
    }

    pub fn get(&self, r: EntityRef) -> Option<&Enemy> {
        self.pools[r.archetype.index()].get(r.slot)
    }

    pub fn get_mut(&mut self, r: EntityRef) -> Option<&mut Enemy> {
        self.pools[r.archetype.index()].get_mut(r.slot)
    }

    /// Visit active enemies of one archetype in pool order
    pub fn for_each_active(&self, archetype: Archetype, mut f: impl FnMut(EntityRef, &Enemy)) {
        for (slot, enemy) in self.pools[archetype.index()].iter_active() {
            f(EntityRef { archetype, slot }, enemy);
        }
    }

    pub fn active_refs(&self, archetype: Archetype, out: &mut Vec<EntityRef>) {
        out.clear();
        out.extend(
            self.pools[archetype.index()]
                .iter_active()
                .map(|(slot, _)| EntityRef { archetype, slot }),
        );
    }

    pub fn active_count(&self, archetype: Archetype) -> usize {
        self.pools[archetype.index()].active_count()
    }

    pub fn total_active(&self) -> usize {
        self.pools.iter().map(SlotPool::active_count).sum()
    }
}
