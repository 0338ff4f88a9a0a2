//! Fixed-capacity bullet pool
//!
//! Slots are allocated lazily up to capacity and recycled through a free
//! list. Each slot carries a generation so an id handed out before a slot
//! was recycled never resolves to the bullet that reused it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Facing;

/// Stable handle to a pooled bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BulletId {
    pub slot: u32,
    pub generation: u32,
}

/// A pooled bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletState {
    pub active: bool,
    /// Where the bullet was fired from
    pub origin: Vec2,
    /// Last position reported by physics
    pub pos: Vec2,
    pub direction: Facing,
    generation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletPool {
    capacity: usize,
    slots: Vec<BulletState>,
    free_list: Vec<usize>,
}

impl BulletPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Activate a bullet, or `None` when every slot is in use
    pub fn acquire(&mut self, origin: Vec2, direction: Facing) -> Option<BulletId> {
        let slot = match self.free_list.pop() {
            Some(i) => i,
            None if self.slots.len() < self.capacity => {
                self.slots.push(BulletState {
                    active: false,
                    origin,
                    pos: origin,
                    direction,
                    generation: 0,
                });
                self.slots.len() - 1
            }
            None => return None,
        };

        let bullet = &mut self.slots[slot];
        bullet.active = true;
        bullet.origin = origin;
        bullet.pos = origin;
        bullet.direction = direction;

        Some(BulletId {
            slot: slot as u32,
            generation: bullet.generation,
        })
    }

    /// Return a bullet's slot to the pool. False if the id is stale or inactive.
    pub fn release(&mut self, id: BulletId) -> bool {
        let Some(bullet) = self.get_mut(id) else {
            return false;
        };
        bullet.active = false;
        bullet.generation = bullet.generation.wrapping_add(1);
        self.free_list.push(id.slot as usize);
        true
    }

    /// Look up an active bullet
    pub fn get(&self, id: BulletId) -> Option<&BulletState> {
        self.slots
            .get(id.slot as usize)
            .filter(|b| b.active && b.generation == id.generation)
    }

    pub fn get_mut(&mut self, id: BulletId) -> Option<&mut BulletState> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|b| b.active && b.generation == id.generation)
    }

    /// Active bullets in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = (BulletId, &BulletState)> {
        self.slots.iter().enumerate().filter(|(_, b)| b.active).map(|(i, b)| {
            (
                BulletId {
                    slot: i as u32,
                    generation: b.generation,
                },
                b,
            )
        })
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|b| b.active).count()
    }
}
