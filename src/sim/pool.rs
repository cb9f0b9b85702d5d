//! Fixed-capacity entity storage
//!
//! Every obstacle and power-up lives in a slot allocated when the pool is
//! built. Spawning flips a slot to active, recycling flips it back. Slots
//! are addressed by stable [`EntityHandle`]s and iterated in slot order,
//! which keeps contact resolution deterministic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::category;
use super::rect::Rect;
use super::state::PowerUpKind;

/// Which pool a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    Obstacle,
    PowerUp,
}

impl PoolKind {
    pub fn category(&self) -> u32 {
        match self {
            PoolKind::Obstacle => category::OBSTACLE,
            PoolKind::PowerUp => category::POWER_UP,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::Obstacle => "obstacle",
            PoolKind::PowerUp => "power-up",
        }
    }
}

/// Stable address of a pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    pub pool: PoolKind,
    pub slot: u32,
}

/// What a slot currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    PowerUp(PowerUpKind),
}

/// An obstacle or power-up slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub handle: EntityHandle,
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub category: u32,
    pub active: bool,
}

impl Entity {
    fn vacant(handle: EntityHandle) -> Self {
        let kind = match handle.pool {
            PoolKind::Obstacle => EntityKind::Obstacle,
            PoolKind::PowerUp => EntityKind::PowerUp(PowerUpKind::Shield),
        };
        Self {
            handle,
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: Vec2::ZERO,
            category: handle.pool.category(),
            active: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    /// Drop per-spawn state, keeping handle and category
    fn clear_transient(&mut self) {
        self.position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.size = Vec2::ZERO;
        self.active = false;
    }
}

/// Fixed-capacity pool of one entity kind
#[derive(Debug, Clone)]
pub struct EntityPool {
    kind: PoolKind,
    slots: Vec<Entity>,
    active_count: usize,
}

impl EntityPool {
    /// Allocate all slots up front; the pool never grows afterwards
    pub fn new(kind: PoolKind, capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|slot| {
                Entity::vacant(EntityHandle {
                    pool: kind,
                    slot: slot as u32,
                })
            })
            .collect();
        Self {
            kind,
            slots,
            active_count: 0,
        }
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn is_exhausted(&self) -> bool {
        self.active_count >= self.slots.len()
    }

    /// Claim the first free slot, or `None` when every slot is in use
    pub fn acquire(&mut self) -> Option<EntityHandle> {
        let entity = self.slots.iter_mut().find(|e| !e.active)?;
        entity.active = true;
        self.active_count += 1;
        Some(entity.handle)
    }

    /// Return a slot to the pool.
    ///
    /// Returns the entity as it was just before recycling, or `None` when
    /// the handle is foreign or already free.
    pub fn release(&mut self, handle: EntityHandle) -> Option<Entity> {
        if handle.pool != self.kind {
            return None;
        }
        let entity = self.slots.get_mut(handle.slot as usize)?;
        if !entity.active {
            return None;
        }
        let snapshot = *entity;
        entity.clear_transient();
        self.active_count -= 1;
        Some(snapshot)
    }

    /// Recycle every active slot, in slot order
    pub fn release_all(&mut self) -> Vec<Entity> {
        let handles: Vec<EntityHandle> = self.active().map(|e| e.handle).collect();
        handles.into_iter().filter_map(|h| self.release(h)).collect()
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        if handle.pool != self.kind {
            return None;
        }
        self.slots.get(handle.slot as usize)
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        if handle.pool != self.kind {
            return None;
        }
        self.slots.get_mut(handle.slot as usize)
    }

    /// Active entities in slot order
    pub fn active(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|e| e.active)
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().filter(|e| e.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_until_exhausted() {
        let mut pool = EntityPool::new(PoolKind::Obstacle, 3);
        for _ in 0..3 {
            assert!(pool.acquire().is_some());
            assert!(pool.active_count() <= pool.capacity());
        }
        assert!(pool.is_exhausted());
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.capacity(), 3);
    }

    #[test]
    fn test_release_recycles_first_free_slot() {
        let mut pool = EntityPool::new(PoolKind::Obstacle, 3);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let _c = pool.acquire().unwrap();
        assert_eq!(a.slot, 0);
        assert_eq!(b.slot, 1);

        assert!(pool.release(b).is_some());
        assert_eq!(pool.acquire(), Some(b));
    }

    #[test]
    fn test_release_clears_transient_state_and_keeps_identity() {
        let mut pool = EntityPool::new(PoolKind::PowerUp, 2);
        let handle = pool.acquire().unwrap();
        {
            let entity = pool.get_mut(handle).unwrap();
            entity.position = Vec2::new(10.0, 20.0);
            entity.velocity = Vec2::new(0.0, -100.0);
            entity.size = Vec2::splat(30.0);
            entity.kind = EntityKind::PowerUp(PowerUpKind::Magnet);
        }

        let snapshot = pool.release(handle).unwrap();
        assert_eq!(snapshot.position, Vec2::new(10.0, 20.0));
        assert!(snapshot.active);

        let entity = pool.get(handle).unwrap();
        assert!(!entity.active);
        assert_eq!(entity.position, Vec2::ZERO);
        assert_eq!(entity.velocity, Vec2::ZERO);
        assert_eq!(entity.handle, handle);
        assert_eq!(entity.category, category::POWER_UP);
    }

    #[test]
    fn test_double_and_foreign_release_are_ignored() {
        let mut obstacles = EntityPool::new(PoolKind::Obstacle, 2);
        let mut power_ups = EntityPool::new(PoolKind::PowerUp, 2);
        let handle = obstacles.acquire().unwrap();

        assert!(power_ups.release(handle).is_none());
        assert!(obstacles.release(handle).is_some());
        assert!(obstacles.release(handle).is_none());
        assert_eq!(obstacles.active_count(), 0);
    }

    #[test]
    fn test_release_all_in_slot_order() {
        let mut pool = EntityPool::new(PoolKind::Obstacle, 4);
        for _ in 0..3 {
            pool.acquire();
        }
        let released: Vec<u32> = pool.release_all().iter().map(|e| e.handle.slot).collect();
        assert_eq!(released, vec![0, 1, 2]);
        assert_eq!(pool.active().count(), 0);
    }
}
