//! Reusable-slot entity storage
//!
//! Slots are allocated once and recycled forever. A spawn takes the lowest
//! free slot; only when every slot is active does the pool grow.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::{Entity, EntityId, Facing};
use crate::error::{Result, SimError};

/// Pool of bullets or enemies (one pool per kind)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityPool {
    slots: Vec<Entity>,
    /// Running count of `slots` with `active == true`
    active: u32,
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate an entity, reusing the lowest free slot if there is one
    pub fn spawn(&mut self, position: DVec2, velocity: DVec2, angle: Facing) -> Result<EntityId> {
        if !position.is_finite() {
            return Err(SimError::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }
        if !velocity.is_finite() {
            return Err(SimError::NonFiniteVelocity {
                x: velocity.x,
                y: velocity.y,
            });
        }

        let id = match self.slots.iter().position(|e| !e.active) {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.active = true;
                slot.position = position;
                slot.velocity = velocity;
                slot.angle = angle;
                slot.id
            }
            None => {
                let id = EntityId(self.slots.len() as u32);
                self.slots.push(Entity {
                    id,
                    active: true,
                    position,
                    velocity,
                    angle,
                });
                id
            }
        };

        self.active += 1;
        Ok(id)
    }

    /// Return an entity to the pool. Returns false if it was already free.
    pub fn deactivate(&mut self, id: EntityId) -> bool {
        match self.slots.get_mut(id.index()) {
            Some(entity) if entity.active => {
                entity.active = false;
                self.active -= 1;
                true
            }
            _ => false,
        }
    }

    /// Free every slot without shrinking the pool
    pub fn deactivate_all(&mut self) {
        for entity in &mut self.slots {
            entity.active = false;
        }
        self.active = 0;
    }

    #[inline]
    pub fn count_active(&self) -> u32 {
        self.active
    }

    /// Number of allocated slots, active or not
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.slots.get(id.index()).is_some_and(|e| e.active)
    }

    /// Slot lookup; the entity may be inactive
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.index())
    }

    /// Active entity lookup
    pub fn get_active(&self, id: EntityId) -> Option<&Entity> {
        self.get(id).filter(|e| e.active)
    }

    /// Active entities in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|e| e.active)
    }

    pub fn for_each_active(&self, mut visitor: impl FnMut(&Entity)) {
        for entity in self.iter_active() {
            visitor(entity);
        }
    }

    /// Copy out the active entities (render handoff)
    pub fn active_snapshot(&self) -> Vec<Entity> {
        self.iter_active().copied().collect()
    }

    /// Move every active entity along its velocity
    pub fn advance(&mut self, dt_secs: f64) {
        for entity in self.slots.iter_mut().filter(|e| e.active) {
            entity.position += entity.velocity * dt_secs;
        }
    }

    /// Deactivate active entities that fail `keep`; returns the culled ids
    pub fn retain_active(&mut self, mut keep: impl FnMut(&Entity) -> bool) -> Vec<EntityId> {
        let mut culled = Vec::new();
        for entity in self.slots.iter_mut().filter(|e| e.active) {
            if !keep(entity) {
                entity.active = false;
                culled.push(entity.id);
            }
        }
        self.active -= culled.len() as u32;
        culled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spawn_at(pool: &mut EntityPool, x: f64) -> EntityId {
        pool.spawn(DVec2::new(x, 0.0), DVec2::ZERO, Facing::Down)
            .expect("finite spawn")
    }

    #[test]
    fn test_spawn_appends_then_reuses_lowest_slot() {
        let mut pool = EntityPool::new();
        let a = spawn_at(&mut pool, 1.0);
        let b = spawn_at(&mut pool, 2.0);
        let c = spawn_at(&mut pool, 3.0);
        assert_eq!((a, b, c), (EntityId(0), EntityId(1), EntityId(2)));

        assert!(pool.deactivate(c));
        assert!(pool.deactivate(a));
        assert_eq!(pool.count_active(), 1);

        // Lowest free slot wins, and the stale position is overwritten
        let d = spawn_at(&mut pool, 9.0);
        assert_eq!(d, EntityId(0));
        assert_eq!(pool.get(d).unwrap().position.x, 9.0);
        let e = spawn_at(&mut pool, 10.0);
        assert_eq!(e, EntityId(2));
        assert_eq!(pool.slot_count(), 3);
        assert_eq!(pool.count_active(), 3);
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut pool = EntityPool::new();
        let a = spawn_at(&mut pool, 0.0);
        assert!(pool.deactivate(a));
        assert!(!pool.deactivate(a));
        assert!(!pool.deactivate(EntityId(99)));
        assert_eq!(pool.count_active(), 0);
        // Stale position stays until the slot is reused
        assert!(!pool.get(a).unwrap().active);
        assert!(pool.get_active(a).is_none());
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut pool = EntityPool::new();
        let err = pool
            .spawn(DVec2::new(f64::NAN, 0.0), DVec2::ZERO, Facing::Down)
            .unwrap_err();
        assert!(matches!(err, SimError::NonFinitePosition { .. }));

        let err = pool
            .spawn(DVec2::ZERO, DVec2::new(0.0, f64::INFINITY), Facing::Down)
            .unwrap_err();
        assert!(matches!(err, SimError::NonFiniteVelocity { .. }));
        assert_eq!(pool.slot_count(), 0);
        assert_eq!(pool.count_active(), 0);
    }

    #[test]
    fn test_deactivate_all_keeps_slots() {
        let mut pool = EntityPool::new();
        for i in 0..4 {
            spawn_at(&mut pool, i as f64);
        }
        pool.deactivate_all();
        assert_eq!(pool.count_active(), 0);
        assert_eq!(pool.slot_count(), 4);
        assert_eq!(pool.iter_active().count(), 0);
    }

    #[test]
    fn test_advance_and_retain() {
        let mut pool = EntityPool::new();
        let fast = pool
            .spawn(DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0), Facing::Right)
            .unwrap();
        let slow = pool
            .spawn(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), Facing::Right)
            .unwrap();
        pool.advance(0.5);
        assert_eq!(pool.get(fast).unwrap().position.x, 50.0);
        assert_eq!(pool.get(slow).unwrap().position.x, 0.5);

        let culled = pool.retain_active(|e| e.position.x < 10.0);
        assert_eq!(culled, vec![fast]);
        assert_eq!(pool.count_active(), 1);

        let mut seen = Vec::new();
        pool.for_each_active(|e| seen.push(e.id));
        assert_eq!(seen, vec![slow]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Spawn,
        Deactivate(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Spawn), any::<u8>().prop_map(Op::Deactivate)]
    }

    proptest! {
        #[test]
        fn prop_active_counter_matches_flags(ops in proptest::collection::vec(op_strategy(), 0..200)) {
            let mut pool = EntityPool::new();
            let mut peak = 0u32;
            for op in ops {
                match op {
                    Op::Spawn => {
                        spawn_at(&mut pool, 0.0);
                    }
                    Op::Deactivate(slot) => {
                        pool.deactivate(EntityId(u32::from(slot) % 16));
                    }
                }
                peak = peak.max(pool.count_active());
                let flagged = pool.iter_active().count() as u32;
                prop_assert_eq!(pool.count_active(), flagged);
                prop_assert!(pool.slot_count() as u32 <= peak);
            }
        }
    }
}
