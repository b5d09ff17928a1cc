//! Fixed-capacity enemy slot table.
//!
//! Slots are scanned linearly for every operation; capacity stays in the tens so
//! this never shows up in a frame profile. Capacity is fixed at construction and
//! the table never grows.

use super::enemy::{Enemy, EnemyId};

pub struct EnemyPool {
    slots: Box<[Option<Enemy>]>,
}

impl EnemyPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Stores `enemy` in the first free slot. Hands the enemy back when every
    /// slot is taken so the caller can release what it allocated for it.
    pub fn insert(&mut self, enemy: Enemy) -> Result<EnemyId, Enemy> {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                let id = enemy.id;
                *slot = Some(enemy);
                Ok(id)
            }
            None => Err(enemy),
        }
    }

    /// Clears the slot holding `id`. Removing an absent enemy is a no-op.
    pub fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|e| e.id == id))
            .and_then(Option::take)
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn free_slots(&self) -> usize {
        self.capacity() - self.count()
    }

    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.slots.iter_mut().flatten().find(|e| e.id == id)
    }

    /// Direct slot access for passes that must mutate the pool between slots.
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Enemy> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn enemies(n: u32) -> Vec<Enemy> {
        let cfg = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(11);
        (0..n).map(|i| Enemy::new(EnemyId(i), &cfg, &mut rng)).collect()
    }

    #[test]
    fn insert_fills_first_free_slot() {
        let mut pool = EnemyPool::new(3);
        let mut es = enemies(4).into_iter();
        for _ in 0..3 {
            pool.insert(es.next().unwrap()).unwrap();
        }
        pool.remove(EnemyId(1));
        pool.insert(es.next().unwrap()).unwrap();
        let order: Vec<u32> = pool.iter().map(|e| e.id.0).collect();
        assert_eq!(order, vec![0, 3, 2]);
    }

    #[test]
    fn full_pool_hands_enemy_back() {
        let mut pool = EnemyPool::new(2);
        let mut es = enemies(3).into_iter();
        pool.insert(es.next().unwrap()).unwrap();
        pool.insert(es.next().unwrap()).unwrap();
        let rejected = pool.insert(es.next().unwrap()).unwrap_err();
        assert_eq!(rejected.id, EnemyId(2));
        assert_eq!(pool.count(), 2);
        assert_eq!(pool.free_slots(), 0);
    }

    #[test]
    fn double_remove_is_noop() {
        let mut pool = EnemyPool::new(4);
        for e in enemies(2) {
            pool.insert(e).unwrap();
        }
        assert!(pool.remove(EnemyId(0)).is_some());
        assert_eq!(pool.count(), 1);
        assert!(pool.remove(EnemyId(0)).is_none());
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn count_never_exceeds_capacity() {
        let mut pool = EnemyPool::new(5);
        for e in enemies(12) {
            let before = pool.count();
            match pool.insert(e) {
                Ok(_) => assert_eq!(pool.count(), before + 1),
                Err(_) => assert_eq!(pool.count(), before),
            }
            assert!(pool.count() <= pool.capacity());
        }
    }

    #[test]
    fn reset_clears_every_slot() {
        let mut pool = EnemyPool::new(4);
        for e in enemies(4) {
            pool.insert(e).unwrap();
        }
        pool.reset();
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.capacity(), 4);
        assert!(pool.get(EnemyId(2)).is_none());
    }
}
