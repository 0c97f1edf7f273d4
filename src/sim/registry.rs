//! Insertion-ordered entity storage
//!
//! Each entity kind lives in its own [`Registry`]. Iteration order is insertion
//! order, which keeps ticks deterministic. Systems that remove entities while
//! walking a registry collect ids first and compact afterwards with
//! [`Registry::remove_all`] or [`Registry::retain`], so no element is skipped
//! or visited twice within a tick.

use serde::{Deserialize, Serialize};

/// Stable handle to an entity, unique across all kinds in a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Hands out world-unique entity ids
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Insertion-ordered collection of one entity kind
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<(EntityId, T)>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity under a fresh id
    pub fn insert(&mut self, ids: &mut IdAllocator, item: T) -> EntityId {
        let id = ids.next_id();
        self.items.push((id, item));
        id
    }

    /// Remove an entity; unknown ids are a no-op
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let idx = self.items.iter().position(|(eid, _)| *eid == id)?;
        Some(self.items.remove(idx).1)
    }

    /// Remove every listed id in one compaction pass
    pub fn remove_all(&mut self, ids: &[EntityId]) {
        if ids.is_empty() {
            return;
        }
        self.items.retain(|(id, _)| !ids.contains(id));
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, item)| item)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items
            .iter_mut()
            .find(|(eid, _)| *eid == id)
            .map(|(_, item)| item)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.items.iter().any(|(eid, _)| *eid == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.items.iter_mut().map(|(id, item)| (*id, item))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|(_, item)| item)
    }

    /// Snapshot of ids in iteration order
    pub fn ids(&self) -> Vec<EntityId> {
        self.items.iter().map(|(id, _)| *id).collect()
    }

    /// Keep entities matching the predicate, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.items.retain(|(_, item)| keep(item));
    }

    /// Drop the oldest entities until at most `max` remain
    pub fn truncate_oldest(&mut self, max: usize) {
        if self.items.len() > max {
            let excess = self.items.len() - max;
            self.items.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_and_unique_ids() {
        let mut ids = IdAllocator::default();
        let mut a: Registry<&str> = Registry::new();
        let mut b: Registry<&str> = Registry::new();
        let x = a.insert(&mut ids, "x");
        let y = b.insert(&mut ids, "y");
        let z = a.insert(&mut ids, "z");
        assert_ne!(x, y);
        assert_ne!(y, z);
        assert_eq!(a.values().copied().collect::<Vec<_>>(), vec!["x", "z"]);
        assert_eq!(a.ids(), vec![x, z]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut ids = IdAllocator::default();
        let mut reg = Registry::new();
        let id = reg.insert(&mut ids, 1);
        assert_eq!(reg.remove(id), Some(1));
        assert_eq!(reg.remove(id), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_all_during_walk_visits_everything_once() {
        let mut ids = IdAllocator::default();
        let mut reg = Registry::new();
        for n in 0..6 {
            reg.insert(&mut ids, n);
        }

        let mut visited = Vec::new();
        let mut doomed = Vec::new();
        for (id, n) in reg.iter() {
            visited.push(*n);
            if n % 2 == 0 {
                doomed.push(id);
            }
        }
        reg.remove_all(&doomed);

        assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(reg.values().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_truncate_oldest() {
        let mut ids = IdAllocator::default();
        let mut reg = Registry::new();
        for n in 0..5 {
            reg.insert(&mut ids, n);
        }
        reg.truncate_oldest(2);
        assert_eq!(reg.values().copied().collect::<Vec<_>>(), vec![3, 4]);
        reg.truncate_oldest(10);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_get_mut_and_contains() {
        let mut ids = IdAllocator::default();
        let mut reg = Registry::new();
        let id = reg.insert(&mut ids, 10);
        *reg.get_mut(id).unwrap() += 5;
        assert_eq!(reg.get(id), Some(&15));
        assert!(reg.contains(id));
        assert!(!reg.contains(EntityId(999)));
    }
}
