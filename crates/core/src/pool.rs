//! Gem arena - generational handles over recycled slots
//!
//! Spawning a gem takes a slot from the free list (or grows the arena);
//! despawning returns the slot and bumps its generation so that old handles
//! stop resolving.

use crate::types::{GemKind, Pos};

/// Handle to a live gem.
///
/// Handles are cheap to copy and compare. A handle whose gem has been
/// despawned never resolves again, even after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GemId {
    index: u32,
    generation: u32,
}

impl GemId {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for GemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A placed (or about to be placed) gem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gem {
    pub kind: GemKind,
    /// Last slot the gem was written to; kept in sync by the board
    pub pos: Pos,
    pub score_value: u32,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    gem: Option<Gem>,
}

/// Arena of gems indexed by [`GemId`]
#[derive(Debug, Clone, Default)]
pub struct GemPool {
    entries: Vec<Entry>,
    free: Vec<u32>,
    live: usize,
}

impl GemPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    /// Store a gem and return its handle, reusing a released slot if any
    pub fn insert(&mut self, gem: Gem) -> GemId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.gem = Some(gem);
            return GemId {
                index,
                generation: entry.generation,
            };
        }

        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            gem: Some(gem),
        });
        GemId {
            index,
            generation: 0,
        }
    }

    /// Release a gem; returns it if the handle was live
    pub fn remove(&mut self, id: GemId) -> Option<Gem> {
        let entry = self.entries.get_mut(id.index())?;
        if entry.generation != id.generation {
            return None;
        }
        let gem = entry.gem.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(gem)
    }

    pub fn get(&self, id: GemId) -> Option<&Gem> {
        self.entries
            .get(id.index())
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.gem.as_ref())
    }

    pub fn get_mut(&mut self, id: GemId) -> Option<&mut Gem> {
        self.entries
            .get_mut(id.index())
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.gem.as_mut())
    }

    pub fn contains(&self, id: GemId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live gems
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated (live + free)
    pub fn slots(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over live gems in slot order
    pub fn iter(&self) -> impl Iterator<Item = (GemId, &Gem)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            e.gem.as_ref().map(|gem| {
                (
                    GemId {
                        index: i as u32,
                        generation: e.generation,
                    },
                    gem,
                )
            })
        })
    }

    /// Release every gem
    pub fn clear(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.gem.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(i as u32);
            }
        }
        self.live = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem(kind: GemKind) -> Gem {
        Gem {
            kind,
            pos: Pos::new(0, 0),
            score_value: 10,
        }
    }

    #[test]
    fn insert_and_get() {
        let mut pool = GemPool::new();
        let a = pool.insert(gem(GemKind::Red));
        let b = pool.insert(gem(GemKind::Blue));

        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(a).map(|g| g.kind), Some(GemKind::Red));
        assert_eq!(pool.get(b).map(|g| g.kind), Some(GemKind::Blue));
    }

    #[test]
    fn released_slot_is_reused_with_new_generation() {
        let mut pool = GemPool::new();
        let a = pool.insert(gem(GemKind::Red));
        assert!(pool.remove(a).is_some());
        assert!(pool.is_empty());

        let b = pool.insert(gem(GemKind::Green));
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert_eq!(pool.slots(), 1);

        // The old handle must not see the new occupant.
        assert!(pool.get(a).is_none());
        assert!(pool.remove(a).is_none());
        assert_eq!(pool.get(b).map(|g| g.kind), Some(GemKind::Green));
    }

    #[test]
    fn double_remove_is_rejected() {
        let mut pool = GemPool::new();
        let a = pool.insert(gem(GemKind::Red));
        assert!(pool.remove(a).is_some());
        assert!(pool.remove(a).is_none());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn clear_invalidates_all_handles() {
        let mut pool = GemPool::with_capacity(4);
        let ids: Vec<_> = (0..4).map(|_| pool.insert(gem(GemKind::Yellow))).collect();
        pool.clear();
        assert!(pool.is_empty());
        assert!(ids.iter().all(|id| !pool.contains(*id)));
        assert_eq!(pool.iter().count(), 0);
    }
}
