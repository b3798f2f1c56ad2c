//! Memoization of line solutions, keyed by `(clue, cells-fingerprint)`.
//!
//! Backed by the `lru` crate (`lru = "0.4"`) rather than a `cached`-style
//! wrapper: `lru` gives the same bounded-capacity eviction policy without
//! pulling in a crate that was never actually part of the dependency
//! table.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use lru::LruCache;

use crate::block::Clue;
use crate::cell::{Cell, Line};

/// Default bound: ~10 000 entries, enough to cover most boards' working set
/// without unbounded growth on large ones.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// A line solver result, cached verbatim: either the refined cells or the
/// fact that the line is inconsistent (we don't cache the error's axis/index
/// since those aren't part of the cache key's identity).
pub type CachedResult = Result<Line, ()>;

fn fingerprint_clue(clue: &Clue) -> u64 {
    let mut hasher = DefaultHasher::new();
    clue.hash(&mut hasher);
    hasher.finish()
}

fn fingerprint_cells(cells: &[Cell]) -> u64 {
    let mut hasher = DefaultHasher::new();
    cells.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
struct Key {
    clue: u64,
    cells: u64,
}

/// A bounded, least-recently-used line-solution cache.
///
/// Not internally synchronized: the driver is single-threaded by default,
/// so each `PropagationDriver`/probing run owns its own cache rather than
/// reaching for a mutex up front. A future parallel driver would wrap this
/// in a `Mutex` or shard it by fingerprint.
#[derive(Debug)]
pub struct LineCache {
    store: LruCache<Key, CachedResult>,
    hits: u64,
    misses: u64,
}

impl LineCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: LruCache::new(capacity.max(1)),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, clue: &Clue, cells: &[Cell]) -> Option<CachedResult> {
        let key = Key {
            clue: fingerprint_clue(clue),
            cells: fingerprint_cells(cells),
        };
        let hit = self.store.get(&key).cloned();
        if hit.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        hit
    }

    pub fn put(&mut self, clue: &Clue, cells: &[Cell], result: CachedResult) {
        let key = Key {
            clue: fingerprint_clue(clue),
            cells: fingerprint_cells(cells),
        };
        let _ = self.store.put(key, result);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl Default for LineCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;

    #[test]
    fn miss_then_hit() {
        let mut cache = LineCache::with_capacity(4);
        let clue = Clue::new(vec![Block::mono(1)]);
        let cells: Line = vec![Cell::blank(), Cell::filled()].into();

        assert!(cache.get(&clue, &cells).is_none());
        cache.put(&clue, &cells, Ok(cells.clone()));
        assert_eq!(cache.get(&clue, &cells), Some(Ok(cells.clone())));
        assert!((cache.hit_rate() - (1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn distinguishes_different_cell_states() {
        let mut cache = LineCache::with_capacity(4);
        let clue = Clue::new(vec![Block::mono(1)]);
        let a: Line = vec![Cell::blank(), Cell::filled()].into();
        let b: Line = vec![Cell::filled(), Cell::blank()].into();

        cache.put(&clue, &a, Ok(a.clone()));
        assert!(cache.get(&clue, &b).is_none());
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = LineCache::with_capacity(1);
        let clue = Clue::new(vec![]);
        let a: Line = vec![Cell::blank()].into();
        let b: Line = vec![Cell::filled()].into();

        cache.put(&clue, &a, Ok(a.clone()));
        cache.put(&clue, &b, Ok(b.clone()));
        assert!(cache.get(&clue, &a).is_none());
        assert_eq!(cache.get(&clue, &b), Some(Ok(b)));
    }
}
