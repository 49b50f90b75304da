//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the entry that has gone the longest without a fill or a
//! hit. Each entry carries a timestamp taken from a logical clock that is
//! private to the cache and shared by all of its sets. The clock advances on
//! every `reset` and `touch`; it is not simulated time.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`/`reset()`: O(1)
//!   - `select_victim()`: O(W) where W is the number of candidates
//! - **Space Complexity:** one `u64` per entry
//! - **Best Case:** Workloads with strong temporal locality
//! - **Worst Case:** Cyclic scans larger than the set (every access misses)

use super::ReplacementPolicy;
use crate::cache::table::{EntryId, Slot};
use crate::common::error::CacheError;
use crate::config::PolicyKind;

/// Timestamp of an invalidated entry; older than any stamp the clock hands out.
pub const INVALID_STAMP: u64 = 0;

/// LRU Policy state.
#[derive(Clone, Debug)]
pub struct LruPolicy {
    /// Last-use timestamp per entry.
    stamps: Vec<u64>,
    /// Next timestamp to hand out. Starts above `INVALID_STAMP`.
    clock: u64,
}

impl LruPolicy {
    /// Creates an LRU policy with room for `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            stamps: Vec::with_capacity(capacity),
            clock: INVALID_STAMP + 1,
        }
    }

    /// Current timestamp of `entry`.
    ///
    /// # Panics
    ///
    /// Panics if `entry` was never instantiated.
    pub fn stamp(&self, entry: EntryId) -> u64 {
        self.stamps[entry.0]
    }

    /// The value the next `reset` or `touch` will record.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    fn stamp_now(&mut self, entry: EntryId) {
        self.stamps[entry.0] = self.clock;
        self.clock += 1;
    }
}

impl ReplacementPolicy for LruPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lru
    }

    fn instantiate(&mut self, slot: Slot) {
        if self.stamps.len() <= slot.id.0 {
            self.stamps.resize(slot.id.0 + 1, INVALID_STAMP);
        }
        self.stamps[slot.id.0] = INVALID_STAMP;
    }

    fn reset(&mut self, entry: EntryId) {
        self.stamp_now(entry);
    }

    fn touch(&mut self, entry: EntryId) {
        self.stamp_now(entry);
    }

    fn invalidate(&mut self, entry: EntryId) {
        self.stamps[entry.0] = INVALID_STAMP;
    }

    /// Returns the candidate with the oldest timestamp.
    ///
    /// `min_by_key` keeps the first of equal minima, so ties go to the
    /// earliest candidate.
    fn select_victim(&mut self, candidates: &[EntryId]) -> Result<EntryId, CacheError> {
        candidates
            .iter()
            .copied()
            .min_by_key(|&id| self.stamps[id.0])
            .ok_or(CacheError::EmptyCandidateSet)
    }
}
