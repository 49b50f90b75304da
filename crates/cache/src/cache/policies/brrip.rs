//! Bimodal Re-Reference Interval Prediction (BRRIP) Replacement Policy.
//!
//! Each entry carries a saturating re-reference prediction value (RRPV) in
//! `0..=RRPV_MAX`. Small values predict a near re-reference, `RRPV_MAX`
//! predicts a distant one.
//!
//! - **Fill:** inserted at `RRPV_MAX` (distant), except that `btp` percent of
//!   fills are inserted at `RRPV_MAX - 1` (long). The choice comes from an
//!   explicitly seeded random source.
//! - **Hit:** promoted to 0 with hit priority, otherwise decremented by one.
//! - **Victim:** any invalid candidate first. Otherwise every candidate is aged
//!   by the same amount until the oldest reaches `RRPV_MAX`, and the first
//!   candidate at `RRPV_MAX` is evicted.
//!
//! Inserting most blocks as distant keeps scans from flushing the working set,
//! while the bimodal fraction lets a thrashing working set gain a foothold.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;

use super::ReplacementPolicy;
use crate::cache::table::{EntryId, Slot};
use crate::common::error::CacheError;
use crate::config::PolicyKind;

/// Per-entry BRRIP metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RripEntry {
    /// Re-reference prediction value, always within `0..=RRPV_MAX`.
    pub rrpv: u8,
    /// Mirrors the entry's validity; cleared by `invalidate`.
    pub valid: bool,
}

/// BRRIP policy state.
#[derive(Clone)]
pub struct BrripPolicy {
    hit_priority: bool,
    /// Percentage of fills inserted as long rather than distant.
    btp: u32,
    rrpv_max: u8,
    rng: StdRng,
    meta: Vec<RripEntry>,
}

impl BrripPolicy {
    /// Creates a BRRIP policy.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of entries to reserve metadata for.
    /// * `hit_priority` - Promote hits straight to RRPV 0.
    /// * `btp` - Bimodal throttle in percent (`1..=100`, validated by the config).
    /// * `rrpv_max` - Saturation value of the RRPV counter.
    /// * `rng` - Random source for the bimodal insertion decision.
    pub fn new(capacity: usize, hit_priority: bool, btp: u32, rrpv_max: u8, rng: StdRng) -> Self {
        Self {
            hit_priority,
            btp,
            rrpv_max,
            rng,
            meta: Vec::with_capacity(capacity),
        }
    }

    /// Saturation value of the RRPV counters.
    pub fn rrpv_max(&self) -> u8 {
        self.rrpv_max
    }

    /// Current metadata of `entry`.
    ///
    /// # Panics
    ///
    /// Panics if `entry` was never instantiated.
    pub fn entry(&self, entry: EntryId) -> RripEntry {
        self.meta[entry.0]
    }

    /// Draws the bimodal insertion decision: `true` means insert as long.
    fn insert_long(&mut self) -> bool {
        self.rng.random_range(1..=100u32) <= self.btp
    }
}

impl fmt::Debug for BrripPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrripPolicy")
            .field("hit_priority", &self.hit_priority)
            .field("btp", &self.btp)
            .field("rrpv_max", &self.rrpv_max)
            .field("entries", &self.meta.len())
            .finish_non_exhaustive()
    }
}

impl ReplacementPolicy for BrripPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Brrip
    }

    fn instantiate(&mut self, slot: Slot) {
        if self.meta.len() <= slot.id.0 {
            self.meta.resize(slot.id.0 + 1, RripEntry::default());
        }
        self.meta[slot.id.0] = RripEntry::default();
    }

    fn reset(&mut self, entry: EntryId) {
        let rrpv = if self.insert_long() {
            self.rrpv_max.saturating_sub(1)
        } else {
            self.rrpv_max
        };
        self.meta[entry.0] = RripEntry { rrpv, valid: true };
    }

    fn touch(&mut self, entry: EntryId) {
        let hit_priority = self.hit_priority;
        let meta = &mut self.meta[entry.0];
        meta.rrpv = if hit_priority {
            0
        } else {
            meta.rrpv.saturating_sub(1)
        };
    }

    /// Clears validity only; the RRPV keeps its value.
    fn invalidate(&mut self, entry: EntryId) {
        self.meta[entry.0].valid = false;
    }

    /// Ages every candidate so the largest RRPV reaches `RRPV_MAX`, then
    /// evicts the first candidate at `RRPV_MAX`.
    ///
    /// The aging pass mutates all candidates, not only the victim. An invalid
    /// candidate short-circuits selection without aging.
    fn select_victim(&mut self, candidates: &[EntryId]) -> Result<EntryId, CacheError> {
        if let Some(&free) = candidates.iter().find(|id| !self.meta[id.0].valid) {
            return Ok(free);
        }

        let oldest = candidates
            .iter()
            .map(|id| self.meta[id.0].rrpv)
            .max()
            .ok_or(CacheError::EmptyCandidateSet)?;

        if oldest < self.rrpv_max {
            let age = self.rrpv_max - oldest;
            for id in candidates {
                let meta = &mut self.meta[id.0];
                meta.rrpv = meta.rrpv.saturating_add(age).min(self.rrpv_max);
            }
        }

        candidates
            .iter()
            .copied()
            .find(|id| self.meta[id.0].rrpv == self.rrpv_max)
            .ok_or(CacheError::NoVictim {
                candidates: candidates.len(),
            })
    }
}
