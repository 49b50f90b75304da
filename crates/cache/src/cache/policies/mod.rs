//! Cache Replacement Policies.
//!
//! Implements the algorithms that track reuse and select victim entries in a
//! set-associative cache.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used, driven by a logical clock.
//! - `TreePlru`: Pseudo-LRU over one shared bit tree per set.
//! - `Brrip`: Bimodal Re-Reference Interval Prediction with saturating counters.
//!
//! Every policy owns its metadata, keyed by [`EntryId`]. The orchestrator never
//! reads it; it only drives the five operations of [`ReplacementPolicy`].

/// Bimodal RRIP replacement policy.
pub mod brrip;

/// Least Recently Used replacement policy.
pub mod lru;

/// Tree pseudo-LRU replacement policy.
pub mod plru;

pub use brrip::BrripPolicy;
pub use lru::LruPolicy;
pub use plru::TreePlruPolicy;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::table::{EntryId, Slot};
use crate::common::error::{CacheError, ConfigError};
use crate::config::{CacheConfig, PolicyKind};

/// Trait for cache replacement policies.
///
/// Defines the interface for maintaining reuse metadata and selecting victims.
/// All calls are serialized by the owning cache.
pub trait ReplacementPolicy: std::fmt::Debug + Send + Sync {
    /// The policy variant.
    fn kind(&self) -> PolicyKind;

    /// Creates the metadata for one entry.
    ///
    /// Called exactly once per entry when the cache is constructed.
    fn instantiate(&mut self, slot: Slot);

    /// Initializes metadata when a block is filled into `entry`.
    fn reset(&mut self, entry: EntryId);

    /// Updates metadata when `entry` hits.
    fn touch(&mut self, entry: EntryId);

    /// Marks `entry` as the most eligible future victim.
    ///
    /// Called when a block is evicted or externally invalidated.
    fn invalidate(&mut self, entry: EntryId);

    /// Selects the entry to evict from `candidates`.
    ///
    /// The result is a deterministic function of the policy state and the
    /// candidate order, and is always one of `candidates`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::EmptyCandidateSet`] for an empty slice and
    /// [`CacheError::NoVictim`] if the chosen entry is not among `candidates`.
    fn select_victim(&mut self, candidates: &[EntryId]) -> Result<EntryId, CacheError>;
}

/// Builds the policy selected by `config`.
///
/// `rng` is the explicit random source for BRRIP. When it is `None`, BRRIP
/// seeds from `config.brrip.seed`, or from the OS unless `require_seed` is set.
/// The other policies ignore it.
///
/// # Errors
///
/// Returns [`ConfigError::PlruAssociativity`] for an unusable tree PLRU
/// geometry and [`ConfigError::MissingSeed`] when a reproducible BRRIP cache
/// has no seed.
pub fn build(
    config: &CacheConfig,
    rng: Option<StdRng>,
) -> Result<Box<dyn ReplacementPolicy>, ConfigError> {
    let policy: Box<dyn ReplacementPolicy> = match config.policy {
        PolicyKind::Lru => Box::new(LruPolicy::new(config.capacity())),
        PolicyKind::Plru => Box::new(TreePlruPolicy::new(
            config.num_sets,
            config.associativity,
        )?),
        PolicyKind::Brrip => {
            let rng = match (rng, config.brrip.seed) {
                (Some(rng), _) => rng,
                (None, Some(seed)) => StdRng::seed_from_u64(seed),
                (None, None) if config.require_seed => return Err(ConfigError::MissingSeed),
                (None, None) => StdRng::from_os_rng(),
            };
            Box::new(BrripPolicy::new(
                config.capacity(),
                config.brrip.hit_priority,
                config.brrip.btp,
                config.brrip.rrpv_max(),
                rng,
            ))
        }
    };
    Ok(policy)
}
