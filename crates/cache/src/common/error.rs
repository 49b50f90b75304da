//! Configuration and invariant error definitions.
//!
//! This module defines the two failure classes of the engine:
//! 1. **Configuration Errors:** Raised once, at construction, when the geometry or
//!    policy parameters are unusable. Never recovered internally.
//! 2. **Invariant Violations:** Raised when the orchestrator or a policy observes a
//!    state that a correctly driven cache can never reach. The operation is aborted
//!    before any entry is modified.

use thiserror::Error;

/// Errors raised while building a cache from its configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A geometry parameter that must be a power of two is not.
    ///
    /// Zero is rejected through this variant as well.
    #[error("{field} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// The geometry describes more entries or bytes than `usize` can count.
    #[error("cache of {num_sets} x {associativity} x {block_size_bytes} bytes overflows usize")]
    CapacityOverflow {
        /// Configured number of sets.
        num_sets: usize,
        /// Configured ways per set.
        associativity: usize,
        /// Configured block size in bytes.
        block_size_bytes: usize,
    },

    /// The cache was configured with zero ways per set.
    #[error("associativity must be at least 1")]
    ZeroAssociativity,

    /// Tree PLRU was selected with an associativity that cannot form a full binary tree.
    #[error("tree PLRU requires a power-of-two associativity, got {0}")]
    PlruAssociativity(usize),

    /// The BRRIP bimodal throttle is outside `1..=100` percent.
    #[error("BRRIP bimodal throttle must be within 1..=100 percent, got {0}")]
    BimodalProbability(u32),

    /// The BRRIP counter width is outside `1..=8` bits.
    #[error("BRRIP RRPV width must be within 1..=8 bits, got {0}")]
    RrpvWidth(u32),

    /// BRRIP was requested in reproducible mode without a seed.
    #[error("BRRIP requires an explicit seed when require_seed is set")]
    MissingSeed,

    /// The configuration document could not be deserialized.
    #[error("failed to parse cache config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read cache config: {0}")]
    Io(#[from] std::io::Error),
}

/// Internal invariant violations detected while servicing an access.
///
/// None of these occur when the cache is driven through [`crate::Cache`] with
/// its documented `lookup`-then-`fill` protocol; they indicate a programming
/// error in the caller or in a policy.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Victim selection was asked to choose from no candidates.
    #[error("victim selection over an empty candidate set")]
    EmptyCandidateSet,

    /// The policy could not name a victim among the supplied candidates.
    #[error("replacement policy found no victim among {candidates} candidates")]
    NoVictim {
        /// Number of candidates that were offered.
        candidates: usize,
    },

    /// A fill was requested for a block that is already valid in its set.
    #[error("block with tag {tag:#x} is already resident in set {set}")]
    AlreadyResident {
        /// Set the block maps to.
        set: usize,
        /// Tag of the resident block.
        tag: u64,
    },
}
