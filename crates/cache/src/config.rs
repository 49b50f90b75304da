//! Configuration system for the cache engine.
//!
//! This module defines the construction parameters of a [`crate::Cache`]. It provides:
//! 1. **Defaults:** Baseline geometry and BRRIP parameters.
//! 2. **Structures:** `CacheConfig` and the BRRIP-only `BrripConfig`.
//! 3. **Enums:** The replacement policy selector.
//! 4. **Validation:** Eager checks so a bad configuration fails at construction.
//!
//! Configuration is supplied as JSON (`CacheConfig::from_json`, `CacheConfig::from_path`)
//! or built in code starting from `CacheConfig::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants.
///
/// These values describe a 16 KiB, 4-way, 64-byte-line cache using LRU.
mod defaults {
    /// Default number of sets.
    pub const NUM_SETS: usize = 64;

    /// Default associativity (ways per set).
    pub const ASSOCIATIVITY: usize = 4;

    /// Default block (line) size in bytes.
    ///
    /// Matches typical modern processor cache line sizes.
    pub const BLOCK_SIZE: usize = 64;

    /// Default BRRIP hit promotion: a hit predicts near-immediate re-reference.
    pub const HIT_PRIORITY: bool = true;

    /// Default BRRIP bimodal throttle, in percent.
    ///
    /// Roughly one fill in 32 is inserted with a long rather than distant
    /// re-reference prediction.
    pub const BTP: u32 = 3;

    /// Default RRPV counter width in bits (`RRPV_MAX = 3`).
    pub const RRPV_BITS: u32 = 2;
}

/// Cache replacement policy algorithms.
///
/// Specifies the algorithm used to select which entry to evict when a new
/// block must be installed in a full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyKind {
    /// Least Recently Used, tracked with a logical clock.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Tree-based pseudo-LRU with one shared bit tree per set.
    ///
    /// Requires a power-of-two associativity.
    #[serde(alias = "Plru", alias = "TreePLRU", alias = "TreePlru")]
    Plru,
    /// Bimodal Re-Reference Interval Prediction.
    ///
    /// Uses saturating RRPV counters and a seedable random source.
    #[serde(alias = "Brrip")]
    Brrip,
}

/// Parameters for the BRRIP policy. Ignored by the other policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BrripConfig {
    /// On a hit, reset the RRPV to 0 instead of decrementing it.
    #[serde(default = "BrripConfig::default_hit_priority")]
    pub hit_priority: bool,

    /// Percentage (1-100) of fills inserted with `RRPV_MAX - 1` instead of `RRPV_MAX`.
    #[serde(default = "BrripConfig::default_btp")]
    pub btp: u32,

    /// Width of the RRPV counter in bits; `RRPV_MAX = 2^bits - 1`.
    #[serde(default = "BrripConfig::default_rrpv_bits")]
    pub rrpv_bits: u32,

    /// Seed for the insertion random source. `None` draws entropy from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BrripConfig {
    /// Serde default for `hit_priority`.
    fn default_hit_priority() -> bool {
        defaults::HIT_PRIORITY
    }

    /// Serde default for `btp`.
    fn default_btp() -> u32 {
        defaults::BTP
    }

    /// Serde default for `rrpv_bits`.
    fn default_rrpv_bits() -> u32 {
        defaults::RRPV_BITS
    }

    /// Largest value the RRPV counter can hold.
    pub fn rrpv_max(&self) -> u8 {
        ((1u32 << self.rrpv_bits.clamp(1, 8)) - 1) as u8
    }
}

impl Default for BrripConfig {
    fn default() -> Self {
        Self {
            hit_priority: defaults::HIT_PRIORITY,
            btp: defaults::BTP,
            rrpv_bits: defaults::RRPV_BITS,
            seed: None,
        }
    }
}

/// Cache geometry and replacement configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Number of sets (power of two).
    #[serde(default = "CacheConfig::default_sets")]
    pub num_sets: usize,

    /// Associativity (ways per set).
    #[serde(default = "CacheConfig::default_ways")]
    pub associativity: usize,

    /// Block size in bytes (power of two).
    #[serde(default = "CacheConfig::default_block")]
    pub block_size_bytes: usize,

    /// Replacement policy
    #[serde(default)]
    pub policy: PolicyKind,

    /// BRRIP parameters
    #[serde(default)]
    pub brrip: BrripConfig,

    /// Reproducible mode: BRRIP construction fails without an explicit seed.
    #[serde(default)]
    pub require_seed: bool,
}

impl CacheConfig {
    /// Serde default for `num_sets`.
    fn default_sets() -> usize {
        defaults::NUM_SETS
    }

    /// Serde default for `associativity`.
    fn default_ways() -> usize {
        defaults::ASSOCIATIVITY
    }

    /// Serde default for `block_size_bytes`.
    fn default_block() -> usize {
        defaults::BLOCK_SIZE
    }

    /// Total number of entries (`num_sets * associativity`).
    ///
    /// Saturates at `usize::MAX` for a geometry that [`validate`] rejects.
    ///
    /// [`validate`]: CacheConfig::validate
    pub fn capacity(&self) -> usize {
        self.num_sets.saturating_mul(self.associativity)
    }

    /// Total data capacity in bytes.
    ///
    /// Saturates at `usize::MAX` like [`CacheConfig::capacity`].
    pub fn size_bytes(&self) -> usize {
        self.capacity().saturating_mul(self.block_size_bytes)
    }

    /// Checks every constraint the engine relies on.
    ///
    /// BRRIP parameters are only checked when BRRIP is the selected policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking geometry before
    /// policy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.num_sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "num_sets",
                value: self.num_sets,
            });
        }
        if !self.block_size_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "block_size_bytes",
                value: self.block_size_bytes,
            });
        }
        if self.associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        let fits = self
            .num_sets
            .checked_mul(self.associativity)
            .and_then(|entries| entries.checked_mul(self.block_size_bytes))
            .is_some();
        if !fits {
            return Err(ConfigError::CapacityOverflow {
                num_sets: self.num_sets,
                associativity: self.associativity,
                block_size_bytes: self.block_size_bytes,
            });
        }

        match self.policy {
            PolicyKind::Lru => {}
            PolicyKind::Plru => {
                if !self.associativity.is_power_of_two() {
                    return Err(ConfigError::PlruAssociativity(self.associativity));
                }
            }
            PolicyKind::Brrip => {
                if !(1..=100).contains(&self.brrip.btp) {
                    return Err(ConfigError::BimodalProbability(self.brrip.btp));
                }
                if !(1..=8).contains(&self.brrip.rrpv_bits) {
                    return Err(ConfigError::RrpvWidth(self.brrip.rrpv_bits));
                }
            }
        }
        Ok(())
    }

    /// Parses and validates a configuration from a JSON document.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the validation
    /// error for an unusable configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`CacheConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            num_sets: defaults::NUM_SETS,
            associativity: defaults::ASSOCIATIVITY,
            block_size_bytes: defaults::BLOCK_SIZE,
            policy: PolicyKind::default(),
            brrip: BrripConfig::default(),
            require_seed: false,
        }
    }
}
