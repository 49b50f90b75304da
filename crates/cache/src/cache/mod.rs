//! Set-Associative Cache Engine.
//!
//! This module implements the replacement core of a set-associative cache. It
//! maps addresses to sets, tracks which tags occupy which ways, and asks the
//! configured replacement policy for a victim when a set is full. Timing,
//! payloads and writeback costs are left to the caller, which receives hit,
//! fill and eviction reports.
//!
//! The expected protocol for every access is `lookup`, then `fill` on a miss.
//! [`Cache::access`] performs both steps.

/// Address to (set, tag) mapping and candidate enumeration.
pub mod indexer;
/// Cache replacement policy implementations (LRU, tree PLRU, BRRIP).
pub mod policies;
/// Fixed-capacity storage of tagged entries.
pub mod table;

use rand::rngs::StdRng;
use tracing::{debug, trace};

use self::indexer::AddressIndexer;
use self::policies::ReplacementPolicy;
use self::table::{EntryId, EntryTable};
use crate::common::error::{CacheError, ConfigError};
use crate::config::{CacheConfig, PolicyKind};

/// Result of [`Cache::lookup`].
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The block is resident.
    Hit {
        /// Set the block lives in.
        set: usize,
        /// Way holding the block.
        way: usize,
    },
    /// The block is not resident; the caller should `fill` it.
    Miss,
}

impl Lookup {
    /// Whether this lookup hit.
    #[inline]
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// Result of [`Cache::fill`].
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fill {
    /// Set the block was installed into.
    pub set: usize,
    /// Way the block was installed into.
    pub way: usize,
    /// Tag of the installed block.
    pub inserted_tag: u64,
    /// Tag of the block evicted to make room, if the set was full.
    pub evicted_tag: Option<u64>,
    /// Block-aligned address of the evicted block, for writeback.
    pub evicted_addr: Option<u64>,
}

impl Fill {
    /// Whether the fill displaced a valid block.
    #[inline]
    pub fn evicted(&self) -> bool {
        self.evicted_tag.is_some()
    }
}

/// Result of [`Cache::access`].
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The block was resident.
    Hit {
        /// Set the block lives in.
        set: usize,
        /// Way holding the block.
        way: usize,
    },
    /// The block missed and was filled.
    Miss(Fill),
}

impl Access {
    /// Whether this access hit.
    #[inline]
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// Set-associative cache with a pluggable replacement policy.
///
/// Every operation runs to completion synchronously. The cache performs no
/// locking; callers present accesses in the order they want reflected in
/// replacement state.
#[derive(Debug)]
pub struct Cache {
    indexer: AddressIndexer,
    table: EntryTable,
    policy: Box<dyn ReplacementPolicy>,
}

impl Cache {
    /// Creates a cache from a configuration.
    ///
    /// BRRIP takes its random source from `config.brrip.seed`, or from the OS
    /// when no seed is given and `require_seed` is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation, or
    /// [`ConfigError::MissingSeed`] for an unseeded reproducible BRRIP cache.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// Creates a cache with an explicit random source for BRRIP insertion.
    ///
    /// `rng` takes precedence over `config.brrip.seed` and is ignored by LRU
    /// and tree PLRU.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn with_rng(config: &CacheConfig, rng: StdRng) -> Result<Self, ConfigError> {
        Self::build(config, Some(rng))
    }

    fn build(config: &CacheConfig, rng: Option<StdRng>) -> Result<Self, ConfigError> {
        config.validate()?;

        let indexer = AddressIndexer::new(
            config.num_sets,
            config.associativity,
            config.block_size_bytes,
        )?;
        let table = EntryTable::new(config.num_sets, config.associativity);
        let mut policy = policies::build(config, rng)?;
        for slot in table.slots() {
            policy.instantiate(slot);
        }

        debug!(
            sets = config.num_sets,
            ways = config.associativity,
            block = config.block_size_bytes,
            policy = ?config.policy,
            "cache constructed"
        );

        Ok(Self {
            indexer,
            table,
            policy,
        })
    }

    /// Address geometry of this cache.
    pub fn geometry(&self) -> &AddressIndexer {
        &self.indexer
    }

    /// Selected replacement policy.
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// Total number of entries.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of entries currently holding a block.
    pub fn valid_count(&self) -> usize {
        self.table.valid_count()
    }

    /// Finds the entry holding `addr`'s block without touching policy state.
    fn probe(&self, addr: u64) -> (usize, u64, Option<EntryId>) {
        let candidates = self.indexer.candidates_for(addr);
        let tag = self.indexer.extract_tag(addr);
        let hit = self.table.find(self.table.members(&candidates), tag);
        (candidates.set(), tag, hit)
    }

    /// Checks if the cache holds the block containing `addr`.
    ///
    /// Unlike [`Cache::lookup`], this does not count as a use.
    pub fn contains(&self, addr: u64) -> bool {
        self.probe(addr).2.is_some()
    }

    /// Looks up the block containing `addr`.
    ///
    /// A hit updates the replacement state of the hit entry.
    pub fn lookup(&mut self, addr: u64) -> Lookup {
        let (set, tag, hit) = self.probe(addr);
        match hit {
            Some(id) => {
                self.policy.touch(id);
                let way = self.table.slot(id).way;
                trace!(set, way, tag, "hit");
                Lookup::Hit { set, way }
            }
            None => {
                trace!(set, tag, "miss");
                Lookup::Miss
            }
        }
    }

    /// Installs the block containing `addr`.
    ///
    /// The first free way of the set is used when there is one. Otherwise
    /// the policy selects a victim, which is invalidated and then refilled.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AlreadyResident`] if the block is already
    /// cached, or a policy invariant error from victim selection. The cache
    /// is left unchanged on error.
    pub fn fill(&mut self, addr: u64) -> Result<Fill, CacheError> {
        let candidates = self.indexer.candidates_for(addr);
        let set = candidates.set();
        let tag = self.indexer.extract_tag(addr);
        let members = self.table.members(&candidates);

        if self.table.find(members, tag).is_some() {
            return Err(CacheError::AlreadyResident { set, tag });
        }

        let (target, evicted_tag) = if let Some(free) = self.table.first_free(members) {
            (free, None)
        } else {
            // Only reached with every member valid.
            let victim = self.policy.select_victim(members)?;
            let evicted = self.table.invalidate(victim);
            self.policy.invalidate(victim);
            (victim, evicted)
        };

        self.table.install(target, tag);
        self.policy.reset(target);

        let way = self.table.slot(target).way;
        let evicted_addr = evicted_tag.map(|old| self.indexer.block_address(set, old));
        match evicted_tag {
            Some(old) => trace!(set, way, tag, evicted = old, "fill with eviction"),
            None => trace!(set, way, tag, "fill"),
        }

        Ok(Fill {
            set,
            way,
            inserted_tag: tag,
            evicted_tag,
            evicted_addr,
        })
    }

    /// Looks up `addr` and fills it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates invariant errors from [`Cache::fill`].
    pub fn access(&mut self, addr: u64) -> Result<Access, CacheError> {
        match self.lookup(addr) {
            Lookup::Hit { set, way } => Ok(Access::Hit { set, way }),
            Lookup::Miss => self.fill(addr).map(Access::Miss),
        }
    }

    /// Invalidates the block containing `addr`, if resident.
    ///
    /// The freed entry becomes the preferred victim of its set.
    ///
    /// # Returns
    ///
    /// The tag of the invalidated block, or `None` if it was not cached.
    pub fn invalidate(&mut self, addr: u64) -> Option<u64> {
        let (set, _, hit) = self.probe(addr);
        let id = hit?;
        let tag = self.table.invalidate(id);
        self.policy.invalidate(id);
        trace!(set, way = self.table.slot(id).way, ?tag, "invalidate");
        tag
    }

    /// Invalidates every resident block.
    ///
    /// # Returns
    ///
    /// The number of blocks dropped.
    pub fn flush(&mut self) -> usize {
        let mut dropped = 0;
        for index in 0..self.table.capacity() {
            let id = EntryId(index);
            if self.table.invalidate(id).is_some() {
                self.policy.invalidate(id);
                dropped += 1;
            }
        }
        debug!(dropped, "cache flushed");
        dropped
    }
}
