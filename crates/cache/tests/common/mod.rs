//! Shared helpers for the cache engine tests.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rvsim_cache::cache::indexer::AddressIndexer;
use rvsim_cache::cache::policies::ReplacementPolicy;
use rvsim_cache::cache::table::{EntryId, EntryTable};
use rvsim_cache::{Cache, CacheConfig, PolicyKind};
use tracing_subscriber::EnvFilter;

/// Block size used by the helper configurations.
pub const BLOCK: usize = 64;

/// Seed used wherever a test needs a reproducible BRRIP cache.
pub const SEED: u64 = 0x5eed;

/// Installs a test-friendly tracing subscriber. Safe to call repeatedly.
///
/// Set `RUST_LOG=rvsim_cache=trace` to see every hit, fill and eviction.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a configuration with 64-byte blocks and default BRRIP parameters.
pub fn config(policy: PolicyKind, num_sets: usize, ways: usize) -> CacheConfig {
    CacheConfig {
        num_sets,
        associativity: ways,
        block_size_bytes: BLOCK,
        policy,
        ..CacheConfig::default()
    }
}

/// Builds a cache, seeding BRRIP with [`SEED`].
pub fn cache(policy: PolicyKind, num_sets: usize, ways: usize) -> Cache {
    init_tracing();
    let mut config = config(policy, num_sets, ways);
    config.brrip.seed = Some(SEED);
    Cache::new(&config).unwrap()
}

/// Builds a BRRIP cache with explicit parameters and a fixed seed.
pub fn brrip_cache(num_sets: usize, ways: usize, hit_priority: bool, btp: u32) -> Cache {
    init_tracing();
    let mut config = config(PolicyKind::Brrip, num_sets, ways);
    config.brrip.hit_priority = hit_priority;
    config.brrip.btp = btp;
    Cache::with_rng(&config, StdRng::seed_from_u64(SEED)).unwrap()
}

/// Address of byte 0 of the block `(set, tag)` for a `num_sets` x [`BLOCK`] geometry.
pub fn addr(num_sets: usize, set: usize, tag: u64) -> u64 {
    AddressIndexer::new(num_sets, 1, BLOCK)
        .unwrap()
        .block_address(set, tag)
}

/// Creates `policy`'s metadata for every entry of a `num_sets` x `ways` table.
///
/// Returns the entry ids of each set, in way order.
pub fn instantiate(
    policy: &mut dyn ReplacementPolicy,
    num_sets: usize,
    ways: usize,
) -> Vec<Vec<EntryId>> {
    let table = EntryTable::new(num_sets, ways);
    for slot in table.slots() {
        policy.instantiate(slot);
    }
    (0..num_sets)
        .map(|set| (set * ways..(set + 1) * ways).map(EntryId).collect())
        .collect()
}
