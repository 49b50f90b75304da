//! BRRIP Policy Tests.
//!
//! Unless noted, counters are 2 bits wide (`RRPV_MAX = 3`) and `btp = 100`,
//! which makes every insertion land at `RRPV_MAX - 1` deterministically.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rvsim_cache::CacheError;
use rvsim_cache::cache::policies::brrip::RripEntry;
use rvsim_cache::cache::policies::{BrripPolicy, ReplacementPolicy};
use rvsim_cache::cache::table::EntryId;

use crate::common::{SEED, instantiate};

fn policy(
    ways: usize,
    hit_priority: bool,
    btp: u32,
    rrpv_max: u8,
) -> (BrripPolicy, Vec<EntryId>) {
    let rng = StdRng::seed_from_u64(SEED);
    let mut brrip = BrripPolicy::new(ways, hit_priority, btp, rrpv_max, rng);
    let mut sets = instantiate(&mut brrip, 1, ways);
    (brrip, sets.remove(0))
}

fn rrpvs(brrip: &BrripPolicy, ids: &[EntryId]) -> Vec<u8> {
    ids.iter().map(|&id| brrip.entry(id).rrpv).collect()
}

/// Four fresh fills at `RRPV_MAX - 1`, then a victim search ages all four to
/// `RRPV_MAX` and evicts the first.
#[test]
fn full_set_ages_everyone_and_evicts_first() {
    let (mut brrip, ways) = policy(4, false, 100, 3);
    for &id in &ways {
        brrip.reset(id);
    }
    assert_eq!(rrpvs(&brrip, &ways), vec![2, 2, 2, 2]);

    assert_eq!(brrip.select_victim(&ways), Ok(ways[0]));
    assert_eq!(rrpvs(&brrip, &ways), vec![3, 3, 3, 3]);
}

/// Aging adds the same amount to every candidate, not only the victim.
#[test]
fn aging_preserves_relative_order() {
    let (mut brrip, ways) = policy(4, true, 100, 3);
    for &id in &ways {
        brrip.reset(id);
    }
    brrip.touch(ways[0]);
    assert_eq!(rrpvs(&brrip, &ways), vec![0, 2, 2, 2]);

    assert_eq!(brrip.select_victim(&ways), Ok(ways[1]));
    assert_eq!(rrpvs(&brrip, &ways), vec![1, 3, 3, 3]);
}

/// With a candidate already at `RRPV_MAX` no aging happens, so repeated
/// searches agree and leave the counters alone.
#[test]
fn no_aging_when_a_candidate_is_saturated() {
    let (mut brrip, ways) = policy(4, true, 100, 3);
    for &id in &ways {
        brrip.reset(id);
    }
    brrip.touch(ways[0]);
    let _ = brrip.select_victim(&ways).unwrap();

    assert_eq!(brrip.select_victim(&ways), Ok(ways[1]));
    assert_eq!(rrpvs(&brrip, &ways), vec![1, 3, 3, 3]);
}

/// An invalid candidate is returned first, without aging the others.
#[test]
fn invalid_candidate_preferred() {
    let (mut brrip, ways) = policy(4, false, 100, 3);
    for &id in &ways {
        brrip.reset(id);
    }
    brrip.invalidate(ways[2]);

    assert_eq!(brrip.select_victim(&ways), Ok(ways[2]));
    assert_eq!(rrpvs(&brrip, &ways), vec![2, 2, 2, 2]);
}

#[test]
fn invalidate_clears_valid_only() {
    let (mut brrip, ways) = policy(1, false, 100, 3);
    brrip.reset(ways[0]);
    brrip.invalidate(ways[0]);
    assert_eq!(
        brrip.entry(ways[0]),
        RripEntry {
            rrpv: 2,
            valid: false
        }
    );
}

#[test]
fn hit_priority_promotes_to_zero() {
    let (mut brrip, ways) = policy(1, true, 100, 7);
    brrip.reset(ways[0]);
    assert_eq!(brrip.entry(ways[0]).rrpv, 6);
    brrip.touch(ways[0]);
    assert_eq!(brrip.entry(ways[0]).rrpv, 0);
}

#[test]
fn frequency_priority_decrements() {
    let (mut brrip, ways) = policy(1, false, 100, 7);
    brrip.reset(ways[0]);
    brrip.touch(ways[0]);
    brrip.touch(ways[0]);
    assert_eq!(brrip.entry(ways[0]).rrpv, 4);
}

/// One-bit counters: insert at 0, age to 1.
#[test]
fn single_bit_counters() {
    let (mut brrip, ways) = policy(2, false, 100, 1);
    brrip.reset(ways[0]);
    brrip.reset(ways[1]);
    assert_eq!(rrpvs(&brrip, &ways), vec![0, 0]);
    assert_eq!(brrip.select_victim(&ways), Ok(ways[0]));
    assert_eq!(rrpvs(&brrip, &ways), vec![1, 1]);
}

/// With a low throttle most insertions are distant, a few are long, and
/// nothing else is ever produced.
#[test]
fn bimodal_insertion_is_mostly_distant() {
    let (mut brrip, ways) = policy(1, false, 5, 3);
    let mut long = 0;
    for _ in 0..2000 {
        brrip.reset(ways[0]);
        match brrip.entry(ways[0]).rrpv {
            3 => {}
            2 => long += 1,
            other => panic!("unexpected insertion RRPV {other}"),
        }
    }
    assert!(long > 0, "btp=5 never inserted long in 2000 fills");
    assert!(long < 400, "btp=5 inserted long {long} times in 2000 fills");
}

/// Identically seeded policies make identical insertion decisions.
#[test]
fn same_seed_same_decisions() {
    let (mut a, ways) = policy(1, false, 50, 3);
    let (mut b, _) = policy(1, false, 50, 3);
    for _ in 0..64 {
        a.reset(ways[0]);
        b.reset(ways[0]);
        assert_eq!(a.entry(ways[0]), b.entry(ways[0]));
    }
}

#[test]
fn empty_candidates_is_an_error() {
    let (mut brrip, _) = policy(1, false, 100, 3);
    assert_eq!(brrip.select_victim(&[]), Err(CacheError::EmptyCandidateSet));
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn entry_of_unknown_id_panics() {
    let (brrip, _) = policy(2, false, 100, 3);
    let _ = brrip.entry(EntryId(2));
}
