//! Entry Table Unit Tests.
//!
//! Verifies fixed allocation, per-set grouping and the install/invalidate
//! lifecycle of entries.

use rvsim_cache::cache::indexer::AddressIndexer;
use rvsim_cache::cache::table::{EntryId, EntryTable, Slot};

#[test]
fn allocates_sets_times_ways_invalid_entries() {
    let table = EntryTable::new(8, 4);
    assert_eq!(table.capacity(), 32);
    assert_eq!(table.num_sets(), 8);
    assert_eq!(table.ways(), 4);
    assert_eq!(table.valid_count(), 0);
    assert!((0..32).all(|i| !table.entry(EntryId(i)).is_valid()));
}

#[test]
fn every_set_has_exactly_ways_members() {
    let idx = AddressIndexer::new(8, 4, 64).unwrap();
    let table = EntryTable::new(8, 4);
    for set in 0..8 {
        let members = table.members(&idx.candidates_in(set));
        assert_eq!(members.len(), 4);
        for (way, &id) in members.iter().enumerate() {
            assert_eq!(table.slot(id), Slot { id, set, way });
        }
    }
}

#[test]
fn slots_enumerate_in_id_order() {
    let table = EntryTable::new(2, 2);
    let slots: Vec<_> = table.slots().map(|s| (s.id.index(), s.set, s.way)).collect();
    assert_eq!(slots, vec![(0, 0, 0), (1, 0, 1), (2, 1, 0), (3, 1, 1)]);
}

#[test]
fn install_then_find() {
    let idx = AddressIndexer::new(2, 2, 64).unwrap();
    let mut table = EntryTable::new(2, 2);
    table.install(EntryId(3), 0x42);

    let members = table.members(&idx.candidates_in(1));
    assert_eq!(table.find(members, 0x42), Some(EntryId(3)));
    assert_eq!(table.find(members, 0x43), None);
    assert_eq!(table.first_free(members), Some(EntryId(2)));
    assert_eq!(table.valid_count(), 1);
}

#[test]
fn invalidate_returns_tag_once() {
    let mut table = EntryTable::new(1, 2);
    table.install(EntryId(0), 7);
    assert_eq!(table.invalidate(EntryId(0)), Some(7));
    assert_eq!(table.invalidate(EntryId(0)), None);
    assert!(!table.entry(EntryId(0)).is_valid());
}

#[test]
fn stale_tag_is_never_matched() {
    let idx = AddressIndexer::new(1, 2, 64).unwrap();
    let mut table = EntryTable::new(1, 2);
    table.install(EntryId(1), 9);
    let _ = table.invalidate(EntryId(1));

    let members = table.members(&idx.candidates_in(0));
    assert_eq!(table.entry(EntryId(1)).tag(), 9);
    assert_eq!(table.find(members, 9), None);
}
