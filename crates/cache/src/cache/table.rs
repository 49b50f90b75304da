//! Entry Table.
//!
//! Fixed-capacity storage for every (set, way) slot of the cache. Entries are
//! allocated once at construction and reused for the lifetime of the cache;
//! only their tag and validity change. Replacement metadata is not stored
//! here, it belongs to the policy and is keyed by [`EntryId`].

use super::indexer::Candidates;

/// Dense index of an entry: `set * associativity + way`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub usize);

impl EntryId {
    /// Returns the raw index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Location of an entry, handed to a policy when it instantiates metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    /// Dense entry id.
    pub id: EntryId,
    /// Set the entry belongs to.
    pub set: usize,
    /// Way within the set.
    pub way: usize,
}

/// A single storage slot: tag and validity bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Entry {
    tag: u64,
    valid: bool,
}

impl Entry {
    /// Tag of the block last installed here. Meaningless when invalid.
    #[inline]
    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Whether the entry currently holds a block.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the entry holds the block with `tag`.
    #[inline]
    fn holds(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }
}

/// All entries of the cache, grouped into sets of `ways` consecutive slots.
#[derive(Clone, Debug)]
pub struct EntryTable {
    entries: Vec<Entry>,
    /// `ids[i] == EntryId(i)`; sliced per set to hand out candidate lists
    /// without allocating.
    ids: Vec<EntryId>,
    ways: usize,
}

impl EntryTable {
    /// Allocates `num_sets * ways` invalid entries.
    ///
    /// # Panics
    ///
    /// Panics if `num_sets * ways` overflows `usize`.
    /// [`CacheConfig::validate`](crate::CacheConfig::validate) rules this out
    /// for every cache built from a configuration.
    pub fn new(num_sets: usize, ways: usize) -> Self {
        let capacity = num_sets * ways;
        Self {
            entries: vec![Entry::default(); capacity],
            ids: (0..capacity).map(EntryId).collect(),
            ways,
        }
    }

    /// Total number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Ways per set.
    #[inline]
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Number of sets.
    #[inline]
    pub fn num_sets(&self) -> usize {
        self.entries.len().checked_div(self.ways).unwrap_or(0)
    }

    /// Returns the entry with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range for this table.
    #[inline]
    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    /// Returns the (set, way) location of `id`.
    #[inline]
    pub fn slot(&self, id: EntryId) -> Slot {
        Slot {
            id,
            set: id.0 / self.ways,
            way: id.0 % self.ways,
        }
    }

    /// Iterates over every slot in id order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.ids.iter().map(|&id| self.slot(id))
    }

    /// Returns the ids of the candidates, in way order.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` was produced for a different geometry.
    #[inline]
    pub fn members(&self, candidates: &Candidates) -> &[EntryId] {
        &self.ids[candidates.range()]
    }

    /// Finds the valid entry among `members` holding `tag`.
    pub fn find(&self, members: &[EntryId], tag: u64) -> Option<EntryId> {
        members
            .iter()
            .copied()
            .find(|&id| self.entries[id.0].holds(tag))
    }

    /// Finds the first invalid entry among `members`, in order.
    pub fn first_free(&self, members: &[EntryId]) -> Option<EntryId> {
        members
            .iter()
            .copied()
            .find(|&id| !self.entries[id.0].valid)
    }

    /// Installs `tag` into `id` and marks it valid.
    #[inline]
    pub fn install(&mut self, id: EntryId, tag: u64) {
        self.entries[id.0] = Entry { tag, valid: true };
    }

    /// Marks `id` invalid, returning the tag it held if it was valid.
    ///
    /// The stale tag stays in the slot but is never matched again.
    pub fn invalidate(&mut self, id: EntryId) -> Option<u64> {
        let entry = &mut self.entries[id.0];
        if entry.valid {
            entry.valid = false;
            Some(entry.tag)
        } else {
            None
        }
    }

    /// Number of valid entries across all sets.
    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }
}
