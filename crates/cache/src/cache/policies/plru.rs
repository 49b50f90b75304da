//! Tree Pseudo-LRU (PLRU) Replacement Policy.
//!
//! PLRU approximates Least Recently Used with a binary tree of bits per set,
//! `W - 1` bits for `W` ways instead of a full recency order.
//!
//! Nodes are stored in heap order: the root is node 0, the children of node
//! `i` are `2i + 1` (left) and `2i + 2` (right), and way `l` is the leaf at
//! node `W - 1 + l`. A bit set to `true` sends the victim search right.
//!
//! ```text
//!              [0]
//!            /     \
//!         [1]       [2]
//!        /   \     /   \
//!      w0    w1  w2    w3
//! ```
//!
//! On `touch`/`reset` every bit on the path from the leaf to the root is made
//! to point away from that leaf. `invalidate` makes them point toward it. The
//! victim is the leaf reached by following the bits down from the root.
//!
//! The tree belongs to the set, not to any entry: touching one way changes the
//! victim for the whole set. All trees live in one arena allocated at
//! construction and entries refer to theirs by index.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`/`reset()`/`invalidate()`: O(log W)
//!   - `select_victim()`: O(log W) walk plus an O(W) candidate lookup
//! - **Space Complexity:** O(S × W) bits where S is sets, W is ways (much less than LRU)
//! - **Hardware Cost:** Low - simple bit operations
//! - **Worst Case:** Pathological patterns can evict a recently used block

use super::ReplacementPolicy;
use crate::cache::table::{EntryId, Slot};
use crate::common::error::{CacheError, ConfigError};
use crate::config::PolicyKind;

/// Per-entry metadata: which tree, and which leaf of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TreeLeaf {
    tree: usize,
    leaf: usize,
}

/// Tree PLRU policy state.
#[derive(Clone, Debug)]
pub struct TreePlruPolicy {
    ways: usize,
    /// `num_sets` trees of `ways - 1` bits, back to back.
    bits: Vec<bool>,
    /// Leaf binding per entry, filled by `instantiate`.
    leaves: Vec<TreeLeaf>,
}

impl TreePlruPolicy {
    /// Creates a policy with one all-false tree per set.
    ///
    /// # Arguments
    ///
    /// * `num_sets` - The number of sets in the cache.
    /// * `ways` - The associativity; must be a power of two.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PlruAssociativity`] if `ways` is not a power of two.
    ///
    /// # Panics
    ///
    /// Panics if `num_sets * ways` overflows `usize`.
    pub fn new(num_sets: usize, ways: usize) -> Result<Self, ConfigError> {
        if !ways.is_power_of_two() {
            return Err(ConfigError::PlruAssociativity(ways));
        }
        Ok(Self {
            ways,
            bits: vec![false; num_sets * (ways - 1)],
            leaves: Vec::with_capacity(num_sets * ways),
        })
    }

    /// Number of internal nodes per tree.
    #[inline]
    fn nodes(&self) -> usize {
        self.ways - 1
    }

    /// Bits of the tree owned by `set`, in heap order.
    ///
    /// # Panics
    ///
    /// Panics if `set` is not below the `num_sets` given to [`TreePlruPolicy::new`].
    pub fn tree(&self, set: usize) -> &[bool] {
        let nodes = self.nodes();
        &self.bits[set * nodes..(set + 1) * nodes]
    }

    /// Leaf (way) that `entry` occupies in its set's tree.
    ///
    /// # Panics
    ///
    /// Panics if `entry` was never instantiated.
    pub fn leaf_of(&self, entry: EntryId) -> usize {
        self.leaves[entry.0].leaf
    }

    /// Walks from the leaf of `entry` to the root, pointing each parent bit
    /// toward the visited child when `toward` is set and away from it otherwise.
    fn walk_to_root(&mut self, entry: EntryId, toward: bool) {
        let TreeLeaf { tree, leaf } = self.leaves[entry.0];
        let nodes = self.nodes();
        let bits = &mut self.bits[tree * nodes..(tree + 1) * nodes];

        let mut node = nodes + leaf;
        while node != 0 {
            let parent = (node - 1) / 2;
            let is_right = node % 2 == 0;
            bits[parent] = is_right == toward;
            node = parent;
        }
    }

    /// Follows the bits of `tree` from the root down to a leaf.
    fn descend(&self, tree: usize) -> usize {
        let bits = self.tree(tree);
        let mut node = 0;
        while node < bits.len() {
            node = if bits[node] { 2 * node + 2 } else { 2 * node + 1 };
        }
        node - bits.len()
    }
}

impl ReplacementPolicy for TreePlruPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Plru
    }

    fn instantiate(&mut self, slot: Slot) {
        if self.leaves.len() <= slot.id.0 {
            self.leaves.resize(slot.id.0 + 1, TreeLeaf::default());
        }
        self.leaves[slot.id.0] = TreeLeaf {
            tree: slot.set,
            leaf: slot.way,
        };
    }

    /// Same walk as `touch`: a fresh fill is the most recently used way.
    fn reset(&mut self, entry: EntryId) {
        self.walk_to_root(entry, false);
    }

    fn touch(&mut self, entry: EntryId) {
        self.walk_to_root(entry, false);
    }

    fn invalidate(&mut self, entry: EntryId) {
        self.walk_to_root(entry, true);
    }

    /// Descends the tree of the candidates' set and returns the candidate
    /// owning the reached leaf. Candidate values do not influence the walk.
    fn select_victim(&mut self, candidates: &[EntryId]) -> Result<EntryId, CacheError> {
        let first = candidates.first().ok_or(CacheError::EmptyCandidateSet)?;
        let tree = self.leaves[first.0].tree;
        let victim = TreeLeaf {
            tree,
            leaf: self.descend(tree),
        };

        candidates
            .iter()
            .copied()
            .find(|&id| self.leaves[id.0] == victim)
            .ok_or(CacheError::NoVictim {
                candidates: candidates.len(),
            })
    }
}
