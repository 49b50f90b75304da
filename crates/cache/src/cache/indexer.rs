//! Address Indexer.
//!
//! Splits a 64-bit address into block offset, set index and tag:
//!
//! ```text
//!  63                tag_shift     set_shift        0
//! +--------------------+--------------+--------------+
//! |        tag         |  set index   | block offset |
//! +--------------------+--------------+--------------+
//! ```
//!
//! The indexer is pure: it holds only the derived shifts and masks. Two
//! addresses map to the same entry exactly when both their set index and
//! their tag match.

use std::ops::Range;

use super::table::EntryId;
use crate::common::error::ConfigError;

/// Address-to-set mapping for one cache geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressIndexer {
    num_sets: usize,
    associativity: usize,
    block_size: usize,
    /// `log2(block_size)`.
    set_shift: u32,
    /// `set_shift + log2(num_sets)`.
    tag_shift: u32,
    /// `num_sets - 1`.
    set_mask: u64,
}

impl AddressIndexer {
    /// Creates an indexer for the given geometry.
    ///
    /// # Arguments
    ///
    /// * `num_sets` - Number of sets; must be a non-zero power of two.
    /// * `associativity` - Ways per set; must be non-zero.
    /// * `block_size` - Block size in bytes; must be a non-zero power of two.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter violates the constraints above.
    pub fn new(
        num_sets: usize,
        associativity: usize,
        block_size: usize,
    ) -> Result<Self, ConfigError> {
        if !num_sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "num_sets",
                value: num_sets,
            });
        }
        if !block_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "block_size_bytes",
                value: block_size,
            });
        }
        if associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }

        let set_shift = block_size.trailing_zeros();
        let set_bits = num_sets.trailing_zeros();
        Ok(Self {
            num_sets,
            associativity,
            block_size,
            set_shift,
            tag_shift: set_shift + set_bits,
            set_mask: (num_sets - 1) as u64,
        })
    }

    /// Number of sets.
    #[inline]
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Ways per set.
    #[inline]
    pub fn associativity(&self) -> usize {
        self.associativity
    }

    /// Block size in bytes.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of address bits used as the set index.
    #[inline]
    pub fn set_index_bits(&self) -> u32 {
        self.tag_shift - self.set_shift
    }

    /// Bit position where the set index starts.
    #[inline]
    pub fn set_shift(&self) -> u32 {
        self.set_shift
    }

    /// Bit position where the tag starts.
    #[inline]
    pub fn tag_shift(&self) -> u32 {
        self.tag_shift
    }

    /// Returns the tag of `addr`.
    ///
    /// A geometry whose offset and index bits cover all 64 address bits has
    /// a single tag value, 0.
    #[inline]
    pub fn extract_tag(&self, addr: u64) -> u64 {
        addr.checked_shr(self.tag_shift).unwrap_or(0)
    }

    /// Returns the set index of `addr`.
    #[inline]
    pub fn extract_set(&self, addr: u64) -> usize {
        ((addr >> self.set_shift) & self.set_mask) as usize
    }

    /// Returns the byte offset of `addr` within its block.
    #[inline]
    pub fn block_offset(&self, addr: u64) -> u64 {
        addr & (self.block_size as u64 - 1)
    }

    /// Rebuilds the block-aligned address held by `(set, tag)`.
    ///
    /// This is the inverse of `extract_set`/`extract_tag` with the block
    /// offset cleared; the timing model uses it to address writebacks of an
    /// evicted tag.
    pub fn block_address(&self, set: usize, tag: u64) -> u64 {
        let set_bits = ((set as u64) & self.set_mask) << self.set_shift;
        tag.checked_shl(self.tag_shift).unwrap_or(0) | set_bits
    }

    /// Returns the entries `addr` may occupy, in way order.
    ///
    /// Way order is the tie-break order used by every replacement policy.
    pub fn candidates_for(&self, addr: u64) -> Candidates {
        self.candidates_in(self.extract_set(addr))
    }

    /// Returns the entries of `set`, in way order.
    pub fn candidates_in(&self, set: usize) -> Candidates {
        Candidates {
            set,
            first: set * self.associativity,
            ways: self.associativity,
        }
    }
}

/// The ordered group of entries belonging to one set.
///
/// Entry ids are dense: way `w` of set `s` is `s * associativity + w`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidates {
    set: usize,
    first: usize,
    ways: usize,
}

impl Candidates {
    /// Set index these candidates belong to.
    #[inline]
    pub fn set(&self) -> usize {
        self.set
    }

    /// Number of candidates (the associativity).
    #[inline]
    pub fn len(&self) -> usize {
        self.ways
    }

    /// Always `false` for a validated geometry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ways == 0
    }

    /// Range of dense entry indices covered by this set.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.first..self.first + self.ways
    }

    /// Iterates over the candidate entry ids in way order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = EntryId> + use<> {
        self.range().map(EntryId)
    }
}
