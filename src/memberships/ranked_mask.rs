//! Bit mask with a per-block rank directory.
//!
//! Wraps a [`FixedBitSet`] and records, for every storage block, how many bits
//! are set in the blocks before it. That gives `rank` in O(1) and `select` in
//! O(log blocks) while adding only one `u32` per 64 rows, so dense node views
//! never need an explicit index array.

use fixedbitset::FixedBitSet;

use crate::membership_error::{MembershipError, check_index, to_u32};

const BLOCK_BITS: usize = usize::BITS as usize;

/// Immutable bit mask with rank/select and forward/backward set-bit search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedMask {
    bits: FixedBitSet,
    /// `block_ranks[b]` = set bits in blocks `0..b`.
    block_ranks: Box<[u32]>,
    count: usize,
}

impl RankedMask {
    /// Freeze `bits` and build its rank directory.
    ///
    /// # Errors
    /// `InternalOverflow` if the mask is longer than `u32::MAX` bits.
    pub fn new(bits: FixedBitSet) -> Result<Self, MembershipError> {
        to_u32(bits.len(), "bit mask length exceeds u32 index space")?;
        let blocks = bits.as_slice();
        let mut block_ranks = Vec::with_capacity(blocks.len());
        let mut acc = 0u32;
        for &block in blocks {
            block_ranks.push(acc);
            acc += block.count_ones();
        }
        Ok(Self {
            bits,
            block_ranks: block_ranks.into_boxed_slice(),
            count: acc as usize,
        })
    }

    /// Mask of length `len` with exactly the bits in `ones` set.
    ///
    /// # Errors
    /// `IndexOutOfRange` if any index is `>= len`.
    pub fn from_ones<I>(len: usize, ones: I) -> Result<Self, MembershipError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut bits = FixedBitSet::with_capacity(len);
        for i in ones {
            check_index(i, len)?;
            bits.insert(i);
        }
        Self::new(bits)
    }

    /// Number of bits (set or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.len() == 0
    }

    /// Number of set bits.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        self.bits.contains(i)
    }

    #[inline]
    pub fn bits(&self) -> &FixedBitSet {
        &self.bits
    }

    /// Ascending set positions.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }

    /// Number of set bits strictly before `i`.
    pub fn rank(&self, i: usize) -> usize {
        let blocks = self.bits.as_slice();
        let (blk, off) = (i / BLOCK_BITS, i % BLOCK_BITS);
        if blk >= blocks.len() {
            return self.count;
        }
        let below = if off == 0 {
            0
        } else {
            (blocks[blk] & ((1usize << off) - 1)).count_ones() as usize
        };
        self.block_ranks[blk] as usize + below
    }

    /// Position of the `k`-th set bit (0-based), if any.
    pub fn select(&self, k: usize) -> Option<usize> {
        if k >= self.count {
            return None;
        }
        // Last block whose prefix rank is <= k holds the k-th bit.
        let blk = self.block_ranks.partition_point(|&r| r as usize <= k) - 1;
        let mut word = self.bits.as_slice()[blk];
        for _ in 0..(k - self.block_ranks[blk] as usize) {
            word &= word - 1;
        }
        Some(blk * BLOCK_BITS + word.trailing_zeros() as usize)
    }

    /// First set bit at or after `from`.
    pub fn next_one(&self, from: usize) -> Option<usize> {
        if from >= self.len() {
            return None;
        }
        let blocks = self.bits.as_slice();
        let mut blk = from / BLOCK_BITS;
        let mut word = blocks[blk] & (usize::MAX << (from % BLOCK_BITS));
        loop {
            if word != 0 {
                return Some(blk * BLOCK_BITS + word.trailing_zeros() as usize);
            }
            blk += 1;
            word = *blocks.get(blk)?;
        }
    }

    /// Last set bit strictly before `before`.
    pub fn prev_one(&self, before: usize) -> Option<usize> {
        let end = before.min(self.len());
        if end == 0 {
            return None;
        }
        let last = end - 1;
        let blocks = self.bits.as_slice();
        let mut blk = last / BLOCK_BITS;
        let off = last % BLOCK_BITS;
        let keep = if off == BLOCK_BITS - 1 {
            usize::MAX
        } else {
            (1usize << (off + 1)) - 1
        };
        let mut word = blocks[blk] & keep;
        loop {
            if word != 0 {
                return Some(blk * BLOCK_BITS + (BLOCK_BITS - 1 - word.leading_zeros() as usize));
            }
            if blk == 0 {
                return None;
            }
            blk -= 1;
            word = blocks[blk];
        }
    }
}
