//! Internal index structure of [`RsBitVector`](crate::bit_vectors::RsBitVector).
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::Result;

use crate::bit_vectors::bit_vector::WORD_LEN;
use crate::bit_vectors::BitVector;
use crate::utils;
use crate::{broadword, Serializable};

/// The number of words in a large block.
const WORDS_PER_BLOCK: usize = 8;

/// The number of bits in a large block.
const BLOCK_LEN: usize = WORD_LEN * WORDS_PER_BLOCK;

/// The number of ones (resp. zeros) covered by one select hint.
///
/// Must be no less than [`BLOCK_LEN`] so that a single block never crosses
/// two hint thresholds at once.
const SELECT_ONES_PER_HINT: usize = BLOCK_LEN * 2;
const SELECT_ZEROS_PER_HINT: usize = SELECT_ONES_PER_HINT;

/// Two-level rank directory with hinted selection, separated from the bit
/// vector it indexes.
///
/// Every large block of [`BLOCK_LEN`] bits stores its cumulative one-count in
/// a full word, and every word-sized small block stores its one-count
/// relative to the enclosing large block in 16 bits. A rank query reads one
/// entry of each level plus a popcount of the partial word; a select query
/// binary-searches the large level (bounded by the optional hints), scans the
/// at most [`WORDS_PER_BLOCK`] words of one block, and finishes inside a word.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RankSelectIndex {
    len: usize,
    large_ranks: Vec<usize>,
    small_ranks: Vec<u16>,
    ones_hints: Option<Vec<usize>>,
    zeros_hints: Option<Vec<usize>>,
}

impl RankSelectIndex {
    /// Creates a new index from input bit vector `bv`.
    pub fn new(bv: &BitVector) -> Self {
        Self::build_rank(bv)
    }

    /// Builds an index for faster `select1`.
    #[must_use]
    pub fn select1_hints(self) -> Self {
        self.build_select1()
    }

    /// Builds an index for faster `select0`.
    #[must_use]
    pub fn select0_hints(self) -> Self {
        self.build_select0()
    }

    fn build_rank(bv: &BitVector) -> Self {
        let num_blocks = utils::ceiled_divide(bv.num_words(), WORDS_PER_BLOCK);
        let mut large_ranks = Vec::with_capacity(num_blocks + 1);
        let mut small_ranks = Vec::with_capacity(bv.num_words());

        let mut cum_ones = 0;
        let mut rel_ones = 0;
        for (i, &word) in bv.words().iter().enumerate() {
            if i % WORDS_PER_BLOCK == 0 {
                large_ranks.push(cum_ones);
                rel_ones = 0;
            }
            // At most (WORDS_PER_BLOCK - 1) * WORD_LEN, which fits in u16.
            small_ranks.push(rel_ones as u16);
            let cnt = broadword::popcount(word);
            cum_ones += cnt;
            rel_ones += cnt;
        }
        large_ranks.push(cum_ones);
        large_ranks.shrink_to_fit();
        small_ranks.shrink_to_fit();

        Self {
            len: bv.len(),
            large_ranks,
            small_ranks,
            ones_hints: None,
            zeros_hints: None,
        }
    }

    fn build_select1(mut self) -> Self {
        let mut hints = vec![];
        let mut threshold = SELECT_ONES_PER_HINT;
        for b in 0..self.num_blocks() {
            if self.block_rank(b + 1) > threshold {
                hints.push(b);
                threshold += SELECT_ONES_PER_HINT;
            }
        }
        hints.push(self.num_blocks());
        hints.shrink_to_fit();

        self.ones_hints = Some(hints);
        self
    }

    fn build_select0(mut self) -> Self {
        let mut hints = vec![];
        let mut threshold = SELECT_ZEROS_PER_HINT;
        for b in 0..self.num_blocks() {
            if self.block_rank0(b + 1) > threshold {
                hints.push(b);
                threshold += SELECT_ZEROS_PER_HINT;
            }
        }
        hints.push(self.num_blocks());
        hints.shrink_to_fit();

        self.zeros_hints = Some(hints);
        self
    }

    /// Gets the number of bits set.
    #[inline(always)]
    pub fn num_ones(&self) -> usize {
        *self.large_ranks.last().unwrap()
    }

    /// Gets the number of bits unset.
    #[inline(always)]
    pub fn num_zeros(&self) -> usize {
        self.len - self.num_ones()
    }

    #[inline(always)]
    fn num_blocks(&self) -> usize {
        self.large_ranks.len() - 1
    }

    /// Ones before the `block`-th large block.
    #[inline(always)]
    fn block_rank(&self, block: usize) -> usize {
        self.large_ranks[block]
    }

    /// Zeros before the `block`-th large block; the final boundary counts
    /// the zero padding of the last word as well.
    #[inline(always)]
    fn block_rank0(&self, block: usize) -> usize {
        block * BLOCK_LEN - self.large_ranks[block]
    }

    /// Returns the number of ones from the 0-th bit to the `pos-1`-th bit, or
    /// [`None`] if `bv.len() < pos`.
    ///
    /// # Arguments
    ///
    /// - `bv`: Bit vector used in construction.
    /// - `pos`: Bit position.
    ///
    /// # Complexity
    ///
    /// - Constant
    ///
    /// # Safety
    ///
    /// `bv` must be the one used in construction.
    pub unsafe fn rank1(&self, bv: &BitVector, pos: usize) -> Option<usize> {
        if self.len < pos {
            return None;
        }
        if pos == self.len {
            return Some(self.num_ones());
        }
        let (wpos, left) = (pos / WORD_LEN, pos % WORD_LEN);
        let mut r = self.block_rank(wpos / WORDS_PER_BLOCK) + self.small_ranks[wpos] as usize;
        if left != 0 {
            r += broadword::popcount(bv.words()[wpos] << (WORD_LEN - left));
        }
        Some(r)
    }

    /// Returns the number of zeros from the 0-th bit to the `pos-1`-th bit, or
    /// [`None`] if `bv.len() < pos`.
    ///
    /// # Arguments
    ///
    /// - `bv`: Bit vector used in construction.
    /// - `pos`: Bit position.
    ///
    /// # Complexity
    ///
    /// - Constant
    ///
    /// # Safety
    ///
    /// `bv` must be the one used in construction.
    pub unsafe fn rank0(&self, bv: &BitVector, pos: usize) -> Option<usize> {
        Some(pos - self.rank1(bv, pos)?)
    }

    /// Searches the position of the `k`-th bit set, or
    /// [`None`] if `self.num_ones() <= k`.
    ///
    /// # Arguments
    ///
    /// - `bv`: Bit vector used in construction.
    /// - `k`: Select query.
    ///
    /// # Complexity
    ///
    /// - Logarithmic over the large blocks, constant with hints.
    ///
    /// # Safety
    ///
    /// `bv` must be the one used in construction.
    pub unsafe fn select1(&self, bv: &BitVector, k: usize) -> Option<usize> {
        if self.num_ones() <= k {
            return None;
        }

        let block = {
            let (mut a, mut b) = (0, self.num_blocks());
            if let Some(hints) = self.ones_hints.as_ref() {
                let chunk = k / SELECT_ONES_PER_HINT;
                if chunk != 0 {
                    a = hints[chunk - 1];
                }
                b = hints[chunk] + 1;
            }
            while b - a > 1 {
                let mid = a + (b - a) / 2;
                if self.block_rank(mid) <= k {
                    a = mid;
                } else {
                    b = mid;
                }
            }
            a
        };
        debug_assert!(block < self.num_blocks());

        let mut wpos = block * WORDS_PER_BLOCK;
        let mut cur_rank = self.block_rank(block);
        debug_assert!(cur_rank <= k);
        loop {
            let cnt = broadword::popcount(bv.words()[wpos]);
            if k < cur_rank + cnt {
                break;
            }
            cur_rank += cnt;
            wpos += 1;
        }
        let sel = wpos * WORD_LEN + broadword::select_in_word(bv.words()[wpos], k - cur_rank)?;
        Some(sel)
    }

    /// Searches the position of the `k`-th bit unset, or
    /// [`None`] if `self.num_zeros() <= k`.
    ///
    /// # Arguments
    ///
    /// - `bv`: Bit vector used in construction.
    /// - `k`: Select query.
    ///
    /// # Complexity
    ///
    /// - Logarithmic over the large blocks, constant with hints.
    ///
    /// # Safety
    ///
    /// `bv` must be the one used in construction.
    pub unsafe fn select0(&self, bv: &BitVector, k: usize) -> Option<usize> {
        if self.num_zeros() <= k {
            return None;
        }

        let block = {
            let (mut a, mut b) = (0, self.num_blocks());
            if let Some(hints) = self.zeros_hints.as_ref() {
                let chunk = k / SELECT_ZEROS_PER_HINT;
                if chunk != 0 {
                    a = hints[chunk - 1];
                }
                b = hints[chunk] + 1;
            }
            while b - a > 1 {
                let mid = a + (b - a) / 2;
                if self.block_rank0(mid) <= k {
                    a = mid;
                } else {
                    b = mid;
                }
            }
            a
        };
        debug_assert!(block < self.num_blocks());

        let mut wpos = block * WORDS_PER_BLOCK;
        let mut cur_rank = self.block_rank0(block);
        debug_assert!(cur_rank <= k);
        loop {
            let cnt = broadword::popcount(!bv.words()[wpos]);
            if k < cur_rank + cnt {
                break;
            }
            cur_rank += cnt;
            wpos += 1;
        }
        // k < num_zeros, so the hit never falls into the zero padding of the
        // last word.
        let sel = wpos * WORD_LEN + broadword::select_in_word(!bv.words()[wpos], k - cur_rank)?;
        Some(sel)
    }
}

impl Serializable for RankSelectIndex {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = 0;
        mem += self.len.serialize_into(&mut writer)?;
        mem += self.large_ranks.serialize_into(&mut writer)?;
        mem += self.small_ranks.serialize_into(&mut writer)?;
        mem += self.ones_hints.serialize_into(&mut writer)?;
        mem += self.zeros_hints.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let len = usize::deserialize_from(&mut reader)?;
        let large_ranks = Vec::<usize>::deserialize_from(&mut reader)?;
        let small_ranks = Vec::<u16>::deserialize_from(&mut reader)?;
        let ones_hints = Option::<Vec<usize>>::deserialize_from(&mut reader)?;
        let zeros_hints = Option::<Vec<usize>>::deserialize_from(&mut reader)?;
        Ok(Self {
            len,
            large_ranks,
            small_ranks,
            ones_hints,
            zeros_hints,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.len.size_in_bytes()
            + self.large_ranks.size_in_bytes()
            + self.small_ranks.size_in_bytes()
            + self.ones_hints.size_in_bytes()
            + self.zeros_hints.size_in_bytes()
    }
}
