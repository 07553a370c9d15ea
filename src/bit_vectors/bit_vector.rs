//! Plain bit vector supporting append-only construction.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::Result;

use crate::bit_vectors::prelude::*;
use crate::broadword;
use crate::Serializable;

/// The number of bits in a machine word.
pub const WORD_LEN: usize = std::mem::size_of::<usize>() * 8;

/// Plain bit vector supporting append-only construction.
///
/// This is the format in which layers of the wavelet matrix are assembled,
/// one pushed bit at a time, before being frozen under a rank/select index.
/// All search queries fall back to word-wise linear scans.
///
/// # Examples
///
/// ```
/// use wavedic::bit_vectors::BitVector;
///
/// let mut bv = BitVector::new();
/// bv.push_bit(true);
/// bv.push_bit(false);
///
/// assert_eq!(bv.len(), 2);
/// assert_eq!(bv.get_bit(0), Some(true));
/// assert_eq!(bv.get_bit(1), Some(false));
/// ```
#[derive(Default, Clone, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<usize>,
    len: usize,
}

impl BitVector {
    /// Creates a new empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new vector that at least `capa` bits are reserved.
    ///
    /// # Arguments
    ///
    ///  - `capa`: Number of elements reserved at least.
    pub fn with_capacity(capa: usize) -> Self {
        Self {
            words: Vec::with_capacity(Self::words_for(capa)),
            len: 0,
        }
    }

    /// Creates a new vector from input bit stream `bits`.
    ///
    /// # Arguments
    ///
    ///  - `bits`: Bit stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavedic::bit_vectors::BitVector;
    ///
    /// let bv = BitVector::from_bits([false, true, false]);
    /// assert_eq!(bv.len(), 3);
    /// assert_eq!(bv.get_bit(1), Some(true));
    /// ```
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut this = Self::new();
        this.extend(bits);
        this
    }

    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    ///
    /// # Arguments
    ///
    ///  - `pos`: Bit position.
    pub fn get_bit(&self, pos: usize) -> Option<bool> {
        if pos < self.len {
            let (block, shift) = (pos / WORD_LEN, pos % WORD_LEN);
            Some((self.words[block] >> shift) & 1 == 1)
        } else {
            None
        }
    }

    /// Pushes `bit` at the end.
    ///
    /// # Arguments
    ///
    ///  - `bit`: Bit value pushed.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavedic::bit_vectors::BitVector;
    ///
    /// let mut bv = BitVector::new();
    /// bv.push_bit(true);
    /// bv.push_bit(false);
    /// assert_eq!(bv.len(), 2);
    /// ```
    #[inline(always)]
    pub fn push_bit(&mut self, bit: bool) {
        let pos_in_word = self.len % WORD_LEN;
        if pos_in_word == 0 {
            self.words.push(bit as usize);
        } else {
            let cur_word = self.words.last_mut().unwrap();
            *cur_word |= (bit as usize) << pos_in_word;
        }
        self.len += 1;
    }

    /// Creates an iterator for enumerating bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavedic::bit_vectors::BitVector;
    ///
    /// let bv = BitVector::from_bits([false, true, false]);
    /// let mut it = bv.iter();
    /// assert_eq!(it.next(), Some(false));
    /// assert_eq!(it.next(), Some(true));
    /// assert_eq!(it.next(), Some(false));
    /// assert_eq!(it.next(), None);
    /// ```
    pub const fn iter(&self) -> Iter {
        Iter::new(self)
    }

    /// Returns the number of bits stored.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the slice of raw words.
    pub fn words(&self) -> &[usize] {
        &self.words
    }

    /// Gets the number of words.
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    #[inline(always)]
    const fn words_for(n: usize) -> usize {
        crate::utils::ceiled_divide(n, WORD_LEN)
    }
}

impl Build for BitVector {
    /// Creates a new vector from input bit stream `bits`.
    ///
    /// # Arguments
    ///
    /// - `bits`: Bit stream.
    /// - `with_rank`: Dummy.
    /// - `with_select1`: Dummy.
    /// - `with_select0`: Dummy.
    ///
    /// # Errors
    ///
    /// Never.
    fn build_from_bits<I>(
        bits: I,
        _with_rank: bool,
        _with_select1: bool,
        _with_select0: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
        Self: Sized,
    {
        Ok(Self::from_bits(bits))
    }
}

impl NumBits for BitVector {
    /// Returns the number of bits stored (just wrapping [`Self::len()`]).
    fn num_bits(&self) -> usize {
        self.len()
    }

    /// Returns the number of bits set.
    ///
    /// # Notes on complexity
    ///
    /// It is performed by linear scan in $`O(u)`$ time.
    fn num_ones(&self) -> usize {
        self.rank1(self.len).unwrap()
    }
}

impl Access for BitVector {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use wavedic::bit_vectors::{BitVector, Access};
    ///
    /// let bv = BitVector::from_bits([true, false, false]);
    /// assert_eq!(bv.access(0), Some(true));
    /// assert_eq!(bv.access(1), Some(false));
    /// assert_eq!(bv.access(2), Some(false));
    /// assert_eq!(bv.access(3), None);
    /// ```
    fn access(&self, pos: usize) -> Option<bool> {
        self.get_bit(pos)
    }
}

impl Rank for BitVector {
    /// Returns the number of ones from the 0-th bit to the `pos-1`-th bit, or
    /// [`None`] if `self.len() < pos`.
    ///
    /// # Complexity
    ///
    /// - Linear
    ///
    /// # Examples
    ///
    /// ```
    /// use wavedic::bit_vectors::{BitVector, Rank};
    ///
    /// let bv = BitVector::from_bits([true, false, false, true]);
    /// assert_eq!(bv.rank1(1), Some(1));
    /// assert_eq!(bv.rank1(2), Some(1));
    /// assert_eq!(bv.rank1(3), Some(1));
    /// assert_eq!(bv.rank1(4), Some(2));
    /// assert_eq!(bv.rank1(5), None);
    /// ```
    fn rank1(&self, pos: usize) -> Option<usize> {
        if self.len() < pos {
            return None;
        }
        let mut r = 0;
        let (wpos, left) = (pos / WORD_LEN, pos % WORD_LEN);
        for &w in &self.words[..wpos] {
            r += broadword::popcount(w);
        }
        if left != 0 {
            r += broadword::popcount(self.words[wpos] << (WORD_LEN - left));
        }
        Some(r)
    }

    /// Returns the number of zeros from the 0-th bit to the `pos-1`-th bit, or
    /// [`None`] if `self.len() < pos`.
    ///
    /// # Complexity
    ///
    /// - Linear
    ///
    /// # Examples
    ///
    /// ```
    /// use wavedic::bit_vectors::{BitVector, Rank};
    ///
    /// let bv = BitVector::from_bits([true, false, false, true]);
    /// assert_eq!(bv.rank0(1), Some(0));
    /// assert_eq!(bv.rank0(2), Some(1));
    /// assert_eq!(bv.rank0(3), Some(2));
    /// assert_eq!(bv.rank0(4), Some(2));
    /// assert_eq!(bv.rank0(5), None);
    /// ```
    fn rank0(&self, pos: usize) -> Option<usize> {
        Some(pos - self.rank1(pos)?)
    }
}

impl Select for BitVector {
    /// Searches the position of the `k`-th bit set, or
    /// [`None`] if `k` is no less than the number of ones.
    ///
    /// # Complexity
    ///
    /// - Linear
    ///
    /// # Examples
    ///
    /// ```
    /// use wavedic::bit_vectors::{BitVector, Select};
    ///
    /// let bv = BitVector::from_bits([true, false, false, true]);
    /// assert_eq!(bv.select1(0), Some(0));
    /// assert_eq!(bv.select1(1), Some(3));
    /// assert_eq!(bv.select1(2), None);
    /// ```
    fn select1(&self, k: usize) -> Option<usize> {
        let mut wpos = 0;
        let mut cur_rank = 0;
        while wpos < self.words.len() {
            let cnt = broadword::popcount(self.words[wpos]);
            if k < cur_rank + cnt {
                break;
            }
            wpos += 1;
            cur_rank += cnt;
        }
        if wpos == self.words.len() {
            return None;
        }
        let sel =
            wpos * WORD_LEN + broadword::select_in_word(self.words[wpos], k - cur_rank).unwrap();
        Some(sel)
    }

    /// Searches the position of the `k`-th bit unset, or
    /// [`None`] if `k` is no less than the number of zeros.
    ///
    /// # Complexity
    ///
    /// - Linear
    ///
    /// # Examples
    ///
    /// ```
    /// use wavedic::bit_vectors::{BitVector, Select};
    ///
    /// let bv = BitVector::from_bits([true, false, false, true]);
    /// assert_eq!(bv.select0(0), Some(1));
    /// assert_eq!(bv.select0(1), Some(2));
    /// assert_eq!(bv.select0(2), None);
    /// ```
    fn select0(&self, k: usize) -> Option<usize> {
        let mut wpos = 0;
        let mut cur_rank = 0;
        while wpos < self.words.len() {
            let cnt = broadword::popcount(!self.words[wpos]);
            if k < cur_rank + cnt {
                break;
            }
            wpos += 1;
            cur_rank += cnt;
        }
        if wpos == self.words.len() {
            return None;
        }
        let sel =
            wpos * WORD_LEN + broadword::select_in_word(!self.words[wpos], k - cur_rank).unwrap();
        // Overflowed bits in the last word are zero and would be counted by
        // select0; positions past len() are not part of the vector.
        (sel < self.len()).then_some(sel)
    }
}

/// Iterator for enumerating bits, created by [`BitVector::iter()`].
pub struct Iter<'a> {
    bv: &'a BitVector,
    pos: usize,
}

impl<'a> Iter<'a> {
    /// Creates a new iterator.
    pub const fn new(bv: &'a BitVector) -> Self {
        Self { bv, pos: 0 }
    }
}

impl Iterator for Iter<'_> {
    type Item = bool;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.bv.len() {
            let x = self.bv.access(self.pos).unwrap();
            self.pos += 1;
            Some(x)
        } else {
            None
        }
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.bv.len(), Some(self.bv.len()))
    }
}

impl std::iter::Extend<bool> for BitVector {
    fn extend<I>(&mut self, bits: I)
    where
        I: IntoIterator<Item = bool>,
    {
        bits.into_iter().for_each(|b| self.push_bit(b));
    }
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut bits = vec![0u8; self.len()];
        for (i, b) in bits.iter_mut().enumerate() {
            *b = self.access(i).unwrap() as u8;
        }
        f.debug_struct("BitVector")
            .field("bits", &bits)
            .field("len", &self.len)
            .finish()
    }
}

impl Serializable for BitVector {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.words.serialize_into(&mut writer)?;
        mem += self.len.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let words = Vec::<usize>::deserialize_from(&mut reader)?;
        let len = usize::deserialize_from(&mut reader)?;
        Ok(Self { words, len })
    }

    fn size_in_bytes(&self) -> usize {
        self.words.size_in_bytes() + usize::size_of().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn gen_random_bits(len: usize, seed: u64) -> Vec<bool> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen::<bool>()).collect()
    }

    #[test]
    fn test_empty() {
        let bv = BitVector::new();
        assert_eq!(bv.len(), 0);
        assert!(bv.is_empty());
        assert_eq!(bv.get_bit(0), None);
        assert_eq!(bv.rank1(0), Some(0));
        assert_eq!(bv.rank0(0), Some(0));
        assert_eq!(bv.rank1(1), None);
        assert_eq!(bv.select1(0), None);
        assert_eq!(bv.select0(0), None);
    }

    #[test]
    fn test_push_bits_across_words() {
        let bits = gen_random_bits(200, 7);
        let bv = BitVector::from_bits(bits.iter().cloned());
        assert_eq!(bv.len(), 200);
        assert_eq!(bv.num_words(), 4);
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(bv.get_bit(i), Some(b));
        }
    }

    #[test]
    fn test_rank_select_random() {
        let bits = gen_random_bits(1000, 11);
        let bv = BitVector::from_bits(bits.iter().cloned());
        let mut ones = 0;
        let mut zeros = 0;
        for i in 0..bits.len() {
            assert_eq!(bv.rank1(i), Some(ones));
            assert_eq!(bv.rank0(i), Some(zeros));
            if bits[i] {
                assert_eq!(bv.select1(ones), Some(i));
                ones += 1;
            } else {
                assert_eq!(bv.select0(zeros), Some(i));
                zeros += 1;
            }
        }
        assert_eq!(bv.num_ones(), ones);
        assert_eq!(bv.num_zeros(), zeros);
        assert_eq!(bv.select1(ones), None);
        assert_eq!(bv.select0(zeros), None);
    }

    #[test]
    fn test_select0_ignores_padding() {
        // 65 ones: the second word is padded with 63 zeros.
        let bv = BitVector::from_bits(std::iter::repeat(true).take(65));
        assert_eq!(bv.select0(0), None);
    }

    #[test]
    fn test_serialize() {
        let mut bytes = vec![];
        let bv = BitVector::from_bits(gen_random_bits(300, 42));
        let size = bv.serialize_into(&mut bytes).unwrap();
        let other = BitVector::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(bv, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, bv.size_in_bytes());
    }
}
