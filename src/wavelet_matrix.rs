//! Time- and space-efficient data structure for an immutable sequence of
//! integers, supporting ranking, selection, quantiles, and intersection.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};
use std::ops::Range;

use anyhow::{anyhow, Result};

use num_traits::ToPrimitive;

use crate::bit_vectors::{Access, BitVector, Build, NumBits, Rank, Select};
use crate::utils;
use crate::Serializable;

/// Time- and space-efficient data structure for an immutable sequence of
/// integers, supporting ranking, selection, quantiles, and intersection.
///
/// [`WaveletMatrix`] stores a sequence of $`n`$ integers from $`[0, \sigma)`$
/// as $`\lceil \lg \sigma \rceil`$ bit-vector layers, one per bit position
/// from the most significant down. Each query walks the layers once, so most
/// operations run in $`O(\lg \sigma)`$ time using $`O(n \lg \sigma)`$ bits
/// (assuming constant-time rank and select on the layer type `B`).
///
/// The sequence is frozen at construction: build it by pushing values into a
/// [`WaveletMatrixBuilder`], or with [`WaveletMatrix::from_ints`]. Queries
/// take `&self` only, so a built matrix can be shared freely across threads.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use wavedic::bit_vectors::RsBitVector;
/// use wavedic::WaveletMatrixBuilder;
///
/// let mut wmb = WaveletMatrixBuilder::new();
/// let text = "tobeornottobethatisthequestion";
/// text.chars().for_each(|c| wmb.push(c as usize));
///
/// let wm = wmb.build::<RsBitVector>()?;
///
/// assert_eq!(wm.len(), text.len());
/// assert_eq!(wm.alph_size(), 'u' as usize + 1);
/// assert_eq!(wm.alph_width(), 7);
///
/// assert_eq!(wm.access(20), Some('h' as usize));
/// assert_eq!(wm.rank(22, 'o' as usize), Some(4));
/// assert_eq!(wm.select(2, 't' as usize), Some(9));
/// # Ok(())
/// # }
/// ```
///
/// # Credits
///
/// This is a yet another Rust port of [hillbig's waveletMatrix](https://github.com/hillbig/waveletTree/blob/master/waveletMatrix.go).
///
/// # References
///
/// - F. Claude, and G. Navarro, "The Wavelet Matrix," In SPIRE 2012.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct WaveletMatrix<B> {
    layers: Vec<B>,
    alph_size: usize,
    len: usize,
}

impl<B> WaveletMatrix<B>
where
    B: Access + Build + NumBits + Rank + Select,
{
    /// Creates a new instance from a slice of integers.
    ///
    /// # Arguments
    ///
    /// - `vals`: Slice of integers castable into `usize`.
    ///
    /// # Errors
    ///
    /// An error is returned if some value is not castable into `usize` or
    /// `B::build_from_bits` fails.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1])?;
    /// assert_eq!(wm.len(), 4);
    /// assert_eq!(wm.alph_size(), 6);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_ints<T>(vals: &[T]) -> Result<Self>
    where
        T: ToPrimitive,
    {
        let mut wmb = WaveletMatrixBuilder::with_capacity(vals.len());
        for x in vals {
            wmb.push(x.to_usize().ok_or_else(|| {
                anyhow!("vals must consist only of values castable into usize.")
            })?);
        }
        wmb.build()
    }

    /// Returns the `pos`-th integer, or [`None`] if `self.len() <= pos`.
    ///
    /// # Arguments
    ///
    /// - `pos`: Position to access.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1])?;
    ///
    /// assert_eq!(wm.access(0), Some(5));
    /// assert_eq!(wm.access(3), Some(1));
    /// assert_eq!(wm.access(4), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn access(&self, mut pos: usize) -> Option<usize> {
        if self.len <= pos {
            return None;
        }
        let mut val = 0;
        for layer in &self.layers {
            val <<= 1;
            if layer.access(pos).unwrap() {
                val |= 1;
                pos = layer.rank1(pos).unwrap() + layer.num_zeros();
            } else {
                pos = layer.rank0(pos).unwrap();
            }
        }
        Some(val)
    }

    /// Returns the number of occurrences of `val` in the range `0..pos`,
    /// or [`None`] if `self.len() < pos` or `self.alph_size() <= val`
    /// (with a non-empty prefix).
    ///
    /// # Arguments
    ///
    /// - `pos`: Position to be searched.
    /// - `val`: Integer to be searched.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1])?;
    ///
    /// assert_eq!(wm.rank(3, 5), Some(2));
    /// assert_eq!(wm.rank(3, 1), Some(0));
    /// assert_eq!(wm.rank(5, 2), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn rank(&self, pos: usize, val: usize) -> Option<usize> {
        self.rank_range(0..pos, val)
    }

    /// Returns the number of occurrences of `val` in the given `range`,
    /// or [`None`] if `range` is reversed or out of bounds, or if
    /// `self.alph_size() <= val` (with a non-empty `range`).
    ///
    /// # Arguments
    ///
    /// - `range`: Position range to be searched.
    /// - `val`: Integer to be searched.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1])?;
    ///
    /// assert_eq!(wm.rank_range(1..4, 5), Some(1));
    /// assert_eq!(wm.rank_range(1..4, 0), Some(0));
    /// assert_eq!(wm.rank_range(1..5, 5), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn rank_range(&self, range: Range<usize>, val: usize) -> Option<usize> {
        if range.start > range.end || self.len < range.end {
            return None;
        }
        if range.is_empty() {
            return Some(0);
        }
        if self.alph_size <= val {
            return None;
        }
        Some(self.map_range(range, val).len())
    }

    /// Returns `self.access(pos)` together with the rank of that value at
    /// `pos`, i.e., `(self.access(pos)?, self.rank(pos, self.access(pos)?)?)`
    /// computed in a single descent, or [`None`] if `self.len() <= pos`.
    ///
    /// # Arguments
    ///
    /// - `pos`: Position to access.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1])?;
    ///
    /// assert_eq!(wm.access_and_rank(2), Some((5, 1)));
    /// assert_eq!(wm.access_and_rank(3), Some((1, 0)));
    /// assert_eq!(wm.access_and_rank(4), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn access_and_rank(&self, pos: usize) -> Option<(usize, usize)> {
        if self.len <= pos {
            return None;
        }
        let mut val = 0;
        let (mut start_pos, mut end_pos) = (0, pos);
        for layer in &self.layers {
            val <<= 1;
            if layer.access(end_pos).unwrap() {
                val |= 1;
                start_pos = layer.rank1(start_pos).unwrap() + layer.num_zeros();
                end_pos = layer.rank1(end_pos).unwrap() + layer.num_zeros();
            } else {
                start_pos = layer.rank0(start_pos).unwrap();
                end_pos = layer.rank0(end_pos).unwrap();
            }
        }
        Some((val, end_pos - start_pos))
    }

    /// Returns the occurrence position of the `k`-th `val`, or [`None`] if
    /// there is no such occurrence or `self.alph_size() <= val`.
    ///
    /// # Arguments
    ///
    /// - `k`: Rank to be searched.
    /// - `val`: Integer to be searched.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$, assuming logarithmic-time select on `B`.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1])?;
    ///
    /// assert_eq!(wm.select(0, 5), Some(0));
    /// assert_eq!(wm.select(1, 5), Some(2));
    /// assert_eq!(wm.select(2, 5), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn select(&self, k: usize, val: usize) -> Option<usize> {
        if self.alph_size <= val {
            return None;
        }
        if self.alph_width() == 0 {
            // A single-symbol alphabet has no layers; the k-th zero is at k.
            return (k < self.len).then_some(k);
        }
        self.select_helper(k, val, 0, 0)
    }

    #[inline]
    fn select_helper(&self, mut k: usize, val: usize, mut pos: usize, depth: usize) -> Option<usize> {
        if depth == self.alph_width() {
            return Some(pos + k);
        }
        let layer = &self.layers[depth];
        if Self::get_msb(val, depth, self.alph_width()) {
            let zeros = layer.num_zeros();
            pos = layer.rank1(pos).unwrap() + zeros;
            k = self.select_helper(k, val, pos, depth + 1)?;
            layer.select1(k.checked_sub(zeros)?)
        } else {
            pos = layer.rank0(pos).unwrap();
            k = self.select_helper(k, val, pos, depth + 1)?;
            layer.select0(k)
        }
    }

    /// Returns the `k`-th smallest value in the given `range`, or [`None`]
    /// if `range` is reversed or out of bounds, or `range.len() <= k`.
    ///
    /// # Arguments
    ///
    /// - `range`: Position range to be searched.
    /// - `k`: Order of the value to be searched.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1])?;
    ///
    /// assert_eq!(wm.quantile(0..4, 0), Some(1)); // min
    /// assert_eq!(wm.quantile(0..4, 2), Some(5));
    /// assert_eq!(wm.quantile(0..4, 4), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn quantile(&self, range: Range<usize>, mut k: usize) -> Option<usize> {
        if range.start > range.end || self.len < range.end {
            return None;
        }
        if range.len() <= k {
            return None;
        }

        let mut val = 0;
        let (mut start_pos, mut end_pos) = (range.start, range.end);

        for layer in &self.layers {
            val <<= 1;
            let zero_start_pos = layer.rank0(start_pos).unwrap();
            let zero_end_pos = layer.rank0(end_pos).unwrap();
            let zeros = zero_end_pos - zero_start_pos;
            if k < zeros {
                start_pos = zero_start_pos;
                end_pos = zero_end_pos;
            } else {
                k -= zeros;
                val |= 1;
                start_pos = layer.num_zeros() + start_pos - zero_start_pos;
                end_pos = layer.num_zeros() + end_pos - zero_end_pos;
            }
        }
        Some(val)
    }

    /// Returns the number of positions in `range` whose value lies in the
    /// value interval `vals`, or [`None`] if either range is reversed or
    /// `range` is out of bounds.
    ///
    /// Values at or above `self.alph_size()` never occur, so `vals` may
    /// extend past the alphabet.
    ///
    /// # Arguments
    ///
    /// - `range`: Position range to be searched.
    /// - `vals`: Value interval to be counted.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1, 5, 2, 3, 0, 1, 4])?;
    ///
    /// assert_eq!(wm.count_values(0..10, 2..6), Some(7));
    /// assert_eq!(wm.count_values(4..9, 0..2), Some(2));
    /// assert_eq!(wm.count_values(4..4, 0..2), Some(0));
    /// assert_eq!(wm.count_values(0..11, 0..2), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn count_values(&self, range: Range<usize>, vals: Range<usize>) -> Option<usize> {
        if range.start > range.end || self.len < range.end || vals.start > vals.end {
            return None;
        }
        if range.is_empty() || vals.is_empty() {
            return Some(0);
        }
        Some(self.rank_less_than(range.clone(), vals.end) - self.rank_less_than(range, vals.start))
    }

    /// Counts the positions in `range` with a value less than `val`,
    /// assuming `range` is in bounds.
    fn rank_less_than(&self, mut range: Range<usize>, val: usize) -> usize {
        if self.alph_size <= val {
            return range.len();
        }
        let mut count = 0;
        for (depth, layer) in self.layers.iter().enumerate() {
            let zero_start_pos = layer.rank0(range.start).unwrap();
            let zero_end_pos = layer.rank0(range.end).unwrap();
            if Self::get_msb(val, depth, self.alph_width()) {
                // Everything on the zero side of this layer is smaller.
                count += zero_end_pos - zero_start_pos;
                range = (layer.num_zeros() + range.start - zero_start_pos)
                    ..(layer.num_zeros() + range.end - zero_end_pos);
            } else {
                range = zero_start_pos..zero_end_pos;
            }
        }
        count
    }

    /// Returns all values occurring in at least `k` of the given `ranges`
    /// in ascending order, or [`None`] if some range is reversed or out of
    /// bounds.
    ///
    /// Membership per range is boolean: a value counts once per range no
    /// matter how often it occurs there. Empty input ranges are ignored.
    /// Note that `Some(vec![])`, not [`None`], is returned if no value
    /// qualifies.
    ///
    /// # Arguments
    ///
    /// - `ranges`: Position ranges to be searched.
    /// - `k`: Occurrence threshold.
    ///
    /// # Complexity
    ///
    /// $`O( \min(\sigma, j_1 - i_1, \dots, j_r - i_r ) )`$ for `ranges` being $`[(i_1,j_1),\dots,(i_r,j_r)]`$.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 5, 1, 5, 2, 3, 0, 1, 4])?;
    ///
    /// assert_eq!(wm.intersect(&[0..4, 4..8, 6..10], 2), Some(vec![0, 1, 2, 3, 5]));
    /// assert_eq!(wm.intersect(&[0..4, 4..8, 6..10], 3), Some(vec![]));
    /// assert_eq!(wm.intersect(&[0..4, 6..11], 1), None);
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn intersect(&self, ranges: &[Range<usize>], k: usize) -> Option<Vec<usize>> {
        if ranges
            .iter()
            .any(|r| r.start > r.end || self.len < r.end)
        {
            return None;
        }
        let ranges: Vec<_> = ranges.iter().filter(|r| !r.is_empty()).cloned().collect();
        if ranges.len() < k {
            return Some(vec![]);
        }
        if self.alph_width() == 0 {
            // A single-symbol alphabet: zero occurs in every non-empty range.
            return Some(if self.len == 0 { vec![] } else { vec![0] });
        }
        Some(self.intersect_helper(&ranges, k, 0, 0))
    }

    fn intersect_helper(
        &self,
        ranges: &[Range<usize>],
        k: usize,
        depth: usize,
        prefix: usize,
    ) -> Vec<usize> {
        if depth == self.alph_width() {
            return vec![prefix];
        }

        let layer = &self.layers[depth];
        let mut zero_ranges = vec![];
        let mut one_ranges = vec![];
        for range in ranges {
            let zero_start_pos = layer.rank0(range.start).unwrap();
            let zero_end_pos = layer.rank0(range.end).unwrap();
            let one_start_pos = layer.num_zeros() + range.start - zero_start_pos;
            let one_end_pos = layer.num_zeros() + range.end - zero_end_pos;

            if zero_start_pos < zero_end_pos {
                zero_ranges.push(zero_start_pos..zero_end_pos);
            }
            if one_start_pos < one_end_pos {
                one_ranges.push(one_start_pos..one_end_pos);
            }
        }

        // Zero children first keeps the emitted values ascending.
        let mut ret = vec![];
        if zero_ranges.len() >= k {
            ret.extend(self.intersect_helper(&zero_ranges, k, depth + 1, prefix << 1));
        }
        // With alph_size not a power of two, the one subtree can lie
        // entirely past the alphabet; no value of the sequence lives there.
        let one_prefix = (prefix << 1) | 1;
        if one_ranges.len() >= k
            && one_prefix << (self.alph_width() - depth - 1) < self.alph_size
        {
            ret.extend(self.intersect_helper(&one_ranges, k, depth + 1, one_prefix));
        }
        ret
    }

    /// Maps `range` through the layers along the path of `val`, returning
    /// the image in the coordinates of the deepest level. The length of the
    /// image is the number of occurrences of `val` in `range`.
    fn map_range(&self, range: Range<usize>, val: usize) -> Range<usize> {
        debug_assert!(range.end <= self.len && val < self.alph_size);
        let (mut start_pos, mut end_pos) = (range.start, range.end);
        for (depth, layer) in self.layers.iter().enumerate() {
            if Self::get_msb(val, depth, self.alph_width()) {
                start_pos = layer.rank1(start_pos).unwrap() + layer.num_zeros();
                end_pos = layer.rank1(end_pos).unwrap() + layer.num_zeros();
            } else {
                start_pos = layer.rank0(start_pos).unwrap();
                end_pos = layer.rank0(end_pos).unwrap();
            }
        }
        start_pos..end_pos
    }

    #[inline(always)]
    const fn get_msb(val: usize, pos: usize, width: usize) -> bool {
        ((val >> (width - pos - 1)) & 1) == 1
    }

    /// Creates an iterator for enumerating the stored integers.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use wavedic::bit_vectors::RsBitVector;
    /// use wavedic::WaveletMatrix;
    ///
    /// let wm = WaveletMatrix::<RsBitVector>::from_ints(&[5u32, 2, 1])?;
    ///
    /// let mut it = wm.iter();
    /// assert_eq!(it.next(), Some(5));
    /// assert_eq!(it.next(), Some(2));
    /// assert_eq!(it.next(), Some(1));
    /// assert_eq!(it.next(), None);
    /// # Ok(())
    /// # }
    /// ```
    pub const fn iter(&self) -> Iter<B> {
        Iter::new(self)
    }

    /// Returns the number of values stored.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the sequence is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum value + 1 in the sequence, i.e., $`\sigma`$.
    #[inline(always)]
    pub const fn alph_size(&self) -> usize {
        self.alph_size
    }

    /// Returns $`\lceil \lg \sigma \rceil`$, which is the number of layers
    /// in the matrix (zero when $`\sigma \leq 1`$).
    #[inline(always)]
    pub fn alph_width(&self) -> usize {
        self.layers.len()
    }
}

/// Iterator for enumerating integers, created by [`WaveletMatrix::iter()`].
pub struct Iter<'a, B> {
    wm: &'a WaveletMatrix<B>,
    pos: usize,
}

impl<'a, B> Iter<'a, B> {
    /// Creates a new iterator.
    pub const fn new(wm: &'a WaveletMatrix<B>) -> Self {
        Self { wm, pos: 0 }
    }
}

impl<B> Iterator for Iter<'_, B>
where
    B: Access + Build + NumBits + Rank + Select,
{
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.wm.len() {
            let x = self.wm.access(self.pos).unwrap();
            self.pos += 1;
            Some(x)
        } else {
            None
        }
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.wm.len(), Some(self.wm.len()))
    }
}

impl<B> Serializable for WaveletMatrix<B>
where
    B: Serializable + NumBits,
{
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.layers.serialize_into(&mut writer)?;
        mem += self.alph_size.serialize_into(&mut writer)?;
        mem += self.len.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let layers = Vec::<B>::deserialize_from(&mut reader)?;
        let alph_size = usize::deserialize_from(&mut reader)?;
        let len = usize::deserialize_from(&mut reader)?;

        let width = if alph_size <= 1 {
            0
        } else {
            utils::needed_bits(alph_size - 1)
        };
        if layers.len() != width {
            return Err(anyhow!(
                "the number of layers must be {width} for alph_size={alph_size}, but got {}.",
                layers.len()
            ));
        }
        if alph_size == 0 && len != 0 {
            return Err(anyhow!("len must be 0 for alph_size=0, but got {len}."));
        }
        if layers.iter().any(|l| l.num_bits() != len) {
            return Err(anyhow!("every layer must store exactly len={len} bits."));
        }
        Ok(Self {
            layers,
            alph_size,
            len,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.layers.size_in_bytes() + self.alph_size.size_in_bytes() + self.len.size_in_bytes()
    }
}

/// Builder collecting the integers a [`WaveletMatrix`] is made from.
///
/// Values are buffered in push order; [`WaveletMatrixBuilder::build`]
/// consumes the builder, so the sequence can no longer change once the
/// matrix exists.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use wavedic::bit_vectors::RsBitVector;
/// use wavedic::WaveletMatrixBuilder;
///
/// let mut wmb = WaveletMatrixBuilder::new();
/// wmb.push(2);
/// wmb.push(7);
/// wmb.push(2);
///
/// let wm = wmb.build::<RsBitVector>()?;
/// assert_eq!(wm.len(), 3);
/// assert_eq!(wm.rank(3, 2), Some(2));
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone)]
pub struct WaveletMatrixBuilder {
    vals: Vec<usize>,
}

impl WaveletMatrixBuilder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder with at least `capa` slots reserved.
    ///
    /// # Arguments
    ///
    /// - `capa`: Number of elements reserved at least.
    pub fn with_capacity(capa: usize) -> Self {
        Self {
            vals: Vec::with_capacity(capa),
        }
    }

    /// Pushes integer `val` at the end.
    ///
    /// # Arguments
    ///
    /// - `val`: Integer to be pushed.
    #[inline(always)]
    pub fn push(&mut self, val: usize) {
        self.vals.push(val);
    }

    /// Appends integers at the end.
    ///
    /// # Arguments
    ///
    /// - `vals`: Integers to be pushed.
    ///
    /// # Errors
    ///
    /// An error is returned if `vals` contain an integer not castable into
    /// `usize`.
    pub fn extend<T, I>(&mut self, vals: I) -> Result<()>
    where
        T: ToPrimitive,
        I: IntoIterator<Item = T>,
    {
        for x in vals {
            self.vals.push(x.to_usize().ok_or_else(|| {
                anyhow!("vals must consist only of values castable into usize.")
            })?);
        }
        Ok(())
    }

    /// Returns the number of values pushed so far.
    pub fn len(&self) -> usize {
        self.vals.len()
    }

    /// Checks if no value has been pushed.
    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// Builds a [`WaveletMatrix`] from the pushed integers, consuming the
    /// builder.
    ///
    /// Layers are produced from the most significant bit down: at each
    /// level, values are stably partitioned into the zero and one groups of
    /// that bit, and the partition of one level is the input order of the
    /// next. An empty builder yields an empty matrix with
    /// `alph_size() == 0` and no layers.
    ///
    /// # Errors
    ///
    /// An error is returned if the maximum value is `usize::MAX` or
    /// `B::build_from_bits` fails.
    pub fn build<B>(self) -> Result<WaveletMatrix<B>>
    where
        B: Access + Build + NumBits + Rank + Select,
    {
        let len = self.vals.len();
        let alph_size = match self.vals.iter().max() {
            Some(&x) => x
                .checked_add(1)
                .ok_or_else(|| anyhow!("values must be less than usize::MAX."))?,
            None => 0,
        };
        let alph_width = if alph_size <= 1 {
            0
        } else {
            utils::needed_bits(alph_size - 1)
        };

        let mut zeros = self.vals;
        let mut ones = vec![];
        let mut layers = Vec::with_capacity(alph_width);

        for depth in 0..alph_width {
            let shift = alph_width - depth - 1;
            let mut next_zeros = Vec::with_capacity(len);
            let mut next_ones = Vec::with_capacity(len);
            let mut bits = BitVector::with_capacity(len);
            Self::filter(&zeros, shift, &mut next_zeros, &mut next_ones, &mut bits);
            Self::filter(&ones, shift, &mut next_zeros, &mut next_ones, &mut bits);
            zeros = next_zeros;
            ones = next_ones;
            layers.push(B::build_from_bits(bits.iter(), true, true, true)?);
        }

        Ok(WaveletMatrix {
            layers,
            alph_size,
            len,
        })
    }

    fn filter(
        vals: &[usize],
        shift: usize,
        next_zeros: &mut Vec<usize>,
        next_ones: &mut Vec<usize>,
        bits: &mut BitVector,
    ) {
        for &val in vals {
            let bit = (val >> shift) & 1 == 1;
            bits.push_bit(bit);
            if bit {
                next_ones.push(val);
            } else {
                next_zeros.push(val);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{BTreeMap, BTreeSet};

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    use crate::bit_vectors::RsBitVector;

    fn build_wm(vals: &[usize]) -> WaveletMatrix<RsBitVector> {
        WaveletMatrix::from_ints(vals).unwrap()
    }

    fn gen_random_ints(len: usize, dim: usize, seed: u64) -> Vec<usize> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(0..dim)).collect()
    }

    fn gen_random_range(len: usize, rng: &mut ChaChaRng) -> std::ops::Range<usize> {
        let start = rng.gen_range(0..len);
        let end = rng.gen_range(start..=len);
        start..end
    }

    fn rank_oracle(vals: &[usize], pos: usize, val: usize) -> usize {
        vals[..pos].iter().filter(|&&x| x == val).count()
    }

    fn intersect_oracle(vals: &[usize], ranges: &[std::ops::Range<usize>], k: usize) -> Vec<usize> {
        let mut counts = BTreeMap::new();
        for range in ranges {
            let mut seen = BTreeSet::new();
            for i in range.clone() {
                seen.insert(vals[i]);
            }
            for v in seen {
                *counts.entry(v).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .filter_map(|(v, c)| (c >= k).then_some(v))
            .collect()
    }

    fn verify_against_oracle(wm: &WaveletMatrix<RsBitVector>, vals: &[usize], seed: u64) {
        let dim = wm.alph_size();
        let mut rng = ChaChaRng::seed_from_u64(seed);
        for _ in 0..10 {
            let ind = rng.gen_range(0..vals.len());
            let x = rng.gen_range(0..dim);

            assert_eq!(wm.access(ind), Some(vals[ind]));
            assert_eq!(wm.rank(ind, x), Some(rank_oracle(vals, ind, x)));

            let (c, rank) = wm.access_and_rank(ind).unwrap();
            assert_eq!(c, vals[ind]);
            assert_eq!(rank, rank_oracle(vals, ind, c));
            assert_eq!(wm.select(rank, c), Some(ind));

            let range = gen_random_range(vals.len(), &mut rng);
            if !range.is_empty() {
                let k = rng.gen_range(0..range.len());
                let mut sorted = vals[range.clone()].to_vec();
                sorted.sort_unstable();
                assert_eq!(wm.quantile(range.clone(), k), Some(sorted[k]));
            }

            let vs = {
                let (a, b) = (rng.gen_range(0..dim), rng.gen_range(0..=dim));
                a.min(b)..a.max(b)
            };
            let expected = vals[range.clone()]
                .iter()
                .filter(|&&v| vs.contains(&v))
                .count();
            assert_eq!(wm.count_values(range, vs), Some(expected));

            let ranges: Vec<_> = (0..4)
                .map(|_| gen_random_range(vals.len(), &mut rng))
                .collect();
            assert_eq!(
                wm.intersect(&ranges, 4),
                Some(intersect_oracle(vals, &ranges, 4))
            );
        }
    }

    #[test]
    fn test_empty() {
        let wm = WaveletMatrixBuilder::new()
            .build::<RsBitVector>()
            .unwrap();
        assert_eq!(wm.len(), 0);
        assert!(wm.is_empty());
        assert_eq!(wm.alph_size(), 0);
        assert_eq!(wm.alph_width(), 0);

        assert_eq!(wm.rank(0, 0), Some(0));
        assert_eq!(wm.rank(1, 0), None);
        assert_eq!(wm.access(0), None);
        assert_eq!(wm.select(0, 0), None);
        assert_eq!(wm.quantile(0..0, 0), None);
        assert_eq!(wm.intersect(&[], 1), Some(vec![]));
        assert_eq!(wm.iter().next(), None);
    }

    #[test]
    fn test_constant_values() {
        let wm = build_wm(&[3, 3, 3, 3, 3]);
        assert_eq!(wm.alph_size(), 4);
        assert_eq!(wm.alph_width(), 2);

        assert_eq!(wm.access(2), Some(3));
        assert_eq!(wm.rank(5, 3), Some(5));
        assert_eq!(wm.rank(3, 0), Some(0));
        assert_eq!(wm.select(0, 3), Some(0));
        assert_eq!(wm.select(4, 3), Some(4));
        assert_eq!(wm.select(5, 3), None);
        assert_eq!(wm.select(0, 0), None);
        assert_eq!(wm.quantile(0..5, 0), Some(3));
        assert_eq!(wm.quantile(0..5, 4), Some(3));
    }

    #[test]
    fn test_single_symbol_alphabet() {
        // All zeros: alph_size is 1 and the matrix has no layers.
        let wm = build_wm(&[0, 0, 0, 0]);
        assert_eq!(wm.alph_size(), 1);
        assert_eq!(wm.alph_width(), 0);

        assert_eq!(wm.access(3), Some(0));
        assert_eq!(wm.access(4), None);
        assert_eq!(wm.rank(4, 0), Some(4));
        assert_eq!(wm.access_and_rank(2), Some((0, 2)));
        assert_eq!(wm.select(3, 0), Some(3));
        assert_eq!(wm.select(4, 0), None);
        assert_eq!(wm.quantile(1..4, 2), Some(0));
        assert_eq!(wm.count_values(0..4, 0..1), Some(4));
        assert_eq!(wm.intersect(&[0..2, 2..4], 2), Some(vec![0]));
    }

    #[test]
    fn test_alternating() {
        let wm = build_wm(&[0, 1, 0, 1, 0]);
        assert_eq!(wm.alph_size(), 2);
        assert_eq!(wm.alph_width(), 1);

        assert_eq!(wm.rank(5, 0), Some(3));
        assert_eq!(wm.rank(5, 1), Some(2));
        assert_eq!(wm.select(2, 0), Some(4));
        assert_eq!(wm.quantile(0..5, 0), Some(0));
        assert_eq!(wm.quantile(0..5, 2), Some(0));
        assert_eq!(wm.quantile(0..5, 3), Some(1));
        assert_eq!(wm.access_and_rank(3), Some((1, 1)));
    }

    #[test]
    fn test_small_mixed() {
        let vals = [5, 2, 5, 1, 5, 2, 3, 0, 1, 4];
        let wm = build_wm(&vals);
        assert_eq!(wm.alph_size(), 6);
        assert_eq!(wm.alph_width(), 3);

        for (i, &v) in vals.iter().enumerate() {
            assert_eq!(wm.access(i), Some(v));
            assert_eq!(wm.access_and_rank(i), Some((v, rank_oracle(&vals, i, v))));
            assert_eq!(wm.select(rank_oracle(&vals, i, v), v), Some(i));
        }
        assert_eq!(wm.access(10), None);

        assert_eq!(wm.rank(10, 5), Some(3));
        assert_eq!(wm.rank(10, 6), None);
        assert_eq!(wm.select(2, 5), Some(4));
        assert_eq!(wm.select(3, 5), None);
        assert_eq!(wm.quantile(0..10, 5), Some(3));
        assert_eq!(wm.quantile(0..10, 10), None);
        assert_eq!(wm.rank_range(2..9, 5), Some(2));
        assert_eq!(wm.rank_range(9..2, 5), None);

        assert_eq!(wm.intersect(&[0..4, 4..8, 6..10], 2), Some(vec![0, 1, 2, 3, 5]));
        assert_eq!(
            wm.intersect(&[0..4, 4..8, 6..10], 2),
            Some(intersect_oracle(&vals, &[0..4, 4..8, 6..10], 2))
        );

        assert_eq!(wm.count_values(0..10, 2..6), Some(7));
        assert_eq!(wm.count_values(0..10, 0..6), Some(10));
        assert_eq!(wm.count_values(0..10, 0..100), Some(10));
        assert_eq!(wm.count_values(3..7, 5..6), Some(1));

        let collected: Vec<_> = wm.iter().collect();
        assert_eq!(collected, vals.to_vec());
    }

    #[test]
    fn test_intersect_vacuous_threshold() {
        // alph_size 6 is not a power of two: the deepest level can address
        // 0..8, but only values below alph_size may ever be reported, even
        // when k = 0 makes membership vacuous.
        let wm = build_wm(&[5, 2, 5, 1, 5, 2, 3, 0, 1, 4]);
        let ret = wm.intersect(&[0..3], 0).unwrap();
        assert!(ret.iter().all(|&v| v < wm.alph_size()));
        assert_eq!(ret, (0..wm.alph_size()).collect::<Vec<_>>());
    }

    #[test]
    fn test_navarro_book() {
        // This test example is from G. Navarro's "Compact Data Structures" P130
        let text = "tobeornottobethatisthequestion";
        let len = text.chars().count();

        let mut wmb = WaveletMatrixBuilder::new();
        text.chars().for_each(|c| wmb.push(c as usize));
        let wm = wmb.build::<RsBitVector>().unwrap();

        assert_eq!(wm.len(), len);
        assert_eq!(wm.alph_size(), 'u' as usize + 1);
        assert_eq!(wm.alph_width(), 7);

        assert_eq!(wm.access(20), Some('h' as usize));
        assert_eq!(wm.rank(22, 'o' as usize), Some(4));
        assert_eq!(wm.select(2, 't' as usize), Some(9));

        assert_eq!(wm.quantile(0..len, 0), Some('a' as usize)); // min
        assert_eq!(wm.quantile(0..len, len / 2), Some('o' as usize)); // median
        assert_eq!(wm.quantile(0..len, len - 1), Some('u' as usize)); // max
        assert_eq!(wm.quantile(0..3, 0), Some('b' as usize)); // min of "tob"

        assert_eq!(wm.intersect(&[0..3, 3..6], 2), Some(vec!['o' as usize]));
    }

    #[test]
    fn test_map_range_images() {
        // The image of a range along the path of a value has one coordinate
        // per occurrence of that value, in the coordinates of the deepest
        // level; nested ranges must produce nested images.
        let vals = gen_random_ints(500, 16, 99);
        let wm = build_wm(&vals);
        for val in 0..wm.alph_size() {
            let full = wm.map_range(0..vals.len(), val);
            assert_eq!(full.len(), rank_oracle(&vals, vals.len(), val));
            for &pos in &[0, 123, 250, 499, 500] {
                let image = wm.map_range(0..pos, val);
                assert_eq!(image.start, full.start);
                assert_eq!(image.len(), rank_oracle(&vals, pos, val));
            }
        }
    }

    #[test]
    fn test_builder_extend() {
        let mut wmb = WaveletMatrixBuilder::new();
        wmb.extend([1u32, 2, 3]).unwrap();
        assert_eq!(wmb.len(), 3);
        assert!(wmb.extend([-1i32]).is_err());
    }

    #[test]
    fn test_random_bulk() {
        let vals = gen_random_ints(14000, 100, 334);
        let wm = build_wm(&vals);
        assert_eq!(wm.len(), vals.len());
        assert_eq!(wm.alph_size(), vals.iter().max().unwrap() + 1);
        verify_against_oracle(&wm, &vals, 114514);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let vals = gen_random_ints(14000, 5, 42);
        let wm = build_wm(&vals);

        let mut bytes = vec![];
        let size = wm.serialize_into(&mut bytes).unwrap();
        assert_eq!(size, bytes.len());
        assert_eq!(size, wm.size_in_bytes());

        let other = WaveletMatrix::<RsBitVector>::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(wm, other);
        verify_against_oracle(&other, &vals, 7);
    }

    #[test]
    fn test_serialize_empty() {
        let wm = WaveletMatrixBuilder::new()
            .build::<RsBitVector>()
            .unwrap();
        let mut bytes = vec![];
        wm.serialize_into(&mut bytes).unwrap();
        let other = WaveletMatrix::<RsBitVector>::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(wm, other);
        assert_eq!(other.rank(0, 0), Some(0));
    }

    #[test]
    fn test_deserialize_truncated() {
        let wm = build_wm(&[5, 2, 5, 1]);
        let mut bytes = vec![];
        wm.serialize_into(&mut bytes).unwrap();
        let truncated = &bytes[..bytes.len() - 1];
        assert!(WaveletMatrix::<RsBitVector>::deserialize_from(truncated).is_err());
    }

    #[test]
    fn test_deserialize_corrupt() {
        let wm = build_wm(&[5, 2, 5, 1]);
        let mut bytes = vec![];
        wm.serialize_into(&mut bytes).unwrap();
        // The trailing word is the length; desynchronize it from the layers.
        let n = bytes.len();
        bytes[n - 8..].copy_from_slice(&5usize.to_le_bytes());
        assert!(WaveletMatrix::<RsBitVector>::deserialize_from(&bytes[..]).is_err());
    }

    #[test]
    fn test_plain_bit_vector_layers() {
        // The matrix accepts any layer type satisfying the bit-vector traits.
        let vals = gen_random_ints(500, 30, 3);
        let wm = WaveletMatrix::<BitVector>::from_ints(&vals).unwrap();
        for (i, &v) in vals.iter().enumerate() {
            assert_eq!(wm.access(i), Some(v));
        }
        assert_eq!(wm.rank(500, vals[0]), Some(rank_oracle(&vals, 500, vals[0])));
    }
}
