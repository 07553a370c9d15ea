//! Broadword primitives over 64-bit machine words.
#![cfg(target_pointer_width = "64")]

/// Each byte's lowest bit set.
pub const ONES_STEP_8: usize = 0x0101_0101_0101_0101;

/// Each byte's highest bit set.
pub const MSBS_STEP_8: usize = 0x8080_8080_8080_8080;

/// Returns the number of bits set in `x`.
///
/// # Examples
///
/// ```
/// use wavedic::broadword::popcount;
///
/// assert_eq!(popcount(0b1011), 3);
/// assert_eq!(popcount(0), 0);
/// ```
#[inline(always)]
pub const fn popcount(x: usize) -> usize {
    x.count_ones() as usize
}

/// Returns the position of the most significant bit set, or [`None`] if `x == 0`.
///
/// # Examples
///
/// ```
/// use wavedic::broadword::msb;
///
/// assert_eq!(msb(0b0100), Some(2));
/// assert_eq!(msb(0), None);
/// ```
#[inline(always)]
pub const fn msb(x: usize) -> Option<usize> {
    if x != 0 {
        Some(63 - x.leading_zeros() as usize)
    } else {
        None
    }
}

/// Returns the position of the least significant bit set, or [`None`] if `x == 0`.
///
/// # Examples
///
/// ```
/// use wavedic::broadword::lsb;
///
/// assert_eq!(lsb(0b0100), Some(2));
/// assert_eq!(lsb(0), None);
/// ```
#[inline(always)]
pub const fn lsb(x: usize) -> Option<usize> {
    if x != 0 {
        Some(x.trailing_zeros() as usize)
    } else {
        None
    }
}

/// Searches the position of the `k`-th bit set in `x`, or
/// [`None`] if `popcount(x) <= k`.
///
/// The byte containing the target bit is located with one broadword
/// comparison over per-byte cumulative counts; the bit inside the byte is
/// found by clearing its `k'` lowest set bits.
///
/// # Examples
///
/// ```
/// use wavedic::broadword::select_in_word;
///
/// assert_eq!(select_in_word(0b0110, 0), Some(1));
/// assert_eq!(select_in_word(0b0110, 1), Some(2));
/// assert_eq!(select_in_word(0b0110, 2), None);
/// ```
pub fn select_in_word(x: usize, k: usize) -> Option<usize> {
    if popcount(x) <= k {
        return None;
    }

    // Cumulative one-counts of bytes 0..=j, replicated into byte lane j.
    let byte_sums = byte_counts(x).wrapping_mul(ONES_STEP_8);
    let k_step_8 = k * ONES_STEP_8;

    // Lane j keeps its msb iff byte_sums[j] <= k; both sides are < 128.
    let geq_k_step_8 = ((k_step_8 | MSBS_STEP_8) - byte_sums) & MSBS_STEP_8;
    let place = popcount(geq_k_step_8) * 8;
    let byte_rank = k - ((byte_sums << 8) >> place & 0xFF);

    let mut byte = (x >> place) & 0xFF;
    let mut r = byte_rank;
    while r != 0 {
        byte &= byte - 1;
        r -= 1;
    }
    Some(place + lsb(byte).unwrap())
}

/// Packs the one-count of each byte of `x` into the corresponding byte.
#[inline(always)]
const fn byte_counts(x: usize) -> usize {
    let mut x = x - ((x & 0xAAAA_AAAA_AAAA_AAAA) >> 1);
    x = (x & 0x3333_3333_3333_3333) + ((x >> 2) & 0x3333_3333_3333_3333);
    (x + (x >> 4)) & 0x0F0F_0F0F_0F0F_0F0F
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn select_naive(x: usize, k: usize) -> Option<usize> {
        let mut rank = 0;
        for i in 0..64 {
            if (x >> i) & 1 == 1 {
                if rank == k {
                    return Some(i);
                }
                rank += 1;
            }
        }
        None
    }

    #[test]
    fn test_select_in_word_random() {
        let mut rng = ChaChaRng::seed_from_u64(13);
        for _ in 0..1000 {
            let x = rng.gen::<usize>();
            for k in 0..=popcount(x) {
                assert_eq!(select_in_word(x, k), select_naive(x, k));
            }
        }
    }

    #[test]
    fn test_select_in_word_extremes() {
        assert_eq!(select_in_word(0, 0), None);
        assert_eq!(select_in_word(usize::MAX, 0), Some(0));
        assert_eq!(select_in_word(usize::MAX, 63), Some(63));
        assert_eq!(select_in_word(usize::MAX, 64), None);
        assert_eq!(select_in_word(1 << 63, 0), Some(63));
    }

    #[test]
    fn test_msb_lsb() {
        assert_eq!(msb(1), Some(0));
        assert_eq!(msb(usize::MAX), Some(63));
        assert_eq!(lsb(1 << 20), Some(20));
        assert_eq!(lsb(usize::MAX), Some(0));
    }
}
