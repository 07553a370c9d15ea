//! # Wavedic: wavelet matrix over an immutable integer sequence
//!
//! Wavedic stores a sequence of $`n`$ integers from $`[0, \sigma)`$ in a
//! [wavelet matrix](https://doi.org/10.1007/978-3-642-34109-0_18): one
//! rank/select bit dictionary per bit of the alphabet width, arranged from
//! the most significant bit down. The matrix answers a family of range
//! queries in $`O(\lg \sigma)`$ time each, in space close to
//! $`n \lceil \lg \sigma \rceil`$ bits plus indexing overhead:
//!
//! - [`access`](WaveletMatrix::access): the value at a position;
//! - [`rank`](WaveletMatrix::rank) / [`rank_range`](WaveletMatrix::rank_range):
//!   occurrences of a value in a prefix or range;
//! - [`select`](WaveletMatrix::select): the position of the `k`-th occurrence
//!   of a value;
//! - [`quantile`](WaveletMatrix::quantile): the `k`-th smallest value in a
//!   range;
//! - [`count_values`](WaveletMatrix::count_values): occurrences of a value
//!   interval in a range;
//! - [`intersect`](WaveletMatrix::intersect): values shared by at least `k`
//!   of a set of ranges.
//!
//! A built matrix is immutable; queries take `&self` and can run from any
//! number of threads without synchronization.
//!
//! ## Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use wavedic::bit_vectors::RsBitVector;
//! use wavedic::{Serializable, WaveletMatrixBuilder};
//!
//! let mut wmb = WaveletMatrixBuilder::new();
//! wmb.extend([5u32, 2, 5, 1, 5, 2, 3, 0, 1, 4])?;
//!
//! let wm = wmb.build::<RsBitVector>()?;
//! assert_eq!(wm.len(), 10);
//! assert_eq!(wm.alph_size(), 6);
//!
//! assert_eq!(wm.access(4), Some(5));
//! assert_eq!(wm.rank(10, 5), Some(3));
//! assert_eq!(wm.select(2, 5), Some(4));
//! assert_eq!(wm.quantile(0..10, 5), Some(3));
//!
//! // Round-trip through bytes.
//! let mut bytes = vec![];
//! wm.serialize_into(&mut bytes)?;
//! let other = wavedic::WaveletMatrix::<RsBitVector>::deserialize_from(&bytes[..])?;
//! assert_eq!(wm, other);
//! # Ok(())
//! # }
//! ```
//!
//! ## Layer types
//!
//! [`WaveletMatrix`] is generic over the bit dictionary used for its layers;
//! any type satisfying the traits in [`bit_vectors`] works.
//! [`bit_vectors::RsBitVector`] (constant-time rank, hinted select) is the
//! intended choice; the plain [`bit_vectors::BitVector`] trades speed for
//! zero index overhead.
//!
//! ## Credits
//!
//! The wavelet-matrix algorithms follow hillbig's
//! [waveletTree](https://github.com/hillbig/waveletTree) library.
#![deny(missing_docs)]
#![cfg(target_pointer_width = "64")]

pub mod bit_vectors;
pub mod broadword;
pub mod serial;
pub mod utils;
pub mod wavelet_matrix;

pub use serial::Serializable;
pub use wavelet_matrix::{WaveletMatrix, WaveletMatrixBuilder};
