//! Prelude module to import all the bit-vector traits at once.
//!
//! # Examples
//!
//! ```
//! use wavedic::bit_vectors::prelude::*;
//! ```
pub use crate::bit_vectors::{Access, Build, NumBits, Rank, Select};
