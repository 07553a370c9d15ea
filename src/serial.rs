//! Serialization into and from raw bytes.
//!
//! Every structure in this crate persists itself through the [`Serializable`]
//! trait: fixed-width little-endian words for scalars, a length header
//! followed by the elements for vectors, and a one-byte tag for optional
//! values. The byte stream carries no framing or versioning of its own; a
//! reader must already know which type it expects.
#![cfg(target_pointer_width = "64")]

pub mod primitive;

use std::io::{Read, Write};

use anyhow::Result;

/// Serialization into and from raw bytes.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use wavedic::Serializable;
///
/// let ranks = vec![3u32, 1, 4, 1, 5];
///
/// let mut bytes = vec![];
/// let written = ranks.serialize_into(&mut bytes)?;
/// assert_eq!(written, bytes.len());
/// assert_eq!(written, ranks.size_in_bytes());
///
/// let decoded = Vec::<u32>::deserialize_from(&bytes[..])?;
/// assert_eq!(decoded, ranks);
/// # Ok(())
/// # }
/// ```
pub trait Serializable: Sized {
    /// Writes `self` into `writer`, returning the number of bytes written.
    ///
    /// # Arguments
    ///
    /// - `writer`: [`Write`] variable.
    fn serialize_into<W: Write>(&self, writer: W) -> Result<usize>;

    /// Reads a value of this type back from `reader`.
    ///
    /// # Arguments
    ///
    /// - `reader`: [`Read`] variable.
    fn deserialize_from<R: Read>(reader: R) -> Result<Self>;

    /// Returns the number of bytes [`Self::serialize_into`] will write.
    fn size_in_bytes(&self) -> usize;

    /// Returns the serialized size of this type when it is the same for
    /// every value, as for primitive scalars.
    fn size_of() -> Option<usize> {
        None
    }
}

impl<S> Serializable for Option<S>
where
    S: Serializable,
{
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        match self {
            Some(x) => Ok(true.serialize_into(&mut writer)? + x.serialize_into(&mut writer)?),
            None => false.serialize_into(&mut writer),
        }
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        if bool::deserialize_from(&mut reader)? {
            Ok(Some(S::deserialize_from(&mut reader)?))
        } else {
            Ok(None)
        }
    }

    fn size_in_bytes(&self) -> usize {
        bool::size_of().unwrap() + self.as_ref().map_or(0, Serializable::size_in_bytes)
    }
}

impl<S> Serializable for Vec<S>
where
    S: Serializable,
{
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let header = self.len().serialize_into(&mut writer)?;
        self.iter()
            .try_fold(header, |mem, x| Ok(mem + x.serialize_into(&mut writer)?))
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let len = usize::deserialize_from(&mut reader)?;
        (0..len).map(|_| S::deserialize_from(&mut reader)).collect()
    }

    fn size_in_bytes(&self) -> usize {
        let header = usize::size_of().unwrap();
        match S::size_of() {
            Some(m) => header + m * self.len(),
            None => header + self.iter().map(Serializable::size_in_bytes).sum::<usize>(),
        }
    }
}
