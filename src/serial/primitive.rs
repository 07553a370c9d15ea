//! Fixed-width little-endian codecs for primitive scalars.
//!
//! # Examples
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use wavedic::Serializable;
//!
//! let mut bytes = vec![];
//! 0x1234u16.serialize_into(&mut bytes)?;
//! assert_eq!(bytes, vec![0x34, 0x12]);
//! assert_eq!(u16::deserialize_from(&bytes[..])?, 0x1234);
//! # Ok(())
//! # }
//! ```
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::Result;

use super::Serializable;

macro_rules! impl_int_serial {
    ($($int:ty),* $(,)?) => {
        $(
            impl Serializable for $int {
                fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
                    let bytes = self.to_le_bytes();
                    writer.write_all(&bytes)?;
                    Ok(bytes.len())
                }

                fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
                    let mut buf = [0u8; std::mem::size_of::<$int>()];
                    reader.read_exact(&mut buf)?;
                    Ok(<$int>::from_le_bytes(buf))
                }

                fn size_in_bytes(&self) -> usize {
                    std::mem::size_of::<$int>()
                }

                fn size_of() -> Option<usize> {
                    Some(std::mem::size_of::<$int>())
                }
            }
        )*
    };
}

impl_int_serial!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl Serializable for bool {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        writer.write_all(&[u8::from(*self)])?;
        Ok(1)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(buf[0] != 0)
    }

    fn size_in_bytes(&self) -> usize {
        1
    }

    fn size_of() -> Option<usize> {
        Some(1)
    }
}
