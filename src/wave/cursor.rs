//! Endian-aware cursor over container bytes.

use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::Serialize;

use super::DecodeError;

/// Byte order of a container, detected from its version marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Endian {
    /// Little-endian (Windows, Intel Macintosh)
    Little,
    /// Big-endian (PowerPC Macintosh)
    Big,
}

impl Endian {
    /// Detect the byte order from the two bytes of a version field.
    ///
    /// Versions are small positive numbers, so the zero byte is the high byte.
    pub fn detect(version_bytes: [u8; 2]) -> Self {
        if version_bytes[0] == 0 {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

macro_rules! read_fn {
    ($name:ident, $ty:ty, $read:ident) => {
        pub(crate) fn $name(&mut self, field: &'static str) -> Result<$ty, DecodeError> {
            self.ensure(field, std::mem::size_of::<$ty>())?;
            let value = match self.endian {
                Endian::Little => self.inner.$read::<LittleEndian>(),
                Endian::Big => self.inner.$read::<BigEndian>(),
            };
            // ensure() guarantees the bytes are present
            value.map_err(|_| self.truncated(field, std::mem::size_of::<$ty>()))
        }
    };
}

/// Cursor reading fixed-layout fields in a given byte order
pub(crate) struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(bytes: &'a [u8], endian: Endian) -> Self {
        Self {
            inner: Cursor::new(bytes),
            endian,
        }
    }

    /// Cursor positioned at `offset`
    pub(crate) fn at(bytes: &'a [u8], endian: Endian, offset: usize) -> Self {
        let mut cursor = Self::new(bytes, endian);
        cursor.seek(offset);
        cursor
    }

    pub(crate) fn position(&self) -> usize {
        self.inner.position() as usize
    }

    pub(crate) fn seek(&mut self, offset: usize) {
        self.inner.set_position(offset as u64);
    }

    pub(crate) fn skip(&mut self, count: usize) {
        let pos = self.position().saturating_add(count);
        self.seek(pos);
    }

    pub(crate) fn remaining(&self) -> usize {
        self.inner.get_ref().len().saturating_sub(self.position())
    }

    read_fn!(i16, i16, read_i16);
    read_fn!(u16, u16, read_u16);
    read_fn!(i32, i32, read_i32);
    read_fn!(u32, u32, read_u32);
    read_fn!(f64, f64, read_f64);

    /// Borrow the next `count` bytes and advance past them
    pub(crate) fn bytes(&mut self, field: &'static str, count: usize) -> Result<&'a [u8], DecodeError> {
        if count == 0 {
            return Ok(&[]);
        }
        self.ensure(field, count)?;
        let start = self.position();
        let data: &'a [u8] = *self.inner.get_ref();
        let slice = &data[start..start + count];
        self.skip(count);
        Ok(slice)
    }

    fn ensure(&self, field: &'static str, count: usize) -> Result<(), DecodeError> {
        if self.remaining() < count {
            return Err(self.truncated(field, count));
        }
        Ok(())
    }

    fn truncated(&self, field: &'static str, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            field,
            offset: self.position(),
            needed,
            available: self.remaining(),
        }
    }
}

/// 16-bit wrapping sum of `bytes` read as words in `endian` order
pub(crate) fn word_checksum(bytes: &[u8], endian: Endian) -> u16 {
    bytes.chunks_exact(2).fold(0u16, |sum, word| {
        let word = match endian {
            Endian::Little => u16::from_le_bytes([word[0], word[1]]),
            Endian::Big => u16::from_be_bytes([word[0], word[1]]),
        };
        sum.wrapping_add(word)
    })
}

/// Text up to the first NUL byte
pub(crate) fn trim_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_byte_order() {
        assert_eq!(Endian::detect([5, 0]), Endian::Little);
        assert_eq!(Endian::detect([0, 5]), Endian::Big);
    }

    #[test]
    fn test_read_both_orders() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        let mut le = ByteCursor::new(&bytes, Endian::Little);
        let mut be = ByteCursor::new(&bytes, Endian::Big);
        assert_eq!(le.u16("a").unwrap(), 0x0201);
        assert_eq!(be.u16("a").unwrap(), 0x0102);
        assert_eq!(le.remaining(), 2);
    }

    #[test]
    fn test_truncated_read() {
        let bytes = [0x01, 0x02];
        let mut cursor = ByteCursor::new(&bytes, Endian::Little);
        match cursor.i32("npnts") {
            Err(DecodeError::Truncated { field, needed, available, .. }) => {
                assert_eq!(field, "npnts");
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_checksum_and_nul_trim() {
        let bytes = [0x01, 0x00, 0xff, 0xff];
        assert_eq!(word_checksum(&bytes, Endian::Little), 0);
        assert_eq!(trim_nul(b"eV\0\0"), b"eV");
        assert_eq!(trim_nul(b"keV!"), b"keV!");
    }
}
