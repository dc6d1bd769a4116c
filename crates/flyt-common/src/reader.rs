//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! endian-aware binary data from a byte slice without copying.

use zerocopy::FromBytes;

use crate::{Color8, Endian, Error, Result, Vec2, Vec3};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// Multi-byte values are decoded in the reader's [`Endian`], which defaults to
/// big-endian and can be switched once a byte-order mark has been seen.
///
/// # Example
///
/// ```
/// use flyt_common::{BinaryReader, Endian};
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x01020304);
/// reader.set_endian(Endian::Little);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
    endian: Endian,
}

impl<'a> BinaryReader<'a> {
    /// Create a new big-endian reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            endian: Endian::Big,
        }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize, endian: Endian) -> Self {
        Self {
            data,
            position,
            endian,
        }
    }

    /// Get the byte order used for multi-byte reads.
    #[inline]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Change the byte order used for subsequent reads.
    #[inline]
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// The whole underlying buffer.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Advance the position by a number of bytes.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// Run `f` with the cursor at `position`, then restore the cursor.
    ///
    /// The previous position is restored whether `f` succeeds or fails, so a
    /// failed look-ahead never leaves the caller mid-record.
    pub fn scoped<T, E>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let saved = self.position;
        self.position = position;
        let result = f(self);
        self.position = saved;
        result
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                position: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a boolean (non-zero = true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|b| b != 0)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let endian = self.endian;
        self.read_bytes(2).map(|b| endian.read_u16(b))
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        let endian = self.endian;
        self.read_bytes(2).map(|b| endian.read_i16(b))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let endian = self.endian;
        self.read_bytes(4).map(|b| endian.read_u32(b))
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        let endian = self.endian;
        self.read_bytes(4).map(|b| endian.read_i32(b))
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        let endian = self.endian;
        self.read_bytes(4).map(|b| endian.read_f32(b))
    }

    /// Read `count` consecutive u32 values.
    pub fn read_u32s(&mut self, count: usize) -> Result<Vec<u32>> {
        // Validate the whole run first so a bogus count cannot over-allocate.
        self.peek_bytes(count.saturating_mul(4))?;
        (0..count).map(|_| self.read_u32()).collect()
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read a 4-byte RGBA color.
    pub fn read_color(&mut self) -> Result<Color8> {
        self.read_array::<4>().map(Color8::from_bytes)
    }

    /// Read a null-terminated ASCII string.
    pub fn read_cstring(&mut self) -> Result<&'a str> {
        let start = self.position;
        let value = self.cstring_at(start)?;
        self.position = start + value.len() + 1;
        Ok(value)
    }

    /// Read a null-terminated string at an absolute offset.
    ///
    /// The cursor is left untouched.
    pub fn cstring_at(&self, offset: usize) -> Result<&'a str> {
        if offset >= self.data.len() {
            return Err(Error::OffsetOutOfBounds {
                offset,
                size: self.data.len(),
            });
        }
        let tail = &self.data[offset..];
        let end = memchr::memchr(0, tail).ok_or(Error::MissingNullTerminator(offset))?;
        std::str::from_utf8(&tail[..end]).map_err(Error::Utf8)
    }

    /// Read a string of a specific length.
    pub fn read_string(&mut self, length: usize) -> Result<&'a str> {
        let bytes = self.read_bytes(length)?;
        std::str::from_utf8(bytes).map_err(Error::Utf8)
    }

    /// Read a string from a fixed-size slot, stopping at the first null.
    pub fn read_fixed_string(&mut self, slot_size: usize) -> Result<&'a str> {
        let bytes = self.read_bytes(slot_size)?;
        let end = memchr::memchr(0, bytes).unwrap_or(slot_size);
        std::str::from_utf8(&bytes[..end]).map_err(Error::Utf8)
    }

    /// Read `byte_len` bytes of UTF-16 text, stopping at the first null unit.
    pub fn read_utf16(&mut self, byte_len: usize) -> Result<String> {
        let endian = self.endian;
        let bytes = self.read_bytes(byte_len)?;
        let units = bytes
            .chunks_exact(2)
            .map(|pair| endian.read_u16(pair))
            .take_while(|&unit| unit != 0);
        char::decode_utf16(units)
            .collect::<std::result::Result<String, _>>()
            .map_err(Error::Utf16)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate. Structs
    /// read this way see raw bytes; endian-sensitive fields should be stored as
    /// byte arrays and decoded with [`Endian`].
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let position = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            position,
            needed: size,
            available: bytes.len(),
        })
    }

    /// Expect specific magic bytes.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x01020304
            0xFF, 0xFF, // i16: -1
            0x3F, 0x80, 0x00, 0x00, // f32: 1.0
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x01020304);
        assert_eq!(reader.read_i16().unwrap(), -1);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_cstring() {
        let data = b"hello\0world\0";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_cstring().unwrap(), "hello");
        assert_eq!(reader.read_cstring().unwrap(), "world");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_cstring_at_does_not_move_cursor() {
        let data = b"abc\0def\0";
        let mut reader = BinaryReader::new(data);
        reader.advance(1);

        assert_eq!(reader.cstring_at(4).unwrap(), "def");
        assert_eq!(reader.position(), 1);
        assert!(matches!(
            reader.cstring_at(8),
            Err(Error::OffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_fixed_string_trims_padding() {
        let data = b"N_Root\0\0\0\0";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_fixed_string(10).unwrap(), "N_Root");
        assert_eq!(reader.position(), 10);
    }

    #[test]
    fn test_read_utf16_both_orders() {
        let big = [0x00, b'H', 0x00, b'i', 0x00, 0x00];
        assert_eq!(BinaryReader::new(&big).read_utf16(6).unwrap(), "Hi");

        let little = [b'H', 0x00, b'i', 0x00, 0x00, 0x00];
        let mut reader = BinaryReader::new(&little);
        reader.set_endian(Endian::Little);
        assert_eq!(reader.read_utf16(6).unwrap(), "Hi");
    }

    #[test]
    fn test_scoped_restores_on_error() {
        let data = [0u8; 4];
        let mut reader = BinaryReader::new(&data);
        reader.advance(2);

        let result = reader.scoped(3, |r| r.read_u32());
        assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
        assert_eq!(reader.position(), 2);

        let value = reader.scoped(0, |r| r.read_u16()).unwrap();
        assert_eq!(value, 0);
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_u32(),
            Err(Error::UnexpectedEof {
                position: 0,
                needed: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn test_expect_magic() {
        let mut reader = BinaryReader::new(b"FLYT");
        assert!(reader.expect_magic(b"FLYT").is_ok());

        let mut reader = BinaryReader::new(b"FLAN");
        assert!(matches!(
            reader.expect_magic(b"FLYT"),
            Err(Error::InvalidMagic { .. })
        ));
    }
}
