//! Growable binary writer with deferred fields.
//!
//! [`BinaryWriter`] appends endian-aware primitives to an in-memory buffer.
//! Fields whose value is only known later (sizes, offsets, counts) are
//! reserved with [`BinaryWriter::reserve_u32`] / [`BinaryWriter::reserve_u16`]
//! and filled in with the `patch_*` methods once the dependent content has
//! been written.

use crate::{Color8, Endian, Error, Result, Vec2, Vec3};

/// A reserved slot in the output that must be patched later.
#[must_use = "a reserved slot stays zero until it is patched"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    position: usize,
    width: usize,
}

impl Placeholder {
    /// Absolute position of the reserved slot.
    pub const fn position(&self) -> usize {
        self.position
    }
}

/// An endian-aware writer over a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use flyt_common::{BinaryWriter, Endian};
///
/// let mut writer = BinaryWriter::new(Endian::Big);
/// let base = writer.position();
/// let offset = writer.reserve_u32();
/// writer.write_cstring("name");
/// writer.patch_offset_here(offset, base).unwrap();
///
/// assert_eq!(&writer.as_slice()[..4], &[0, 0, 0, 9]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    data: Vec<u8>,
    endian: Endian,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new(endian: Endian) -> Self {
        Self {
            data: Vec::new(),
            endian,
        }
    }

    /// Create an empty writer with preallocated capacity.
    pub fn with_capacity(endian: Endian, capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            endian,
        }
    }

    #[inline]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Current write position (always the end of the buffer).
    #[inline]
    pub fn position(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the writer and return the written bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) {
        self.data.resize(self.data.len() + count, 0);
    }

    /// Pad with zeros up to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) {
        let rem = self.data.len() % alignment;
        if rem != 0 {
            self.write_zeros(alignment - rem);
        }
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.data.push(value as u8);
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.data.push(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut buf = [0u8; 2];
        self.endian.write_u16(&mut buf, value);
        self.write_bytes(&buf);
    }

    pub fn write_i16(&mut self, value: i16) {
        let mut buf = [0u8; 2];
        self.endian.write_i16(&mut buf, value);
        self.write_bytes(&buf);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        self.endian.write_u32(&mut buf, value);
        self.write_bytes(&buf);
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut buf = [0u8; 4];
        self.endian.write_i32(&mut buf, value);
        self.write_bytes(&buf);
    }

    pub fn write_f32(&mut self, value: f32) {
        let mut buf = [0u8; 4];
        self.endian.write_f32(&mut buf, value);
        self.write_bytes(&buf);
    }

    pub fn write_vec2(&mut self, value: Vec2) {
        self.write_f32(value.x);
        self.write_f32(value.y);
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    pub fn write_color(&mut self, value: Color8) {
        self.write_bytes(&value.to_bytes());
    }

    /// Write a string followed by a null terminator.
    pub fn write_cstring(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
        self.write_u8(0);
    }

    /// Write a string into a fixed-size, zero-padded slot.
    ///
    /// Fails if the string does not fit. A string that fills the slot exactly
    /// is stored without a terminator.
    pub fn write_fixed_string(&mut self, value: &str, slot_size: usize) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() > slot_size {
            return Err(Error::StringTooLong {
                value: value.to_string(),
                len: bytes.len(),
                capacity: slot_size,
            });
        }
        self.write_bytes(bytes);
        self.write_zeros(slot_size - bytes.len());
        Ok(())
    }

    /// Write text as UTF-16 code units in the writer's byte order, followed
    /// by a null unit. Returns the number of bytes written.
    pub fn write_utf16(&mut self, value: &str) -> usize {
        let start = self.position();
        for unit in value.encode_utf16() {
            self.write_u16(unit);
        }
        self.write_u16(0);
        self.position() - start
    }

    /// Reserve a u16 slot.
    pub fn reserve_u16(&mut self) -> Placeholder {
        let position = self.position();
        self.write_zeros(2);
        Placeholder { position, width: 2 }
    }

    /// Reserve a u32 slot.
    pub fn reserve_u32(&mut self) -> Placeholder {
        let position = self.position();
        self.write_zeros(4);
        Placeholder { position, width: 4 }
    }

    /// Overwrite a u16 at an absolute position.
    pub fn patch_u16_at(&mut self, position: usize, value: u16) -> Result<()> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(position..position + 2)
            .ok_or(Error::PlaceholderOutOfBounds { position, len })?;
        self.endian.write_u16(slot, value);
        Ok(())
    }

    /// Overwrite a u32 at an absolute position.
    pub fn patch_u32_at(&mut self, position: usize, value: u32) -> Result<()> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(position..position + 4)
            .ok_or(Error::PlaceholderOutOfBounds { position, len })?;
        self.endian.write_u32(slot, value);
        Ok(())
    }

    /// Fill a reserved slot with a value.
    pub fn patch(&mut self, placeholder: Placeholder, value: u32) -> Result<()> {
        match placeholder.width {
            2 => {
                let narrow =
                    u16::try_from(value).map_err(|_| Error::ValueOverflow { value, bits: 16 })?;
                self.patch_u16_at(placeholder.position, narrow)
            }
            _ => self.patch_u32_at(placeholder.position, value),
        }
    }

    /// Fill a reserved slot with the distance from `base` to `target`.
    pub fn patch_offset(&mut self, placeholder: Placeholder, base: usize, target: usize) -> Result<()> {
        let delta = target
            .checked_sub(base)
            .and_then(|d| u32::try_from(d).ok())
            .ok_or(Error::OffsetOutOfBounds {
                offset: target,
                size: self.data.len(),
            })?;
        self.patch(placeholder, delta)
    }

    /// Fill a reserved slot with the distance from `base` to the current position.
    pub fn patch_offset_here(&mut self, placeholder: Placeholder, base: usize) -> Result<()> {
        let here = self.position();
        self.patch_offset(placeholder, base, here)
    }
}
