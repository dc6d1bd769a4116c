//! Runtime byte order selection.
//!
//! Layout files announce their byte order with a byte-order mark, so the
//! order is only known after the header has been read. [`Endian`] carries
//! that decision and dispatches to `byteorder`'s static implementations.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl Endian {
    /// Byte-order mark as it appears when read big-endian from a big-endian file.
    pub const BOM_BIG: u16 = 0xFEFF;

    /// Byte-order mark as it appears when read big-endian from a little-endian file.
    pub const BOM_LITTLE: u16 = 0xFFFE;

    /// Resolve a byte-order mark (read as big-endian) into a byte order.
    pub const fn from_bom(bom: u16) -> Option<Self> {
        match bom {
            Self::BOM_BIG => Some(Self::Big),
            Self::BOM_LITTLE => Some(Self::Little),
            _ => None,
        }
    }

    /// The two BOM bytes as they are stored in a file of this byte order.
    pub const fn bom_bytes(self) -> [u8; 2] {
        match self {
            Self::Big => [0xFE, 0xFF],
            Self::Little => [0xFF, 0xFE],
        }
    }

    #[inline]
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Self::Big => BigEndian::read_u16(buf),
            Self::Little => LittleEndian::read_u16(buf),
        }
    }

    #[inline]
    pub fn read_i16(self, buf: &[u8]) -> i16 {
        match self {
            Self::Big => BigEndian::read_i16(buf),
            Self::Little => LittleEndian::read_i16(buf),
        }
    }

    #[inline]
    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Self::Big => BigEndian::read_u32(buf),
            Self::Little => LittleEndian::read_u32(buf),
        }
    }

    #[inline]
    pub fn read_i32(self, buf: &[u8]) -> i32 {
        match self {
            Self::Big => BigEndian::read_i32(buf),
            Self::Little => LittleEndian::read_i32(buf),
        }
    }

    #[inline]
    pub fn read_f32(self, buf: &[u8]) -> f32 {
        match self {
            Self::Big => BigEndian::read_f32(buf),
            Self::Little => LittleEndian::read_f32(buf),
        }
    }

    #[inline]
    pub fn write_u16(self, buf: &mut [u8], value: u16) {
        match self {
            Self::Big => BigEndian::write_u16(buf, value),
            Self::Little => LittleEndian::write_u16(buf, value),
        }
    }

    #[inline]
    pub fn write_i16(self, buf: &mut [u8], value: i16) {
        match self {
            Self::Big => BigEndian::write_i16(buf, value),
            Self::Little => LittleEndian::write_i16(buf, value),
        }
    }

    #[inline]
    pub fn write_u32(self, buf: &mut [u8], value: u32) {
        match self {
            Self::Big => BigEndian::write_u32(buf, value),
            Self::Little => LittleEndian::write_u32(buf, value),
        }
    }

    #[inline]
    pub fn write_i32(self, buf: &mut [u8], value: i32) {
        match self {
            Self::Big => BigEndian::write_i32(buf, value),
            Self::Little => LittleEndian::write_i32(buf, value),
        }
    }

    #[inline]
    pub fn write_f32(self, buf: &mut [u8], value: f32) {
        match self {
            Self::Big => BigEndian::write_f32(buf, value),
            Self::Little => LittleEndian::write_f32(buf, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_resolution() {
        assert_eq!(Endian::from_bom(0xFEFF), Some(Endian::Big));
        assert_eq!(Endian::from_bom(0xFFFE), Some(Endian::Little));
        assert_eq!(Endian::from_bom(0x1234), None);

        for endian in [Endian::Big, Endian::Little] {
            let bom = endian.bom_bytes();
            assert_eq!(Endian::from_bom(u16::from_be_bytes(bom)), Some(endian));
        }
    }

    #[test]
    fn test_read_write_u32() {
        let mut buf = [0u8; 4];
        Endian::Big.write_u32(&mut buf, 0x01020304);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(Endian::Little.read_u32(&buf), 0x04030201);
    }
}
