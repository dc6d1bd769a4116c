//! FLYT header, section prologue and tag definitions.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Raw FLYT file header.
///
/// Multi-byte fields are kept as byte arrays because their byte order is
/// only known once `byte_order_mark` has been inspected.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct RawHeader {
    /// "FLYT".
    pub magic: [u8; 4],
    /// 0xFEFF when read in the file's own byte order.
    pub byte_order_mark: [u8; 2],
    /// Offset of the first section.
    pub header_size: [u8; 2],
    /// Packed version (major, minor, micro, micro2).
    pub version: [u8; 4],
    /// Total file size. Ignored on read.
    pub file_size: [u8; 4],
    /// Number of sections that follow the header.
    pub section_count: [u8; 2],
    pub reserved: [u8; 2],
}

impl RawHeader {
    /// The magic bytes at the start of a FLYT file.
    pub const MAGIC: &'static [u8; 4] = b"FLYT";

    /// Size of the header as written.
    pub const SIZE: u16 = 0x14;

    /// Offset of the file size field, patched after all sections are written.
    pub const FILE_SIZE_OFFSET: usize = 0x0C;

    /// Offset of the section count field.
    pub const SECTION_COUNT_OFFSET: usize = 0x10;
}

/// Tag and declared size at the start of every section.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SectionPrologue {
    pub tag: Tag,
    /// Size of the section including this prologue.
    pub size: [u8; 4],
}

impl SectionPrologue {
    pub const SIZE: usize = 8;
}

/// Four-character section tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Layout info (canvas metrics).
    pub const LAYOUT: Self = Self(*b"lyt1");
    /// Texture name list.
    pub const TEXTURE_LIST: Self = Self(*b"txl1");
    /// Font name list.
    pub const FONT_LIST: Self = Self(*b"fnl1");
    /// Material list.
    pub const MATERIAL_LIST: Self = Self(*b"mat1");
    /// Base (null) pane.
    pub const PANE: Self = Self(*b"pan1");
    /// Picture pane.
    pub const PICTURE: Self = Self(*b"pic1");
    /// Text box pane.
    pub const TEXT: Self = Self(*b"txt1");
    /// Bounding pane.
    pub const BOUNDS: Self = Self(*b"bnd1");
    /// Parts pane.
    pub const PARTS: Self = Self(*b"prt1");
    /// Window pane.
    pub const WINDOW: Self = Self(*b"wnd1");
    /// Pane subtree begin.
    pub const PANE_START: Self = Self(*b"pas1");
    /// Pane subtree end.
    pub const PANE_END: Self = Self(*b"pae1");
    /// Group.
    pub const GROUP: Self = Self(*b"grp1");
    /// Group subtree begin.
    pub const GROUP_START: Self = Self(*b"grs1");
    /// Group subtree end.
    pub const GROUP_END: Self = Self(*b"gre1");

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether this tag introduces a pane record.
    pub fn is_pane(&self) -> bool {
        matches!(
            *self,
            Self::PANE | Self::PICTURE | Self::TEXT | Self::BOUNDS | Self::PARTS | Self::WINDOW
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Packed four-part format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub micro: u8,
    pub micro2: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8, micro: u8, micro2: u8) -> Self {
        Self {
            major,
            minor,
            micro,
            micro2,
        }
    }

    /// Unpack a version from its 32-bit form (major in the top byte).
    pub const fn from_packed(packed: u32) -> Self {
        let [major, minor, micro, micro2] = packed.to_be_bytes();
        Self::new(major, minor, micro, micro2)
    }

    /// Pack the version into its 32-bit form.
    pub const fn packed(&self) -> u32 {
        u32::from_be_bytes([self.major, self.minor, self.micro, self.micro2])
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(8, 6, 0, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.micro, self.micro2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_sizes() {
        assert_eq!(std::mem::size_of::<RawHeader>(), RawHeader::SIZE as usize);
        assert_eq!(std::mem::size_of::<SectionPrologue>(), SectionPrologue::SIZE);
    }

    #[test]
    fn test_version_packing() {
        let version = Version::from_packed(0x0802_0100);
        assert_eq!(version, Version::new(8, 2, 1, 0));
        assert_eq!(version.packed(), 0x0802_0100);
        assert_eq!(version.to_string(), "8.2.1.0");
        assert!(Version::new(5, 0, 0, 0) > Version::new(4, 9, 9, 9));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::PANE.to_string(), "pan1");
        assert_eq!(Tag::new([b'X', 0, b'Y', b'Z']).to_string(), "X\\x00YZ");
        assert!(Tag::WINDOW.is_pane());
        assert!(!Tag::GROUP.is_pane());
    }
}
