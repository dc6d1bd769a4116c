//! Pane records (`pan1`, `pic1`, `txt1`, `bnd1`, `prt1`, `wnd1`).
//!
//! Every pane record starts with the same base payload ([`PaneBase`]); the
//! section tag selects which extension follows it ([`PaneKind`]).

mod picture;
mod text;
mod window;

pub use picture::{PicturePane, TexCoord, VertexColors};
pub use text::{LineAlignment, TextPane};
pub use window::{WindowContent, WindowFrame, WindowInsets, WindowPane};

use flyt_common::{BinaryReader, BinaryWriter, Vec2, Vec3};

use crate::header::{SectionPrologue, Tag};
use crate::{Error, Result};

/// Size of the pane name slot.
pub const PANE_NAME_LEN: usize = 0x18;

/// Size of the user-data tag slot.
pub const USER_DATA_LEN: usize = 0x8;

/// Size of a pane section up to the end of the base payload. Window
/// sub-record offsets are measured from the section start, so this is the
/// smallest offset they can hold.
pub const PANE_BASE_END: usize = SectionPrologue::SIZE + 0x4C;

/// Index of a pane in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PaneId(pub(crate) usize);

impl PaneId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Horizontal anchor of a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum HorizontalOrigin {
    Center,
    Left,
    Right,
    Unknown(u8),
}

impl HorizontalOrigin {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::Center,
            1 => Self::Left,
            2 => Self::Right,
            other => Self::Unknown(other),
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Center => 0,
            Self::Left => 1,
            Self::Right => 2,
            Self::Unknown(bits) => bits & 0x3,
        }
    }
}

/// Vertical anchor of a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum VerticalOrigin {
    Center,
    Top,
    Bottom,
    Unknown(u8),
}

impl VerticalOrigin {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::Center,
            1 => Self::Top,
            2 => Self::Bottom,
            other => Self::Unknown(other),
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Center => 0,
            Self::Top => 1,
            Self::Bottom => 2,
            Self::Unknown(bits) => bits & 0x3,
        }
    }
}

/// Fields shared by every pane variant.
///
/// `flags` and `origin` are stored raw; the accessors below decode the bits
/// without touching the ones they do not own.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PaneBase {
    /// Bit 0: visible. Bit 1: influences children's alpha.
    pub flags: u8,
    /// Bits 6-7 / 4-5: own origin X/Y. Bits 2-3 / 0-1: parent origin X/Y.
    pub origin: u8,
    pub alpha: u8,
    pub mag_flags: u8,
    pub name: String,
    pub user_data: String,
    pub translate: Vec3,
    pub rotate: Vec3,
    pub scale: Vec2,
    pub width: f32,
    pub height: f32,
}

impl PaneBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            flags: 0x1,
            origin: 0,
            alpha: 255,
            mag_flags: 0,
            name: name.into(),
            user_data: String::new(),
            translate: Vec3::ZERO,
            rotate: Vec3::ZERO,
            scale: Vec2::ONE,
            width: 0.0,
            height: 0.0,
        }
    }

    pub const fn visible(&self) -> bool {
        self.flags & 0x1 != 0
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.set_flag(0x1, visible);
    }

    pub const fn influence_alpha(&self) -> bool {
        self.flags & 0x2 != 0
    }

    pub fn set_influence_alpha(&mut self, influence: bool) {
        self.set_flag(0x2, influence);
    }

    fn set_flag(&mut self, mask: u8, on: bool) {
        if on {
            self.flags |= mask;
        } else {
            self.flags &= !mask;
        }
    }

    pub const fn origin_x(&self) -> HorizontalOrigin {
        HorizontalOrigin::from_bits(self.origin >> 6)
    }

    pub const fn origin_y(&self) -> VerticalOrigin {
        VerticalOrigin::from_bits(self.origin >> 4)
    }

    pub const fn parent_origin_x(&self) -> HorizontalOrigin {
        HorizontalOrigin::from_bits(self.origin >> 2)
    }

    pub const fn parent_origin_y(&self) -> VerticalOrigin {
        VerticalOrigin::from_bits(self.origin)
    }

    pub fn set_origin(&mut self, x: HorizontalOrigin, y: VerticalOrigin) {
        self.origin = (self.origin & 0x0F) | (x.bits() << 6) | (y.bits() << 4);
    }

    pub fn set_parent_origin(&mut self, x: HorizontalOrigin, y: VerticalOrigin) {
        self.origin = (self.origin & 0xF0) | (x.bits() << 2) | y.bits();
    }

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            flags: reader.read_u8()?,
            origin: reader.read_u8()?,
            alpha: reader.read_u8()?,
            mag_flags: reader.read_u8()?,
            name: reader.read_fixed_string(PANE_NAME_LEN)?.to_string(),
            user_data: reader.read_fixed_string(USER_DATA_LEN)?.to_string(),
            translate: reader.read_vec3()?,
            rotate: reader.read_vec3()?,
            scale: reader.read_vec2()?,
            width: reader.read_f32()?,
            height: reader.read_f32()?,
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u8(self.flags);
        writer.write_u8(self.origin);
        writer.write_u8(self.alpha);
        writer.write_u8(self.mag_flags);
        writer.write_fixed_string(&self.name, PANE_NAME_LEN)?;
        writer.write_fixed_string(&self.user_data, USER_DATA_LEN)?;
        writer.write_vec3(self.translate);
        writer.write_vec3(self.rotate);
        writer.write_vec2(self.scale);
        writer.write_f32(self.width);
        writer.write_f32(self.height);
        Ok(())
    }
}

/// Variant-specific part of a pane.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum PaneKind {
    /// Null pane (`pan1`): positions its children, draws nothing.
    Base,
    Picture(PicturePane),
    Text(TextPane),
    /// Bounding pane (`bnd1`): base payload only.
    Bounds,
    /// Parts pane (`prt1`). The bytes after the base payload are kept as-is.
    Parts { extra: Vec<u8> },
    Window(WindowPane),
}

impl PaneKind {
    /// Section tag this variant is stored under.
    pub const fn tag(&self) -> Tag {
        match self {
            Self::Base => Tag::PANE,
            Self::Picture(_) => Tag::PICTURE,
            Self::Text(_) => Tag::TEXT,
            Self::Bounds => Tag::BOUNDS,
            Self::Parts { .. } => Tag::PARTS,
            Self::Window(_) => Tag::WINDOW,
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Base => "pane",
            Self::Picture(_) => "picture",
            Self::Text(_) => "text",
            Self::Bounds => "bounds",
            Self::Parts { .. } => "parts",
            Self::Window(_) => "window",
        }
    }
}

/// A node of the pane tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Pane {
    pub base: PaneBase,
    pub kind: PaneKind,
    pub(crate) parent: Option<PaneId>,
    pub(crate) children: Vec<PaneId>,
}

impl Pane {
    /// A detached pane. It joins a tree through
    /// [`LayoutDocument::add_pane`](crate::LayoutDocument::add_pane).
    pub fn new(name: impl Into<String>, kind: PaneKind) -> Self {
        Self {
            base: PaneBase::new(name),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub const fn tag(&self) -> Tag {
        self.kind.tag()
    }

    pub const fn parent(&self) -> Option<PaneId> {
        self.parent
    }

    /// Children in file order.
    pub fn children(&self) -> &[PaneId] {
        &self.children
    }

    /// Material index used by picture and text panes.
    pub fn material_index(&self) -> Option<u16> {
        match &self.kind {
            PaneKind::Picture(picture) => Some(picture.material_index),
            PaneKind::Text(text) => Some(text.material_index),
            PaneKind::Window(window) => Some(window.content.material_index),
            _ => None,
        }
    }

    /// Decode a pane record. `reader` is bounded to the section and
    /// positioned just past its prologue.
    pub(crate) fn read(tag: Tag, reader: &mut BinaryReader<'_>) -> Result<Self> {
        let base = PaneBase::read(reader)?;
        let kind = match tag {
            Tag::PANE => PaneKind::Base,
            Tag::PICTURE => PaneKind::Picture(PicturePane::read(reader)?),
            Tag::TEXT => PaneKind::Text(TextPane::read(reader)?),
            Tag::BOUNDS => PaneKind::Bounds,
            Tag::PARTS => PaneKind::Parts {
                extra: reader.remaining_bytes().to_vec(),
            },
            Tag::WINDOW => PaneKind::Window(WindowPane::read(reader)?),
            other => {
                return Err(Error::UnknownPane { tag: other });
            }
        };

        Ok(Self {
            base,
            kind,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Encode the pane record body. `section_start` is the position of the
    /// section tag, which record-relative offsets are measured from.
    pub(crate) fn write(&self, writer: &mut BinaryWriter, section_start: usize) -> Result<()> {
        self.base.write(writer)?;
        match &self.kind {
            PaneKind::Base | PaneKind::Bounds => Ok(()),
            PaneKind::Picture(picture) => picture.write(writer),
            PaneKind::Text(text) => text.write(writer, section_start),
            PaneKind::Parts { extra } => {
                writer.write_bytes(extra);
                Ok(())
            }
            PaneKind::Window(window) => window.write(writer, section_start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyt_common::Endian;

    fn encode(pane: &Pane, endian: Endian) -> Vec<u8> {
        let mut writer = BinaryWriter::new(endian);
        writer.write_bytes(pane.tag().as_bytes());
        writer.write_u32(0);
        pane.write(&mut writer, 0).unwrap();
        writer.into_inner()
    }

    fn decode(bytes: &[u8], endian: Endian) -> Pane {
        let mut reader = BinaryReader::new_at(bytes, SectionPrologue::SIZE, endian);
        let tag = Tag::new([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Pane::read(tag, &mut reader).unwrap()
    }

    #[test]
    fn test_base_record_size() {
        let pane = Pane::new("RootPane", PaneKind::Base);
        assert_eq!(encode(&pane, Endian::Big).len(), PANE_BASE_END);
    }

    #[test]
    fn test_base_round_trip() {
        let mut pane = Pane::new("N_Cursor", PaneKind::Bounds);
        pane.base.user_data = "ud".to_string();
        pane.base.translate = Vec3::new(12.0, -40.5, 0.0);
        pane.base.rotate = Vec3::new(0.0, 0.0, 90.0);
        pane.base.scale = Vec2::new(2.0, 0.5);
        pane.base.width = 64.0;
        pane.base.height = 32.0;
        pane.base.alpha = 0x80;

        for endian in [Endian::Big, Endian::Little] {
            let decoded = decode(&encode(&pane, endian), endian);
            assert_eq!(decoded.base, pane.base);
            assert_eq!(decoded.kind, PaneKind::Bounds);
        }
    }

    #[test]
    fn test_flag_accessors() {
        let mut base = PaneBase::new("P");
        assert!(base.visible());
        base.set_visible(false);
        base.set_influence_alpha(true);
        assert_eq!(base.flags, 0x2);

        base.set_origin(HorizontalOrigin::Left, VerticalOrigin::Bottom);
        base.set_parent_origin(HorizontalOrigin::Right, VerticalOrigin::Top);
        assert_eq!(base.origin, 0b0110_1001);
        assert_eq!(base.origin_x(), HorizontalOrigin::Left);
        assert_eq!(base.origin_y(), VerticalOrigin::Bottom);
        assert_eq!(base.parent_origin_x(), HorizontalOrigin::Right);
        assert_eq!(base.parent_origin_y(), VerticalOrigin::Top);
    }

    #[test]
    fn test_name_too_long() {
        let pane = Pane::new("a_name_much_longer_than_the_slot", PaneKind::Base);
        let mut writer = BinaryWriter::new(Endian::Big);
        assert!(matches!(
            pane.write(&mut writer, 0),
            Err(Error::Common(flyt_common::Error::StringTooLong { .. }))
        ));
    }

    #[test]
    fn test_parts_keeps_trailing_bytes() {
        let pane = Pane::new(
            "P_Button",
            PaneKind::Parts {
                extra: vec![0, 0, 0, 2, 0x3F, 0x80, 0, 0],
            },
        );
        let decoded = decode(&encode(&pane, Endian::Big), Endian::Big);
        assert_eq!(decoded.kind, pane.kind);
    }

    #[test]
    fn test_truncated_base() {
        let bytes = encode(&Pane::new("P", PaneKind::Base), Endian::Big);
        let mut reader = BinaryReader::new_at(&bytes[..40], SectionPrologue::SIZE, Endian::Big);
        assert!(matches!(
            Pane::read(Tag::PANE, &mut reader),
            Err(Error::TruncatedData { .. })
        ));
    }
}
