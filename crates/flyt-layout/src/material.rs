//! Material list (`mat1`) and the records it holds.
//!
//! A material's texture-reference and texture-transform counts are not stored
//! as counts: they live in the low four bits of the material's flags word.
//! The arrays are the source of truth in memory and the flags word is rebuilt
//! from their lengths every time a material is written.

use flyt_common::{BinaryReader, BinaryWriter, Color8, Vec2};

use crate::header::{SectionPrologue, Version};
use crate::{Error, Result};

/// Size of the material name slot.
pub const MATERIAL_NAME_LEN: usize = 0x1C;

/// First major version that stores the flags word before the colors.
///
/// Provisional: derived from observed files, not from a format table.
pub const MATERIAL_FLAGS_FIRST_MAJOR: u8 = 8;

/// Largest count the 2-bit fields can express.
pub const MAX_TEXTURE_REFS: usize = 3;
pub const MAX_TEXTURE_TRANSFORMS: usize = 3;

const COUNT_MASK: u32 = 0xF;

/// Texture wrap mode along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum WrapMode {
    Clamp,
    Repeat,
    Mirror,
    Unknown(u8),
}

impl WrapMode {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::Clamp,
            1 => Self::Repeat,
            2 => Self::Mirror,
            other => Self::Unknown(other),
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Clamp => 0,
            Self::Repeat => 1,
            Self::Mirror => 2,
            Self::Unknown(bits) => bits & 0x3,
        }
    }
}

/// Texture filter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FilterMode {
    Near,
    Linear,
    Unknown(u8),
}

impl FilterMode {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::Near,
            1 => Self::Linear,
            other => Self::Unknown(other),
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Near => 0,
            Self::Linear => 1,
            Self::Unknown(bits) => bits & 0x3,
        }
    }
}

/// Reference from a material to an entry of the texture table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextureRef {
    /// Index into the texture table, or [`TextureRef::NONE`].
    pub index: i16,
    /// Wrap mode (bits 0-1) and minification filter (bits 2-3) for U.
    pub flags_u: u8,
    /// Wrap mode (bits 0-1) and magnification filter (bits 2-3) for V.
    pub flags_v: u8,
}

impl TextureRef {
    /// Sentinel index meaning "no texture".
    pub const NONE: i16 = -1;

    pub const fn new(index: i16) -> Self {
        Self {
            index,
            flags_u: 0,
            flags_v: 0,
        }
    }

    pub const fn is_none(&self) -> bool {
        self.index == Self::NONE
    }

    pub const fn wrap_u(&self) -> WrapMode {
        WrapMode::from_bits(self.flags_u)
    }

    pub const fn wrap_v(&self) -> WrapMode {
        WrapMode::from_bits(self.flags_v)
    }

    pub const fn min_filter(&self) -> FilterMode {
        FilterMode::from_bits(self.flags_u >> 2)
    }

    pub const fn mag_filter(&self) -> FilterMode {
        FilterMode::from_bits(self.flags_v >> 2)
    }

    pub fn set_wrap(&mut self, u: WrapMode, v: WrapMode) {
        self.flags_u = (self.flags_u & !0x3) | u.bits();
        self.flags_v = (self.flags_v & !0x3) | v.bits();
    }

    pub fn set_filter(&mut self, min: FilterMode, mag: FilterMode) {
        self.flags_u = (self.flags_u & !0xC) | (min.bits() << 2);
        self.flags_v = (self.flags_v & !0xC) | (mag.bits() << 2);
    }

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            index: reader.read_i16()?,
            flags_u: reader.read_u8()?,
            flags_v: reader.read_u8()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_i16(self.index);
        writer.write_u8(self.flags_u);
        writer.write_u8(self.flags_v);
    }
}

/// 2D transform applied to texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextureTransform {
    pub translate: Vec2,
    pub rotate: f32,
    pub scale: Vec2,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotate: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl TextureTransform {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            translate: reader.read_vec2()?,
            rotate: reader.read_f32()?,
            scale: reader.read_vec2()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_vec2(self.translate);
        writer.write_f32(self.rotate);
        writer.write_vec2(self.scale);
    }
}

/// Shared rendering attributes referenced by panes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Material {
    pub name: String,
    pub fore_color: Color8,
    pub back_color: Color8,
    /// Flags word with the count bits cleared.
    raw_flags: u32,
    /// Word that follows the flags in newer versions.
    pub reserved: i32,
    pub texture_refs: Vec<TextureRef>,
    pub texture_transforms: Vec<TextureTransform>,
    /// Remainder of the record (stages this crate does not interpret).
    pub extra: Vec<u8>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fore_color: Color8::BLACK,
            back_color: Color8::WHITE,
            raw_flags: 0,
            reserved: 0,
            texture_refs: Vec::new(),
            texture_transforms: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Texture-reference count encoded in a flags word.
    pub const fn texture_count(flags: u32) -> usize {
        (flags & 0x3) as usize
    }

    /// Texture-transform count encoded in a flags word.
    pub const fn transform_count(flags: u32) -> usize {
        ((flags >> 2) & 0x3) as usize
    }

    /// The flags word as it will be written: upper bits as read, count bits
    /// taken from the live arrays (clamped to their 2-bit fields).
    pub fn flags(&self) -> u32 {
        let textures = self.texture_refs.len().min(MAX_TEXTURE_REFS) as u32;
        let transforms = self.texture_transforms.len().min(MAX_TEXTURE_TRANSFORMS) as u32;
        (self.raw_flags & !COUNT_MASK) | textures | (transforms << 2)
    }

    /// Replace the upper flag bits. The count bits are always derived.
    pub fn set_flags(&mut self, flags: u32) {
        self.raw_flags = flags & !COUNT_MASK;
    }

    fn flags_first(version: Version) -> bool {
        version.major >= MATERIAL_FLAGS_FIRST_MAJOR
    }

    /// Read one material record ending at `end` (exclusive).
    pub(crate) fn read(reader: &mut BinaryReader<'_>, version: Version, end: usize) -> Result<Self> {
        let name = reader.read_fixed_string(MATERIAL_NAME_LEN)?.to_string();

        let (raw_flags, reserved, fore_color, back_color) = if Self::flags_first(version) {
            let flags = reader.read_u32()?;
            let reserved = reader.read_i32()?;
            (flags, reserved, reader.read_color()?, reader.read_color()?)
        } else {
            let fore = reader.read_color()?;
            let back = reader.read_color()?;
            (reader.read_u32()?, 0, fore, back)
        };

        let texture_refs = (0..Self::texture_count(raw_flags))
            .map(|_| TextureRef::read(reader))
            .collect::<Result<Vec<_>>>()?;
        let texture_transforms = (0..Self::transform_count(raw_flags))
            .map(|_| TextureTransform::read(reader))
            .collect::<Result<Vec<_>>>()?;

        let extra = reader
            .read_bytes(end.saturating_sub(reader.position()))?
            .to_vec();

        Ok(Self {
            name,
            fore_color,
            back_color,
            raw_flags: raw_flags & !COUNT_MASK,
            reserved,
            texture_refs,
            texture_transforms,
            extra,
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter, version: Version) -> Result<()> {
        if self.texture_refs.len() > MAX_TEXTURE_REFS {
            return Err(Error::TooMany {
                what: "texture references",
                count: self.texture_refs.len(),
                max: MAX_TEXTURE_REFS,
            });
        }
        if self.texture_transforms.len() > MAX_TEXTURE_TRANSFORMS {
            return Err(Error::TooMany {
                what: "texture transforms",
                count: self.texture_transforms.len(),
                max: MAX_TEXTURE_TRANSFORMS,
            });
        }

        writer.write_fixed_string(&self.name, MATERIAL_NAME_LEN)?;
        if Self::flags_first(version) {
            writer.write_u32(self.flags());
            writer.write_i32(self.reserved);
            writer.write_color(self.fore_color);
            writer.write_color(self.back_color);
        } else {
            writer.write_color(self.fore_color);
            writer.write_color(self.back_color);
            writer.write_u32(self.flags());
        }

        for texture in &self.texture_refs {
            texture.write(writer);
        }
        for transform in &self.texture_transforms {
            transform.write(writer);
        }
        writer.write_bytes(&self.extra);
        Ok(())
    }
}

/// Read a `mat1` section. The reader is positioned just past the prologue
/// and bounded to the section.
pub(crate) fn read_material_list(reader: &mut BinaryReader<'_>, version: Version) -> Result<Vec<Material>> {
    let section_start = reader.position() - SectionPrologue::SIZE;
    let count = reader.read_u16()? as usize;
    reader.advance(2);

    let offsets: Vec<usize> = reader
        .read_u32s(count)?
        .into_iter()
        .map(|offset| section_start + offset as usize)
        .collect();

    // A record runs until the next record (in file order) or the section end.
    let mut boundaries = offsets.clone();
    boundaries.sort_unstable();
    let section_end = reader.len();

    offsets
        .iter()
        .map(|&start| {
            let end = boundaries
                .iter()
                .copied()
                .find(|&b| b > start)
                .unwrap_or(section_end);
            reader.scoped(start, |r| Material::read(r, version, end))
        })
        .collect()
}

/// Write the body of a `mat1` section starting at `section_start`.
pub(crate) fn write_material_list(
    writer: &mut BinaryWriter,
    materials: &[Material],
    version: Version,
    section_start: usize,
) -> Result<()> {
    let count = u16::try_from(materials.len()).map_err(|_| Error::TooMany {
        what: "materials",
        count: materials.len(),
        max: u16::MAX as usize,
    })?;
    writer.write_u16(count);
    writer.write_zeros(2);

    let slots: Vec<_> = materials.iter().map(|_| writer.reserve_u32()).collect();
    for (slot, material) in slots.into_iter().zip(materials) {
        writer.patch_offset_here(slot, section_start)?;
        material.write(writer, version)?;
    }
    Ok(())
}
