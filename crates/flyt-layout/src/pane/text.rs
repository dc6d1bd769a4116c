//! Text box pane (`txt1`).
//!
//! The string itself lives after the fixed record. Its position is a u32
//! offset from the section start, written as a placeholder and patched once
//! the fixed part is complete. Text is UTF-16 in the file's byte order.

use flyt_common::{BinaryReader, BinaryWriter, Color8, Vec2};

use super::{HorizontalOrigin, VerticalOrigin};
use crate::{Error, Result};

const FLAG_SHADOW: u8 = 0x1;
const FLAG_RESTRICTED_LENGTH: u8 = 0x2;
const FLAG_PER_CHARACTER_TRANSFORM: u8 = 0x10;

/// Alignment of lines within the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LineAlignment {
    Unspecified,
    Left,
    Center,
    Right,
    Unknown(u8),
}

impl LineAlignment {
    pub const fn from_byte(value: u8) -> Self {
        match value {
            0 => Self::Unspecified,
            1 => Self::Left,
            2 => Self::Center,
            3 => Self::Right,
            other => Self::Unknown(other),
        }
    }

    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::Left => 1,
            Self::Center => 2,
            Self::Right => 3,
            Self::Unknown(value) => value,
        }
    }
}

/// A text box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextPane {
    pub text: String,
    /// Buffer size in bytes reserved for the text when the length is restricted.
    pub max_text_length: u16,
    pub material_index: u16,
    pub font_index: u16,
    /// Bits 2-3: horizontal alignment. Bits 0-1: vertical alignment.
    pub alignment: u8,
    pub line_alignment: LineAlignment,
    /// Bit 0: shadow. Bit 1: restricted length. Bit 4: per-character transform.
    pub flags: u8,
    pub italic_tilt: f32,
    pub font_fore_color: Color8,
    pub font_back_color: Color8,
    pub font_size: Vec2,
    pub character_space: f32,
    pub line_space: f32,
    pub shadow_offset: Vec2,
    pub shadow_scale: Vec2,
    pub shadow_fore_color: Color8,
    pub shadow_back_color: Color8,
    pub shadow_italic_tilt: f32,
}

impl Default for TextPane {
    fn default() -> Self {
        Self {
            text: String::new(),
            max_text_length: 0,
            material_index: 0,
            font_index: 0,
            alignment: 0,
            line_alignment: LineAlignment::Unspecified,
            flags: 0,
            italic_tilt: 0.0,
            font_fore_color: Color8::WHITE,
            font_back_color: Color8::WHITE,
            font_size: Vec2::new(32.0, 32.0),
            character_space: 0.0,
            line_space: 0.0,
            shadow_offset: Vec2::ZERO,
            shadow_scale: Vec2::ONE,
            shadow_fore_color: Color8::BLACK,
            shadow_back_color: Color8::BLACK,
            shadow_italic_tilt: 0.0,
        }
    }
}

impl TextPane {
    pub const fn horizontal_alignment(&self) -> HorizontalOrigin {
        HorizontalOrigin::from_bits(self.alignment >> 2)
    }

    pub const fn vertical_alignment(&self) -> VerticalOrigin {
        VerticalOrigin::from_bits(self.alignment)
    }

    pub fn set_alignment(&mut self, horizontal: HorizontalOrigin, vertical: VerticalOrigin) {
        self.alignment = (self.alignment & !0xF) | (horizontal.bits() << 2) | vertical.bits();
    }

    pub const fn shadow_enabled(&self) -> bool {
        self.flags & FLAG_SHADOW != 0
    }

    /// Whether the text buffer has the fixed size `max_text_length`.
    pub const fn restricted_length(&self) -> bool {
        self.flags & FLAG_RESTRICTED_LENGTH != 0
    }

    pub fn set_restricted_length(&mut self, restricted: bool) {
        if restricted {
            self.flags |= FLAG_RESTRICTED_LENGTH;
        } else {
            self.flags &= !FLAG_RESTRICTED_LENGTH;
        }
    }

    pub const fn per_character_transform(&self) -> bool {
        self.flags & FLAG_PER_CHARACTER_TRANSFORM != 0
    }

    /// Stored text length: UTF-16 bytes including the terminator, or zero
    /// for empty text.
    pub fn text_length(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            (self.text.encode_utf16().count() + 1) * 2
        }
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let text_length = reader.read_u16()?;
        let max_text_length = reader.read_u16()?;
        let material_index = reader.read_u16()?;
        let font_index = reader.read_u16()?;
        let alignment = reader.read_u8()?;
        let line_alignment = LineAlignment::from_byte(reader.read_u8()?);
        let flags = reader.read_u8()?;
        reader.advance(1);
        let italic_tilt = reader.read_f32()?;
        let text_offset = reader.read_u32()? as usize;

        let mut pane = Self {
            text: String::new(),
            max_text_length,
            material_index,
            font_index,
            alignment,
            line_alignment,
            flags,
            italic_tilt,
            font_fore_color: reader.read_color()?,
            font_back_color: reader.read_color()?,
            font_size: reader.read_vec2()?,
            character_space: reader.read_f32()?,
            line_space: reader.read_f32()?,
            shadow_offset: reader.read_vec2()?,
            shadow_scale: reader.read_vec2()?,
            shadow_fore_color: reader.read_color()?,
            shadow_back_color: reader.read_color()?,
            shadow_italic_tilt: reader.read_f32()?,
        };

        let byte_len = if pane.restricted_length() {
            max_text_length
        } else {
            text_length
        } as usize;
        if text_offset != 0 && byte_len != 0 {
            pane.text = reader.scoped(text_offset, |r| r.read_utf16(byte_len))?;
        }
        Ok(pane)
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter, section_start: usize) -> Result<()> {
        let text_length = writer.reserve_u16();
        writer.write_u16(self.max_text_length);
        writer.write_u16(self.material_index);
        writer.write_u16(self.font_index);
        writer.write_u8(self.alignment);
        writer.write_u8(self.line_alignment.to_byte());
        writer.write_u8(self.flags);
        writer.write_u8(0);
        writer.write_f32(self.italic_tilt);
        let text_offset = writer.reserve_u32();
        writer.write_color(self.font_fore_color);
        writer.write_color(self.font_back_color);
        writer.write_vec2(self.font_size);
        writer.write_f32(self.character_space);
        writer.write_f32(self.line_space);
        writer.write_vec2(self.shadow_offset);
        writer.write_vec2(self.shadow_scale);
        writer.write_color(self.shadow_fore_color);
        writer.write_color(self.shadow_back_color);
        writer.write_f32(self.shadow_italic_tilt);

        // Empty unrestricted text has no buffer: offset and length stay zero.
        if self.text.is_empty() && !self.restricted_length() {
            return Ok(());
        }

        writer.patch_offset_here(text_offset, section_start)?;
        let written = if self.text.is_empty() {
            0
        } else {
            writer.write_utf16(&self.text)
        };
        writer.patch(text_length, written as u32)?;

        if self.restricted_length() {
            let capacity = self.max_text_length as usize;
            if written > capacity {
                return Err(Error::TooMany {
                    what: "text bytes",
                    count: written,
                    max: capacity,
                });
            }
            writer.write_zeros(capacity - written);
        }
        writer.align(4);
        Ok(())
    }
}
