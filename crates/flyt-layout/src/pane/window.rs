//! Window pane (`wnd1`).
//!
//! After its fixed fields a window record holds two offsets, both measured
//! from the section start: one to the content sub-record and one to a table
//! of frame offsets. Sub-records are read with scoped seeks so the cursor is
//! back at the fixed part whatever happens.

use flyt_common::{BinaryReader, BinaryWriter};

use super::picture::{read_material_and_quads, write_material_and_quads, TexCoord, VertexColors};
use crate::{Error, Result};

/// Four edge sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindowInsets {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
}

impl WindowInsets {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            left: reader.read_u16()?,
            right: reader.read_u16()?,
            top: reader.read_u16()?,
            bottom: reader.read_u16()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u16(self.left);
        writer.write_u16(self.right);
        writer.write_u16(self.top);
        writer.write_u16(self.bottom);
    }
}

/// The window's center fill.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindowContent {
    pub vertex_colors: VertexColors,
    pub material_index: u16,
    pub tex_coords: Vec<TexCoord>,
}

impl WindowContent {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let vertex_colors = VertexColors::read(reader)?;
        let (material_index, tex_coords) = read_material_and_quads(reader)?;
        Ok(Self {
            vertex_colors,
            material_index,
            tex_coords,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.vertex_colors.write(writer);
        write_material_and_quads(writer, self.material_index, &self.tex_coords)
    }
}

/// One frame (corner or edge) of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindowFrame {
    pub material_index: u16,
    pub flip: u8,
}

impl WindowFrame {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let material_index = reader.read_u16()?;
        let flip = reader.read_u8()?;
        reader.advance(1);
        Ok(Self {
            material_index,
            flip,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u16(self.material_index);
        writer.write_u8(self.flip);
        writer.write_u8(0);
    }
}

/// A stretchable framed window.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindowPane {
    /// How far the content extends past the pane bounds.
    pub content_inflation: WindowInsets,
    pub frame_size: WindowInsets,
    pub flags: u8,
    pub content: WindowContent,
    pub frames: Vec<WindowFrame>,
}

impl WindowPane {
    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let content_inflation = WindowInsets::read(reader)?;
        let frame_size = WindowInsets::read(reader)?;
        let frame_count = reader.read_u8()? as usize;
        let flags = reader.read_u8()?;
        reader.advance(2);
        let content_offset = reader.read_u32()? as usize;
        let frame_table_offset = reader.read_u32()? as usize;

        let content = reader.scoped(content_offset, WindowContent::read)?;
        let frames = reader.scoped(frame_table_offset, |r| -> Result<Vec<WindowFrame>> {
            let offsets = r.read_u32s(frame_count)?;
            offsets
                .into_iter()
                .map(|offset| r.scoped(offset as usize, WindowFrame::read))
                .collect()
        })?;

        Ok(Self {
            content_inflation,
            frame_size,
            flags,
            content,
            frames,
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter, section_start: usize) -> Result<()> {
        let frame_count = u8::try_from(self.frames.len()).map_err(|_| Error::TooMany {
            what: "window frames",
            count: self.frames.len(),
            max: u8::MAX as usize,
        })?;

        self.content_inflation.write(writer);
        self.frame_size.write(writer);
        writer.write_u8(frame_count);
        writer.write_u8(self.flags);
        writer.write_zeros(2);
        let content_offset = writer.reserve_u32();
        let frame_table_offset = writer.reserve_u32();

        writer.patch_offset_here(content_offset, section_start)?;
        self.content.write(writer)?;

        writer.patch_offset_here(frame_table_offset, section_start)?;
        let slots: Vec<_> = self.frames.iter().map(|_| writer.reserve_u32()).collect();
        for (slot, frame) in slots.into_iter().zip(&self.frames) {
            writer.patch_offset_here(slot, section_start)?;
            frame.write(writer);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::SectionPrologue;
    use flyt_common::{Color8, Endian};

    fn window() -> WindowPane {
        WindowPane {
            content_inflation: WindowInsets {
                left: 4,
                right: 4,
                top: 2,
                bottom: 2,
            },
            frame_size: WindowInsets {
                left: 16,
                right: 16,
                top: 16,
                bottom: 16,
            },
            flags: 0x1,
            content: WindowContent {
                vertex_colors: VertexColors::uniform(Color8::new(10, 20, 30, 255)),
                material_index: 0,
                tex_coords: vec![TexCoord::default()],
            },
            frames: vec![
                WindowFrame {
                    material_index: 1,
                    flip: 0,
                },
                WindowFrame {
                    material_index: 2,
                    flip: 1,
                },
                WindowFrame {
                    material_index: 2,
                    flip: 3,
                },
            ],
        }
    }

    fn encode(pane: &WindowPane) -> Vec<u8> {
        let mut writer = BinaryWriter::new(Endian::Big);
        writer.write_zeros(SectionPrologue::SIZE);
        pane.write(&mut writer, 0).unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_window_round_trip() {
        let pane = window();
        let bytes = encode(&pane);
        let mut reader = BinaryReader::new_at(&bytes, SectionPrologue::SIZE, Endian::Big);
        assert_eq!(WindowPane::read(&mut reader).unwrap(), pane);
        // Cursor is left just past the fixed fields.
        assert_eq!(reader.position(), SectionPrologue::SIZE + 0x1C);
    }

    #[test]
    fn test_offsets_are_section_relative() {
        let pane = window();
        let bytes = encode(&pane);
        let mut reader = BinaryReader::new_at(&bytes, SectionPrologue::SIZE + 0x14, Endian::Big);
        let content = reader.read_u32().unwrap() as usize;
        let table = reader.read_u32().unwrap() as usize;

        assert_eq!(content, SectionPrologue::SIZE + 0x1C);
        assert_eq!(&bytes[content..content + 4], &[10, 20, 30, 255]);
        assert_eq!(table, content + 16 + 4 + 32);

        reader.seek(table);
        let first = reader.read_u32().unwrap() as usize;
        assert_eq!(first, table + 4 * pane.frames.len());
        reader.seek(table + 8);
        let third = reader.read_u32().unwrap() as usize;
        assert_eq!(&bytes[third..third + 4], &[0, 2, 3, 0]);
    }

    #[test]
    fn test_frame_offset_past_section() {
        let mut bytes = encode(&window());
        let table = SectionPrologue::SIZE + 0x1C + 16 + 4 + 32;
        bytes[table..table + 4].copy_from_slice(&0x1000u32.to_be_bytes());
        let mut reader = BinaryReader::new_at(&bytes, SectionPrologue::SIZE, Endian::Big);
        assert!(matches!(
            WindowPane::read(&mut reader),
            Err(Error::TruncatedData { .. })
        ));
    }
}
