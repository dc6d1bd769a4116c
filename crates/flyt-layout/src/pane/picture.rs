//! Picture pane (`pic1`) and the texture-coordinate quads it shares with
//! window content.

use flyt_common::{BinaryReader, BinaryWriter, Color8, Vec2};

use crate::{Error, Result};

/// Texture coordinates for the four corners of a quad.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TexCoord {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

impl Default for TexCoord {
    fn default() -> Self {
        Self {
            top_left: Vec2::new(0.0, 0.0),
            top_right: Vec2::new(1.0, 0.0),
            bottom_left: Vec2::new(0.0, 1.0),
            bottom_right: Vec2::new(1.0, 1.0),
        }
    }
}

impl TexCoord {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            top_left: reader.read_vec2()?,
            top_right: reader.read_vec2()?,
            bottom_left: reader.read_vec2()?,
            bottom_right: reader.read_vec2()?,
        })
    }

    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_vec2(self.top_left);
        writer.write_vec2(self.top_right);
        writer.write_vec2(self.bottom_left);
        writer.write_vec2(self.bottom_right);
    }
}

/// Per-corner vertex colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VertexColors {
    pub top_left: Color8,
    pub top_right: Color8,
    pub bottom_left: Color8,
    pub bottom_right: Color8,
}

impl VertexColors {
    pub const fn uniform(color: Color8) -> Self {
        Self {
            top_left: color,
            top_right: color,
            bottom_left: color,
            bottom_right: color,
        }
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            top_left: reader.read_color()?,
            top_right: reader.read_color()?,
            bottom_left: reader.read_color()?,
            bottom_right: reader.read_color()?,
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter) {
        writer.write_color(self.top_left);
        writer.write_color(self.top_right);
        writer.write_color(self.bottom_left);
        writer.write_color(self.bottom_right);
    }
}

/// Read `material index, u8 count, pad, quads[count]`.
pub(crate) fn read_material_and_quads(reader: &mut BinaryReader<'_>) -> Result<(u16, Vec<TexCoord>)> {
    let material_index = reader.read_u16()?;
    let count = reader.read_u8()? as usize;
    reader.advance(1);
    let tex_coords = (0..count)
        .map(|_| TexCoord::read(reader))
        .collect::<Result<Vec<_>>>()?;
    Ok((material_index, tex_coords))
}

pub(crate) fn write_material_and_quads(
    writer: &mut BinaryWriter,
    material_index: u16,
    tex_coords: &[TexCoord],
) -> Result<()> {
    let count = u8::try_from(tex_coords.len()).map_err(|_| Error::TooMany {
        what: "texture coordinate sets",
        count: tex_coords.len(),
        max: u8::MAX as usize,
    })?;
    writer.write_u16(material_index);
    writer.write_u8(count);
    writer.write_u8(0);
    for quad in tex_coords {
        quad.write(writer);
    }
    Ok(())
}

/// A textured quad.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PicturePane {
    pub vertex_colors: VertexColors,
    pub material_index: u16,
    pub tex_coords: Vec<TexCoord>,
}

impl Default for PicturePane {
    fn default() -> Self {
        Self {
            vertex_colors: VertexColors::uniform(Color8::WHITE),
            material_index: 0,
            tex_coords: vec![TexCoord::default()],
        }
    }
}

impl PicturePane {
    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let vertex_colors = VertexColors::read(reader)?;
        let (material_index, tex_coords) = read_material_and_quads(reader)?;
        Ok(Self {
            vertex_colors,
            material_index,
            tex_coords,
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        self.vertex_colors.write(writer);
        write_material_and_quads(writer, self.material_index, &self.tex_coords)
    }
}
