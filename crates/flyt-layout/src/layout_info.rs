//! Layout info (`lyt1`): canvas metrics.

use flyt_common::{BinaryReader, BinaryWriter};

use crate::Result;

/// Canvas metrics shared by the whole layout.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayoutInfo {
    /// Whether pane positions are relative to the canvas center.
    pub draw_from_center: bool,
    pub width: f32,
    pub height: f32,
    pub max_parts_width: f32,
    pub max_parts_height: f32,
    /// Layout name.
    pub name: String,
}

impl LayoutInfo {
    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let draw_from_center = reader.read_bool()?;
        reader.advance(3);
        let width = reader.read_f32()?;
        let height = reader.read_f32()?;
        let max_parts_width = reader.read_f32()?;
        let max_parts_height = reader.read_f32()?;
        // Older files stop after the metrics.
        let name = if reader.is_empty() {
            String::new()
        } else {
            reader.read_cstring()?.to_string()
        };

        Ok(Self {
            draw_from_center,
            width,
            height,
            max_parts_width,
            max_parts_height,
            name,
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter) {
        writer.write_bool(self.draw_from_center);
        writer.write_zeros(3);
        writer.write_f32(self.width);
        writer.write_f32(self.height);
        writer.write_f32(self.max_parts_width);
        writer.write_f32(self.max_parts_height);
        writer.write_cstring(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyt_common::Endian;

    #[test]
    fn test_layout_info_round_trip() {
        let info = LayoutInfo {
            draw_from_center: true,
            width: 1280.0,
            height: 720.0,
            max_parts_width: 0.0,
            max_parts_height: 0.0,
            name: "Title".to_string(),
        };

        let mut writer = BinaryWriter::new(Endian::Big);
        info.write(&mut writer);
        let mut reader = BinaryReader::new(writer.as_slice());
        assert_eq!(LayoutInfo::read(&mut reader).unwrap(), info);
    }

    #[test]
    fn test_layout_info_without_name() {
        let mut writer = BinaryWriter::new(Endian::Big);
        writer.write_bool(false);
        writer.write_zeros(3);
        for v in [400.0, 240.0, 0.0, 0.0] {
            writer.write_f32(v);
        }
        let mut reader = BinaryReader::new(writer.as_slice());
        let info = LayoutInfo::read(&mut reader).unwrap();
        assert_eq!(info.width, 400.0);
        assert!(info.name.is_empty());
    }
}
