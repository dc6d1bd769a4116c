//! Texture (`txl1`) and font (`fnl1`) name tables.
//!
//! Both tables share one layout:
//!
//! ```text
//! u16 count
//! u16 padding
//! u32 offsets[count]     // relative to the start of this offset array
//! char names[]           // null-terminated, in table order
//! ```
//!
//! On write the offset array is reserved first, the names appended, and each
//! reserved offset patched with the distance from the array start to its name.

use flyt_common::{BinaryReader, BinaryWriter};

use crate::{Error, Result};

/// Read a name table positioned at its count field.
pub(crate) fn read_name_table(reader: &mut BinaryReader<'_>) -> Result<Vec<String>> {
    let count = reader.read_u16()? as usize;
    reader.advance(2);

    let table_start = reader.position();
    let offsets = reader.read_u32s(count)?;

    offsets
        .into_iter()
        .map(|offset| -> Result<String> {
            let name = reader.cstring_at(table_start + offset as usize)?;
            Ok(name.to_string())
        })
        .collect()
}

/// Write a name table.
pub(crate) fn write_name_table(
    writer: &mut BinaryWriter,
    names: &[String],
    what: &'static str,
) -> Result<()> {
    let count = u16::try_from(names.len()).map_err(|_| Error::TooMany {
        what,
        count: names.len(),
        max: u16::MAX as usize,
    })?;
    writer.write_u16(count);
    writer.write_zeros(2);

    let table_start = writer.position();
    let slots: Vec<_> = names.iter().map(|_| writer.reserve_u32()).collect();

    for (slot, name) in slots.into_iter().zip(names) {
        writer.patch_offset_here(slot, table_start)?;
        writer.write_cstring(name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyt_common::Endian;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_name_table_round_trip() {
        let textures = names(&["bg_00^d", "icon_a^s", ""]);
        let mut writer = BinaryWriter::new(Endian::Big);
        write_name_table(&mut writer, &textures, "textures").unwrap();

        let mut reader = BinaryReader::new(writer.as_slice());
        assert_eq!(read_name_table(&mut reader).unwrap(), textures);
    }

    #[test]
    fn test_offsets_point_at_names() {
        let fonts = names(&["nintendo_NTLG-DB_001.bffnt", "cbf_std.bffnt"]);
        let mut writer = BinaryWriter::new(Endian::Little);
        write_name_table(&mut writer, &fonts, "fonts").unwrap();
        let bytes = writer.into_inner();

        let mut reader = BinaryReader::new_at(&bytes, 4, Endian::Little);
        for name in &fonts {
            let offset = reader.read_u32().unwrap() as usize;
            assert_eq!(&bytes[4 + offset..4 + offset + name.len()], name.as_bytes());
        }
    }

    #[test]
    fn test_offset_past_end_is_truncation() {
        let mut writer = BinaryWriter::new(Endian::Big);
        writer.write_u16(1);
        writer.write_zeros(2);
        writer.write_u32(0x100);
        let mut reader = BinaryReader::new(writer.as_slice());
        assert!(matches!(
            read_name_table(&mut reader),
            Err(Error::TruncatedData { .. })
        ));
    }

    #[test]
    fn test_count_past_end_is_truncation() {
        let mut writer = BinaryWriter::new(Endian::Big);
        writer.write_u16(50);
        writer.write_zeros(2);
        let mut reader = BinaryReader::new(writer.as_slice());
        assert!(matches!(
            read_name_table(&mut reader),
            Err(Error::TruncatedData { .. })
        ));
    }
}
