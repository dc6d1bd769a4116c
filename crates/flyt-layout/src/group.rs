//! Group records (`grp1`).
//!
//! A group names a set of panes by their names and nests in its own tree,
//! delimited by `grs1`/`gre1` markers. The record layout changed at major
//! version 5: newer files use a wider name slot and drop the padding after
//! the pane count.

use flyt_common::{BinaryReader, BinaryWriter};

use crate::header::Version;
use crate::pane::PANE_NAME_LEN;
use crate::{Error, Result};

/// First major version with the wide group name slot.
///
/// Provisional: derived from observed files, not from a format table. Decode
/// and encode branch on the same value.
pub const GROUP_WIDE_NAME_MAJOR: u8 = 5;

/// Group name slot before [`GROUP_WIDE_NAME_MAJOR`].
pub const GROUP_NAME_LEN: usize = 0x18;

/// Group name slot from [`GROUP_WIDE_NAME_MAJOR`] on.
pub const GROUP_WIDE_NAME_LEN: usize = 0x22;

/// Index of a group in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A named set of pane references.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Group {
    pub name: String,
    /// Names of member panes. Not validated against the pane tree.
    pub panes: Vec<String>,
    pub(crate) parent: Option<GroupId>,
    pub(crate) children: Vec<GroupId>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub const fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    pub fn children(&self) -> &[GroupId] {
        &self.children
    }

    fn wide_name(version: Version) -> bool {
        version.major >= GROUP_WIDE_NAME_MAJOR
    }

    pub(crate) fn read(reader: &mut BinaryReader<'_>, version: Version) -> Result<Self> {
        let (name, count) = if Self::wide_name(version) {
            let name = reader.read_fixed_string(GROUP_WIDE_NAME_LEN)?;
            (name, reader.read_u16()?)
        } else {
            let name = reader.read_fixed_string(GROUP_NAME_LEN)?;
            let count = reader.read_u16()?;
            reader.advance(2);
            (name, count)
        };

        let panes = (0..count)
            .map(|_| -> Result<String> {
                Ok(reader.read_fixed_string(PANE_NAME_LEN)?.to_string())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            panes,
            parent: None,
            children: Vec::new(),
        })
    }

    pub(crate) fn write(&self, writer: &mut BinaryWriter, version: Version) -> Result<()> {
        let count = u16::try_from(self.panes.len()).map_err(|_| Error::TooMany {
            what: "group members",
            count: self.panes.len(),
            max: u16::MAX as usize,
        })?;

        if Self::wide_name(version) {
            writer.write_fixed_string(&self.name, GROUP_WIDE_NAME_LEN)?;
            writer.write_u16(count);
        } else {
            writer.write_fixed_string(&self.name, GROUP_NAME_LEN)?;
            writer.write_u16(count);
            writer.write_zeros(2);
        }

        for pane in &self.panes {
            writer.write_fixed_string(pane, PANE_NAME_LEN)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyt_common::Endian;

    fn group() -> Group {
        Group {
            name: "G_Buttons".to_string(),
            panes: vec!["B_Ok".to_string(), "B_Cancel".to_string()],
            ..Group::default()
        }
    }

    #[test]
    fn test_group_layout_by_version() {
        let old = Version::new(4, 1, 0, 0);
        let new = Version::new(5, 0, 0, 0);

        let mut writer = BinaryWriter::new(Endian::Big);
        group().write(&mut writer, old).unwrap();
        assert_eq!(writer.position(), 0x1C + 2 * PANE_NAME_LEN);

        let mut writer = BinaryWriter::new(Endian::Big);
        group().write(&mut writer, new).unwrap();
        assert_eq!(writer.position(), 0x24 + 2 * PANE_NAME_LEN);
        assert_eq!(&writer.as_slice()[0x22..0x24], &[0, 2]);
    }

    #[test]
    fn test_group_round_trip() {
        for version in [Version::new(3, 0, 0, 0), Version::new(8, 3, 0, 0)] {
            let mut writer = BinaryWriter::new(Endian::Little);
            group().write(&mut writer, version).unwrap();
            let mut reader = BinaryReader::new_at(writer.as_slice(), 0, Endian::Little);
            assert_eq!(Group::read(&mut reader, version).unwrap(), group());
        }
    }

    #[test]
    fn test_long_name_needs_wide_slot() {
        let group = Group::new("G_AVeryLongGroupNameOfThirty");
        let mut writer = BinaryWriter::new(Endian::Big);
        assert!(group.write(&mut writer, Version::new(4, 0, 0, 0)).is_err());
        let mut writer = BinaryWriter::new(Endian::Big);
        assert!(group.write(&mut writer, Version::new(5, 0, 0, 0)).is_ok());
    }

    #[test]
    fn test_member_count_past_section() {
        let mut writer = BinaryWriter::new(Endian::Big);
        writer.write_fixed_string("G", GROUP_WIDE_NAME_LEN).unwrap();
        writer.write_u16(3);
        writer.write_fixed_string("P_One", PANE_NAME_LEN).unwrap();
        let mut reader = BinaryReader::new(writer.as_slice());
        assert!(matches!(
            Group::read(&mut reader, Version::default()),
            Err(Error::TruncatedData { .. })
        ));
    }
}
