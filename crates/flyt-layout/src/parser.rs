//! FLYT decoder: header, section dispatch and tree reconstruction.

use flyt_common::{BinaryReader, Endian};
use tracing::{debug, warn};

use crate::document::{LayoutDocument, OpaqueSection, SectionAnchor};
use crate::group::{Group, GroupId};
use crate::header::{RawHeader, SectionPrologue, Tag, Version};
use crate::layout_info::LayoutInfo;
use crate::material::read_material_list;
use crate::pane::{Pane, PaneId};
use crate::tables::read_name_table;
use crate::tree::TreeCursor;
use crate::{Error, Result};

/// Check if data starts with the FLYT magic.
pub fn is_flyt(data: &[u8]) -> bool {
    data.starts_with(RawHeader::MAGIC)
}

/// Decoder state for one parse call.
struct Decoder<'a> {
    data: &'a [u8],
    doc: LayoutDocument,
    panes: TreeCursor<PaneId>,
    groups: TreeCursor<GroupId>,
    /// The last recognized section, for placing opaque ones.
    anchor: SectionAnchor,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], endian: Endian, version: Version) -> Self {
        Self {
            data,
            doc: LayoutDocument::with_header(endian, version),
            panes: TreeCursor::new(Tag::PANE_START, Tag::PANE_END),
            groups: TreeCursor::new(Tag::GROUP_START, Tag::GROUP_END),
            anchor: SectionAnchor::Start,
        }
    }

    /// Read the prologue at `start` and return the tag and declared size.
    fn prologue(&self, start: usize) -> Result<(Tag, usize)> {
        let mut reader = BinaryReader::new_at(self.data, start, self.doc.endian);
        let prologue: SectionPrologue = reader.read_struct()?;
        let size = self.doc.endian.read_u32(&prologue.size) as usize;

        let available = self.data.len() - start;
        if size < SectionPrologue::SIZE || size > available {
            return Err(Error::TruncatedData {
                position: start,
                needed: size.max(SectionPrologue::SIZE),
                available,
            });
        }
        Ok((prologue.tag, size))
    }

    fn section(&mut self, start: usize, tag: Tag, size: usize) -> Result<()> {
        let endian = self.doc.endian;
        let version = self.doc.version;
        // Bounded to the declared size; offset 0 is the section tag.
        let mut reader =
            BinaryReader::new_at(&self.data[start..start + size], SectionPrologue::SIZE, endian);

        self.anchor = match tag {
            Tag::LAYOUT => {
                self.doc.layout = LayoutInfo::read(&mut reader)?;
                SectionAnchor::Resource(tag)
            }
            Tag::TEXTURE_LIST => {
                self.doc.textures = read_name_table(&mut reader)?;
                SectionAnchor::Resource(tag)
            }
            Tag::FONT_LIST => {
                self.doc.fonts = read_name_table(&mut reader)?;
                SectionAnchor::Resource(tag)
            }
            Tag::MATERIAL_LIST => {
                self.doc.materials = read_material_list(&mut reader, version)?;
                SectionAnchor::Resource(tag)
            }
            tag if tag.is_pane() => {
                let parent = self.panes.place(tag, start)?;
                let pane = Pane::read(tag, &mut reader)?;
                let id = self.doc.insert_pane(parent, pane);
                self.panes.entered(id);
                SectionAnchor::Pane(id)
            }
            Tag::PANE_START => SectionAnchor::PaneChildren(self.panes.push(start)?),
            Tag::PANE_END => SectionAnchor::PaneChildrenEnd(self.panes.pop(start)?),
            Tag::GROUP => {
                let parent = self.groups.place(tag, start)?;
                let group = Group::read(&mut reader, version)?;
                let id = self.doc.insert_group(parent, group);
                self.groups.entered(id);
                SectionAnchor::Group(id)
            }
            Tag::GROUP_START => SectionAnchor::GroupChildren(self.groups.push(start)?),
            Tag::GROUP_END => SectionAnchor::GroupChildrenEnd(self.groups.pop(start)?),
            _ => {
                warn!(
                    %tag,
                    offset = start,
                    size,
                    after = %self.anchor,
                    "keeping unrecognized section as-is"
                );
                self.doc.opaque_sections.push(OpaqueSection {
                    tag,
                    data: reader.remaining_bytes().to_vec(),
                    anchor: self.anchor,
                });
                self.anchor
            }
        };
        Ok(())
    }

    fn finish(mut self) -> Result<LayoutDocument> {
        let root_pane = self.panes.finish()?;
        let root_group = self.groups.finish()?;
        self.doc.set_root_pane_id(root_pane);
        self.doc.set_root_group_id(root_group);
        Ok(self.doc)
    }
}

impl LayoutDocument {
    /// Decode a FLYT file.
    ///
    /// Decoding is all or nothing: any truncation, bad header or unbalanced
    /// marker aborts with an error and no partial document.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if !is_flyt(data) {
            return Err(Error::BadMagic {
                actual: data[..RawHeader::MAGIC.len().min(data.len())].to_vec(),
            });
        }

        let mut reader = BinaryReader::new(data);
        let header: RawHeader = reader.read_struct()?;

        let bom = u16::from_be_bytes(header.byte_order_mark);
        let endian = Endian::from_bom(bom).ok_or(Error::BadByteOrderMark(bom))?;
        let header_size = endian.read_u16(&header.header_size) as usize;
        let version = Version::from_packed(endian.read_u32(&header.version));
        let section_count = endian.read_u16(&header.section_count) as usize;

        debug!(?endian, %version, section_count, header_size, "FLYT header");

        let mut decoder = Decoder::new(data, endian, version);
        let mut offset = header_size;
        for ordinal in 0..section_count {
            let (tag, size) = decoder.prologue(offset)?;
            debug!(ordinal, %tag, offset, size, "section");
            decoder.section(offset, tag, size)?;
            // Always continue at the declared end, whatever the decoder consumed.
            offset += size;
        }

        let doc = decoder.finish()?;
        debug!(
            panes = doc.pane_count(),
            groups = doc.group_count(),
            opaque = doc.opaque_sections.len(),
            "decoded layout"
        );
        Ok(doc)
    }
}
