//! FLYT encoder.
//!
//! Sections are emitted in a fixed order: layout info, the non-empty resource
//! tables, the pane tree, then the group tree. Each tree is written in
//! pre-order with a begin/end marker pair around every non-empty child list.
//! Opaque sections are slotted back in right after the recognized section
//! they followed when decoded. When that section is not emitted (an empty
//! table, a childless pane's markers), they follow the closest section
//! that is.

use flyt_common::{BinaryWriter, Placeholder};
use tracing::debug;

use crate::document::{LayoutDocument, OpaqueSection, SectionAnchor};
use crate::group::GroupId;
use crate::header::{RawHeader, Tag};
use crate::material::write_material_list;
use crate::pane::PaneId;
use crate::tables::write_name_table;
use crate::Result;

/// Sections are padded to this boundary.
const SECTION_ALIGNMENT: usize = 4;

struct Encoder<'a> {
    doc: &'a LayoutDocument,
    writer: BinaryWriter,
    sections: usize,
    /// Opaque sections still to be written, in file order.
    opaque: Vec<Option<&'a OpaqueSection>>,
}

impl<'a> Encoder<'a> {
    fn new(doc: &'a LayoutDocument) -> Self {
        Self {
            doc,
            writer: BinaryWriter::with_capacity(doc.endian, 0x1000),
            sections: 0,
            opaque: doc.opaque_sections.iter().map(Some).collect(),
        }
    }

    /// Emit the pending opaque sections anchored at `anchor`, or all of them.
    fn flush_opaque(&mut self, anchor: Option<SectionAnchor>) {
        for slot in &mut self.opaque {
            let Some(section) = *slot else { continue };
            if anchor.is_some_and(|anchor| anchor != section.anchor) {
                continue;
            }
            *slot = None;
            // Verbatim: no padding, so the declared size matches the original.
            self.writer.write_bytes(section.tag.as_bytes());
            self.writer.write_u32((8 + section.data.len()) as u32);
            self.writer.write_bytes(&section.data);
            self.sections += 1;
        }
    }

    fn after(&mut self, anchor: SectionAnchor) {
        self.flush_opaque(Some(anchor));
    }

    fn begin(&mut self, tag: Tag) -> (usize, Placeholder) {
        let start = self.writer.position();
        self.writer.write_bytes(tag.as_bytes());
        (start, self.writer.reserve_u32())
    }

    fn end(&mut self, start: usize, size: Placeholder) -> Result<()> {
        self.writer.align(SECTION_ALIGNMENT);
        self.writer.patch_offset_here(size, start)?;
        self.sections += 1;
        Ok(())
    }

    /// Write one section; `body` receives the writer and the section start.
    fn section(
        &mut self,
        tag: Tag,
        body: impl FnOnce(&mut BinaryWriter, usize) -> Result<()>,
    ) -> Result<()> {
        let (start, size) = self.begin(tag);
        body(&mut self.writer, start)?;
        self.end(start, size)
    }

    fn marker(&mut self, tag: Tag) -> Result<()> {
        self.section(tag, |_, _| Ok(()))
    }

    fn header(&mut self) {
        let doc = self.doc;
        self.writer.write_bytes(RawHeader::MAGIC);
        self.writer.write_bytes(&doc.endian.bom_bytes());
        self.writer.write_u16(RawHeader::SIZE);
        self.writer.write_u32(doc.version.packed());
        // File size and section count are patched at the end.
        self.writer.write_u32(0);
        self.writer.write_u16(0);
        self.writer.write_zeros(2);
    }

    fn pane_tree(&mut self, id: PaneId) -> Result<()> {
        let doc = self.doc;
        let Some(pane) = doc.pane(id) else {
            return Ok(());
        };
        self.section(pane.tag(), |w, start| pane.write(w, start))?;
        self.after(SectionAnchor::Pane(id));

        if pane.children().is_empty() {
            self.after(SectionAnchor::PaneChildren(id));
        } else {
            self.marker(Tag::PANE_START)?;
            self.after(SectionAnchor::PaneChildren(id));
            for &child in pane.children() {
                self.pane_tree(child)?;
            }
            self.marker(Tag::PANE_END)?;
        }
        self.after(SectionAnchor::PaneChildrenEnd(id));
        Ok(())
    }

    fn group_tree(&mut self, id: GroupId) -> Result<()> {
        let doc = self.doc;
        let Some(group) = doc.group(id) else {
            return Ok(());
        };
        self.section(Tag::GROUP, |w, _| group.write(w, doc.version))?;
        self.after(SectionAnchor::Group(id));

        if group.children().is_empty() {
            self.after(SectionAnchor::GroupChildren(id));
        } else {
            self.marker(Tag::GROUP_START)?;
            self.after(SectionAnchor::GroupChildren(id));
            for &child in group.children() {
                self.group_tree(child)?;
            }
            self.marker(Tag::GROUP_END)?;
        }
        self.after(SectionAnchor::GroupChildrenEnd(id));
        Ok(())
    }

    fn encode(mut self) -> Result<Vec<u8>> {
        let doc = self.doc;
        self.header();

        self.after(SectionAnchor::Start);
        self.section(Tag::LAYOUT, |w, _| {
            doc.layout.write(w);
            Ok(())
        })?;
        self.after(SectionAnchor::Resource(Tag::LAYOUT));
        if !doc.textures.is_empty() {
            self.section(Tag::TEXTURE_LIST, |w, _| {
                write_name_table(w, &doc.textures, "textures")
            })?;
        }
        self.after(SectionAnchor::Resource(Tag::TEXTURE_LIST));
        if !doc.fonts.is_empty() {
            self.section(Tag::FONT_LIST, |w, _| write_name_table(w, &doc.fonts, "fonts"))?;
        }
        self.after(SectionAnchor::Resource(Tag::FONT_LIST));
        if !doc.materials.is_empty() {
            self.section(Tag::MATERIAL_LIST, |w, start| {
                write_material_list(w, &doc.materials, doc.version, start)
            })?;
        }
        self.after(SectionAnchor::Resource(Tag::MATERIAL_LIST));
        if let Some(root) = doc.root_pane_id() {
            self.pane_tree(root)?;
        }
        if let Some(root) = doc.root_group_id() {
            self.group_tree(root)?;
        }
        // Anchors that no longer name an emitted section.
        self.flush_opaque(None);

        let file_size = self.writer.position() as u32;
        let sections = u16::try_from(self.sections).map_err(|_| crate::Error::TooMany {
            what: "sections",
            count: self.sections,
            max: u16::MAX as usize,
        })?;
        self.writer
            .patch_u32_at(RawHeader::FILE_SIZE_OFFSET, file_size)?;
        self.writer
            .patch_u16_at(RawHeader::SECTION_COUNT_OFFSET, sections)?;

        debug!(file_size, sections, "encoded layout");
        Ok(self.writer.into_inner())
    }
}

impl LayoutDocument {
    /// Encode the document.
    ///
    /// Material flag counts, text lengths, table offsets and section sizes
    /// are all derived from the document as it is now.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Encoder::new(self).encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;
    use crate::header::SectionPrologue;
    use crate::material::{Material, TextureRef, TextureTransform};
    use crate::pane::{
        Pane, PaneKind, PicturePane, TextPane, WindowContent, WindowFrame, WindowPane,
    };
    use flyt_common::{BinaryReader, Color8, Endian, Vec2, Vec3};

    /// Tags of the encoded section sequence.
    fn section_tags(bytes: &[u8], endian: Endian) -> Vec<Tag> {
        let mut tags = Vec::new();
        let mut offset = RawHeader::SIZE as usize;
        while offset < bytes.len() {
            let mut reader = BinaryReader::new_at(bytes, offset, endian);
            let prologue: SectionPrologue = reader.read_struct().unwrap();
            tags.push(prologue.tag);
            offset += endian.read_u32(&prologue.size) as usize;
        }
        tags
    }

    fn sample(endian: Endian) -> LayoutDocument {
        let mut doc = LayoutDocument::new();
        doc.endian = endian;
        doc.layout.width = 1280.0;
        doc.layout.height = 720.0;
        doc.layout.name = "menu".to_string();
        doc.textures = vec!["bg^d".to_string(), "frame^s".to_string()];
        doc.fonts = vec!["nintendo.bffnt".to_string()];

        let mut material = Material::new("M_Bg");
        material.texture_refs = vec![TextureRef::new(0), TextureRef::new(1)];
        material.texture_transforms = vec![TextureTransform::default()];
        doc.materials = vec![material, Material::new("M_Text")];

        let root = doc.set_root_pane(Pane::new("RootPane", PaneKind::Base));
        let mut bg = Pane::new("P_Bg", PaneKind::Picture(PicturePane::default()));
        bg.base.translate = Vec3::new(0.0, 100.0, 0.0);
        bg.base.width = 1280.0;
        let bg = doc.add_pane(root, bg).unwrap();

        let title = TextPane {
            text: "Options".to_string(),
            material_index: 1,
            font_size: Vec2::new(40.0, 40.0),
            ..TextPane::default()
        };
        doc.add_pane(bg, Pane::new("T_Title", PaneKind::Text(title)))
            .unwrap();

        let window = WindowPane {
            content: WindowContent {
                vertex_colors: crate::pane::VertexColors::uniform(Color8::BLACK),
                ..WindowContent::default()
            },
            frames: vec![WindowFrame::default(); 4],
            ..WindowPane::default()
        };
        doc.add_pane(root, Pane::new("W_Frame", PaneKind::Window(window)))
            .unwrap();
        doc.add_pane(root, Pane::new("N_Hit", PaneKind::Bounds)).unwrap();

        let groups = doc.set_root_group(Group::new("RootGroup"));
        let mut group = Group::new("G_Menu");
        group.panes = vec!["P_Bg".to_string(), "W_Frame".to_string()];
        doc.add_group(groups, group).unwrap();
        doc
    }

    #[test]
    fn test_round_trip() {
        for endian in [Endian::Big, Endian::Little] {
            let doc = sample(endian);
            let bytes = doc.to_bytes().unwrap();
            let decoded = LayoutDocument::parse(&bytes).unwrap();

            assert_eq!(decoded.endian, endian);
            assert_eq!(decoded.version, doc.version);
            assert_eq!(decoded.layout, doc.layout);
            assert_eq!(decoded.textures, doc.textures);
            assert_eq!(decoded.fonts, doc.fonts);
            assert_eq!(decoded.materials, doc.materials);

            let before: Vec<_> = doc.walk_panes().map(|v| (v.depth, v.node)).collect();
            let after: Vec<_> = decoded.walk_panes().map(|v| (v.depth, v.node)).collect();
            assert_eq!(before.len(), after.len());
            for ((d1, p1), (d2, p2)) in before.iter().zip(&after) {
                assert_eq!(d1, d2);
                assert_eq!(p1.base, p2.base);
                assert_eq!(p1.kind, p2.kind);
            }

            let groups: Vec<_> = decoded.groups().map(|g| g.name.as_str()).collect();
            assert_eq!(groups, ["RootGroup", "G_Menu"]);
            assert_eq!(decoded.groups().nth(1).unwrap().panes, ["P_Bg", "W_Frame"]);

            // Encoding the decoded document reproduces the same bytes.
            assert_eq!(decoded.to_bytes().unwrap(), bytes);
        }
    }

    #[test]
    fn test_section_order_and_markers() {
        let bytes = sample(Endian::Big).to_bytes().unwrap();
        let tags: Vec<String> = section_tags(&bytes, Endian::Big)
            .iter()
            .map(Tag::to_string)
            .collect();
        assert_eq!(
            tags,
            [
                "lyt1", "txl1", "fnl1", "mat1", "pan1", "pas1", "pic1", "pas1", "txt1", "pae1",
                "wnd1", "bnd1", "pae1", "grp1", "grs1", "grp1", "gre1"
            ]
        );
    }

    #[test]
    fn test_header_fields() {
        let doc = sample(Endian::Little);
        let bytes = doc.to_bytes().unwrap();
        let endian = Endian::Little;

        assert_eq!(&bytes[..4], b"FLYT");
        assert_eq!(&bytes[4..6], &[0xFF, 0xFE]);
        assert_eq!(endian.read_u16(&bytes[6..8]), RawHeader::SIZE);
        assert_eq!(endian.read_u32(&bytes[8..12]), doc.version.packed());
        assert_eq!(endian.read_u32(&bytes[12..16]) as usize, bytes.len());
        assert_eq!(endian.read_u16(&bytes[16..18]) as usize, 17);
        assert_eq!(bytes.len() % SECTION_ALIGNMENT, 0);
    }

    #[test]
    fn test_material_offsets_land_on_records() {
        let doc = sample(Endian::Big);
        let bytes = doc.to_bytes().unwrap();

        let mut offset = RawHeader::SIZE as usize;
        let mut reader = BinaryReader::new(&bytes);
        loop {
            reader.seek(offset);
            let prologue: SectionPrologue = reader.read_struct().unwrap();
            if prologue.tag == Tag::MATERIAL_LIST {
                break;
            }
            offset += Endian::Big.read_u32(&prologue.size) as usize;
        }
        assert_eq!(reader.read_u16().unwrap(), 2);
        reader.advance(2);
        for material in &doc.materials {
            let record = offset + reader.read_u32().unwrap() as usize;
            let name = &bytes[record..record + material.name.len()];
            assert_eq!(name, material.name.as_bytes());
        }
    }

    #[test]
    fn test_empty_document() {
        let mut doc = LayoutDocument::new();
        doc.set_root_pane(Pane::new("RootPane", PaneKind::Base));
        let bytes = doc.to_bytes().unwrap();

        let decoded = LayoutDocument::parse(&bytes).unwrap();
        assert_eq!(decoded.pane_count(), 1);
        assert!(decoded.textures.is_empty());
        assert!(decoded.materials.is_empty());
        assert!(decoded.root_group().is_none());
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_no_panes() {
        let bytes = LayoutDocument::new().to_bytes().unwrap();
        let decoded = LayoutDocument::parse(&bytes).unwrap();
        assert!(decoded.root_pane().is_none());
        assert_eq!(section_tags(&bytes, Endian::Big).len(), 1);
    }

    #[test]
    fn test_unknown_section_passthrough() {
        let doc = sample(Endian::Big);
        let bytes = doc.to_bytes().unwrap();

        // Splice an XTRA section between txl1 and fnl1.
        let tags = section_tags(&bytes, Endian::Big);
        assert_eq!(tags[1], Tag::TEXTURE_LIST);
        let lyt1_size = Endian::Big.read_u32(&bytes[0x18..0x1C]) as usize;
        let txl1_at = RawHeader::SIZE as usize + lyt1_size;
        let txl1_size = Endian::Big.read_u32(&bytes[txl1_at + 4..txl1_at + 8]) as usize;
        let fnl1_at = txl1_at + txl1_size;

        let xtra: &[u8] = b"XTRA\x00\x00\x00\x10\xDE\xAD\xBE\xEF\x01\x02\x03\x04";
        let mut spliced = bytes[..fnl1_at].to_vec();
        spliced.extend_from_slice(xtra);
        spliced.extend_from_slice(&bytes[fnl1_at..]);
        let count = Endian::Big.read_u16(&bytes[16..18]) + 1;
        spliced[16..18].copy_from_slice(&count.to_be_bytes());

        let decoded = LayoutDocument::parse(&spliced).unwrap();
        assert_eq!(decoded.textures, doc.textures);
        assert_eq!(decoded.fonts, doc.fonts);
        assert_eq!(
            decoded.opaque_sections[0].anchor,
            SectionAnchor::Resource(Tag::TEXTURE_LIST)
        );

        // Re-encoded at the same place, byte for byte. The file size field
        // differs from the spliced input, which was never patched.
        let mut reencoded = decoded.to_bytes().unwrap();
        assert_eq!(&reencoded[fnl1_at..fnl1_at + xtra.len()], xtra);
        reencoded[12..16].copy_from_slice(&spliced[12..16]);
        assert_eq!(reencoded, spliced);
    }

    #[test]
    fn test_window_offsets_in_file() {
        let doc = sample(Endian::Big);
        let bytes = doc.to_bytes().unwrap();
        let decoded = LayoutDocument::parse(&bytes).unwrap();
        let window = decoded.find_pane("W_Frame").unwrap();
        let PaneKind::Window(window) = &decoded.pane(window).unwrap().kind else {
            panic!("W_Frame is not a window");
        };
        assert_eq!(window.frames.len(), 4);
        assert_eq!(window.content.vertex_colors.top_left, Color8::BLACK);
    }
}
