//! XML rendering of a decoded layout.

use std::fmt::Display;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::document::LayoutDocument;
use crate::group::{Group, GroupId};
use crate::material::Material;
use crate::pane::{Pane, PaneId, PaneKind};
use crate::{Error, Result};

fn xml_err(err: impl Display) -> Error {
    Error::Xml(err.to_string())
}

fn push(elem: &mut BytesStart<'_>, key: &str, value: impl Display) {
    elem.push_attribute((key, value.to_string().as_str()));
}

fn vec3(v: flyt_common::Vec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

fn vec2(v: flyt_common::Vec2) -> String {
    format!("{} {}", v.x, v.y)
}

impl LayoutDocument {
    /// Convert to an XML string.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut output = Vec::new();
        self.write_xml(&mut output)?;
        String::from_utf8(output).map_err(xml_err)
    }

    /// Write XML to a writer.
    pub fn write_xml<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut xml = Writer::new_with_indent(writer, b' ', 2);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_err)?;

        let mut root = BytesStart::new("flyt");
        push(&mut root, "version", self.version);
        push(&mut root, "endian", format!("{:?}", self.endian).to_lowercase());
        xml.write_event(Event::Start(root)).map_err(xml_err)?;

        let mut layout = BytesStart::new("layout");
        push(&mut layout, "name", &self.layout.name);
        push(&mut layout, "width", self.layout.width);
        push(&mut layout, "height", self.layout.height);
        push(&mut layout, "drawFromCenter", self.layout.draw_from_center);
        push(&mut layout, "maxPartsWidth", self.layout.max_parts_width);
        push(&mut layout, "maxPartsHeight", self.layout.max_parts_height);
        xml.write_event(Event::Empty(layout)).map_err(xml_err)?;

        self.write_name_list(&mut xml, "textures", "texture", &self.textures)?;
        self.write_name_list(&mut xml, "fonts", "font", &self.fonts)?;

        xml.write_event(Event::Start(BytesStart::new("materials")))
            .map_err(xml_err)?;
        for material in &self.materials {
            self.write_material(&mut xml, material)?;
        }
        xml.write_event(Event::End(BytesEnd::new("materials")))
            .map_err(xml_err)?;

        xml.write_event(Event::Start(BytesStart::new("panes")))
            .map_err(xml_err)?;
        if let Some(root) = self.root_pane_id() {
            self.write_pane(&mut xml, root)?;
        }
        xml.write_event(Event::End(BytesEnd::new("panes")))
            .map_err(xml_err)?;

        xml.write_event(Event::Start(BytesStart::new("groups")))
            .map_err(xml_err)?;
        if let Some(root) = self.root_group_id() {
            self.write_group(&mut xml, root)?;
        }
        xml.write_event(Event::End(BytesEnd::new("groups")))
            .map_err(xml_err)?;

        for section in &self.opaque_sections {
            let mut elem = BytesStart::new("section");
            push(&mut elem, "tag", section.tag);
            push(&mut elem, "size", section.data.len());
            push(&mut elem, "after", section.anchor);
            xml.write_event(Event::Empty(elem)).map_err(xml_err)?;
        }

        xml.write_event(Event::End(BytesEnd::new("flyt")))
            .map_err(xml_err)?;
        Ok(())
    }

    fn write_name_list<W: Write>(
        &self,
        xml: &mut Writer<W>,
        list: &str,
        item: &str,
        names: &[String],
    ) -> Result<()> {
        if names.is_empty() {
            return xml
                .write_event(Event::Empty(BytesStart::new(list)))
                .map_err(xml_err);
        }
        xml.write_event(Event::Start(BytesStart::new(list)))
            .map_err(xml_err)?;
        for (index, name) in names.iter().enumerate() {
            let mut elem = BytesStart::new(item);
            push(&mut elem, "index", index);
            push(&mut elem, "name", name);
            xml.write_event(Event::Empty(elem)).map_err(xml_err)?;
        }
        xml.write_event(Event::End(BytesEnd::new(list)))
            .map_err(xml_err)?;
        Ok(())
    }

    fn write_material<W: Write>(&self, xml: &mut Writer<W>, material: &Material) -> Result<()> {
        let mut elem = BytesStart::new("material");
        push(&mut elem, "name", &material.name);
        push(&mut elem, "foreColor", material.fore_color.to_hex());
        push(&mut elem, "backColor", material.back_color.to_hex());
        push(&mut elem, "flags", format!("{:#010x}", material.flags()));
        xml.write_event(Event::Start(elem)).map_err(xml_err)?;

        for texture in &material.texture_refs {
            let mut elem = BytesStart::new("texture");
            // A dangling reference is still worth showing.
            match self.texture_name(texture) {
                Ok(name) => push(&mut elem, "name", name),
                Err(_) => push(&mut elem, "index", texture.index),
            }
            push(&mut elem, "wrapU", format!("{:?}", texture.wrap_u()));
            push(&mut elem, "wrapV", format!("{:?}", texture.wrap_v()));
            push(&mut elem, "minFilter", format!("{:?}", texture.min_filter()));
            push(&mut elem, "magFilter", format!("{:?}", texture.mag_filter()));
            xml.write_event(Event::Empty(elem)).map_err(xml_err)?;
        }
        for transform in &material.texture_transforms {
            let mut elem = BytesStart::new("transform");
            push(&mut elem, "translate", vec2(transform.translate));
            push(&mut elem, "rotate", transform.rotate);
            push(&mut elem, "scale", vec2(transform.scale));
            xml.write_event(Event::Empty(elem)).map_err(xml_err)?;
        }

        xml.write_event(Event::End(BytesEnd::new("material")))
            .map_err(xml_err)?;
        Ok(())
    }

    fn pane_element(&self, pane: &Pane) -> BytesStart<'static> {
        let base = &pane.base;
        let mut elem = BytesStart::new(pane.kind.type_name());
        push(&mut elem, "name", &base.name);
        if !base.user_data.is_empty() {
            push(&mut elem, "userData", &base.user_data);
        }
        push(&mut elem, "visible", base.visible());
        push(&mut elem, "alpha", base.alpha);
        push(&mut elem, "translate", vec3(base.translate));
        push(&mut elem, "rotate", vec3(base.rotate));
        push(&mut elem, "scale", vec2(base.scale));
        push(&mut elem, "size", format!("{} {}", base.width, base.height));

        if let Some(index) = pane.material_index() {
            match self.material(index) {
                Ok(material) => push(&mut elem, "material", &material.name),
                Err(_) => push(&mut elem, "materialIndex", index),
            }
        }
        match &pane.kind {
            PaneKind::Picture(picture) => push(&mut elem, "texCoords", picture.tex_coords.len()),
            PaneKind::Text(text) => {
                if let Ok(font) = self.font(text.font_index) {
                    push(&mut elem, "font", font);
                }
                push(&mut elem, "fontSize", vec2(text.font_size));
            }
            PaneKind::Window(window) => push(&mut elem, "frames", window.frames.len()),
            PaneKind::Parts { extra } => push(&mut elem, "extraBytes", extra.len()),
            PaneKind::Base | PaneKind::Bounds => {}
        }
        elem
    }

    fn write_pane<W: Write>(&self, xml: &mut Writer<W>, id: PaneId) -> Result<()> {
        let Some(pane) = self.pane(id) else {
            return Ok(());
        };
        let elem = self.pane_element(pane);
        let text = match &pane.kind {
            PaneKind::Text(text) if !text.text.is_empty() => Some(text.text.as_str()),
            _ => None,
        };

        if pane.children().is_empty() && text.is_none() {
            return xml.write_event(Event::Empty(elem)).map_err(xml_err);
        }

        xml.write_event(Event::Start(elem)).map_err(xml_err)?;
        if let Some(text) = text {
            xml.write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_err)?;
        }
        for &child in pane.children() {
            self.write_pane(xml, child)?;
        }
        xml.write_event(Event::End(BytesEnd::new(pane.kind.type_name())))
            .map_err(xml_err)?;
        Ok(())
    }

    fn write_group<W: Write>(&self, xml: &mut Writer<W>, id: GroupId) -> Result<()> {
        let Some(group) = self.group(id) else {
            return Ok(());
        };
        let mut elem = BytesStart::new("group");
        push(&mut elem, "name", &group.name);

        if group.panes.is_empty() && group.children().is_empty() {
            return xml.write_event(Event::Empty(elem)).map_err(xml_err);
        }

        xml.write_event(Event::Start(elem)).map_err(xml_err)?;
        for name in &group.panes {
            let mut member = BytesStart::new("member");
            push(&mut member, "pane", name);
            xml.write_event(Event::Empty(member)).map_err(xml_err)?;
        }
        for &child in Group::children(group) {
            self.write_group(xml, child)?;
        }
        xml.write_event(Event::End(BytesEnd::new("group")))
            .map_err(xml_err)?;
        Ok(())
    }
}
