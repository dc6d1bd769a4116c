//! The decoded layout document.

use std::fmt;

use flyt_common::Endian;

use crate::group::{Group, GroupId};
use crate::header::{Tag, Version};
use crate::layout_info::LayoutInfo;
use crate::material::{Material, TextureRef};
use crate::pane::{Pane, PaneId};
use crate::tree::PreOrder;
use crate::{Error, Result};

/// A section this crate does not interpret, kept for re-encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OpaqueSection {
    pub tag: Tag,
    /// Payload after the 8-byte prologue.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<u8>,
    /// The recognized section this one followed. Encoding puts it back
    /// right after that section.
    pub anchor: SectionAnchor,
}

/// Where an opaque section sits relative to the recognized sections.
///
/// Several opaque sections with the same anchor keep their file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SectionAnchor {
    /// Before any recognized section.
    #[default]
    Start,
    /// After a resource section (`lyt1`, `txl1`, `fnl1` or `mat1`).
    Resource(Tag),
    /// After a pane's own record.
    Pane(PaneId),
    /// After the `pas1` opening a pane's children.
    PaneChildren(PaneId),
    /// After the `pae1` closing a pane's children.
    PaneChildrenEnd(PaneId),
    /// After a group's own record.
    Group(GroupId),
    /// After the `grs1` opening a group's children.
    GroupChildren(GroupId),
    /// After the `gre1` closing a group's children.
    GroupChildrenEnd(GroupId),
}

impl fmt::Display for SectionAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Resource(tag) => write!(f, "{tag}"),
            Self::Pane(id) => write!(f, "pane {}", id.index()),
            Self::PaneChildren(id) => write!(f, "pane {} {}", id.index(), Tag::PANE_START),
            Self::PaneChildrenEnd(id) => write!(f, "pane {} {}", id.index(), Tag::PANE_END),
            Self::Group(id) => write!(f, "group {}", id.index()),
            Self::GroupChildren(id) => write!(f, "group {} {}", id.index(), Tag::GROUP_START),
            Self::GroupChildrenEnd(id) => write!(f, "group {} {}", id.index(), Tag::GROUP_END),
        }
    }
}

/// A FLYT layout: canvas, resource tables, and the pane and group trees.
///
/// Panes and groups live in arenas owned by the document and refer to each
/// other by [`PaneId`] / [`GroupId`]. A document built in code starts empty;
/// [`set_root_pane`](Self::set_root_pane) creates the root and
/// [`add_pane`](Self::add_pane) attaches children to an existing pane.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayoutDocument {
    pub endian: Endian,
    pub version: Version,
    pub layout: LayoutInfo,
    pub textures: Vec<String>,
    pub fonts: Vec<String>,
    pub materials: Vec<Material>,
    panes: Vec<Pane>,
    root_pane: Option<PaneId>,
    groups: Vec<Group>,
    root_group: Option<GroupId>,
    pub opaque_sections: Vec<OpaqueSection>,
}

impl LayoutDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty document carrying a decoded header's byte order and version.
    pub(crate) fn with_header(endian: Endian, version: Version) -> Self {
        Self {
            endian,
            version,
            ..Self::default()
        }
    }

    // -- panes --

    /// Replace the pane tree with a single root pane.
    pub fn set_root_pane(&mut self, pane: Pane) -> PaneId {
        self.panes.clear();
        let id = self.insert_pane(None, pane);
        self.root_pane = Some(id);
        id
    }

    /// Append `pane` as the last child of `parent`.
    pub fn add_pane(&mut self, parent: PaneId, pane: Pane) -> Result<PaneId> {
        self.check_pane(parent)?;
        Ok(self.insert_pane(Some(parent), pane))
    }

    pub(crate) fn insert_pane(&mut self, parent: Option<PaneId>, mut pane: Pane) -> PaneId {
        let id = PaneId(self.panes.len());
        pane.parent = parent;
        pane.children.clear();
        self.panes.push(pane);
        if let Some(parent) = parent {
            self.panes[parent.0].children.push(id);
        }
        id
    }

    pub(crate) fn set_root_pane_id(&mut self, root: Option<PaneId>) {
        self.root_pane = root;
    }

    fn check_pane(&self, id: PaneId) -> Result<()> {
        if id.0 < self.panes.len() {
            Ok(())
        } else {
            Err(Error::InvalidIndex {
                kind: "pane",
                index: id.0 as i32,
                count: self.panes.len(),
            })
        }
    }

    pub const fn root_pane_id(&self) -> Option<PaneId> {
        self.root_pane
    }

    pub fn root_pane(&self) -> Option<&Pane> {
        self.root_pane.and_then(|id| self.pane(id))
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.get(id.0)
    }

    pub fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.get_mut(id.0)
    }

    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    /// Children of `id` in file order.
    pub fn pane_children(&self, id: PaneId) -> impl Iterator<Item = &Pane> + '_ {
        self.pane(id)
            .map(Pane::children)
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| self.pane(child))
    }

    pub fn pane_parent(&self, id: PaneId) -> Option<&Pane> {
        self.pane(id)?.parent().and_then(|parent| self.pane(parent))
    }

    /// All panes in pre-order (a parent before its children, siblings in
    /// file order). This is the order panes are encoded in.
    pub fn panes(&self) -> impl Iterator<Item = &Pane> + '_ {
        self.walk_panes().map(|visit| visit.node)
    }

    /// Pre-order walk carrying ids and depths.
    pub fn walk_panes(&self) -> PreOrder<'_, Pane> {
        PreOrder::new(&self.panes, self.root_pane)
    }

    /// First pane in pre-order with the given name.
    pub fn find_pane(&self, name: &str) -> Option<PaneId> {
        self.walk_panes()
            .find(|visit| visit.node.name() == name)
            .map(|visit| visit.id)
    }

    // -- groups --

    /// Replace the group tree with a single root group.
    pub fn set_root_group(&mut self, group: Group) -> GroupId {
        self.groups.clear();
        let id = self.insert_group(None, group);
        self.root_group = Some(id);
        id
    }

    /// Append `group` as the last child of `parent`.
    pub fn add_group(&mut self, parent: GroupId, group: Group) -> Result<GroupId> {
        if parent.0 >= self.groups.len() {
            return Err(Error::InvalidIndex {
                kind: "group",
                index: parent.0 as i32,
                count: self.groups.len(),
            });
        }
        Ok(self.insert_group(Some(parent), group))
    }

    pub(crate) fn insert_group(&mut self, parent: Option<GroupId>, mut group: Group) -> GroupId {
        let id = GroupId(self.groups.len());
        group.parent = parent;
        group.children.clear();
        self.groups.push(group);
        if let Some(parent) = parent {
            self.groups[parent.0].children.push(id);
        }
        id
    }

    pub(crate) fn set_root_group_id(&mut self, root: Option<GroupId>) {
        self.root_group = root;
    }

    pub const fn root_group_id(&self) -> Option<GroupId> {
        self.root_group
    }

    pub fn root_group(&self) -> Option<&Group> {
        self.root_group.and_then(|id| self.group(id))
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id.0)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// All groups in pre-order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.walk_groups().map(|visit| visit.node)
    }

    pub fn walk_groups(&self) -> PreOrder<'_, Group> {
        PreOrder::new(&self.groups, self.root_group)
    }

    // -- resource lookups --

    /// Name of the texture a material references.
    pub fn texture_name(&self, texture: &TextureRef) -> Result<&str> {
        usize::try_from(texture.index)
            .ok()
            .and_then(|index| self.textures.get(index))
            .map(String::as_str)
            .ok_or(Error::InvalidIndex {
                kind: "texture",
                index: i32::from(texture.index),
                count: self.textures.len(),
            })
    }

    pub fn material(&self, index: u16) -> Result<&Material> {
        self.materials.get(index as usize).ok_or(Error::InvalidIndex {
            kind: "material",
            index: i32::from(index),
            count: self.materials.len(),
        })
    }

    pub fn font(&self, index: u16) -> Result<&str> {
        self.fonts
            .get(index as usize)
            .map(String::as_str)
            .ok_or(Error::InvalidIndex {
                kind: "font",
                index: i32::from(index),
                count: self.fonts.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::PaneKind;

    fn names<'a>(panes: impl Iterator<Item = &'a Pane>) -> Vec<&'a str> {
        panes.map(Pane::name).collect()
    }

    fn sample() -> LayoutDocument {
        let mut doc = LayoutDocument::new();
        let root = doc.set_root_pane(Pane::new("RootPane", PaneKind::Base));
        let a = doc.add_pane(root, Pane::new("A", PaneKind::Base)).unwrap();
        doc.add_pane(a, Pane::new("A1", PaneKind::Bounds)).unwrap();
        doc.add_pane(a, Pane::new("A2", PaneKind::Bounds)).unwrap();
        doc.add_pane(root, Pane::new("B", PaneKind::Bounds)).unwrap();
        doc
    }

    #[test]
    fn test_pre_order() {
        let doc = sample();
        assert_eq!(names(doc.panes()), ["RootPane", "A", "A1", "A2", "B"]);
        let depths: Vec<_> = doc.walk_panes().map(|visit| visit.depth).collect();
        assert_eq!(depths, [0, 1, 2, 2, 1]);
    }

    #[test]
    fn test_parent_links() {
        let doc = sample();
        let a2 = doc.find_pane("A2").unwrap();
        assert_eq!(doc.pane_parent(a2).map(Pane::name), Some("A"));
        let a = doc.find_pane("A").unwrap();
        assert_eq!(names(doc.pane_children(a)), ["A1", "A2"]);
        assert!(doc.root_pane().unwrap().parent().is_none());
    }

    #[test]
    fn test_add_to_missing_parent() {
        let mut doc = LayoutDocument::new();
        assert!(matches!(
            doc.add_pane(PaneId(3), Pane::new("X", PaneKind::Base)),
            Err(Error::InvalidIndex { kind: "pane", .. })
        ));
    }

    #[test]
    fn test_lookups() {
        let mut doc = LayoutDocument::new();
        doc.textures.push("bg^d".to_string());
        doc.fonts.push("font.bffnt".to_string());
        doc.materials.push(Material::new("M"));

        assert_eq!(doc.texture_name(&TextureRef::new(0)).unwrap(), "bg^d");
        let none = doc.texture_name(&TextureRef::new(TextureRef::NONE)).unwrap_err();
        assert!(matches!(none, Error::InvalidIndex { index: -1, .. }));
        assert!(none.is_format_error());
        assert!(doc.texture_name(&TextureRef::new(1)).is_err());
        assert_eq!(doc.material(0).unwrap().name, "M");
        assert!(doc.material(1).is_err());
        assert_eq!(doc.font(0).unwrap(), "font.bffnt");
        assert!(doc.font(7).is_err());
    }

    #[test]
    fn test_group_tree() {
        let mut doc = LayoutDocument::new();
        let root = doc.set_root_group(Group::new("RootGroup"));
        let child = doc.add_group(root, Group::new("G_A")).unwrap();
        doc.add_group(child, Group::new("G_A_1")).unwrap();
        doc.add_group(root, Group::new("G_B")).unwrap();

        let order: Vec<_> = doc.groups().map(|g| g.name.as_str()).collect();
        assert_eq!(order, ["RootGroup", "G_A", "G_A_1", "G_B"]);
    }
}
