//! FLYT binary layout parser and writer.
//!
//! A FLYT file describes an on-screen layout: a tree of panes (null panes,
//! pictures, text boxes, windows, bounds and parts), a tree of named pane
//! groups, and the texture, font and material tables the panes refer to.
//!
//! The file is a flat run of tagged, size-prefixed sections. Trees are
//! rebuilt from begin/end marker sections; strings and sub-records are
//! addressed by offsets that the encoder patches once their targets exist.
//!
//! # Example
//!
//! ```no_run
//! use flyt_layout::{LayoutDocument, PaneKind};
//!
//! let data = std::fs::read("menu.bflyt")?;
//! let doc = LayoutDocument::parse(&data)?;
//!
//! for visit in doc.walk_panes() {
//!     println!("{:indent$}{} ({})", "", visit.node.name(), visit.node.kind.type_name(),
//!         indent = visit.depth * 2);
//! }
//!
//! // Byte-for-byte re-encode of everything that was decoded.
//! let bytes = doc.to_bytes()?;
//! # let _ = (bytes, PaneKind::Base);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod document;
mod error;
mod group;
mod header;
mod layout_info;
mod material;
mod pane;
mod parser;
mod tables;
mod tree;
mod writer;
#[cfg(feature = "xml-output")]
mod xml;

pub use document::{LayoutDocument, OpaqueSection, SectionAnchor};
pub use error::{Error, Result};
pub use group::{Group, GroupId, GROUP_WIDE_NAME_MAJOR};
pub use header::{RawHeader, SectionPrologue, Tag, Version};
pub use layout_info::LayoutInfo;
pub use material::{
    FilterMode, Material, TextureRef, TextureTransform, WrapMode, MATERIAL_FLAGS_FIRST_MAJOR,
};
pub use pane::{
    HorizontalOrigin, LineAlignment, Pane, PaneBase, PaneId, PaneKind, PicturePane, TexCoord,
    TextPane, VertexColors, VerticalOrigin, WindowContent, WindowFrame, WindowInsets, WindowPane,
    PANE_BASE_END, PANE_NAME_LEN,
};
pub use parser::is_flyt;
pub use tree::{PreOrder, TreeNode, Visit};

pub use flyt_common::Endian;

/// Decode a FLYT file.
pub fn decode(data: &[u8]) -> Result<LayoutDocument> {
    LayoutDocument::parse(data)
}

/// Encode a document to FLYT bytes.
pub fn encode(doc: &LayoutDocument) -> Result<Vec<u8>> {
    doc.to_bytes()
}
