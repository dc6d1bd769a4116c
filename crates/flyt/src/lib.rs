//! FLYT - layout file parsing and writing library.
//!
//! This crate provides a unified interface to the FLYT crates.
//!
//! # Crates
//!
//! - [`flyt_common`] - Common utilities (endian-aware binary reading and writing, value types)
//! - [`flyt_layout`] - FLYT layout decoding, encoding and XML export
//!
//! # Example
//!
//! ```no_run
//! use flyt::prelude::*;
//!
//! let data = std::fs::read("title.bflyt")?;
//! let doc = LayoutDocument::parse(&data)?;
//!
//! println!("{} panes, {} materials", doc.pane_count(), doc.materials.len());
//! if let Some(id) = doc.find_pane("T_Title") {
//!     if let PaneKind::Text(text) = &doc.pane(id).unwrap().kind {
//!         println!("title: {}", text.text);
//!     }
//! }
//!
//! std::fs::write("title.resaved.bflyt", doc.to_bytes()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use flyt_common as common;
pub use flyt_layout as layout;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use flyt_common::{BinaryReader, BinaryWriter, Color8, Endian, Vec2, Vec3};
    pub use flyt_layout::{
        decode, encode, is_flyt, Group, GroupId, LayoutDocument, Material, Pane, PaneId, PaneKind,
        Tag, Version,
    };
}

// Re-export commonly used types at the crate root
pub use flyt_layout::{Error, LayoutDocument, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
