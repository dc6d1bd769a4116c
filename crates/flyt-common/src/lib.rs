//! Common utilities for FLYT.
//!
//! This crate provides the foundational pieces shared by the FLYT crates:
//!
//! - [`BinaryReader`] - Zero-copy, endian-aware reading from byte slices
//! - [`BinaryWriter`] - Growable writer with reserve/patch placeholders
//! - [`Endian`] - Byte order chosen at runtime from a byte-order mark
//! - Vector and color value types

mod endian;
mod error;
mod reader;
mod types;
mod writer;

pub use endian::Endian;
pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use types::{Color8, Vec2, Vec3};
pub use writer::{BinaryWriter, Placeholder};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;
