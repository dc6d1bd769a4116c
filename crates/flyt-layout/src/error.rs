//! Error types for FLYT parsing and writing.

use thiserror::Error;

use crate::header::Tag;

/// Errors that can occur when parsing or writing FLYT layouts.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid magic bytes (not a FLYT file).
    #[error("invalid FLYT magic: expected 'FLYT', got {actual:?}")]
    BadMagic { actual: Vec<u8> },

    /// Byte-order mark is neither 0xFEFF nor 0xFFFE.
    #[error("invalid byte-order mark {0:#06x}")]
    BadByteOrderMark(u16),

    /// Buffer exhausted, or a record read past its section's declared size.
    #[error("truncated data at {position:#x}: needed {needed} bytes but only {available} available")]
    TruncatedData {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// A subtree end marker with no open subtree.
    #[error("unmatched {tag} at {offset:#x}")]
    UnmatchedEnd { tag: Tag, offset: usize },

    /// A subtree begin marker with no node to open.
    #[error("{tag} at {offset:#x} has no preceding node to open")]
    BeginWithoutNode { tag: Tag, offset: usize },

    /// Subtrees still open when the last section was read.
    #[error("{open} {tag} marker(s) never closed")]
    UnclosedBegin { tag: Tag, open: usize },

    /// A second top-level node after the root was closed.
    #[error("second root node {tag} at {offset:#x}")]
    MultipleRoots { tag: Tag, offset: usize },

    /// A tag routed to the pane decoder that is not a pane tag.
    #[error("{tag} is not a pane record")]
    UnknownPane { tag: Tag },

    /// An index that does not resolve (including the -1 sentinel).
    #[error("invalid {kind} index {index} (table holds {count})")]
    InvalidIndex {
        kind: &'static str,
        index: i32,
        count: usize,
    },

    /// A list is longer than its on-disk count field allows.
    #[error("too many {what}: {count} (maximum {max})")]
    TooMany {
        what: &'static str,
        count: usize,
        max: usize,
    },

    /// Cursor-level error that has no dedicated layout variant.
    #[error("{0}")]
    Common(flyt_common::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// XML writing error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl Error {
    /// Whether this error is a structural format error (as opposed to
    /// truncation or a bad header).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::UnmatchedEnd { .. }
                | Error::BeginWithoutNode { .. }
                | Error::UnclosedBegin { .. }
                | Error::MultipleRoots { .. }
                | Error::InvalidIndex { .. }
        )
    }
}

impl From<flyt_common::Error> for Error {
    fn from(err: flyt_common::Error) -> Self {
        match err {
            flyt_common::Error::UnexpectedEof {
                position,
                needed,
                available,
            } => Error::TruncatedData {
                position,
                needed,
                available,
            },
            // Offsets and strings running off the end of a section are
            // truncation from the layout's point of view.
            flyt_common::Error::OffsetOutOfBounds { offset, size } => Error::TruncatedData {
                position: offset,
                needed: 1,
                available: size.saturating_sub(offset),
            },
            flyt_common::Error::MissingNullTerminator(position) => Error::TruncatedData {
                position,
                needed: 1,
                available: 0,
            },
            flyt_common::Error::InvalidMagic { actual, .. } => Error::BadMagic { actual },
            flyt_common::Error::Utf8(e) => Error::Utf8(e),
            other => Error::Common(other),
        }
    }
}

/// Result type for FLYT operations.
pub type Result<T> = std::result::Result<T, Error>;
