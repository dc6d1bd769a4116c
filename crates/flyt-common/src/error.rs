//! Error types for flyt-common.

use thiserror::Error;

/// Common error type for FLYT binary reading and writing.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at {position:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// An absolute offset pointed outside the buffer.
    #[error("offset {offset:#x} out of bounds (buffer size: {size:#x})")]
    OffsetOutOfBounds { offset: usize, size: usize },

    /// A string did not fit into its fixed-size slot.
    #[error("string {value:?} is {len} bytes, slot holds {capacity}")]
    StringTooLong {
        value: String,
        len: usize,
        capacity: usize,
    },

    /// A placeholder was patched outside the written range.
    #[error("placeholder at {position:#x} lies outside the written buffer ({len:#x} bytes)")]
    PlaceholderOutOfBounds { position: usize, len: usize },

    /// A patched value is wider than its reserved slot.
    #[error("value {value} does not fit in a {bits}-bit slot")]
    ValueOverflow { value: u32, bits: u32 },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// UTF-16 decoding error.
    #[error("UTF-16 error: {0}")]
    Utf16(#[from] std::char::DecodeUtf16Error),

    /// Missing null terminator in string.
    #[error("string at {0:#x} missing null terminator")]
    MissingNullTerminator(usize),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
