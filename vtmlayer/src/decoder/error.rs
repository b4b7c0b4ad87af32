//! Error types for tile payload decoding.

use std::io;

use thiserror::Error;

/// Errors raised while decoding a tile payload.
///
/// Every variant means the payload is corrupt or unsupported. None of them
/// are retried; the tile is dropped and the connection stays usable.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A varint did not terminate within five bytes.
    #[error("Malformed varint at offset {offset}")]
    MalformedVarint { offset: usize },

    /// A varint array held more values than its destination, or its
    /// declared byte length did not match the bytes consumed.
    #[error("Varint array mismatch: capacity {capacity}, declared {declared} bytes, consumed {consumed}")]
    ArraySizeMismatch {
        capacity: usize,
        declared: usize,
        consumed: usize,
    },

    /// A tag reference points outside the table it addresses.
    #[error("Tag index {index} out of range")]
    TagIndexOutOfRange { index: u32 },

    /// Unrecognised top-level field number.
    #[error("Unknown field {tag} in tile")]
    UnknownField { tag: u32 },

    /// The tile was encoded with an unsupported format version.
    #[error("Unsupported tile version {found} (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },

    /// The coordinate payload's declared byte length did not match the bytes
    /// consumed while filling the rings.
    #[error("Coordinate length mismatch: declared {declared} bytes, consumed {consumed}")]
    CoordinateLengthMismatch { declared: usize, consumed: usize },

    /// The coordinate payload ended before every ring was filled.
    #[error("Coordinate count mismatch: expected {expected} points, decoded {decoded}")]
    CoordinateCountMismatch { expected: usize, decoded: usize },

    /// A per-tile key or value string arrived before its count, or beyond it.
    #[error("Too many {table} strings (declared {declared:?})")]
    DictionaryOverflow {
        table: &'static str,
        declared: Option<usize>,
    },

    /// An element carried no tag array.
    #[error("Element has no tags")]
    MissingTags,

    /// A line or polygon element declared no rings.
    #[error("Element has no rings")]
    NoRings,

    /// A line or polygon element carried coordinates before its ring index.
    #[error("Element coordinates precede the ring index")]
    MissingIndex,

    /// Layer override outside `0..=10`.
    #[error("Invalid layer {0}")]
    InvalidLayer(u32),

    /// The element's sub-fields ran past its declared byte length.
    #[error("Element overran its length: end {end}, position {position}")]
    ElementOverrun { end: usize, position: usize },

    /// A field needed more bytes than remain in the content.
    #[error("Unexpected end of content: needed {needed} bytes at offset {offset}")]
    UnexpectedEnd { needed: usize, offset: usize },

    /// The source closed before delivering the declared content length.
    #[error("Content truncated: expected {expected} bytes, received {received}")]
    Truncated { expected: usize, received: usize },

    /// A string field was not valid UTF-8.
    #[error("Invalid UTF-8 in string field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Reading from the byte source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_version_mismatch() {
        let err = DecodeError::VersionMismatch {
            expected: 4,
            found: 3,
        };
        assert_eq!(err.to_string(), "Unsupported tile version 3 (expected 4)");
    }

    #[test]
    fn test_display_dictionary_overflow() {
        let err = DecodeError::DictionaryOverflow {
            table: "key",
            declared: None,
        };
        assert_eq!(err.to_string(), "Too many key strings (declared None)");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let err: DecodeError = io_err.into();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
