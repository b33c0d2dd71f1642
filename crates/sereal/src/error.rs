//! Error type shared by the decoder, encoder, and compression adapters.

use std::fmt::Display;

use thiserror::Error;

/// Everything that can go wrong while encoding or decoding a document.
#[derive(Debug, Error)]
pub enum Error {
    #[error("bad Sereal header: doesn't look like valid Sereal")]
    BadHeader,
    #[error("bad Sereal header: magic appears to be UTF-8 encoded")]
    BadHeaderUtf8,
    #[error("document version '{0}' not yet supported")]
    UnsupportedVersion(u8),
    #[error("document type '{0}' not yet supported")]
    UnsupportedDocumentType(u8),

    #[error("truncated document")]
    Truncated,
    #[error("bad offset in document")]
    CorruptOffset,
    #[error("bad varint in document")]
    CorruptVarint,
    #[error("bad array size in document")]
    CorruptArraySize,
    #[error("bad hash size in document")]
    CorruptHashSize,
    #[error("bad string size in document")]
    CorruptStringSize,
    #[error("compressed body length mismatch")]
    CorruptCompressedSize,
    #[error("nested COPY tag in document")]
    NestedCopy,
    #[error("untracked offset for REFP tag")]
    UntrackedOffsetRefp,
    #[error("untracked offset for ALIAS tag")]
    UntrackedOffsetAlias,
    #[error("OBJECT_FREEZE value not a REFN+ARRAY")]
    FreezeNotRefnArray,
    #[error("OBJECT_FREEZE value not an array")]
    FreezeNotArray,
    #[error("OBJECT_FREEZE array has multiple elements")]
    FreezeMultipleElements,
    #[error("OBJECT_FREEZE array element not a byte string")]
    FreezeNotBytes,
    #[error("unknown tag byte: {0} (0x{0:x})")]
    UnknownTag(u8),
    #[error("expected a string tag at offset {0}")]
    ExpectedString(usize),
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("snappy compression only valid in v1 documents")]
    BadSnappyVersion,
    #[error("zlib compression only valid in v3 documents and up")]
    BadZlibVersion,
    #[error("zstd compression only valid in v4 documents and up")]
    BadZstdVersion,

    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("snappy: {0}")]
    Snappy(#[from] snap::Error),

    /// Shape mismatches from the reflective paths and errors propagated
    /// verbatim from user-supplied marshalers.
    #[error("{0}")]
    Message(String),
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Error {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Error {
        Error::Message(msg.to_string())
    }
}
