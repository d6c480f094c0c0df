//! Decoder and in-place editor for the chunked binary format used by
//! compiled Android resources: the resource table (`resources.arsc`) and
//! precompiled binary XML documents such as a compiled `AndroidManifest.xml`.
//!
//! The decoder walks the tree of length-prefixed chunks and emits a stream
//! of [`Event`]s to a chain of [`ContentSink`] filters. Terminal filters
//! either reassemble a printable [`Document`] or accumulate edit records
//! that are later applied to the file with a random-access writer, leaving
//! every byte outside the patched regions untouched.

pub mod chunk;
pub mod config;
pub mod decoder;
pub mod document;
pub mod edit;
pub mod event;
pub mod ids;
pub mod pool;
pub mod stream;
pub mod table;
pub mod value;
pub mod xml;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::chunk::{Chunk, ChunkType};
pub use crate::config::ResourceConfig;
pub use crate::decoder::ResourceDecoder;
pub use crate::document::{Document, Element, Node, Resolver};
pub use crate::event::{ContentSink, Event, NullSink};
pub use crate::pool::{StringPool, Style};
pub use crate::stream::{ResourceStream, Source, Window};
pub use crate::value::{ResourceValue, ValueType};

/// Errors produced while decoding or editing a compiled resource file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stream or the enclosing chunk ended before a read completed.
    #[error("unexpected end of input")]
    EndOfInput,
    /// A structural invariant of the binary format was violated.
    #[error("malformed resource data: {0}")]
    Format(String),
    /// A requested resource pattern matched no entry in the file.
    #[error("unmatched resource pattern(s): {0}")]
    UnresolvedPattern(String),
    /// The bytes on disk no longer match the recorded edit; nothing was written.
    #[error("stale edit at offset {offset:#x}: existing bytes do not match")]
    PatchMismatch { offset: u64 },
    /// A pattern or value had invalid syntax.
    #[error("invalid argument: {0}")]
    Argument(String),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Utf16(#[from] std::string::FromUtf16Error),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::EndOfInput
        } else {
            Self::Io(err)
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
