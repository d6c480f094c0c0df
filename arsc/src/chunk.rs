use std::fmt;

/// Resource chunk type identifiers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u16)]
pub enum ChunkType {
    Null = 0x0000,
    StringPool = 0x0001,
    Table = 0x0002,
    Xml = 0x0003,
    XmlStartNamespace = 0x0100,
    XmlEndNamespace = 0x0101,
    XmlStartElement = 0x0102,
    XmlEndElement = 0x0103,
    XmlCdata = 0x0104,
    /// Maps strings in the string pool back to resource identifiers. Optional.
    XmlResourceMap = 0x0180,
    TablePackage = 0x0200,
    TableType = 0x0201,
    TableTypeSpec = 0x0202,
}

impl ChunkType {
    pub fn from_u16(ty: u16) -> Option<Self> {
        Some(match ty {
            ty if ty == ChunkType::Null as u16 => ChunkType::Null,
            ty if ty == ChunkType::StringPool as u16 => ChunkType::StringPool,
            ty if ty == ChunkType::Table as u16 => ChunkType::Table,
            ty if ty == ChunkType::Xml as u16 => ChunkType::Xml,
            ty if ty == ChunkType::XmlStartNamespace as u16 => ChunkType::XmlStartNamespace,
            ty if ty == ChunkType::XmlEndNamespace as u16 => ChunkType::XmlEndNamespace,
            ty if ty == ChunkType::XmlStartElement as u16 => ChunkType::XmlStartElement,
            ty if ty == ChunkType::XmlEndElement as u16 => ChunkType::XmlEndElement,
            ty if ty == ChunkType::XmlCdata as u16 => ChunkType::XmlCdata,
            ty if ty == ChunkType::XmlResourceMap as u16 => ChunkType::XmlResourceMap,
            ty if ty == ChunkType::TablePackage as u16 => ChunkType::TablePackage,
            ty if ty == ChunkType::TableType as u16 => ChunkType::TableType,
            ty if ty == ChunkType::TableTypeSpec as u16 => ChunkType::TableTypeSpec,
            _ => return None,
        })
    }
}

/// Best-effort name for a chunk type, including unrecognized ones.
pub fn type_name(ty: u16) -> String {
    match ChunkType::from_u16(ty) {
        Some(known) => format!("{:?}", known),
        None => format!("Unknown({:#x})", ty),
    }
}

/// A chunk framing record. `header_size` and `total_size` both include the
/// 8-byte common header; a chunk's children lie strictly within
/// `[offset + header_size, offset + total_size)`.
///
/// The same record doubles as a resize edit: "at `offset`, rewrite
/// `total_size` to this value", which is how matched XML subtrees are
/// logically deleted without shifting any bytes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Chunk {
    /// Absolute offset of the chunk header in the file.
    pub offset: u64,
    pub ty: u16,
    pub header_size: u16,
    pub total_size: u32,
}

impl Chunk {
    /// Size of the common chunk header.
    pub const HEADER_SIZE: u16 = 8;

    /// Absolute offset one past the last byte of the chunk.
    pub fn end(&self) -> u64 {
        self.offset + self.total_size as u64
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Chunk {} {} {} {}]",
            self.offset,
            type_name(self.ty),
            self.header_size,
            self.total_size
        )
    }
}
