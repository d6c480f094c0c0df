//! Builders for the synthetic resource files the crate's tests decode and
//! patch. Fixture layout mirrors what aapt emits: a string pool and
//! resource map up front, then the node or table chunks.

use crate::chunk::ChunkType;
use crate::pool::StringPool;
use crate::value::ValueType;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom, Write};

type W = Cursor<Vec<u8>>;

/// Writes a chunk header with placeholder sizes and backpatches them once
/// the header and body have been written.
struct ChunkWriter {
    ty: ChunkType,
    start_chunk: u64,
    end_header: u64,
}

impl ChunkWriter {
    fn start_chunk(ty: ChunkType, w: &mut W) -> std::io::Result<Self> {
        let start_chunk = w.stream_position()?;
        w.write_u16::<LittleEndian>(0)?;
        w.write_u16::<LittleEndian>(0)?;
        w.write_u32::<LittleEndian>(0)?;
        Ok(Self {
            ty,
            start_chunk,
            end_header: 0,
        })
    }

    fn end_header(&mut self, w: &mut W) -> std::io::Result<()> {
        self.end_header = w.stream_position()?;
        Ok(())
    }

    fn end_chunk(self, w: &mut W) -> std::io::Result<()> {
        assert_ne!(self.end_header, 0);
        let end_chunk = w.stream_position()?;
        w.seek(SeekFrom::Start(self.start_chunk))?;
        w.write_u16::<LittleEndian>(self.ty as u16)?;
        w.write_u16::<LittleEndian>((self.end_header - self.start_chunk) as u16)?;
        w.write_u32::<LittleEndian>((end_chunk - self.start_chunk) as u32)?;
        w.seek(SeekFrom::Start(end_chunk))?;
        Ok(())
    }
}

fn patch_u32(w: &mut W, at: u64, value: u32) -> std::io::Result<()> {
    let here = w.stream_position()?;
    w.seek(SeekFrom::Start(at))?;
    w.write_u32::<LittleEndian>(value)?;
    w.seek(SeekFrom::Start(here))?;
    Ok(())
}

/// ASCII-only UTF-8 pool, no styles.
fn write_string_pool_utf8(w: &mut W, strings: &[&str]) -> std::io::Result<()> {
    let mut chunk = ChunkWriter::start_chunk(ChunkType::StringPool, w)?;
    w.write_u32::<LittleEndian>(strings.len() as u32)?;
    w.write_u32::<LittleEndian>(0)?;
    w.write_u32::<LittleEndian>(StringPool::UTF8_FLAG)?;
    w.write_u32::<LittleEndian>(28 + 4 * strings.len() as u32)?;
    w.write_u32::<LittleEndian>(0)?;
    chunk.end_header(w)?;
    let mut offset = 0u32;
    for s in strings {
        w.write_u32::<LittleEndian>(offset)?;
        offset += s.len() as u32 + 3;
    }
    for s in strings {
        w.write_u8(s.len() as u8)?;
        w.write_u8(s.len() as u8)?;
        w.write_all(s.as_bytes())?;
        w.write_u8(0)?;
    }
    while w.stream_position()? % 4 != 0 {
        w.write_u8(0)?;
    }
    chunk.end_chunk(w)
}

fn write_resource_map(w: &mut W, ids: &[u32]) -> std::io::Result<()> {
    let mut chunk = ChunkWriter::start_chunk(ChunkType::XmlResourceMap, w)?;
    chunk.end_header(w)?;
    for &id in ids {
        w.write_u32::<LittleEndian>(id)?;
    }
    chunk.end_chunk(w)
}

fn write_namespace(w: &mut W, start: bool, prefix: i32, uri: i32) -> std::io::Result<()> {
    let ty = if start {
        ChunkType::XmlStartNamespace
    } else {
        ChunkType::XmlEndNamespace
    };
    let mut chunk = ChunkWriter::start_chunk(ty, w)?;
    w.write_u32::<LittleEndian>(1)?;
    w.write_i32::<LittleEndian>(-1)?;
    chunk.end_header(w)?;
    w.write_i32::<LittleEndian>(prefix)?;
    w.write_i32::<LittleEndian>(uri)?;
    chunk.end_chunk(w)
}

fn write_start_element(
    w: &mut W,
    name: i32,
    attrs: &[(i32, i32, ValueType, u32)],
) -> std::io::Result<()> {
    let mut chunk = ChunkWriter::start_chunk(ChunkType::XmlStartElement, w)?;
    w.write_u32::<LittleEndian>(1)?;
    w.write_i32::<LittleEndian>(-1)?;
    chunk.end_header(w)?;
    w.write_i32::<LittleEndian>(-1)?;
    w.write_i32::<LittleEndian>(name)?;
    w.write_u16::<LittleEndian>(20)?;
    w.write_u16::<LittleEndian>(20)?;
    w.write_u16::<LittleEndian>(attrs.len() as u16)?;
    w.write_u16::<LittleEndian>(0)?;
    w.write_u16::<LittleEndian>(0)?;
    w.write_u16::<LittleEndian>(0)?;
    for &(namespace, attr_name, ty, data) in attrs {
        w.write_i32::<LittleEndian>(namespace)?;
        w.write_i32::<LittleEndian>(attr_name)?;
        w.write_i32::<LittleEndian>(-1)?;
        w.write_u16::<LittleEndian>(8)?;
        w.write_u8(0)?;
        w.write_u8(ty as u8)?;
        w.write_u32::<LittleEndian>(data)?;
    }
    chunk.end_chunk(w)
}

fn write_end_element(w: &mut W, name: i32) -> std::io::Result<()> {
    let mut chunk = ChunkWriter::start_chunk(ChunkType::XmlEndElement, w)?;
    w.write_u32::<LittleEndian>(1)?;
    w.write_i32::<LittleEndian>(-1)?;
    chunk.end_header(w)?;
    w.write_i32::<LittleEndian>(-1)?;
    w.write_i32::<LittleEndian>(name)?;
    chunk.end_chunk(w)
}

fn write_type_spec(w: &mut W, id: u8, entry_count: u32) -> std::io::Result<()> {
    let mut chunk = ChunkWriter::start_chunk(ChunkType::TableTypeSpec, w)?;
    w.write_u8(id)?;
    w.write_u8(0)?;
    w.write_u16::<LittleEndian>(0)?;
    w.write_u32::<LittleEndian>(entry_count)?;
    chunk.end_header(w)?;
    for _ in 0..entry_count {
        w.write_u32::<LittleEndian>(0)?;
    }
    chunk.end_chunk(w)
}

fn write_table_type(w: &mut W, id: u8, entries: &[(u32, ValueType, u32)]) -> std::io::Result<()> {
    let mut chunk = ChunkWriter::start_chunk(ChunkType::TableType, w)?;
    w.write_u8(id)?;
    w.write_u8(0)?;
    w.write_u16::<LittleEndian>(0)?;
    w.write_u32::<LittleEndian>(entries.len() as u32)?;
    w.write_u32::<LittleEndian>(52 + 4 * entries.len() as u32)?;
    w.write_u32::<LittleEndian>(32)?;
    for _ in 0..28 {
        w.write_u8(0)?;
    }
    chunk.end_header(w)?;
    for i in 0..entries.len() as u32 {
        w.write_u32::<LittleEndian>(i * 16)?;
    }
    for &(key, ty, data) in entries {
        w.write_u16::<LittleEndian>(8)?;
        w.write_u16::<LittleEndian>(0)?;
        w.write_u32::<LittleEndian>(key)?;
        w.write_u16::<LittleEndian>(8)?;
        w.write_u8(0)?;
        w.write_u8(ty as u8)?;
        w.write_u32::<LittleEndian>(data)?;
    }
    chunk.end_chunk(w)
}

/// Pool index of each string in the manifest fixture.
pub const MF_VERSION_CODE: i32 = 0;
pub const MF_DEBUGGABLE: i32 = 1;
pub const MF_MANIFEST: i32 = 2;
pub const MF_APPLICATION: i32 = 3;
pub const MF_ANDROID: i32 = 4;
pub const MF_ANDROID_URI: i32 = 5;

/// A compiled manifest with one namespace and two nested elements:
///
/// ```xml
/// <manifest android:versionCode="42">
///   <application android:debuggable="true"/>
/// </manifest>
/// ```
pub fn manifest_fixture() -> Vec<u8> {
    let mut w = Cursor::new(Vec::new());
    let mut xml = ChunkWriter::start_chunk(ChunkType::Xml, &mut w).unwrap();
    xml.end_header(&mut w).unwrap();
    write_string_pool_utf8(
        &mut w,
        &[
            "versionCode",
            "debuggable",
            "manifest",
            "application",
            "android",
            "http://schemas.android.com/apk/res/android",
        ],
    )
    .unwrap();
    write_resource_map(&mut w, &[0x0101_021b, 0x0101_000f]).unwrap();
    write_namespace(&mut w, true, MF_ANDROID, MF_ANDROID_URI).unwrap();
    write_start_element(
        &mut w,
        MF_MANIFEST,
        &[(MF_ANDROID_URI, MF_VERSION_CODE, ValueType::IntDec, 42)],
    )
    .unwrap();
    write_start_element(
        &mut w,
        MF_APPLICATION,
        &[(MF_ANDROID_URI, MF_DEBUGGABLE, ValueType::IntBoolean, 0xffff_ffff)],
    )
    .unwrap();
    write_end_element(&mut w, MF_APPLICATION).unwrap();
    write_end_element(&mut w, MF_MANIFEST).unwrap();
    write_namespace(&mut w, false, MF_ANDROID, MF_ANDROID_URI).unwrap();
    xml.end_chunk(&mut w).unwrap();
    w.into_inner()
}

/// A resource table for package `com.example` (id 0x7f) with one `bool`
/// resource `checked` (true) and one `color` resource `background`
/// (`#FF113377`).
pub fn table_fixture() -> Vec<u8> {
    multi_config_table_fixture(&[0xffff_ffff])
}

/// Like [`table_fixture`], but `bool/checked` carries one value per entry
/// of `bool_values`, each in its own configuration.
pub fn multi_config_table_fixture(bool_values: &[u32]) -> Vec<u8> {
    let mut w = Cursor::new(Vec::new());
    let mut table = ChunkWriter::start_chunk(ChunkType::Table, &mut w).unwrap();
    w.write_u32::<LittleEndian>(1).unwrap();
    table.end_header(&mut w).unwrap();
    write_string_pool_utf8(&mut w, &[]).unwrap();

    let mut pkg = ChunkWriter::start_chunk(ChunkType::TablePackage, &mut w).unwrap();
    let pkg_start = pkg.start_chunk;
    w.write_u32::<LittleEndian>(0x7f).unwrap();
    let name = "com.example";
    for unit in name.encode_utf16() {
        w.write_u16::<LittleEndian>(unit).unwrap();
    }
    for _ in name.len()..128 {
        w.write_u16::<LittleEndian>(0).unwrap();
    }
    let pool_offsets_at = w.stream_position().unwrap();
    w.write_u32::<LittleEndian>(0).unwrap(); // type_strings
    w.write_u32::<LittleEndian>(2).unwrap(); // last_public_type
    w.write_u32::<LittleEndian>(0).unwrap(); // key_strings
    w.write_u32::<LittleEndian>(2).unwrap(); // last_public_key
    pkg.end_header(&mut w).unwrap();
    let type_pool_at = w.stream_position().unwrap();
    write_string_pool_utf8(&mut w, &["bool", "color"]).unwrap();
    let key_pool_at = w.stream_position().unwrap();
    write_string_pool_utf8(&mut w, &["checked", "background"]).unwrap();
    patch_u32(&mut w, pool_offsets_at, (type_pool_at - pkg_start) as u32).unwrap();
    patch_u32(&mut w, pool_offsets_at + 8, (key_pool_at - pkg_start) as u32).unwrap();

    write_type_spec(&mut w, 1, 1).unwrap();
    for &value in bool_values {
        write_table_type(&mut w, 1, &[(0, ValueType::IntBoolean, value)]).unwrap();
    }
    write_type_spec(&mut w, 2, 1).unwrap();
    write_table_type(&mut w, 2, &[(1, ValueType::IntColorArgb8, 0xff11_3377)]).unwrap();
    pkg.end_chunk(&mut w).unwrap();
    table.end_chunk(&mut w).unwrap();
    w.into_inner()
}
