use crate::chunk::{self, Chunk, ChunkType};
use crate::config::ResourceConfig;
use crate::event::{ContentSink, Event};
use crate::pool::{StringPool, Style};
use crate::stream::{skip_fully, Source, Window};
use crate::value::ResourceValue;
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::rc::Rc;

const HSIZE: u16 = Chunk::HEADER_SIZE;

/// Recursive-descent decoder over the chunk tree. Drives a sink (usually
/// the head of a filter chain) with the event vocabulary of [`Event`].
///
/// The decoder is re-entrant per chunk: container chunks call back into
/// [`decode`](Self::decode) until their bounded sub-source is exhausted.
pub struct ResourceDecoder<'a, S: ContentSink> {
    sink: &'a mut S,
    type_spec_open: bool,
}

impl<'a, S: ContentSink> ResourceDecoder<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            type_spec_open: false,
        }
    }

    /// Decodes the next chunk from `r`. Returns `Ok(None)` when the stream
    /// ends before a chunk header begins; that is the normal terminator
    /// for a container's child loop, not an error. `EndOfInput` anywhere
    /// else propagates.
    pub fn decode(&mut self, r: &mut dyn Source) -> Result<Option<u16>> {
        let ty = match r.read_u16::<LittleEndian>() {
            Ok(ty) => ty,
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let header_size = r.read_u16::<LittleEndian>()?;
        let total_size = r.read_u32::<LittleEndian>()?;
        let chunk = Chunk {
            offset: r.position() - HSIZE as u64,
            ty,
            header_size,
            total_size,
        };
        if header_size < HSIZE || (total_size as u64) < header_size as u64 {
            return Err(Error::Format(format!("bad chunk framing: {chunk}")));
        }
        self.sink.on_event(&Event::ChunkStart(chunk))?;
        let mut body = Window::new(r, total_size as u64 - HSIZE as u64);
        match ChunkType::from_u16(ty) {
            Some(ChunkType::Null) => {
                tracing::trace!("null");
            }
            Some(ChunkType::StringPool) => {
                tracing::trace!("string pool");
                self.decode_string_pool(&mut body, header_size)?;
            }
            Some(ChunkType::Table) => {
                tracing::trace!("table");
                self.decode_table(&mut body, header_size)?;
            }
            Some(ChunkType::Xml) => {
                tracing::trace!("xml");
                self.decode_xml(&mut body, header_size)?;
            }
            Some(ChunkType::XmlResourceMap) => {
                tracing::trace!("xml resource map");
                self.decode_xml_resource_map(&mut body, header_size, total_size)?;
            }
            Some(ChunkType::XmlStartNamespace) => {
                tracing::trace!("xml start namespace");
                self.decode_xml_node_header(&mut body, header_size)?;
                let prefix = body.read_i32::<LittleEndian>()?;
                let uri = body.read_i32::<LittleEndian>()?;
                self.sink.on_event(&Event::XmlStartNamespace { prefix, uri })?;
            }
            Some(ChunkType::XmlEndNamespace) => {
                tracing::trace!("xml end namespace");
                self.decode_xml_node_header(&mut body, header_size)?;
                let prefix = body.read_i32::<LittleEndian>()?;
                let uri = body.read_i32::<LittleEndian>()?;
                self.sink.on_event(&Event::XmlEndNamespace { prefix, uri })?;
            }
            Some(ChunkType::XmlStartElement) => {
                tracing::trace!("xml start element");
                self.decode_xml_start_element(&mut body, header_size)?;
            }
            Some(ChunkType::XmlEndElement) => {
                tracing::trace!("xml end element");
                self.decode_xml_node_header(&mut body, header_size)?;
                let namespace = body.read_i32::<LittleEndian>()?;
                let name = body.read_i32::<LittleEndian>()?;
                self.sink.on_event(&Event::XmlEndElement { namespace, name })?;
            }
            Some(ChunkType::XmlCdata) => {
                tracing::trace!("xml cdata");
                self.decode_xml_node_header(&mut body, header_size)?;
                let index = body.read_i32::<LittleEndian>()?;
                self.sink.on_event(&Event::XmlCdata { index })?;
                self.decode_resource_value(&mut body)?;
            }
            Some(ChunkType::TablePackage) => {
                tracing::trace!("table package");
                self.decode_table_package(&mut body, header_size)?;
            }
            Some(ChunkType::TableType) => {
                tracing::trace!("table type");
                self.decode_table_type(&mut body, header_size)?;
            }
            Some(ChunkType::TableTypeSpec) => {
                tracing::trace!("table type spec");
                self.decode_table_type_spec(&mut body, header_size)?;
            }
            None => {
                tracing::info!("{}: skipping {}", chunk.offset, chunk::type_name(ty));
            }
        }
        // Whatever the chunk handler left unread is padding or content we
        // do not interpret; consume it so the parent stays positioned on
        // the next sibling header.
        let remaining = body.remaining();
        skip_fully(&mut body, remaining)?;
        Ok(Some(ty))
    }

    fn header_pad(header_size: u16, consumed: u16) -> Result<u64> {
        (header_size as u64)
            .checked_sub(consumed as u64)
            .ok_or_else(|| Error::Format(format!("chunk header too small: {header_size}")))
    }

    fn decode_string_pool(&mut self, r: &mut dyn Source, header_size: u16) -> Result<()> {
        let string_count = r.read_u32::<LittleEndian>()? as usize;
        let style_count = r.read_u32::<LittleEndian>()? as usize;
        let flags = r.read_u32::<LittleEndian>()?;
        let utf8 = flags & StringPool::UTF8_FLAG != 0;
        let strings_start = r.read_u32::<LittleEndian>()?;
        let styles_start = r.read_u32::<LittleEndian>()?;
        skip_fully(r, Self::header_pad(header_size, HSIZE + 20)?)?;
        let mut string_offsets = Vec::with_capacity(string_count);
        for _ in 0..string_count {
            string_offsets.push(r.read_u32::<LittleEndian>()?);
        }
        let mut style_offsets = Vec::with_capacity(style_count);
        for _ in 0..style_count {
            style_offsets.push(r.read_u32::<LittleEndian>()?);
        }
        let mut data_read = (string_count + style_count) as u32 * 4;
        let mut strings: Vec<String> = Vec::with_capacity(string_count);
        for i in 0..string_count {
            // An offset pointing backward aliases an earlier entry; the
            // pool dedups common strings that way and the data region
            // holds a single copy.
            if string_offsets[i] != header_size as u32 + data_read - strings_start {
                let j = string_offsets[..i]
                    .iter()
                    .rposition(|&o| o == string_offsets[i])
                    .ok_or_else(|| {
                        Error::Format(format!("string offset {:#x} aliases nothing", string_offsets[i]))
                    })?;
                let aliased = strings[j].clone();
                strings.push(aliased);
            } else if utf8 {
                data_read += Self::decode_string_utf8(r, &mut strings)?;
            } else {
                data_read += Self::decode_string_utf16(r, &mut strings)?;
            }
        }
        let mut styles = Vec::with_capacity(style_count);
        if style_count != 0 {
            let npad = (styles_start)
                .checked_sub(header_size as u32 + data_read)
                .ok_or_else(|| Error::Format("styles start before string data ends".into()))?;
            skip_fully(r, npad as u64)?;
            for _ in 0..style_count {
                Self::decode_style(r, &mut styles)?;
            }
        }
        self.sink
            .on_event(&Event::StringPool(Rc::new(StringPool::new(strings, styles))))
    }

    fn decode_string_utf8(r: &mut dyn Source, out: &mut Vec<String>) -> Result<u32> {
        let mut nchars = r.read_u8()? as usize;
        let mut read = 1u32;
        if nchars & 0x80 != 0 {
            nchars = ((nchars & 0x7f) << 8) | r.read_u8()? as usize;
            read += 1;
        }
        let mut nbytes = r.read_u8()? as usize;
        read += 1;
        if nbytes & 0x80 != 0 {
            nbytes = ((nbytes & 0x7f) << 8) | r.read_u8()? as usize;
            read += 1;
        }
        let mut data = vec![0u8; nbytes];
        r.read_exact(&mut data)?;
        read += nbytes as u32;
        if r.read_u8()? != 0 {
            return Err(Error::Format("utf-8 pool string is not null-terminated".into()));
        }
        read += 1;
        let s = String::from_utf8(data)?;
        if s.encode_utf16().count() != nchars {
            tracing::warn!("pool string length mismatch: declared {} chars", nchars);
        }
        out.push(s);
        Ok(read)
    }

    fn decode_string_utf16(r: &mut dyn Source, out: &mut Vec<String>) -> Result<u32> {
        let mut nchars = r.read_u16::<LittleEndian>()? as usize;
        let mut read = 2u32;
        if nchars & 0x8000 != 0 {
            nchars = ((nchars & 0x7fff) << 16) | r.read_u16::<LittleEndian>()? as usize;
            read += 2;
        }
        let mut units = Vec::with_capacity(nchars);
        for _ in 0..nchars {
            units.push(r.read_u16::<LittleEndian>()?);
        }
        read += nchars as u32 * 2;
        if r.read_u16::<LittleEndian>()? != 0 {
            return Err(Error::Format("utf-16 pool string is not null-terminated".into()));
        }
        read += 2;
        out.push(String::from_utf16(&units)?);
        Ok(read)
    }

    fn decode_style(r: &mut dyn Source, out: &mut Vec<Style>) -> Result<u32> {
        let name = r.read_u32::<LittleEndian>()?;
        let mut read = 4;
        let (first_char, last_char) = if name != Style::END {
            read += 8;
            (r.read_u32::<LittleEndian>()?, r.read_u32::<LittleEndian>()?)
        } else {
            (0, 0)
        };
        out.push(Style {
            name,
            first_char,
            last_char,
        });
        Ok(read)
    }

    fn decode_table(&mut self, r: &mut dyn Source, header_size: u16) -> Result<()> {
        let package_count = r.read_u32::<LittleEndian>()?;
        skip_fully(r, Self::header_pad(header_size, HSIZE + 4)?)?;
        self.sink.on_event(&Event::TableStart { package_count })?;
        while self.decode(r)?.is_some() {}
        self.sink.on_event(&Event::TableEnd)
    }

    fn decode_table_package(&mut self, r: &mut dyn Source, header_size: u16) -> Result<()> {
        let id = r.read_u32::<LittleEndian>()?;
        let mut raw = [0u8; 256];
        r.read_exact(&mut raw)?;
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&unit| unit != 0)
            .collect();
        let name = String::from_utf16(&units)?;
        let type_strings = r.read_u32::<LittleEndian>()?;
        let last_public_type = r.read_u32::<LittleEndian>()?;
        let key_strings = r.read_u32::<LittleEndian>()?;
        let last_public_key = r.read_u32::<LittleEndian>()?;
        skip_fully(r, Self::header_pad(header_size, HSIZE + 276)?)?;
        self.sink.on_event(&Event::TablePackageStart {
            id,
            name,
            type_strings,
            last_public_type,
            key_strings,
            last_public_key,
        })?;
        while self.decode(r)?.is_some() {}
        if self.type_spec_open {
            self.sink.on_event(&Event::TableTypeSpecEnd)?;
            self.type_spec_open = false;
        }
        self.sink.on_event(&Event::TablePackageEnd)
    }

    fn decode_table_type_spec(&mut self, r: &mut dyn Source, header_size: u16) -> Result<()> {
        // A spec stays open until the next spec or the end of its package.
        if self.type_spec_open {
            self.sink.on_event(&Event::TableTypeSpecEnd)?;
            self.type_spec_open = false;
        }
        let id = r.read_u8()?;
        if id == 0 {
            return Err(Error::Format("type spec id of 0 is invalid".into()));
        }
        let res0 = r.read_u8()?;
        let res1 = r.read_u16::<LittleEndian>()?;
        if res0 != 0 || res1 != 0 {
            return Err(Error::Format("type spec reserved fields must be 0".into()));
        }
        let entry_count = r.read_u32::<LittleEndian>()?;
        skip_fully(r, Self::header_pad(header_size, HSIZE + 8)?)?;
        let mut configs = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            configs.push(r.read_u32::<LittleEndian>()?);
        }
        self.sink.on_event(&Event::TableTypeSpecStart { id, configs })?;
        self.type_spec_open = true;
        Ok(())
    }

    const NO_ENTRY: u32 = 0xffff_ffff;

    fn decode_table_type(&mut self, r: &mut dyn Source, header_size: u16) -> Result<()> {
        let id = r.read_u8()?;
        if id == 0 {
            return Err(Error::Format("type id of 0 is invalid".into()));
        }
        let res0 = r.read_u8()?;
        let res1 = r.read_u16::<LittleEndian>()?;
        if res0 != 0 || res1 != 0 {
            return Err(Error::Format("type reserved fields must be 0".into()));
        }
        let entry_count = r.read_u32::<LittleEndian>()?;
        let entry_start = r.read_u32::<LittleEndian>()?;
        let config = ResourceConfig::read(r)?;
        skip_fully(r, Self::header_pad(header_size, HSIZE + 12 + 32)?)?;
        let mut offsets = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            offsets.push(r.read_u32::<LittleEndian>()?);
        }
        self.sink.on_event(&Event::TableTypeStart {
            id,
            config,
            entry_count,
            entry_start,
            offsets: offsets.clone(),
        })?;
        for (index, &offset) in offsets.iter().enumerate() {
            if offset != Self::NO_ENTRY {
                self.decode_table_entry(r, index as u32)?;
            }
        }
        self.sink.on_event(&Event::TableTypeEnd)
    }

    fn decode_table_entry(&mut self, r: &mut dyn Source, index: u32) -> Result<()> {
        let _size = r.read_u16::<LittleEndian>()?;
        let flags = r.read_u16::<LittleEndian>()?;
        let key = r.read_u32::<LittleEndian>()?;
        if !crate::ids::is_complex_entry(flags) {
            self.sink.on_event(&Event::TableEntryStart {
                id: index,
                flags,
                key,
                parent: 0,
                count: 0,
            })?;
            self.decode_resource_value(r)?;
        } else {
            let parent = r.read_u32::<LittleEndian>()?;
            let count = r.read_u32::<LittleEndian>()?;
            self.sink.on_event(&Event::TableEntryStart {
                id: index,
                flags,
                key,
                parent,
                count,
            })?;
            for _ in 0..count {
                let name = r.read_u32::<LittleEndian>()?;
                self.sink.on_event(&Event::TableEntryMapName { name })?;
                self.decode_resource_value(r)?;
            }
        }
        self.sink.on_event(&Event::TableEntryEnd)
    }

    fn decode_resource_value(&mut self, r: &mut dyn Source) -> Result<()> {
        let offset = r.position();
        let size = r.read_u16::<LittleEndian>()?;
        if size < ResourceValue::SIZE {
            return Err(Error::Format(format!("bad value size {size}")));
        }
        let res0 = r.read_u8()?;
        if res0 != 0 {
            return Err(Error::Format("value res0 must be 0".into()));
        }
        let data_type = r.read_u8()?;
        let mut data = [0u8; 4];
        r.read_exact(&mut data)?;
        skip_fully(r, size as u64 - ResourceValue::SIZE as u64)?;
        self.sink.on_event(&Event::ResourceValue {
            offset,
            value: ResourceValue::new(data_type, data),
        })
    }

    fn decode_xml(&mut self, r: &mut dyn Source, header_size: u16) -> Result<()> {
        skip_fully(r, Self::header_pad(header_size, HSIZE)?)?;
        self.sink.on_event(&Event::XmlStart)?;
        while self.decode(r)?.is_some() {}
        self.sink.on_event(&Event::XmlEnd)
    }

    fn decode_xml_resource_map(
        &mut self,
        r: &mut dyn Source,
        header_size: u16,
        total_size: u32,
    ) -> Result<()> {
        skip_fully(r, Self::header_pad(header_size, HSIZE)?)?;
        let entry_count = (total_size - header_size as u32) / 4;
        let mut map = HashMap::with_capacity(entry_count as usize);
        for i in 0..entry_count {
            map.insert(r.read_u32::<LittleEndian>()?, i);
        }
        self.sink.on_event(&Event::XmlResourceMap(map))
    }

    fn decode_xml_node_header(&mut self, r: &mut dyn Source, header_size: u16) -> Result<()> {
        let line_number = r.read_u32::<LittleEndian>()?;
        let comment = r.read_i32::<LittleEndian>()?;
        skip_fully(r, Self::header_pad(header_size, HSIZE + 8)?)?;
        self.sink.on_event(&Event::XmlNode {
            line_number,
            comment,
        })
    }

    fn decode_xml_start_element(&mut self, r: &mut dyn Source, header_size: u16) -> Result<()> {
        self.decode_xml_node_header(r, header_size)?;
        let namespace = r.read_i32::<LittleEndian>()?;
        let name = r.read_i32::<LittleEndian>()?;
        let attr_start = r.read_u16::<LittleEndian>()?;
        let attr_size = r.read_u16::<LittleEndian>()?;
        let attr_count = r.read_u16::<LittleEndian>()?;
        let id_index = r.read_u16::<LittleEndian>()?;
        let class_index = r.read_u16::<LittleEndian>()?;
        let style_index = r.read_u16::<LittleEndian>()?;
        self.sink.on_event(&Event::XmlStartElement {
            namespace,
            name,
            attr_start,
            attr_size,
            attr_count,
            id_index,
            class_index,
            style_index,
        })?;
        for _ in 0..attr_count {
            let namespace = r.read_i32::<LittleEndian>()?;
            let name = r.read_i32::<LittleEndian>()?;
            let raw_value = r.read_i32::<LittleEndian>()?;
            self.sink.on_event(&Event::XmlAttribute {
                namespace,
                name,
                raw_value,
            })?;
            self.decode_resource_value(r)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::stream::ResourceStream;
    use crate::testutil::{manifest_fixture, table_fixture, MF_APPLICATION, MF_MANIFEST};
    use crate::value::ValueType;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;

    fn decode_all(bytes: &[u8]) -> Result<Vec<Event>> {
        let mut log = EventLog::default();
        let mut decoder = ResourceDecoder::new(&mut log);
        let mut stream = ResourceStream::new(Cursor::new(bytes));
        while decoder.decode(&mut stream)?.is_some() {}
        Ok(log.events)
    }

    #[test]
    fn empty_input_is_a_clean_end() {
        let mut log = EventLog::default();
        let mut decoder = ResourceDecoder::new(&mut log);
        let mut stream = ResourceStream::new(Cursor::new(&[][..]));
        assert!(decoder.decode(&mut stream).unwrap().is_none());
        assert!(log.events.is_empty());
    }

    #[test]
    fn rejects_bad_chunk_framing() {
        // header_size of 4 is smaller than the chunk header itself
        let bytes = [0x00u8, 0x00, 4, 0, 16, 0, 0, 0];
        assert!(matches!(decode_all(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn manifest_event_order() {
        crate::tests::init_logger();
        let events = decode_all(&manifest_fixture()).unwrap();
        let shape: Vec<&Event> = events
            .iter()
            .filter(|event| !matches!(event, Event::ChunkStart(_)))
            .collect();
        assert!(matches!(shape[0], Event::XmlStart));
        match shape[1] {
            Event::StringPool(pool) => {
                assert_eq!(pool.len(), 6);
                assert_eq!(pool.get(MF_MANIFEST), Some("manifest"));
            }
            other => panic!("expected string pool, got {other:?}"),
        }
        match shape[2] {
            Event::XmlResourceMap(map) => {
                assert_eq!(map.get(&0x0101_021b), Some(&0));
                assert_eq!(map.get(&0x0101_000f), Some(&1));
            }
            other => panic!("expected resource map, got {other:?}"),
        }
        assert!(matches!(shape[3], Event::XmlNode { .. }));
        assert!(matches!(shape[4], Event::XmlStartNamespace { .. }));
        assert!(matches!(
            shape[6],
            Event::XmlStartElement {
                name,
                attr_count: 1,
                ..
            } if *name == MF_MANIFEST
        ));
        assert!(matches!(shape[7], Event::XmlAttribute { .. }));
        match shape[8] {
            Event::ResourceValue { value, .. } => {
                assert_eq!(value.data_type, ValueType::IntDec as u8);
                assert_eq!(value.int_value(), 42);
            }
            other => panic!("expected value, got {other:?}"),
        }
        assert!(matches!(
            shape[10],
            Event::XmlStartElement { name, .. } if *name == MF_APPLICATION
        ));
        assert!(matches!(shape.last(), Some(Event::XmlEnd)));
        let ends = shape
            .iter()
            .filter(|event| matches!(event, Event::XmlEndElement { .. }))
            .count();
        assert_eq!(ends, 2);
    }

    #[test]
    fn table_event_order_and_implicit_spec_ends() {
        let events = decode_all(&table_fixture()).unwrap();
        let names: Vec<String> = events
            .iter()
            .filter(|event| !matches!(event, Event::ChunkStart(_)))
            .map(|event| {
                let debug = format!("{event:?}");
                debug
                    .split([' ', '('])
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        assert_eq!(
            names,
            [
                "TableStart",
                "StringPool",
                "TablePackageStart",
                "StringPool",
                "StringPool",
                "TableTypeSpecStart",
                "TableTypeStart",
                "TableEntryStart",
                "ResourceValue",
                "TableEntryEnd",
                "TableTypeEnd",
                "TableTypeSpecEnd",
                "TableTypeSpecStart",
                "TableTypeStart",
                "TableEntryStart",
                "ResourceValue",
                "TableEntryEnd",
                "TableTypeEnd",
                "TableTypeSpecEnd",
                "TablePackageEnd",
                "TableEnd",
            ]
        );
        match &events[events
            .iter()
            .position(|event| matches!(event, Event::TablePackageStart { .. }))
            .unwrap()]
        {
            Event::TablePackageStart { id, name, .. } => {
                assert_eq!(*id, 0x7f);
                assert_eq!(name, "com.example");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn string_pool_offset_aliasing() {
        // Three entries, the third aliasing the first's offset.
        let mut w = Cursor::new(Vec::new());
        w.write_u16::<LittleEndian>(ChunkType::StringPool as u16).unwrap();
        w.write_u16::<LittleEndian>(28).unwrap();
        w.write_u32::<LittleEndian>(56).unwrap();
        w.write_u32::<LittleEndian>(3).unwrap();
        w.write_u32::<LittleEndian>(0).unwrap();
        w.write_u32::<LittleEndian>(StringPool::UTF8_FLAG).unwrap();
        w.write_u32::<LittleEndian>(40).unwrap();
        w.write_u32::<LittleEndian>(0).unwrap();
        for offset in [0u32, 8, 0] {
            w.write_u32::<LittleEndian>(offset).unwrap();
        }
        for s in ["alpha", "beta"] {
            w.write_u8(s.len() as u8).unwrap();
            w.write_u8(s.len() as u8).unwrap();
            std::io::Write::write_all(&mut w, s.as_bytes()).unwrap();
            w.write_u8(0).unwrap();
        }
        w.write_u8(0).unwrap(); // pad
        let events = decode_all(&w.into_inner()).unwrap();
        match &events[1] {
            Event::StringPool(pool) => {
                assert_eq!(pool.get(0), Some("alpha"));
                assert_eq!(pool.get(1), Some("beta"));
                assert_eq!(pool.get(2), Some("alpha"));
            }
            other => panic!("expected string pool, got {other:?}"),
        }
    }

    #[test]
    fn utf16_pool_strings() {
        let mut w = Cursor::new(Vec::new());
        w.write_u16::<LittleEndian>(ChunkType::StringPool as u16).unwrap();
        w.write_u16::<LittleEndian>(28).unwrap();
        w.write_u32::<LittleEndian>(44).unwrap();
        w.write_u32::<LittleEndian>(1).unwrap();
        w.write_u32::<LittleEndian>(0).unwrap();
        w.write_u32::<LittleEndian>(0).unwrap(); // utf-16
        w.write_u32::<LittleEndian>(32).unwrap();
        w.write_u32::<LittleEndian>(0).unwrap();
        w.write_u32::<LittleEndian>(0).unwrap();
        w.write_u16::<LittleEndian>(4).unwrap();
        for unit in "héllo".encode_utf16().take(4) {
            w.write_u16::<LittleEndian>(unit).unwrap();
        }
        w.write_u16::<LittleEndian>(0).unwrap();
        let events = decode_all(&w.into_inner()).unwrap();
        match &events[1] {
            Event::StringPool(pool) => assert_eq!(pool.get(0), Some("héll")),
            other => panic!("expected string pool, got {other:?}"),
        }
    }
}
