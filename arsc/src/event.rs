use crate::chunk::Chunk;
use crate::config::ResourceConfig;
use crate::pool::StringPool;
use crate::value::ResourceValue;
use crate::Result;
use std::collections::HashMap;
use std::rc::Rc;

/// The fixed vocabulary of events the chunk decoder emits, in file order.
///
/// Container chunks bracket their children with start/end pairs; a
/// `TableTypeSpecEnd` is synthesized before the next type spec or the
/// package end, since the format has no explicit close record for specs.
#[derive(Clone, Debug)]
pub enum Event {
    /// Every chunk announces itself before its payload is decoded.
    ChunkStart(Chunk),
    /// An 8-byte typed value, with the absolute file offset of its record.
    ResourceValue { offset: u64, value: ResourceValue },
    /// A fully decoded string pool. Shared so downstream filters can keep
    /// it for the rest of the pass.
    StringPool(Rc<StringPool>),

    TableStart {
        package_count: u32,
    },
    TablePackageStart {
        id: u32,
        name: String,
        type_strings: u32,
        last_public_type: u32,
        key_strings: u32,
        last_public_key: u32,
    },
    TableTypeSpecStart {
        id: u8,
        configs: Vec<u32>,
    },
    TableTypeStart {
        id: u8,
        config: ResourceConfig,
        entry_count: u32,
        entry_start: u32,
        offsets: Vec<u32>,
    },
    TableEntryStart {
        /// Index of the entry within its type.
        id: u32,
        flags: u16,
        key: u32,
        parent: u32,
        count: u32,
    },
    TableEntryMapName {
        name: u32,
    },
    TableEntryEnd,
    TableTypeEnd,
    TableTypeSpecEnd,
    TablePackageEnd,
    TableEnd,

    XmlStart,
    /// Maps resource ids to their string-pool index.
    XmlResourceMap(HashMap<u32, u32>),
    XmlNode {
        line_number: u32,
        comment: i32,
    },
    XmlStartNamespace {
        prefix: i32,
        uri: i32,
    },
    XmlStartElement {
        namespace: i32,
        name: i32,
        attr_start: u16,
        attr_size: u16,
        attr_count: u16,
        id_index: u16,
        class_index: u16,
        style_index: u16,
    },
    XmlAttribute {
        namespace: i32,
        name: i32,
        raw_value: i32,
    },
    XmlCdata {
        index: i32,
    },
    XmlEndElement {
        namespace: i32,
        name: i32,
    },
    XmlEndNamespace {
        prefix: i32,
        uri: i32,
    },
    XmlEnd,
}

/// A consumer of decoder events. Filters implement this, perform their own
/// state update, and forward every event to a successor they own; the
/// chain is linear and acyclic and terminates in a [`NullSink`].
pub trait ContentSink {
    fn on_event(&mut self, event: &Event) -> Result<()>;
}

/// Terminates a filter chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ContentSink for NullSink {
    fn on_event(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }
}

impl<S: ContentSink + ?Sized> ContentSink for &mut S {
    fn on_event(&mut self, event: &Event) -> Result<()> {
        (**self).on_event(event)
    }
}

/// Records every event it sees; test helper and debugging aid.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
}

impl ContentSink for EventLog {
    fn on_event(&mut self, event: &Event) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}
