//! Filters over resource-table events: pretty-dump document assembly,
//! pattern matching for value edits, and id-to-name mapping.

use crate::config::ResourceConfig;
use crate::document::{Document, Element};
use crate::event::{ContentSink, Event};
use crate::ids::{self, make_id};
use crate::pool::StringPool;
use crate::value::{ResourceValue, ValueType};
use crate::{Error, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

/// Shared bookkeeping for table filters: which string pool is which, and
/// where we are in the package/type-spec traversal.
///
/// Pools arrive in a fixed order: the value pool right after the table
/// starts, then per package the type-name pool and the key pool, each only
/// if the package header announced it with a nonzero offset.
#[derive(Debug, Default)]
pub(crate) struct TablePools {
    started: bool,
    values: Option<Rc<StringPool>>,
    types: Option<Rc<StringPool>>,
    keys: Option<Rc<StringPool>>,
    has_type_pool: bool,
    has_key_pool: bool,
    package_id: u32,
    type_spec_index: usize,
    current_type: String,
}

impl TablePools {
    pub fn apply(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::TableStart { .. } => {
                self.started = true;
            }
            Event::StringPool(pool) if self.started => {
                if self.values.is_none() {
                    self.values = Some(pool.clone());
                } else if self.has_type_pool && self.types.is_none() {
                    self.types = Some(pool.clone());
                } else if self.has_key_pool && self.keys.is_none() {
                    self.keys = Some(pool.clone());
                } else {
                    return Err(Error::Format("unexpected string pool in table".into()));
                }
            }
            Event::TablePackageStart {
                id,
                type_strings,
                key_strings,
                ..
            } => {
                self.package_id = *id;
                self.has_type_pool = *type_strings != 0;
                self.has_key_pool = *key_strings != 0;
            }
            Event::TableTypeSpecStart { .. } => {
                self.current_type = self.pool_name(&self.types, self.type_spec_index as u32);
                self.type_spec_index += 1;
            }
            Event::TablePackageEnd => {
                self.package_id = 0;
                self.type_spec_index = 0;
                self.types = None;
                self.keys = None;
            }
            Event::TableEnd => {
                self.started = false;
                self.values = None;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn value_pool(&self) -> Option<&StringPool> {
        self.values.as_deref()
    }

    /// Name of the type spec currently being traversed. Type names are
    /// keyed by spec ordinal, not by the type id byte.
    pub fn current_type(&self) -> &str {
        &self.current_type
    }

    pub fn key_name(&self, key: u32) -> String {
        self.pool_name(&self.keys, key)
    }

    /// Resource id of an entry of the current type in the current package.
    pub fn entry_res_id(&self, entry: u32) -> u32 {
        make_id(
            self.package_id.wrapping_sub(1),
            self.type_spec_index.wrapping_sub(1) as u32,
            entry,
        )
    }

    fn pool_name(&self, pool: &Option<Rc<StringPool>>, index: u32) -> String {
        pool.as_ref()
            .and_then(|p| p.get(index as i32))
            .unwrap_or_default()
            .to_string()
    }
}

/// Builds a printable document from a resource table, while recording the
/// `0x%08x` id strings it declares and references so the printer can
/// substitute names.
pub struct TableToDocument<S> {
    pools: TablePools,
    declarations: HashMap<String, String>,
    references: HashSet<String>,
    stack: Vec<Element>,
    document: Option<Document>,
    is_complex: bool,
    entry_map_name: u32,
    next: S,
}

impl<S: ContentSink> TableToDocument<S> {
    pub fn new(next: S) -> Self {
        Self {
            pools: TablePools::default(),
            declarations: HashMap::new(),
            references: HashSet::new(),
            stack: Vec::new(),
            document: None,
            is_complex: false,
            entry_map_name: 0,
            next,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Id strings declared by the table, mapped to `type/name`.
    pub fn declarations(&self) -> &HashMap<String, String> {
        &self.declarations
    }

    /// Id strings referenced from values.
    pub fn references(&self) -> &HashSet<String> {
        &self.references
    }

    pub fn next(&self) -> &S {
        &self.next
    }

    pub fn next_mut(&mut self) -> &mut S {
        &mut self.next
    }

    fn push(&mut self, element: Element) {
        self.stack.push(element);
    }

    fn pop(&mut self) -> Result<()> {
        let closed = self
            .stack
            .pop()
            .ok_or_else(|| Error::Format("unbalanced table events".into()))?;
        match self.stack.last_mut() {
            Some(parent) => parent.append_element(closed),
            None => self.document = Some(Document::new(closed)),
        }
        Ok(())
    }

    fn top(&mut self) -> Result<&mut Element> {
        self.stack
            .last_mut()
            .ok_or_else(|| Error::Format("table value outside any element".into()))
    }

    fn reference_id(&mut self, res_id: u32) -> String {
        let id = format!("{res_id:#010x}");
        self.references.insert(id.clone());
        id
    }

    fn format_name(&mut self, res_id: u32) -> String {
        format!("${}", self.reference_id(res_id))
    }

    fn format_value(&mut self, value: &ResourceValue) -> String {
        match ValueType::from_u8(value.data_type) {
            Some(ValueType::Attribute) => format!("?{}", self.reference_id(value.int_value())),
            Some(ValueType::Reference) if value.int_value() != 0 => {
                format!("@{}", self.reference_id(value.int_value()))
            }
            _ => value.format(self.pools.value_pool()),
        }
    }

    fn attr_value_element(&mut self, name: u32, value: &ResourceValue) -> Element {
        let mut node = Element::new("value");
        match name {
            ids::ATTR_TYPE => {
                node.set_attribute("allowedtypes", ids::format_allowed_types(value.int_value()));
            }
            ids::ATTR_MIN => node.set_attribute("minvalue", value.format(None)),
            ids::ATTR_MAX => node.set_attribute("maxvalue", value.format(None)),
            ids::ATTR_L10N => {
                let mode = if value.int_value() == ids::ATTR_L10N_NOT_REQUIRED {
                    "notrequired"
                } else {
                    "suggested"
                };
                node.set_attribute("localisation", mode);
            }
            ids::ATTR_OTHER => node.set_attribute("quantity", value.format(None)),
            ids::ATTR_ZERO | ids::ATTR_ONE | ids::ATTR_TWO | ids::ATTR_FEW | ids::ATTR_MANY => {
                node.set_attribute("quantity", ids::quantity_name(name).unwrap_or_default());
            }
            _ => {
                let formatted_name = self.format_name(name);
                node.set_attribute("name", formatted_name);
                let formatted = self.format_value(value);
                node.set_attribute("value", formatted);
            }
        }
        node
    }

    fn config_element(config: &ResourceConfig) -> Element {
        let mut node = Element::new("configuration");
        if config.mcc != 0 {
            node.set_attribute("mcc", config.mcc.to_string());
        }
        if config.mnc != 0 {
            node.set_attribute("mnc", config.mnc.to_string());
        }
        if !config.language.is_empty() {
            node.set_attribute("language", config.language.clone());
        }
        if !config.country.is_empty() {
            node.set_attribute("country", config.country.clone());
        }
        if config.orientation != 0 {
            node.set_attribute("orientation", config.orientation_qualifier());
        }
        if config.touchscreen != 0 {
            node.set_attribute("touchscreen", config.touchscreen.to_string());
        }
        if config.density != 0 {
            node.set_attribute("density", config.density_qualifier());
        }
        if config.keyboard != 0 {
            node.set_attribute("keyboard", config.keyboard.to_string());
        }
        if config.navigation != 0 {
            node.set_attribute("navigation", config.navigation.to_string());
        }
        if config.input_flags != 0 {
            node.set_attribute("inputflags", format!("{:#x}", config.input_flags));
        }
        if config.screen_width != 0 {
            node.set_attribute("screenwidth", config.screen_width.to_string());
        }
        if config.screen_height != 0 {
            node.set_attribute("screenheight", config.screen_height.to_string());
        }
        if config.sdk_version != 0 {
            node.set_attribute("sdkversion", config.sdk_version.to_string());
        }
        if config.screen_layout != 0 {
            node.set_attribute("screenLayout", config.screen_layout.to_string());
        }
        if config.ui_mode != 0 {
            node.set_attribute("uiMode", config.ui_mode.to_string());
        }
        node
    }
}

impl<S: ContentSink> ContentSink for TableToDocument<S> {
    fn on_event(&mut self, event: &Event) -> Result<()> {
        self.pools.apply(event)?;
        match event {
            Event::TableStart { .. } => {
                self.document = None;
                self.declarations.clear();
                self.references.clear();
                self.stack = vec![Element::new("packages")];
            }
            Event::TablePackageStart { id, name, .. } => {
                let mut node = Element::new("package");
                node.set_attribute("id", format!("{id:#x}"));
                node.set_attribute("name", name.clone());
                self.push(node);
            }
            Event::TableTypeSpecStart { id, .. } => {
                let mut node = Element::new("resourcetype");
                node.set_attribute("id", format!("{id:#x}"));
                node.set_attribute("name", self.pools.current_type().to_string());
                self.push(node);
            }
            Event::TableTypeStart { config, .. } => {
                self.push(Self::config_element(config));
            }
            Event::TableEntryStart {
                id,
                flags,
                key,
                parent,
                ..
            } => {
                let item_name = self.pools.key_name(*key);
                let mut node = Element::new("item");
                node.set_attribute("id", format!("{id:#x}"));
                node.set_attribute("name", item_name.clone());
                self.is_complex = ids::is_complex_entry(*flags);
                if ids::is_public_entry(*flags) {
                    node.set_attribute("ispublic", "true");
                }
                if *parent != 0 {
                    let parent_ref = self.format_name(*parent);
                    node.set_attribute("parentref", parent_ref);
                }
                self.push(node);
                let res_id = self.pools.entry_res_id(*id);
                self.declarations.insert(
                    format!("{res_id:#010x}"),
                    format!("{}/{}", self.pools.current_type(), item_name),
                );
            }
            Event::TableEntryMapName { name } => {
                self.entry_map_name = *name;
            }
            Event::ResourceValue { value, .. } if !self.stack.is_empty() => {
                if !self.is_complex {
                    let formatted = self.format_value(value);
                    self.top()?.set_attribute("value", formatted);
                } else {
                    let child = match self.pools.current_type() {
                        "attr" => self.attr_value_element(self.entry_map_name, value),
                        "array" => {
                            let mut node = Element::new("element");
                            node.set_attribute(
                                "index",
                                ids::get_entry(self.entry_map_name).to_string(),
                            );
                            let formatted = self.format_value(value);
                            node.set_attribute("value", formatted);
                            node
                        }
                        "plurals" => {
                            let mut node = Element::new("quantity");
                            node.set_attribute(
                                "name",
                                ids::quantity_name(self.entry_map_name).unwrap_or_default(),
                            );
                            let formatted = self.format_value(value);
                            node.set_attribute("value", formatted);
                            node
                        }
                        _ => {
                            let mut node = Element::new("value");
                            let name = self.format_name(self.entry_map_name);
                            node.set_attribute("name", name);
                            let formatted = self.format_value(value);
                            node.set_attribute("value", formatted);
                            node
                        }
                    };
                    self.top()?.append_element(child);
                }
            }
            Event::TableEntryEnd => {
                self.entry_map_name = 0;
                self.pop()?;
            }
            Event::TableTypeEnd | Event::TableTypeSpecEnd | Event::TablePackageEnd => {
                self.pop()?;
            }
            Event::TableEnd => {
                self.pop()?;
            }
            _ => {}
        }
        self.next.on_event(event)
    }
}

/// Records the file offset of every simple value whose `R.type.name`
/// matches one of the requested patterns.
pub struct TableAttributeMatcher<S> {
    patterns: BTreeSet<String>,
    matches: HashMap<String, Vec<u64>>,
    pools: TablePools,
    item_name: String,
    is_complex: bool,
    next: S,
}

impl<S: ContentSink> TableAttributeMatcher<S> {
    pub fn new(patterns: impl IntoIterator<Item = String>, next: S) -> Self {
        Self {
            patterns: patterns.into_iter().collect(),
            matches: HashMap::new(),
            pools: TablePools::default(),
            item_name: String::new(),
            is_complex: false,
            next,
        }
    }

    pub fn patterns(&self) -> &BTreeSet<String> {
        &self.patterns
    }

    /// Matched pattern names mapped to the offsets of their value records,
    /// one offset per configuration the entry appears in.
    pub fn matches(&self) -> &HashMap<String, Vec<u64>> {
        &self.matches
    }

    /// Patterns that matched nothing, sorted.
    pub fn unmatched(&self) -> Vec<&str> {
        self.patterns
            .iter()
            .filter(|p| !self.matches.contains_key(*p))
            .map(String::as_str)
            .collect()
    }

    pub fn next(&self) -> &S {
        &self.next
    }

    pub fn next_mut(&mut self) -> &mut S {
        &mut self.next
    }
}

impl<S: ContentSink> ContentSink for TableAttributeMatcher<S> {
    fn on_event(&mut self, event: &Event) -> Result<()> {
        self.pools.apply(event)?;
        match event {
            Event::TableStart { .. } => {
                self.matches.clear();
            }
            Event::TableEntryStart { flags, key, .. } => {
                self.item_name = self.pools.key_name(*key);
                self.is_complex = ids::is_complex_entry(*flags);
            }
            Event::ResourceValue { offset, .. }
                if self.pools.started() && !self.is_complex =>
            {
                let name = format!("R.{}.{}", self.pools.current_type(), self.item_name);
                if self.patterns.contains(&name) {
                    self.matches.entry(name).or_default().push(*offset);
                }
            }
            Event::TableEntryEnd => {
                self.item_name.clear();
            }
            _ => {}
        }
        self.next.on_event(event)
    }
}

/// Maps every resource id in the table to its `type/name`.
pub struct TableResourceMapper<S> {
    references: HashMap<u32, String>,
    pools: TablePools,
    next: S,
}

impl<S: ContentSink> TableResourceMapper<S> {
    pub fn new(next: S) -> Self {
        Self {
            references: HashMap::new(),
            pools: TablePools::default(),
            next,
        }
    }

    pub fn references(&self) -> &HashMap<u32, String> {
        &self.references
    }

    pub fn next(&self) -> &S {
        &self.next
    }
}

impl<S: ContentSink> ContentSink for TableResourceMapper<S> {
    fn on_event(&mut self, event: &Event) -> Result<()> {
        self.pools.apply(event)?;
        if let Event::TableEntryStart { id, key, .. } = event {
            if self.pools.started() {
                let res_id = self.pools.entry_res_id(*id);
                let name = format!("{}/{}", self.pools.current_type(), self.pools.key_name(*key));
                self.references.insert(res_id, name);
            }
        }
        self.next.on_event(event)
    }
}
