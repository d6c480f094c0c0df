//! Filters over binary-XML events: document assembly and element removal.
//!
//! Removal never rewrites the document. Each matched element is covered by
//! extending the `total_size` of the chunk that precedes it, so the next
//! decode skips straight past the element while every other byte of the
//! file stays put.

use crate::chunk::Chunk;
use crate::document::{Document, Element, Node};
use crate::event::{ContentSink, Event};
use crate::pool::StringPool;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Shared traversal state for XML filters: the document's string pool, the
/// live namespace prefixes, and the stack of open elements.
#[derive(Debug, Default)]
pub(crate) struct XmlScope {
    pool: Option<Rc<StringPool>>,
    namespaces: Vec<(String, String)>,
    stack: Vec<Element>,
    attr_namespace: Option<String>,
    attr_name: Option<String>,
}

pub(crate) enum XmlStep {
    None,
    /// An element closed; it is reachable through [`XmlScope::last_closed`].
    Closed,
    /// The document ended. Carries the root when it had exactly one.
    End(Option<Element>),
}

impl XmlScope {
    pub fn inside(&self) -> bool {
        !self.stack.is_empty()
    }

    fn lookup(&self, index: i32) -> Option<String> {
        self.pool
            .as_ref()
            .and_then(|pool| pool.get(index))
            .map(str::to_string)
    }

    /// Prefixes `name` with the prefix bound to `uri`, if any is in scope.
    fn qualified(&self, name: String, uri: &str) -> String {
        for (prefix, bound_uri) in &self.namespaces {
            if bound_uri == uri {
                return format!("{prefix}:{name}");
            }
        }
        name
    }

    pub fn apply(&mut self, event: &Event) -> Result<XmlStep> {
        match event {
            Event::XmlStart => {
                self.stack = vec![Element::new("root")];
            }
            Event::StringPool(pool) if self.inside() => {
                self.pool = Some(pool.clone());
            }
            Event::XmlStartNamespace { prefix, uri } => {
                let pair = (
                    self.lookup(*prefix).unwrap_or_default(),
                    self.lookup(*uri).unwrap_or_default(),
                );
                // newest binding shadows older ones with the same uri
                self.namespaces.insert(0, pair);
            }
            Event::XmlEndNamespace { prefix, uri } => {
                let pair = (
                    self.lookup(*prefix).unwrap_or_default(),
                    self.lookup(*uri).unwrap_or_default(),
                );
                if let Some(at) = self.namespaces.iter().rposition(|p| *p == pair) {
                    self.namespaces.remove(at);
                }
            }
            Event::XmlStartElement {
                namespace, name, ..
            } => {
                let name = self.lookup(*name).unwrap_or_default();
                let name = match self.lookup(*namespace) {
                    Some(uri) => self.qualified(name, &uri),
                    None => name,
                };
                self.stack.push(Element::new(name));
            }
            Event::XmlAttribute {
                namespace, name, ..
            } => {
                self.attr_namespace = self.lookup(*namespace);
                self.attr_name = self.lookup(*name);
            }
            Event::ResourceValue { value, .. } if self.inside() => {
                if let Some(name) = self.attr_name.take() {
                    let name = match self.attr_namespace.take() {
                        Some(uri) => self.qualified(name, &uri),
                        None => name,
                    };
                    let formatted = value.format(self.pool.as_deref());
                    if let Some(top) = self.stack.last_mut() {
                        top.set_attribute(name, formatted);
                    }
                }
            }
            Event::XmlCdata { index } => {
                let text = self.lookup(*index).unwrap_or_default();
                if let Some(top) = self.stack.last_mut() {
                    top.append_text(text);
                }
            }
            Event::XmlEndElement { .. } => {
                let closed = self
                    .stack
                    .pop()
                    .ok_or_else(|| Error::Format("unbalanced xml element events".into()))?;
                match self.stack.last_mut() {
                    Some(parent) => parent.append_element(closed),
                    None => return Err(Error::Format("unbalanced xml element events".into())),
                }
                return Ok(XmlStep::Closed);
            }
            Event::XmlEnd => {
                let mut root = self
                    .stack
                    .pop()
                    .ok_or_else(|| Error::Format("xml end without xml start".into()))?;
                self.stack.clear();
                self.pool = None;
                self.namespaces.clear();
                let mut elements: Vec<Element> = root
                    .take_children()
                    .into_iter()
                    .filter_map(|node| match node {
                        Node::Element(element) => Some(element),
                        Node::Text(_) => None,
                    })
                    .collect();
                let document_root = if elements.len() == 1 {
                    elements.pop()
                } else {
                    None
                };
                return Ok(XmlStep::End(document_root));
            }
            _ => {}
        }
        Ok(XmlStep::None)
    }

    /// The element most recently appended to the top of the stack.
    pub fn last_closed(&self) -> Option<&Element> {
        self.stack.last().and_then(|top| {
            top.children().iter().rev().find_map(|node| match node {
                Node::Element(element) => Some(element),
                Node::Text(_) => None,
            })
        })
    }
}

/// An element selector in a CSS-like syntax:
/// `action[android:name=com.example.intro]` matches an `action` element
/// whose `android:name` attribute equals `com.example.intro`. Additional
/// `[name=value]` components select on more attributes.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct XmlSelector {
    element_name: String,
    attributes: BTreeMap<String, String>,
}

impl XmlSelector {
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut parts = pattern.split(['[', ']']);
        let element_name = parts.next().unwrap_or_default().to_string();
        if element_name.is_empty() {
            return Err(Error::Argument(format!(
                "selector {pattern:?} has no element name"
            )));
        }
        let mut attributes = BTreeMap::new();
        for part in parts.filter(|part| !part.is_empty()) {
            let (name, value) = part.split_once('=').ok_or_else(|| {
                Error::Argument(format!("expected name=value in selector {pattern:?}"))
            })?;
            attributes.insert(name.to_string(), value.to_string());
        }
        Ok(Self {
            element_name,
            attributes,
        })
    }

    /// True when the element has the selected name and all selected
    /// attributes with the selected values.
    pub fn matches(&self, element: &Element) -> bool {
        if element.name() != self.element_name {
            return false;
        }
        let mut wanted = self.attributes.clone();
        for (name, value) in element.attributes() {
            if let Some(expected) = wanted.remove(name) {
                if expected != *value {
                    return false;
                }
            }
        }
        wanted.is_empty()
    }
}

impl fmt::Display for XmlSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element_name)?;
        for (name, value) in &self.attributes {
            write!(f, "[{name}={value}]")?;
        }
        Ok(())
    }
}

/// Reassembles the document from a compiled XML stream.
pub struct XmlToDocument<S> {
    scope: XmlScope,
    document: Option<Document>,
    next: S,
}

impl<S: ContentSink> XmlToDocument<S> {
    pub fn new(next: S) -> Self {
        Self {
            scope: XmlScope::default(),
            document: None,
            next,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn next(&self) -> &S {
        &self.next
    }

    pub fn next_mut(&mut self) -> &mut S {
        &mut self.next
    }
}

impl<S: ContentSink> ContentSink for XmlToDocument<S> {
    fn on_event(&mut self, event: &Event) -> Result<()> {
        if matches!(event, Event::XmlStart) {
            self.document = None;
        }
        if let XmlStep::End(root) = self.scope.apply(event)? {
            self.document = root.map(Document::new);
        }
        self.next.on_event(event)
    }
}

/// Locates elements matched by the given selectors and accumulates the
/// chunk edits that remove them. Each edit extends the `total_size` of the
/// chunk preceding the matched element so that a subsequent decode skips
/// the element and everything inside it.
pub struct XmlElementMatcher<S> {
    selectors: Vec<XmlSelector>,
    scope: XmlScope,
    chunks: Vec<Chunk>,
    changes: HashSet<Chunk>,
    start_offsets: Vec<u64>,
    next: S,
}

impl<S: ContentSink> XmlElementMatcher<S> {
    pub fn new(patterns: impl IntoIterator<Item = String>, next: S) -> Result<Self> {
        let mut selectors = Vec::new();
        for pattern in patterns {
            let selector = XmlSelector::parse(&pattern)?;
            if !selectors.contains(&selector) {
                selectors.push(selector);
            }
        }
        Ok(Self {
            selectors,
            scope: XmlScope::default(),
            chunks: Vec::new(),
            changes: HashSet::new(),
            start_offsets: Vec::new(),
            next,
        })
    }

    pub fn selectors(&self) -> &[XmlSelector] {
        &self.selectors
    }

    /// The chunk headers to rewrite, with their new sizes.
    pub fn changes(&self) -> &HashSet<Chunk> {
        &self.changes
    }

    pub fn next(&self) -> &S {
        &self.next
    }

    pub fn next_mut(&mut self) -> &mut S {
        &mut self.next
    }

    fn on_element_closed(&mut self, start_offset: u64) -> Result<()> {
        let matched = self
            .scope
            .last_closed()
            .map(|element| self.selectors.iter().any(|s| s.matches(element)))
            .unwrap_or(false);
        if !matched {
            return Ok(());
        }
        // Drop the end-element chunk, then roll back to the chunk that
        // precedes the start element; extending that one hides the whole
        // element. A previously extended chunk may be re-extended.
        let end = self
            .chunks
            .pop()
            .ok_or_else(|| Error::Format("matched element without chunks".into()))?;
        self.changes.remove(&end);
        let next_offset = end.end();
        let mut chunk = loop {
            let candidate = self
                .chunks
                .pop()
                .ok_or_else(|| Error::Format("no chunk precedes the matched element".into()))?;
            self.changes.remove(&candidate);
            if candidate.offset < start_offset {
                break candidate;
            }
        };
        if chunk.end() != start_offset {
            return Err(Error::Format(format!(
                "chunk gap before element at {start_offset:#x}"
            )));
        }
        chunk.total_size = u32::try_from(next_offset - chunk.offset).map_err(|_| {
            Error::Format(format!(
                "resized chunk at {:#x} exceeds the format's size range",
                chunk.offset
            ))
        })?;
        self.chunks.push(chunk);
        self.changes.insert(chunk);
        Ok(())
    }
}

impl<S: ContentSink> ContentSink for XmlElementMatcher<S> {
    fn on_event(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::ChunkStart(chunk) if self.scope.inside() => {
                self.chunks.push(*chunk);
            }
            Event::XmlStartElement { .. } => {
                let offset = self
                    .chunks
                    .last()
                    .map(|chunk| chunk.offset)
                    .ok_or_else(|| Error::Format("element without a chunk".into()))?;
                self.start_offsets.push(offset);
            }
            _ => {}
        }
        match self.scope.apply(event)? {
            XmlStep::Closed => {
                let start_offset = self
                    .start_offsets
                    .pop()
                    .ok_or_else(|| Error::Format("unbalanced xml element events".into()))?;
                self.on_element_closed(start_offset)?;
            }
            XmlStep::End(_) => {
                self.chunks.clear();
                self.start_offsets.clear();
            }
            XmlStep::None => {}
        }
        self.next.on_event(event)
    }
}
