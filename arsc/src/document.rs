//! In-memory XML tree assembled by the terminal filters, and the resolver
//! that rewrites raw resource ids into symbolic names when printing.

use crate::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::Writer;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{BufRead, Write};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with ordered attributes and children. Names are the
/// qualified names from the source document, prefix included.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets an attribute, replacing any existing attribute of that name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn append_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn append_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub(crate) fn take_children(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.children)
    }

    fn write<W: Write>(&self, w: &mut Writer<W>, resolver: Option<&Resolver>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            let value = match resolver {
                Some(resolver) => resolver.resolve(value),
                None => Cow::Borrowed(value.as_str()),
            };
            start.push_attribute((name.as_str(), value.as_ref()));
        }
        if self.children.is_empty() {
            w.write_event(XmlEvent::Empty(start))?;
            return Ok(());
        }
        w.write_event(XmlEvent::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(w, resolver)?,
                Node::Text(text) => w.write_event(XmlEvent::Text(BytesText::new(text)))?,
            }
        }
        w.write_event(XmlEvent::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// A rooted document, pretty-printed with four-space indentation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn write_xml<W: Write>(&self, w: W, resolver: Option<&Resolver>) -> Result<()> {
        let mut writer = Writer::new_with_indent(w, b' ', 4);
        writer.write_event(XmlEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.root.write(&mut writer, resolver)?;
        let mut w = writer.into_inner();
        w.write_all(b"\n")?;
        Ok(())
    }

    pub fn to_string_pretty(&self, resolver: Option<&Resolver>) -> Result<String> {
        let mut out = Vec::new();
        self.write_xml(&mut out, resolver)?;
        Ok(String::from_utf8(out)?)
    }
}

/// Maps `0x%08x` id strings to `type/name` declarations and substitutes
/// them into attribute values at print time. A value starting with `@` or
/// `?` keeps its sigil; a `$` value is an entry-map name and is rewritten
/// with the type segment dropped.
#[derive(Debug, Default)]
pub struct Resolver {
    map: HashMap<String, String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, id: String, name: String) {
        self.map.insert(id, name);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        self.map.extend(entries);
    }

    /// Reads `key=value` lines; blank lines and `#` or `!` comments are
    /// skipped, as are lines without a separator.
    pub fn load_properties(r: impl BufRead) -> Result<Vec<(String, String)>> {
        let mut entries = Vec::new();
        for line in r.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                entries.push((key.trim().to_string(), value.trim().to_string()));
            }
        }
        Ok(entries)
    }

    pub fn resolve<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let (sigil, id) = match value.as_bytes().first() {
            Some(b'@') | Some(b'?') | Some(b'$') => (&value[..1], &value[1..]),
            _ => ("", value),
        };
        if id.starts_with("0x") {
            if let Some(resolved) = self.map.get(id) {
                return if sigil == "$" {
                    Cow::Owned(trim_type(resolved))
                } else {
                    Cow::Owned(format!("{sigil}{resolved}"))
                };
            }
        }
        Cow::Borrowed(value)
    }

    /// The referenced ids that have no declaration, sorted for stable
    /// reporting.
    pub fn unresolved(&self, references: &HashSet<String>) -> Vec<String> {
        references
            .iter()
            .filter(|id| !self.map.contains_key(*id))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// `android:attr/name` becomes `android:name`; `bool/checked` becomes
/// `checked`.
fn trim_type(name: &str) -> String {
    let colon = name.find(':').map(|i| i + 1).unwrap_or(0);
    let slash = name.find('/').map(|i| i + 1).unwrap_or(0);
    format!("{}{}", &name[..colon], &name[slash..])
}
