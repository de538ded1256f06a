//! In-memory CIM-XML element tree and its serialization with quick-xml.

use std::borrow::Cow;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::XmlError;

/// Child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Element serialized to text and emitted as escaped character data,
    /// as used for embedded objects inside `VALUE`.
    Embedded(Element),
}

/// A CIM-XML element with attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Element {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    /// Add the attribute only when `value` is present.
    pub fn opt_attr<V: Into<String>>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Add a `true`/`false` attribute when `value` is present.
    pub fn bool_attr(self, name: &'static str, value: Option<bool>) -> Self {
        self.opt_attr(name, value.map(|v| if v { "true" } else { "false" }))
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn opt_child(self, child: Option<Element>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }

    pub fn children_from(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn embedded(mut self, element: Element) -> Self {
        self.children.push(Node::Embedded(element));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(&'static str, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated text content of the direct children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Serialize the element. With `indent`, child elements are put on their
    /// own lines indented by that many spaces per level.
    pub fn to_xml_string(&self, indent: Option<usize>) -> Result<String, XmlError> {
        let mut writer = match indent {
            Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
            None => Writer::new(Vec::new()),
        };
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner())
            .map_err(|err| XmlError::Xml(format!("invalid UTF-8: {err}")))
    }
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|err| XmlError::Xml(err.to_string()))
}

/// Escape `&`, `<`, `>` and `"` in text and attribute values. Apostrophes
/// stay literal.
fn escape_markup(raw: &str) -> Cow<'_, str> {
    let escaped = partial_escape(raw);
    if escaped.contains('"') {
        Cow::Owned(escaped.replace('"', "&quot;"))
    } else {
        escaped
    }
}

fn write_text<W: std::io::Write>(writer: &mut Writer<W>, text: &str) -> Result<(), XmlError> {
    write_event(writer, Event::Text(BytesText::from_escaped(escape_markup(text))))
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name);
    for (name, value) in &element.attributes {
        let value = escape_markup(value);
        start.push_attribute((name.as_bytes(), value.as_bytes()));
    }
    if element.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }
    write_event(writer, Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(text) => write_text(writer, text)?,
            Node::Embedded(e) => write_text(writer, &e.to_xml_string(None)?)?,
        }
    }
    write_event(writer, Event::End(BytesEnd::new(element.name)))
}
