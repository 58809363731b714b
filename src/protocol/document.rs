//! Parsed response tree
//!
//! A deliberately small element tree built from `quick-xml` events. API
//! responses are attribute-heavy and shallow, so the tree keeps attributes in
//! document order and text only where the server actually sends it.

use super::path::DocPath;
use super::ProtocolError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A child of an element: either a nested element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
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

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn attribute_map(&self) -> BTreeMap<String, String> {
        self.attributes.iter().cloned().collect()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text runs.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// First element matching a relative path such as `query/pages/page`.
    ///
    /// Panics never; an unparsable path simply finds nothing.
    pub fn find(&self, path: &str) -> Option<&Element> {
        let path: DocPath = path.parse().ok()?;
        path.first_element(self)
    }

    /// Concatenated direct text content, `None` when the element has none.
    pub fn text(&self) -> Option<String> {
        let mut out: Option<String> = None;
        for node in &self.children {
            if let Node::Text(t) = node {
                out.get_or_insert_with(String::new).push_str(t);
            }
        }
        out
    }

    pub(crate) fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack: Vec<&Element> = self.elements().collect();
        stack.reverse();
        while let Some(e) = stack.pop() {
            out.push(e);
            let before = stack.len();
            stack.extend(e.elements());
            stack[before..].reverse();
        }
        out
    }
}

/// A well-formed markup document with exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse raw response bytes. Checks well-formedness only; recognizing the
    /// root as an API document is the response parser's job.
    pub fn parse(input: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(input).map_err(not_xml)?;
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(not_xml("multiple root elements"));
                    }
                    stack.push(element_from(&start)?);
                }
                Ok(Event::Empty(start)) => {
                    let element = element_from(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| not_xml("unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(not_xml)?;
                    push_text(&mut stack, text)?;
                }
                Ok(Event::CData(c)) => {
                    let raw = c.into_inner();
                    push_text(&mut stack, String::from_utf8_lossy(&raw))?;
                }
                Ok(Event::Eof) => break,
                // declarations, comments, processing instructions, doctype
                Ok(_) => {}
                Err(e) => return Err(not_xml(e)),
            }
        }

        if let Some(open) = stack.last() {
            return Err(not_xml(format!("unclosed element <{}>", open.name)));
        }
        root.map(Document::new)
            .ok_or_else(|| not_xml("document has no root element"))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Shorthand for `root().find(path)`.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.root.find(path)
    }
}

fn not_xml(reason: impl ToString) -> ProtocolError {
    ProtocolError::NotXml {
        reason: reason.to_string(),
        hint: None,
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, ProtocolError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(not_xml)?
        .to_string();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(not_xml)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(not_xml)?
            .to_string();
        let value = attr.unescape_value().map_err(not_xml)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ProtocolError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(not_xml("multiple root elements")),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: Cow<'_, str>) -> Result<(), ProtocolError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Text(text.into_owned())),
        None if text.trim().is_empty() => {}
        None => return Err(not_xml("text outside of the root element")),
    }
    Ok(())
}
