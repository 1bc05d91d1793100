// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A minimal XML element tree over `quick-xml`.
//!
//! The report schema is a handful of elements with attributes and text, so
//! both directions of the codec go through one small tree type: the writer
//! builds a tree and serializes it, the aggregator parses fragments back
//! into trees to splice them together, and the loader queries the tree.
//! Summary counts are computed by walking the finished tree rather than
//! tracked while building it.

use crate::errors::XmlError;
use indexmap::IndexMap;
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};
use std::io;

/// One XML element: a name, attributes in insertion order, direct text
/// content, and child elements.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Element {
    pub(crate) name: String,
    pub(crate) attrs: IndexMap<String, String>,
    pub(crate) text: String,
    pub(crate) children: Vec<Element>,
}

impl Element {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub(crate) fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub(crate) fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// The first direct child with the given name.
    pub(crate) fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All direct children with the given name, in document order.
    pub(crate) fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Number of elements with the given name anywhere below this one.
    pub(crate) fn descendant_count(&self, name: &str) -> usize {
        self.children
            .iter()
            .map(|child| usize::from(child.name == name) + child.descendant_count(name))
            .sum()
    }
}

/// Parses a document with exactly one root element into a tree.
pub(crate) fn parse_str(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                // The reader itself rejects mismatched end tags.
                let element = stack.pop().ok_or(XmlError::NoRoot)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::UnexpectedEof);
    }
    root.ok_or(XmlError::NoRoot)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        element.attrs.insert(
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        );
    }
    Ok(element)
}

fn attach(
    element: Element,
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_some() => return Err(XmlError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}

/// Serializes one element as a bare fragment: no declaration, no
/// pretty-printing, exactly one root element.
pub(crate) fn serialize_fragment(
    element: &Element,
    writer: impl io::Write,
) -> Result<(), XmlError> {
    let mut writer = Writer::new(writer);
    write_element(element, &mut writer)
}

/// Serializes a full document: XML declaration, pretty-printed tree, and a
/// trailing newline.
pub(crate) fn serialize_document(
    root: &Element,
    mut writer: impl io::Write,
) -> Result<(), XmlError> {
    let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', 2);
    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(root, &mut xml_writer)?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn write_element<W: io::Write>(element: &Element, writer: &mut Writer<W>) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_empty() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if !element.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.text)))?;
    }
    for child in &element.children {
        write_element(child, writer)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
