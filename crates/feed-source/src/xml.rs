//! XML markup to [`FeedNode`] tree conversion.
//!
//! Rules:
//! - An element without attributes or children becomes its trimmed text
//! - Text and CDATA pieces of one element are joined as-is, then trimmed
//! - Otherwise it becomes a map of children and attributes; its own text, if
//!   any, is kept under `_`
//! - Attributes win over child elements of the same name
//! - Repeated siblings become a list in document order
//! - Namespace prefixes stay part of the key (`g:id`)

use crate::error::FetchError;
use crate::node::FeedNode;
use catalog_core::TEXT_KEY;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Element being assembled while its content is read.
struct Frame {
    name: String,
    attrs: Vec<(String, String)>,
    children: BTreeMap<String, FeedNode>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>, position: u64) -> Result<Self, FetchError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| FetchError::parse(e.to_string(), position))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| FetchError::parse(e.to_string(), position))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            children: BTreeMap::new(),
            text: String::new(),
        })
    }

    fn close(self) -> (String, FeedNode) {
        let text = self.text.trim();
        if self.attrs.is_empty() && self.children.is_empty() {
            return (self.name, FeedNode::Text(text.to_string()));
        }

        let mut map = self.children;
        for (key, value) in self.attrs {
            map.insert(key, FeedNode::Text(value));
        }
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), FeedNode::Text(text.to_string()));
        }
        (self.name, FeedNode::Map(map))
    }
}

fn insert_child(children: &mut BTreeMap<String, FeedNode>, name: String, node: FeedNode) {
    match children.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(node);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            FeedNode::List(items) => items.push(node),
            existing => {
                let first = std::mem::replace(existing, FeedNode::List(Vec::new()));
                *existing = FeedNode::List(vec![first, node]);
            }
        },
    }
}

/// Parse feed markup into a document tree.
///
/// The returned node is a map with one entry, keyed by the root element name.
pub fn parse_document(input: &str) -> Result<FeedNode, FetchError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    // Text is trimmed once per element on close, never per event.
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, FeedNode)> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| FetchError::parse(e.to_string(), position))?;

        let closed = match event {
            Event::Start(start) => {
                stack.push(Frame::open(&start, position)?);
                None
            }
            Event::Empty(start) => Some(Frame::open(&start, position)?.close()),
            Event::End(_) => stack.pop().map(Frame::close),
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| FetchError::parse(e.to_string(), position))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
                None
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
                None
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => None,
        };

        if let Some((name, node)) = closed {
            match stack.last_mut() {
                Some(parent) => insert_child(&mut parent.children, name, node),
                None if root.is_some() => {
                    return Err(FetchError::parse(
                        format!("unexpected second root element <{name}>"),
                        position,
                    ));
                }
                None => root = Some((name, node)),
            }
        }
    }

    if let Some(frame) = stack.last() {
        return Err(FetchError::parse(
            format!("unclosed element <{}>", frame.name),
            reader.buffer_position() as u64,
        ));
    }

    let (name, node) =
        root.ok_or_else(|| FetchError::parse("document has no root element", 0))?;
    let mut document = BTreeMap::new();
    document.insert(name, node);
    Ok(FeedNode::Map(document))
}
