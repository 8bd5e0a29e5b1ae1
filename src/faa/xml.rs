//! Converts the FAA status markup into a generic `serde_json::Value` tree.
//!
//! The conversion follows the usual markup-to-object rules: an element with
//! children becomes an object, a text-only element becomes a string,
//! attributes merge into the element's object, and a repeated child name is
//! promoted to an array. The last rule is the source of the feed's shape
//! quirk — a child occurring exactly once stays a bare object, so cardinality
//! must never be assumed downstream (see [`super::feed::coerce_list`]).

use crate::faa::error::FaaError;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

#[derive(Default)]
struct Node {
    children: Map<String, Value>,
    text: String,
}

fn finish(node: Node) -> Value {
    if node.children.is_empty() {
        Value::String(node.text)
    } else {
        let mut children = node.children;
        if !node.text.is_empty() {
            children.insert("$t".to_string(), Value::String(node.text));
        }
        Value::Object(children)
    }
}

fn insert_child(parent: &mut Node, name: String, value: Value) {
    match parent.children.get_mut(&name) {
        None => {
            parent.children.insert(name, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            // Second occurrence of the name: promote to an array.
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn open_node(start: &quick_xml::events::BytesStart<'_>) -> Result<(String, Node), FaaError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut node = Node::default();
    for attr in start.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        node.children.insert(key, Value::String(value));
    }
    Ok((name, node))
}

pub(crate) fn markup_to_value(xml: &str) -> Result<Value, FaaError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // The bottom entry collects root-level elements.
    let mut stack: Vec<(String, Node)> = vec![(String::new(), Node::default())];
    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(open_node(&start)?),
            Event::Empty(start) => {
                let (name, node) = open_node(&start)?;
                let value = finish(node);
                if let Some((_, parent)) = stack.last_mut() {
                    insert_child(parent, name, value);
                }
            }
            Event::Text(text) => {
                let decoded = text.unescape()?;
                if let Some((_, node)) = stack.last_mut() {
                    node.text.push_str(&decoded);
                }
            }
            Event::CData(data) => {
                let decoded = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some((_, node)) = stack.last_mut() {
                    node.text.push_str(&decoded);
                }
            }
            Event::End(_) => {
                let Some((name, node)) = stack.pop() else {
                    return Err(FaaError::MalformedFeed("unbalanced closing tag".to_string()));
                };
                let value = finish(node);
                let Some((_, parent)) = stack.last_mut() else {
                    return Err(FaaError::MalformedFeed("unbalanced closing tag".to_string()));
                };
                insert_child(parent, name, value);
            }
            Event::Eof => break,
            _ => {} // declarations, comments, processing instructions
        }
    }

    let Some((_, root)) = stack.pop() else {
        return Err(FaaError::MalformedFeed("empty document".to_string()));
    };
    if !stack.is_empty() {
        return Err(FaaError::MalformedFeed(
            "document ended inside an open element".to_string(),
        ));
    }
    Ok(Value::Object(root.children))
}
