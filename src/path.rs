//! Dotted-path access over nested documents: `"a.b.0.c"` walks maps by key
//! and lists by index.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub segments: Vec<Segment>,
}

/// One dotted segment. A numeric segment may address a list index or a map key.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub key: String,
    pub index: Option<usize>,
}

impl Path {
    pub fn parse(input: &str) -> Self {
        let segments = split(input)
            .into_iter()
            .map(|key| Segment {
                key: key.to_string(),
                index: key.parse::<usize>().ok(),
            })
            .collect();
        Self { segments }
    }

    /// Walk the document; `None` the moment a segment is missing or the
    /// current node is neither map nor list.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for seg in &self.segments {
            current = match current {
                Value::Object(map) => map.get(&seg.key)?,
                Value::Array(items) => items.get(seg.index?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = root;
        for seg in &self.segments {
            current = match current {
                Value::Object(map) => map.get_mut(&seg.key)?,
                Value::Array(items) => items.get_mut(seg.index?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Walk the document, materializing missing intermediate maps so a value
    /// can be written at the terminal position.
    pub fn resolve_or_create<'a>(&self, root: &'a mut Value) -> &'a mut Value {
        let mut current = root;
        for seg in &self.segments {
            current = step_or_create(current, seg);
        }
        current
    }
}

fn step_or_create<'a>(node: &'a mut Value, seg: &Segment) -> &'a mut Value {
    // A list index may append one element; anything further turns the list into a map.
    let index = seg
        .index
        .filter(|&i| matches!(&*node, Value::Array(items) if i <= items.len()));
    match (node, index) {
        (Value::Array(items), Some(i)) => {
            if i == items.len() {
                items.push(Value::Null);
            }
            &mut items[i]
        }
        (other, _) => ensure_object(other)
            .entry(seg.key.clone())
            .or_insert(Value::Null),
    }
}

/// Turn the node into a map in place. Lists keep their elements under index keys;
/// scalars are replaced.
fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    match node {
        Value::Object(map) => map,
        other => {
            let promoted = match other.take() {
                Value::Array(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect(),
                _ => Map::new(),
            };
            *other = Value::Object(promoted);
            ensure_object(other)
        }
    }
}

/// Split a dotted path into its segments.
pub fn split(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

/// Value at `path`, or `None` when any segment is missing.
pub fn get<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    Path::parse(path).resolve(doc)
}

pub fn get_mut<'a>(doc: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    Path::parse(path).resolve_mut(doc)
}

/// Mutable slot at `path`, creating intermediate maps as needed.
pub fn get_or_create<'a>(doc: &'a mut Value, path: &str) -> &'a mut Value {
    Path::parse(path).resolve_or_create(doc)
}
