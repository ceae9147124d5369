//! Path-shaped violation tree: `{"tags": {"0": ["message"]}}`.
//!
//! A path that carries messages of its own and also has failing children
//! keeps its own messages under [`OWN_MESSAGES`].

use crate::path;
use serde::Serialize;
use serde_json::{Map, Value};

/// Key holding a node's own messages once it also has children.
pub const OWN_MESSAGES: &str = "_messages";

/// Nested map of message lists, addressed by dotted path. Sparse: a path
/// only exists once something failed there.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Violations {
    tree: Map<String, Value>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the list at `path`, creating intermediate maps.
    pub fn push(&mut self, path: &str, message: impl Into<String>) {
        let mut root = Value::Object(std::mem::take(&mut self.tree));
        let mut node = &mut root;
        for key in path::split(path) {
            node = branch(node).entry(key.to_string()).or_insert(Value::Null);
        }
        own_messages(node).push(Value::String(message.into()));
        if let Value::Object(tree) = root {
            self.tree = tree;
        }
    }

    /// Fold another tree in; message lists at the same path are concatenated.
    pub fn merge(&mut self, other: Violations) {
        merge_maps(&mut self.tree, other.tree);
    }

    /// Messages recorded at exactly `path`.
    pub fn messages(&self, path: &str) -> Vec<&str> {
        let mut segments = path::split(path).into_iter();
        let mut node = segments.next().and_then(|first| self.tree.get(first));
        for key in segments {
            node = node.and_then(|n| n.get(key));
        }
        let list = match node {
            Some(Value::Object(children)) => children.get(OWN_MESSAGES),
            other => other,
        };
        match list {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.tree
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.tree)
    }
}

fn merge_maps(into: &mut Map<String, Value>, from: Map<String, Value>) {
    for (key, incoming) in from {
        match (into.get_mut(&key), incoming) {
            (Some(Value::Array(existing)), Value::Array(more)) => existing.extend(more),
            (Some(Value::Object(existing)), Value::Object(more)) => merge_maps(existing, more),
            (Some(slot), incoming) => {
                // A message list met a subtree: keep both.
                let held = slot.take();
                let children = branch(slot);
                absorb(children, held);
                absorb(children, incoming);
            }
            (None, incoming) => {
                into.insert(key, incoming);
            }
        }
    }
}

fn absorb(children: &mut Map<String, Value>, value: Value) {
    match value {
        Value::Array(messages) => {
            let slot = children
                .entry(OWN_MESSAGES.to_string())
                .or_insert(Value::Null);
            own_messages(slot).extend(messages);
        }
        Value::Object(more) => merge_maps(children, more),
        _ => {}
    }
}

/// The node as a map of children; a message list moves under [`OWN_MESSAGES`].
fn branch(node: &mut Value) -> &mut Map<String, Value> {
    match node {
        Value::Object(children) => children,
        other => {
            let mut promoted = Map::new();
            if let Value::Array(messages) = other.take() {
                if !messages.is_empty() {
                    promoted.insert(OWN_MESSAGES.to_string(), Value::Array(messages));
                }
            }
            *other = Value::Object(promoted);
            branch(other)
        }
    }
}

/// The node's own message list, created on first use.
fn own_messages(node: &mut Value) -> &mut Vec<Value> {
    match node {
        Value::Array(messages) => messages,
        Value::Object(children) => own_messages(
            children
                .entry(OWN_MESSAGES.to_string())
                .or_insert(Value::Null),
        ),
        other => {
            *other = Value::Array(Vec::new());
            own_messages(other)
        }
    }
}
