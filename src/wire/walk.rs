//! Depth-first traversal over the nodes of a payload.
//!
//! One visitation order serves normalization, denormalization and the format
//! controller scan: pre-order, a node's schema before its data, siblings in
//! document order. The walk keeps an explicit stack so deeply nested payloads do
//! not grow the call stack.

use super::{DATA_KEY, is_node};
use serde_json::{Map, Value};

#[derive(Clone, Debug)]
enum Step {
    Key(String),
    Index(usize),
}

/// Visit every node of `root`.
pub(crate) fn visit_nodes<'a>(root: &'a Value, mut visit: impl FnMut(&'a Map<String, Value>)) {
    let mut stack: Vec<&'a Value> = vec![root];
    while let Some(value) = stack.pop() {
        match value {
            Value::Object(map) if is_node(map) => {
                visit(map);
                if let Some(data) = map.get(DATA_KEY) {
                    stack.push(data);
                }
            }
            Value::Object(map) => stack.extend(map.values().rev()),
            Value::Array(items) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }
}

/// Visit every node of `root` with mutable access to the node object.
///
/// `visit` may rewrite the node's schema keys; the walk descends into `d` after
/// the visit returns.
pub(crate) fn visit_nodes_mut(root: &mut Value, mut visit: impl FnMut(&mut Map<String, Value>)) {
    let mut stack: Vec<Vec<Step>> = vec![Vec::new()];
    while let Some(path) = stack.pop() {
        let Some(value) = resolve_mut(root, &path) else {
            continue;
        };
        let children: Vec<Step> = match value {
            Value::Object(map) if is_node(map) => {
                visit(map);
                vec![Step::Key(DATA_KEY.to_string())]
            }
            Value::Object(map) => map.keys().cloned().map(Step::Key).collect(),
            Value::Array(items) => (0..items.len()).map(Step::Index).collect(),
            _ => Vec::new(),
        };
        for step in children.into_iter().rev() {
            let mut child = path.clone();
            child.push(step);
            stack.push(child);
        }
    }
}

fn resolve_mut<'a>(root: &'a mut Value, path: &[Step]) -> Option<&'a mut Value> {
    let mut current = root;
    for step in path {
        current = match (current, step) {
            (Value::Object(map), Step::Key(key)) => map.get_mut(key)?,
            (Value::Array(items), Step::Index(i)) => items.get_mut(*i)?,
            _ => return None,
        };
    }
    Some(current)
}
