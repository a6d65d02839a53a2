//! Dotted-path access into raw JSON containers.
//!
//! Used for side channels that live next to the rows ("total", "more",
//! "meta.page") and know nothing about schemas.

use crate::error::{AdapterError, Result, check_position};
use serde_json::{Map, Value};

/// Read `path` (`"a.b.0.c"`) from `data`. Any missing segment yields `None`.
pub fn get_property(data: &Value, path: &str) -> Option<Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = data;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// A missing or scalar intermediate inside an object is replaced by an object.
/// Inside an array a segment must name an existing position; arrays are never
/// replaced or grown.
///
/// # Errors
/// Invalid-argument for an empty path, a root that is not a JSON object or array,
/// or a non-numeric segment into an array. Range error for an array position past
/// the end. `data` is unchanged when an error is returned.
pub fn set_property(data: &mut Value, path: &str, value: Value) -> Result<()> {
    if path.is_empty() {
        return Err(AdapterError::invalid_argument("property path must not be empty"));
    }
    if !data.is_object() && !data.is_array() {
        return Err(AdapterError::invalid_argument(
            "properties can only be set on an object or array",
        ));
    }
    let segments: Vec<&str> = path.split('.').collect();
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| AdapterError::invalid_argument("property path must not be empty"))?;

    let mut current = data;
    for segment in parents {
        current = child_mut(current, segment)?;
    }
    match current {
        Value::Array(items) => {
            let i = array_position(items.len(), last)?;
            items[i] = value;
        }
        Value::Object(map) => {
            map.insert((*last).to_string(), value);
        }
        _ => {
            return Err(AdapterError::invalid_argument(format!(
                "cannot set '{last}' on a scalar"
            )));
        }
    }
    Ok(())
}

fn array_position(len: usize, segment: &str) -> Result<usize> {
    let position = segment.parse::<usize>().map_err(|_| {
        AdapterError::invalid_argument(format!("'{segment}' is not a position in an array"))
    })?;
    check_position(position, len)?;
    Ok(position)
}

// Objects are only created below a missing or scalar slot, so every level after
// the first created one is a fresh object and cannot fail.
fn child_mut<'a>(current: &'a mut Value, segment: &str) -> Result<&'a mut Value> {
    match current {
        Value::Array(items) => {
            let i = array_position(items.len(), segment)?;
            Ok(&mut items[i])
        }
        Value::Object(map) => {
            let child = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() && !child.is_array() {
                *child = Value::Object(Map::new());
            }
            Ok(child)
        }
        _ => Err(AdapterError::invalid_argument(format!(
            "cannot descend into '{segment}' of a scalar"
        ))),
    }
}
