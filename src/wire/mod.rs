//! The SBIS wire format.
//!
//! A payload is ordinary JSON. Every record or record set inside it is a *node*:
//! an object with a `d` key holding the data and either an inline schema `s` or a
//! link `f` to a schema inlined earlier in the same payload.
//!
//! ```text
//! {"d": [1, "A"], "s": [{"n": "@id", "t": "Число целое"}, {"n": "name", "t": "Строка"}], "f": 0}
//! {"d": [2, "B"], "f": 0}
//! ```
//!
//! - [`normalize_formats`] / [`denormalize_formats`] convert between the fully
//!   inlined form and the deduplicated form.
//! - [`format_hash`] is the structural schema identity both rely on.
//! - [`FormatController`] resolves a link back to its schema for one payload.

pub mod controller;
pub mod hash;
pub mod normalize;
pub(crate) mod walk;

pub use controller::FormatController;
pub use hash::format_hash;
pub use normalize::{denormalize_formats, normalize_formats};

use crate::error::{AdapterError, Result};
use crate::format::{Dictionary, Field, FieldType};
use serde_json::{Map, Value, json};

/// A schema as it travels on the wire: the list of field descriptors.
pub type Schema = Vec<Value>;

pub const DATA_KEY: &str = "d";
pub const SCHEMA_KEY: &str = "s";
pub const FORMAT_KEY: &str = "f";
pub const NAME_KEY: &str = "n";
pub const FIELD_TYPE_KEY: &str = "t";

/// Wire names of the field types.
pub mod type_names {
    pub const BOOLEAN: &str = "Логическое";
    pub const INTEGER: &str = "Число целое";
    pub const REAL: &str = "Число вещественное";
    pub const MONEY: &str = "Деньги";
    pub const STRING: &str = "Строка";
    pub const TEXT: &str = "Текст";
    pub const XML: &str = "XML";
    pub const DATE_TIME: &str = "Дата и время";
    pub const DATE: &str = "Дата";
    pub const TIME: &str = "Время";
    pub const TIME_INTERVAL: &str = "Временной интервал";
    pub const IDENTITY: &str = "Идентификатор";
    pub const UUID: &str = "UUID";
    pub const BINARY: &str = "Двоичное";
    pub const OBJECT: &str = "JSON-объект";
    pub const RECORD: &str = "Запись";
    pub const RECORD_SET: &str = "Выборка";
    pub const ARRAY: &str = "Массив";
    pub const ENUM: &str = "Перечисляемое";
    pub const FLAGS: &str = "Флаги";
}

/// `true` for an object shaped like a wire record or record set.
pub fn is_node(map: &Map<String, Value>) -> bool {
    map.contains_key(DATA_KEY)
        && (map.get(SCHEMA_KEY).is_some_and(Value::is_array)
            || map.get(FORMAT_KEY).is_some_and(Value::is_u64))
}

/// The inline schema of a node, if any.
pub fn inline_schema(map: &Map<String, Value>) -> Option<&Schema> {
    map.get(SCHEMA_KEY).and_then(Value::as_array)
}

/// The schema index of a node, if any.
pub fn schema_index(map: &Map<String, Value>) -> Option<usize> {
    map.get(FORMAT_KEY)
        .and_then(Value::as_u64)
        .and_then(|i| usize::try_from(i).ok())
}

/// Field name carried by a descriptor.
pub fn descriptor_name(descriptor: &Value) -> Option<&str> {
    descriptor.get(NAME_KEY).and_then(Value::as_str)
}

/// Field names of a schema in order.
pub fn schema_names(schema: &[Value]) -> Vec<String> {
    schema
        .iter()
        .filter_map(descriptor_name)
        .map(str::to_string)
        .collect()
}

/// Position of `name` in a schema.
pub fn schema_position(schema: &[Value], name: &str) -> Option<usize> {
    schema.iter().position(|d| descriptor_name(d) == Some(name))
}

/// Encode a field as a wire descriptor.
pub fn field_to_descriptor(field: &Field) -> Value {
    json!({ NAME_KEY: field.name(), FIELD_TYPE_KEY: encode_type(field.field_type()) })
}

/// Decode a wire descriptor into a field.
///
/// # Errors
/// Invalid-argument when the descriptor has no name or an unknown type.
pub fn descriptor_to_field(descriptor: &Value) -> Result<Field> {
    let name = descriptor_name(descriptor)
        .ok_or_else(|| AdapterError::invalid_argument("field descriptor has no name"))?;
    let ty = descriptor
        .get(FIELD_TYPE_KEY)
        .ok_or_else(|| AdapterError::invalid_argument(format!("field '{name}' has no type")))?;
    Field::new(name, decode_type(ty)?)
}

fn encode_type(ty: &FieldType) -> Value {
    use type_names::*;
    let name = match ty {
        FieldType::Boolean => BOOLEAN,
        FieldType::Integer => INTEGER,
        FieldType::Real => REAL,
        FieldType::Money => MONEY,
        FieldType::String => STRING,
        FieldType::Text => TEXT,
        FieldType::Xml => XML,
        FieldType::DateTime => DATE_TIME,
        FieldType::Date => DATE,
        FieldType::Time => TIME,
        FieldType::TimeInterval => TIME_INTERVAL,
        FieldType::Identity => IDENTITY,
        FieldType::Uuid => UUID,
        FieldType::Binary => BINARY,
        FieldType::Object => OBJECT,
        FieldType::Record => RECORD,
        FieldType::RecordSet => RECORD_SET,
        FieldType::Enum(dict) => return json!({ NAME_KEY: ENUM, SCHEMA_KEY: dict }),
        FieldType::Flags(dict) => return json!({ NAME_KEY: FLAGS, SCHEMA_KEY: dict }),
        FieldType::Array(kind) => {
            return json!({ NAME_KEY: ARRAY, FIELD_TYPE_KEY: encode_type(kind) });
        }
    };
    Value::from(name)
}

fn decode_type(ty: &Value) -> Result<FieldType> {
    use type_names::*;
    let (name, detail) = match ty {
        Value::String(name) => (name.as_str(), None),
        Value::Object(map) => {
            let name = map.get(NAME_KEY).and_then(Value::as_str).ok_or_else(|| {
                AdapterError::invalid_argument("complex field type has no name")
            })?;
            (name, Some(map))
        }
        other => {
            return Err(AdapterError::invalid_argument(format!(
                "unsupported field type {other}"
            )));
        }
    };
    let decoded = match name {
        BOOLEAN => FieldType::Boolean,
        INTEGER => FieldType::Integer,
        REAL => FieldType::Real,
        MONEY => FieldType::Money,
        STRING => FieldType::String,
        TEXT => FieldType::Text,
        XML => FieldType::Xml,
        DATE_TIME => FieldType::DateTime,
        DATE => FieldType::Date,
        TIME => FieldType::Time,
        TIME_INTERVAL => FieldType::TimeInterval,
        IDENTITY => FieldType::Identity,
        UUID => FieldType::Uuid,
        BINARY => FieldType::Binary,
        OBJECT => FieldType::Object,
        RECORD => FieldType::Record,
        RECORD_SET => FieldType::RecordSet,
        ENUM => FieldType::Enum(decode_dictionary(detail)),
        FLAGS => FieldType::Flags(decode_dictionary(detail)),
        ARRAY => {
            let kind = detail
                .and_then(|m| m.get(FIELD_TYPE_KEY))
                .ok_or_else(|| AdapterError::invalid_argument("array type has no element type"))?;
            FieldType::Array(Box::new(decode_type(kind)?))
        }
        other => {
            return Err(AdapterError::invalid_argument(format!(
                "unknown wire type '{other}'"
            )));
        }
    };
    Ok(decoded)
}

fn decode_dictionary(detail: Option<&Map<String, Value>>) -> Dictionary {
    let Some(Value::Object(entries)) = detail.and_then(|m| m.get(SCHEMA_KEY)) else {
        return Dictionary::new();
    };
    entries
        .iter()
        .map(|(k, v)| {
            let label = v.as_str().map_or_else(|| v.to_string(), str::to_string);
            (k.clone(), label)
        })
        .collect()
}
