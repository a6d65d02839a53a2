//! Column descriptors and the declaration factory.

use crate::error::{AdapterError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Index → label dictionary of an enum or flags field.
pub type Dictionary = BTreeMap<String, String>;

/// Logical type of a column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Boolean,
    Integer,
    Real,
    Money,
    String,
    Text,
    Xml,
    DateTime,
    Date,
    Time,
    TimeInterval,
    Identity,
    Uuid,
    Binary,
    Object,
    Record,
    RecordSet,
    Enum(Dictionary),
    Flags(Dictionary),
    Array(Box<FieldType>),
}

impl FieldType {
    /// Name used in a [`FieldDeclaration`].
    pub fn declaration_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Money => "money",
            Self::String => "string",
            Self::Text => "text",
            Self::Xml => "xml",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::TimeInterval => "timeinterval",
            Self::Identity => "identity",
            Self::Uuid => "uuid",
            Self::Binary => "binary",
            Self::Object => "object",
            Self::Record => "record",
            Self::RecordSet => "recordset",
            Self::Enum(_) => "enum",
            Self::Flags(_) => "flags",
            Self::Array(_) => "array",
        }
    }

    /// Parse a declaration type name. `kind` is the element type of an array,
    /// `dictionary` the labels of an enum or flags field.
    pub fn parse(name: &str, kind: Option<&str>, dictionary: Option<&Dictionary>) -> Result<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "real" => Self::Real,
            "money" => Self::Money,
            "string" => Self::String,
            "text" => Self::Text,
            "xml" => Self::Xml,
            "datetime" => Self::DateTime,
            "date" => Self::Date,
            "time" => Self::Time,
            "timeinterval" => Self::TimeInterval,
            "identity" => Self::Identity,
            "uuid" => Self::Uuid,
            "binary" => Self::Binary,
            "object" => Self::Object,
            "record" => Self::Record,
            "recordset" => Self::RecordSet,
            "enum" => Self::Enum(dictionary.cloned().unwrap_or_default()),
            "flags" => Self::Flags(dictionary.cloned().unwrap_or_default()),
            "array" => {
                let kind = kind.ok_or_else(|| {
                    AdapterError::invalid_argument("array field requires an element kind")
                })?;
                Self::Array(Box::new(Self::parse(kind, None, dictionary)?))
            }
            other => {
                return Err(AdapterError::invalid_argument(format!(
                    "unknown field type '{other}'"
                )));
            }
        };
        Ok(ty)
    }

    /// Labels of an enum or flags type.
    pub fn dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Enum(dict) | Self::Flags(dict) => Some(dict),
            _ => None,
        }
    }

    /// Value a freshly added column is filled with when the field declares none.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Integer | Self::Real | Self::Money => Value::from(0),
            Self::Array(_) => Value::Array(Vec::new()),
            _ => Value::Null,
        }
    }

    /// Best-effort type of a raw JSON value.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Real,
            Value::Array(items) => Self::Array(Box::new(
                items.iter().find(|v| !v.is_null()).map_or(Self::String, Self::infer),
            )),
            Value::Object(map) if map.contains_key("d") && map.contains_key("s") => {
                if map["d"].as_array().is_some_and(|rows| rows.iter().all(Value::is_array))
                    && map["d"].as_array().is_some_and(|rows| !rows.is_empty())
                {
                    Self::RecordSet
                } else {
                    Self::Record
                }
            }
            Value::Object(_) => Self::Object,
            Value::String(_) | Value::Null => Self::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(kind) => write!(f, "array<{kind}>"),
            other => f.write_str(other.declaration_name()),
        }
    }
}

/// Generic field descriptor accepted by the factory.
///
/// ```
/// use record_adapters::format::{Field, FieldDeclaration};
///
/// let decl: FieldDeclaration =
///     serde_json::from_str(r#"{"name":"foo","type":"string","defaultValue":"abc"}"#).unwrap();
/// let field = Field::from_declaration(&decl).unwrap();
/// assert_eq!(field.name(), "foo");
/// assert_eq!(field.default_value(), "abc");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Element type of an array field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Labels of an enum or flags field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<Dictionary>,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            nullable: None,
            default_value: None,
            kind: None,
            dictionary: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// A named, typed column of a row.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    name: String,
    field_type: FieldType,
    nullable: bool,
    default_value: Value,
}

impl Field {
    /// Create a field with the type's default value.
    ///
    /// # Errors
    /// Invalid-argument if `name` is empty.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AdapterError::invalid_argument("field name must not be empty"));
        }
        let default_value = field_type.default_value();
        Ok(Self {
            name,
            field_type,
            nullable: true,
            default_value,
        })
    }

    /// Build a field from its generic declaration.
    pub fn from_declaration(decl: &FieldDeclaration) -> Result<Self> {
        let field_type =
            FieldType::parse(&decl.field_type, decl.kind.as_deref(), decl.dictionary.as_ref())?;
        let mut field = Self::new(decl.name.clone(), field_type)?;
        if let Some(nullable) = decl.nullable {
            field.nullable = nullable;
        }
        if let Some(default) = &decl.default_value {
            field.default_value = default.clone();
        }
        Ok(field)
    }

    /// Inverse of [`Field::from_declaration`].
    pub fn to_declaration(&self) -> FieldDeclaration {
        let (kind, dictionary) = match &self.field_type {
            FieldType::Array(kind) => (
                Some(kind.declaration_name().to_string()),
                kind.dictionary().cloned(),
            ),
            other => (None, other.dictionary().cloned()),
        };
        FieldDeclaration {
            name: self.name.clone(),
            field_type: self.field_type.declaration_name().to_string(),
            nullable: Some(self.nullable),
            default_value: Some(self.default_value.clone()),
            kind,
            dictionary,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(AdapterError::invalid_argument("field name must not be empty"));
        }
        self.name = name;
        Ok(())
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }
}
