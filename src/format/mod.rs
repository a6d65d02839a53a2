//! Field descriptors and the ordered, name-unique [`Format`] built from them.

mod field;

pub use field::{Dictionary, Field, FieldDeclaration, FieldType};

use crate::error::{AdapterError, Result, check_insert_position, check_position};
use serde::{Deserialize, Serialize};

/// Ordered sequence of fields with unique names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDeclaration>", into = "Vec<FieldDeclaration>")]
pub struct Format {
    fields: Vec<Field>,
}

impl Format {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a format, failing on duplicate names.
    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Result<Self> {
        let mut format = Self::new();
        for field in fields {
            format.add(field, None)?;
        }
        Ok(format)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name().to_string()).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Insert `field` at `at` (append when `None`).
    ///
    /// # Errors
    /// Invalid-argument on a duplicate name, range error on a bad position.
    pub fn add(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        if self.index_of(field.name()).is_some() {
            return Err(AdapterError::invalid_argument(format!(
                "field '{}' already exists",
                field.name()
            )));
        }
        let at = at.unwrap_or(self.fields.len());
        check_insert_position(at, self.fields.len())?;
        self.fields.insert(at, field);
        Ok(())
    }

    /// Replace the field at `at`. The new name may only clash with the field it replaces.
    pub fn replace(&mut self, field: Field, at: usize) -> Result<Field> {
        check_position(at, self.fields.len())?;
        if let Some(existing) = self.index_of(field.name())
            && existing != at
        {
            return Err(AdapterError::invalid_argument(format!(
                "field '{}' already exists",
                field.name()
            )));
        }
        Ok(std::mem::replace(&mut self.fields[at], field))
    }

    pub fn remove(&mut self, name: &str) -> Result<Field> {
        let at = self
            .index_of(name)
            .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))?;
        Ok(self.fields.remove(at))
    }

    pub fn remove_at(&mut self, at: usize) -> Result<Field> {
        check_position(at, self.fields.len())?;
        Ok(self.fields.remove(at))
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl<'a> IntoIterator for &'a Format {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl TryFrom<Vec<FieldDeclaration>> for Format {
    type Error = AdapterError;

    fn try_from(decls: Vec<FieldDeclaration>) -> Result<Self> {
        let fields = decls
            .iter()
            .map(Field::from_declaration)
            .collect::<Result<Vec<_>>>()?;
        Self::from_fields(fields)
    }
}

impl From<Format> for Vec<FieldDeclaration> {
    fn from(format: Format) -> Self {
        format.fields.iter().map(Field::to_declaration).collect()
    }
}
