//! Target-type descriptions for the dynamic builder.
//!
//! A [`Schema`] is the closed set of fields a builder accepts: each field has a name, a declared
//! [`FieldType`], and a required/optional flag. Schemas are built once and shared by every handle
//! of a chain behind an `Rc`.
//!
//! # Declaration
//! | Method        | Redeclared name | Notes                                  |
//! |---------------|-----------------|----------------------------------------|
//! | `required`    | Replaces        | Chained, infallible                    |
//! | `optional`    | Replaces        | Chained, infallible                    |
//! | `field`       | Replaces        | Chained, takes a full `FieldSpec`      |
//! | `try_field`   | Error           | `BuildError::DuplicateField`           |
//! | `define`      | Error           | Whole schema from an iterator of specs |
//!
//! Field order is declaration order; replacing a field keeps its original position.

use crate::value::Value;
use crate::BuildError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Any,
    Bool,
    Integer,
    /// Any numeric value; integers are accepted.
    Number,
    Text,
    List,
    Map,
}

impl FieldType {
    /// Returns true if `value` conforms to this type. `Nil` only satisfies `Any`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fieldwise::{FieldType, Value};
    /// assert!(FieldType::Number.accepts(&Value::from(1)));
    /// assert!(!FieldType::Integer.accepts(&Value::from(1.5)));
    /// assert!(!FieldType::Text.accepts(&Value::Nil));
    /// ```
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Any => true,
            FieldType::Bool => matches!(value, Value::Bool(_)),
            FieldType::Integer => matches!(value, Value::Integer(_)),
            FieldType::Number => matches!(value, Value::Integer(_) | Value::Number(_)),
            FieldType::Text => matches!(value, Value::String(_)),
            FieldType::List => matches!(value, Value::List(_)),
            FieldType::Map => matches!(value, Value::Map(_)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Any => "Any",
            FieldType::Bool => "Bool",
            FieldType::Integer => "Integer",
            FieldType::Number => "Number",
            FieldType::Text => "Text",
            FieldType::List => "List",
            FieldType::Map => "Map",
        };
        f.write_str(name)
    }
}

/// One declared field of a target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
        }
    }
}

/// A named, ordered, closed set of field declarations.
///
/// # Example
/// ```rust
/// use fieldwise::{FieldType, Schema};
/// let schema = Schema::new("User")
///     .required("email", FieldType::Text)
///     .required("id", FieldType::Integer)
///     .optional("age", FieldType::Integer);
/// assert_eq!(schema.required_names(), vec!["email", "id"]);
/// assert!(schema.contains("age"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Creates an empty schema for the target called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builds a schema from a list of specs, rejecting repeated names.
    ///
    /// # Errors
    /// Returns `BuildError::DuplicateField` naming the first repeated field.
    ///
    /// # Example
    /// ```rust
    /// use fieldwise::{FieldSpec, FieldType, Schema};
    /// let err = Schema::define(
    ///     "User",
    ///     [
    ///         FieldSpec::required("id", FieldType::Integer),
    ///         FieldSpec::optional("id", FieldType::Integer),
    ///     ],
    /// )
    /// .unwrap_err();
    /// assert_eq!(err.fields(), vec!["id"]);
    /// ```
    pub fn define(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> Result<Self, BuildError> {
        fields
            .into_iter()
            .try_fold(Self::new(name), |schema, spec| schema.try_field(spec))
    }

    /// Declares a required field, replacing any earlier declaration of the same name.
    pub fn required(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(FieldSpec::required(name, ty))
    }

    /// Declares an optional field, replacing any earlier declaration of the same name.
    pub fn optional(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(FieldSpec::optional(name, ty))
    }

    /// Declares a field, replacing any earlier declaration of the same name in place.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    /// Declares a field, returning an error if the name is already declared.
    pub fn try_field(mut self, spec: FieldSpec) -> Result<Self, BuildError> {
        if self.contains(&spec.name) {
            return Err(BuildError::DuplicateField {
                target: self.name,
                field: spec.name,
            });
        }
        self.fields.push(spec);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Names of the required fields, in declaration order.
    pub fn required_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Types that can describe themselves as a [`Schema`].
///
/// `#[derive(Builder)]` implements this so a typed record can also drive the dynamic builder.
pub trait Describe {
    fn schema() -> Schema;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaring_keeps_position() {
        let schema = Schema::new("User")
            .required("email", FieldType::Text)
            .required("id", FieldType::Integer)
            .optional("email", FieldType::Any);
        let names: Vec<_> = schema.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["email", "id"]);
        assert_eq!(schema.required_names(), vec!["id"]);
        assert_eq!(schema.get("email").map(|f| f.ty), Some(FieldType::Any));
    }

    #[test]
    fn try_field_rejects_duplicates() {
        let err = Schema::new("User")
            .try_field(FieldSpec::required("id", FieldType::Integer))
            .and_then(|s| s.try_field(FieldSpec::required("id", FieldType::Text)))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateField {
                target: "User".into(),
                field: "id".into()
            }
        );
    }

    #[test]
    fn number_accepts_integers_but_not_text() {
        assert!(FieldType::Number.accepts(&Value::Integer(3)));
        assert!(FieldType::Number.accepts(&Value::Number(3.5)));
        assert!(!FieldType::Number.accepts(&Value::from("3")));
        assert!(FieldType::Any.accepts(&Value::Nil));
    }
}
