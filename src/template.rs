//! Default field values supplied at builder creation.
//!
//! Template entries are written into the backing store before the first handle is returned, so
//! they count as initialized from the very start of the chain. A template is checked against the
//! target schema when the builder is created; it is never checked on its own.

use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;
use crate::{type_mismatch, unknown_field, BuildError};
use serde::Serialize;

/// A partial record of initial values.
///
/// # Example
/// ```rust
/// use fieldwise::Template;
/// let template = Template::new().with("id", 5).with("role", "admin");
/// assert_eq!(template.keys(), vec!["id", "role"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    values: Record,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the initial value for `field`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field, value);
        self
    }

    /// Builds a template from any serializable struct or map. `null` entries, such as unset
    /// `Option` fields, are skipped so they do not count as initialized.
    ///
    /// # Errors
    /// Returns `BuildError::Conversion` if `partial` does not serialize to a JSON object.
    ///
    /// # Example
    /// ```rust
    /// use fieldwise::Template;
    /// #[derive(serde::Serialize)]
    /// struct Defaults { id: u64, email: Option<String> }
    /// let template = Template::from_serialize(&Defaults { id: 5, email: None }).unwrap();
    /// assert_eq!(template.keys(), vec!["id"]);
    /// ```
    pub fn from_serialize<T: Serialize>(partial: &T) -> Result<Self, BuildError> {
        let target = std::any::type_name::<T>();
        let json = serde_json::to_value(partial).map_err(|e| BuildError::conversion(target, e))?;
        let serde_json::Value::Object(map) = json else {
            return Err(BuildError::conversion(
                target,
                "template must serialize to an object",
            ));
        };
        Ok(map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k, Value::from(v)))
            .collect())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks every entry against `schema` and yields the initial store contents.
    pub(crate) fn validate(self, schema: &Schema) -> Result<Record, BuildError> {
        // Sorted so the first reported problem does not depend on hash order.
        for name in self.values.keys() {
            let Some(spec) = schema.get(name) else {
                return Err(unknown_field!(schema, name));
            };
            if let Some(value) = self.values.get(name) {
                if !spec.ty.accepts(value) {
                    return Err(type_mismatch!(schema, spec, value));
                }
            }
        }
        Ok(self.values)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Template {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl From<Record> for Template {
    fn from(values: Record) -> Self {
        Self { values }
    }
}
