//! The dynamic builder engine.
//!
//! A [`Builder`] is a thin handle over three shared pieces: the target [`Schema`], the backing
//! store, and the finalizer. Every setter writes into the one store and returns a fresh handle
//! aliasing it, so intermediate handles stay valid, see every later write, and never copy state.
//! An n-field build performs n writes.
//!
//! Because a runtime schema cannot be checked by the compiler, the required-field invariant is
//! enforced at `build()`: a handle whose initialized set does not cover every required field
//! fails with [`BuildError::MissingFields`] naming all of them.
//!
//! ## Usage Workflow
//! ```rust
//! use fieldwise::{create_builder, record, FieldType, Schema};
//! let schema = Schema::new("User")
//!     .required("email", FieldType::Text)
//!     .required("id", FieldType::Integer)
//!     .optional("age", FieldType::Integer);
//! let user = create_builder(schema)
//!     .set("email", "a@b.com")?
//!     .set("id", 1)?
//!     .build()?;
//! assert_eq!(user, record! { "email" => "a@b.com", "id" => 1 });
//! # Ok::<(), fieldwise::BuildError>(())
//! ```
//!
//! ## Post-build use
//! `build()` does not consume the handle. Each call finalizes a snapshot of the store as it is
//! at that moment; setters called afterwards only affect later builds.

mod setter;

pub use setter::Setter;

use crate::record::Record;
use crate::schema::{FieldSpec, Schema};
use crate::store::Shared;
use crate::template::Template;
use crate::value::Value;
use crate::{type_mismatch, unknown_field, BuildError};
use serde::de::DeserializeOwned;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// Function applied to the completed record at finalize.
pub type Finalizer<C> = Rc<dyn Fn(Record) -> C>;

/// A handle on one builder chain.
///
/// Cloning a handle, or calling any setter on it, yields another view of the same chain.
pub struct Builder<C = Record> {
    schema: Rc<Schema>,
    store: Shared<Record>,
    finalizer: Finalizer<C>,
}

/// Creates a builder with nothing initialized whose `build()` returns the raw [`Record`].
pub fn create_builder(schema: impl Into<Rc<Schema>>) -> Builder {
    Builder::new(schema)
}

/// Creates a builder with nothing initialized whose `build()` returns `finalizer(record)`.
pub fn create_builder_with_finalizer<C>(
    schema: impl Into<Rc<Schema>>,
    finalizer: impl Fn(Record) -> C + 'static,
) -> Builder<C> {
    Builder::with_finalizer(schema, finalizer)
}

/// Creates a builder pre-populated from `template`, returning the raw [`Record`] on build.
///
/// # Errors
/// Fails if the template names an undeclared field or holds a value of the wrong type.
pub fn create_builder_with_template(
    schema: impl Into<Rc<Schema>>,
    template: Template,
) -> Result<Builder, BuildError> {
    Builder::from_template(schema, template)
}

/// Creates a builder pre-populated from `template` whose `build()` returns `finalizer(record)`.
///
/// # Errors
/// Fails if the template names an undeclared field or holds a value of the wrong type.
pub fn create_builder_with_template_and_finalizer<C>(
    schema: impl Into<Rc<Schema>>,
    template: Template,
    finalizer: impl Fn(Record) -> C + 'static,
) -> Result<Builder<C>, BuildError> {
    Builder::from_template_with_finalizer(schema, template, finalizer)
}

impl Builder {
    pub fn new(schema: impl Into<Rc<Schema>>) -> Self {
        Self::with_finalizer(schema, |record| record)
    }

    pub fn from_template(
        schema: impl Into<Rc<Schema>>,
        template: Template,
    ) -> Result<Self, BuildError> {
        Self::from_template_with_finalizer(schema, template, |record| record)
    }
}

impl<C> Builder<C> {
    pub fn with_finalizer(
        schema: impl Into<Rc<Schema>>,
        finalizer: impl Fn(Record) -> C + 'static,
    ) -> Self {
        Self::assemble(schema.into(), Record::new(), Rc::new(finalizer))
    }

    pub fn from_template_with_finalizer(
        schema: impl Into<Rc<Schema>>,
        template: Template,
        finalizer: impl Fn(Record) -> C + 'static,
    ) -> Result<Self, BuildError> {
        let schema = schema.into();
        let initial = template.validate(&schema).inspect_err(|e| {
            debug!(target_type = %schema.name(), error = %e, "template rejected");
        })?;
        Ok(Self::assemble(schema, initial, Rc::new(finalizer)))
    }

    fn assemble(schema: Rc<Schema>, initial: Record, finalizer: Finalizer<C>) -> Self {
        debug!(
            target_type = %schema.name(),
            fields = schema.len(),
            prefilled = initial.len(),
            "builder created"
        );
        Self {
            schema,
            store: Shared::new(initial),
            finalizer,
        }
    }

    /// Writes `value` under `field` and returns a handle on the same store.
    ///
    /// Re-setting a field overwrites it; the initialized set never shrinks.
    ///
    /// # Errors
    /// `UnknownField` if `field` is not declared, `TypeMismatch` if `value` does not satisfy the
    /// field's declared type. Nothing is written on error.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> Result<Self, BuildError> {
        self.setter(field)?.call(value)
    }

    /// Resolves the setter for `field`, validating the name once.
    ///
    /// # Example
    /// ```rust
    /// use fieldwise::{create_builder, FieldType, Schema};
    /// let b = create_builder(Schema::new("Tag").required("label", FieldType::Text));
    /// let label = b.setter("label")?;
    /// let b = label.call("urgent")?;
    /// assert!(b.is_complete());
    /// assert!(b.setter("colour").is_err());
    /// # Ok::<(), fieldwise::BuildError>(())
    /// ```
    pub fn setter(&self, field: &str) -> Result<Setter<C>, BuildError> {
        match self.schema.get(field) {
            Some(spec) => Ok(Setter::new(self.clone(), spec.clone())),
            None => {
                debug!(target_type = %self.schema.name(), field, "unknown field");
                Err(unknown_field!(self.schema, field))
            }
        }
    }

    /// Applies several writes in order, stopping at the first failure.
    ///
    /// Writes made before the failing pair remain in the store.
    pub fn extend<K, V, I>(&self, pairs: I) -> Result<Self, BuildError>
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .try_fold(self.clone(), |handle, (field, value)| {
                handle.set(field.as_ref(), value)
            })
    }

    pub(crate) fn write(&self, spec: &FieldSpec, value: Value) -> Result<Self, BuildError> {
        if !spec.ty.accepts(&value) {
            debug!(target_type = %self.schema.name(), field = %spec.name, "type mismatch");
            return Err(type_mismatch!(self.schema, spec, value));
        }
        trace!(target_type = %self.schema.name(), field = %spec.name, value = %value, "field set");
        self.store.with_mut(|record| record.insert(spec.name.clone(), value));
        Ok(self.clone())
    }

    /// Names of the initialized fields, sorted.
    pub fn initialized(&self) -> Vec<String> {
        self.store
            .with(|record| record.keys().into_iter().map(str::to_string).collect())
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.store.with(|record| record.contains(field))
    }

    /// Required fields not yet initialized, in declaration order.
    pub fn missing(&self) -> Vec<String> {
        self.store.with(|record| {
            self.schema
                .required_names()
                .into_iter()
                .filter(|name| !record.contains(name))
                .map(str::to_string)
                .collect()
        })
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The store's current contents, regardless of completeness.
    pub fn snapshot(&self) -> Record {
        self.store.snapshot()
    }

    /// True if `other` is a view of the same chain.
    pub fn shares_store_with<D>(&self, other: &Builder<D>) -> bool {
        self.store.ptr_eq(&other.store)
    }

    /// Finalizes the chain.
    ///
    /// # Errors
    /// `MissingFields` naming every required field that has not been set.
    #[instrument(level = "debug", skip(self), fields(target_type = %self.schema.name()))]
    pub fn build(&self) -> Result<C, BuildError> {
        let record = self.complete_snapshot()?;
        debug!(fields = record.len(), "building");
        Ok((self.finalizer)(record))
    }

    /// Finalizes the chain into a typed value, bypassing the finalizer.
    ///
    /// # Errors
    /// `MissingFields` as for [`Builder::build`], or `Conversion` if the record does not
    /// deserialize into `T`.
    #[instrument(level = "debug", skip(self), fields(target_type = %self.schema.name()))]
    pub fn build_into<T: DeserializeOwned>(&self) -> Result<T, BuildError> {
        self.complete_snapshot()?.deserialize()
    }

    fn complete_snapshot(&self) -> Result<Record, BuildError> {
        let missing = self.missing();
        if !missing.is_empty() {
            debug!(missing = ?missing, "build rejected");
            return Err(BuildError::MissingFields {
                target: self.schema.name().to_string(),
                fields: missing,
            });
        }
        // The borrow is released before the finalizer runs.
        Ok(self.store.snapshot())
    }
}

impl<C> Clone for Builder<C> {
    fn clone(&self) -> Self {
        Self {
            schema: Rc::clone(&self.schema),
            store: self.store.clone(),
            finalizer: Rc::clone(&self.finalizer),
        }
    }
}

impl<C> fmt::Debug for Builder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("target", &self.schema.name())
            .field("store", &self.store)
            .field("missing", &self.missing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, FieldType};

    fn user() -> Schema {
        Schema::new("User")
            .required("email", FieldType::Text)
            .required("id", FieldType::Integer)
            .optional("age", FieldType::Integer)
    }

    #[test]
    fn rejected_write_leaves_store_untouched() {
        let b = create_builder(user());
        assert!(b.set("id", "one").is_err());
        assert!(b.initialized().is_empty());
    }

    #[test]
    fn extend_keeps_writes_before_failure() {
        let b = create_builder(user());
        let err = b
            .extend([("email", Value::from("a@b.com")), ("nope", Value::from(1))])
            .unwrap_err();
        assert_eq!(err.fields(), vec!["nope"]);
        assert_eq!(b.initialized(), vec!["email"]);
    }

    #[test]
    fn missing_follows_declaration_order() {
        let b = create_builder(user());
        assert_eq!(b.missing(), vec!["email", "id"]);
        let b = b.set("id", 7).unwrap();
        assert_eq!(b.missing(), vec!["email"]);
    }

    #[test]
    fn build_after_build_sees_later_writes() {
        let b = create_builder(user())
            .set("email", "a@b.com")
            .unwrap()
            .set("id", 1)
            .unwrap();
        let first = b.build().unwrap();
        let second = b.set("age", 30).unwrap().build().unwrap();
        assert_eq!(first, record! { "email" => "a@b.com", "id" => 1 });
        assert_eq!(second.get("age"), Some(&Value::Integer(30)));
    }

    #[test]
    fn debug_lists_missing_fields() {
        let rendered = format!("{:?}", create_builder(user()));
        assert!(rendered.contains("missing: [\"email\", \"id\"]"));
    }
}
