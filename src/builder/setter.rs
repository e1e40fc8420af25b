use super::Builder;
use crate::schema::FieldSpec;
use crate::value::Value;
use crate::BuildError;

/// The setter synthesized for one declared field of a dynamic builder.
///
/// Obtained from [`Builder::setter`]; the field name has already been checked against the
/// schema, so only the value type is validated per call.
pub struct Setter<C> {
    handle: Builder<C>,
    spec: FieldSpec,
}

impl<C> Setter<C> {
    pub(super) fn new(handle: Builder<C>, spec: FieldSpec) -> Self {
        Self { handle, spec }
    }

    /// Writes `value` into the chain's store and returns a handle on the same store.
    ///
    /// # Errors
    /// `TypeMismatch` if `value` does not satisfy the field's declared type.
    pub fn call(&self, value: impl Into<Value>) -> Result<Builder<C>, BuildError> {
        self.handle.write(&self.spec, value.into())
    }

    pub fn field(&self) -> &FieldSpec {
        &self.spec
    }
}

impl<C> Clone for Setter<C> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            spec: self.spec.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{create_builder, FieldType, Schema};

    #[test]
    fn setter_can_be_called_repeatedly() {
        let b = create_builder(Schema::new("Counter").required("n", FieldType::Integer));
        let n = b.setter("n").unwrap();
        n.call(1).unwrap();
        let last = n.call(2).unwrap();
        assert_eq!(n.field().name, "n");
        assert_eq!(last.build().unwrap().get("n").and_then(|v| v.as_integer()), Some(2));
    }
}
