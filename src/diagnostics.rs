//! Unified, `miette`-based diagnostics for every builder failure.
//!
//! All usage mistakes surfaced at runtime are represented by [`BuildError`]. Errors are never
//! retried or deferred: each one is a programming mistake and is returned to the call site that
//! caused it. The typed view (`#[derive(Builder)]`) turns the same mistakes into compile errors;
//! only the dynamic view and serde conversions produce these values.
//!
//! # Error Construction Macros
//!
//! - **Use `unknown_field!` when a name is not declared on the target schema.**
//!   - `unknown_field!(schema, "emial")`
//! - **Use `type_mismatch!` when a value does not satisfy a field's declared type.**
//!   - `type_mismatch!(schema, spec, value)`
//!
//! The macros read the target name and declared names from the schema so call sites never
//! assemble help text by hand.

use miette::Diagnostic;
use thiserror::Error;

/// Type-safe error classification, mirroring the taxonomy of builder failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Misuse of a builder handle: undeclared field, wrong value type, premature build.
    Usage,
    /// A schema declaration is itself inconsistent.
    Schema,
    /// A record could not be converted to or from a typed Rust value.
    Conversion,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Usage => "Usage",
            ErrorType::Schema => "Schema",
            ErrorType::Conversion => "Conversion",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every runtime failure a builder can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("`{target}` has no field named `{field}`")]
    UnknownField {
        target: String,
        field: String,
        declared: Vec<String>,
    },
    #[error("cannot build `{target}`: missing required field(s) {}", quoted(.fields))]
    MissingFields { target: String, fields: Vec<String> },
    #[error("field `{target}.{field}` expects {expected}, got {actual}")]
    TypeMismatch {
        target: String,
        field: String,
        expected: String,
        actual: String,
    },
    #[error("`{target}` declares field `{field}` more than once")]
    DuplicateField { target: String, field: String },
    #[error("cannot convert `{target}`: {message}")]
    Conversion { target: String, message: String },
}

impl BuildError {
    /// Returns the classification of this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            BuildError::UnknownField { .. }
            | BuildError::MissingFields { .. }
            | BuildError::TypeMismatch { .. } => ErrorType::Usage,
            BuildError::DuplicateField { .. } => ErrorType::Schema,
            BuildError::Conversion { .. } => ErrorType::Conversion,
        }
    }

    /// The field names this error is about, in reporting order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fieldwise::BuildError;
    /// let err = BuildError::MissingFields {
    ///     target: "User".into(),
    ///     fields: vec!["email".into(), "id".into()],
    /// };
    /// assert_eq!(err.fields(), vec!["email", "id"]);
    /// ```
    pub fn fields(&self) -> Vec<&str> {
        match self {
            BuildError::UnknownField { field, .. }
            | BuildError::TypeMismatch { field, .. }
            | BuildError::DuplicateField { field, .. } => vec![field.as_str()],
            BuildError::MissingFields { fields, .. } => fields.iter().map(String::as_str).collect(),
            BuildError::Conversion { .. } => vec![],
        }
    }

    pub const fn code_suffix(&self) -> &'static str {
        match self {
            BuildError::UnknownField { .. } => "unknown_field",
            BuildError::MissingFields { .. } => "missing_fields",
            BuildError::TypeMismatch { .. } => "type_mismatch",
            BuildError::DuplicateField { .. } => "duplicate_field",
            BuildError::Conversion { .. } => "conversion",
        }
    }

    pub(crate) fn conversion(target: &str, error: impl std::fmt::Display) -> Self {
        BuildError::Conversion {
            target: target.to_string(),
            message: error.to_string(),
        }
    }
}

impl Diagnostic for BuildError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("fieldwise::{}", self.code_suffix())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let help = match self {
            BuildError::UnknownField { declared, .. } if declared.is_empty() => {
                "the target declares no fields".to_string()
            }
            BuildError::UnknownField { declared, .. } => {
                format!("declared fields are {}", quoted(declared))
            }
            BuildError::MissingFields { fields, .. } => {
                format!("set {} before calling build", quoted(fields))
            }
            BuildError::TypeMismatch { field, expected, .. } => {
                format!("pass a value of type {expected} to `{field}`")
            }
            BuildError::DuplicateField { field, .. } => {
                format!("remove the second declaration of `{field}`")
            }
            BuildError::Conversion { .. } => return None,
        };
        Some(Box::new(help))
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Constructs a `BuildError::UnknownField` for a name the schema does not declare.
#[macro_export]
macro_rules! unknown_field {
    ($schema:expr, $field:expr) => {
        $crate::BuildError::UnknownField {
            target: $schema.name().to_string(),
            field: $field.to_string(),
            declared: $schema.iter().map(|spec| spec.name.clone()).collect(),
        }
    };
}

/// Constructs a `BuildError::TypeMismatch` for a value rejected by a field spec.
#[macro_export]
macro_rules! type_mismatch {
    ($schema:expr, $spec:expr, $value:expr) => {
        $crate::BuildError::TypeMismatch {
            target: $schema.name().to_string(),
            field: $spec.name.clone(),
            expected: $spec.ty.to_string(),
            actual: $value.type_name().to_string(),
        }
    };
}

#[cfg(test)]
mod diagnostics_tests {
    use super::*;
    use miette::NarratableReportHandler;

    fn render(err: &BuildError) -> String {
        let mut out = String::new();
        NarratableReportHandler::new()
            .render_report(&mut out, err)
            .unwrap();
        out
    }

    #[test]
    fn missing_fields_names_every_field() {
        let err = BuildError::MissingFields {
            target: "User".into(),
            fields: vec!["email".into(), "id".into()],
        };
        assert_eq!(
            err.to_string(),
            "cannot build `User`: missing required field(s) `email`, `id`"
        );
        assert_eq!(err.error_type(), ErrorType::Usage);
    }

    #[test]
    fn report_carries_code_and_help() {
        let err = BuildError::UnknownField {
            target: "User".into(),
            field: "emial".into(),
            declared: vec!["email".into(), "id".into()],
        };
        let output = render(&err);
        assert!(output.contains("fieldwise::unknown_field"));
        assert!(output.contains("declared fields are `email`, `id`"));
    }

    #[test]
    fn conversion_has_no_help() {
        let err = BuildError::conversion("User", "invalid type");
        assert!(err.help().is_none());
        assert_eq!(err.error_type(), ErrorType::Conversion);
        assert!(err.fields().is_empty());
    }
}
