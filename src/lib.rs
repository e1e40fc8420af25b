//! Fluent record builders that refuse to build until every required field is set.
//!
//! Two views over the same primitives:
//!
//! - **Typed** (`#[derive(Builder)]`): the generated builder tracks which required fields have
//!   been set in its type, so `build()` on an incomplete chain does not compile.
//! - **Dynamic** ([`Builder`] over a runtime [`Schema`]): setters are dispatched by field name
//!   and `build()` fails with a [`BuildError`] naming every missing field.
//!
//! In both views every setter returns a handle on one shared backing store ([`Shared`]), so
//! handles taken mid-chain stay valid and observe later writes.
//!
//! ```rust
//! use fieldwise::Builder;
//!
//! #[derive(Builder, Clone, Debug, PartialEq)]
//! struct User {
//!     email: String,
//!     id: u64,
//!     age: Option<u32>,
//! }
//!
//! let user = User::builder().email("a@b.com".to_string()).id(1).build();
//! assert_eq!(user, User { email: "a@b.com".into(), id: 1, age: None });
//! ```

extern crate self as fieldwise;

pub use crate::builder::{
    create_builder, create_builder_with_finalizer, create_builder_with_template,
    create_builder_with_template_and_finalizer, Builder, Finalizer, Setter,
};
pub use crate::diagnostics::{BuildError, ErrorType};
pub use crate::record::Record;
pub use crate::schema::{Describe, FieldSpec, FieldType, Schema};
pub use crate::store::Shared;
pub use crate::template::Template;
pub use crate::typed::{FieldState, IsSet, Set, Unset};
pub use crate::value::Value;

#[cfg(feature = "derive")]
pub use fieldwise_macros::Builder;

pub mod builder;
pub mod diagnostics;
pub mod record;
pub mod schema;
pub mod store;
pub mod template;
pub mod typed;
pub mod value;
