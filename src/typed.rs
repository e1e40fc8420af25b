//! Typestate markers for compile-time checked builders.
//!
//! This module provides the marker types `#[derive(Builder)]` threads through a generated
//! builder's generic parameters: one parameter per required field, `Unset` until that field's
//! setter has been called and `Set` afterwards. `build()` requires every parameter to implement
//! [`IsSet`], so finalizing early is a compile error rather than a runtime one.
//!
//! ```compile_fail
//! use fieldwise::Builder;
//!
//! #[derive(Builder, Clone)]
//! struct User {
//!     email: String,
//!     id: u64,
//! }
//!
//! // `email` was never set.
//! let user = User::builder().id(1).build();
//! ```

/// Marks a required field that has not been set yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unset;

/// Marks a required field that has been set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Set;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Set {}
    impl Sealed for super::Unset {}
}

/// Field-presence marker. Implemented by [`Set`] and [`Unset`] only.
pub trait FieldState: sealed::Sealed {
    const IS_SET: bool;
}

impl FieldState for Set {
    const IS_SET: bool = true;
}

impl FieldState for Unset {
    const IS_SET: bool = false;
}

/// Satisfied only by [`Set`]; bounds a generated `build()`.
#[diagnostic::on_unimplemented(
    message = "cannot build: a required field is still unset",
    label = "this required field has not been set",
    note = "call the setter for every required field before `build()`"
)]
pub trait IsSet: FieldState {}

impl IsSet for Set {}

/// Reads a required slot out of a generated builder store.
///
/// Generated code only calls this from `build()`, whose bounds prove the slot was written.
#[doc(hidden)]
pub fn required<T: Clone>(slot: &Option<T>, target: &str, field: &str) -> T {
    match slot {
        Some(value) => value.clone(),
        None => unreachable!("`{target}.{field}` is marked set but its slot is empty"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_set<S: FieldState>() -> bool {
        S::IS_SET
    }

    #[test]
    fn markers_report_presence() {
        assert!(is_set::<Set>());
        assert!(!is_set::<Unset>());
    }

    #[test]
    fn required_clones_out_of_slot() {
        let slot = Some(String::from("a@b.com"));
        assert_eq!(required(&slot, "User", "email"), "a@b.com");
        assert!(slot.is_some());
    }
}
