extern crate proc_macro;

mod attrs;
mod expand;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives a compile-time checked builder for a struct with named fields.
///
/// Field roles:
/// - `Option<T>` fields are optional; the setter takes `T`.
/// - `#[builder(default)]` / `#[builder(default = expr)]` fields start initialized.
/// - every other field is required and tracked in the builder's type.
///
/// Field options: `into` (setter takes `impl Into<T>`), `rename = "name"` (setter name).
/// Container option: `name = "Ident"` (builder type name, default `<Struct>Builder`).
#[proc_macro_derive(Builder, attributes(builder))]
pub fn derive_builder(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match attrs::Target::parse(&input) {
        Ok(target) => expand::derive_builder(&target).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
