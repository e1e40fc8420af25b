//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use fieldwise::{FieldType, Record, Schema};
use serde::Deserialize;

/// The running example: two required fields and one optional.
pub fn user_schema() -> Schema {
    Schema::new("User")
        .required("email", FieldType::Text)
        .required("id", FieldType::Integer)
        .optional("age", FieldType::Integer)
}

/// Finalizer target used to check that `build` routes through the finalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapper {
    pub record: Record,
}

pub fn wrap(record: Record) -> Wrapper {
    Wrapper { record }
}

/// Typed counterpart of [`user_schema`] for the dynamic `build_into` path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRow {
    pub email: String,
    pub id: u64,
    pub age: Option<u32>,
}

/// Every ordering of `items`.
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}
