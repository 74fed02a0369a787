//! Validators for schema documents and the queries generated from them.

pub mod query;
pub mod schema;
