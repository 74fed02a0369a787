//! Generated query validators.
//!
//! These operate on the [`QueryFragments`](schema_construct::QueryFragments)
//! of one schema and need no file I/O.

pub mod optionals;
pub mod triples;
pub mod variables;
