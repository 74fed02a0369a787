//! JSON Schema to SPARQL CONSTRUCT translation.
//!
//! The `schema-construct` crate walks the `properties` tree of a JSON Schema
//! document and emits the triple patterns of a SPARQL CONSTRUCT query that
//! rebuilds instances of that shape from an RDF store. `$ref` properties are
//! followed through a JSON Pointer resolver that also looks inside
//! `oneOf`/`allOf`/`anyOf`/`then`/`else` branches when a direct lookup fails.
//!
//! # Entry Point
//!
//! ```
//! use schema_construct::{build_construct_query, ConstructOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": { "name": { "type": "string" } }
//! });
//! let fragments =
//!     build_construct_query("http://example.com/alice", &schema, &ConstructOptions::default())
//!         .expect("schema has no references");
//! assert!(fragments.construct.contains("<http://example.com/alice> :name ?name_1 ."));
//! ```
//!
//! # Resolution
//!
//! ```
//! use schema_construct::resolver::resolve_schema;
//! use serde_json::json;
//!
//! let root = json!({
//!     "definitions": { "address": { "type": "object" } },
//!     "properties": { "home": { "$ref": "#/definitions/address" } }
//! });
//! let home = resolve_schema(&root, "#/properties/home", &root).expect("resolvable");
//! assert_eq!(home, &json!({ "type": "object" }));
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod builder;
pub mod error;
pub mod model;
pub mod options;
pub mod query;
pub mod resolver;

pub use builder::{build_construct_query, ConstructQueryBuilder};
pub use error::{ResolveError, Result};
pub use model::{Items, ReferenceMap, Schema, SchemaExt};
pub use options::{ConstructOptions, DEFAULT_MAX_RECURSION};
pub use query::QueryFragments;
pub use resolver::{collect_refs, decode_pointer_segment, find_all_refs, resolve_schema};
