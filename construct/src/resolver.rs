//! JSON Pointer resolution over schema documents.
//!
//! [`resolve_schema`] maps a `/`-separated pointer path to the subschema it
//! denotes. `$ref` nodes are dereferenced against the root document before any
//! further segment is consumed, and a failed `properties`/`items` lookup is
//! retried inside the `oneOf`/`allOf`/`anyOf`/`then`/`else` branches, so paths
//! may omit the branch selector. The document is never modified; every result
//! borrows from it.
//!
//! [`find_all_refs`] collects the `$ref` strings reachable from a schema.

use serde_json::Value;
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::model::{Items, ReferenceMap, Schema, SchemaExt};

/// Decodes one JSON Pointer segment: `~1` becomes `/`, then `~0` becomes `~`.
#[must_use]
pub fn decode_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Records every `$ref` reachable from `schema` into `result`.
///
/// Descends into every value of `properties`, into the `items` of an
/// array-typed schema (each tuple slot only when `resolve_tuples` is set),
/// and into every entry of `anyOf`. `items` without `type: "array"` is not
/// searched. A schema carrying `$ref` is stored
/// under its reference string; a later schema with the same string replaces
/// an earlier one. References are recorded but never followed, so the walk
/// visits each node of the document at most once.
pub fn find_all_refs<'a>(schema: &'a Schema, result: &mut ReferenceMap<'a>, resolve_tuples: bool) {
    if let Some(properties) = schema.properties() {
        for property in properties.values() {
            find_all_refs(property, result, resolve_tuples);
        }
    }
    if schema.is_array() {
        match schema.items() {
            Some(Items::Single(items)) => find_all_refs(items, result, resolve_tuples),
            Some(Items::Tuple(slots)) if resolve_tuples => {
                for slot in slots {
                    find_all_refs(slot, result, resolve_tuples);
                }
            }
            _ => {}
        }
    }
    if let Some(Value::Array(any_of)) = schema.get("anyOf") {
        for alternative in any_of {
            find_all_refs(alternative, result, resolve_tuples);
        }
    }
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        result.insert(reference.to_owned(), schema);
    }
}

/// Collects the references reachable from `schema` into a fresh map.
#[must_use]
pub fn collect_refs(schema: &Schema, resolve_tuples: bool) -> ReferenceMap<'_> {
    let mut result = ReferenceMap::new();
    find_all_refs(schema, &mut result, resolve_tuples);
    result
}

/// Resolves `schema_path` starting at `schema`, dereferencing `$ref` through
/// `root_schema`.
///
/// Empty and `#` segments are skipped, so `""`, `"#"` and `"#/properties/a"`
/// are all accepted. A segment may be a dotted path such as `properties.name`.
///
/// # Errors
///
/// Returns [`ResolveError::Unresolvable`] carrying `schema_path` when no
/// subschema is reachable, or carrying a nested `$ref` that cannot be
/// dereferenced. Returns [`ResolveError::ReferenceCycle`] when a `$ref` chain
/// never reaches a concrete schema.
pub fn resolve_schema<'a>(
    schema: &'a Schema,
    schema_path: &str,
    root_schema: &'a Schema,
) -> Result<&'a Schema> {
    resolve_path(schema, schema_path, root_schema, &mut Vec::new())
}

/// Pointer resolution with the chain of references currently being
/// dereferenced.
fn resolve_path<'a>(
    schema: &'a Schema,
    schema_path: &str,
    root_schema: &'a Schema,
    chain: &mut Vec<String>,
) -> Result<&'a Schema> {
    let segments: Vec<String> = schema_path.split('/').map(decode_pointer_segment).collect();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    resolve_segments(Some(schema), &segments, root_schema, chain)?.ok_or_else(|| {
        ResolveError::Unresolvable {
            path: schema_path.to_owned(),
        }
    })
}

/// Resolves the remaining `segments` against `schema`. `Ok(None)` means this
/// branch found nothing and the caller may try alternatives.
fn resolve_segments<'a>(
    schema: Option<&'a Schema>,
    segments: &[&str],
    root_schema: &'a Schema,
    chain: &mut Vec<String>,
) -> Result<Option<&'a Schema>> {
    let Some(mut schema) = schema.filter(|schema| !schema.is_empty_schema()) else {
        return Ok(None);
    };

    if let Some(reference) = schema.reference() {
        schema = dereference(reference, root_schema, chain)?;
    }

    let Some((&segment, remaining)) = segments.split_first() else {
        return Ok(Some(schema));
    };

    if segment.is_empty() || segment == "#" {
        return resolve_segments(Some(schema), remaining, root_schema, chain);
    }

    if let Some(found) = resolve_segments(schema.lookup(segment), remaining, root_schema, chain)? {
        return Ok(Some(found));
    }

    // Only for `properties`/`items`, so a property literally named `oneOf`
    // (or `then`, ...) is never shadowed by a branch.
    if segment == "properties" || segment == "items" {
        for branch in schema.branches() {
            if let Some(found) = resolve_segments(Some(branch), segments, root_schema, chain)? {
                return Ok(Some(found));
            }
        }
    }

    Ok(None)
}

fn dereference<'a>(
    reference: &str,
    root_schema: &'a Schema,
    chain: &mut Vec<String>,
) -> Result<&'a Schema> {
    if chain.iter().any(|seen| seen == reference) {
        return Err(ResolveError::ReferenceCycle {
            reference: reference.to_owned(),
        });
    }
    debug!(reference, depth = chain.len(), "dereferencing $ref");
    chain.push(reference.to_owned());
    let resolved = resolve_path(root_schema, reference, root_schema, chain);
    chain.pop();
    resolved
}
