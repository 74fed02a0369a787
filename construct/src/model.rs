//! Read-only view of JSON Schema documents.
//!
//! A schema is kept as the parsed [`serde_json::Value`] and only ever
//! borrowed. Both draft-04 and draft-07 documents are accepted; only the
//! keywords `type`, `properties`, `items`, `required`, `$ref`, `oneOf`,
//! `allOf`, `anyOf`, `then` and `else` are consulted, through [`SchemaExt`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A JSON Schema node. Any JSON value is accepted; non-object values behave
/// as schemas without keywords.
pub type Schema = Value;

/// References found in a schema, keyed by the `$ref` string. The value is the
/// schema that *carries* the reference, not its target.
pub type ReferenceMap<'a> = BTreeMap<String, &'a Schema>;

/// Keywords whose subschemas are tried when a `properties`/`items` lookup
/// fails, in the order they are tried.
pub const BRANCH_KEYWORDS: [&str; 5] = ["oneOf", "allOf", "anyOf", "then", "else"];

/// The `items` keyword of an array schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Items<'a> {
    /// One schema applying to every element.
    Single(&'a Schema),
    /// Tuple typing: one schema per position.
    Tuple(&'a [Schema]),
}

impl<'a> Items<'a> {
    /// Returns the per-element schema, or `None` for tuple typing.
    #[must_use]
    pub fn single(self) -> Option<&'a Schema> {
        match self {
            Items::Single(schema) => Some(schema),
            Items::Tuple(_) => None,
        }
    }
}

/// Keyword accessors on a schema node.
pub trait SchemaExt {
    /// The `properties` mapping, if present and an object.
    fn properties(&self) -> Option<&Map<String, Value>>;

    /// The `items` keyword, if present.
    fn items(&self) -> Option<Items<'_>>;

    /// The `$ref` string, if present and non-empty.
    fn reference(&self) -> Option<&str>;

    /// Names listed under `required`.
    fn required_names(&self) -> Vec<&str>;

    /// Whether `name` is listed under `required`.
    fn is_required(&self, name: &str) -> bool;

    /// Whether `type` is `"array"` (or a type list containing it).
    fn is_array(&self) -> bool;

    /// Whether the node is a JSON object, i.e. a schema that can carry keywords.
    fn is_object_schema(&self) -> bool;

    /// Whether the node holds nothing: `null`, a boolean, a number, or an
    /// empty string, array or object.
    fn is_empty_schema(&self) -> bool;

    /// Whether any key of `properties` is one of `stop_symbols`.
    fn has_stop_symbol(&self, stop_symbols: &[String]) -> bool;

    /// The subschemas of `oneOf`, `allOf`, `anyOf`, `then` and `else`,
    /// concatenated in that order. A keyword holding a single schema
    /// contributes that schema.
    fn branches(&self) -> Vec<&Schema>;

    /// Looks up one path segment: a direct key (or array index) first, then,
    /// if the segment contains dots, a walk along the dotted path.
    fn lookup(&self, segment: &str) -> Option<&Schema>;
}

impl SchemaExt for Value {
    fn properties(&self) -> Option<&Map<String, Value>> {
        self.get("properties").and_then(Value::as_object)
    }

    fn items(&self) -> Option<Items<'_>> {
        match self.get("items")? {
            Value::Null => None,
            Value::Array(tuple) => Some(Items::Tuple(tuple)),
            single => Some(Items::Single(single)),
        }
    }

    fn reference(&self) -> Option<&str> {
        self.get("$ref")
            .and_then(Value::as_str)
            .filter(|reference| !reference.is_empty())
    }

    fn required_names(&self) -> Vec<&str> {
        self.get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn is_required(&self, name: &str) -> bool {
        self.required_names().contains(&name)
    }

    fn is_array(&self) -> bool {
        match self.get("type") {
            Some(Value::String(ty)) => ty == "array",
            Some(Value::Array(types)) => types.iter().any(|ty| ty == "array"),
            _ => false,
        }
    }

    fn is_object_schema(&self) -> bool {
        self.is_object()
    }

    fn is_empty_schema(&self) -> bool {
        match self {
            Value::Null | Value::Bool(_) | Value::Number(_) => true,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }

    fn has_stop_symbol(&self, stop_symbols: &[String]) -> bool {
        self.properties().is_some_and(|properties| {
            stop_symbols
                .iter()
                .any(|symbol| properties.contains_key(symbol))
        })
    }

    fn branches(&self) -> Vec<&Schema> {
        let mut out = Vec::new();
        for keyword in BRANCH_KEYWORDS {
            match self.get(keyword) {
                None | Some(Value::Null) => {}
                Some(Value::Array(alternatives)) => out.extend(alternatives),
                Some(single) => out.push(single),
            }
        }
        out
    }

    fn lookup(&self, segment: &str) -> Option<&Schema> {
        if let Some(found) = child(self, segment) {
            return Some(found);
        }
        if !segment.contains('.') {
            return None;
        }
        segment
            .split('.')
            .try_fold(self, |node, key| child(node, key))
    }
}

fn child<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(elements) => key.parse::<usize>().ok().and_then(|i| elements.get(i)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_prefers_direct_keys_over_dotted_paths() {
        let schema = json!({
            "a.b": { "direct": true },
            "a": { "b": { "dotted": true } }
        });
        assert_eq!(schema.lookup("a.b"), Some(&json!({ "direct": true })));
    }

    #[test]
    fn lookup_walks_dotted_paths_and_indices() {
        let schema = json!({
            "properties": { "name": { "type": "string" } },
            "oneOf": [{ "title": "first" }]
        });
        assert_eq!(
            schema.lookup("properties.name"),
            Some(&json!({ "type": "string" }))
        );
        assert_eq!(schema.lookup("oneOf.0"), Some(&json!({ "title": "first" })));
        assert_eq!(schema.lookup("oneOf.1"), None);
        assert_eq!(schema.lookup("missing"), None);
    }

    #[test]
    fn branches_keep_keyword_order() {
        let schema = json!({
            "else": { "title": "else" },
            "anyOf": [{ "title": "any" }],
            "oneOf": [{ "title": "one-a" }, { "title": "one-b" }],
            "then": { "title": "then" }
        });
        let titles: Vec<_> = schema
            .branches()
            .into_iter()
            .filter_map(|s| s.get("title").and_then(Value::as_str))
            .collect();
        assert_eq!(titles, ["one-a", "one-b", "any", "then", "else"]);
    }

    #[test]
    fn empty_schemas() {
        assert!(json!(null).is_empty_schema());
        assert!(json!(true).is_empty_schema());
        assert!(json!({}).is_empty_schema());
        assert!(json!([]).is_empty_schema());
        assert!(!json!({ "type": "string" }).is_empty_schema());
        assert!(!json!("object").is_empty_schema());
    }

    #[test]
    fn required_and_stop_symbols() {
        let schema = json!({
            "required": ["name", 3],
            "properties": { "name": {}, "@id": {} }
        });
        assert!(schema.is_required("name"));
        assert!(!schema.is_required("age"));
        assert!(schema.has_stop_symbol(&["@id".to_owned()]));
        assert!(!schema.has_stop_symbol(&["@type".to_owned()]));
        assert!(!json!({}).has_stop_symbol(&["@id".to_owned()]));
    }

    #[test]
    fn items_variants() {
        let single = json!({ "type": "array", "items": { "type": "string" } });
        let tuple = json!({ "type": ["array", "null"], "items": [{}, {}] });
        assert!(single.is_array());
        assert!(tuple.is_array());
        assert_eq!(
            single.items().and_then(Items::single),
            Some(&json!({ "type": "string" }))
        );
        assert!(matches!(tuple.items(), Some(Items::Tuple(slots)) if slots.len() == 2));
        assert_eq!(json!({ "type": "object" }).items(), None);
    }

    #[test]
    fn empty_reference_is_ignored() {
        assert_eq!(json!({ "$ref": "" }).reference(), None);
        assert_eq!(json!({ "$ref": "#/a" }).reference(), Some("#/a"));
    }
}
