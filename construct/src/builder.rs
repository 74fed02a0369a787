//! CONSTRUCT query generation from a schema's property tree.
//!
//! Starting from a subject URI, every schema node that is expanded gets an
//! optional `a ?__type_N` binding, and every property becomes a triple
//! `subject :property ?property_N`. Properties listed in `required` are hard
//! constraints in the WHERE text; the others are wrapped in `OPTIONAL { }`,
//! together with everything generated below them. Object-valued properties,
//! `$ref` properties and arrays of objects are expanded recursively with the
//! property's variable as the new subject.

use std::fmt::Write as FmtWrite;

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{Items, Schema, SchemaExt};
use crate::options::ConstructOptions;
use crate::query::QueryFragments;
use crate::resolver::resolve_schema;

/// Builds CONSTRUCT/WHERE fragments for one subject.
///
/// The builder owns the variable counter, so variable names are unique within
/// one [`build`](Self::build) and numbering always starts at `0`.
#[derive(Debug)]
pub struct ConstructQueryBuilder<'a> {
    root: &'a Schema,
    options: &'a ConstructOptions,
    next_variable: usize,
    fragments: QueryFragments,
}

/// One pending unit of the walk.
///
/// Steps are popped last-in first-out, so the children of a node are pushed
/// in reverse to come out in document order. The walk therefore uses heap
/// memory rather than the thread stack, however deep `max_recursion` allows.
#[derive(Debug)]
enum Step<'a> {
    /// Type binding and property patterns of `schema` for `subject`.
    Expand {
        subject: String,
        schema: &'a Schema,
        level: usize,
    },
    /// The triple for one property of a schema expanded at `level`.
    Property {
        subject: String,
        name: &'a str,
        schema: &'a Schema,
        required: bool,
        level: usize,
    },
    /// The shape below a property's object variable.
    Value {
        object: String,
        schema: &'a Schema,
        level: usize,
    },
    /// Closes the `OPTIONAL {` block of a non-required property.
    Close,
}

impl<'a> ConstructQueryBuilder<'a> {
    /// Creates a builder for `root` with the given options.
    #[must_use]
    pub fn new(root: &'a Schema, options: &'a ConstructOptions) -> Self {
        Self {
            root,
            options,
            next_variable: 0,
            fragments: QueryFragments::default(),
        }
    }

    /// Walks the root schema with `<subject_uri>` as subject.
    ///
    /// If the root's `items` is a single schema with `properties`, that schema
    /// is walked as well, at level 0 with the same subject.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`](crate::ResolveError) when a `$ref` met
    /// during the walk cannot be dereferenced.
    pub fn build(mut self, subject_uri: &str) -> Result<QueryFragments> {
        let subject = format!("<{subject_uri}>");
        let root = self.root;
        let mut steps = Vec::new();
        if let Some(items) = root.items().and_then(Items::single) {
            if items.properties().is_some() {
                steps.push(Step::Expand {
                    subject: subject.clone(),
                    schema: items,
                    level: 0,
                });
            }
        }
        steps.push(Step::Expand {
            subject,
            schema: root,
            level: 0,
        });

        while let Some(step) = steps.pop() {
            match step {
                Step::Expand {
                    subject,
                    schema,
                    level,
                } => self.expand(subject, schema, level, &mut steps),
                Step::Property {
                    subject,
                    name,
                    schema,
                    required,
                    level,
                } => self.property(&subject, name, schema, required, level, &mut steps),
                Step::Value {
                    object,
                    schema,
                    level,
                } => self.expand_value(object, schema, level, &mut steps)?,
                Step::Close => self.fragments.where_optionals.push_str("}\n"),
            }
        }
        Ok(self.fragments)
    }

    /// Allocates the next variable, `?{hint}_{n}`.
    ///
    /// Characters of `hint` that may not appear in a SPARQL variable name
    /// are replaced by `_`, so the property `@id` yields `?_id_n` and
    /// `foaf:name` yields `?foaf_name_n`. The predicate keeps the name as is.
    fn fresh_variable(&mut self, hint: &str) -> String {
        let variable = format!("?{}_{}", variable_hint(hint), self.next_variable);
        self.next_variable += 1;
        variable
    }

    /// Emits the type binding of `schema` for `subject` and queues its
    /// properties.
    fn expand(
        &mut self,
        subject: String,
        schema: &'a Schema,
        level: usize,
        steps: &mut Vec<Step<'a>>,
    ) {
        let options = self.options;
        if level > options.max_recursion {
            warn!(
                level,
                max_recursion = options.max_recursion,
                "maximum recursion exceeded, not expanding {subject}"
            );
            return;
        }
        if level > 0 && schema.has_stop_symbol(&options.stop_symbols) {
            debug!(%subject, level, "stop symbol present, not expanding");
            return;
        }

        let type_variable = self.fresh_variable("__type");
        let _ = writeln!(
            self.fragments.where_optionals,
            "OPTIONAL {{ {subject} a {type_variable} . }}"
        );
        let _ = writeln!(self.fragments.construct, "{subject} a {type_variable} .");

        let Some(properties) = schema.properties() else {
            return;
        };
        let queued: Vec<(&'a str, &'a Schema)> = properties
            .iter()
            .filter(|(name, value)| value.is_object_schema() && !options.is_excluded(name))
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        for (name, property_schema) in queued.into_iter().rev() {
            steps.push(Step::Property {
                subject: subject.clone(),
                name,
                schema: property_schema,
                required: schema.is_required(name),
                level,
            });
        }
    }

    /// Emits the triple of one property and queues the shape below it.
    fn property(
        &mut self,
        subject: &str,
        name: &str,
        schema: &'a Schema,
        required: bool,
        level: usize,
        steps: &mut Vec<Step<'a>>,
    ) {
        let predicate = prefixed(name);
        let object = self.fresh_variable(name);

        if required {
            let _ = writeln!(
                self.fragments.where_optionals,
                "{subject} {predicate} {object} ."
            );
        } else {
            let _ = writeln!(
                self.fragments.where_optionals,
                "OPTIONAL {{\n{subject} {predicate} {object} ."
            );
            steps.push(Step::Close);
        }
        let _ = writeln!(self.fragments.construct, "{subject} {predicate} {object} .");

        steps.push(Step::Value {
            object,
            schema,
            level,
        });
    }

    /// Queues the shape of a property value: a `$ref` target, an inline
    /// object, or the element schema of an array, in that order of precedence.
    fn expand_value(
        &mut self,
        object: String,
        schema: &'a Schema,
        level: usize,
        steps: &mut Vec<Step<'a>>,
    ) -> Result<()> {
        let options = self.options;
        let stop_symbols = &options.stop_symbols;
        let mut children: Vec<&'a Schema> = Vec::new();

        if schema.reference().is_some() {
            let target = resolve_schema(schema, "", self.root)?;
            if target.properties().is_some() && !target.has_stop_symbol(stop_symbols) {
                children.push(target);
            }
        } else if schema.properties().is_some() && !schema.has_stop_symbol(stop_symbols) {
            children.push(schema);
        } else if let Some(items) = schema.items() {
            // Tuple typing is not expanded.
            let Some(items) = items.single().filter(|items| items.is_object_schema()) else {
                return Ok(());
            };
            if items.properties().is_some() && !items.has_stop_symbol(stop_symbols) {
                children.push(items);
            }
            if !options.do_not_follow_items_refs && items.reference().is_some() {
                let target = resolve_schema(items, "", self.root)?;
                if target.is_object_schema() {
                    children.push(target);
                }
            }
        }

        for child in children.into_iter().rev() {
            steps.push(Step::Expand {
                subject: object.clone(),
                schema: child,
                level: level + 1,
            });
        }
        Ok(())
    }
}

/// Builds the CONSTRUCT/WHERE fragments for `subject_uri` over `root_schema`.
///
/// # Errors
///
/// Returns a [`ResolveError`](crate::ResolveError) when a `$ref` met during
/// the walk cannot be dereferenced.
pub fn build_construct_query(
    subject_uri: &str,
    root_schema: &Schema,
    options: &ConstructOptions,
) -> Result<QueryFragments> {
    ConstructQueryBuilder::new(root_schema, options).build(subject_uri)
}

/// Predicate term for a property: `:name`, or the name itself if it already
/// carries a prefix.
fn prefixed(property: &str) -> String {
    if property.contains(':') {
        property.to_owned()
    } else {
        format!(":{property}")
    }
}

/// Replaces characters that may not appear in a SPARQL variable name.
fn variable_hint(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(schema: &Schema, options: &ConstructOptions) -> QueryFragments {
        build_construct_query("http://example.com/s", schema, options).expect("query builds")
    }

    #[test]
    fn prefixes_bare_property_names() {
        assert_eq!(prefixed("name"), ":name");
        assert_eq!(prefixed("foaf:name"), "foaf:name");
        assert_eq!(prefixed("http://xmlns.com/foaf/0.1/name"), "http://xmlns.com/foaf/0.1/name");
    }

    #[test]
    fn sanitizes_variable_hints() {
        assert_eq!(variable_hint("foaf:name"), "foaf_name");
        assert_eq!(variable_hint("@id"), "_id");
        assert_eq!(variable_hint("__type"), "__type");
        assert_eq!(variable_hint("straße"), "straße");
    }

    #[test]
    fn empty_schema_yields_only_the_type_binding() {
        let fragments = build(&json!({}), &ConstructOptions::default());
        assert_eq!(fragments.construct, "<http://example.com/s> a ?__type_0 .\n");
        assert_eq!(
            fragments.where_optionals,
            "OPTIONAL { <http://example.com/s> a ?__type_0 . }\n"
        );
        assert!(fragments.where_required.is_empty());
    }

    #[test]
    fn required_triples_are_bare_and_optional_ones_wrapped() {
        let schema = json!({
            "required": ["name"],
            "properties": { "name": { "type": "string" }, "age": { "type": "integer" } }
        });
        let fragments = build(&schema, &ConstructOptions::default());
        assert_eq!(
            fragments.where_optionals,
            "OPTIONAL { <http://example.com/s> a ?__type_0 . }\n\
             <http://example.com/s> :name ?name_1 .\n\
             OPTIONAL {\n<http://example.com/s> :age ?age_2 .\n}\n"
        );
        assert!(fragments.construct.contains("<http://example.com/s> :name ?name_1 .\n"));
        assert!(fragments.construct.contains("<http://example.com/s> :age ?age_2 .\n"));
    }

    #[test]
    fn excluded_properties_are_skipped_entirely() {
        let schema = json!({
            "properties": {
                "secret": { "type": "object", "properties": { "pin": {} } },
                "name": { "type": "string" }
            }
        });
        let options = ConstructOptions::default().with_excluded_properties(["secret"]);
        let fragments = build(&schema, &options);
        assert!(!fragments.construct.contains("secret"));
        assert!(!fragments.construct.contains("pin"));
        assert!(fragments.construct.contains(":name ?name_1 ."));
    }

    #[test]
    fn boolean_property_schemas_are_skipped() {
        let schema = json!({ "properties": { "anything": true, "name": {} } });
        let fragments = build(&schema, &ConstructOptions::default());
        assert!(!fragments.construct.contains("anything"));
        assert!(fragments.construct.contains(":name ?name_1 ."));
    }

    #[test]
    fn follows_property_refs() {
        let schema = json!({
            "definitions": {
                "address": { "properties": { "city": { "type": "string" } } }
            },
            "properties": { "home": { "$ref": "#/definitions/address" } }
        });
        let fragments = build(&schema, &ConstructOptions::default());
        assert!(fragments.construct.contains("?home_1 a ?__type_2 .\n"));
        assert!(fragments.construct.contains("?home_1 :city ?city_3 .\n"));
    }

    #[test]
    fn stop_symbol_on_ref_target_blocks_expansion() {
        let schema = json!({
            "definitions": { "node": { "properties": { "@id": {}, "label": {} } } },
            "properties": { "link": { "$ref": "#/definitions/node" } }
        });
        let options = ConstructOptions::default().with_stop_symbols(["@id"]);
        let fragments = build(&schema, &options);
        assert!(fragments.construct.contains(":link ?link_1 ."));
        assert!(!fragments.construct.contains("?link_1 a"));
        assert!(!fragments.construct.contains("label"));
    }

    #[test]
    fn stop_symbol_never_applies_to_the_root() {
        let schema = json!({ "properties": { "@id": {}, "name": {} } });
        let options = ConstructOptions::default().with_stop_symbols(["@id"]);
        let fragments = build(&schema, &options);
        assert!(fragments.construct.contains("<http://example.com/s> :@id ?_id_1 ."));
        assert!(fragments.construct.contains(":name ?name_2 ."));
    }

    #[test]
    fn array_items_refs_are_followed_unless_disabled() {
        let schema = json!({
            "definitions": { "tag": { "properties": { "label": {} } } },
            "properties": {
                "tags": { "type": "array", "items": { "$ref": "#/definitions/tag" } }
            }
        });
        let followed = build(&schema, &ConstructOptions::default());
        assert!(followed.construct.contains("?tags_1 :label ?label_3 ."));

        let options = ConstructOptions::default().with_do_not_follow_items_refs(true);
        let not_followed = build(&schema, &options);
        assert!(!not_followed.construct.contains("label"));
        assert!(not_followed.construct.contains(":tags ?tags_1 ."));
    }

    #[test]
    fn tuple_items_are_not_expanded() {
        let schema = json!({
            "properties": {
                "pair": { "type": "array", "items": [{ "properties": { "a": {} } }] }
            }
        });
        let fragments = build(&schema, &ConstructOptions::default());
        assert_eq!(fragments.variables(), ["?__type_0", "?pair_1"]);
    }

    #[test]
    fn root_array_items_are_walked_with_the_same_subject() {
        let schema = json!({
            "type": "array",
            "items": { "properties": { "title": {} } }
        });
        let fragments = build(&schema, &ConstructOptions::default());
        assert_eq!(
            fragments.construct,
            "<http://example.com/s> a ?__type_0 .\n\
             <http://example.com/s> a ?__type_1 .\n\
             <http://example.com/s> :title ?title_2 .\n"
        );
    }

    #[test]
    fn dangling_ref_is_an_error() {
        let schema = json!({ "properties": { "x": { "$ref": "#/definitions/none" } } });
        let options = ConstructOptions::default();
        let err = build_construct_query("http://example.com/s", &schema, &options).unwrap_err();
        assert_eq!(err.path(), "#/definitions/none");
    }

    #[test]
    fn counter_restarts_for_each_builder() {
        let schema = json!({ "properties": { "name": {} } });
        let options = ConstructOptions::default();
        let first = build(&schema, &options);
        let second = build(&schema, &options);
        assert_eq!(first, second);
    }
}
