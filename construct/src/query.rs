//! Generated query text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three text buffers produced by one query-building run.
///
/// Each buffer is newline-terminated SPARQL ready to be placed inside the
/// braces of a `CONSTRUCT { }` or `WHERE { }` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFragments {
    /// Triple patterns for the CONSTRUCT template, all unconditional.
    pub construct: String,
    /// Reserved for required-only WHERE text; currently always empty.
    pub where_required: String,
    /// WHERE text mixing bare required triples with `OPTIONAL { }` blocks.
    pub where_optionals: String,
}

impl QueryFragments {
    /// Renders a complete CONSTRUCT query.
    #[must_use]
    pub fn to_query(&self) -> String {
        format!(
            "CONSTRUCT {{\n{}}} WHERE {{\n{}{}}}\n",
            self.construct, self.where_required, self.where_optionals
        )
    }

    /// Distinct variables of the CONSTRUCT template, in first-use order.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for term in self.construct.split_whitespace() {
            if term.starts_with('?') && !seen.contains(&term) {
                seen.push(term);
            }
        }
        seen
    }
}

impl fmt::Display for QueryFragments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryFragments {
        QueryFragments {
            construct: "<s> a ?__type_0 .\n<s> :p ?p_1 .\n".to_owned(),
            where_required: String::new(),
            where_optionals: "OPTIONAL { <s> a ?__type_0 . }\n<s> :p ?p_1 .\n".to_owned(),
        }
    }

    #[test]
    fn renders_full_query() {
        assert_eq!(
            sample().to_query(),
            "CONSTRUCT {\n<s> a ?__type_0 .\n<s> :p ?p_1 .\n} WHERE {\n\
             OPTIONAL { <s> a ?__type_0 . }\n<s> :p ?p_1 .\n}\n"
        );
        assert_eq!(sample().to_string(), sample().to_query());
    }

    #[test]
    fn lists_variables_once() {
        assert_eq!(sample().variables(), ["?__type_0", "?p_1"]);
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(sample()).expect("serializable");
        assert!(value.get("whereOptionals").is_some());
        assert_eq!(value["whereRequired"], "");
    }
}
