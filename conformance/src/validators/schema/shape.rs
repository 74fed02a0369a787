//! Root shape validator.
//!
//! The root must be a JSON object. A root with neither `properties` nor an
//! object-valued `items` schema yields a query holding only the subject's
//! type binding, which is reported as a warning.

use schema_construct::{Items, Schema, SchemaExt};

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "schema/shape";

/// Validates the root of `document`.
pub fn validate(name: &str, document: &Schema) -> ConformanceReport {
    let mut report = ConformanceReport::new();

    if !document.is_object_schema() {
        report.push(TestResult::fail(
            VALIDATOR,
            name,
            "root schema is not a JSON object",
        ));
        return report;
    }

    let has_properties = document.properties().is_some_and(|p| !p.is_empty());
    let has_item_properties = document
        .items()
        .and_then(Items::single)
        .is_some_and(|items| items.properties().is_some());

    if has_properties || has_item_properties {
        report.push(TestResult::pass(VALIDATOR, name, "root schema has properties"));
    } else {
        report.push(TestResult::warn(
            VALIDATOR,
            name,
            "root schema has no properties; only a type binding is generated",
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use serde_json::json;

    #[test]
    fn classifies_roots() {
        assert!(!validate("a", &json!([])).all_passed());
        assert_eq!(
            validate("b", &json!({ "type": "string" })).count(Severity::Warning),
            1
        );
        let array = json!({ "type": "array", "items": { "properties": { "x": {} } } });
        assert_eq!(validate("c", &array).count(Severity::Pass), 1);
    }
}
