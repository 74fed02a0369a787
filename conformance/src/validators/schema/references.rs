//! Reference resolution validator.
//!
//! Every `$ref` reachable from the document (tuple slots included) must
//! resolve against the document root.

use schema_construct::{collect_refs, resolve_schema, Schema};

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "schema/references";

/// Validates that all references in `document` resolve.
pub fn validate(name: &str, document: &Schema) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let references = collect_refs(document, true);

    let failures: Vec<String> = references
        .keys()
        .filter_map(|reference| {
            resolve_schema(document, reference, document)
                .err()
                .map(|err| format!("{reference}: {err}"))
        })
        .collect();

    if failures.is_empty() {
        report.push(TestResult::pass(
            VALIDATOR,
            name,
            format!("{} reference(s) resolve", references.len()),
        ));
    } else {
        report.push(TestResult::fail_with_details(
            VALIDATOR,
            name,
            format!("{} unresolvable reference(s)", failures.len()),
            failures,
        ));
    }

    report
}
