//! Variable binding validator.
//!
//! Checks that:
//! - every variable of the CONSTRUCT template is bound in the WHERE text
//! - no two distinct variables share a numeric suffix

use std::collections::BTreeMap;

use schema_construct::QueryFragments;

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "query/variables";

/// Validates variable binding and naming.
pub fn validate(schema: &str, fragments: &QueryFragments) -> ConformanceReport {
    let mut report = ConformanceReport::new();
    let variables = fragments.variables();

    let bound: Vec<&str> = fragments.where_optionals.split_whitespace().collect();
    let unbound: Vec<String> = variables
        .iter()
        .filter(|variable| !bound.contains(variable))
        .map(|variable| (*variable).to_owned())
        .collect();
    if unbound.is_empty() {
        report.push(TestResult::pass(
            VALIDATOR,
            schema,
            format!("all {} variables bound in WHERE", variables.len()),
        ));
    } else {
        report.push(TestResult::fail_with_details(
            VALIDATOR,
            schema,
            format!("{} variable(s) never bound", unbound.len()),
            unbound,
        ));
    }

    let mut by_suffix: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for variable in &variables {
        let suffix = variable.rsplit('_').next().unwrap_or_default();
        by_suffix.entry(suffix).or_default().push(*variable);
    }
    let clashes: Vec<String> = by_suffix
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(suffix, names)| format!("_{suffix}: {}", names.join(", ")))
        .collect();
    if clashes.is_empty() {
        report.push(TestResult::pass(
            VALIDATOR,
            schema,
            "variable suffixes are unique",
        ));
    } else {
        report.push(TestResult::fail_with_details(
            VALIDATOR,
            schema,
            "variables share a numeric suffix",
            clashes,
        ));
    }

    report
}
