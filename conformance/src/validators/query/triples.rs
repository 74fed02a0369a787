//! CONSTRUCT template validator.
//!
//! Every line of the template must be a single triple pattern
//! `subject predicate object .` where:
//! - the subject is an IRI in angle brackets or a variable
//! - the predicate is `a` or a prefixed name
//! - the object is a variable

use schema_construct::QueryFragments;

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "query/triples";

/// Validates the shape of every CONSTRUCT template line.
pub fn validate(schema: &str, fragments: &QueryFragments) -> ConformanceReport {
    let mut report = ConformanceReport::new();

    let malformed: Vec<String> = fragments
        .construct
        .lines()
        .filter(|line| !is_triple_pattern(line))
        .map(str::to_owned)
        .collect();

    if fragments.construct.is_empty() {
        report.push(TestResult::fail(VALIDATOR, schema, "CONSTRUCT template is empty"));
    } else if malformed.is_empty() {
        report.push(TestResult::pass(
            VALIDATOR,
            schema,
            format!(
                "{} triple patterns well-formed",
                fragments.construct.lines().count()
            ),
        ));
    } else {
        report.push(TestResult::fail_with_details(
            VALIDATOR,
            schema,
            format!("{} malformed triple pattern(s)", malformed.len()),
            malformed,
        ));
    }

    report
}

/// Whether `line` is `subject predicate ?object .`.
pub fn is_triple_pattern(line: &str) -> bool {
    let terms: Vec<&str> = line.split_whitespace().collect();
    let [subject, predicate, object, "."] = terms.as_slice() else {
        return false;
    };
    let subject_ok = is_variable(subject) || (subject.starts_with('<') && subject.ends_with('>'));
    let predicate_ok = *predicate == "a" || predicate.contains(':');
    subject_ok && predicate_ok && is_variable(object)
}

fn is_variable(term: &str) -> bool {
    term.len() > 1 && term.starts_with('?')
}
