//! WHERE clause structure validator.
//!
//! The WHERE text is a sequence of lines, each one of:
//! - a bare triple pattern (a required binding)
//! - a one-line `OPTIONAL { ... }` type binding
//! - `OPTIONAL {` opening a block, closed later by a line holding `}`
//!
//! Blocks must nest properly and all be closed at the end.

use schema_construct::QueryFragments;

use crate::report::{ConformanceReport, TestResult};
use crate::validators::query::triples::is_triple_pattern;

const VALIDATOR: &str = "query/optionals";

/// Validates `OPTIONAL` nesting in the WHERE text.
pub fn validate(schema: &str, fragments: &QueryFragments) -> ConformanceReport {
    let mut report = ConformanceReport::new();

    if !fragments.where_required.is_empty() {
        report.push(TestResult::warn(
            VALIDATOR,
            schema,
            "required-only WHERE fragment is not empty",
        ));
    }

    match check_nesting(&fragments.where_optionals) {
        Ok(blocks) => report.push(TestResult::pass(
            VALIDATOR,
            schema,
            format!("{blocks} OPTIONAL block(s) balanced"),
        )),
        Err(problems) => report.push(TestResult::fail_with_details(
            VALIDATOR,
            schema,
            "OPTIONAL blocks are not well-formed",
            problems,
        )),
    }

    report
}

/// Returns the number of multi-line `OPTIONAL` blocks, or the problems found.
fn check_nesting(where_text: &str) -> Result<usize, Vec<String>> {
    let mut problems = Vec::new();
    let mut depth = 0usize;
    let mut blocks = 0usize;

    for (number, line) in where_text.lines().enumerate() {
        let number = number + 1;
        if line == "OPTIONAL {" {
            depth += 1;
            blocks += 1;
        } else if line == "}" {
            if depth == 0 {
                problems.push(format!("line {number}: unmatched closing brace"));
            } else {
                depth -= 1;
            }
        } else if let Some(inner) = line
            .strip_prefix("OPTIONAL { ")
            .and_then(|rest| rest.strip_suffix(" }"))
        {
            if !is_triple_pattern(inner) {
                problems.push(format!("line {number}: malformed optional binding: {line}"));
            }
        } else if !is_triple_pattern(line) {
            problems.push(format!("line {number}: unexpected text: {line}"));
        }
    }

    if depth > 0 {
        problems.push(format!("{depth} OPTIONAL block(s) left open"));
    }

    if problems.is_empty() {
        Ok(blocks)
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_blocks() {
        let text = "OPTIONAL { <s> a ?__type_0 . }\n\
                    OPTIONAL {\n<s> :knows ?knows_1 .\n\
                    OPTIONAL { ?knows_1 a ?__type_2 . }\n\
                    OPTIONAL {\n?knows_1 :nick ?nick_3 .\n}\n}\n";
        assert_eq!(check_nesting(text), Ok(2));
    }

    #[test]
    fn rejects_unbalanced_blocks() {
        let open = check_nesting("OPTIONAL {\n<s> :p ?p_1 .\n").unwrap_err();
        assert_eq!(open, ["1 OPTIONAL block(s) left open"]);
        let closed = check_nesting("<s> :p ?p_1 .\n}\n").unwrap_err();
        assert_eq!(closed, ["line 2: unmatched closing brace"]);
    }

    #[test]
    fn warns_about_required_fragment() {
        let fragments = QueryFragments {
            where_required: "<s> :p ?p_0 .\n".to_owned(),
            ..QueryFragments::default()
        };
        let report = validate("s.json", &fragments);
        assert_eq!(report.count(crate::Severity::Warning), 1);
        assert!(report.all_passed());
    }
}
