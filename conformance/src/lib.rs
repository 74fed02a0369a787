//! Conformance checks for JSON Schema to SPARQL CONSTRUCT translation.
//!
//! Each schema document is translated with
//! [`build_construct_query`](schema_construct::build_construct_query) and the
//! document and its query are then checked by a set of validators.
//!
//! # Checks
//!
//! | Validator | Checks |
//! |-----------|--------|
//! | `schema/shape` | root is an object with something to expand |
//! | `schema/references` | every `$ref` resolves against the root |
//! | `query/build` | the query builds without resolution errors |
//! | `query/triples` | CONSTRUCT lines are `subject predicate ?object .` |
//! | `query/optionals` | `OPTIONAL` blocks in WHERE nest and close |
//! | `query/variables` | variables are bound and uniquely numbered |
//!
//! # Entry Point
//!
//! ```no_run
//! use schema_construct::ConstructOptions;
//! use schema_construct_conformance::{run_all, SuiteConfig};
//! use std::path::PathBuf;
//!
//! let config = SuiteConfig {
//!     schemas: PathBuf::from("schemas"),
//!     subject: "http://example.com/subject".to_owned(),
//!     options: ConstructOptions::default(),
//! };
//! let report = run_all(&config).expect("Failed to run conformance");
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod validators;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use schema_construct::{build_construct_query, ConstructOptions, Schema};
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

pub use report::{ConformanceReport, Severity, TestResult};

/// What the suite runs over.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// A schema file, or a directory searched recursively for `*.json` files.
    pub schemas: PathBuf,
    /// Subject URI the queries are built for.
    pub subject: String,
    /// Options passed to the query builder.
    pub options: ConstructOptions,
}

/// Runs every validator against one schema document.
///
/// Query validators only run when the query builds.
pub fn check_schema(
    name: &str,
    document: &Schema,
    subject: &str,
    options: &ConstructOptions,
) -> ConformanceReport {
    let mut report = ConformanceReport::new();

    report.extend(validators::schema::shape::validate(name, document));
    report.extend(validators::schema::references::validate(name, document));

    match build_construct_query(subject, document, options) {
        Ok(fragments) => {
            report.push(TestResult::pass("query/build", name, "query built"));
            report.extend(validators::query::triples::validate(name, &fragments));
            report.extend(validators::query::optionals::validate(name, &fragments));
            report.extend(validators::query::variables::validate(name, &fragments));
        }
        Err(err) => report.push(TestResult::fail("query/build", name, err.to_string())),
    }

    report
}

/// Finds the schema files under `path`, sorted by path.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn schema_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "json")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Runs the suite over every schema file of `config.schemas`.
///
/// # Errors
///
/// Returns an error if a schema file cannot be read or is not valid JSON.
pub fn run_all(config: &SuiteConfig) -> Result<ConformanceReport> {
    let mut report = ConformanceReport::new();

    let files = schema_files(&config.schemas)?;
    if files.is_empty() {
        report.push(TestResult::warn(
            "suite",
            config.schemas.display().to_string(),
            "no *.json schema files found",
        ));
        return Ok(report);
    }

    for file in files {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let document: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {} as JSON", file.display()))?;

        let name = file
            .strip_prefix(&config.schemas)
            .ok()
            .filter(|relative| !relative.as_os_str().is_empty())
            .unwrap_or(file.as_path())
            .display()
            .to_string();
        debug!(schema = %name, "checking schema");
        report.extend(check_schema(&name, &document, &config.subject, &config.options));
    }

    Ok(report)
}
