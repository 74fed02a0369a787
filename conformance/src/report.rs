//! Check results, severity levels, and report aggregation.

use std::fmt;

/// Severity level of a check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The check passed.
    Pass,
    /// Something looks off but the query is still usable.
    Warning,
    /// The check failed.
    Failure,
}

impl Severity {
    /// Short label used in printed reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Severity::Pass => "PASS",
            Severity::Warning => "WARN",
            Severity::Failure => "FAIL",
        }
    }
}

/// A single check result.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Identifier of the validator, e.g. `query/triples`.
    pub validator: String,
    /// Name of the schema document the result is about.
    pub schema: String,
    /// Human-readable outcome.
    pub message: String,
    /// Severity of the result.
    pub severity: Severity,
    /// Offending lines, references, or variables.
    pub details: Vec<String>,
}

impl TestResult {
    fn new(
        validator: impl Into<String>,
        schema: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            validator: validator.into(),
            schema: schema.into(),
            message: message.into(),
            severity,
            details: Vec::new(),
        }
    }

    /// Creates a passing result.
    pub fn pass(
        validator: impl Into<String>,
        schema: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(validator, schema, message, Severity::Pass)
    }

    /// Creates a failure result.
    pub fn fail(
        validator: impl Into<String>,
        schema: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(validator, schema, message, Severity::Failure)
    }

    /// Creates a failure result listing the offending items.
    pub fn fail_with_details(
        validator: impl Into<String>,
        schema: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            details,
            ..Self::new(validator, schema, message, Severity::Failure)
        }
    }

    /// Creates a warning result.
    pub fn warn(
        validator: impl Into<String>,
        schema: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(validator, schema, message, Severity::Warning)
    }

    /// Returns true if this result represents a failure.
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity.label(),
            self.validator,
            self.schema,
            self.message
        )?;
        for detail in &self.details {
            write!(f, "\n       {detail}")?;
        }
        Ok(())
    }
}

/// Aggregated results of all validators.
#[derive(Debug, Default)]
pub struct ConformanceReport {
    /// Individual results, in the order the validators produced them.
    pub results: Vec<TestResult>,
}

impl ConformanceReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result.
    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Appends every result of `other`.
    pub fn extend(&mut self, other: ConformanceReport) {
        self.results.extend(other.results);
    }

    /// Number of results with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.results.iter().filter(|r| r.severity == severity).count()
    }

    /// Returns the count of failed checks.
    pub fn failure_count(&self) -> usize {
        self.count(Severity::Failure)
    }

    /// Returns true if no check failed.
    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }
}
