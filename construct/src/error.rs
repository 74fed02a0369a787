//! Error type for schema resolution.

/// Failure to locate a subschema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No subschema is reachable through the given path, even after `$ref`
    /// dereferencing and the `oneOf`/`allOf`/`anyOf`/`then`/`else` fallback.
    #[error("Could not resolve schema {path}")]
    Unresolvable {
        /// The pointer path or `$ref` string that failed.
        path: String,
    },

    /// A `$ref` chain leads back to a reference that is still being
    /// dereferenced, so it can never reach a concrete schema.
    #[error("Reference cycle through {reference}")]
    ReferenceCycle {
        /// The reference that was encountered twice.
        reference: String,
    },
}

impl ResolveError {
    /// Returns the path or reference the error is about.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            ResolveError::Unresolvable { path } => path,
            ResolveError::ReferenceCycle { reference } => reference,
        }
    }
}

/// Result alias for resolution and query building.
pub type Result<T> = std::result::Result<T, ResolveError>;
