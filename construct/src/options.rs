//! Options for CONSTRUCT query generation.

use serde::{Deserialize, Serialize};

/// Recursion ceiling used when none is configured.
pub const DEFAULT_MAX_RECURSION: usize = 42;

/// Settings for [`ConstructQueryBuilder`](crate::ConstructQueryBuilder).
///
/// Field names serialize in camelCase (`stopSymbols`, `excludedProperties`,
/// `maxRecursion`, `doNotFollowItemsRefs`) and every field is optional when
/// deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConstructOptions {
    /// Property names that stop expansion of any nested schema whose own
    /// `properties` contain one of them. The root schema is never stopped.
    pub stop_symbols: Vec<String>,
    /// Property names skipped everywhere: no pattern, no descent.
    pub excluded_properties: Vec<String>,
    /// Deepest nesting level still expanded.
    pub max_recursion: usize,
    /// Leave an array's `items` `$ref` unexpanded.
    pub do_not_follow_items_refs: bool,
}

impl Default for ConstructOptions {
    fn default() -> Self {
        Self {
            stop_symbols: Vec::new(),
            excluded_properties: Vec::new(),
            max_recursion: DEFAULT_MAX_RECURSION,
            do_not_follow_items_refs: false,
        }
    }
}

impl ConstructOptions {
    /// Replaces the stop symbols.
    #[must_use]
    pub fn with_stop_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the excluded property names.
    #[must_use]
    pub fn with_excluded_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the recursion ceiling.
    #[must_use]
    pub fn with_max_recursion(mut self, max_recursion: usize) -> Self {
        self.max_recursion = max_recursion;
        self
    }

    /// Sets whether `items` references are left unexpanded.
    #[must_use]
    pub fn with_do_not_follow_items_refs(mut self, skip: bool) -> Self {
        self.do_not_follow_items_refs = skip;
        self
    }

    /// Whether `property` is excluded.
    #[must_use]
    pub fn is_excluded(&self, property: &str) -> bool {
        self.excluded_properties.iter().any(|p| p == property)
    }
}
