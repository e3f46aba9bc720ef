//! Evaluation configuration, options and result listeners

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

/// Flags that alter evaluation and result shaping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationOption {
    /// Return `null` for definite leaf paths whose final property is
    /// missing, instead of treating the path as not found.
    ///
    /// With `{"a": {"b": 1}}` the path `$.a.x` normally fails; under this
    /// option it yields `null`.
    DefaultPathLeafToNull,
    /// Always wrap results in an array, even for definite paths that
    /// would otherwise yield a single value
    AlwaysReturnList,
    /// Return the normalized path of each match instead of its value
    AsPathList,
    /// Fail with a path-not-found error whenever a referenced property is
    /// missing, rather than silently skipping it
    ///
    /// Cannot be combined with [`EvaluationOption::DefaultPathLeafToNull`].
    RequireProperties,
}

/// Verdict returned by a listener after each match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Abort,
}

/// A single match produced during evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundResult {
    /// Zero-based order in which the match was found
    pub index: usize,
    /// Normalized path of the match, e.g. `$['store']['book'][0]`
    pub path: String,
    /// The matched value
    pub value: Value,
}

/// Observes matches as they are found; returning [`Continuation::Abort`]
/// stops the evaluation after the current match
pub trait EvaluationListener: Send + Sync {
    fn result_found(&self, found: &FoundResult) -> Continuation;
}

impl<F> EvaluationListener for F
where
    F: Fn(&FoundResult) -> Continuation + Send + Sync,
{
    fn result_found(&self, found: &FoundResult) -> Continuation {
        self(found)
    }
}

/// Options plus listeners, shared by every evaluation of a compiled path
#[derive(Clone, Default)]
pub struct Configuration {
    options: HashSet<EvaluationOption>,
    listeners: Vec<Arc<dyn EvaluationListener>>,
}

impl Configuration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style option toggle
    #[must_use]
    pub fn with_option(mut self, option: EvaluationOption) -> Self {
        self.options.insert(option);
        self
    }

    pub fn add_option(&mut self, option: EvaluationOption) {
        self.options.insert(option);
    }

    #[inline]
    #[must_use]
    pub fn has_option(&self, option: EvaluationOption) -> bool {
        self.options.contains(&option)
    }

    #[must_use]
    pub fn options(&self) -> &HashSet<EvaluationOption> {
        &self.options
    }

    /// A copy carrying the same options but no listeners, for nested
    /// evaluations that must not notify observers
    #[must_use]
    pub fn options_only(&self) -> Self {
        Self {
            options: self.options.clone(),
            listeners: Vec::new(),
        }
    }

    /// Builder-style listener registration; listeners fire in the order
    /// they were added
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn EvaluationListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn add_listener(&mut self, listener: Arc<dyn EvaluationListener>) {
        self.listeners.push(listener);
    }

    #[must_use]
    pub fn listeners(&self) -> &[Arc<dyn EvaluationListener>] {
        &self.listeners
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("options", &self.options)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_a_set() {
        let config = Configuration::new()
            .with_option(EvaluationOption::AlwaysReturnList)
            .with_option(EvaluationOption::AlwaysReturnList);
        assert_eq!(config.options().len(), 1);
        assert!(config.has_option(EvaluationOption::AlwaysReturnList));
        assert!(!config.has_option(EvaluationOption::AsPathList));
    }

    #[test]
    fn found_results_serialize() {
        let found = FoundResult {
            index: 0,
            path: "$['a']".to_string(),
            value: Value::from(1),
        };
        let json = serde_json::to_value(&found).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"index": 0, "path": "$['a']", "value": 1})
        );
    }

    #[test]
    fn closure_listeners_fire() {
        let listener = |found: &FoundResult| {
            if found.index == 0 {
                Continuation::Continue
            } else {
                Continuation::Abort
            }
        };
        let config = Configuration::new().with_listener(Arc::new(listener));
        let first = FoundResult {
            index: 0,
            path: "$['a']".to_string(),
            value: Value::Null,
        };
        let second = FoundResult { index: 1, ..first.clone() };
        assert_eq!(config.listeners()[0].result_found(&first), Continuation::Continue);
        assert_eq!(config.listeners()[0].result_found(&second), Continuation::Abort);
    }
}
