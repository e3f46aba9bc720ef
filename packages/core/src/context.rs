//! State carried through one evaluation of a compiled path

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use crate::config::{Configuration, Continuation, EvaluationOption, FoundResult};
use crate::error::{JsonPathError, JsonPathResult};
use crate::path_ref::PathRef;

/// How an evaluation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStatus {
    /// The whole token chain was walked
    Done,
    /// A listener stopped the evaluation early
    Aborted,
}

/// Result type threaded through token evaluation
pub type EvalResult = JsonPathResult<EvaluationStatus>;

/// Collected matches, pending updates and shared caches of one
/// evaluation run
pub struct EvaluationContext<'a> {
    root: &'a Value,
    configuration: &'a Configuration,
    path: String,
    definite: bool,
    for_update: bool,
    results: Vec<FoundResult>,
    update_operations: Vec<PathRef>,
    /// Values of rooted sub-paths inside predicates, keyed by path text
    root_path_cache: RefCell<HashMap<String, Value>>,
}

impl<'a> EvaluationContext<'a> {
    #[must_use]
    pub fn new(
        root: &'a Value,
        configuration: &'a Configuration,
        path: String,
        definite: bool,
        for_update: bool,
    ) -> Self {
        Self {
            root,
            configuration,
            path,
            definite,
            for_update,
            results: Vec::new(),
            update_operations: Vec::new(),
            root_path_cache: RefCell::new(HashMap::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &'a Value {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        self.configuration
    }

    #[inline]
    #[must_use]
    pub fn has_option(&self, option: EvaluationOption) -> bool {
        self.configuration.has_option(option)
    }

    #[inline]
    #[must_use]
    pub fn for_update(&self) -> bool {
        self.for_update
    }

    #[must_use]
    pub fn root_path_cache(&self) -> &RefCell<HashMap<String, Value>> {
        &self.root_path_cache
    }

    /// Record a match and notify listeners in registration order
    ///
    /// The first listener answering [`Continuation::Abort`] stops the
    /// evaluation after this match; the match itself is kept.
    pub fn add_result(&mut self, path: String, path_ref: PathRef, value: &Value) -> EvaluationStatus {
        if self.for_update {
            self.update_operations.push(path_ref);
        }
        let found = FoundResult {
            index: self.results.len(),
            path,
            value: value.clone(),
        };
        let mut status = EvaluationStatus::Done;
        for listener in self.configuration.listeners() {
            if listener.result_found(&found) == Continuation::Abort {
                status = EvaluationStatus::Aborted;
                break;
            }
        }
        self.results.push(found);
        status
    }

    #[must_use]
    pub fn results(&self) -> &[FoundResult] {
        &self.results
    }

    /// Matched values in the order they were found
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.results.iter().map(|found| found.value.clone()).collect()
    }

    /// Matched normalized paths in the order they were found
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.results.iter().map(|found| found.path.clone()).collect()
    }

    /// The evaluation outcome as one value
    ///
    /// A definite path yields its single match and fails with
    /// path-not-found when there is none; an indefinite path yields the
    /// array of all matches, possibly empty.
    pub fn value(&self) -> JsonPathResult<Value> {
        if self.definite {
            match self.results.first() {
                Some(found) => Ok(found.value.clone()),
                None => Err(JsonPathError::path_not_found(format!(
                    "no results for path: {}",
                    self.path
                ))),
            }
        } else {
            Ok(Value::Array(self.values()))
        }
    }

    /// Hand over the pending update operations, deepest location first
    #[must_use]
    pub fn take_update_operations(&mut self) -> Vec<PathRef> {
        let mut operations = std::mem::take(&mut self.update_operations);
        crate::path_ref::sort_for_update(&mut operations);
        operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn definite_context_yields_single_value() {
        let root = json!({"a": 1});
        let configuration = Configuration::new();
        let mut ctx =
            EvaluationContext::new(&root, &configuration, "$['a']".to_string(), true, false);
        ctx.add_result("$['a']".to_string(), PathRef::NoOp, &json!(1));
        assert_eq!(ctx.value().expect("value"), json!(1));
    }

    #[test]
    fn definite_context_without_results_is_not_found() {
        let root = json!({});
        let configuration = Configuration::new();
        let ctx = EvaluationContext::new(&root, &configuration, "$['a']".to_string(), true, false);
        let err = ctx.value().expect_err("no results");
        assert_eq!(err.kind(), crate::error::ErrorKind::PathNotFound);
    }

    #[test]
    fn indefinite_context_yields_all_values() {
        let root = json!({});
        let configuration = Configuration::new();
        let mut ctx =
            EvaluationContext::new(&root, &configuration, "$..a".to_string(), false, false);
        ctx.add_result("$['x']['a']".to_string(), PathRef::NoOp, &json!(1));
        ctx.add_result("$['y']['a']".to_string(), PathRef::NoOp, &json!(2));
        assert_eq!(ctx.value().expect("value"), json!([1, 2]));
        assert_eq!(ctx.paths(), ["$['x']['a']", "$['y']['a']"]);
    }

    #[test]
    fn aborting_listener_stops_after_current_match() {
        let root = json!({});
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let configuration = Configuration::new().with_listener(Arc::new(
            move |found: &FoundResult| {
                counter.fetch_add(1, Ordering::SeqCst);
                if found.index == 0 {
                    Continuation::Abort
                } else {
                    Continuation::Continue
                }
            },
        ));
        let mut ctx =
            EvaluationContext::new(&root, &configuration, "$..a".to_string(), false, false);
        let status = ctx.add_result("$['a']".to_string(), PathRef::NoOp, &json!(1));
        assert_eq!(status, EvaluationStatus::Aborted);
        assert_eq!(ctx.results().len(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn update_operations_come_back_sorted() {
        let root = json!({});
        let configuration = Configuration::new();
        let mut ctx =
            EvaluationContext::new(&root, &configuration, "$.a[*]".to_string(), false, true);
        ctx.add_result("$['a'][0]".to_string(), PathRef::array("$['a']", 0), &json!(1));
        ctx.add_result("$['a'][2]".to_string(), PathRef::array("$['a']", 2), &json!(3));
        let operations = ctx.take_update_operations();
        assert_eq!(
            operations,
            vec![PathRef::array("$['a']", 2), PathRef::array("$['a']", 0)]
        );
    }
}
