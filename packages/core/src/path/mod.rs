//! Path compilation and evaluation
//!
//! A path string is compiled once into a linked chain of
//! [`PathToken`]s; the chain is then evaluated against any number of
//! JSON documents. Compilation decides definiteness up front so
//! evaluation never has to guess whether a single value or a
//! collection is being produced.

pub mod array_ops;
pub mod compiler;
pub mod evaluation;
pub mod tokens;

use std::fmt;

use serde_json::Value;

use crate::config::Configuration;
use crate::context::EvaluationContext;
use crate::error::JsonPathResult;
use crate::path_ref::PathRef;

pub use compiler::PathCompiler;
pub use tokens::{PathToken, TokenKind};

/// A compiled, reusable path
#[derive(Debug, Clone)]
pub struct CompiledPath {
    root: PathToken,
    raw: String,
    root_path: bool,
    definite: bool,
    function_path: bool,
}

impl CompiledPath {
    pub(crate) fn new(root: PathToken, raw: String) -> Self {
        let definite = root.is_path_definite();
        let mut last = &root;
        while let Some(next) = last.next() {
            last = next;
        }
        let function_path = matches!(last.kind(), TokenKind::Function { .. });
        let root_path = raw.starts_with('$');
        Self {
            root,
            raw,
            root_path,
            definite,
            function_path,
        }
    }

    /// The first token of the chain
    #[inline]
    #[must_use]
    pub fn root(&self) -> &PathToken {
        &self.root
    }

    /// The path text as given at compile time
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the path is anchored at the document root (`$`) rather
    /// than the current filter item (`@`)
    #[inline]
    #[must_use]
    pub fn is_root_path(&self) -> bool {
        self.root_path
    }

    /// Whether the path can match at most one value
    #[inline]
    #[must_use]
    pub fn is_definite(&self) -> bool {
        self.definite
    }

    /// Whether the path ends in a function call
    #[inline]
    #[must_use]
    pub fn is_function_path(&self) -> bool {
        self.function_path
    }

    /// Evaluate the path against `model`, with `root` as the `$`
    /// document for rooted sub-paths
    pub fn evaluate<'a>(
        &self,
        model: &Value,
        root: &'a Value,
        configuration: &'a Configuration,
    ) -> JsonPathResult<EvaluationContext<'a>> {
        self.evaluate_internal(model, root, configuration, false)
    }

    /// Evaluate while recording a [`PathRef`] per match so the caller
    /// can mutate the matched locations afterwards
    pub fn evaluate_for_update<'a>(
        &self,
        model: &Value,
        root: &'a Value,
        configuration: &'a Configuration,
    ) -> JsonPathResult<EvaluationContext<'a>> {
        self.evaluate_internal(model, root, configuration, true)
    }

    fn evaluate_internal<'a>(
        &self,
        model: &Value,
        root: &'a Value,
        configuration: &'a Configuration,
        for_update: bool,
    ) -> JsonPathResult<EvaluationContext<'a>> {
        let mut ctx = EvaluationContext::new(
            root,
            configuration,
            self.raw.clone(),
            self.definite,
            for_update,
        );
        let parent = if for_update {
            PathRef::Root
        } else {
            PathRef::NoOp
        };
        self.root.evaluate("", &parent, model, &mut ctx, true)?;
        Ok(ctx)
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn function_paths_are_flagged() {
        let path = PathCompiler::compile("$.nums.sum()").expect("compile");
        assert!(path.is_function_path());
        let path = PathCompiler::compile("$.nums[0]").expect("compile");
        assert!(!path.is_function_path());
    }

    #[test]
    fn display_preserves_the_raw_path() {
        let path = PathCompiler::compile("$['store'].book[*]").expect("compile");
        assert_eq!(path.to_string(), "$['store'].book[*]");
    }

    #[test]
    fn evaluate_reads_a_definite_value() {
        let doc = json!({"store": {"book": [{"title": "Moby Dick"}]}});
        let config = Configuration::new();
        let path = PathCompiler::compile("$.store.book[0].title").expect("compile");
        let ctx = path.evaluate(&doc, &doc, &config).expect("evaluate");
        assert_eq!(ctx.value().expect("value"), json!("Moby Dick"));
    }

    #[test]
    fn evaluate_collects_indefinite_matches() {
        let doc = json!({"a": {"price": 1}, "b": {"price": 2}});
        let config = Configuration::new();
        let path = PathCompiler::compile("$..price").expect("compile");
        let ctx = path.evaluate(&doc, &doc, &config).expect("evaluate");
        assert_eq!(ctx.value().expect("value"), json!([1, 2]));
    }
}
