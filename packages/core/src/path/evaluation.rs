//! Walking a token chain over a document
//!
//! Traversal is depth-first pre-order: array indexes ascending, object
//! properties in insertion order. Results are recorded in exactly that
//! order. Every loop watches the evaluation status so a listener abort
//! unwinds cooperatively without being an error.

use serde_json::Value;

use crate::config::EvaluationOption;
use crate::context::{EvalResult, EvaluationContext, EvaluationStatus};
use crate::error::{ErrorKind, JsonPathError, JsonPathResult};
use crate::filter::{ExpressionNode, PredicateContext};
use crate::path::array_ops::SliceKind;
use crate::path::tokens::{PathToken, TokenKind};
use crate::path_ref::PathRef;
use crate::utils;

impl PathToken {
    /// Evaluate this token against `model`, feeding matches downstream
    ///
    /// `current_path` is the normalized path of `model`, `parent` the
    /// writable location of `model` itself, `upstream_definite` whether
    /// every token before this one was definite.
    pub fn evaluate(
        &self,
        current_path: &str,
        parent: &PathRef,
        model: &Value,
        ctx: &mut EvaluationContext<'_>,
        upstream_definite: bool,
    ) -> EvalResult {
        match self.kind() {
            TokenKind::Root { root_char } => {
                let path = root_char.to_string();
                match self.next() {
                    None => {
                        let op = if ctx.for_update() {
                            parent.clone()
                        } else {
                            PathRef::NoOp
                        };
                        Ok(ctx.add_result(path, op, model))
                    }
                    Some(next) => next.evaluate(&path, parent, model, ctx, true),
                }
            }
            TokenKind::Property { properties } => {
                self.evaluate_properties(properties, current_path, model, ctx, upstream_definite)
            }
            TokenKind::Wildcard => {
                self.evaluate_wildcard(current_path, model, ctx, upstream_definite)
            }
            TokenKind::ArrayIndex(operation) => {
                if !check_array_model(current_path, model, upstream_definite)? {
                    return Ok(EvaluationStatus::Done);
                }
                if operation.is_single_index_operation() {
                    self.handle_array_index(
                        operation.indexes()[0],
                        current_path,
                        model,
                        ctx,
                        upstream_definite,
                        true,
                    )
                } else {
                    for &index in operation.indexes() {
                        let status = self.handle_array_index(
                            index,
                            current_path,
                            model,
                            ctx,
                            upstream_definite,
                            false,
                        )?;
                        if status == EvaluationStatus::Aborted {
                            return Ok(status);
                        }
                    }
                    Ok(EvaluationStatus::Done)
                }
            }
            TokenKind::ArraySlice(operation) => {
                if !check_array_model(current_path, model, upstream_definite)? {
                    return Ok(EvaluationStatus::Done);
                }
                let len = model.as_array().map_or(0, Vec::len) as i64;
                let (from, to) = match operation.kind() {
                    SliceKind::SliceFrom => {
                        let mut from = operation.from().unwrap_or(0);
                        if from < 0 {
                            from += len;
                        }
                        (from.max(0), len)
                    }
                    SliceKind::SliceBetween => {
                        let mut from = operation.from().unwrap_or(0);
                        let mut to = operation.to().unwrap_or(len);
                        if from < 0 {
                            from += len;
                        }
                        if to < 0 {
                            to += len;
                        }
                        (from.max(0), to.min(len))
                    }
                    SliceKind::SliceTo => {
                        let mut to = operation.to().unwrap_or(len);
                        if to < 0 {
                            to += len;
                        }
                        (0, to.min(len))
                    }
                };
                tracing::debug!(
                    target: "jaypath::slice",
                    slice = %operation,
                    from,
                    to,
                    len,
                    "resolved slice bounds"
                );
                for index in from..to {
                    let status = self.handle_array_index(
                        index,
                        current_path,
                        model,
                        ctx,
                        upstream_definite,
                        false,
                    )?;
                    if status == EvaluationStatus::Aborted {
                        return Ok(status);
                    }
                }
                Ok(EvaluationStatus::Done)
            }
            TokenKind::Predicate(expressions) => self.evaluate_predicate(
                expressions,
                current_path,
                parent,
                model,
                ctx,
                upstream_definite,
            ),
            TokenKind::Scan => match self.next() {
                Some(target) => self.walk_scan(target, current_path, parent, model, ctx),
                // the compiler rejects a trailing '..'
                None => Ok(EvaluationStatus::Done),
            },
            TokenKind::Function { kind, parameters } => {
                let result = kind.invoke(model, parameters, ctx.root(), ctx.configuration())?;
                let eval_path = format!("{current_path}.{}()", kind.name());
                Ok(ctx.add_result(eval_path, PathRef::NoOp, &result))
            }
        }
    }

    fn evaluate_properties(
        &self,
        properties: &[String],
        current_path: &str,
        model: &Value,
        ctx: &mut EvaluationContext<'_>,
        upstream_definite: bool,
    ) -> EvalResult {
        let Value::Object(_) = model else {
            if !upstream_definite {
                return Ok(EvaluationStatus::Done);
            }
            return Err(JsonPathError::path_not_found(format!(
                "expected an object at {current_path}, found {}",
                type_name(model)
            )));
        };

        if let [property] = properties {
            return self.handle_single_property(
                property,
                current_path,
                model,
                ctx,
                upstream_definite,
                true,
            );
        }

        if self.is_leaf() {
            self.handle_multi_property_merge(properties, current_path, model, ctx)
        } else {
            // each name is visited as its own indefinite property step
            for property in properties {
                let status = self.handle_single_property(
                    property,
                    current_path,
                    model,
                    ctx,
                    upstream_definite,
                    false,
                )?;
                if status == EvaluationStatus::Aborted {
                    return Ok(status);
                }
            }
            Ok(EvaluationStatus::Done)
        }
    }

    fn handle_single_property(
        &self,
        property: &str,
        current_path: &str,
        model: &Value,
        ctx: &mut EvaluationContext<'_>,
        upstream_definite: bool,
        token_definite: bool,
    ) -> EvalResult {
        // escaped so the path round-trips through the canonical parser
        let eval_path = format!("{current_path}['{}']", utils::escape_property(property));
        let Some(map) = model.as_object() else {
            return Ok(EvaluationStatus::Done);
        };
        match map.get(property) {
            Some(value) => {
                let path_ref = if ctx.for_update() {
                    PathRef::object(current_path, property)
                } else {
                    PathRef::NoOp
                };
                match self.next() {
                    None => Ok(ctx.add_result(eval_path, path_ref, value)),
                    Some(next) => next.evaluate(
                        &eval_path,
                        &path_ref,
                        value,
                        ctx,
                        upstream_definite && token_definite,
                    ),
                }
            }
            None if self.is_leaf() => {
                if ctx.has_option(EvaluationOption::DefaultPathLeafToNull) {
                    let path_ref = if ctx.for_update() {
                        PathRef::object(current_path, property)
                    } else {
                        PathRef::NoOp
                    };
                    Ok(ctx.add_result(eval_path, path_ref, &Value::Null))
                } else if ctx.has_option(EvaluationOption::RequireProperties) {
                    Err(JsonPathError::path_not_found(format!(
                        "no results for path: {eval_path}"
                    )))
                } else {
                    Ok(EvaluationStatus::Done)
                }
            }
            None => {
                // missing intermediate step
                if (upstream_definite && token_definite)
                    || ctx.has_option(EvaluationOption::RequireProperties)
                {
                    Err(JsonPathError::path_not_found(format!(
                        "missing property in path {eval_path}"
                    )))
                } else {
                    Ok(EvaluationStatus::Done)
                }
            }
        }
    }

    /// Leaf access to several properties merges the present ones into a
    /// fresh object
    fn handle_multi_property_merge(
        &self,
        properties: &[String],
        current_path: &str,
        model: &Value,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult {
        let quoted: Vec<String> = properties
            .iter()
            .map(|p| format!("'{}'", utils::escape_property(p)))
            .collect();
        let eval_path = format!("{current_path}[{}]", quoted.join(", "));
        let Some(map) = model.as_object() else {
            return Ok(EvaluationStatus::Done);
        };
        let mut merged = serde_json::Map::new();
        for property in properties {
            match map.get(property) {
                Some(value) => {
                    merged.insert(property.clone(), value.clone());
                }
                None if ctx.has_option(EvaluationOption::DefaultPathLeafToNull) => {
                    merged.insert(property.clone(), Value::Null);
                }
                None if ctx.has_option(EvaluationOption::RequireProperties) => {
                    return Err(JsonPathError::path_not_found(format!(
                        "missing property in path {eval_path}"
                    )));
                }
                None => {}
            }
        }
        let path_ref = if ctx.for_update() {
            PathRef::object_multi(current_path, properties.to_vec())
        } else {
            PathRef::NoOp
        };
        Ok(ctx.add_result(eval_path, path_ref, &Value::Object(merged)))
    }

    fn evaluate_wildcard(
        &self,
        current_path: &str,
        model: &Value,
        ctx: &mut EvaluationContext<'_>,
        upstream_definite: bool,
    ) -> EvalResult {
        match model {
            Value::Object(map) => {
                for property in map.keys() {
                    let status = self.handle_single_property(
                        property,
                        current_path,
                        model,
                        ctx,
                        upstream_definite,
                        false,
                    )?;
                    if status == EvaluationStatus::Aborted {
                        return Ok(status);
                    }
                }
                Ok(EvaluationStatus::Done)
            }
            Value::Array(items) => {
                for index in 0..items.len() {
                    let result = self.handle_array_index(
                        index as i64,
                        current_path,
                        model,
                        ctx,
                        upstream_definite,
                        false,
                    );
                    match result {
                        Ok(EvaluationStatus::Aborted) => return Ok(EvaluationStatus::Aborted),
                        Ok(EvaluationStatus::Done) => {}
                        Err(err)
                            if err.kind() == ErrorKind::PathNotFound
                                && !ctx.has_option(EvaluationOption::RequireProperties) =>
                        {
                            // a branch that dead-ends under the wildcard is skipped
                        }
                        Err(err) => return Err(err),
                    }
                }
                Ok(EvaluationStatus::Done)
            }
            _ => Ok(EvaluationStatus::Done),
        }
    }

    fn handle_array_index(
        &self,
        index: i64,
        current_path: &str,
        model: &Value,
        ctx: &mut EvaluationContext<'_>,
        upstream_definite: bool,
        token_definite: bool,
    ) -> EvalResult {
        let Some(items) = model.as_array() else {
            return Ok(EvaluationStatus::Done);
        };
        let eval_path = format!("{current_path}[{index}]");
        let len = items.len() as i64;
        let effective = if index < 0 { len + index } else { index };
        if effective < 0 || effective >= len {
            // out of range indexes are silently skipped
            return Ok(EvaluationStatus::Done);
        }
        let effective = effective as usize;
        let value = &items[effective];
        let path_ref = if ctx.for_update() {
            PathRef::array(current_path, effective)
        } else {
            PathRef::NoOp
        };
        match self.next() {
            None => Ok(ctx.add_result(eval_path, path_ref, value)),
            Some(next) => next.evaluate(
                &eval_path,
                &path_ref,
                value,
                ctx,
                upstream_definite && token_definite,
            ),
        }
    }

    fn evaluate_predicate(
        &self,
        expressions: &[ExpressionNode],
        current_path: &str,
        parent: &PathRef,
        model: &Value,
        ctx: &mut EvaluationContext<'_>,
        upstream_definite: bool,
    ) -> EvalResult {
        match model {
            Value::Object(_) => {
                if !accept(expressions, model, ctx)? {
                    return Ok(EvaluationStatus::Done);
                }
                let op = if ctx.for_update() {
                    parent.clone()
                } else {
                    PathRef::NoOp
                };
                match self.next() {
                    None => Ok(ctx.add_result(current_path.to_string(), op, model)),
                    Some(next) => next.evaluate(current_path, &op, model, ctx, false),
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if accept(expressions, item, ctx)? {
                        let status = self.handle_array_index(
                            index as i64,
                            current_path,
                            model,
                            ctx,
                            upstream_definite,
                            false,
                        )?;
                        if status == EvaluationStatus::Aborted {
                            return Ok(status);
                        }
                    }
                }
                Ok(EvaluationStatus::Done)
            }
            _ => {
                if upstream_definite {
                    Err(JsonPathError::path_not_found(format!(
                        "filter cannot be applied to {} at {current_path}",
                        type_name(model)
                    )))
                } else {
                    Ok(EvaluationStatus::Done)
                }
            }
        }
    }

    /// Pre-order walk of the subtree, applying the scan's tail token to
    /// every node it can match
    fn walk_scan(
        &self,
        target: &PathToken,
        current_path: &str,
        parent: &PathRef,
        model: &Value,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult {
        match model {
            Value::Object(map) => {
                if scan_matches(target, model, ctx)? {
                    let status = target.evaluate(current_path, parent, model, ctx, false)?;
                    if status == EvaluationStatus::Aborted {
                        return Ok(status);
                    }
                }
                for (property, child) in map {
                    if !matches!(child, Value::Object(_) | Value::Array(_)) {
                        continue;
                    }
                    let eval_path =
                        format!("{current_path}['{}']", utils::escape_property(property));
                    let child_ref = if ctx.for_update() {
                        PathRef::object(current_path, property)
                    } else {
                        PathRef::NoOp
                    };
                    let status = self.walk_scan(target, &eval_path, &child_ref, child, ctx)?;
                    if status == EvaluationStatus::Aborted {
                        return Ok(status);
                    }
                }
                Ok(EvaluationStatus::Done)
            }
            Value::Array(items) => {
                if scan_matches(target, model, ctx)? {
                    let status = target.evaluate(current_path, parent, model, ctx, false)?;
                    if status == EvaluationStatus::Aborted {
                        return Ok(status);
                    }
                }
                for (index, child) in items.iter().enumerate() {
                    if !matches!(child, Value::Object(_) | Value::Array(_)) {
                        continue;
                    }
                    let eval_path = format!("{current_path}[{index}]");
                    let child_ref = if ctx.for_update() {
                        PathRef::array(current_path, index)
                    } else {
                        PathRef::NoOp
                    };
                    let status = self.walk_scan(target, &eval_path, &child_ref, child, ctx)?;
                    if status == EvaluationStatus::Aborted {
                        return Ok(status);
                    }
                }
                Ok(EvaluationStatus::Done)
            }
            _ => Ok(EvaluationStatus::Done),
        }
    }
}

/// Can the scan's tail token possibly match this node
fn scan_matches(
    target: &PathToken,
    model: &Value,
    ctx: &EvaluationContext<'_>,
) -> JsonPathResult<bool> {
    match target.kind() {
        TokenKind::Property { properties } => {
            let Value::Object(map) = model else {
                return Ok(false);
            };
            if !target.is_token_definite() {
                return Ok(true);
            }
            if target.is_leaf() && ctx.has_option(EvaluationOption::DefaultPathLeafToNull) {
                return Ok(true);
            }
            Ok(properties.iter().all(|p| map.contains_key(p)))
        }
        TokenKind::ArrayIndex(_) | TokenKind::ArraySlice(_) => Ok(model.is_array()),
        TokenKind::Wildcard | TokenKind::Function { .. } => Ok(true),
        TokenKind::Predicate(expressions) => accept(expressions, model, ctx),
        TokenKind::Root { .. } | TokenKind::Scan => Ok(false),
    }
}

/// Apply every filter of a predicate token to one candidate
fn accept(
    expressions: &[ExpressionNode],
    item: &Value,
    ctx: &EvaluationContext<'_>,
) -> JsonPathResult<bool> {
    let predicate_ctx = PredicateContext::new(
        item,
        ctx.root(),
        ctx.configuration(),
        ctx.root_path_cache(),
    );
    for expression in expressions {
        if !expression.apply(&predicate_ctx)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn check_array_model(
    current_path: &str,
    model: &Value,
    upstream_definite: bool,
) -> JsonPathResult<bool> {
    match model {
        Value::Array(_) => Ok(true),
        Value::Null => {
            if upstream_definite {
                Err(JsonPathError::path_not_found(format!(
                    "the path {current_path} is null"
                )))
            } else {
                Ok(false)
            }
        }
        _ => {
            if upstream_definite {
                Err(JsonPathError::path_not_found(format!(
                    "array operations cannot be applied to {} at {current_path}",
                    type_name(model)
                )))
            } else {
                Ok(false)
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
