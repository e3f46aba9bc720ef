//! Operand values of filter expressions
//!
//! Every operand of a relational expression is a [`ValueNode`]: either a
//! literal parsed out of the filter string or a sub-path that resolves
//! against the current item (`@`) or the root document (`$`) at apply
//! time. [`ValueNode::resolve`] collapses path nodes into literal nodes
//! so the relational evaluator only ever compares literals.

use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::error::JsonPathResult;
use crate::filter::PredicateContext;
use crate::path::CompiledPath;
use crate::utils;

/// A compiled `/pattern/flags` literal
#[derive(Debug, Clone)]
pub struct PatternNode {
    raw: String,
    regex: Regex,
}

impl PatternNode {
    #[must_use]
    pub fn new(raw: String, regex: Regex) -> Self {
        Self { raw, regex }
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// A sub-path operand such as `@.price` or `$.expensive`
#[derive(Debug, Clone)]
pub struct PathNode {
    path: CompiledPath,
    exists_check: bool,
    should_exist: bool,
}

impl PathNode {
    #[must_use]
    pub fn new(path: CompiledPath, exists_check: bool, should_exist: bool) -> Self {
        Self {
            path,
            exists_check,
            should_exist,
        }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &CompiledPath {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn is_exists_check(&self) -> bool {
        self.exists_check
    }

    #[inline]
    #[must_use]
    pub fn should_exist(&self) -> bool {
        self.should_exist
    }

    /// The same path as a pure existence check
    #[must_use]
    pub fn as_exists_check(&self, should_exist: bool) -> Self {
        Self {
            path: self.path.clone(),
            exists_check: true,
            should_exist,
        }
    }

    /// Resolve the path against the predicate context
    ///
    /// Existence checks resolve to the bare existence boolean; the
    /// expected polarity sits in the right hand operand the compiler
    /// pairs them with. Anything else resolves to the literal node for
    /// the matched value, or [`ValueNode::Undefined`] when the path does
    /// not reach a value.
    pub fn evaluate(&self, ctx: &PredicateContext<'_>) -> JsonPathResult<ValueNode> {
        if self.exists_check {
            let exists = ctx.path_exists(&self.path)?;
            return Ok(ValueNode::Boolean(exists));
        }
        match ctx.evaluate_path(&self.path)? {
            Some(value) => Ok(ValueNode::from_json_value(value)),
            None => Ok(ValueNode::Undefined),
        }
    }
}

/// A resolved or literal filter operand
#[derive(Debug, Clone)]
pub enum ValueNode {
    Null,
    /// A path that did not reach a value; never equal to anything except
    /// another undefined
    Undefined,
    Boolean(bool),
    /// Numeric literal keeping its source text for type safe comparison
    Number { raw: String, value: f64 },
    String(String),
    Pattern(PatternNode),
    /// An array or object literal, or a structured value a path resolved to
    Json(Value),
    Path(PathNode),
}

impl ValueNode {
    /// Wrap a document value in the matching node kind
    #[must_use]
    pub fn from_json_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => {
                let value = n.as_f64().unwrap_or(f64::NAN);
                Self::Number {
                    raw: n.to_string(),
                    value,
                }
            }
            Value::String(s) => Self::String(s),
            structured @ (Value::Array(_) | Value::Object(_)) => Self::Json(structured),
        }
    }

    /// Collapse a path node into a literal node; literals resolve to
    /// themselves
    pub fn resolve(&self, ctx: &PredicateContext<'_>) -> JsonPathResult<ValueNode> {
        match self {
            Self::Path(path_node) => path_node.evaluate(ctx),
            other => Ok(other.clone()),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_path_node(&self) -> Option<&PathNode> {
        match self {
            Self::Path(node) => Some(node),
            _ => None,
        }
    }

    /// Convert to a document value where the node has one; path, pattern
    /// and undefined nodes do not
    #[must_use]
    pub fn to_json_value(&self) -> Option<Value> {
        match self {
            Self::Null => Some(Value::Null),
            Self::Boolean(b) => Some(Value::Bool(*b)),
            Self::Number { raw, value } => {
                let number = raw
                    .parse::<i64>()
                    .ok()
                    .map(serde_json::Number::from)
                    .or_else(|| serde_json::Number::from_f64(*value));
                number.map(Value::Number)
            }
            Self::String(s) => Some(Value::String(s.clone())),
            Self::Json(value) => Some(value.clone()),
            Self::Undefined | Self::Pattern(_) | Self::Path(_) => None,
        }
    }

    /// Elements of an array node, for the membership operators
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Json(Value::Array(items)) => Some(items),
            _ => None,
        }
    }

    /// Kind label used by the `TYPE` operator
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Boolean(_) => "boolean",
            Self::Number { .. } => "number",
            Self::String(_) => "string",
            Self::Pattern(_) => "pattern",
            Self::Json(_) => "json",
            Self::Path(_) => "path",
        }
    }
}

impl PartialEq for ValueNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number { raw: a, .. }, Self::Number { raw: b, .. }) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.raw == b.raw,
            (Self::Json(a), Self::Json(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => {
                a.path.raw() == b.path.raw()
                    && a.exists_check == b.exists_check
                    && a.should_exist == b.should_exist
            }
            _ => false,
        }
    }
}

impl fmt::Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Undefined => f.write_str("undefined"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number { raw, .. } => f.write_str(raw),
            Self::String(s) => write!(f, "'{}'", utils::escape_property(s)),
            Self::Pattern(p) => f.write_str(&p.raw),
            Self::Json(value) => write!(f, "{value}"),
            Self::Path(node) => {
                if node.exists_check && !node.should_exist {
                    f.write_str("!")?;
                }
                f.write_str(node.path.raw())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_values_map_to_node_kinds() {
        assert_eq!(ValueNode::from_json_value(json!(null)), ValueNode::Null);
        assert_eq!(ValueNode::from_json_value(json!(true)), ValueNode::Boolean(true));
        assert_eq!(
            ValueNode::from_json_value(json!("a")),
            ValueNode::String("a".to_string())
        );
        match ValueNode::from_json_value(json!(1.5)) {
            ValueNode::Number { raw, value } => {
                assert_eq!(raw, "1.5");
                assert!((value - 1.5).abs() < f64::EPSILON);
            }
            other => panic!("expected number node, got {other:?}"),
        }
        assert_eq!(
            ValueNode::from_json_value(json!([1, 2])),
            ValueNode::Json(json!([1, 2]))
        );
    }

    #[test]
    fn integer_numbers_round_trip_without_decimal_point() {
        let node = ValueNode::from_json_value(json!(42));
        assert_eq!(node.to_json_value(), Some(json!(42)));
    }

    #[test]
    fn undefined_has_no_json_value() {
        assert_eq!(ValueNode::Undefined.to_json_value(), None);
        assert_eq!(ValueNode::Undefined, ValueNode::Undefined);
        assert_ne!(ValueNode::Undefined, ValueNode::Null);
    }
}
