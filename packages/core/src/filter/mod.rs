//! Predicate sub-language used by `[?(...)]` accessors
//!
//! A filter is compiled once into an [`ExpressionNode`] tree and then
//! applied to each candidate item. Leaves are relational expressions
//! over [`ValueNode`] operands; inner nodes combine verdicts with
//! `&&`, `||` and `!`.

pub mod compiler;
pub mod evaluator;
pub mod operators;
pub mod value_node;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::config::{Configuration, EvaluationOption};
use crate::error::{ErrorKind, JsonPathResult};
use crate::path::CompiledPath;

pub use compiler::FilterCompiler;
pub use operators::{LogicalOperator, RelationalOperator};
pub use value_node::{PathNode, PatternNode, ValueNode};

/// Everything a predicate needs to judge one candidate item
///
/// `item` is what `@` resolves against, `root` is what `$` resolves
/// against. Values of rooted sub-paths are cached across items because
/// they cannot change during one evaluation.
pub struct PredicateContext<'a> {
    item: &'a Value,
    root: &'a Value,
    configuration: &'a Configuration,
    root_path_cache: &'a RefCell<HashMap<String, Value>>,
}

impl<'a> PredicateContext<'a> {
    #[must_use]
    pub fn new(
        item: &'a Value,
        root: &'a Value,
        configuration: &'a Configuration,
        root_path_cache: &'a RefCell<HashMap<String, Value>>,
    ) -> Self {
        Self {
            item,
            root,
            configuration,
            root_path_cache,
        }
    }

    #[inline]
    #[must_use]
    pub fn item(&self) -> &Value {
        self.item
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        self.configuration
    }

    /// Resolve a sub-path to its value, `None` when it reaches nothing
    ///
    /// Listeners never observe these nested evaluations. Rooted paths are
    /// memoized in the shared cache.
    pub fn evaluate_path(&self, path: &CompiledPath) -> JsonPathResult<Option<Value>> {
        let sub_configuration = self.configuration.options_only();
        if path.is_root_path() {
            if let Some(cached) = self.root_path_cache.borrow().get(path.raw()) {
                return Ok(Some(cached.clone()));
            }
            match path
                .evaluate(self.root, self.root, &sub_configuration)
                .and_then(|ctx| ctx.value())
            {
                Ok(value) => {
                    self.root_path_cache
                        .borrow_mut()
                        .insert(path.raw().to_string(), value.clone());
                    Ok(Some(value))
                }
                Err(err) if err.kind() == ErrorKind::PathNotFound => Ok(None),
                Err(err) => Err(err),
            }
        } else {
            match path
                .evaluate(self.item, self.root, &sub_configuration)
                .and_then(|ctx| ctx.value())
            {
                Ok(value) => Ok(Some(value)),
                Err(err) if err.kind() == ErrorKind::PathNotFound => Ok(None),
                Err(err) => Err(err),
            }
        }
    }

    /// Existence check for a sub-path
    ///
    /// Runs with required properties so a missing leaf registers as
    /// absent instead of being silently skipped.
    pub fn path_exists(&self, path: &CompiledPath) -> JsonPathResult<bool> {
        let configuration =
            Configuration::new().with_option(EvaluationOption::RequireProperties);
        let target = if path.is_root_path() { self.root } else { self.item };
        match path
            .evaluate(target, self.root, &configuration)
            .and_then(|ctx| ctx.value())
        {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::PathNotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// A leaf comparison such as `@.price < 10`
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalExpressionNode {
    left: ValueNode,
    operator: RelationalOperator,
    right: ValueNode,
}

impl RelationalExpressionNode {
    #[must_use]
    pub fn new(left: ValueNode, operator: RelationalOperator, right: ValueNode) -> Self {
        Self {
            left,
            operator,
            right,
        }
    }

    pub fn apply(&self, ctx: &PredicateContext<'_>) -> JsonPathResult<bool> {
        let left = self.left.resolve(ctx)?;
        let right = self.right.resolve(ctx)?;
        let verdict = evaluator::evaluate(self.operator, &left, &right)?;
        tracing::debug!(
            target: "jaypath::filter",
            expression = %self,
            left = %left,
            right = %right,
            verdict,
            "applied relational expression"
        );
        Ok(verdict)
    }
}

impl fmt::Display for RelationalExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

/// An `&&`, `||` or `!` combination of sub-expressions
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpressionNode {
    operator: LogicalOperator,
    chain: Vec<ExpressionNode>,
}

impl LogicalExpressionNode {
    #[must_use]
    pub fn and(chain: Vec<ExpressionNode>) -> Self {
        Self {
            operator: LogicalOperator::And,
            chain,
        }
    }

    #[must_use]
    pub fn or(chain: Vec<ExpressionNode>) -> Self {
        Self {
            operator: LogicalOperator::Or,
            chain,
        }
    }

    #[must_use]
    pub fn not(operand: ExpressionNode) -> Self {
        Self {
            operator: LogicalOperator::Not,
            chain: vec![operand],
        }
    }

    /// Short-circuiting application over the operand chain
    pub fn apply(&self, ctx: &PredicateContext<'_>) -> JsonPathResult<bool> {
        match self.operator {
            LogicalOperator::And => {
                for operand in &self.chain {
                    if !operand.apply(ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            LogicalOperator::Or => {
                for operand in &self.chain {
                    if operand.apply(ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            LogicalOperator::Not => match self.chain.first() {
                Some(operand) => Ok(!operand.apply(ctx)?),
                None => Ok(false),
            },
        }
    }
}

impl fmt::Display for LogicalExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            LogicalOperator::Not => match self.chain.first() {
                Some(operand) => write!(f, "!({operand})"),
                None => f.write_str("!()"),
            },
            _ => {
                let parts: Vec<String> = self.chain.iter().map(|op| op.to_string()).collect();
                write!(f, "({})", parts.join(&format!(" {} ", self.operator)))
            }
        }
    }
}

/// A compiled filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Relational(RelationalExpressionNode),
    Logical(LogicalExpressionNode),
}

impl ExpressionNode {
    /// Judge one candidate item
    pub fn apply(&self, ctx: &PredicateContext<'_>) -> JsonPathResult<bool> {
        match self {
            Self::Relational(node) => node.apply(ctx),
            Self::Logical(node) => node.apply(ctx),
        }
    }
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relational(node) => node.fmt(f),
            Self::Logical(node) => node.fmt(f),
        }
    }
}
