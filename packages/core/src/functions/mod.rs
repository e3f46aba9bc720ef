//! Path functions, the `.name(...)` tail of a path
//!
//! The function set is closed: a name is resolved to a
//! [`PathFunctionKind`] while the path compiles, so an unknown function
//! is a syntax error long before any document is evaluated.

pub mod aggregates;
pub mod parameters;
pub mod structural;
pub mod text;

use serde_json::Value;

use crate::config::Configuration;
use crate::error::{JsonPathError, JsonPathResult};

pub use aggregates::Aggregate;
pub use parameters::{BoundParameter, Parameter, ParameterKind};

/// Every function a path may end with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFunctionKind {
    Min,
    Max,
    Avg,
    StdDev,
    Sum,
    Length,
    Keys,
    Concat,
    Append,
}

impl PathFunctionKind {
    /// Resolve a function name; unknown names are syntax errors
    pub fn parse(name: &str, position: usize) -> JsonPathResult<Self> {
        let kind = match name {
            "min" => Self::Min,
            "max" => Self::Max,
            "avg" => Self::Avg,
            "stddev" => Self::StdDev,
            "sum" => Self::Sum,
            "length" | "size" => Self::Length,
            "keys" => Self::Keys,
            "concat" => Self::Concat,
            "append" => Self::Append,
            _ => {
                return Err(JsonPathError::syntax(
                    format!("function '{name}' is not defined"),
                    position,
                ));
            }
        };
        Ok(kind)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::StdDev => "stddev",
            Self::Sum => "sum",
            Self::Length => "length",
            Self::Keys => "keys",
            Self::Concat => "concat",
            Self::Append => "append",
        }
    }

    /// Apply the function to the current value
    ///
    /// Path parameters are bound to `root` and evaluated lazily, once,
    /// when the function first reads them.
    pub fn invoke(
        &self,
        model: &Value,
        parameters: &[Parameter],
        root: &Value,
        configuration: &Configuration,
    ) -> JsonPathResult<Value> {
        let mut bound = parameters::bind(parameters, root, configuration);
        match self {
            Self::Min => aggregates::aggregate(Aggregate::Min, model, &mut bound),
            Self::Max => aggregates::aggregate(Aggregate::Max, model, &mut bound),
            Self::Avg => aggregates::aggregate(Aggregate::Avg, model, &mut bound),
            Self::StdDev => aggregates::aggregate(Aggregate::StdDev, model, &mut bound),
            Self::Sum => aggregates::aggregate(Aggregate::Sum, model, &mut bound),
            Self::Length => Ok(structural::length(model)),
            Self::Keys => Ok(structural::keys(model)),
            Self::Concat => text::concat(model, &mut bound),
            Self::Append => structural::append(model, &mut bound),
        }
    }
}

impl std::fmt::Display for PathFunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert_eq!(PathFunctionKind::parse("min", 0).expect("min"), PathFunctionKind::Min);
        assert_eq!(
            PathFunctionKind::parse("stddev", 0).expect("stddev"),
            PathFunctionKind::StdDev
        );
        // alias kept for callers used to the collection idiom
        assert_eq!(
            PathFunctionKind::parse("size", 0).expect("size"),
            PathFunctionKind::Length
        );
    }

    #[test]
    fn unknown_names_are_syntax_errors() {
        let err = PathFunctionKind::parse("median", 7).expect_err("unknown function");
        assert_eq!(err.kind(), crate::error::ErrorKind::Syntax);
    }
}
