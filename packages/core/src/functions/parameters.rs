//! Function parameters with late bound path arguments

use serde_json::Value;

use crate::config::Configuration;
use crate::error::JsonPathResult;
use crate::path::CompiledPath;

/// How a parameter obtains its value
#[derive(Debug, Clone)]
pub enum ParameterKind {
    /// A json literal argument, parsed when the path was compiled
    Json(Value),
    /// A path argument, evaluated against the root document when the
    /// function is invoked
    Path(CompiledPath),
}

/// One argument of a path function call
#[derive(Debug, Clone)]
pub struct Parameter {
    raw: String,
    kind: ParameterKind,
}

impl Parameter {
    #[must_use]
    pub fn json(raw: String, value: Value) -> Self {
        Self {
            raw,
            kind: ParameterKind::Json(value),
        }
    }

    #[must_use]
    pub fn path(raw: String, path: CompiledPath) -> Self {
        Self {
            raw,
            kind: ParameterKind::Path(path),
        }
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }
}

/// A parameter bound to the document of one function invocation
///
/// Path parameters evaluate lazily on first access and the value is
/// memoized, so a parameter a function never reads never costs an
/// evaluation.
pub struct BoundParameter<'a> {
    parameter: &'a Parameter,
    root: &'a Value,
    configuration: &'a Configuration,
    cached: Option<Value>,
}

impl<'a> BoundParameter<'a> {
    #[must_use]
    pub fn new(parameter: &'a Parameter, root: &'a Value, configuration: &'a Configuration) -> Self {
        Self {
            parameter,
            root,
            configuration,
            cached: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        self.parameter.raw()
    }

    /// The parameter value, evaluating a path argument on first access
    pub fn value(&mut self) -> JsonPathResult<Value> {
        if let Some(cached) = &self.cached {
            return Ok(cached.clone());
        }
        let value = match self.parameter.kind() {
            ParameterKind::Json(value) => value.clone(),
            ParameterKind::Path(path) => path
                .evaluate(self.root, self.root, &self.configuration.options_only())?
                .value()?,
        };
        self.cached = Some(value.clone());
        Ok(value)
    }
}

/// Bind every parameter of an invocation to the current document
#[must_use]
pub fn bind<'a>(
    parameters: &'a [Parameter],
    root: &'a Value,
    configuration: &'a Configuration,
) -> Vec<BoundParameter<'a>> {
    parameters
        .iter()
        .map(|parameter| BoundParameter::new(parameter, root, configuration))
        .collect()
}
