//! Public query handle
//!
//! [`JsonPath`] wraps a compiled path. Reads shape their output from
//! the configuration and the compile-time definiteness of the path;
//! updates evaluate once to collect write-back handles and then apply
//! them highest-accessor-first so array removals never shift a pending
//! index.

use serde_json::Value;

use jaypath_core::error::{ErrorKind, JsonPathError, JsonPathResult};
use jaypath_core::path::{CompiledPath, PathCompiler};
use jaypath_core::path_ref::PathRef;
use jaypath_core::{Configuration, EvaluationOption};

/// A compiled JSONPath, reusable across documents and threads
#[derive(Debug, Clone)]
pub struct JsonPath {
    path: CompiledPath,
}

impl JsonPath {
    /// Compile a path string
    ///
    /// # Errors
    ///
    /// Returns a syntax error with the offending position when the
    /// path is malformed.
    pub fn compile(path: &str) -> JsonPathResult<Self> {
        Ok(Self {
            path: PathCompiler::compile(path)?,
        })
    }

    /// The path text as given at compile time
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.raw()
    }

    /// Whether this path can match at most one value
    #[inline]
    #[must_use]
    pub fn is_definite(&self) -> bool {
        self.path.is_definite()
    }

    /// Evaluate the path against `document` and shape the result
    ///
    /// A definite path yields its single value unless
    /// [`EvaluationOption::AlwaysReturnList`] is set; an indefinite
    /// path yields an array of matches, empty when nothing matched.
    /// With [`EvaluationOption::AsPathList`] the result is an array of
    /// normalized path strings instead of values.
    ///
    /// # Errors
    ///
    /// A definite path with no result is a path-not-found error.
    pub fn read(&self, document: &Value, configuration: &Configuration) -> JsonPathResult<Value> {
        let ctx = self.path.evaluate(document, document, configuration)?;
        let unwrap_single =
            self.path.is_definite() && !configuration.has_option(EvaluationOption::AlwaysReturnList);
        if unwrap_single && ctx.results().is_empty() {
            return Err(JsonPathError::path_not_found(format!(
                "no results for path: {}",
                self.path.raw()
            )));
        }
        if configuration.has_option(EvaluationOption::AsPathList) {
            return Ok(Value::Array(
                ctx.paths().into_iter().map(Value::String).collect(),
            ));
        }
        if unwrap_single {
            ctx.value()
        } else {
            Ok(Value::Array(ctx.values()))
        }
    }

    /// Parse `json` and evaluate the path against it
    ///
    /// # Errors
    ///
    /// Unparseable text is a type-mismatch error; evaluation errors
    /// are those of [`Self::read`].
    pub fn read_str(&self, json: &str, configuration: &Configuration) -> JsonPathResult<Value> {
        let document: Value = serde_json::from_str(json)
            .map_err(|err| JsonPathError::type_mismatch(format!("invalid JSON document: {err}")))?;
        self.read(&document, configuration)
    }

    /// Replace every matched value with `new_value`
    ///
    /// Returns the number of locations written. A definite path that
    /// matches nothing is a lenient no-op returning zero.
    ///
    /// # Errors
    ///
    /// Function-call paths cannot be updated.
    pub fn set(
        &self,
        document: &mut Value,
        new_value: &Value,
        configuration: &Configuration,
    ) -> JsonPathResult<usize> {
        let operations = self.update_operations(document, configuration)?;
        for operation in &operations {
            operation.set(document, new_value, configuration)?;
        }
        Ok(operations.len())
    }

    /// Replace every matched value with a function of its current value
    pub fn map<F>(
        &self,
        document: &mut Value,
        transform: F,
        configuration: &Configuration,
    ) -> JsonPathResult<usize>
    where
        F: Fn(&Value) -> Value,
    {
        let operations = self.update_operations(document, configuration)?;
        let adapter = |value: &Value, _configuration: &Configuration| transform(value);
        for operation in &operations {
            operation.convert(document, configuration, &adapter)?;
        }
        Ok(operations.len())
    }

    /// Remove every matched value from its container
    pub fn delete(
        &self,
        document: &mut Value,
        configuration: &Configuration,
    ) -> JsonPathResult<usize> {
        let operations = self.update_operations(document, configuration)?;
        for operation in &operations {
            operation.delete(document, configuration)?;
        }
        Ok(operations.len())
    }

    /// Append `value` to every matched array
    ///
    /// # Errors
    ///
    /// A non-array match is an invalid-mutation error.
    pub fn add(
        &self,
        document: &mut Value,
        value: &Value,
        configuration: &Configuration,
    ) -> JsonPathResult<usize> {
        let operations = self.update_operations(document, configuration)?;
        for operation in &operations {
            operation.add(document, value, configuration)?;
        }
        Ok(operations.len())
    }

    /// Insert or replace `key` in every matched object
    ///
    /// # Errors
    ///
    /// A non-object match is an invalid-mutation error.
    pub fn put(
        &self,
        document: &mut Value,
        key: &str,
        value: &Value,
        configuration: &Configuration,
    ) -> JsonPathResult<usize> {
        let operations = self.update_operations(document, configuration)?;
        for operation in &operations {
            operation.put(document, key, value, configuration)?;
        }
        Ok(operations.len())
    }

    /// Rename `old_key` to `new_key` in every matched object
    ///
    /// # Errors
    ///
    /// A non-object match is an invalid-mutation error; a missing old
    /// key is a path-not-found error.
    pub fn rename_key(
        &self,
        document: &mut Value,
        old_key: &str,
        new_key: &str,
        configuration: &Configuration,
    ) -> JsonPathResult<usize> {
        let operations = self.update_operations(document, configuration)?;
        for operation in &operations {
            operation.rename_key(document, old_key, new_key, configuration)?;
        }
        Ok(operations.len())
    }

    /// Evaluate for update and collect the sorted write-back handles
    fn update_operations(
        &self,
        document: &Value,
        configuration: &Configuration,
    ) -> JsonPathResult<Vec<PathRef>> {
        if self.path.is_function_path() {
            return Err(JsonPathError::invalid_mutation(
                "cannot update the result of a function call",
            ));
        }
        let mut ctx = match self.path.evaluate_for_update(document, document, configuration) {
            Ok(ctx) => ctx,
            Err(err)
                if err.kind() == ErrorKind::PathNotFound
                    && !configuration.has_option(EvaluationOption::RequireProperties) =>
            {
                tracing::debug!(
                    target: "jaypath::update",
                    path = %self.path.raw(),
                    "update target matched nothing"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        let operations = ctx.take_update_operations();
        tracing::debug!(
            target: "jaypath::update",
            path = %self.path.raw(),
            targets = operations.len(),
            "collected update targets"
        );
        Ok(operations)
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path.raw())
    }
}
