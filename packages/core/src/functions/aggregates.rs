//! Numeric aggregation functions: `min()`, `max()`, `avg()`, `stddev()`
//! and `sum()`

use serde_json::Value;

use crate::error::{JsonPathError, JsonPathResult};
use crate::functions::parameters::BoundParameter;

/// Which reduction an aggregate performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Min,
    Max,
    Avg,
    StdDev,
    Sum,
}

impl Aggregate {
    fn name(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::StdDev => "stddev",
            Self::Sum => "sum",
        }
    }
}

/// Reduce the numeric elements of the current value plus any numeric
/// parameters to a single number
///
/// Non-numeric array elements are ignored; a non-numeric parameter is a
/// type mismatch, as is an invocation that ends up with no numbers at
/// all.
pub fn aggregate(
    kind: Aggregate,
    model: &Value,
    parameters: &mut [BoundParameter<'_>],
) -> JsonPathResult<Value> {
    let mut numbers: Vec<f64> = Vec::new();
    if let Value::Array(items) = model {
        numbers.extend(items.iter().filter_map(Value::as_f64));
    }
    for parameter in parameters.iter_mut() {
        let value = parameter.value()?;
        let number = value.as_f64().ok_or_else(|| {
            JsonPathError::type_mismatch(format!(
                "aggregation function {}() expects numeric parameters, got '{}'",
                kind.name(),
                parameter.raw()
            ))
        })?;
        numbers.push(number);
    }
    if numbers.is_empty() {
        return Err(JsonPathError::syntax(
            format!(
                "aggregation function {}() attempted to calculate a value using an empty input",
                kind.name()
            ),
            0,
        ));
    }

    let count = numbers.len() as f64;
    let sum: f64 = numbers.iter().sum();
    let result = match kind {
        Aggregate::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregate::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Aggregate::Avg => sum / count,
        Aggregate::Sum => sum,
        Aggregate::StdDev => {
            let mean = sum / count;
            let sum_sq: f64 = numbers.iter().map(|n| n * n).sum();
            (sum_sq / count - mean * mean).sqrt()
        }
    };

    serde_json::Number::from_f64(result)
        .map(Value::Number)
        .ok_or_else(|| {
            JsonPathError::type_mismatch(format!(
                "aggregation function {}() produced a non-finite result",
                kind.name()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::functions::parameters::{bind, Parameter};
    use serde_json::json;

    fn run(kind: Aggregate, model: &Value, params: &[Parameter]) -> JsonPathResult<Value> {
        let root = json!({});
        let configuration = Configuration::new();
        let mut bound = bind(params, &root, &configuration);
        aggregate(kind, model, &mut bound)
    }

    #[test]
    fn aggregates_over_numeric_array() {
        let model = json!([4, 1, 9]);
        assert_eq!(run(Aggregate::Min, &model, &[]).expect("min"), json!(1.0));
        assert_eq!(run(Aggregate::Max, &model, &[]).expect("max"), json!(9.0));
        assert_eq!(run(Aggregate::Sum, &model, &[]).expect("sum"), json!(14.0));
    }

    #[test]
    fn non_numeric_elements_are_ignored() {
        let model = json!([2, "x", 4, null]);
        assert_eq!(run(Aggregate::Avg, &model, &[]).expect("avg"), json!(3.0));
    }

    #[test]
    fn parameters_join_the_aggregation() {
        let model = json!([1, 2]);
        let params = vec![Parameter::json("3".to_string(), json!(3))];
        assert_eq!(run(Aggregate::Sum, &model, &params).expect("sum"), json!(6.0));
    }

    #[test]
    fn population_stddev() {
        let model = json!([2, 4, 4, 4, 5, 5, 7, 9]);
        let result = run(Aggregate::StdDev, &model, &[]).expect("stddev");
        let value = result.as_f64().expect("number");
        assert!((value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = run(Aggregate::Min, &json!([]), &[]).expect_err("empty input");
        assert_eq!(err.kind(), crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn non_numeric_parameter_is_a_type_mismatch() {
        let params = vec![Parameter::json("'x'".to_string(), json!("x"))];
        let err = run(Aggregate::Sum, &json!([1]), &params).expect_err("string parameter");
        assert_eq!(err.kind(), crate::error::ErrorKind::TypeMismatch);
    }
}
