//! Text functions: `concat()`

use serde_json::Value;

use crate::error::{JsonPathError, JsonPathResult};
use crate::functions::parameters::BoundParameter;

/// Concatenate the string elements of the current value with every
/// string parameter
///
/// An array contributes its string elements only; a string current value
/// contributes itself; other current values contribute nothing. Every
/// parameter must resolve to a string.
pub fn concat(model: &Value, parameters: &mut [BoundParameter<'_>]) -> JsonPathResult<Value> {
    let mut result = String::new();
    match model {
        Value::Array(items) => {
            for item in items {
                if let Value::String(s) = item {
                    result.push_str(s);
                }
            }
        }
        Value::String(s) => result.push_str(s),
        _ => {}
    }
    for parameter in parameters.iter_mut() {
        match parameter.value()? {
            Value::String(s) => result.push_str(&s),
            other => {
                return Err(JsonPathError::type_mismatch(format!(
                    "concat() expects string parameters, got '{other}'"
                )));
            }
        }
    }
    Ok(Value::String(result))
}
