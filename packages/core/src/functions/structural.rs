//! Structure oriented functions: `length()`, `keys()` and `append()`

use serde_json::Value;

use crate::error::JsonPathResult;
use crate::functions::parameters::BoundParameter;

/// Element count of an array, entry count of an object or character
/// count of a string; anything else has no length and yields null
#[must_use]
pub fn length(model: &Value) -> Value {
    match model {
        Value::Array(items) => Value::from(items.len()),
        Value::Object(map) => Value::from(map.len()),
        Value::String(s) => Value::from(s.chars().count()),
        _ => Value::Null,
    }
}

/// Property names of an object in document order; null for anything else
#[must_use]
pub fn keys(model: &Value) -> Value {
    match model {
        Value::Object(map) => Value::Array(map.keys().map(|k| Value::String(k.clone())).collect()),
        _ => Value::Null,
    }
}

/// A copy of the current array with every parameter value appended
///
/// A non-array current value is returned unchanged.
pub fn append(model: &Value, parameters: &mut [BoundParameter<'_>]) -> JsonPathResult<Value> {
    let Value::Array(items) = model else {
        return Ok(model.clone());
    };
    let mut extended = items.clone();
    for parameter in parameters.iter_mut() {
        extended.push(parameter.value()?);
    }
    Ok(Value::Array(extended))
}
