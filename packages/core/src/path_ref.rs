//! Deferred mutation handles produced by an update evaluation
//!
//! Reading and mutating cannot share the document borrow, so an update
//! evaluation records one [`PathRef`] per match instead of touching the
//! document. Each ref names its parent container by canonical path and
//! re-navigates a mutable borrow when the operation is applied. Refs are
//! applied in descending document order so array removals never shift an
//! index that is still pending.

use std::cmp::Ordering;

use serde_json::Value;

use crate::config::{Configuration, EvaluationOption};
use crate::error::{JsonPathError, JsonPathResult};
use crate::utils;

/// One navigation step of a canonical path
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    Index(usize),
}

/// A writable location in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRef {
    /// A match with no writable location, e.g. a function result
    NoOp,
    /// The document root itself
    Root,
    /// One property of the object at `parent`
    Object { parent: String, property: String },
    /// Several properties of the object at `parent`, from a
    /// multi-property leaf match
    ObjectMulti {
        parent: String,
        properties: Vec<String>,
    },
    /// One element of the array at `parent`
    Array { parent: String, index: usize },
}

impl PathRef {
    #[must_use]
    pub fn object(parent: impl Into<String>, property: impl Into<String>) -> Self {
        Self::Object {
            parent: parent.into(),
            property: property.into(),
        }
    }

    #[must_use]
    pub fn object_multi(parent: impl Into<String>, properties: Vec<String>) -> Self {
        Self::ObjectMulti {
            parent: parent.into(),
            properties,
        }
    }

    #[must_use]
    pub fn array(parent: impl Into<String>, index: usize) -> Self {
        Self::Array {
            parent: parent.into(),
            index,
        }
    }

    /// Replace the referenced value
    pub fn set(
        &self,
        root: &mut Value,
        new_value: &Value,
        configuration: &Configuration,
    ) -> JsonPathResult<()> {
        match self {
            Self::NoOp => no_op_outcome(configuration),
            Self::Root => {
                *root = new_value.clone();
                Ok(())
            }
            Self::Object { parent, property } => {
                let map = object_at(root, parent)?;
                map.insert(property.clone(), new_value.clone());
                Ok(())
            }
            Self::ObjectMulti { parent, properties } => {
                let map = object_at(root, parent)?;
                for property in properties {
                    if map.contains_key(property) {
                        map.insert(property.clone(), new_value.clone());
                    }
                }
                Ok(())
            }
            Self::Array { parent, index } => {
                let items = array_at(root, parent)?;
                if *index < items.len() {
                    items[*index] = new_value.clone();
                    Ok(())
                } else if *index == items.len() {
                    items.push(new_value.clone());
                    Ok(())
                } else {
                    Err(out_of_bounds(parent, *index))
                }
            }
        }
    }

    /// Replace the referenced value with a function of its current value
    pub fn convert(
        &self,
        root: &mut Value,
        configuration: &Configuration,
        transform: &dyn Fn(&Value, &Configuration) -> Value,
    ) -> JsonPathResult<()> {
        match self {
            Self::NoOp => no_op_outcome(configuration),
            Self::Root => {
                let converted = transform(root, configuration);
                *root = converted;
                Ok(())
            }
            Self::Object { parent, property } => {
                let map = object_at(root, parent)?;
                match map.get(property) {
                    Some(current) => {
                        let converted = transform(current, configuration);
                        map.insert(property.clone(), converted);
                        Ok(())
                    }
                    None => missing_property_outcome(parent, property, configuration),
                }
            }
            Self::ObjectMulti { parent, properties } => {
                let map = object_at(root, parent)?;
                for property in properties {
                    if let Some(current) = map.get(property) {
                        let converted = transform(current, configuration);
                        map.insert(property.clone(), converted);
                    }
                }
                Ok(())
            }
            Self::Array { parent, index } => {
                let items = array_at(root, parent)?;
                match items.get(*index) {
                    Some(current) => {
                        let converted = transform(current, configuration);
                        items[*index] = converted;
                        Ok(())
                    }
                    None => Err(out_of_bounds(parent, *index)),
                }
            }
        }
    }

    /// Remove the referenced value from its container
    pub fn delete(&self, root: &mut Value, configuration: &Configuration) -> JsonPathResult<()> {
        match self {
            Self::NoOp => no_op_outcome(configuration),
            Self::Root => Err(JsonPathError::invalid_mutation(
                "the document root cannot be deleted",
            )),
            Self::Object { parent, property } => {
                let map = object_at(root, parent)?;
                map.shift_remove(property);
                Ok(())
            }
            Self::ObjectMulti { parent, properties } => {
                let map = object_at(root, parent)?;
                for property in properties {
                    map.shift_remove(property);
                }
                Ok(())
            }
            Self::Array { parent, index } => {
                let items = array_at(root, parent)?;
                if *index < items.len() {
                    items.remove(*index);
                }
                Ok(())
            }
        }
    }

    /// Append a value to the referenced array
    pub fn add(
        &self,
        root: &mut Value,
        value: &Value,
        configuration: &Configuration,
    ) -> JsonPathResult<()> {
        match self {
            Self::NoOp => no_op_outcome(configuration),
            Self::ObjectMulti { .. } => Err(JsonPathError::invalid_mutation(
                "cannot add to a multi-property match",
            )),
            _ => {
                let target = self.target_mut(root)?;
                match target {
                    Value::Array(items) => {
                        items.push(value.clone());
                        Ok(())
                    }
                    _ => Err(JsonPathError::invalid_mutation(
                        "can only add values to an array",
                    )),
                }
            }
        }
    }

    /// Insert or replace a key in the referenced object
    pub fn put(
        &self,
        root: &mut Value,
        key: &str,
        value: &Value,
        configuration: &Configuration,
    ) -> JsonPathResult<()> {
        match self {
            Self::NoOp => no_op_outcome(configuration),
            Self::ObjectMulti { .. } => Err(JsonPathError::invalid_mutation(
                "cannot put into a multi-property match",
            )),
            _ => {
                let target = self.target_mut(root)?;
                match target {
                    Value::Object(map) => {
                        map.insert(key.to_string(), value.clone());
                        Ok(())
                    }
                    _ => Err(JsonPathError::invalid_mutation(
                        "can only put keys into an object",
                    )),
                }
            }
        }
    }

    /// Rename a key of the referenced object
    ///
    /// The renamed entry moves to the end of the object; a missing old
    /// key is a path-not-found error.
    pub fn rename_key(
        &self,
        root: &mut Value,
        old_key: &str,
        new_key: &str,
        configuration: &Configuration,
    ) -> JsonPathResult<()> {
        match self {
            Self::NoOp => no_op_outcome(configuration),
            Self::ObjectMulti { .. } => Err(JsonPathError::invalid_mutation(
                "cannot rename keys of a multi-property match",
            )),
            _ => {
                let target = self.target_mut(root)?;
                match target {
                    Value::Object(map) => match map.shift_remove(old_key) {
                        Some(value) => {
                            map.insert(new_key.to_string(), value);
                            Ok(())
                        }
                        None => Err(JsonPathError::path_not_found(format!(
                            "no results for key '{old_key}'"
                        ))),
                    },
                    _ => Err(JsonPathError::invalid_mutation(
                        "can only rename keys of an object",
                    )),
                }
            }
        }
    }

    /// Mutable borrow of the value this ref points at
    fn target_mut<'v>(&self, root: &'v mut Value) -> JsonPathResult<&'v mut Value> {
        match self {
            Self::Root => Ok(root),
            Self::Object { parent, property } => {
                let map = object_at(root, parent)?;
                map.get_mut(property).ok_or_else(|| {
                    JsonPathError::path_not_found(format!(
                        "missing property '{property}' in path {parent}"
                    ))
                })
            }
            Self::Array { parent, index } => {
                let parent_path = parent.clone();
                let index = *index;
                let items = array_at(root, parent)?;
                items
                    .get_mut(index)
                    .ok_or_else(|| out_of_bounds(&parent_path, index))
            }
            Self::NoOp | Self::ObjectMulti { .. } => Err(JsonPathError::invalid_mutation(
                "reference has no single target value",
            )),
        }
    }

    /// Canonical path used to order pending operations
    #[must_use]
    pub fn sort_path(&self) -> String {
        match self {
            Self::NoOp => String::new(),
            Self::Root => "$".to_string(),
            Self::Object { parent, property } => {
                format!("{parent}['{}']", utils::escape_property(property))
            }
            Self::ObjectMulti { parent, properties } => match properties.first() {
                Some(first) => format!("{parent}['{}']", utils::escape_property(first)),
                None => parent.clone(),
            },
            Self::Array { parent, index } => format!("{parent}[{index}]"),
        }
    }

    /// Document order comparison, array indexes comparing numerically
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        let a = sort_steps(&self.sort_path());
        let b = sort_steps(&other.sort_path());
        for (left, right) in a.iter().zip(b.iter()) {
            let step_order = match (left, right) {
                (Step::Index(i), Step::Index(j)) => i.cmp(j),
                (Step::Key(k), Step::Key(l)) => k.cmp(l),
                (Step::Index(_), Step::Key(_)) => Ordering::Less,
                (Step::Key(_), Step::Index(_)) => Ordering::Greater,
            };
            if step_order != Ordering::Equal {
                return step_order;
            }
        }
        a.len().cmp(&b.len())
    }
}

/// Order pending operations so the deepest and rightmost location is
/// applied first
pub fn sort_for_update(operations: &mut [PathRef]) {
    operations.sort_by(|a, b| b.compare(a));
}

fn no_op_outcome(configuration: &Configuration) -> JsonPathResult<()> {
    if configuration.has_option(EvaluationOption::RequireProperties) {
        Err(JsonPathError::path_not_found(
            "the match has no writable location",
        ))
    } else {
        Ok(())
    }
}

fn missing_property_outcome(
    parent: &str,
    property: &str,
    configuration: &Configuration,
) -> JsonPathResult<()> {
    if configuration.has_option(EvaluationOption::RequireProperties) {
        Err(JsonPathError::path_not_found(format!(
            "missing property '{property}' in path {parent}"
        )))
    } else {
        Ok(())
    }
}

fn out_of_bounds(parent: &str, index: usize) -> JsonPathError {
    JsonPathError::path_not_found(format!("index {index} is out of bounds in path {parent}"))
}

fn object_at<'v>(
    root: &'v mut Value,
    parent: &str,
) -> JsonPathResult<&'v mut serde_json::Map<String, Value>> {
    match navigate(root, parent)? {
        Value::Object(map) => Ok(map),
        _ => Err(JsonPathError::invalid_mutation(format!(
            "the value at {parent} is not an object"
        ))),
    }
}

fn array_at<'v>(root: &'v mut Value, parent: &str) -> JsonPathResult<&'v mut Vec<Value>> {
    match navigate(root, parent)? {
        Value::Array(items) => Ok(items),
        _ => Err(JsonPathError::invalid_mutation(format!(
            "the value at {parent} is not an array"
        ))),
    }
}

/// Walk a canonical path down a mutable document borrow
fn navigate<'v>(root: &'v mut Value, path: &str) -> JsonPathResult<&'v mut Value> {
    let mut current = root;
    for step in parse_steps(path)? {
        current = match (step, current) {
            (Step::Key(key), Value::Object(map)) => map.get_mut(&key).ok_or_else(|| {
                JsonPathError::path_not_found(format!("missing property '{key}' in path {path}"))
            })?,
            (Step::Index(index), Value::Array(items)) => {
                let len = items.len();
                items.get_mut(index).ok_or_else(|| {
                    JsonPathError::path_not_found(format!(
                        "index {index} is out of bounds ({len}) in path {path}"
                    ))
                })?
            }
            _ => {
                return Err(JsonPathError::path_not_found(format!(
                    "cannot navigate into a scalar in path {path}"
                )));
            }
        };
    }
    Ok(current)
}

/// Parse a canonical path like `$['store']['book'][0]` into steps
fn parse_steps(path: &str) -> JsonPathResult<Vec<Step>> {
    let chars: Vec<char> = path.chars().collect();
    let mut steps = Vec::new();
    let mut pos = 0;
    if chars.first() != Some(&'$') {
        return Err(JsonPathError::invalid_mutation(format!(
            "not a canonical path: {path}"
        )));
    }
    pos += 1;
    while pos < chars.len() {
        if chars[pos] != '[' {
            return Err(JsonPathError::invalid_mutation(format!(
                "not a canonical path: {path}"
            )));
        }
        pos += 1;
        if chars.get(pos) == Some(&'\'') {
            pos += 1;
            let mut key = String::new();
            loop {
                match chars.get(pos) {
                    Some('\\') => {
                        if let Some(&escaped) = chars.get(pos + 1) {
                            key.push(escaped);
                            pos += 2;
                        } else {
                            return Err(JsonPathError::invalid_mutation(format!(
                                "not a canonical path: {path}"
                            )));
                        }
                    }
                    Some('\'') => {
                        pos += 1;
                        break;
                    }
                    Some(&c) => {
                        key.push(c);
                        pos += 1;
                    }
                    None => {
                        return Err(JsonPathError::invalid_mutation(format!(
                            "not a canonical path: {path}"
                        )));
                    }
                }
            }
            steps.push(Step::Key(key));
        } else {
            let mut digits = String::new();
            while let Some(&c) = chars.get(pos) {
                if c == ']' {
                    break;
                }
                digits.push(c);
                pos += 1;
            }
            let index: usize = digits.trim().parse().map_err(|_| {
                JsonPathError::invalid_mutation(format!("not a canonical path: {path}"))
            })?;
            steps.push(Step::Index(index));
        }
        if chars.get(pos) != Some(&']') {
            return Err(JsonPathError::invalid_mutation(format!(
                "not a canonical path: {path}"
            )));
        }
        pos += 1;
    }
    Ok(steps)
}

/// Lossy step parse for ordering; never fails
fn sort_steps(path: &str) -> Vec<Step> {
    parse_steps_lossy(path)
}

fn parse_steps_lossy(path: &str) -> Vec<Step> {
    let mut steps = Vec::new();
    let trimmed = path.strip_prefix('$').unwrap_or(path);
    for segment in trimmed.split('[').skip(1) {
        let segment = segment.trim_end_matches(']');
        if let Some(quoted) = segment
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
        {
            steps.push(Step::Key(quoted.to_string()));
        } else if let Ok(index) = segment.parse::<usize>() {
            steps.push(Step::Index(index));
        } else {
            steps.push(Step::Key(segment.to_string()));
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> Configuration {
        Configuration::new()
    }

    #[test]
    fn set_replaces_an_object_property() {
        let mut doc = json!({"a": {"b": 1}});
        PathRef::object("$['a']", "b")
            .set(&mut doc, &json!(2), &config())
            .expect("set");
        assert_eq!(doc, json!({"a": {"b": 2}}));
    }

    #[test]
    fn set_replaces_an_array_element() {
        let mut doc = json!({"a": [1, 2, 3]});
        PathRef::array("$['a']", 1)
            .set(&mut doc, &json!(9), &config())
            .expect("set");
        assert_eq!(doc, json!({"a": [1, 9, 3]}));
    }

    #[test]
    fn root_can_be_set_but_not_deleted() {
        let mut doc = json!({"a": 1});
        PathRef::Root.set(&mut doc, &json!([]), &config()).expect("set");
        assert_eq!(doc, json!([]));
        let err = PathRef::Root.delete(&mut doc, &config()).expect_err("delete root");
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidMutation);
    }

    #[test]
    fn delete_preserves_sibling_order() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3});
        PathRef::object("$", "b").delete(&mut doc, &config()).expect("delete");
        let keys: Vec<&String> = doc.as_object().expect("object").keys().collect();
        assert_eq!(keys, ["a", "c"]);
    }

    #[test]
    fn add_appends_to_the_referenced_array() {
        let mut doc = json!({"list": [1]});
        PathRef::object("$", "list")
            .add(&mut doc, &json!(2), &config())
            .expect("add");
        assert_eq!(doc, json!({"list": [1, 2]}));

        let err = PathRef::object("$", "list")
            .put(&mut doc, "k", &json!(1), &config())
            .expect_err("put into array");
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidMutation);
    }

    #[test]
    fn rename_moves_the_value_under_the_new_key() {
        let mut doc = json!({"inner": {"old": 7}});
        PathRef::object("$", "inner")
            .rename_key(&mut doc, "old", "new", &config())
            .expect("rename");
        assert_eq!(doc, json!({"inner": {"new": 7}}));

        let err = PathRef::object("$", "inner")
            .rename_key(&mut doc, "gone", "x", &config())
            .expect_err("missing key");
        assert_eq!(err.kind(), crate::error::ErrorKind::PathNotFound);
    }

    #[test]
    fn convert_sees_the_current_value() {
        let mut doc = json!({"n": 2});
        PathRef::object("$", "n")
            .convert(&mut doc, &config(), &|current, _| {
                json!(current.as_i64().unwrap_or(0) * 10)
            })
            .expect("convert");
        assert_eq!(doc, json!({"n": 20}));
    }

    #[test]
    fn noop_is_lenient_unless_properties_are_required() {
        let mut doc = json!({});
        PathRef::NoOp.set(&mut doc, &json!(1), &config()).expect("lenient");
        let strict = Configuration::new().with_option(EvaluationOption::RequireProperties);
        let err = PathRef::NoOp.set(&mut doc, &json!(1), &strict).expect_err("strict");
        assert_eq!(err.kind(), crate::error::ErrorKind::PathNotFound);
    }

    #[test]
    fn update_order_puts_higher_indexes_first() {
        let mut ops = vec![
            PathRef::array("$['a']", 2),
            PathRef::array("$['a']", 10),
            PathRef::array("$['a']", 1),
        ];
        sort_for_update(&mut ops);
        assert_eq!(
            ops,
            vec![
                PathRef::array("$['a']", 10),
                PathRef::array("$['a']", 2),
                PathRef::array("$['a']", 1),
            ]
        );
    }

    #[test]
    fn deleting_multiple_indexes_in_sorted_order_is_stable() {
        let mut doc = json!({"a": [0, 1, 2, 3, 4]});
        let mut ops = vec![PathRef::array("$['a']", 1), PathRef::array("$['a']", 3)];
        sort_for_update(&mut ops);
        for op in &ops {
            op.delete(&mut doc, &config()).expect("delete");
        }
        assert_eq!(doc, json!({"a": [0, 2, 4]}));
    }

    #[test]
    fn escaped_property_names_navigate() {
        let mut doc = json!({"it's": {"x": 1}});
        PathRef::object("$['it\\'s']", "x")
            .set(&mut doc, &json!(2), &config())
            .expect("set");
        assert_eq!(doc, json!({"it's": {"x": 2}}));
    }
}
