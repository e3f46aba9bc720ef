//! Relational operator evaluation over resolved operands

use serde_json::Value;

use crate::error::{JsonPathError, JsonPathResult};
use crate::filter::operators::RelationalOperator;
use crate::filter::value_node::ValueNode;

/// Apply `operator` to two resolved operands
///
/// Path nodes must already be resolved; callers go through
/// [`ValueNode::resolve`] first. Ordering operators over incompatible
/// types fail with a type mismatch; every other operator answers `false`
/// for operands it does not apply to.
pub fn evaluate(
    operator: RelationalOperator,
    left: &ValueNode,
    right: &ValueNode,
) -> JsonPathResult<bool> {
    let verdict = match operator {
        RelationalOperator::Eq => equals(left, right),
        RelationalOperator::Ne => !equals(left, right),
        RelationalOperator::Tseq => type_safe_equals(left, right),
        RelationalOperator::Tsne => !type_safe_equals(left, right),
        RelationalOperator::Lt => compare(left, right, operator)?.is_some_and(|o| o.is_lt()),
        RelationalOperator::Lte => compare(left, right, operator)?.is_some_and(|o| o.is_le()),
        RelationalOperator::Gt => compare(left, right, operator)?.is_some_and(|o| o.is_gt()),
        RelationalOperator::Gte => compare(left, right, operator)?.is_some_and(|o| o.is_ge()),
        RelationalOperator::Regex => regex_match(left, right),
        RelationalOperator::In => is_in(left, right),
        RelationalOperator::Nin => !is_in(left, right),
        RelationalOperator::Contains => contains(left, right),
        RelationalOperator::All => contains_all(left, right),
        RelationalOperator::Size => size_matches(left, right),
        RelationalOperator::Exists => exists_matches(left, right),
        RelationalOperator::Type => type_matches(left, right),
        RelationalOperator::Empty => empty_matches(left, right),
        RelationalOperator::SubsetOf => subset_of(left, right),
        RelationalOperator::AnyOf => any_of(left, right),
        RelationalOperator::NoneOf => none_of(left, right),
    };
    Ok(verdict)
}

/// Loose equality: numbers compare by numeric value regardless of their
/// source text, so `1 == 1.0`
fn equals(left: &ValueNode, right: &ValueNode) -> bool {
    match (left, right) {
        (ValueNode::Number { value: a, .. }, ValueNode::Number { value: b, .. }) => a == b,
        _ => left == right,
    }
}

/// Strict equality: same node kind and same source representation, so
/// `1 === 1.0` is false
fn type_safe_equals(left: &ValueNode, right: &ValueNode) -> bool {
    std::mem::discriminant(left) == std::mem::discriminant(right) && left == right
}

/// Ordering comparison for the `<`, `<=`, `>`, `>=` family
///
/// Numbers order numerically, strings lexicographically. Null and
/// undefined never order against anything. Any other mix is a type
/// mismatch.
fn compare(
    left: &ValueNode,
    right: &ValueNode,
    operator: RelationalOperator,
) -> JsonPathResult<Option<std::cmp::Ordering>> {
    match (left, right) {
        (ValueNode::Number { value: a, .. }, ValueNode::Number { value: b, .. }) => {
            Ok(a.partial_cmp(b))
        }
        (ValueNode::String(a), ValueNode::String(b)) => Ok(Some(a.cmp(b))),
        (ValueNode::Null | ValueNode::Undefined, _) | (_, ValueNode::Null | ValueNode::Undefined) => {
            Ok(None)
        }
        _ => Err(JsonPathError::type_mismatch(format!(
            "cannot compare {} with {} using '{operator}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn regex_match(left: &ValueNode, right: &ValueNode) -> bool {
    match (left, right) {
        (ValueNode::Pattern(pattern), ValueNode::String(candidate))
        | (ValueNode::String(candidate), ValueNode::Pattern(pattern)) => pattern.is_match(candidate),
        _ => false,
    }
}

/// `left IN right` — right must be an array containing left
fn is_in(left: &ValueNode, right: &ValueNode) -> bool {
    match (left.to_json_value(), right.as_array()) {
        (Some(needle), Some(haystack)) => haystack.contains(&needle),
        _ => false,
    }
}

/// String containment or array membership
fn contains(left: &ValueNode, right: &ValueNode) -> bool {
    match (left, right) {
        (ValueNode::String(haystack), ValueNode::String(needle)) => haystack.contains(needle),
        (ValueNode::Json(Value::Array(items)), _) => right
            .to_json_value()
            .is_some_and(|needle| items.contains(&needle)),
        _ => false,
    }
}

/// `left ALL right` — left contains every element of the right hand array
fn contains_all(left: &ValueNode, right: &ValueNode) -> bool {
    match (left.as_array(), right.as_array()) {
        (Some(haystack), Some(required)) => required.iter().all(|item| haystack.contains(item)),
        _ => false,
    }
}

fn size_matches(left: &ValueNode, right: &ValueNode) -> bool {
    let ValueNode::Number { value, .. } = right else {
        return false;
    };
    let expected = *value;
    match left {
        ValueNode::String(s) => s.chars().count() as f64 == expected,
        ValueNode::Json(Value::Array(items)) => items.len() as f64 == expected,
        _ => false,
    }
}

fn exists_matches(left: &ValueNode, right: &ValueNode) -> bool {
    match (left, right) {
        (ValueNode::Boolean(a), ValueNode::Boolean(b)) => a == b,
        _ => false,
    }
}

/// `TYPE` — both operands resolve to the same kind of value
fn type_matches(left: &ValueNode, right: &ValueNode) -> bool {
    if matches!(left, ValueNode::Undefined) || matches!(right, ValueNode::Undefined) {
        return false;
    }
    left.type_name() == right.type_name()
}

fn empty_matches(left: &ValueNode, right: &ValueNode) -> bool {
    let ValueNode::Boolean(expected) = right else {
        return false;
    };
    let is_empty = match left {
        ValueNode::String(s) => s.is_empty(),
        ValueNode::Json(Value::Array(items)) => items.is_empty(),
        ValueNode::Json(Value::Object(map)) => map.is_empty(),
        _ => return false,
    };
    is_empty == *expected
}

fn subset_of(left: &ValueNode, right: &ValueNode) -> bool {
    match (left.as_array(), right.as_array()) {
        (Some(subset), Some(superset)) => subset.iter().all(|item| superset.contains(item)),
        _ => false,
    }
}

fn any_of(left: &ValueNode, right: &ValueNode) -> bool {
    match (left.as_array(), right.as_array()) {
        (Some(a), Some(b)) => a.iter().any(|item| b.contains(item)),
        _ => false,
    }
}

/// `NONEOF` requires both sides to be arrays; a missing operand never
/// passes the filter
fn none_of(left: &ValueNode, right: &ValueNode) -> bool {
    match (left.as_array(), right.as_array()) {
        (Some(a), Some(b)) => a.iter().all(|item| !b.contains(item)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn number(raw: &str) -> ValueNode {
        ValueNode::Number {
            raw: raw.to_string(),
            value: raw.parse().expect("numeric literal"),
        }
    }

    fn string(s: &str) -> ValueNode {
        ValueNode::String(s.to_string())
    }

    #[test]
    fn loose_equality_coerces_numbers() {
        assert!(evaluate(RelationalOperator::Eq, &number("1"), &number("1.0")).expect("eval"));
        assert!(!evaluate(RelationalOperator::Eq, &number("1"), &string("1")).expect("eval"));
    }

    #[test]
    fn strict_equality_keeps_number_representation() {
        assert!(!evaluate(RelationalOperator::Tseq, &number("1"), &number("1.0")).expect("eval"));
        assert!(evaluate(RelationalOperator::Tseq, &number("1"), &number("1")).expect("eval"));
        assert!(evaluate(RelationalOperator::Tsne, &number("1"), &string("1")).expect("eval"));
    }

    #[test]
    fn ordering_mixes_are_type_mismatches() {
        let err =
            evaluate(RelationalOperator::Lt, &number("1"), &string("a")).expect_err("mixed types");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn ordering_against_null_is_false() {
        assert!(!evaluate(RelationalOperator::Lt, &ValueNode::Null, &number("1")).expect("eval"));
        assert!(!evaluate(RelationalOperator::Gte, &number("1"), &ValueNode::Undefined).expect("eval"));
    }

    #[test]
    fn strings_order_lexicographically() {
        assert!(evaluate(RelationalOperator::Lt, &string("abc"), &string("abd")).expect("eval"));
        assert!(evaluate(RelationalOperator::Gte, &string("b"), &string("b")).expect("eval"));
    }

    #[test]
    fn membership_operators_use_the_right_hand_array() {
        let hay = ValueNode::Json(json!(["a", "b"]));
        assert!(evaluate(RelationalOperator::In, &string("a"), &hay).expect("eval"));
        assert!(evaluate(RelationalOperator::Nin, &string("c"), &hay).expect("eval"));
    }

    #[test]
    fn subset_and_intersection_operators() {
        let left = ValueNode::Json(json!([1, 2]));
        let right = ValueNode::Json(json!([1, 2, 3]));
        assert!(evaluate(RelationalOperator::SubsetOf, &left, &right).expect("eval"));
        assert!(evaluate(RelationalOperator::AnyOf, &left, &right).expect("eval"));
        assert!(!evaluate(RelationalOperator::NoneOf, &left, &right).expect("eval"));
        assert!(evaluate(RelationalOperator::All, &right, &left).expect("eval"));
    }

    #[test]
    fn size_counts_characters_and_elements() {
        assert!(evaluate(RelationalOperator::Size, &string("abcd"), &number("4")).expect("eval"));
        let list = ValueNode::Json(json!([1, 2, 3]));
        assert!(evaluate(RelationalOperator::Size, &list, &number("3")).expect("eval"));
        assert!(!evaluate(RelationalOperator::Size, &ValueNode::Null, &number("0")).expect("eval"));
    }

    #[test]
    fn empty_checks_strings_arrays_and_objects() {
        assert!(evaluate(RelationalOperator::Empty, &string(""), &ValueNode::Boolean(true))
            .expect("eval"));
        let map = ValueNode::Json(json!({"a": 1}));
        assert!(evaluate(RelationalOperator::Empty, &map, &ValueNode::Boolean(false)).expect("eval"));
    }

    #[test]
    fn type_operator_matches_kinds() {
        assert!(evaluate(RelationalOperator::Type, &string("a"), &string("b")).expect("eval"));
        assert!(!evaluate(RelationalOperator::Type, &string("a"), &number("1")).expect("eval"));
        assert!(
            !evaluate(RelationalOperator::Type, &ValueNode::Undefined, &ValueNode::Undefined)
                .expect("eval")
        );
    }
}
