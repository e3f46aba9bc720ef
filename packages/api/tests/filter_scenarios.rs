//! Predicate sub-language coverage: relational and logical operators,
//! literals, sub-paths and regular expressions

use jaypath::{Configuration, ErrorKind, JsonPath};
use serde_json::{Value, json};

fn books() -> Value {
    json!({"book": [
        {"title": "Moby Dick",   "price": 8.99,  "category": "fiction",  "tags": ["whale", "sea"]},
        {"title": "The Trial",   "price": 22.99, "category": "fiction"},
        {"title": "Siddhartha",  "price": 4.99,  "category": "fiction",  "isbn": "0-553-21278-5"},
        {"title": "Cookbook",    "price": 30.0,  "category": "reference", "tags": ["food"]},
    ]})
}

fn titles(filter: &str) -> Vec<String> {
    let path = format!("$.book[?({filter})].title");
    let value = JsonPath::compile(&path)
        .expect("filter should compile")
        .read(&books(), &Configuration::new())
        .expect("read should succeed");
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        other => panic!("expected array, got {other}"),
    }
}

#[test]
fn numeric_comparisons() {
    assert_eq!(titles("@.price < 10"), ["Moby Dick", "Siddhartha"]);
    assert_eq!(titles("@.price >= 22.99"), ["The Trial", "Cookbook"]);
    assert_eq!(titles("@.price == 30"), ["Cookbook"]);
    assert_eq!(titles("@.price != 30"), ["Moby Dick", "The Trial", "Siddhartha"]);
}

#[test]
fn loose_equality_coerces_numbers_strict_does_not() {
    let doc = json!([{"v": 1}, {"v": 1.0}, {"v": "1"}]);
    let loose = JsonPath::compile("$[?(@.v == 1)].v")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect("read");
    assert_eq!(loose, json!([1, 1.0]));

    let strict = JsonPath::compile("$[?(@.v === 1)].v")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect("read");
    assert_eq!(strict, json!([1]));
}

#[test]
fn string_comparisons_are_lexicographic() {
    assert_eq!(titles("@.title > 'Siddhartha'"), ["The Trial"]);
}

#[test]
fn mixed_kind_ordering_is_a_type_error() {
    let doc = json!([{"v": 1}, {"v": "one"}]);
    let err = JsonPath::compile("$[?(@.v < 'x')].v")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn missing_operand_makes_ordering_false_not_an_error() {
    assert_eq!(titles("@.isbn < 'Z'"), ["Siddhartha"]);
}

#[test]
fn exists_checks_with_and_without_negation() {
    assert_eq!(titles("@.isbn"), ["Siddhartha"]);
    assert_eq!(
        titles("!@.isbn"),
        ["Moby Dick", "The Trial", "Cookbook"]
    );
}

#[test]
fn regex_matching_with_flags() {
    assert_eq!(titles("@.title =~ /^the.*/i"), ["The Trial"]);
    assert_eq!(titles("@.category =~ /fict.*/"), ["Moby Dick", "The Trial", "Siddhartha"]);
}

#[test]
fn membership_operators() {
    assert_eq!(
        titles("@.category in ['reference', 'poetry']"),
        ["Cookbook"]
    );
    assert_eq!(
        titles("@.category nin ['reference']"),
        ["Moby Dick", "The Trial", "Siddhartha"]
    );
}

#[test]
fn containment_and_size_operators() {
    assert_eq!(titles("@.tags contains 'sea'"), ["Moby Dick"]);
    assert_eq!(titles("@.title contains 'Trial'"), ["The Trial"]);
    assert_eq!(titles("@.tags size 2"), ["Moby Dick"]);
    assert_eq!(titles("@.tags subsetof ['whale', 'sea', 'food']"), ["Moby Dick", "Cookbook"]);
    assert_eq!(titles("@.tags anyof ['food']"), ["Cookbook"]);
    assert_eq!(titles("@.tags noneof ['sea']"), ["Cookbook"]);
}

#[test]
fn empty_operator_on_strings_and_arrays() {
    let doc = json!([{"v": ""}, {"v": "x"}, {"v": []}, {"v": [1]}]);
    let value = JsonPath::compile("$[?(@.v empty true)].v")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect("read");
    assert_eq!(value, json!(["", []]));
}

#[test]
fn logical_connectives_and_grouping() {
    assert_eq!(
        titles("@.price < 10 && @.category == 'fiction'"),
        ["Moby Dick", "Siddhartha"]
    );
    assert_eq!(
        titles("@.price > 25 || @.isbn"),
        ["Siddhartha", "Cookbook"]
    );
    assert_eq!(
        titles("(@.price < 10 || @.price > 25) && @.tags"),
        ["Moby Dick", "Cookbook"]
    );
    assert_eq!(titles("!(@.category == 'fiction')"), ["Cookbook"]);
}

#[test]
fn rooted_sub_paths_compare_against_the_document() {
    let doc = json!({"max": 10, "items": [{"v": 5}, {"v": 15}]});
    let value = JsonPath::compile("$.items[?(@.v < $.max)].v")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect("read");
    assert_eq!(value, json!([5]));
}

#[test]
fn chained_bracket_filters_are_conjoined() {
    let value = JsonPath::compile("$.book[?(@.tags), ?(@.price < 10)].title")
        .expect("compile")
        .read(&books(), &Configuration::new())
        .expect("read");
    assert_eq!(value, json!(["Moby Dick"]));
}

#[test]
fn filter_on_an_object_selects_the_object_itself() {
    let doc = json!({"a": 1});
    let value = JsonPath::compile("$[?(@.a == 1)]")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect("read");
    assert_eq!(value, json!([{"a": 1}]));
}

#[test]
fn null_valued_property_is_not_equal_to_a_number() {
    let doc = json!([{"v": null}, {"v": 1}]);
    let value = JsonPath::compile("$[?(@.v == 1)].v")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect("read");
    assert_eq!(value, json!([1]));
}

#[test]
fn json_literals_in_filters_accept_single_quotes() {
    let doc = json!([{"tags": ["a", "b"]}, {"tags": ["c"]}]);
    let value = JsonPath::compile("$[?(@.tags == ['a','b'])].tags")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect("read");
    assert_eq!(value, json!([["a", "b"]]));
}
