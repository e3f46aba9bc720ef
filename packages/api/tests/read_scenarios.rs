//! End-to-end read behavior across notation styles and options

use jaypath::{Configuration, ErrorKind, EvaluationOption, JsonPath};
use serde_json::{Value, json};

fn read(path: &str, document: &Value) -> Value {
    JsonPath::compile(path)
        .expect("path should compile")
        .read(document, &Configuration::new())
        .expect("read should succeed")
}

#[test]
fn wildcard_over_object_preserves_insertion_order() {
    let doc = json!({"a": {"b": 1}, "c": {"b": 2}});
    assert_eq!(read("$.*.b", &doc), json!([1, 2]));
}

#[test]
fn filtered_array_projection() {
    let doc = json!([{"a": 1}, {"a": 2}, {"a": 3}]);
    assert_eq!(read("$[?(@.a > 1)].a", &doc), json!([2, 3]));
}

#[test]
fn missing_leaves_are_omitted_unless_defaulted_to_null() {
    let doc = json!([{"x": 1}, {"y": 2}]);
    assert_eq!(read("$[*].x", &doc), json!([1]));

    let config = Configuration::new().with_option(EvaluationOption::DefaultPathLeafToNull);
    let value = JsonPath::compile("$[*].x")
        .expect("compile")
        .read(&doc, &config)
        .expect("read");
    assert_eq!(value, json!([1, null]));
}

#[test]
fn slices_resolve_against_the_array_length() {
    let doc = json!([1, 2, 3, 4, 5]);
    assert_eq!(read("$[1:4]", &doc), json!([2, 3, 4]));
    assert_eq!(read("$[-2:]", &doc), json!([4, 5]));
    assert_eq!(read("$[:2]", &doc), json!([1, 2]));
}

#[test]
fn unterminated_slice_is_a_syntax_error() {
    let err = JsonPath::compile("$[1:").expect_err("must not compile");
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn negative_and_multi_index_access() {
    let doc = json!(["a", "b", "c", "d"]);
    assert_eq!(read("$[-1]", &doc), json!("d"));
    assert_eq!(read("$[0,2]", &doc), json!(["a", "c"]));
}

#[test]
fn out_of_bounds_indexes_are_skipped_silently() {
    let doc = json!(["a", "b"]);
    assert_eq!(read("$[0,9]", &doc), json!(["a"]));
}

#[test]
fn scan_visits_containers_in_document_order() {
    let doc = json!({
        "store": {
            "book": [{"price": 1}, {"price": 2}],
            "bicycle": {"price": 3}
        }
    });
    assert_eq!(read("$..price", &doc), json!([1, 2, 3]));
}

#[test]
fn multi_property_leaf_merges_present_properties() {
    let doc = json!({"a": 1, "b": 2, "c": 3});
    assert_eq!(read("$['a','c']", &doc), json!([{"a": 1, "c": 3}]));
}

#[test]
fn multi_property_skips_missing_names_at_the_leaf() {
    let doc = json!({"a": 1});
    assert_eq!(read("$['a','missing']", &doc), json!([{"a": 1}]));
}

#[test]
fn multi_property_before_further_accessors_fans_out() {
    let doc = json!({"a": {"v": 1}, "b": {"v": 2}});
    assert_eq!(read("$['a','b'].v", &doc), json!([1, 2]));
}

#[test]
fn definite_path_into_missing_property_is_path_not_found() {
    let doc = json!({"a": 1});
    let err = JsonPath::compile("$.b.c")
        .expect("compile")
        .read(&doc, &Configuration::new())
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::PathNotFound);
}

#[test]
fn indefinite_path_with_no_match_is_an_empty_array() {
    let doc = json!({"a": 1});
    assert_eq!(read("$..missing", &doc), json!([]));
}

#[test]
fn require_properties_turns_skips_into_errors() {
    let doc = json!([{"x": 1}, {"y": 2}]);
    let config = Configuration::new().with_option(EvaluationOption::RequireProperties);
    let err = JsonPath::compile("$[*].x")
        .expect("compile")
        .read(&doc, &config)
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::PathNotFound);
}

#[test]
fn as_path_list_reports_normalized_paths() {
    let doc = json!({"store": {"book": [{"t": 1}, {"t": 2}]}});
    let config = Configuration::new().with_option(EvaluationOption::AsPathList);
    let value = JsonPath::compile("$..t")
        .expect("compile")
        .read(&doc, &config)
        .expect("read");
    assert_eq!(
        value,
        json!(["$['store']['book'][0]['t']", "$['store']['book'][1]['t']"])
    );
}

#[test]
fn as_path_list_escapes_quoted_property_names() {
    let doc = json!({"it's": 1});
    let config = Configuration::new().with_option(EvaluationOption::AsPathList);
    let value = JsonPath::compile("$.*")
        .expect("compile")
        .read(&doc, &config)
        .expect("read");
    assert_eq!(value, json!([r"$['it\'s']"]));
}

#[test]
fn bracket_and_dot_notation_read_the_same_values() {
    let doc = json!({"store": {"book": [{"title": "x"}]}});
    assert_eq!(
        read("$.store.book[0].title", &doc),
        read("$['store']['book'][0]['title']", &doc)
    );
}

#[test]
fn root_path_returns_the_document() {
    let doc = json!({"a": 1});
    assert_eq!(read("$", &doc), doc);
}

#[test]
fn properties_with_special_characters_need_bracket_notation() {
    let doc = json!({"it's": 1, "a b": 2});
    assert_eq!(read(r"$['it\'s']", &doc), json!(1));
    assert_eq!(read("$['a b']", &doc), json!(2));
    assert!(JsonPath::compile("$.a b").is_err());
}

#[test]
fn null_leaf_is_a_real_value_not_a_missing_one() {
    let doc = json!({"a": null});
    assert_eq!(read("$.a", &doc), json!(null));
}
