//! Evaluation listeners: per-match notification and cooperative abort

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use jaypath::{Configuration, Continuation, FoundResult, JsonPath};
use serde_json::json;

#[test]
fn listeners_observe_every_match_in_order() {
    let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let config = Configuration::new().with_listener(Arc::new(move |found: &FoundResult| {
        sink.lock()
            .expect("lock")
            .push((found.index, found.path.clone()));
        Continuation::Continue
    }));

    let doc = json!({"a": {"v": 1}, "b": {"v": 2}});
    let value = JsonPath::compile("$.*.v")
        .expect("compile")
        .read(&doc, &config)
        .expect("read");
    assert_eq!(value, json!([1, 2]));

    let seen = seen.lock().expect("lock");
    assert_eq!(
        *seen,
        [
            (0, "$['a']['v']".to_string()),
            (1, "$['b']['v']".to_string())
        ]
    );
}

#[test]
fn abort_truncates_the_result_set_without_an_error() {
    let config = Configuration::new().with_listener(Arc::new(|found: &FoundResult| {
        if found.index >= 1 {
            Continuation::Abort
        } else {
            Continuation::Continue
        }
    }));

    let doc = json!([10, 20, 30, 40]);
    let value = JsonPath::compile("$[*]")
        .expect("compile")
        .read(&doc, &config)
        .expect("read must not fail on abort");
    // the match that triggered the abort is kept
    assert_eq!(value, json!([10, 20]));
}

#[test]
fn abort_on_the_first_match_yields_a_single_result() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = Configuration::new().with_listener(Arc::new(move |_: &FoundResult| {
        counter.fetch_add(1, Ordering::SeqCst);
        Continuation::Abort
    }));

    let doc = json!({"a": 1, "b": 2, "c": 3});
    let value = JsonPath::compile("$.*")
        .expect("compile")
        .read(&doc, &config)
        .expect("read");
    assert_eq!(value, json!([1]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn listeners_do_not_fire_for_sub_path_evaluations() {
    // matches produced while resolving $.max inside the filter are
    // internal and must not reach the listener
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = Configuration::new().with_listener(Arc::new(move |_: &FoundResult| {
        counter.fetch_add(1, Ordering::SeqCst);
        Continuation::Continue
    }));

    let doc = json!({"max": 10, "items": [{"v": 5}, {"v": 15}]});
    let value = JsonPath::compile("$.items[?(@.v < $.max)].v")
        .expect("compile")
        .read(&doc, &config)
        .expect("read");
    assert_eq!(value, json!([5]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn multiple_listeners_run_in_registration_order() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let first_log = Arc::clone(&log);
    let second_log = Arc::clone(&log);
    let config = Configuration::new()
        .with_listener(Arc::new(move |_: &FoundResult| {
            first_log.lock().expect("lock").push("first");
            Continuation::Continue
        }))
        .with_listener(Arc::new(move |_: &FoundResult| {
            second_log.lock().expect("lock").push("second");
            Continuation::Continue
        }));

    let doc = json!({"a": 1});
    JsonPath::compile("$.a")
        .expect("compile")
        .read(&doc, &config)
        .expect("read");
    assert_eq!(*log.lock().expect("lock"), ["first", "second"]);
}
