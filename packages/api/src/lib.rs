//! JSONPath queries and in-place updates for `serde_json` documents
//!
//! Compile a path once, then read from or rewrite any number of
//! documents with it:
//!
//! ```
//! use jaypath::{Configuration, JsonPath};
//! use serde_json::json;
//!
//! let doc = json!({"store": {"book": [
//!     {"title": "Moby Dick", "price": 8.99},
//!     {"title": "The Trial", "price": 22.99},
//! ]}});
//!
//! let path = JsonPath::compile("$.store.book[?(@.price < 10)].title")
//!     .expect("valid path");
//! let titles = path.read(&doc, &Configuration::new()).expect("read");
//! assert_eq!(titles, json!(["Moby Dick"]));
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod json_path;

pub use json_path::JsonPath;

pub use jaypath_core::{
    Configuration, Continuation, ErrorKind, EvaluationListener, EvaluationOption, FoundResult,
    JsonPathError, JsonPathResult,
};
