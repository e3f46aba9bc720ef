//! JSONPath compiler, evaluator and in-place update engine
//!
//! Paths are compiled once into a token chain and evaluated against
//! `serde_json` documents. Evaluation produces matched values together
//! with the normalized path of each match, and can additionally record
//! update operations so matched locations can be rewritten in place.
//!
//! The crate is split along the pipeline: [`scanner`] provides the
//! character cursor every parser runs on, [`path`] compiles and
//! evaluates token chains, [`filter`] holds the `[?(...)]` predicate
//! sub-language, [`functions`] the `.sum()`-style tail functions, and
//! [`path_ref`] the write-back handles used by updates.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod functions;
pub mod path;
pub mod path_ref;
pub mod scanner;
pub mod utils;

pub use config::{
    Configuration, Continuation, EvaluationListener, EvaluationOption, FoundResult,
};
pub use context::{EvalResult, EvaluationContext, EvaluationStatus};
pub use error::{ErrorKind, JsonPathError, JsonPathResult};
pub use filter::{ExpressionNode, FilterCompiler};
pub use functions::PathFunctionKind;
pub use path::{CompiledPath, PathCompiler};
pub use path_ref::PathRef;
