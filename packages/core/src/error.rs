//! Error types for path compilation, evaluation and mutation
//!
//! Every fallible operation in the engine returns [`JsonPathResult`]
//! carrying one of the four failure categories below. Compile-time
//! failures always name the offending character position.

/// Failure categories for JSONPath processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed path or predicate text, rejected at compile time
    Syntax,
    /// A definite path, or an indefinite path under `RequireProperties`,
    /// resolved to nothing
    PathNotFound,
    /// Predicate operand types are incompatible with the requested operator
    TypeMismatch,
    /// An update operation was applied to an incompatible container shape
    InvalidMutation,
}

/// Main JSONPath error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonPathError {
    /// Malformed path or predicate text
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// Human readable description of the failure
        message: String,
        /// Offset of the offending character in the compiled text
        position: usize,
    },

    /// Nothing found where the path (or configuration) required a hit
    #[error("path not found: {message}")]
    PathNotFound {
        /// Human readable description of the failure
        message: String,
    },

    /// Operand kinds incompatible with a relational operator or function
    #[error("type mismatch: {message}")]
    TypeMismatch {
        /// Human readable description of the failure
        message: String,
    },

    /// Update operation applied against an incompatible container shape
    #[error("invalid mutation: {message}")]
    InvalidMutation {
        /// Human readable description of the failure
        message: String,
    },
}

/// Result type for JSONPath operations
pub type JsonPathResult<T> = Result<T, JsonPathError>;

impl JsonPathError {
    /// Category of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            JsonPathError::Syntax { .. } => ErrorKind::Syntax,
            JsonPathError::PathNotFound { .. } => ErrorKind::PathNotFound,
            JsonPathError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            JsonPathError::InvalidMutation { .. } => ErrorKind::InvalidMutation,
        }
    }

    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        JsonPathError::Syntax {
            message: message.into(),
            position,
        }
    }

    pub fn path_not_found(message: impl Into<String>) -> Self {
        JsonPathError::PathNotFound {
            message: message.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        JsonPathError::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn invalid_mutation(message: impl Into<String>) -> Self {
        JsonPathError::InvalidMutation {
            message: message.into(),
        }
    }
}
