//! Parsed forms of array index and slice accessors

use crate::error::{JsonPathError, JsonPathResult};

/// A comma separated list of array indexes, e.g. `[0]` or `[1,4,-1]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayIndexOperation {
    indexes: Vec<i64>,
}

impl ArrayIndexOperation {
    /// Parse a bracketed index list; negative indexes count from the end
    pub fn parse(operation: &str) -> JsonPathResult<Self> {
        for c in operation.chars() {
            if !(c.is_ascii_digit() || matches!(c, ',' | ' ' | '-' | '[' | ']')) {
                return Err(JsonPathError::syntax(
                    format!("failed to parse array index operation '{operation}'"),
                    0,
                ));
            }
        }

        let stripped: String = operation
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | ' '))
            .collect();

        let mut indexes = Vec::new();
        for token in stripped.split(',') {
            let index: i64 = token.parse().map_err(|_| {
                JsonPathError::syntax(
                    format!("failed to parse array index operation '{operation}'"),
                    0,
                )
            })?;
            indexes.push(index);
        }
        if indexes.is_empty() {
            return Err(JsonPathError::syntax(
                format!("failed to parse array index operation '{operation}'"),
                0,
            ));
        }
        Ok(Self { indexes })
    }

    #[must_use]
    pub fn indexes(&self) -> &[i64] {
        &self.indexes
    }

    /// True for plain single-index accessors like `[3]`
    #[inline]
    #[must_use]
    pub fn is_single_index_operation(&self) -> bool {
        self.indexes.len() == 1
    }
}

impl std::fmt::Display for ArrayIndexOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.indexes.iter().map(|i| i.to_string()).collect();
        write!(f, "[{}]", joined.join(","))
    }
}

/// Which bounds a slice accessor carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceKind {
    /// `[2:]` — from an index to the end
    SliceFrom,
    /// `[2:5]` — between two indexes, end exclusive
    SliceBetween,
    /// `[:5]` — from the start up to an index, end exclusive
    SliceTo,
}

/// A parsed slice accessor such as `[1:5]`, `[2:]` or `[:-1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySliceOperation {
    from: Option<i64>,
    to: Option<i64>,
    kind: SliceKind,
}

impl ArraySliceOperation {
    /// Parse a bracketed slice; either bound may be omitted and either
    /// bound may be negative
    pub fn parse(operation: &str) -> JsonPathResult<Self> {
        for c in operation.chars() {
            if !(c.is_ascii_digit() || matches!(c, '-' | ':' | ' ' | '[' | ']')) {
                return Err(JsonPathError::syntax(
                    format!("failed to parse slice operation '{operation}'"),
                    0,
                ));
            }
        }

        let stripped: String = operation
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | ' '))
            .collect();
        if !stripped.contains(':') {
            return Err(JsonPathError::syntax(
                format!("failed to parse slice operation '{operation}'"),
                0,
            ));
        }

        let mut parts = stripped.split(':');
        let from = Self::parse_bound(parts.next(), operation)?;
        let to = Self::parse_bound(parts.next(), operation)?;

        let kind = match (from, to) {
            (Some(_), None) => SliceKind::SliceFrom,
            (Some(_), Some(_)) => SliceKind::SliceBetween,
            (None, Some(_)) => SliceKind::SliceTo,
            (None, None) => {
                return Err(JsonPathError::syntax(
                    format!("failed to parse slice operation '{operation}'"),
                    0,
                ));
            }
        };

        Ok(Self { from, to, kind })
    }

    fn parse_bound(part: Option<&str>, operation: &str) -> JsonPathResult<Option<i64>> {
        match part {
            None | Some("") => Ok(None),
            Some(token) => token
                .parse()
                .map(Some)
                .map_err(|_| {
                    JsonPathError::syntax(
                        format!("failed to parse slice operation '{operation}'"),
                        0,
                    )
                }),
        }
    }

    #[inline]
    #[must_use]
    pub fn from(&self) -> Option<i64> {
        self.from
    }

    #[inline]
    #[must_use]
    pub fn to(&self) -> Option<i64> {
        self.to
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> SliceKind {
        self.kind
    }
}

impl std::fmt::Display for ArraySliceOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = |b: Option<i64>| b.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "[{}:{}]", bound(self.from), bound(self.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_multi_index_parse() {
        let single = ArrayIndexOperation::parse("[5]").expect("parse");
        assert!(single.is_single_index_operation());
        assert_eq!(single.indexes(), &[5]);

        let multi = ArrayIndexOperation::parse("[1, 4, -1]").expect("parse");
        assert!(!multi.is_single_index_operation());
        assert_eq!(multi.indexes(), &[1, 4, -1]);
        assert_eq!(multi.to_string(), "[1,4,-1]");
    }

    #[test]
    fn index_rejects_garbage() {
        assert!(ArrayIndexOperation::parse("[a]").is_err());
        assert!(ArrayIndexOperation::parse("[]").is_err());
        assert!(ArrayIndexOperation::parse("[1,,2]").is_err());
    }

    #[test]
    fn slice_kinds_are_detected() {
        let from = ArraySliceOperation::parse("[2:]").expect("parse");
        assert_eq!(from.kind(), SliceKind::SliceFrom);
        assert_eq!((from.from(), from.to()), (Some(2), None));

        let between = ArraySliceOperation::parse("[1:5]").expect("parse");
        assert_eq!(between.kind(), SliceKind::SliceBetween);

        let to = ArraySliceOperation::parse("[:-1]").expect("parse");
        assert_eq!(to.kind(), SliceKind::SliceTo);
        assert_eq!(to.to(), Some(-1));
        assert_eq!(to.to_string(), "[:-1]");
    }

    #[test]
    fn slice_rejects_missing_colon_and_empty_bounds() {
        assert!(ArraySliceOperation::parse("[1]").is_err());
        assert!(ArraySliceOperation::parse("[:]").is_err());
        assert!(ArraySliceOperation::parse("[x:2]").is_err());
    }

    #[test]
    fn slice_ignores_extra_parts() {
        let slice = ArraySliceOperation::parse("[1:5:2]").expect("parse");
        assert_eq!(slice.kind(), SliceKind::SliceBetween);
        assert_eq!((slice.from(), slice.to()), (Some(1), Some(5)));
    }
}
