//! Token chain a compiled path is made of
//!
//! A path compiles into a singly linked chain of [`PathToken`]s, one per
//! accessor. Evaluation starts at the root token and each token feeds
//! the values it selects into its successor; the last token of the chain
//! reports matches into the evaluation context.

use std::fmt;

use crate::filter::ExpressionNode;
use crate::functions::{Parameter, PathFunctionKind};
use crate::path::array_ops::{ArrayIndexOperation, ArraySliceOperation};

/// What one accessor of the path selects
#[derive(Debug, Clone)]
pub enum TokenKind {
    /// `$` or `@`, the anchor of every path
    Root { root_char: char },
    /// One or more property names, `.name` or `['a','b']`
    Property { properties: Vec<String> },
    /// `*` or `[*]`
    Wildcard,
    /// `[0]`, `[-1]` or `[1,4]`
    ArrayIndex(ArrayIndexOperation),
    /// `[1:5]`, `[2:]` or `[:-1]`
    ArraySlice(ArraySliceOperation),
    /// `[?(...)]`, or several comma separated filters that must all hold
    Predicate(Vec<ExpressionNode>),
    /// `..`, the deep scan accessor
    Scan,
    /// A tail function call such as `.length()`
    Function {
        kind: PathFunctionKind,
        parameters: Vec<Parameter>,
    },
}

/// One link of a compiled path
#[derive(Debug, Clone)]
pub struct PathToken {
    kind: TokenKind,
    next: Option<Box<PathToken>>,
}

impl PathToken {
    #[must_use]
    pub fn new(kind: TokenKind, next: Option<Box<PathToken>>) -> Self {
        Self { kind, next }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn next(&self) -> Option<&PathToken> {
        self.next.as_deref()
    }

    /// True for the last token of the chain
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.next.is_none()
    }

    /// True when this accessor selects at most one value
    #[must_use]
    pub fn is_token_definite(&self) -> bool {
        match &self.kind {
            TokenKind::Root { .. } | TokenKind::Function { .. } => true,
            TokenKind::Property { properties } => properties.len() == 1,
            TokenKind::ArrayIndex(operation) => operation.is_single_index_operation(),
            TokenKind::Wildcard
            | TokenKind::ArraySlice(_)
            | TokenKind::Predicate(_)
            | TokenKind::Scan => false,
        }
    }

    /// True when the chain from this token on selects at most one value
    #[must_use]
    pub fn is_path_definite(&self) -> bool {
        if !self.is_token_definite() {
            return false;
        }
        match &self.next {
            Some(next) => next.is_path_definite(),
            None => true,
        }
    }

    /// The accessor rendered the way it appears in a normalized path
    #[must_use]
    pub fn path_fragment(&self) -> String {
        match &self.kind {
            TokenKind::Root { root_char } => root_char.to_string(),
            TokenKind::Property { properties } => {
                let quoted: Vec<String> =
                    properties.iter().map(|p| format!("'{p}'")).collect();
                format!("[{}]", quoted.join(","))
            }
            TokenKind::Wildcard => "[*]".to_string(),
            TokenKind::ArrayIndex(operation) => operation.to_string(),
            TokenKind::ArraySlice(operation) => operation.to_string(),
            TokenKind::Predicate(_) => "[?]".to_string(),
            TokenKind::Scan => "..".to_string(),
            TokenKind::Function { kind, .. } => format!(".{kind}()"),
        }
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_fragment())?;
        if let Some(next) = &self.next {
            next.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(kinds: Vec<TokenKind>) -> PathToken {
        let mut token: Option<PathToken> = None;
        for kind in kinds.into_iter().rev() {
            token = Some(PathToken::new(kind, token.map(Box::new)));
        }
        token.expect("at least one token")
    }

    #[test]
    fn definiteness_follows_the_chain() {
        let definite = chain(vec![
            TokenKind::Root { root_char: '$' },
            TokenKind::Property {
                properties: vec!["store".to_string()],
            },
            TokenKind::ArrayIndex(ArrayIndexOperation::parse("[0]").expect("parse")),
        ]);
        assert!(definite.is_path_definite());

        let indefinite = chain(vec![
            TokenKind::Root { root_char: '$' },
            TokenKind::Wildcard,
            TokenKind::Property {
                properties: vec!["price".to_string()],
            },
        ]);
        assert!(!indefinite.is_path_definite());
    }

    #[test]
    fn multi_property_tokens_are_indefinite() {
        let token = PathToken::new(
            TokenKind::Property {
                properties: vec!["a".to_string(), "b".to_string()],
            },
            None,
        );
        assert!(!token.is_token_definite());
        assert_eq!(token.path_fragment(), "['a','b']");
    }

    #[test]
    fn chains_render_as_paths() {
        let token = chain(vec![
            TokenKind::Root { root_char: '$' },
            TokenKind::Scan,
            TokenKind::Property {
                properties: vec!["price".to_string()],
            },
        ]);
        assert_eq!(token.to_string(), "$..['price']");
    }
}
