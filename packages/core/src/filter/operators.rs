//! Relational and logical operators of the filter sub-language

use std::fmt;

use crate::error::{JsonPathError, JsonPathResult};

/// Binary operators usable between two filter operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOperator {
    /// `==` — equality with numeric coercion (`1 == 1.0` is true)
    Eq,
    /// `===` — type safe equality (`1 === 1.0` is false)
    Tseq,
    /// `!=`
    Ne,
    /// `!==`
    Tsne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// `=~` — regular expression match
    Regex,
    /// `IN` — left is contained in the right hand array
    In,
    /// `NIN` — left is not contained in the right hand array
    Nin,
    /// `CONTAINS` — left string or array contains right
    Contains,
    /// `ALL` — left array contains every element of the right hand array
    All,
    /// `SIZE` — length of left string or array equals right
    Size,
    /// `EXISTS` — existence check, both sides resolve to booleans
    Exists,
    /// `TYPE` — both sides have the same value type
    Type,
    /// `EMPTY` — left string, array or object emptiness equals right
    Empty,
    /// `SUBSETOF` — left array is a subset of the right hand array
    SubsetOf,
    /// `ANYOF` — left and right arrays intersect
    AnyOf,
    /// `NONEOF` — left and right arrays do not intersect
    NoneOf,
}

impl RelationalOperator {
    /// Resolve an operator token; word operators are case insensitive
    pub fn parse(token: &str, position: usize) -> JsonPathResult<Self> {
        let normalized = token.to_uppercase();
        let operator = match normalized.as_str() {
            "==" => Self::Eq,
            "===" => Self::Tseq,
            "!=" => Self::Ne,
            "!==" => Self::Tsne,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "=~" => Self::Regex,
            "IN" => Self::In,
            "NIN" => Self::Nin,
            "CONTAINS" => Self::Contains,
            "ALL" => Self::All,
            "SIZE" => Self::Size,
            "EXISTS" => Self::Exists,
            "TYPE" => Self::Type,
            "EMPTY" => Self::Empty,
            "SUBSETOF" => Self::SubsetOf,
            "ANYOF" => Self::AnyOf,
            "NONEOF" => Self::NoneOf,
            _ => {
                return Err(JsonPathError::syntax(
                    format!("filter operator '{token}' is not supported"),
                    position,
                ));
            }
        };
        Ok(operator)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Tseq => "===",
            Self::Ne => "!=",
            Self::Tsne => "!==",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Regex => "=~",
            Self::In => "IN",
            Self::Nin => "NIN",
            Self::Contains => "CONTAINS",
            Self::All => "ALL",
            Self::Size => "SIZE",
            Self::Exists => "EXISTS",
            Self::Type => "TYPE",
            Self::Empty => "EMPTY",
            Self::SubsetOf => "SUBSETOF",
            Self::AnyOf => "ANYOF",
            Self::NoneOf => "NONEOF",
        }
    }
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connectives between filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Not => "!",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
