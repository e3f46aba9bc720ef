//! Recursive descent compiler for `[?(...)]` filter expressions
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! filter      = "[?(" or ")]"
//! or          = and ( "||" and )*
//! and         = operand ( "&&" operand )*
//! operand     = "!" operand | "(" or ")" | expression
//! expression  = value ( operator value )?
//! value       = path | literal
//! ```
//!
//! A bare path with no operator compiles into an existence check, so
//! `[?(@.isbn)]` selects items carrying an `isbn` property and
//! `[?(!@.isbn)]` the items without one.

use regex::Regex;

use crate::error::{JsonPathError, JsonPathResult};
use crate::filter::operators::RelationalOperator;
use crate::filter::value_node::{PathNode, PatternNode, ValueNode};
use crate::filter::{ExpressionNode, LogicalExpressionNode, RelationalExpressionNode};
use crate::path::compiler::PathCompiler;
use crate::scanner::CharacterIndex;
use crate::utils;

const DOC_CONTEXT: char = '$';
const EVAL_CONTEXT: char = '@';
const NOT: char = '!';
const OPEN_PARENTHESIS: char = '(';
const CLOSE_PARENTHESIS: char = ')';
const OPEN_SQUARE_BRACKET: char = '[';
const CLOSE_SQUARE_BRACKET: char = ']';
const OPEN_OBJECT: char = '{';
const CLOSE_OBJECT: char = '}';
const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';
const PATTERN: char = '/';
const SPACE: char = ' ';
const PERIOD: char = '.';
const MINUS: char = '-';
const AND: &str = "&&";
const OR: &str = "||";

fn is_relational_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!' | '~')
}

/// Compiles one bracketed filter accessor into an expression tree
pub struct FilterCompiler {
    filter: CharacterIndex,
}

impl FilterCompiler {
    /// Compile a complete `[?(...)]` accessor
    pub fn compile(filter_string: &str) -> JsonPathResult<ExpressionNode> {
        let mut compiler = Self::new(filter_string)?;
        let result = compiler.read_logical_or()?;
        compiler.filter.skip_blanks();
        if compiler.filter.in_bounds() {
            return Err(JsonPathError::syntax(
                format!(
                    "expected end of filter expression instead of '{}'",
                    compiler
                        .filter
                        .string_from(compiler.filter.position(), compiler.filter.end_position())
                ),
                compiler.filter.position(),
            ));
        }
        Ok(result)
    }

    fn new(filter_string: &str) -> JsonPathResult<Self> {
        let mut filter = CharacterIndex::new(filter_string);
        filter.skip_blanks();
        if !filter.current_char_is(OPEN_SQUARE_BRACKET) || !filter.last_char_is(CLOSE_SQUARE_BRACKET)
        {
            return Err(JsonPathError::syntax(
                format!("filter must start with '[' and end with ']': {filter_string}"),
                filter.position(),
            ));
        }
        filter.increment_position(1);
        filter.decrement_end_position(1);
        filter.skip_blanks();
        if !filter.current_char_is('?') {
            return Err(JsonPathError::syntax(
                format!("filter must start with '[?(' and end with ')]': {filter_string}"),
                filter.position(),
            ));
        }
        filter.increment_position(1);
        filter.skip_blanks();
        if !filter.current_char_is(OPEN_PARENTHESIS) || !filter.last_char_is(CLOSE_PARENTHESIS) {
            return Err(JsonPathError::syntax(
                format!("filter must start with '[?(' and end with ')]': {filter_string}"),
                filter.position(),
            ));
        }
        Ok(Self { filter })
    }

    fn read_logical_or(&mut self) -> JsonPathResult<ExpressionNode> {
        let mut ops = vec![self.read_logical_and()?];
        loop {
            let savepoint = self.filter.position();
            if self.filter.has_significant_string(OR) {
                ops.push(self.read_logical_and()?);
            } else {
                self.filter.set_position(savepoint);
                break;
            }
        }
        if ops.len() == 1 {
            Ok(ops.remove(0))
        } else {
            Ok(ExpressionNode::Logical(LogicalExpressionNode::or(ops)))
        }
    }

    fn read_logical_and(&mut self) -> JsonPathResult<ExpressionNode> {
        let mut ops = vec![self.read_logical_and_operand()?];
        loop {
            let savepoint = self.filter.position();
            if self.filter.has_significant_string(AND) {
                ops.push(self.read_logical_and_operand()?);
            } else {
                self.filter.set_position(savepoint);
                break;
            }
        }
        if ops.len() == 1 {
            Ok(ops.remove(0))
        } else {
            Ok(ExpressionNode::Logical(LogicalExpressionNode::and(ops)))
        }
    }

    fn read_logical_and_operand(&mut self) -> JsonPathResult<ExpressionNode> {
        let savepoint = self.filter.skip_blanks().position();
        if self.filter.skip_blanks().current_char_is(NOT) {
            self.filter.read_significant_char(NOT)?;
            match self.filter.skip_blanks().current_char() {
                // negation over a path carries into read_expression as polarity
                DOC_CONTEXT | EVAL_CONTEXT => {
                    self.filter.set_position(savepoint);
                }
                _ => {
                    let op = self.read_logical_and_operand()?;
                    return Ok(ExpressionNode::Logical(LogicalExpressionNode::not(op)));
                }
            }
        }
        if self.filter.skip_blanks().current_char_is(OPEN_PARENTHESIS) {
            let open = self.filter.position();
            let close = self.filter.index_of_closing_bracket(open, true, true)?;
            let outer_end = self.filter.end_position();
            self.filter.set_position(open + 1);
            self.filter.set_end_position(close);
            let op = self.read_logical_or()?;
            self.filter.skip_blanks();
            if self.filter.in_bounds() {
                return Err(JsonPathError::syntax(
                    format!(
                        "expected ')' instead of '{}'",
                        self.filter
                            .string_from(self.filter.position(), self.filter.end_position())
                    ),
                    self.filter.position(),
                ));
            }
            self.filter.set_end_position(outer_end);
            self.filter.set_position(close + 1);
            return Ok(op);
        }
        self.read_expression()
    }

    fn read_expression(&mut self) -> JsonPathResult<ExpressionNode> {
        let left = self.read_value_node()?;
        self.filter.skip_blanks();
        // a path with nothing after it is an existence check
        if !self.filter.in_bounds() || self.at_logical_connective() {
            let path_node = left.as_path_node().ok_or_else(|| {
                JsonPathError::syntax(
                    "expected a relational expression or a path",
                    self.filter.position(),
                )
            })?;
            let should_exist = path_node.should_exist();
            let exists_left = ValueNode::Path(path_node.as_exists_check(should_exist));
            let exists_right = ValueNode::Boolean(should_exist);
            return Ok(ExpressionNode::Relational(RelationalExpressionNode::new(
                exists_left,
                RelationalOperator::Exists,
                exists_right,
            )));
        }
        let negated = left.as_path_node().is_some_and(|node| !node.should_exist());
        let operator = self.read_relational_operator()?;
        let right = self.read_value_node()?;
        let relation =
            ExpressionNode::Relational(RelationalExpressionNode::new(left, operator, right));
        if negated {
            // `!@.a == 1` negates the whole comparison
            Ok(ExpressionNode::Logical(LogicalExpressionNode::not(relation)))
        } else {
            Ok(relation)
        }
    }

    fn at_logical_connective(&mut self) -> bool {
        let savepoint = self.filter.position();
        let found = self.filter.has_significant_string(AND) || {
            self.filter.set_position(savepoint);
            self.filter.has_significant_string(OR)
        };
        self.filter.set_position(savepoint);
        found
    }

    fn read_relational_operator(&mut self) -> JsonPathResult<RelationalOperator> {
        let begin = self.filter.skip_blanks().position();
        if is_relational_operator_char(self.filter.current_char()) {
            while self.filter.in_bounds() && is_relational_operator_char(self.filter.current_char())
            {
                self.filter.increment_position(1);
            }
        } else {
            while self.filter.in_bounds() && self.filter.current_char() != SPACE {
                self.filter.increment_position(1);
            }
        }
        let token = self.filter.string_from(begin, self.filter.position());
        RelationalOperator::parse(&token, begin)
    }

    fn read_value_node(&mut self) -> JsonPathResult<ValueNode> {
        match self.filter.skip_blanks().current_char() {
            DOC_CONTEXT | EVAL_CONTEXT => self.read_path(true),
            NOT => {
                self.filter.increment_position(1);
                match self.filter.skip_blanks().current_char() {
                    DOC_CONTEXT | EVAL_CONTEXT => self.read_path(false),
                    _ => Err(JsonPathError::syntax(
                        "unexpected character '!'",
                        self.filter.position(),
                    )),
                }
            }
            _ => self.read_literal(),
        }
    }

    fn read_path(&mut self, should_exist: bool) -> JsonPathResult<ValueNode> {
        let begin = self.filter.position();
        self.filter.increment_position(1);
        while self.filter.in_bounds() {
            if self.filter.current_char() == OPEN_SQUARE_BRACKET {
                let close = self.filter.index_of_matching_close_char(
                    self.filter.position(),
                    OPEN_SQUARE_BRACKET,
                    CLOSE_SQUARE_BRACKET,
                    true,
                    false,
                )?;
                self.filter.set_position(close + 1);
            }
            let closing_function_bracket = self.filter.current_char() == CLOSE_PARENTHESIS
                && self.current_char_is_closing_function_bracket(begin);
            if !self.filter.in_bounds()
                || is_relational_operator_char(self.filter.current_char())
                || self.filter.current_char() == SPACE
                || closing_function_bracket
            {
                break;
            }
            self.filter.increment_position(1);
        }
        let path = self.filter.string_from(begin, self.filter.position());
        let compiled = PathCompiler::compile(&path)?;
        Ok(ValueNode::Path(PathNode::new(compiled, false, should_exist)))
    }

    /// Distinguish a `)` closing a function call inside the path, like
    /// `@.keys()`, from the `)` that ends the filter statement
    fn current_char_is_closing_function_bracket(&self, lower_bound: usize) -> bool {
        if self.filter.current_char() != CLOSE_PARENTHESIS {
            return false;
        }
        let Some(mut idx) = self
            .filter
            .index_of_previous_significant_char_from_index(self.filter.position())
        else {
            return false;
        };
        if self.filter.char_at(idx) != OPEN_PARENTHESIS {
            return false;
        }
        while idx > lower_bound {
            idx -= 1;
            if self.filter.char_at(idx) == PERIOD {
                return true;
            }
        }
        false
    }

    fn read_literal(&mut self) -> JsonPathResult<ValueNode> {
        match self.filter.skip_blanks().current_char() {
            SINGLE_QUOTE => self.read_string_literal(SINGLE_QUOTE),
            DOUBLE_QUOTE => self.read_string_literal(DOUBLE_QUOTE),
            't' | 'f' => self.read_boolean_literal(),
            'n' => self.read_null_literal(),
            OPEN_OBJECT => self.read_json_literal(OPEN_OBJECT, CLOSE_OBJECT),
            OPEN_SQUARE_BRACKET => self.read_json_literal(OPEN_SQUARE_BRACKET, CLOSE_SQUARE_BRACKET),
            PATTERN => self.read_pattern(),
            MINUS => self.read_number_literal(),
            _ => self.read_number_literal(),
        }
    }

    fn read_string_literal(&mut self, open: char) -> JsonPathResult<ValueNode> {
        let begin = self.filter.position();
        let close = self
            .filter
            .next_index_of_unescaped_char_from_index(open, begin)
            .ok_or_else(|| {
                JsonPathError::syntax(
                    format!("string literal does not have a matching closing quote {open}"),
                    begin,
                )
            })?;
        self.filter.set_position(close + 1);
        let raw = self.filter.string_from(begin + 1, close);
        Ok(ValueNode::String(utils::unescape(&raw)?))
    }

    fn read_boolean_literal(&mut self) -> JsonPathResult<ValueNode> {
        let begin = self.filter.position();
        let expected_end = if self.filter.current_char() == 't' {
            begin + 4
        } else {
            begin + 5
        };
        let token = self.filter.string_from(begin, expected_end);
        if token != "true" && token != "false" {
            return Err(JsonPathError::syntax("expected boolean literal", begin));
        }
        self.filter.set_position(expected_end);
        Ok(ValueNode::Boolean(token == "true"))
    }

    fn read_null_literal(&mut self) -> JsonPathResult<ValueNode> {
        let begin = self.filter.position();
        if self.filter.string_from(begin, begin + 4) == "null" {
            self.filter.set_position(begin + 4);
            Ok(ValueNode::Null)
        } else {
            Err(JsonPathError::syntax("expected 'null' literal", begin))
        }
    }

    fn read_number_literal(&mut self) -> JsonPathResult<ValueNode> {
        let begin = self.filter.position();
        while self.filter.in_bounds() && self.filter.is_number_character(self.filter.position()) {
            self.filter.increment_position(1);
        }
        let raw = self.filter.string_from(begin, self.filter.position());
        let value: f64 = raw.parse().map_err(|_| {
            JsonPathError::syntax(format!("expected a number literal, found '{raw}'"), begin)
        })?;
        Ok(ValueNode::Number { raw, value })
    }

    fn read_json_literal(&mut self, open: char, close: char) -> JsonPathResult<ValueNode> {
        let begin = self.filter.position();
        let close_index = self
            .filter
            .index_of_matching_close_char(begin, open, close, true, false)?;
        self.filter.set_position(close_index + 1);
        let raw = self.filter.string_from(begin, close_index + 1);
        let normalized = utils::normalize_json_literal(&raw);
        let parsed: serde_json::Value = serde_json::from_str(&normalized).map_err(|err| {
            JsonPathError::syntax(format!("could not parse json literal '{raw}': {err}"), begin)
        })?;
        Ok(ValueNode::Json(parsed))
    }

    fn read_pattern(&mut self) -> JsonPathResult<ValueNode> {
        let begin = self.filter.position();
        let close = self
            .filter
            .next_index_of_unescaped_char_from_index(PATTERN, begin)
            .ok_or_else(|| {
                JsonPathError::syntax("pattern literal does not have a closing '/'", begin)
            })?;
        let mut flags_end = close + 1;
        while self.filter.is_in_bounds_index(flags_end)
            && self.filter.char_at(flags_end).is_ascii_alphabetic()
        {
            flags_end += 1;
        }
        self.filter.set_position(flags_end);

        let pattern = self.filter.string_from(begin + 1, close);
        let flags = self.filter.string_from(close + 1, flags_end);
        let mut inline_flags = String::new();
        for flag in flags.chars() {
            match flag {
                'i' | 'm' | 's' | 'x' => inline_flags.push(flag),
                // unicode matching is the default, these carry no meaning here
                'u' | 'U' | 'd' => {}
                other => {
                    return Err(JsonPathError::syntax(
                        format!("unsupported pattern flag '{other}'"),
                        close + 1,
                    ));
                }
            }
        }
        let full_pattern = if inline_flags.is_empty() {
            pattern.clone()
        } else {
            format!("(?{inline_flags}){pattern}")
        };
        let regex = Regex::new(&full_pattern).map_err(|err| {
            JsonPathError::syntax(format!("invalid pattern '{pattern}': {err}"), begin)
        })?;
        let raw = self.filter.string_from(begin, flags_end);
        Ok(ValueNode::Pattern(PatternNode::new(raw, regex)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(filter: &str) -> ExpressionNode {
        FilterCompiler::compile(filter).expect("filter should compile")
    }

    #[test]
    fn simple_comparison_compiles() {
        let expr = compile("[?(@.price < 10)]");
        assert_eq!(expr.to_string(), "@.price < 10");
    }

    #[test]
    fn bare_path_becomes_exists_check() {
        let expr = compile("[?(@.isbn)]");
        assert_eq!(expr.to_string(), "@.isbn EXISTS true");
    }

    #[test]
    fn negated_path_becomes_negated_exists_check() {
        let expr = compile("[?(!@.isbn)]");
        assert_eq!(expr.to_string(), "!@.isbn EXISTS false");
    }

    #[test]
    fn logical_operators_nest() {
        let expr = compile("[?(@.a == 1 && (@.b == 2 || @.c == 3))]");
        assert_eq!(expr.to_string(), "(@.a == 1 && (@.b == 2 || @.c == 3))");
    }

    #[test]
    fn not_inverts_a_group() {
        let expr = compile("[?(!(@.a == 1))]");
        assert_eq!(expr.to_string(), "!(@.a == 1)");
    }

    #[test]
    fn word_operators_compile() {
        let expr = compile("[?(@.category in ['fiction','reference'])]");
        assert_eq!(expr.to_string(), "@.category IN [\"fiction\",\"reference\"]");
    }

    #[test]
    fn pattern_literal_compiles_with_flags() {
        let expr = compile("[?(@.name =~ /^j.*n$/i)]");
        assert_eq!(expr.to_string(), "@.name =~ /^j.*n$/i");
    }

    #[test]
    fn string_literals_support_escapes() {
        let expr = compile(r"[?(@.title == 'it\'s')]");
        assert_eq!(expr.to_string(), r"@.title == 'it\'s'");
    }

    #[test]
    fn rooted_sub_paths_compile() {
        let expr = compile("[?(@.price <= $.expensive)]");
        assert_eq!(expr.to_string(), "@.price <= $.expensive");
    }

    #[test]
    fn bracketed_sub_paths_keep_their_brackets() {
        let expr = compile("[?(@['a b'] == 1)]");
        assert_eq!(expr.to_string(), "@['a b'] == 1");
    }

    #[test]
    fn malformed_filters_are_rejected() {
        assert!(FilterCompiler::compile("[?(@.a == )]").is_err());
        assert!(FilterCompiler::compile("[?(@.a == 1").is_err());
        assert!(FilterCompiler::compile("[(@.a == 1)]").is_err());
        assert!(FilterCompiler::compile("[?(@.a === = 1)]").is_err());
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(FilterCompiler::compile("[?(@.a == 1 @.b)]").is_err());
    }

    #[test]
    fn garbage_inside_a_group_is_rejected() {
        assert!(FilterCompiler::compile("[?((@.a == 1 @.b))]").is_err());
        assert!(FilterCompiler::compile("[?((@.a == 1) @.b)]").is_err());
    }

    #[test]
    fn negation_applies_to_the_whole_comparison() {
        let expr = compile("[?(!@.a == 1)]");
        assert_eq!(expr.to_string(), "!(@.a == 1)");
    }
}
