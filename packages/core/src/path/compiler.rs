//! Scanner driven compiler from path text to a token chain
//!
//! One accessor is read per step: `.prop`, `..`, `.*`, bracketed
//! properties, index and slice lists, `[*]`, `[?(...)]` filters and a
//! tail function call. Malformed input fails fast with a syntax error
//! carrying the offending position; no partial chain escapes.

use crate::error::{JsonPathError, JsonPathResult};
use crate::filter::FilterCompiler;
use crate::functions::{Parameter, PathFunctionKind};
use crate::path::array_ops::{ArrayIndexOperation, ArraySliceOperation};
use crate::path::tokens::{PathToken, TokenKind};
use crate::path::CompiledPath;
use crate::scanner::CharacterIndex;
use crate::utils;

const DOC_CONTEXT: char = '$';
const EVAL_CONTEXT: char = '@';
const PERIOD: char = '.';
const SPACE: char = ' ';
const WILDCARD: char = '*';
const MINUS: char = '-';
const SPLIT: char = ':';
const COMMA: char = ',';
const OPEN_SQUARE_BRACKET: char = '[';
const CLOSE_SQUARE_BRACKET: char = ']';
const OPEN_PARENTHESIS: char = '(';
const CLOSE_PARENTHESIS: char = ')';
const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';
const BEGIN_FILTER: char = '?';

/// Compiles path text into a [`CompiledPath`]
pub struct PathCompiler {
    path: CharacterIndex,
}

impl PathCompiler {
    /// Compile a path rooted at `$` (document) or `@` (current item)
    pub fn compile(path_string: &str) -> JsonPathResult<CompiledPath> {
        let mut path = CharacterIndex::new(path_string);
        path.trim();
        let first = path.char_at_or(path.position(), '\0');
        if first != DOC_CONTEXT && first != EVAL_CONTEXT {
            return Err(JsonPathError::syntax(
                "path must start with '$' or '@'",
                path.position(),
            ));
        }
        if path.end_position() > path.position() + 1 && path.last_char_is(PERIOD) {
            return Err(JsonPathError::syntax(
                "path must not end with a '.' or '..'",
                path.end_position().saturating_sub(1),
            ));
        }
        let raw = path
            .string_from(path.position(), path.end_position());
        let mut compiler = Self { path };
        let kinds = compiler.read_context_token()?;
        let root = build_chain(kinds)?;
        Ok(CompiledPath::new(root, raw))
    }

    fn read_context_token(&mut self) -> JsonPathResult<Vec<TokenKind>> {
        let root_char = self.path.current_char();
        let mut tokens = vec![TokenKind::Root { root_char }];
        if !self.path.has_more_characters() {
            return Ok(tokens);
        }
        self.path.increment_position(1);
        if self.path.current_char() != PERIOD && self.path.current_char() != OPEN_SQUARE_BRACKET {
            return Err(JsonPathError::syntax(
                format!(
                    "illegal character '{}', expected '.' or '['",
                    self.path.current_char()
                ),
                self.path.position(),
            ));
        }
        self.read_next_token(&mut tokens)?;
        Ok(tokens)
    }

    fn read_next_token(&mut self, tokens: &mut Vec<TokenKind>) -> JsonPathResult<()> {
        match self.path.current_char() {
            OPEN_SQUARE_BRACKET => {
                if self.read_bracket_property_token(tokens)?
                    || self.read_array_token(tokens)?
                    || self.read_wildcard_token(tokens)?
                    || self.read_filter_token(tokens)?
                {
                    return Ok(());
                }
                Err(JsonPathError::syntax(
                    "could not parse bracket accessor",
                    self.path.position(),
                ))
            }
            PERIOD => self.read_dot_token(tokens),
            WILDCARD => {
                if self.read_wildcard_token(tokens)? {
                    return Ok(());
                }
                Err(JsonPathError::syntax(
                    "could not parse wildcard accessor",
                    self.path.position(),
                ))
            }
            _ => {
                if self.read_property_or_function_token(tokens)? {
                    return Ok(());
                }
                Err(JsonPathError::syntax(
                    "could not parse path accessor",
                    self.path.position(),
                ))
            }
        }
    }

    /// Continue with the next accessor unless the path ends here
    fn finish_token(&mut self, tokens: &mut Vec<TokenKind>) -> JsonPathResult<bool> {
        if self.path.position_at_end() {
            Ok(true)
        } else {
            self.read_next_token(tokens)?;
            Ok(true)
        }
    }

    fn read_dot_token(&mut self, tokens: &mut Vec<TokenKind>) -> JsonPathResult<()> {
        if self.path.current_char_is(PERIOD) && self.path.next_char_is(PERIOD) {
            tokens.push(TokenKind::Scan);
            self.path.increment_position(2);
        } else if !self.path.has_more_characters() {
            return Err(JsonPathError::syntax(
                "path must not end with a '.'",
                self.path.position(),
            ));
        } else {
            self.path.increment_position(1);
        }
        if self.path.current_char_is(PERIOD) {
            return Err(JsonPathError::syntax(
                "unexpected '.'",
                self.path.position(),
            ));
        }
        self.read_next_token(tokens)
    }

    fn read_property_or_function_token(
        &mut self,
        tokens: &mut Vec<TokenKind>,
    ) -> JsonPathResult<bool> {
        if self.path.current_char_is(OPEN_SQUARE_BRACKET)
            || self.path.current_char_is(WILDCARD)
            || self.path.current_char_is(PERIOD)
            || self.path.current_char_is(SPACE)
        {
            return Ok(false);
        }
        let start = self.path.position();
        let mut read_position = start;
        let mut end = None;
        let mut is_function = false;
        while self.path.is_in_bounds_index(read_position) {
            let c = self.path.char_at(read_position);
            if c == SPACE {
                return Err(JsonPathError::syntax(
                    "use bracket notation ['my prop'] if the property contains blanks",
                    read_position,
                ));
            } else if c == PERIOD || c == OPEN_SQUARE_BRACKET {
                end = Some(read_position);
                break;
            } else if c == OPEN_PARENTHESIS {
                is_function = true;
                end = Some(read_position);
                break;
            }
            read_position += 1;
        }
        let end = end.unwrap_or_else(|| self.path.end_position());
        let name = self.path.string_from(start, end);
        if name.is_empty() {
            return Ok(false);
        }

        if is_function {
            let kind = PathFunctionKind::parse(&name, start)?;
            let close = self
                .path
                .index_of_matching_close_char(end, OPEN_PARENTHESIS, CLOSE_PARENTHESIS, true, true)?;
            let inner = self.path.string_from(end + 1, close);
            let parameters = parse_function_parameters(&inner, end + 1)?;
            self.path.set_position(close + 1);
            if !self.path.position_at_end() {
                return Err(JsonPathError::syntax(
                    "a function call must be the last accessor of the path",
                    self.path.position(),
                ));
            }
            tokens.push(TokenKind::Function { kind, parameters });
            Ok(true)
        } else {
            self.path.set_position(end);
            tokens.push(TokenKind::Property {
                properties: vec![name],
            });
            self.finish_token(tokens)
        }
    }

    fn read_bracket_property_token(
        &mut self,
        tokens: &mut Vec<TokenKind>,
    ) -> JsonPathResult<bool> {
        if !self.path.current_char_is(OPEN_SQUARE_BRACKET) {
            return Ok(false);
        }
        let delimiter = self.path.next_significant_char();
        if delimiter != SINGLE_QUOTE && delimiter != DOUBLE_QUOTE {
            return Ok(false);
        }
        let mut properties: Vec<String> = Vec::new();
        let mut start = self.path.position() + 1;
        let mut read_position = start;
        let mut end = 0usize;
        let mut in_property = false;
        let mut in_escape = false;
        let mut last_significant_was_comma = false;
        while self.path.is_in_bounds_index(read_position) {
            let c = self.path.char_at(read_position);
            if in_escape {
                in_escape = false;
            } else if c == '\\' {
                in_escape = true;
            } else if c == CLOSE_SQUARE_BRACKET && !in_property {
                if last_significant_was_comma {
                    return Err(JsonPathError::syntax("found empty property", read_position));
                }
                break;
            } else if c == delimiter {
                if in_property {
                    let next_significant = self.path.next_significant_char_from_index(read_position);
                    if next_significant != CLOSE_SQUARE_BRACKET && next_significant != COMMA {
                        return Err(JsonPathError::syntax(
                            format!(
                                "property must be separated by comma or end with '{CLOSE_SQUARE_BRACKET}'"
                            ),
                            read_position,
                        ));
                    }
                    end = read_position;
                    properties.push(utils::unescape(&self.path.string_from(start, end))?);
                    in_property = false;
                } else {
                    start = read_position + 1;
                    in_property = true;
                    last_significant_was_comma = false;
                }
            } else if c == COMMA && !in_property {
                if last_significant_was_comma {
                    return Err(JsonPathError::syntax("found empty property", read_position));
                }
                last_significant_was_comma = true;
            }
            read_position += 1;
        }
        if in_property {
            return Err(JsonPathError::syntax(
                format!("property has not been closed - missing closing {delimiter}"),
                read_position,
            ));
        }
        let close_bracket = self
            .path
            .index_of_next_significant_char_from_index(CLOSE_SQUARE_BRACKET, end)
            .ok_or_else(|| JsonPathError::syntax("expected ']' after property list", end))?;
        self.path.set_position(close_bracket + 1);
        tokens.push(TokenKind::Property { properties });
        self.finish_token(tokens)
    }

    fn read_array_token(&mut self, tokens: &mut Vec<TokenKind>) -> JsonPathResult<bool> {
        if !self.path.current_char_is(OPEN_SQUARE_BRACKET) {
            return Ok(false);
        }
        let next_significant = self.path.next_significant_char();
        if !next_significant.is_ascii_digit() && next_significant != MINUS && next_significant != SPLIT
        {
            return Ok(false);
        }
        let begin = self.path.position() + 1;
        let Some(end) = self
            .path
            .next_index_of_char_from_index(CLOSE_SQUARE_BRACKET, self.path.position())
        else {
            return Ok(false);
        };
        let expression = self.path.string_from(begin, end).trim().to_string();
        if expression == "*" {
            return Ok(false);
        }
        for c in expression.chars() {
            if !c.is_ascii_digit() && !matches!(c, COMMA | MINUS | SPLIT | SPACE) {
                return Ok(false);
            }
        }
        if expression.contains(SPLIT) {
            tokens.push(TokenKind::ArraySlice(ArraySliceOperation::parse(&expression)?));
        } else {
            tokens.push(TokenKind::ArrayIndex(ArrayIndexOperation::parse(&expression)?));
        }
        self.path.set_position(end + 1);
        self.finish_token(tokens)
    }

    fn read_wildcard_token(&mut self, tokens: &mut Vec<TokenKind>) -> JsonPathResult<bool> {
        let in_bracket = self.path.current_char_is(OPEN_SQUARE_BRACKET);
        if in_bracket && !self.path.next_significant_char_is(WILDCARD) {
            return Ok(false);
        }
        if !self.path.current_char_is(WILDCARD) && !in_bracket {
            return Ok(false);
        }
        if in_bracket {
            let wildcard_index = self
                .path
                .index_of_next_significant_char(WILDCARD)
                .ok_or_else(|| {
                    JsonPathError::syntax("expected '*' in bracket", self.path.position())
                })?;
            let close_bracket = self
                .path
                .index_of_next_significant_char_from_index(CLOSE_SQUARE_BRACKET, wildcard_index)
                .ok_or_else(|| {
                    JsonPathError::syntax(
                        "expected wildcard accessor to end with ']'",
                        wildcard_index,
                    )
                })?;
            self.path.set_position(close_bracket + 1);
        } else {
            self.path.increment_position(1);
        }
        tokens.push(TokenKind::Wildcard);
        self.finish_token(tokens)
    }

    /// One or more comma separated `?(...)` filters in a bracket; all
    /// must hold for a candidate to pass
    fn read_filter_token(&mut self, tokens: &mut Vec<TokenKind>) -> JsonPathResult<bool> {
        if !self.path.current_char_is(OPEN_SQUARE_BRACKET)
            || !self.path.next_significant_char_is(BEGIN_FILTER)
        {
            return Ok(false);
        }
        let mut expressions = Vec::new();
        let mut cursor = self.path.position();
        loop {
            let question = self
                .path
                .index_of_next_significant_char_from_index(BEGIN_FILTER, cursor)
                .ok_or_else(|| JsonPathError::syntax("expected '?' in filter", cursor))?;
            let open_paren = self
                .path
                .index_of_next_significant_char_from_index(OPEN_PARENTHESIS, question)
                .ok_or_else(|| JsonPathError::syntax("expected '(' after '?'", question))?;
            let close_paren = self.path.index_of_matching_close_char(
                open_paren,
                OPEN_PARENTHESIS,
                CLOSE_PARENTHESIS,
                true,
                true,
            )?;
            let criteria = format!("[{}]", self.path.string_from(question, close_paren + 1));
            expressions.push(FilterCompiler::compile(&criteria)?);

            match self.path.next_significant_char_from_index(close_paren) {
                COMMA => {
                    cursor = self
                        .path
                        .index_of_next_significant_char_from_index(COMMA, close_paren)
                        .ok_or_else(|| {
                            JsonPathError::syntax("expected ',' after filter", close_paren)
                        })?;
                }
                CLOSE_SQUARE_BRACKET => {
                    let close_bracket = self
                        .path
                        .index_of_next_significant_char_from_index(
                            CLOSE_SQUARE_BRACKET,
                            close_paren,
                        )
                        .ok_or_else(|| {
                            JsonPathError::syntax("expected ']' after filter", close_paren)
                        })?;
                    self.path.set_position(close_bracket + 1);
                    break;
                }
                other => {
                    return Err(JsonPathError::syntax(
                        format!("expected ',' or ']' after filter expression, found '{other}'"),
                        close_paren,
                    ));
                }
            }
        }
        tokens.push(TokenKind::Predicate(expressions));
        self.finish_token(tokens)
    }
}

/// Split a parameter list on top level commas, honouring nesting and
/// string literals, then classify each argument
fn parse_function_parameters(inner: &str, position: usize) -> JsonPathResult<Vec<Parameter>> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string.is_some() => {
                current.push(c);
                escaped = true;
            }
            SINGLE_QUOTE | DOUBLE_QUOTE => {
                match in_string {
                    Some(open) if open == c => in_string = None,
                    None => in_string = Some(c),
                    _ => {}
                }
                current.push(c);
            }
            '(' | '[' | '{' if in_string.is_none() => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' if in_string.is_none() => {
                depth -= 1;
                current.push(c);
            }
            COMMA if in_string.is_none() && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);

    let mut parameters = Vec::with_capacity(parts.len());
    for part in parts {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            return Err(JsonPathError::syntax("empty function parameter", position));
        }
        if trimmed.starts_with(DOC_CONTEXT) || trimmed.starts_with(EVAL_CONTEXT) {
            let compiled = PathCompiler::compile(trimmed)?;
            parameters.push(Parameter::path(trimmed.to_string(), compiled));
        } else {
            let normalized = utils::normalize_json_literal(trimmed);
            let value: serde_json::Value = serde_json::from_str(&normalized).map_err(|err| {
                JsonPathError::syntax(
                    format!("could not parse function parameter '{trimmed}': {err}"),
                    position,
                )
            })?;
            parameters.push(Parameter::json(trimmed.to_string(), value));
        }
    }
    Ok(parameters)
}

/// Fold accessor kinds into the linked token chain
fn build_chain(kinds: Vec<TokenKind>) -> JsonPathResult<PathToken> {
    let mut token: Option<PathToken> = None;
    for kind in kinds.into_iter().rev() {
        token = Some(PathToken::new(kind, token.map(Box::new)));
    }
    token.ok_or_else(|| JsonPathError::syntax("empty path", 0))
}
