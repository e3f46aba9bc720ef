//! Shared string helpers for the path and filter parsers

use crate::error::{JsonPathError, JsonPathResult};

/// Resolve backslash escapes in a quoted path or filter literal
///
/// Supports the JSON escape set (`\\`, `\/`, `\'`, `\"`, `\b`, `\f`,
/// `\n`, `\r`, `\t`) plus `\uXXXX` unicode escapes. Unknown escapes and
/// truncated unicode sequences are rejected.
pub fn unescape(input: &str) -> JsonPathResult<String> {
    if !input.contains('\\') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let escaped = chars
            .next()
            .ok_or_else(|| JsonPathError::syntax("dangling escape in string literal", 0))?;
        match escaped {
            '\\' => result.push('\\'),
            '/' => result.push('/'),
            '\'' => result.push('\''),
            '"' => result.push('"'),
            'b' => result.push('\u{0008}'),
            'f' => result.push('\u{000C}'),
            'n' => result.push('\n'),
            'r' => result.push('\r'),
            't' => result.push('\t'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return Err(JsonPathError::syntax(
                        "truncated unicode escape in string literal",
                        0,
                    ));
                }
                let code = u32::from_str_radix(&hex, 16).map_err(|_| {
                    JsonPathError::syntax(
                        format!("invalid unicode escape '\\u{hex}'"),
                        0,
                    )
                })?;
                let decoded = char::from_u32(code).ok_or_else(|| {
                    JsonPathError::syntax(
                        format!("invalid unicode code point '\\u{hex}'"),
                        0,
                    )
                })?;
                result.push(decoded);
            }
            other => {
                return Err(JsonPathError::syntax(
                    format!("unsupported escape '\\{other}' in string literal"),
                    0,
                ));
            }
        }
    }

    Ok(result)
}

/// Quote and escape a property name for use in a bracket accessor
#[must_use]
pub fn escape_property(property: &str) -> String {
    let mut escaped = String::with_capacity(property.len());
    for c in property.chars() {
        match c {
            '\'' => escaped.push_str("\\'"),
            '\\' => escaped.push_str("\\\\"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Rewrite single quoted strings inside a json literal to double quoted
/// ones, so `['a','b']` parses like `["a","b"]`
#[must_use]
pub fn normalize_json_literal(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(&next) = chars.peek() else {
                    normalized.push(c);
                    break;
                };
                chars.next();
                if next == '\'' && in_single {
                    normalized.push('\'');
                } else {
                    normalized.push('\\');
                    normalized.push(next);
                }
            }
            '\'' if !in_double => {
                in_single = !in_single;
                normalized.push('"');
            }
            '"' if in_single => {
                normalized.push_str("\\\"");
            }
            '"' if !in_single => {
                in_double = !in_double;
                normalized.push('"');
            }
            other => normalized.push(other),
        }
    }
    normalized
}
