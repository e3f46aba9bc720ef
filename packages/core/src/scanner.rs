//! Character scanner backing the path and filter parsers
//!
//! [`CharacterIndex`] wraps an immutable string and exposes a mutable
//! read cursor plus a mutable right bound, so parsers can trim and
//! sub-scan without copying. All indexed access is bounds guarded;
//! out-of-bounds reads return a caller supplied default instead of
//! failing. Bracket matching and unescaped-character search understand
//! quoted string literals and regex literals so their interior
//! characters never unbalance a scan.

use crate::error::{JsonPathError, JsonPathResult};

const SPACE: char = ' ';
const ESCAPE: char = '\\';
const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';
const REGEX_DELIMITER: char = '/';
const CLOSE_SQUARE_BRACKET: char = ']';

/// Cursor over an immutable string with a movable right bound
#[derive(Debug, Clone)]
pub struct CharacterIndex {
    chars: Vec<char>,
    source: String,
    position: usize,
    /// Exclusive upper bound of the readable region
    end_position: usize,
}

impl CharacterIndex {
    #[must_use]
    pub fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let end_position = chars.len();
        Self {
            chars,
            source: source.to_string(),
            position: 0,
            end_position,
        }
    }

    /// Total number of characters in the wrapped string
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    #[inline]
    #[must_use]
    pub fn end_position(&self) -> usize {
        self.end_position
    }

    #[inline]
    pub fn set_end_position(&mut self, end_position: usize) {
        self.end_position = end_position;
    }

    /// True while the cursor addresses a readable character
    #[inline]
    #[must_use]
    pub fn in_bounds(&self) -> bool {
        self.position < self.end_position
    }

    #[inline]
    #[must_use]
    pub fn is_in_bounds_index(&self, index: usize) -> bool {
        index < self.end_position
    }

    #[inline]
    #[must_use]
    pub fn is_out_of_bounds_index(&self, index: usize) -> bool {
        !self.is_in_bounds_index(index)
    }

    /// True when at least one character follows the cursor
    #[inline]
    #[must_use]
    pub fn has_more_characters(&self) -> bool {
        self.is_in_bounds_index(self.position + 1)
    }

    #[inline]
    #[must_use]
    pub fn position_at_end(&self) -> bool {
        self.position >= self.end_position
    }

    /// Character at `index`, or `'\0'` when out of bounds
    #[inline]
    #[must_use]
    pub fn char_at(&self, index: usize) -> char {
        self.char_at_or(index, '\0')
    }

    /// Character at `index`, or `default` when out of bounds
    #[inline]
    #[must_use]
    pub fn char_at_or(&self, index: usize, default: char) -> char {
        if self.is_in_bounds_index(index) {
            self.chars.get(index).copied().unwrap_or(default)
        } else {
            default
        }
    }

    #[inline]
    #[must_use]
    pub fn current_char(&self) -> char {
        self.char_at(self.position)
    }

    #[inline]
    #[must_use]
    pub fn current_char_is(&self, c: char) -> bool {
        self.in_bounds() && self.current_char() == c
    }

    /// True when the last readable character equals `c`
    #[inline]
    #[must_use]
    pub fn last_char_is(&self, c: char) -> bool {
        self.end_position > 0 && self.char_at(self.end_position - 1) == c
    }

    #[inline]
    #[must_use]
    pub fn next_char_is(&self, c: char) -> bool {
        self.is_in_bounds_index(self.position + 1) && self.char_at(self.position + 1) == c
    }

    /// Advance the cursor and return the new position
    #[inline]
    pub fn increment_position(&mut self, count: usize) -> usize {
        self.position += count;
        self.position
    }

    /// Shrink the readable region from the right and return the new bound
    #[inline]
    pub fn decrement_end_position(&mut self, count: usize) -> usize {
        self.end_position = self.end_position.saturating_sub(count);
        self.end_position
    }

    /// Forward scan for an unnested `]` starting at `start_position`
    #[must_use]
    pub fn index_of_closing_square_bracket(&self, start_position: usize) -> Option<usize> {
        let mut read_position = start_position;
        while self.is_in_bounds_index(read_position) {
            if self.char_at(read_position) == CLOSE_SQUARE_BRACKET {
                return Some(read_position);
            }
            read_position += 1;
        }
        None
    }

    /// Index of the close character matching the open character at
    /// `start_position`, honouring nesting depth
    ///
    /// With `skip_strings` / `skip_regex` set, quoted string literals and
    /// `/regex/` literals are treated as opaque: their interior characters
    /// do not affect nesting. Fails with a syntax error when no match is
    /// found before the end of the readable region.
    pub fn index_of_matching_close_char(
        &self,
        start_position: usize,
        open_char: char,
        close_char: char,
        skip_strings: bool,
        skip_regex: bool,
    ) -> JsonPathResult<usize> {
        if self.char_at(start_position) != open_char {
            return Err(JsonPathError::syntax(
                format!("expected '{open_char}' but found '{}'", self.char_at(start_position)),
                start_position,
            ));
        }

        let mut opened = 1usize;
        let mut read_position = start_position + 1;

        while self.is_in_bounds_index(read_position) {
            if skip_strings {
                let quote_char = self.char_at(read_position);
                if quote_char == SINGLE_QUOTE || quote_char == DOUBLE_QUOTE {
                    read_position = self
                        .next_index_of_unescaped_char_from_index(quote_char, read_position)
                        .ok_or_else(|| {
                            JsonPathError::syntax(
                                format!("could not find matching close quote for {quote_char}"),
                                read_position,
                            )
                        })?;
                    read_position += 1;
                }
            }
            if skip_regex && self.char_at(read_position) == REGEX_DELIMITER {
                read_position = self
                    .next_index_of_unescaped_char_from_index(REGEX_DELIMITER, read_position)
                    .ok_or_else(|| {
                        JsonPathError::syntax(
                            "could not find matching close for '/' when parsing regex",
                            read_position,
                        )
                    })?;
                read_position += 1;
            }

            if self.char_at(read_position) == open_char {
                opened += 1;
            }
            if self.char_at(read_position) == close_char {
                opened -= 1;
                if opened == 0 {
                    return Ok(read_position);
                }
            }
            read_position += 1;
        }

        Err(JsonPathError::syntax(
            format!("unmatched '{open_char}'"),
            start_position,
        ))
    }

    /// Bracket matching for `(`/`)` pairs, see [`Self::index_of_matching_close_char`]
    pub fn index_of_closing_bracket(
        &self,
        start_position: usize,
        skip_strings: bool,
        skip_regex: bool,
    ) -> JsonPathResult<usize> {
        self.index_of_matching_close_char(start_position, '(', ')', skip_strings, skip_regex)
    }

    #[must_use]
    pub fn next_index_of_char(&self, c: char) -> Option<usize> {
        self.next_index_of_char_from_index(c, self.position)
    }

    /// Index of the next occurrence of `c` strictly after `start_position`
    #[must_use]
    pub fn next_index_of_char_from_index(&self, c: char, start_position: usize) -> Option<usize> {
        let mut read_position = start_position + 1;
        while self.is_in_bounds_index(read_position) {
            if self.char_at(read_position) == c {
                return Some(read_position);
            }
            read_position += 1;
        }
        None
    }

    #[must_use]
    pub fn next_index_of_unescaped_char(&self, c: char) -> Option<usize> {
        self.next_index_of_unescaped_char_from_index(c, self.position)
    }

    /// Like [`Self::next_index_of_char_from_index`] but skips any character
    /// preceded by a backslash
    #[must_use]
    pub fn next_index_of_unescaped_char_from_index(
        &self,
        c: char,
        start_position: usize,
    ) -> Option<usize> {
        let mut read_position = start_position + 1;
        let mut in_escape = false;
        while self.is_in_bounds_index(read_position) {
            if in_escape {
                in_escape = false;
            } else if self.char_at(read_position) == ESCAPE {
                in_escape = true;
            } else if self.char_at(read_position) == c {
                return Some(read_position);
            }
            read_position += 1;
        }
        None
    }

    #[must_use]
    pub fn index_of_next_significant_char(&self, c: char) -> Option<usize> {
        self.index_of_next_significant_char_from_index(c, self.position)
    }

    /// Index of `c` if it is the next non-blank character after `start_position`
    #[must_use]
    pub fn index_of_next_significant_char_from_index(
        &self,
        c: char,
        start_position: usize,
    ) -> Option<usize> {
        let mut read_position = start_position + 1;
        while self.is_in_bounds_index(read_position) && self.char_at(read_position) == SPACE {
            read_position += 1;
        }
        if self.is_in_bounds_index(read_position) && self.char_at(read_position) == c {
            Some(read_position)
        } else {
            None
        }
    }

    /// Next non-blank character after the cursor, `' '` when none remains
    #[must_use]
    pub fn next_significant_char(&self) -> char {
        self.next_significant_char_from_index(self.position)
    }

    #[must_use]
    pub fn next_significant_char_from_index(&self, start_position: usize) -> char {
        let mut read_position = start_position + 1;
        while self.is_in_bounds_index(read_position) && self.char_at(read_position) == SPACE {
            read_position += 1;
        }
        if self.is_in_bounds_index(read_position) {
            self.char_at(read_position)
        } else {
            SPACE
        }
    }

    #[must_use]
    pub fn next_significant_char_is(&self, c: char) -> bool {
        self.next_significant_char_is_from_index(c, self.position)
    }

    #[must_use]
    pub fn next_significant_char_is_from_index(&self, c: char, start_position: usize) -> bool {
        self.next_significant_char_from_index(start_position) == c
    }

    /// Skip blanks, then consume `c` or fail with a syntax error
    pub fn read_significant_char(&mut self, c: char) -> JsonPathResult<()> {
        if self.skip_blanks().current_char() != c {
            return Err(JsonPathError::syntax(
                format!("expected character '{c}' but found '{}'", self.current_char()),
                self.position,
            ));
        }
        self.increment_position(1);
        Ok(())
    }

    /// Skip blanks, then consume `expected` if it is next; true on success
    pub fn has_significant_string(&mut self, expected: &str) -> bool {
        self.skip_blanks();
        let len = expected.chars().count();
        if len == 0 || !self.is_in_bounds_index(self.position + len - 1) {
            return false;
        }
        if self.string_from(self.position, self.position + len) != expected {
            return false;
        }
        self.increment_position(len);
        true
    }

    #[must_use]
    pub fn index_of_previous_significant_char(&self) -> Option<usize> {
        self.index_of_previous_significant_char_from_index(self.position)
    }

    /// Index of the closest non-blank character strictly before `start_position`
    #[must_use]
    pub fn index_of_previous_significant_char_from_index(
        &self,
        start_position: usize,
    ) -> Option<usize> {
        let mut read_position = start_position;
        while read_position > 0 {
            read_position -= 1;
            if self.char_at(read_position) != SPACE {
                return Some(read_position);
            }
        }
        None
    }

    /// Previous non-blank character, `' '` when none exists
    #[must_use]
    pub fn previous_significant_char(&self) -> char {
        self.previous_significant_char_from_index(self.position)
    }

    #[must_use]
    pub fn previous_significant_char_from_index(&self, start_position: usize) -> char {
        match self.index_of_previous_significant_char_from_index(start_position) {
            Some(index) => self.char_at(index),
            None => SPACE,
        }
    }

    /// Substring over `[start, end)`
    #[must_use]
    pub fn string_from(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }
        self.chars[start..end].iter().collect()
    }

    /// The complete wrapped string
    #[must_use]
    pub fn string_value(&self) -> &str {
        &self.source
    }

    /// True when the character at `read_position` can be part of a number
    /// literal (digit, sign, decimal point or exponent marker)
    #[must_use]
    pub fn is_number_character(&self, read_position: usize) -> bool {
        let c = self.char_at(read_position);
        c.is_ascii_digit() || c == '-' || c == '+' || c == '.' || c == 'e' || c == 'E'
    }

    /// Move the cursor past any run of blanks; returns self for chaining
    pub fn skip_blanks(&mut self) -> &mut Self {
        while self.in_bounds() && self.current_char() == SPACE {
            self.increment_position(1);
        }
        self
    }

    /// Shrink the right bound past any trailing run of blanks
    pub fn skip_blanks_at_end(&mut self) -> &mut Self {
        while self.in_bounds() && self.last_char_is(SPACE) {
            self.decrement_end_position(1);
        }
        self
    }

    /// Trim blanks on both ends of the readable region
    pub fn trim(&mut self) -> &mut Self {
        self.skip_blanks().skip_blanks_at_end()
    }
}
