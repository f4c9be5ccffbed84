//! Lexical primitives: stateless grammar recognizers that work directly on a
//! [`CharSource`].
//!
//! Each recognizer either consumes exactly what it recognizes or, when the
//! very first character does not fit, consumes nothing. Literals are the one
//! place where a mismatch after the first character is corruption rather
//! than absence.

use crate::{
    error::{DecodeError, SyntaxError},
    escape_buffer::{UnicodeEscapeBuffer, combine_surrogates, is_high_surrogate, unit_to_char},
    source::CharSource,
};

/// The four whitespace characters JSON allows between tokens.
#[inline]
pub(crate) fn is_json_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

impl CharSource<'_> {
    /// Builds the error signal for a violation at the current position.
    #[cold]
    pub(crate) fn syntax_error(&self, error: SyntaxError) -> DecodeError {
        DecodeError::Syntax {
            error,
            line: self.line(),
            column: self.column(),
        }
    }

    /// Consumes zero or more whitespace characters. With `allow_unicode`,
    /// anything Unicode classifies as whitespace is skipped too.
    pub fn skip_whitespace(&mut self, allow_unicode: bool) {
        while let Some(c) = self.peek() {
            if is_json_whitespace(c) || (allow_unicode && c.is_whitespace()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consumes the next character if it is `expected`.
    #[inline]
    pub fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Matches `literal` in full.
    ///
    /// Returns `Ok(false)` without consuming anything if the first character
    /// differs. Once the first character matched, any later mismatch or end
    /// of input is a grammar violation.
    pub fn match_literal(&mut self, literal: &'static str) -> Result<bool, DecodeError> {
        let mut expected = literal.chars();
        let Some(first) = expected.next() else {
            return Ok(true);
        };
        if !self.advance_if(first) {
            return Ok(false);
        }
        for want in expected {
            match self.peek() {
                Some(c) if c == want => {
                    self.advance();
                }
                Some(found) => {
                    return Err(self.syntax_error(SyntaxError::LiteralMismatch { literal, found }));
                }
                None => return Err(self.syntax_error(SyntaxError::EndOfInputInLiteral(literal))),
            }
        }
        Ok(true)
    }

    /// Consumes and returns an ASCII digit, if one is next.
    #[inline]
    pub fn read_digit(&mut self) -> Option<char> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                self.advance();
                Some(c)
            }
            _ => None,
        }
    }

    /// Consumes and returns an ASCII hexadecimal digit, if one is next.
    #[inline]
    pub fn read_hex_digit(&mut self) -> Option<char> {
        match self.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                self.advance();
                Some(c)
            }
            _ => None,
        }
    }

    /// Decodes the escape sequence following a backslash that has already
    /// been consumed.
    ///
    /// `\uXXXX` escapes naming a high surrogate must be followed by a second
    /// `\uXXXX` escape naming a low surrogate; the pair decodes to a single
    /// character.
    pub fn decode_escape(&mut self) -> Result<char, DecodeError> {
        let Some(c) = self.advance() else {
            return Err(self.syntax_error(SyntaxError::EndOfInputInEscape));
        };
        let decoded = match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let unit = self.read_unicode_unit()?;
                if is_high_surrogate(unit) {
                    if !(self.advance_if('\\') && self.advance_if('u')) {
                        return Err(self.syntax_error(SyntaxError::InvalidUnicodeEscapeSequence(
                            u32::from(unit),
                        )));
                    }
                    let low = self.read_unicode_unit()?;
                    combine_surrogates(unit, low).map_err(|e| self.syntax_error(e))?
                } else {
                    unit_to_char(unit).map_err(|e| self.syntax_error(e))?
                }
            }
            other => return Err(self.syntax_error(SyntaxError::InvalidEscape(other))),
        };
        Ok(decoded)
    }

    /// Reads the four hex digits of one `\u` escape.
    fn read_unicode_unit(&mut self) -> Result<u16, DecodeError> {
        let mut buffer = UnicodeEscapeBuffer::new();
        loop {
            let Some(digit) = self.read_hex_digit() else {
                let error = match self.peek() {
                    Some(c) => SyntaxError::InvalidUnicodeEscapeChar(c),
                    None => SyntaxError::EndOfInputInEscape,
                };
                return Err(self.syntax_error(error));
            };
            if let Some(unit) = buffer.feed(digit).map_err(|e| self.syntax_error(e))? {
                return Ok(unit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{error::SyntaxError, source::CharSource};

    fn literal(input: &str, literal: &'static str) -> Result<bool, SyntaxError> {
        CharSource::from_text(input)
            .match_literal(literal)
            .map_err(|e| e.syntax().cloned().expect("syntax error"))
    }

    #[rstest]
    #[case("null", "null")]
    #[case("nulllll", "null")]
    #[case("null, false", "null")]
    #[case("true", "true")]
    #[case("true,false", "true")]
    #[case("false", "false")]
    #[case("false,true", "false")]
    fn literal_matches(#[case] input: &str, #[case] lit: &'static str) {
        assert_eq!(literal(input, lit), Ok(true));
    }

    #[rstest]
    #[case("\"This is a string, not null\"", "null")]
    #[case("", "null")]
    #[case("false", "true")]
    #[case("null", "true")]
    #[case("", "true")]
    #[case("true", "false")]
    #[case("null", "false")]
    fn literal_absent(#[case] input: &str, #[case] lit: &'static str) {
        let mut source = CharSource::from_text(input);
        assert!(!source.match_literal(lit).unwrap());
        // Nothing was consumed.
        assert_eq!(source.peek(), input.chars().next());
    }

    #[rstest]
    #[case("notnull", "null")]
    #[case("throw", "true")]
    #[case("failed", "false")]
    fn literal_partial_match_is_corrupt(#[case] input: &str, #[case] lit: &'static str) {
        assert!(matches!(
            literal(input, lit),
            Err(SyntaxError::LiteralMismatch { .. })
        ));
    }

    #[rstest]
    #[case("nul", "null")]
    #[case("tru", "true")]
    #[case("fal", "false")]
    fn literal_truncated(#[case] input: &str, #[case] lit: &'static str) {
        assert_eq!(literal(input, lit), Err(SyntaxError::EndOfInputInLiteral(lit)));
    }

    #[test]
    fn whitespace_strict_and_unicode() {
        let mut source = CharSource::from_text(" \t\r\n\u{3000}x");
        source.skip_whitespace(false);
        assert_eq!(source.peek(), Some('\u{3000}'));
        source.skip_whitespace(true);
        assert_eq!(source.peek(), Some('x'));
        // Nothing to skip is still fine.
        source.skip_whitespace(true);
        assert_eq!(source.peek(), Some('x'));
    }

    #[test]
    fn digits() {
        let mut source = CharSource::from_text("7fg");
        assert_eq!(source.read_digit(), Some('7'));
        assert_eq!(source.read_digit(), None);
        assert_eq!(source.read_hex_digit(), Some('f'));
        assert_eq!(source.read_hex_digit(), None);
        assert_eq!(source.peek(), Some('g'));
    }

    #[rstest]
    #[case("\"", '"')]
    #[case("\\", '\\')]
    #[case("/", '/')]
    #[case("b", '\u{8}')]
    #[case("f", '\u{c}')]
    #[case("n", '\n')]
    #[case("r", '\r')]
    #[case("t", '\t')]
    #[case("u32a2", '\u{32a2}')]
    #[case("u0041", 'A')]
    #[case("ud83d\\ude00", '😀')]
    fn escapes(#[case] input: &str, #[case] expected: char) {
        let mut source = CharSource::from_text(input);
        assert_eq!(source.decode_escape().unwrap(), expected);
        assert_eq!(source.peek(), None);
    }

    #[rstest]
    #[case("a", SyntaxError::InvalidEscape('a'))]
    #[case(":", SyntaxError::InvalidEscape(':'))]
    #[case("u87\"", SyntaxError::InvalidUnicodeEscapeChar('"'))]
    #[case("uuuuu", SyntaxError::InvalidUnicodeEscapeChar('u'))]
    #[case("u12", SyntaxError::EndOfInputInEscape)]
    #[case("", SyntaxError::EndOfInputInEscape)]
    #[case("ud800x", SyntaxError::InvalidUnicodeEscapeSequence(0xD800))]
    #[case("udc00", SyntaxError::InvalidUnicodeEscapeSequence(0xDC00))]
    fn bad_escapes(#[case] input: &str, #[case] expected: SyntaxError) {
        let err = CharSource::from_text(input).decode_escape().unwrap_err();
        assert_eq!(err.syntax(), Some(&expected));
    }

    #[test]
    fn bad_unicode_digit_is_left_unconsumed() {
        let mut source = CharSource::from_text("u0g41");
        let err = source.decode_escape().unwrap_err();
        assert_eq!(err.syntax(), Some(&SyntaxError::InvalidUnicodeEscapeChar('g')));
        assert_eq!(err.position(), Some((1, 3)));
        assert_eq!(source.peek(), Some('g'));
    }
}
