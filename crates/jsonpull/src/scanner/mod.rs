//! Scanner: JSON token readers over a [`CharSource`].
//!
//! What it does
//! - Reads one token per call: literals, numbers, strings and the six
//!   structural characters. Whitespace is skipped only when asked for.
//! - Assembles number and string literals into a scratch buffer that is
//!   cleared, never reallocated, before each literal. Returned `&str`s borrow
//!   that buffer and are valid until the next token read.
//! - Skips whole values (including nested arrays and objects) without
//!   materializing them.
//!
//! Every reader reports absence (`Ok(None)` / `Ok(false)`) when the first
//! character cannot start its token, leaving the cursor untouched. Once a
//! token has started, a malformed remainder is an error.
//!
//! Invariants
//! - The scratch buffer belongs to one scanner and one input; it is never
//!   shared between decodes.
//! - Nesting depth is tracked here for both decoding and skipping, so the
//!   limit in [`DecoderOptions::max_depth`] bounds recursion either way.

use core::str::FromStr;

use crate::{
    error::{DecodeError, SyntaxError},
    options::DecoderOptions,
    source::CharSource,
};

/// Token reader owning a cursor and its scratch buffer.
#[derive(Debug)]
pub struct Scanner<'src> {
    source: CharSource<'src>,
    scratch: String,
    options: DecoderOptions,
    depth: usize,
}

impl<'src> Scanner<'src> {
    #[must_use]
    pub fn new(source: CharSource<'src>, options: DecoderOptions) -> Self {
        Self {
            source,
            scratch: String::new(),
            options,
            depth: 0,
        }
    }

    #[must_use]
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    #[must_use]
    pub fn source(&self) -> &CharSource<'src> {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut CharSource<'src> {
        &mut self.source
    }

    /// Builds the error signal at the current position.
    #[cold]
    pub fn error(&self, error: SyntaxError) -> DecodeError {
        self.source.syntax_error(error)
    }

    /// Enters one level of array/object nesting.
    pub(crate) fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(SyntaxError::DepthLimitExceeded(self.options.max_depth)));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        debug_assert!(self.depth > 0);
        self.depth = self.depth.saturating_sub(1);
    }

    // --- Whitespace & literals ---------------------------------------------

    #[inline]
    pub fn skip_whitespace(&mut self) {
        self.source
            .skip_whitespace(self.options.allow_unicode_whitespace);
    }

    pub fn read_null(&mut self) -> Result<bool, DecodeError> {
        self.source.match_literal("null")
    }

    pub fn read_true(&mut self) -> Result<bool, DecodeError> {
        self.source.match_literal("true")
    }

    pub fn read_false(&mut self) -> Result<bool, DecodeError> {
        self.source.match_literal("false")
    }

    pub fn read_bool(&mut self) -> Result<Option<bool>, DecodeError> {
        if self.read_true()? {
            Ok(Some(true))
        } else if self.read_false()? {
            Ok(Some(false))
        } else {
            Ok(None)
        }
    }

    // --- Numbers -----------------------------------------------------------

    /// Reads a number literal and returns its text.
    ///
    /// Grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
    pub fn read_number(&mut self) -> Result<Option<&str>, DecodeError> {
        if self.scan_number()? {
            Ok(Some(self.scratch.as_str()))
        } else {
            Ok(None)
        }
    }

    pub fn read_i32(&mut self) -> Result<Option<i32>, DecodeError> {
        self.read_parsed("i32", |_| true)
    }

    pub fn read_i64(&mut self) -> Result<Option<i64>, DecodeError> {
        self.read_parsed("i64", |_| true)
    }

    pub fn read_f32(&mut self) -> Result<Option<f32>, DecodeError> {
        self.read_parsed("f32", |n: &f32| n.is_finite())
    }

    pub fn read_f64(&mut self) -> Result<Option<f64>, DecodeError> {
        self.read_parsed("f64", |n: &f64| n.is_finite())
    }

    /// Float parsing saturates to infinity, so `fits` rejects what the
    /// target cannot hold even when `parse` succeeds.
    fn read_parsed<N: FromStr>(
        &mut self,
        target: &'static str,
        fits: impl Fn(&N) -> bool,
    ) -> Result<Option<N>, DecodeError> {
        if !self.scan_number()? {
            return Ok(None);
        }
        match self.scratch.parse::<N>() {
            Ok(n) if fits(&n) => Ok(Some(n)),
            _ => Err(self.error(SyntaxError::NumberOutOfRange {
                text: self.scratch.clone(),
                target,
            })),
        }
    }

    fn scan_number(&mut self) -> Result<bool, DecodeError> {
        let starts_number = matches!(self.source.peek(), Some(c) if c == '-' || c.is_ascii_digit());
        if !starts_number {
            return Ok(false);
        }
        self.scratch.clear();

        if self.source.advance_if('-') {
            self.scratch.push('-');
        }
        let Some(first) = self.source.read_digit() else {
            return Err(self.error(SyntaxError::MissingIntegerDigits));
        };
        self.scratch.push(first);
        if first != '0' {
            self.scan_digits();
        }

        if self.source.advance_if('.') {
            self.scratch.push('.');
            if !self.scan_digits() {
                return Err(self.error(SyntaxError::MissingFractionDigits));
            }
        }

        if let Some(e @ ('e' | 'E')) = self.source.peek() {
            self.source.advance();
            self.scratch.push(e);
            if let Some(sign @ ('+' | '-')) = self.source.peek() {
                self.source.advance();
                self.scratch.push(sign);
            }
            if !self.scan_digits() {
                return Err(self.error(SyntaxError::MissingExponentDigits));
            }
        }
        Ok(true)
    }

    /// Appends one or more digits to the scratch buffer; `false` if none.
    fn scan_digits(&mut self) -> bool {
        let mut any = false;
        while let Some(d) = self.source.read_digit() {
            self.scratch.push(d);
            any = true;
        }
        any
    }

    // --- Strings -----------------------------------------------------------

    /// Reads a string literal, decoding escapes, and returns its contents.
    pub fn read_string(&mut self) -> Result<Option<&str>, DecodeError> {
        if !self.source.advance_if('"') {
            return Ok(None);
        }
        self.scratch.clear();
        loop {
            match self.source.advance() {
                Some('"') => break,
                Some('\\') => {
                    let c = self.source.decode_escape()?;
                    self.scratch.push(c);
                }
                Some(c) => self.scratch.push(c),
                None => return Err(self.error(SyntaxError::UnterminatedString)),
            }
        }
        Ok(Some(self.scratch.as_str()))
    }

    // --- Structural characters --------------------------------------------

    #[inline]
    pub fn read_open_array(&mut self) -> bool {
        self.source.advance_if('[')
    }

    #[inline]
    pub fn read_close_array(&mut self) -> bool {
        self.source.advance_if(']')
    }

    #[inline]
    pub fn read_open_object(&mut self) -> bool {
        self.source.advance_if('{')
    }

    #[inline]
    pub fn read_close_object(&mut self) -> bool {
        self.source.advance_if('}')
    }

    #[inline]
    pub fn read_value_separator(&mut self) -> bool {
        self.source.advance_if(',')
    }

    #[inline]
    pub fn read_key_separator(&mut self) -> bool {
        self.source.advance_if(':')
    }

    // --- Skipping ----------------------------------------------------------

    /// Skips one JSON value of any kind, after optional whitespace.
    ///
    /// Returns `Ok(false)` if the next character cannot start a value.
    /// Arrays and objects are checked with the same separator and closer
    /// rules as decoded ones.
    pub fn skip_value(&mut self) -> Result<bool, DecodeError> {
        self.skip_whitespace();
        match self.source.peek() {
            Some('n') => self.read_null(),
            Some('t') => self.read_true(),
            Some('f') => self.read_false(),
            Some(c) if c == '-' || c.is_ascii_digit() => self.scan_number(),
            Some('"') => Ok(self.read_string()?.is_some()),
            Some('[') => {
                self.source.advance();
                self.skip_array_body()?;
                Ok(true)
            }
            Some('{') => {
                self.source.advance();
                self.skip_object_body()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn skip_array_body(&mut self) -> Result<(), DecodeError> {
        self.enter()?;
        if self.skip_value()? {
            loop {
                self.skip_whitespace();
                if !self.read_value_separator() {
                    break;
                }
                if !self.skip_value()? {
                    return Err(self.error(SyntaxError::ExpectedValue("JSON")));
                }
            }
        }
        self.skip_whitespace();
        if !self.read_close_array() {
            return Err(self.error(SyntaxError::ExpectedClosingArray));
        }
        self.leave();
        Ok(())
    }

    fn skip_object_body(&mut self) -> Result<(), DecodeError> {
        self.enter()?;
        if self.skip_member()? {
            loop {
                self.skip_whitespace();
                if !self.read_value_separator() {
                    break;
                }
                if !self.skip_member()? {
                    return Err(self.error(SyntaxError::ExpectedKey));
                }
            }
        }
        self.skip_whitespace();
        if !self.read_close_object() {
            return Err(self.error(SyntaxError::ExpectedClosingObject));
        }
        self.leave();
        Ok(())
    }

    fn skip_member(&mut self) -> Result<bool, DecodeError> {
        self.skip_whitespace();
        if self.read_string()?.is_none() {
            return Ok(false);
        }
        self.expect_key_separator()?;
        if !self.skip_value()? {
            return Err(self.error(SyntaxError::ExpectedValue("JSON")));
        }
        Ok(true)
    }

    /// Requires a `:` after optional whitespace.
    pub(crate) fn expect_key_separator(&mut self) -> Result<(), DecodeError> {
        self.skip_whitespace();
        if self.read_key_separator() {
            Ok(())
        } else {
            Err(self.error(SyntaxError::ExpectedColon))
        }
    }
}
