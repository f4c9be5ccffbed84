//! Accumulator for the four hexadecimal digits of a `\uXXXX` escape.
//!
//! Digits are folded into a UTF-16 code unit as they arrive
//! (`acc = acc << 4 | digit`), so a complete escape is
//! `d1 << 12 | d2 << 8 | d3 << 4 | d4`. Pairing surrogate code units into a
//! scalar value is left to [`combine_surrogates`].

use crate::error::SyntaxError;

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    acc: u32,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn hex_val(c: char) -> Option<u32> {
        c.to_digit(16)
    }

    /// Feeds one hex digit.
    ///
    /// Returns `Ok(Some(unit))` once the fourth digit arrives, resetting the
    /// accumulator; `Ok(None)` while digits are still missing.
    #[allow(clippy::cast_possible_truncation)]
    pub fn feed(&mut self, c: char) -> Result<Option<u16>, SyntaxError> {
        let d = Self::hex_val(c).ok_or(SyntaxError::InvalidUnicodeEscapeChar(c))?;
        debug_assert!(self.len < 4);

        self.acc = (self.acc << 4) | d;
        self.len += 1;
        if self.len < 4 {
            return Ok(None);
        }

        let unit = self.acc;
        self.acc = 0;
        self.len = 0;
        // Four nibbles always fit.
        Ok(Some(unit as u16))
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Turns a lone code unit into a `char`. Surrogates have no scalar value on
/// their own.
pub(crate) fn unit_to_char(unit: u16) -> Result<char, SyntaxError> {
    char::from_u32(u32::from(unit)).ok_or(SyntaxError::InvalidUnicodeEscapeSequence(u32::from(unit)))
}

/// Joins a high and a low surrogate into one scalar value.
pub(crate) fn combine_surrogates(high: u16, low: u16) -> Result<char, SyntaxError> {
    if !is_high_surrogate(high) {
        return Err(SyntaxError::InvalidUnicodeEscapeSequence(u32::from(high)));
    }
    if !is_low_surrogate(low) {
        return Err(SyntaxError::InvalidUnicodeEscapeSequence(u32::from(low)));
    }
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code).ok_or(SyntaxError::InvalidUnicodeEscapeSequence(code))
}
