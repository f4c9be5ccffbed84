use std::io;

use thiserror::Error;

/// Raised when a value was confirmed to start but the grammar was violated
/// partway through, or when the underlying reader failed.
///
/// After an error the stream position is unspecified; the parser that
/// produced it must not be used to read further values.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{error} at {line}:{column}")]
    Syntax {
        error: SyntaxError,
        line: usize,
        column: usize,
    },
    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// The grammar violation, if this is not an I/O failure.
    #[must_use]
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax { error, .. } => Some(error),
            Self::Io(_) => None,
        }
    }

    /// 1-based line and column at which the violation was detected.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::Syntax { line, column, .. } => Some((*line, *column)),
            Self::Io(_) => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("invalid character '{found}' while reading `{literal}`")]
    LiteralMismatch { literal: &'static str, found: char },
    #[error("unexpected end of input while reading `{0}`")]
    EndOfInputInLiteral(&'static str),
    #[error("expected digits after '-'")]
    MissingIntegerDigits,
    #[error("expected digits in number fraction")]
    MissingFractionDigits,
    #[error("expected digits in number exponent")]
    MissingExponentDigits,
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("invalid escape sequence at end of input")]
    EndOfInputInEscape,
    #[error("invalid unicode escape sequence at character: '{0}'")]
    InvalidUnicodeEscapeChar(char),
    #[error("invalid unicode escape sequence \\u{0:X}")]
    InvalidUnicodeEscapeSequence(u32),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("expected {0} value")]
    ExpectedValue(&'static str),
    #[error("expected closing array ']'")]
    ExpectedClosingArray,
    #[error("expected closing object '}}'")]
    ExpectedClosingObject,
    #[error("expected string key")]
    ExpectedKey,
    #[error("expected colon ':'")]
    ExpectedColon,
    #[error("number `{text}` does not fit in {target}")]
    NumberOutOfRange { text: String, target: &'static str },
    #[error("expected {expected} array elements, found {found}")]
    ArrayLength { expected: usize, found: usize },
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
}
