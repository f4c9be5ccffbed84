//! Single-pass, pull-based JSON decoding straight into typed values.
//!
//! The caller names the target type; the decoder reads exactly as much input
//! as that type needs, one character of lookahead at a time, and builds the
//! value without an intermediate document tree.
//!
//! ```rust
//! let flags: Vec<bool> = jsonpull::from_str("\t[ false ,\ntrue ]").unwrap().unwrap();
//! assert_eq!(flags, [false, true]);
//!
//! // A different shape at the cursor is absence, not an error.
//! assert_eq!(jsonpull::from_str::<Vec<bool>>("1").unwrap(), None);
//!
//! // A value that starts and then breaks is an error.
//! assert!(jsonpull::from_str::<Vec<bool>>("[true false]").is_err());
//! ```
//!
//! Records are declared with [`record!`]; strategies for every target type
//! are resolved once and memoized in a [`DispatchCache`].

#![allow(missing_docs)]

mod decode;
mod dispatch;
mod error;
mod escape_buffer;
mod lexical;
mod options;
mod parser;
mod record;
mod scanner;
mod source;

#[cfg(test)]
mod tests;

use std::io::Read;

pub use decode::Decode;
pub use dispatch::{
    DispatchCache, Filler, PrimitiveKind, PrimitiveReader, Strategy, StrategyKind, TypeDescriptor,
    ValueReader,
};
pub use error::{DecodeError, SyntaxError};
pub use options::DecoderOptions;
pub use parser::Parser;
pub use record::{FieldMap, RecordStrategy};
pub use scanner::Scanner;
pub use source::CharSource;

/// Decodes a `T` from the start of `text`.
///
/// # Errors
///
/// See [`Parser::decode`].
pub fn from_str<T: Decode>(text: &str) -> Result<Option<T>, DecodeError> {
    Parser::new(text).decode()
}

/// Decodes a `T` from UTF-8 bytes pulled from `reader`. Only the bytes needed
/// for the value (plus buffered read-ahead) are consumed.
///
/// # Errors
///
/// See [`Parser::decode`].
pub fn from_reader<T: Decode, R: Read>(reader: R) -> Result<Option<T>, DecodeError> {
    Parser::from_reader(reader).decode()
}
