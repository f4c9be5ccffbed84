//! Type-directed value builder.
//!
//! Overview
//! - [`Parser::decode`] asks the [`DispatchCache`] how to build the target
//!   type and then drives the [`Scanner`] one token at a time, recursing
//!   through element, value and field types as the strategy dictates.
//! - Nothing is buffered beyond the current token. Arrays and objects are
//!   consumed in a single forward pass; unknown record keys are skipped
//!   without materializing their values.
//!
//! Absence and errors
//! - `Ok(None)` / `Ok(false)` means the opening marker of the requested shape
//!   was not found. At most leading whitespace was consumed.
//! - `Err` means a value was confirmed to start and then broke the grammar.
//!   The cursor position afterwards is unspecified and the parser must not be
//!   used for further reads.
//!
//! Array and object loops
//! - A first element (or member) that is absent is not an error; it just
//!   means the container is empty, and the closer is required next.
//! - After every `,` an element (or member) is mandatory.
//! - Every container entered counts toward [`DecoderOptions::max_depth`].

use std::io::Read;

use tracing::{debug, trace};

use crate::{
    decode::Decode,
    dispatch::{DispatchCache, Strategy},
    error::{DecodeError, SyntaxError},
    options::DecoderOptions,
    record::RecordStrategy,
    scanner::Scanner,
    source::CharSource,
};

mod containers;

pub(crate) use containers::{fill_map, fill_sequence, read_boxed_slice, read_fixed_array};

/// Pull decoder over one input.
///
/// ```rust
/// use std::collections::BTreeMap;
///
/// use jsonpull::Parser;
///
/// let mut parser = Parser::new(r#"{"one": 1, "two": 2}"#);
/// let map = parser.decode::<BTreeMap<String, i32>>().unwrap().unwrap();
/// assert_eq!(map["two"], 2);
/// ```
#[derive(Debug)]
pub struct Parser<'src> {
    scanner: Scanner<'src>,
    cache: &'src DispatchCache,
}

impl<'src> Parser<'src> {
    /// Decodes from in-memory text with default options.
    #[must_use]
    pub fn new(text: &'src str) -> Self {
        Self::from_source(CharSource::from_text(text), DecoderOptions::default())
    }

    /// Decodes UTF-8 text pulled from `reader` with default options.
    pub fn from_reader<R: Read + 'src>(reader: R) -> Self {
        Self::from_source(CharSource::from_reader(reader), DecoderOptions::default())
    }

    /// Decodes characters pulled from `chars` with default options.
    pub fn from_chars<I>(chars: I) -> Self
    where
        I: IntoIterator<Item = char>,
        I::IntoIter: 'src,
    {
        Self::from_source(CharSource::from_chars(chars), DecoderOptions::default())
    }

    #[must_use]
    pub fn from_source(source: CharSource<'src>, options: DecoderOptions) -> Self {
        Self {
            scanner: Scanner::new(source, options),
            cache: DispatchCache::global(),
        }
    }

    /// Resolves strategies through `cache` instead of the process-wide one.
    #[must_use]
    pub fn with_cache(mut self, cache: &'src DispatchCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn options(&self) -> &DecoderOptions {
        self.scanner.options()
    }

    #[must_use]
    pub fn cache(&self) -> &'src DispatchCache {
        self.cache
    }

    #[must_use]
    pub fn scanner(&self) -> &Scanner<'src> {
        &self.scanner
    }

    /// Token-level access, for callers mixing typed decodes with manual
    /// reads of the surrounding structure.
    pub fn scanner_mut(&mut self) -> &mut Scanner<'src> {
        &mut self.scanner
    }

    /// Decodes one value of type `T` after optional whitespace.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Syntax`] if a value started but broke the grammar,
    /// [`DecodeError::Io`] if the underlying reader failed.
    pub fn decode<T: Decode>(&mut self) -> Result<Option<T>, DecodeError> {
        let result = self.read::<T>();
        self.finish::<T, _>(result)
    }

    /// Decodes into an existing value. Collections are appended to, maps and
    /// records are updated key by key, primitives and fixed arrays are
    /// overwritten. On `Ok(false)` the target is untouched.
    ///
    /// # Errors
    ///
    /// As for [`Parser::decode`]. After an error the target may hold part of
    /// the input.
    pub fn decode_into<T: Decode>(&mut self, target: &mut T) -> Result<bool, DecodeError> {
        let strategy = self.cache.resolve::<T>();
        let result = self.fill_with(&strategy, target);
        self.finish::<T, _>(result)
    }

    fn finish<T, R>(&mut self, result: Result<R, DecodeError>) -> Result<R, DecodeError> {
        if let Some(err) = self.scanner.source_mut().take_io_error() {
            debug!(
                target_type = core::any::type_name::<T>(),
                error = %err,
                "reader failed during decode"
            );
            return Err(DecodeError::Io(err));
        }
        if let Err(DecodeError::Syntax { error, line, column }) = &result {
            debug!(
                target_type = core::any::type_name::<T>(),
                %error,
                line,
                column,
                "malformed JSON"
            );
        }
        result
    }

    #[cold]
    fn error(&self, error: SyntaxError) -> DecodeError {
        self.scanner.error(error)
    }

    pub(crate) fn read<T: Decode>(&mut self) -> Result<Option<T>, DecodeError> {
        let strategy = self.cache.resolve::<T>();
        self.read_with(&strategy)
    }

    /// Reads with an already resolved strategy, so loops resolve once.
    pub(crate) fn read_with<T>(&mut self, strategy: &Strategy<T>) -> Result<Option<T>, DecodeError> {
        match strategy {
            Strategy::Primitive { read, .. } => {
                self.scanner.skip_whitespace();
                read(&mut self.scanner)
            }
            Strategy::Array { read, .. } => read(self),
            Strategy::Sequence { new, fill, .. } | Strategy::Map { new, fill, .. } => {
                let mut value = new();
                Ok(fill(self, &mut value)?.then_some(value))
            }
            Strategy::Record(record) => {
                let mut value = record.instantiate();
                Ok(self.fill_record(record, &mut value)?.then_some(value))
            }
        }
    }

    fn fill_with<T>(&mut self, strategy: &Strategy<T>, target: &mut T) -> Result<bool, DecodeError> {
        match strategy {
            Strategy::Sequence { fill, .. } | Strategy::Map { fill, .. } => fill(self, target),
            Strategy::Record(record) => self.fill_record(record, target),
            Strategy::Primitive { .. } | Strategy::Array { .. } => match self.read_with(strategy)? {
                Some(value) => {
                    *target = value;
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    // --- Containers --------------------------------------------------------

    /// `[ element (, element)* ]` with `element` reporting absence as
    /// `Ok(false)`. `expected` names the element type in errors.
    fn read_array_body<F>(&mut self, expected: &'static str, mut element: F) -> Result<bool, DecodeError>
    where
        F: FnMut(&mut Self) -> Result<bool, DecodeError>,
    {
        self.scanner.skip_whitespace();
        if !self.scanner.read_open_array() {
            return Ok(false);
        }
        self.scanner.enter()?;
        if element(self)? {
            loop {
                self.scanner.skip_whitespace();
                if !self.scanner.read_value_separator() {
                    break;
                }
                if !element(self)? {
                    return Err(self.error(SyntaxError::ExpectedValue(expected)));
                }
            }
        }
        self.scanner.skip_whitespace();
        if !self.scanner.read_close_array() {
            return Err(self.error(SyntaxError::ExpectedClosingArray));
        }
        self.scanner.leave();
        Ok(true)
    }

    /// `{ member (, member)* }`. A member reads its own key, colon and
    /// value, reporting `Ok(false)` only when no key string starts.
    fn read_object_body<F>(&mut self, mut member: F) -> Result<bool, DecodeError>
    where
        F: FnMut(&mut Self) -> Result<bool, DecodeError>,
    {
        self.scanner.skip_whitespace();
        if !self.scanner.read_open_object() {
            return Ok(false);
        }
        self.scanner.enter()?;
        if member(self)? {
            loop {
                self.scanner.skip_whitespace();
                if !self.scanner.read_value_separator() {
                    break;
                }
                if !member(self)? {
                    return Err(self.error(SyntaxError::ExpectedKey));
                }
            }
        }
        self.scanner.skip_whitespace();
        if !self.scanner.read_close_object() {
            return Err(self.error(SyntaxError::ExpectedClosingObject));
        }
        self.scanner.leave();
        Ok(true)
    }

    // --- Records -----------------------------------------------------------

    fn fill_record<T>(&mut self, record: &RecordStrategy<T>, target: &mut T) -> Result<bool, DecodeError> {
        self.read_object_body(|parser| parser.read_record_member(record, target))
    }

    fn read_record_member<T>(&mut self, record: &RecordStrategy<T>, target: &mut T) -> Result<bool, DecodeError> {
        self.scanner.skip_whitespace();
        let slot = match self.scanner.read_string()? {
            None => return Ok(false),
            Some(key) => {
                let slot = record.fields().get(key);
                if slot.is_none() {
                    trace!(record = record.name(), key, "skipping unknown key");
                }
                slot
            }
        };
        self.scanner.expect_key_separator()?;

        match slot {
            Some(slot) => {
                if !slot.decode_into(self, target)? {
                    return Err(self.error(SyntaxError::ExpectedValue(slot.type_name())));
                }
            }
            None => {
                if !self.scanner.skip_value()? {
                    return Err(self.error(SyntaxError::ExpectedValue("JSON")));
                }
            }
        }
        Ok(true)
    }
}
