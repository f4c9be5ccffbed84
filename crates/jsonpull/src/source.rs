//! CharSource: forward-only character cursor with one character of
//! lookahead, fed from a `&str`, an `io::Read` of UTF-8 bytes, or any
//! `char` iterator.
//!
//! The cursor only moves forward. End of input is reported as `None` and is
//! never an error at this layer; the grammar above decides whether running
//! out of characters is acceptable where it happens.
//!
//! Byte readers are decoded as UTF-8 incrementally. Invalid sequences decode
//! to U+FFFD, the same replacement policy the streaming scanner applies to
//! its unread ring. A reader failure is latched and surfaced by the parser
//! once the current decode call returns; from the adapter's point of view
//! the input simply ended.

use std::io::{self, Read};

const READ_CHUNK: usize = 8 * 1024;

/// Longest UTF-8 encoding of a scalar value.
const MAX_UTF8_LEN: usize = 4;

enum Input<'src> {
    Text {
        text: &'src str,
        offset: usize,
    },
    Reader {
        reader: Box<dyn Read + 'src>,
        buf: Vec<u8>,
        start: usize,
        end: usize,
        eof: bool,
    },
    Chars(Box<dyn Iterator<Item = char> + 'src>),
}

/// A forward-only character cursor with single-character lookahead.
pub struct CharSource<'src> {
    input: Input<'src>,
    /// `None` until the next character has been looked at; `Some(None)` once
    /// input is exhausted.
    lookahead: Option<Option<char>>,
    line: usize,
    column: usize,
    io_error: Option<io::Error>,
}

impl<'src> CharSource<'src> {
    fn with_input(input: Input<'src>) -> Self {
        Self {
            input,
            lookahead: None,
            line: 1,
            column: 1,
            io_error: None,
        }
    }

    /// Reads characters from in-memory text.
    #[must_use]
    pub fn from_text(text: &'src str) -> Self {
        Self::with_input(Input::Text { text, offset: 0 })
    }

    /// Reads characters from a byte stream holding UTF-8 text.
    pub fn from_reader<R: Read + 'src>(reader: R) -> Self {
        Self::with_input(Input::Reader {
            reader: Box::new(reader),
            buf: vec![0; READ_CHUNK],
            start: 0,
            end: 0,
            eof: false,
        })
    }

    /// Reads characters from any character iterator. Wrapping an iterator is
    /// the way to impose deadlines or other limits on input: once it stops
    /// yielding, the decoder sees end of input.
    pub fn from_chars<I>(chars: I) -> Self
    where
        I: IntoIterator<Item = char>,
        I::IntoIter: 'src,
    {
        Self::with_input(Input::Chars(Box::new(chars.into_iter())))
    }

    /// Returns the next character without consuming it.
    #[inline]
    pub fn peek(&mut self) -> Option<char> {
        match self.lookahead {
            Some(c) => c,
            None => {
                let c = self.pull();
                self.lookahead = Some(c);
                c
            }
        }
    }

    /// Consumes and returns the next character.
    #[inline]
    pub fn advance(&mut self) -> Option<char> {
        let c = match self.lookahead.take() {
            Some(c) => c,
            None => self.pull(),
        };
        if let Some(ch) = c {
            self.bump_pos(ch);
        }
        c
    }

    /// 1-based line of the next character.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the next character.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Takes the latched reader failure, if any.
    pub(crate) fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    #[inline]
    fn bump_pos(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn pull(&mut self) -> Option<char> {
        match &mut self.input {
            Input::Text { text, offset } => {
                let ch = text[*offset..].chars().next()?;
                *offset += ch.len_utf8();
                Some(ch)
            }
            Input::Chars(chars) => chars.next(),
            Input::Reader {
                reader,
                buf,
                start,
                end,
                eof,
            } => {
                if *end - *start < MAX_UTF8_LEN && !*eof {
                    if let Err(err) = refill(reader.as_mut(), buf, start, end, eof) {
                        self.io_error = Some(err);
                        *eof = true;
                        *start = *end;
                        return None;
                    }
                }
                if start == end {
                    return None;
                }
                let (ch, len) = bstr::decode_utf8(&buf[*start..*end]);
                *start += len.max(1);
                Some(ch.unwrap_or('\u{FFFD}'))
            }
        }
    }
}

/// Moves the unread tail to the front of `buf` and reads until at least one
/// full scalar is buffered or the reader is exhausted.
fn refill(
    reader: &mut dyn Read,
    buf: &mut [u8],
    start: &mut usize,
    end: &mut usize,
    eof: &mut bool,
) -> io::Result<()> {
    buf.copy_within(*start..*end, 0);
    *end -= *start;
    *start = 0;
    while *end < MAX_UTF8_LEN {
        match reader.read(&mut buf[*end..]) {
            Ok(0) => {
                *eof = true;
                break;
            }
            Ok(n) => *end += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

impl core::fmt::Debug for CharSource<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = match self.input {
            Input::Text { .. } => "text",
            Input::Reader { .. } => "reader",
            Input::Chars(_) => "chars",
        };
        f.debug_struct("CharSource")
            .field("input", &kind)
            .field("line", &self.line)
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use super::CharSource;

    /// Hands out one byte per read call to exercise refills across scalars.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some((first, rest)) = self.0.split_first() else {
                return Ok(0);
            };
            buf[0] = *first;
            self.0 = rest;
            Ok(1)
        }
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    fn drain(mut source: CharSource<'_>) -> String {
        let mut out = String::new();
        while let Some(c) = source.advance() {
            out.push(c);
        }
        out
    }

    #[test]
    fn peek_does_not_consume() {
        let mut source = CharSource::from_text("ab");
        assert_eq!(source.peek(), Some('a'));
        assert_eq!(source.peek(), Some('a'));
        assert_eq!(source.advance(), Some('a'));
        assert_eq!(source.peek(), Some('b'));
        assert_eq!(source.advance(), Some('b'));
        assert_eq!(source.peek(), None);
        assert_eq!(source.advance(), None);
    }

    #[test]
    fn all_inputs_yield_the_same_characters() {
        let text = "[\"å\", \"β\", \"Ω\", \"😀\"]";
        assert_eq!(drain(CharSource::from_text(text)), text);
        assert_eq!(drain(CharSource::from_reader(text.as_bytes())), text);
        assert_eq!(drain(CharSource::from_reader(Trickle(text.as_bytes()))), text);
        assert_eq!(drain(CharSource::from_chars(text.chars())), text);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let bytes: &[u8] = b"a\xFFb";
        assert_eq!(drain(CharSource::from_reader(bytes)), "a\u{FFFD}b");
    }

    #[test]
    fn tracks_line_and_column() {
        let mut source = CharSource::from_text("a\nbc");
        assert_eq!((source.line(), source.column()), (1, 1));
        source.advance();
        source.advance();
        assert_eq!((source.line(), source.column()), (2, 1));
        source.advance();
        assert_eq!((source.line(), source.column()), (2, 2));
    }

    #[test]
    fn reader_failure_reads_as_end_of_input_and_is_latched() {
        let mut source = CharSource::from_reader(Failing);
        assert_eq!(source.peek(), None);
        assert_eq!(source.advance(), None);
        let err = source.take_io_error().expect("error should be latched");
        assert_eq!(err.to_string(), "disk on fire");
        assert!(source.take_io_error().is_none());
    }
}
