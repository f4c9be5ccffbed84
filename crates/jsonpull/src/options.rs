/// Configuration options for the decoder.
///
/// # Examples
///
/// ```rust
/// use jsonpull::{CharSource, DecoderOptions, Parser};
///
/// let options = DecoderOptions {
///     allow_unicode_whitespace: true,
///     ..Default::default()
/// };
/// let mut parser = Parser::from_source(CharSource::from_text("\u{3000}[1]"), options);
/// assert_eq!(parser.decode::<Vec<i32>>().unwrap(), Some(vec![1]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Whether to treat any Unicode whitespace as insignificant between
    /// tokens.
    ///
    /// By default, only the four whitespace characters defined by the JSON
    /// grammar are skipped: space (U+0020), line feed (U+000A),
    /// carriage return (U+000D), and horizontal tab (U+0009).
    ///
    /// # Default
    ///
    /// `false`
    pub allow_unicode_whitespace: bool,

    /// Maximum nesting of arrays and objects, counted for both decoded and
    /// skipped values.
    ///
    /// # Default
    ///
    /// `128`
    pub max_depth: usize,
}

impl DecoderOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 128;
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            allow_unicode_whitespace: false,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
