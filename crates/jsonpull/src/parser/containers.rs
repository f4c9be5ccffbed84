//! Strategy entry points for arrays, ordered collections and maps.
//!
//! These are free functions rather than methods so that they coerce to the
//! higher-ranked function pointers stored in a [`Strategy`](crate::Strategy).

use core::{any::type_name, iter};

use super::Parser;
use crate::{
    decode::Decode,
    error::{DecodeError, SyntaxError},
};

/// Appends every element of a JSON array to `target`.
pub(crate) fn fill_sequence<C, E>(parser: &mut Parser<'_>, target: &mut C) -> Result<bool, DecodeError>
where
    C: Extend<E>,
    E: Decode,
{
    let strategy = parser.cache.resolve::<E>();
    parser.read_array_body(type_name::<E>(), |parser| match parser.read_with(&strategy)? {
        Some(value) => {
            target.extend(iter::once(value));
            Ok(true)
        }
        None => Ok(false),
    })
}

/// Inserts every member of a JSON object into `target`. A repeated key
/// overwrites the earlier value.
pub(crate) fn fill_map<M, V>(parser: &mut Parser<'_>, target: &mut M) -> Result<bool, DecodeError>
where
    M: Extend<(String, V)>,
    V: Decode,
{
    let strategy = parser.cache.resolve::<V>();
    parser.read_object_body(|parser| {
        parser.scanner.skip_whitespace();
        let Some(key) = parser.scanner.read_string()? else {
            return Ok(false);
        };
        let key = key.to_owned();
        parser.scanner.expect_key_separator()?;
        match parser.read_with(&strategy)? {
            Some(value) => {
                target.extend(iter::once((key, value)));
                Ok(true)
            }
            None => Err(parser.error(SyntaxError::ExpectedValue(type_name::<V>()))),
        }
    })
}

pub(crate) fn read_fixed_array<E: Decode, const N: usize>(
    parser: &mut Parser<'_>,
) -> Result<Option<[E; N]>, DecodeError> {
    let mut items = Vec::with_capacity(N);
    if !fill_sequence::<_, E>(parser, &mut items)? {
        return Ok(None);
    }
    let found = items.len();
    match <[E; N]>::try_from(items) {
        Ok(array) => Ok(Some(array)),
        Err(_) => Err(parser.error(SyntaxError::ArrayLength { expected: N, found })),
    }
}

pub(crate) fn read_boxed_slice<E: Decode>(parser: &mut Parser<'_>) -> Result<Option<Box<[E]>>, DecodeError> {
    let mut items = Vec::new();
    if !fill_sequence::<_, E>(parser, &mut items)? {
        return Ok(None);
    }
    Ok(Some(items.into_boxed_slice()))
}
