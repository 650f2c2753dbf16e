//! Parse an integer.

use crate::error::{Error, Result};
use crate::span::Span;

/// Parse a base 10 literal that must fit in an unsigned 16-bit integer.
pub fn parse(input: &str, span: Span) -> Result<u16> {
    span.as_str(input)
        .char_indices()
        .try_fold(0u16, |acc, (j, d)| {
            let x = d.to_digit(10).ok_or_else(|| {
                let m = span.m + j;
                Error::numeric("invalid digit for base 10 literal", m..m + d.len_utf8())
            })?;
            acc.checked_mul(10)
                .and_then(|v| v.checked_add(x as u16))
                .ok_or_else(|| Error::numeric("literal out of range for 16-bit integer", span))
        })
}
