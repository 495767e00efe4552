//! Percent-encoding for baggage keys and values.
//!
//! The unreserved alphabet (`ALPHA / DIGIT / "-" / "_" / "." / "~"`) is kept
//! as is, a space is written as `+`, and every other byte becomes `%XX` with
//! uppercase hex digits.
use super::BaggageError;
use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;

const ESCAPED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const ENCODED_SPACE: &str = "%20";

/// Encodes a key or value for the wire.
///
/// # Examples
///
/// ```
/// use opentelemetry_baggage::baggage::percent::encode;
///
/// assert_eq!(encode("user id=42"), "user+id%3D42");
/// ```
pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, ESCAPED)
        .map(|chunk| if chunk == ENCODED_SPACE { "+" } else { chunk })
        .collect()
}

/// Returns the length [`encode`] would produce without allocating.
pub(crate) fn encoded_len(s: &str) -> usize {
    s.bytes()
        .map(|b| if is_unreserved(b) || b == b' ' { 1 } else { 3 })
        .sum()
}

/// Decodes an encoded key or value.
///
/// Fails on a `%` that is not followed by two hex digits, on any raw byte
/// outside the unreserved set and `+`, and on byte sequences that are not
/// valid UTF-8 once decoded.
pub fn decode(s: &str) -> Result<String, BaggageError> {
    validate(s.as_bytes())?;

    let bytes: Cow<'_, [u8]> = if s.contains('+') {
        Cow::Owned(s.bytes().map(|b| if b == b'+' { b' ' } else { b }).collect())
    } else {
        Cow::Borrowed(s.as_bytes())
    };

    percent_decode(&bytes)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| BaggageError::InvalidUtf8)
}

fn validate(bytes: &[u8]) -> Result<(), BaggageError> {
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'%' => {
                let well_formed = bytes
                    .get(pos + 1..pos + 3)
                    .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
                if !well_formed {
                    return Err(BaggageError::InvalidPercentEncoding(pos));
                }
                pos += 3;
            }
            b if is_unreserved(b) || b == b'+' => pos += 1,
            b => return Err(BaggageError::InvalidCharacter(b, pos)),
        }
    }
    Ok(())
}

#[inline]
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/// Printable ASCII, `0x20..=0x7E`.
#[inline]
pub(crate) fn is_printable(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}
