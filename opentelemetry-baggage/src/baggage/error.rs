use thiserror::Error;

/// Reasons a baggage list-member or update was rejected.
///
/// These errors never escape the fail-closed operations on
/// [`Baggage`](super::Baggage). They are produced by the fallible building
/// blocks ([`decode`](super::percent::decode),
/// [`tokenize`](super::grammar::tokenize),
/// [`Baggage::try_set_with_metadata`](super::Baggage::try_set_with_metadata))
/// and reported through [`ParseReport`](super::header::ParseReport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BaggageError {
    /// A list-member without the `=` separator.
    #[error("list-member has no '=' separator")]
    MalformedMember,

    /// The key is empty or contains bytes outside printable ASCII.
    #[error("key is empty or not printable ASCII")]
    InvalidKey,

    /// The value contains bytes outside printable ASCII.
    #[error("value is not printable ASCII")]
    InvalidValue,

    /// The metadata contains a member separator or non printable bytes.
    #[error("metadata contains ',' or is not printable ASCII")]
    InvalidMetadata,

    /// A `%` not followed by two hex digits.
    #[error("invalid percent-encoding at byte {0}")]
    InvalidPercentEncoding(usize),

    /// Percent-decoded bytes that do not form valid UTF-8.
    #[error("percent-decoded bytes are not valid UTF-8")]
    InvalidUtf8,

    /// A raw byte outside the unreserved set in an encoded segment.
    #[error("unexpected character {0:#04x} at byte {1}")]
    InvalidCharacter(u8, usize),

    /// A single entry reaches the per-entry size limit.
    #[error("entry of {0} bytes reaches the {max} byte entry limit", max = super::MAX_KEY_VALUE_SIZE)]
    EntryTooLarge(usize),

    /// Adding the entry would reach the container size limit.
    #[error("entry would grow baggage to {0} bytes, limit is {max}", max = super::MAX_SIZE)]
    HeaderTooLarge(usize),

    /// The container already holds the maximum number of entries.
    #[error("baggage already holds {max} entries", max = super::MAX_KEY_VALUE_PAIRS)]
    CapacityExceeded,

    /// The key already appeared earlier in the same header.
    #[error("duplicate key in header")]
    DuplicateKey,
}
