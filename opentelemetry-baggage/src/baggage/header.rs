//! Conversion between [`Baggage`] and the `baggage` header value.
use super::grammar::{self, RawMember};
use super::{
    percent, Baggage, BaggageEntry, BaggageError, BaggageMetadata, MAX_KEY_VALUE_PAIRS,
    MAX_KEY_VALUE_SIZE, MAX_SIZE,
};
use std::fmt;

/// Most skip reasons a [`ParseReport`] keeps; later ones are only counted.
pub const MAX_REPORTED_SKIPS: usize = 16;

/// Outcome of [`parse_with_report`]: the baggage and why members were left
/// out of it.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct ParseReport {
    /// Every member that decoded and fit the limits, in wire order.
    pub baggage: Baggage,
    /// Reasons for the first [`MAX_REPORTED_SKIPS`] skipped members, in wire
    /// order.
    pub skipped: Vec<BaggageError>,
    /// Number of skipped members, including those past [`MAX_REPORTED_SKIPS`].
    pub skipped_count: usize,
}

/// Parses a `baggage` header value.
///
/// Malformed members, members that do not decode to printable ASCII and
/// members that do not fit the limits are skipped; parsing itself never
/// fails. Entries keep the order they have on the wire.
///
/// # Examples
///
/// ```
/// use opentelemetry_baggage::baggage::parse;
///
/// let baggage = parse("k1=v1, k2 = v2;ttl=30, invalidmember");
///
/// assert_eq!(baggage.len(), 2);
/// assert_eq!(baggage.to_header(), "k1=v1,k2=v2;ttl=30");
/// ```
pub fn parse(header: &str) -> Baggage {
    parse_members(header, |_| {})
}

/// Same as [`parse`], also returning why members were skipped.
///
/// Memory use stays bounded whatever the header size: only the first
/// [`MAX_REPORTED_SKIPS`] reasons are kept.
///
/// # Examples
///
/// ```
/// use opentelemetry_baggage::baggage::{parse_with_report, BaggageError};
///
/// let report = parse_with_report("k=v,invalidmember");
///
/// assert_eq!(report.baggage.to_header(), "k=v");
/// assert_eq!(report.skipped, vec![BaggageError::MalformedMember]);
/// assert_eq!(report.skipped_count, 1);
/// ```
pub fn parse_with_report(header: &str) -> ParseReport {
    let mut skipped = Vec::new();
    let mut skipped_count = 0;
    let baggage = parse_members(header, |err| {
        skipped_count += 1;
        if skipped.len() < MAX_REPORTED_SKIPS {
            skipped.push(err);
        }
    });

    ParseReport {
        baggage,
        skipped,
        skipped_count,
    }
}

fn parse_members(header: &str, mut on_skip: impl FnMut(BaggageError)) -> Baggage {
    let mut entries: Vec<BaggageEntry> = Vec::new();
    let mut total = 0;

    for member in grammar::tokenize(header) {
        if entries.len() >= MAX_KEY_VALUE_PAIRS {
            on_skip(BaggageError::CapacityExceeded);
            break;
        }
        match member.and_then(|member| decode_member(&member, &entries, total)) {
            Ok(entry) => {
                total += entry.encoded_len();
                entries.push(entry);
            }
            Err(err) => on_skip(err),
        }
    }

    Baggage::from_entries(entries)
}

fn decode_member(
    member: &RawMember<'_>,
    accepted: &[BaggageEntry],
    total: usize,
) -> Result<BaggageEntry, BaggageError> {
    let key = percent::decode(member.key())?;
    if key.is_empty() || !percent::is_printable(&key) {
        return Err(BaggageError::InvalidKey);
    }
    let value = percent::decode(member.value())?;
    if !percent::is_printable(&value) {
        return Err(BaggageError::InvalidValue);
    }

    let size = member.encoded_len();
    if size >= MAX_KEY_VALUE_SIZE {
        return Err(BaggageError::EntryTooLarge(size));
    }
    if total + size >= MAX_SIZE {
        return Err(BaggageError::HeaderTooLarge(total + size));
    }
    if accepted.iter().any(|entry| entry.key().as_str() == key) {
        return Err(BaggageError::DuplicateKey);
    }

    Ok(BaggageEntry::decoded(
        key.into(),
        value.into(),
        BaggageMetadata::from(member.metadata()),
        size,
    ))
}

/// Serializes a [`Baggage`] into a `baggage` header value.
///
/// Keys and values are percent-encoded, metadata is appended verbatim after
/// a `;`. Entries are written in container order.
pub fn format(baggage: &Baggage) -> String {
    baggage.to_string()
}

impl fmt::Display for Baggage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(
                f,
                "{}={}",
                percent::encode(entry.key().as_str()),
                percent::encode(entry.value().as_str())
            )?;
            if !entry.metadata().is_empty() {
                write!(f, ";{}", entry.metadata())?;
            }
        }
        Ok(())
    }
}
