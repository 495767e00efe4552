//! Tokenizer for the `baggage` header.
//!
//! ```text
//! header = member *( "," member )
//! member = OWS key OWS "=" OWS value OWS [ ";" OWS metadata OWS ]
//! OWS    = *( %x20 )
//! ```
//!
//! Tokenizing never copies: every [`RawMember`] records byte ranges into the
//! header it was produced from.
use super::BaggageError;
use std::ops::Range;

pub(crate) const MEMBER_SEPARATOR: char = ',';
pub(crate) const KEY_VALUE_SEPARATOR: char = '=';
pub(crate) const METADATA_SEPARATOR: char = ';';

/// Splits `header` into its list-members.
///
/// Empty members (leading, trailing or consecutive commas and members made
/// only of spaces) are skipped. A member without `=` is yielded as
/// [`BaggageError::MalformedMember`] and does not stop the scan.
///
/// # Examples
///
/// ```
/// use opentelemetry_baggage::baggage::grammar::tokenize;
///
/// let members: Vec<_> = tokenize(" k1 = v1 ;prop,,k2=v2")
///     .filter_map(Result::ok)
///     .map(|m| (m.key(), m.value(), m.metadata()))
///     .collect();
///
/// assert_eq!(members, vec![("k1", "v1", "prop"), ("k2", "v2", "")]);
/// ```
pub fn tokenize(header: &str) -> Members<'_> {
    Members { header, pos: 0 }
}

/// Iterator over the list-members of a header, created by [`tokenize`].
///
/// The scan is stateless apart from its offset, so cloning the iterator or
/// calling [`tokenize`] again restarts from any point.
#[derive(Clone, Debug)]
pub struct Members<'a> {
    header: &'a str,
    pos: usize,
}

impl<'a> Iterator for Members<'a> {
    type Item = Result<RawMember<'a>, BaggageError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos <= self.header.len() {
            let start = self.pos;
            let end = self.header[start..]
                .find(MEMBER_SEPARATOR)
                .map_or(self.header.len(), |idx| start + idx);
            // past the separator, or past the end when this was the last member
            self.pos = end + 1;

            let member = trim_ows(self.header, start..end);
            if member.is_empty() {
                continue;
            }
            return Some(RawMember::split(self.header, member));
        }
        None
    }
}

/// One `key=value[;metadata]` list-member, as byte ranges into its header.
///
/// All ranges are already trimmed of optional whitespace. Key and value are
/// still percent-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawMember<'a> {
    header: &'a str,
    key: Range<usize>,
    value: Range<usize>,
    metadata: Range<usize>,
}

impl<'a> RawMember<'a> {
    fn split(header: &'a str, member: Range<usize>) -> Result<Self, BaggageError> {
        let text = &header[member.clone()];
        let eq = text
            .find(KEY_VALUE_SEPARATOR)
            .ok_or(BaggageError::MalformedMember)?;
        let value_start = member.start + eq + 1;

        let (value, metadata) = match header[value_start..member.end].find(METADATA_SEPARATOR) {
            Some(semi) => {
                let semi = value_start + semi;
                (value_start..semi, semi + 1..member.end)
            }
            None => (value_start..member.end, member.end..member.end),
        };

        Ok(RawMember {
            header,
            key: trim_ows(header, member.start..member.start + eq),
            value: trim_ows(header, value),
            metadata: trim_ows(header, metadata),
        })
    }

    /// The encoded key.
    pub fn key(&self) -> &'a str {
        &self.header[self.key.clone()]
    }

    /// The encoded value, possibly empty.
    pub fn value(&self) -> &'a str {
        &self.header[self.value.clone()]
    }

    /// The metadata after the first `;`, verbatim, possibly empty.
    pub fn metadata(&self) -> &'a str {
        &self.header[self.metadata.clone()]
    }

    /// Byte range of the key within the header.
    pub fn key_range(&self) -> Range<usize> {
        self.key.clone()
    }

    /// Byte range of the value within the header.
    pub fn value_range(&self) -> Range<usize> {
        self.value.clone()
    }

    /// Byte range of the metadata within the header.
    pub fn metadata_range(&self) -> Range<usize> {
        self.metadata.clone()
    }

    /// Size accounted against the baggage limits: key, value and metadata
    /// lengths, separators excluded.
    pub fn encoded_len(&self) -> usize {
        self.key.len() + self.value.len() + self.metadata.len()
    }
}

fn trim_ows(s: &str, range: Range<usize>) -> Range<usize> {
    let bytes = s.as_bytes();
    let (mut start, mut end) = (range.start, range.end);
    while start < end && bytes[start] == b' ' {
        start += 1;
    }
    while end > start && bytes[end - 1] == b' ' {
        end -= 1;
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(header: &str) -> Vec<Result<(&str, &str, &str), BaggageError>> {
        tokenize(header)
            .map(|m| m.map(|m| (m.key(), m.value(), m.metadata())))
            .collect()
    }

    #[test]
    fn single_member() {
        assert_eq!(members("k1=v1"), vec![Ok(("k1", "v1", ""))]);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            members("key1 =   val1,  key2 =val2   "),
            vec![Ok(("key1", "val1", "")), Ok(("key2", "val2", ""))]
        );
        assert_eq!(
            members("k = v ;  prop=1  "),
            vec![Ok(("k", "v", "prop=1"))]
        );
    }

    #[test]
    fn empty_members_are_skipped() {
        assert!(members("").is_empty());
        assert!(members(",").is_empty());
        assert!(members("  ,  , ").is_empty());
        assert_eq!(
            members(",k1=v1,,k2=v2,"),
            vec![Ok(("k1", "v1", "")), Ok(("k2", "v2", ""))]
        );
    }

    #[test]
    fn missing_separator_is_an_error_for_that_member_only() {
        assert_eq!(
            members("k1=v1,invalidmember,k2=v2"),
            vec![
                Ok(("k1", "v1", "")),
                Err(BaggageError::MalformedMember),
                Ok(("k2", "v2", ""))
            ]
        );
    }

    #[test]
    fn value_splits_on_first_equals_and_first_semicolon() {
        assert_eq!(members("k=a=b"), vec![Ok(("k", "a=b", ""))]);
        assert_eq!(
            members("k=v;red;state=on"),
            vec![Ok(("k", "v", "red;state=on"))]
        );
        assert_eq!(members("k=;meta"), vec![Ok(("k", "", "meta"))]);
        assert_eq!(members("=v"), vec![Ok(("", "v", ""))]);
        assert_eq!(members("="), vec![Ok(("", "", ""))]);
    }

    #[test]
    fn ranges_point_into_header() {
        let header = " k1 = v1 ; m ";
        let member = tokenize(header).next().unwrap().unwrap();
        assert_eq!(member.key_range(), 1..3);
        assert_eq!(member.value_range(), 6..8);
        assert_eq!(member.metadata_range(), 11..12);
        assert_eq!(member.encoded_len(), 5);
    }

    #[test]
    fn tokenize_is_restartable() {
        let header = "a=1,b=2";
        let mut iter = tokenize(header);
        let _ = iter.next();
        let rest = iter.clone();
        assert_eq!(rest.count(), 1);
        assert_eq!(tokenize(header).count(), 2);
        assert_eq!(iter.count(), 1);
    }
}
