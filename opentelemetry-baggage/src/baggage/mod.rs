//! Primitives for sending name/value data across system boundaries.
//!
//! Baggage is a bounded, ordered set of user-defined name/value pairs, each
//! with optional opaque metadata, that travels alongside a request. It is
//! context, not telemetry: nothing is added to spans, metrics or logs unless
//! the user does so explicitly.
//!
//! Main types in this module are:
//!
//! * [`Baggage`]: an immutable container of [`BaggageEntry`] values.
//! * [`BaggageExt`]: extensions for managing `Baggage` in a [`Context`].
//!
//! Every update returns a new container; the original can keep being read,
//! from any thread, without synchronization. Containers are serialized to and
//! from a single header value in accordance with the [W3C Baggage]
//! specification by the [`header`] module.
//!
//! [W3C Baggage]: https://w3c.github.io/baggage
use crate::{otel_debug, Context, Key, StringValue};
use std::fmt;
use std::sync::{Arc, OnceLock};

mod error;
pub mod grammar;
pub mod header;
pub mod percent;

pub use error::BaggageError;
pub use header::{format, parse, parse_with_report, ParseReport, MAX_REPORTED_SKIPS};

/// Maximum number of entries in a [`Baggage`].
pub const MAX_KEY_VALUE_PAIRS: usize = 180;
/// Exclusive upper bound on the encoded size of a single entry.
pub const MAX_KEY_VALUE_SIZE: usize = 4096;
/// Exclusive upper bound on the encoded size of all entries of a [`Baggage`].
pub const MAX_SIZE: usize = 8192;

static DEFAULT_BAGGAGE: OnceLock<Baggage> = OnceLock::new();

/// Returns the default baggage, ensuring it is initialized only once.
#[inline]
fn get_default_baggage() -> &'static Baggage {
    DEFAULT_BAGGAGE.get_or_init(Baggage::default)
}

/// An immutable, ordered set of name/value pairs describing user-defined
/// properties.
///
/// ### Ordering
///
/// Entries keep the order they were produced in. [`Baggage::set`] puts the
/// new entry first, so serializing after a series of updates lists the most
/// recently set key first. [`Baggage::from_header`] keeps wire order.
///
/// ### Limits
///
/// * Maximum number of name/value pairs: `180`.
/// * Encoded size of one pair (key, value and metadata) below `4096` bytes.
/// * Encoded size of all pairs below `8192` bytes.
///
/// ### Sharing
///
/// Entries live behind an [`Arc`], cloning a `Baggage` only bumps a reference
/// count and the container is `Send + Sync`.
#[derive(Clone, Debug)]
pub struct Baggage {
    entries: Arc<[BaggageEntry]>,
    encoded_len: usize, // sum of `BaggageEntry::encoded_len` over `entries`
}

impl PartialEq for Baggage {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Baggage {}

impl Default for Baggage {
    fn default() -> Self {
        Baggage::new()
    }
}

impl Baggage {
    /// Creates an empty `Baggage`.
    pub fn new() -> Self {
        Baggage::from_entries(Vec::new())
    }

    fn from_entries(entries: Vec<BaggageEntry>) -> Self {
        let encoded_len = entries.iter().map(BaggageEntry::encoded_len).sum();
        Baggage {
            entries: entries.into(),
            encoded_len,
        }
    }

    /// Returns a reference to the value associated with a given name.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_baggage::{baggage::Baggage, StringValue};
    ///
    /// let baggage = Baggage::new().set("my-name", "my-value");
    ///
    /// assert_eq!(baggage.get("my-name"), Some(&StringValue::from("my-value")));
    /// assert_eq!(baggage.get(""), None);
    /// ```
    pub fn get<K: AsRef<str>>(&self, key: K) -> Option<&StringValue> {
        self.get_with_metadata(key).map(BaggageEntry::value)
    }

    /// Returns the entry, value and metadata, associated with a given name.
    pub fn get_with_metadata<K: AsRef<str>>(&self, key: K) -> Option<&BaggageEntry> {
        let key = key.as_ref();
        if key.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| entry.key.as_str() == key)
    }

    /// Returns a new baggage with the given name/value pair first, followed
    /// by every other entry of `self`.
    ///
    /// Never fails. An invalid name or value yields an empty baggage. When
    /// the metadata is invalid or the new pair does not fit the
    /// [limits](Baggage#limits), the result holds the same entries as `self`,
    /// including any previous value for the name.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_baggage::baggage::Baggage;
    ///
    /// let baggage = Baggage::from_header("k1=v1").set("k2", "v2");
    /// assert_eq!(baggage.to_header(), "k2=v2,k1=v1");
    ///
    /// // invalid key
    /// assert!(baggage.set("", "v3").is_empty());
    /// ```
    pub fn set<K, V>(&self, key: K, value: V) -> Baggage
    where
        K: Into<Key>,
        V: Into<StringValue>,
    {
        self.set_with_metadata(key, value, BaggageMetadata::default())
    }

    /// Same as [`Baggage::set`], with metadata attached to the pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_baggage::baggage::Baggage;
    ///
    /// let baggage = Baggage::new().set_with_metadata("my-name", "my-value", "ttl=30");
    /// let entry = baggage.get_with_metadata("my-name").unwrap();
    ///
    /// assert_eq!(entry.metadata().as_str(), "ttl=30");
    /// assert_eq!(baggage.to_header(), "my-name=my-value;ttl=30");
    /// ```
    pub fn set_with_metadata<K, V, S>(&self, key: K, value: V, metadata: S) -> Baggage
    where
        K: Into<Key>,
        V: Into<StringValue>,
        S: Into<BaggageMetadata>,
    {
        match self.try_set_with_metadata(key, value, metadata) {
            Ok(baggage) => baggage,
            Err(err) => {
                otel_debug!(
                    name: "Baggage.Set.Rejected",
                    reason = err.to_string(),
                );
                match err {
                    BaggageError::InvalidKey | BaggageError::InvalidValue => Baggage::new(),
                    _ => self.clone(),
                }
            }
        }
    }

    /// Returns a new baggage with the pair set, or the reason it was
    /// rejected.
    ///
    /// This is the fallible form behind [`Baggage::set_with_metadata`] for
    /// callers that want to know why an update had no effect.
    pub fn try_set_with_metadata<K, V, S>(
        &self,
        key: K,
        value: V,
        metadata: S,
    ) -> Result<Baggage, BaggageError>
    where
        K: Into<Key>,
        V: Into<StringValue>,
        S: Into<BaggageMetadata>,
    {
        let entry = BaggageEntry::validated(key.into(), value.into(), metadata.into())?;
        if entry.encoded_len >= MAX_KEY_VALUE_SIZE {
            return Err(BaggageError::EntryTooLarge(entry.encoded_len));
        }

        let (count, others_len) = self
            .others(&entry.key)
            .fold((0, 0), |(count, len), e| (count + 1, len + e.encoded_len));
        if count >= MAX_KEY_VALUE_PAIRS {
            return Err(BaggageError::CapacityExceeded);
        }
        let total = others_len + entry.encoded_len;
        if total >= MAX_SIZE {
            return Err(BaggageError::HeaderTooLarge(total));
        }

        let key = entry.key.clone();
        let mut entries = Vec::with_capacity(count + 1);
        entries.push(entry);
        entries.extend(self.others(&key).cloned());
        Ok(Baggage {
            entries: entries.into(),
            encoded_len: total,
        })
    }

    /// Returns a new baggage without the given name, order preserved.
    ///
    /// Removing an absent name returns an equal baggage.
    pub fn remove<K: AsRef<str>>(&self, key: K) -> Baggage {
        let key = key.as_ref();
        Baggage::from_entries(
            self.entries
                .iter()
                .filter(|entry| entry.key.as_str() != key)
                .cloned()
                .collect(),
        )
    }

    /// Returns the number of entries in this baggage.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the baggage contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the encoded sizes of all entries, always below [`MAX_SIZE`].
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    /// Gets an iterator over the baggage entries, in container order.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// All entries, in container order.
    pub fn entries(&self) -> &[BaggageEntry] {
        &self.entries
    }

    /// Parses a `baggage` header value. See [`header::parse`].
    pub fn from_header(header: &str) -> Baggage {
        header::parse(header)
    }

    /// Serializes into a `baggage` header value. See [`header::format`].
    pub fn to_header(&self) -> String {
        header::format(self)
    }

    fn others<'a>(&'a self, key: &'a Key) -> impl Iterator<Item = &'a BaggageEntry> + 'a {
        self.entries.iter().filter(move |e| e.key != *key)
    }
}

/// One name/value pair of a [`Baggage`], with its metadata.
#[derive(Clone, Debug)]
pub struct BaggageEntry {
    key: Key,
    value: StringValue,
    metadata: BaggageMetadata,
    encoded_len: usize,
}

impl BaggageEntry {
    fn validated(
        key: Key,
        value: StringValue,
        metadata: BaggageMetadata,
    ) -> Result<Self, BaggageError> {
        if key.as_str().is_empty() || !percent::is_printable(key.as_str()) {
            return Err(BaggageError::InvalidKey);
        }
        if !percent::is_printable(value.as_str()) {
            return Err(BaggageError::InvalidValue);
        }
        let meta = metadata.as_str();
        if meta.contains(grammar::MEMBER_SEPARATOR) || !percent::is_printable(meta) {
            return Err(BaggageError::InvalidMetadata);
        }

        let encoded_len = percent::encoded_len(key.as_str())
            + percent::encoded_len(value.as_str())
            + meta.len();
        Ok(BaggageEntry {
            key,
            value,
            metadata,
            encoded_len,
        })
    }

    /// Entry decoded from a header; `encoded_len` is the raw member size.
    pub(crate) fn decoded(
        key: Key,
        value: StringValue,
        metadata: BaggageMetadata,
        encoded_len: usize,
    ) -> Self {
        BaggageEntry {
            key,
            value,
            metadata,
            encoded_len,
        }
    }

    /// The decoded name.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The decoded value.
    pub fn value(&self) -> &StringValue {
        &self.value
    }

    /// The metadata, verbatim.
    pub fn metadata(&self) -> &BaggageMetadata {
        &self.metadata
    }

    /// Size accounted against the baggage limits.
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }
}

impl PartialEq for BaggageEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value && self.metadata == other.metadata
    }
}

impl Eq for BaggageEntry {}

/// An iterator over the entries of a [`Baggage`].
#[derive(Debug)]
pub struct Iter<'a>(std::slice::Iter<'a, BaggageEntry>);

impl<'a> Iterator for Iter<'a> {
    type Item = &'a BaggageEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<'a> IntoIterator for &'a Baggage {
    type Item = &'a BaggageEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter(self.entries.iter())
    }
}

/// Builds a baggage by setting each pair in turn, so the last pair ends up
/// first. Pairs that would be rejected by [`Baggage::set`] are skipped
/// instead of clearing what was collected so far.
impl FromIterator<KeyValueMetadata> for Baggage {
    fn from_iter<I: IntoIterator<Item = KeyValueMetadata>>(iter: I) -> Self {
        iter.into_iter().fold(Baggage::new(), |baggage, kvm| {
            baggage
                .try_set_with_metadata(kvm.key, kvm.value, kvm.metadata)
                .unwrap_or(baggage)
        })
    }
}

impl<I> From<I> for Baggage
where
    I: IntoIterator,
    I::Item: Into<KeyValueMetadata>,
{
    fn from(value: I) -> Self {
        value.into_iter().map(Into::into).collect()
    }
}

/// Methods for storing and retrieving baggage in a context.
pub trait BaggageExt {
    /// Returns a clone of the given context with the given baggage.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_baggage::{baggage::{Baggage, BaggageExt}, Context, StringValue};
    ///
    /// // Explicit `Baggage` creation
    /// let baggage = Baggage::new().set("my-name", "my-value");
    /// let cx = Context::map_current(|cx| cx.with_baggage(baggage));
    ///
    /// // Passing an iterator
    /// let cx = Context::map_current(|cx| cx.with_baggage([("my-name", "my-value")]));
    ///
    /// assert_eq!(
    ///     cx.baggage().get("my-name"),
    ///     Some(&StringValue::from("my-value")),
    /// )
    /// ```
    fn with_baggage<T: Into<Baggage>>(&self, baggage: T) -> Self;

    /// Returns a clone of the current context with the given baggage.
    fn current_with_baggage<T: Into<Baggage>>(baggage: T) -> Self;

    /// Returns a clone of the given context with no baggage.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_baggage::{baggage::BaggageExt, Context};
    ///
    /// let cx = Context::map_current(|cx| cx.with_cleared_baggage());
    ///
    /// assert_eq!(cx.baggage().len(), 0);
    /// ```
    fn with_cleared_baggage(&self) -> Self;

    /// Returns a reference to this context's baggage, or the default
    /// empty baggage if none has been set.
    fn baggage(&self) -> &Baggage;

    /// Returns `true` if a baggage was explicitly stored in this context.
    fn has_baggage(&self) -> bool;
}

/// Solely used to store `Baggage` in the `Context` without allowing direct access
#[derive(Debug)]
struct BaggageContextValue(Baggage);

impl BaggageExt for Context {
    fn with_baggage<T: Into<Baggage>>(&self, baggage: T) -> Self {
        self.with_value(BaggageContextValue(baggage.into()))
    }

    fn current_with_baggage<T: Into<Baggage>>(baggage: T) -> Self {
        Context::map_current(|cx| cx.with_baggage(baggage))
    }

    fn with_cleared_baggage(&self) -> Self {
        self.with_baggage(Baggage::new())
    }

    fn baggage(&self) -> &Baggage {
        self.get::<BaggageContextValue>()
            .map_or(get_default_baggage(), |b| &b.0)
    }

    fn has_baggage(&self) -> bool {
        self.get::<BaggageContextValue>().is_some()
    }
}

/// Opaque metadata attached to a [`Baggage`] value.
///
/// Metadata is everything after the first `;` of a list-member, e.g.
/// `ttl=30;red`. It is carried verbatim, never percent-decoded, and trimmed of
/// surrounding whitespace.
#[derive(Clone, Debug, PartialOrd, PartialEq, Eq, Default)]
pub struct BaggageMetadata(StringValue);

impl BaggageMetadata {
    /// Return underlying string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `true` if no metadata is attached.
    pub fn is_empty(&self) -> bool {
        self.0.as_str().is_empty()
    }
}

impl From<String> for BaggageMetadata {
    fn from(s: String) -> BaggageMetadata {
        if s.trim().len() == s.len() {
            BaggageMetadata(s.into())
        } else {
            BaggageMetadata(s.trim().to_owned().into())
        }
    }
}

impl From<&str> for BaggageMetadata {
    fn from(s: &str) -> Self {
        BaggageMetadata(s.trim().to_owned().into())
    }
}

impl fmt::Display for BaggageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// [`Baggage`] name/value pairs with their associated metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyValueMetadata {
    /// Dimension or event key
    pub(crate) key: Key,
    /// Dimension or event value
    pub(crate) value: StringValue,
    /// Metadata associate with this key value pair
    pub(crate) metadata: BaggageMetadata,
}

impl KeyValueMetadata {
    /// Create a new `KeyValue` pair with metadata
    pub fn new<K, V, S>(key: K, value: V, metadata: S) -> Self
    where
        K: Into<Key>,
        V: Into<StringValue>,
        S: Into<BaggageMetadata>,
    {
        KeyValueMetadata {
            key: key.into(),
            value: value.into(),
            metadata: metadata.into(),
        }
    }
}

impl<K, V> From<(K, V)> for KeyValueMetadata
where
    K: Into<Key>,
    V: Into<StringValue>,
{
    fn from((key, value): (K, V)) -> Self {
        KeyValueMetadata::new(key, value, BaggageMetadata::default())
    }
}

impl From<&BaggageEntry> for KeyValueMetadata {
    fn from(entry: &BaggageEntry) -> Self {
        KeyValueMetadata {
            key: entry.key.clone(),
            value: entry.value.clone(),
            metadata: entry.metadata.clone(),
        }
    }
}
