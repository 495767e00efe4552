//! # Propagator interface
//!
//! Propagators read and write context data, here [`Baggage`], to and from the
//! messages exchanged between processes. A [`TextMapPropagator`] works on
//! carriers of string key/value pairs such as HTTP headers, reached through
//! the [`Injector`] and [`Extractor`] traits.
//!
//! [`Baggage`]: crate::baggage::Baggage
use std::borrow::Cow;
use std::collections::HashMap;
use std::env;

pub mod composite;
pub mod noop;
pub mod text_map_propagator;

pub use composite::TextMapCompositePropagator;
pub use noop::NoopTextMapPropagator;
pub use text_map_propagator::{FieldIter, TextMapPropagator};

/// Injector provides an interface for adding fields from an underlying struct like `HashMap`
pub trait Injector {
    /// Add a key and value to the underlying data.
    fn set(&mut self, key: &str, value: String);

    #[allow(unused_variables)]
    /// Hint to reserve capacity for at least `additional` more entries to be inserted.
    fn reserve(&mut self, additional: usize) {}
}

/// Extractor provides an interface for removing fields from an underlying struct like `HashMap`
pub trait Extractor {
    /// Get a value from a key from the underlying data.
    fn get(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Collect all the keys from the underlying data.
    fn keys(&self) -> Vec<Cow<'_, str>>;

    /// Get all values from a key from the underlying data.
    fn get_all(&self, key: &str) -> Option<Vec<Cow<'_, str>>> {
        self.get(key).map(|value| vec![value])
    }
}

/// Header names are case-insensitive, the map stores them lowercase.
impl<S: std::hash::BuildHasher> Injector for HashMap<String, String, S> {
    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_lowercase(), value);
    }

    fn reserve(&mut self, additional: usize) {
        self.reserve(additional);
    }
}

impl<S: std::hash::BuildHasher> Extractor for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(&key.to_lowercase())
            .map(|v| Cow::Borrowed(v.as_str()))
    }

    fn keys(&self) -> Vec<Cow<'_, str>> {
        self.keys().map(|k| Cow::Borrowed(k.as_str())).collect()
    }
}

/// Extractor for environment variables, e.g. `BAGGAGE` handed down by a
/// parent process.
///
/// Lookups are case-insensitive, variable names are uppercased.
#[derive(Debug, Default)]
pub struct EnvExtractor {
    _private: (),
}

impl EnvExtractor {
    /// Create a new extractor that reads from environment variables.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Extractor for EnvExtractor {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        env::var(key.to_uppercase()).ok().map(Cow::Owned)
    }

    fn keys(&self) -> Vec<Cow<'_, str>> {
        env::vars()
            .map(|(k, _)| Cow::Owned(k.to_lowercase()))
            .collect()
    }
}

/// Sets environment variables on a child process, names uppercased.
impl Injector for std::process::Command {
    fn set(&mut self, key: &str, value: String) {
        self.env(key.to_uppercase(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_map_get() {
        let mut carrier = HashMap::new();
        carrier.set("Baggage", "k1=v1".to_string());

        assert_eq!(
            Extractor::get(&carrier, "BAGGAGE"),
            Some(Cow::Borrowed("k1=v1")),
            "case insensitive extraction"
        );
        assert_eq!(
            Extractor::get_all(&carrier, "baggage"),
            Some(vec![Cow::Borrowed("k1=v1")])
        );
        assert_eq!(Extractor::get_all(&carrier, "missing"), None);
    }

    #[test]
    fn hash_map_keys() {
        let mut carrier = HashMap::new();
        carrier.set("headerName1", "value1".to_string());
        carrier.set("headerName2", "value2".to_string());

        let got = Extractor::keys(&carrier);
        assert_eq!(got.len(), 2);
        assert!(got.contains(&Cow::Borrowed("headername1")));
        assert!(got.contains(&Cow::Borrowed("headername2")));
    }

    #[test]
    fn hash_map_injector_reserve() {
        let mut carrier: HashMap<String, String> = HashMap::new();
        Injector::reserve(&mut carrier, 5);
        assert!(carrier.capacity() >= 5);

        Injector::set(&mut carrier, "k", "v".to_string());
        assert_eq!(Extractor::get(&carrier, "k"), Some(Cow::Borrowed("v")));
    }

    #[test]
    fn env_extractor_get() {
        temp_env::with_var("BAGGAGE", Some("user_id=12345"), || {
            let extractor = EnvExtractor::new();
            assert_eq!(
                extractor.get("baggage"),
                Some(Cow::Owned("user_id=12345".to_string()))
            );
            assert!(extractor
                .keys()
                .contains(&Cow::Owned("baggage".to_string())));
        });
        temp_env::with_var_unset("BAGGAGE", || {
            assert_eq!(EnvExtractor::new().get("baggage"), None);
        });
    }

    #[test]
    fn command_injector() {
        use std::process::Command;

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo $BAGGAGE");
        Injector::set(&mut cmd, "baggage", "user_id=12345,session_id=abc".to_string());

        let output = cmd.output().expect("failed to execute command");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout.trim(), "user_id=12345,session_id=abc");
    }
}
