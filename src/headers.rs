//! HTTP Headers
//!
//! Response header names are case-insensitive. The map normalizes names to
//! lowercase on insert, so lookups only need to lowercase the query.

use std::collections::{hash_map, HashMap};

/// Indicates the size of the entity-body.
///
/// The header value must be a decimal indicating the number of octets sent
/// to the recipient. It is the only header the reader interprets itself.
pub const CONTENT_LENGTH: &str = "content-length";

/// Response headers keyed by lowercase name.
///
/// Names are unique; inserting a name twice keeps the last value. Values are
/// stored with surrounding whitespace trimmed. Order is not preserved.
#[derive(Clone, Debug, Default)]
pub struct HeaderMap {
    entries: HashMap<String, String>,
}

impl HeaderMap {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of the specified header, looked up case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Number of distinct header names stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: &str, value: &str) {
        self.entries
            .insert(name.to_ascii_lowercase(), value.trim().to_owned());
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
