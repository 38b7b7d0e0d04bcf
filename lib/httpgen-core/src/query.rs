//! Query-string parsing and encoding.
//!
//! The parser is strict on purpose: it is used to decide whether a payload
//! can be flattened into a native form map, so anything it cannot decode
//! exactly makes the fragment ineligible.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::Result;

/// Bytes left untouched by form-style escaping.
const FORM_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a whole value the way HTML forms do (space becomes `+`).
#[must_use]
pub fn form_escape(value: &str) -> String {
    utf8_percent_encode(value, FORM_ESCAPE)
        .to_string()
        .replace("%20", "+")
}

/// Ordered `key -> [values]` map.
///
/// Keys keep their first-seen order; values keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormMap {
    entries: Vec<(String, Vec<String>)>,
}

impl FormMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Merges another map into this one, keeping order.
    pub fn extend(&mut self, other: Self) {
        for (key, values) in other.entries {
            for value in values {
                self.append(key.clone(), value);
            }
        }
    }

    /// Values for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Iterate over `(key, values)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Flattened `(key, value)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(key, values)| {
            values.iter().map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if any value of any key is empty.
    #[must_use]
    pub fn has_empty_value(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, values)| values.iter().any(String::is_empty))
    }

    /// Encode as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> Result<String> {
        let pairs: Vec<_> = self.pairs().collect();
        Ok(serde_html_form::to_string(pairs)?)
    }
}

impl Serialize for FormMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Strictly parse a query string.
///
/// Empty segments are skipped, a segment without `=` has an empty value, `+`
/// decodes to a space. Returns `None` on an invalid `%` escape or a decoded
/// value that is not UTF-8.
#[must_use]
pub fn parse_query(query: &str) -> Option<FormMap> {
    let mut map = FormMap::new();
    for segment in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        map.append(unescape(key)?, unescape(value)?);
    }
    Some(map)
}

fn unescape(component: &str) -> Option<String> {
    let bytes = component.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'%' {
            let hex = bytes.get(index + 1..index + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
        }
    }
    let plus_decoded = component.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
