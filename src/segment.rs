use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Pasal\s+\d+[A-Za-z]?(?:\s+ayat\s*\(\d+\))?").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clause bodies keyed by heading, in first-seen document order.
/// Inserting an existing key replaces its body in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ClauseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous body when `key` was already present.
    pub fn insert(&mut self, key: impl Into<String>, body: impl Into<String>) -> Option<String> {
        let key = key.into();
        let body = body.into();
        if let Some(&pos) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[pos].1, body));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, body));
        None
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClauseMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ClauseMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for ClauseMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Lazily scan `text` for clause headings, yielding `(byte_offset, heading)` pairs.
pub fn headings(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    RE_HEADING.find_iter(text).map(|m| (m.start(), m.as_str()))
}

/// Canonical form of a matched heading: trimmed, inner whitespace folded to one space.
/// Heading isolation puts "ayat (n)" on its own line, so "Pasal 5\nayat (2)" keys as "Pasal 5 ayat (2)".
pub fn clause_key(heading: &str) -> String {
    RE_WS.replace_all(heading.trim(), " ").into_owned()
}

/// Split normalized text into clauses. Each clause runs from the start of its heading
/// up to the next heading; text before the first heading is dropped.
pub fn segment(text: &str) -> ClauseMap {
    let found: Vec<(usize, &str)> = headings(text).collect();
    let mut map = ClauseMap::new();
    for (i, &(start, heading)) in found.iter().enumerate() {
        let end = found.get(i + 1).map(|&(next, _)| next).unwrap_or(text.len());
        let body = text[start + heading.len()..end].trim();
        // last occurrence wins on duplicate headings
        map.insert(clause_key(heading), body);
    }
    map
}
