use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Dvar table keyed by hash string.
///
/// Keeps insertion order so an untouched table is written back in the order
/// it was read. A key may hold no value (`None`); such entries are skipped
/// when the table is serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DvarMap {
    entries: Vec<(String, Option<String>)>,
    index: HashMap<String, usize>,
}

impl DvarMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let &slot = self.index.get(key)?;
        self.entries[slot].1.as_deref()
    }

    /// Insert or replace; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.set(key.into(), Some(value.into()))
    }

    /// Keep the key but drop its value.
    pub fn unset(&mut self, key: impl Into<String>) -> Option<String> {
        self.set(key.into(), None)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.entries.remove(slot);
        for (_, later) in self.index.iter_mut() {
            if *later > slot {
                *later -= 1;
            }
        }
        value
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// Entries that carry a value.
    pub fn defined(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| Some((key.as_str(), value.as_deref()?)))
    }

    fn set(&mut self, key: String, value: Option<String>) -> Option<String> {
        match self.index.get(&key) {
            Some(&slot) => std::mem::replace(&mut self.entries[slot].1, value),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DvarMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for DvarMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DvarMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DvarMapVisitor)
    }
}

struct DvarMapVisitor;

impl<'de> Visitor<'de> for DvarMapVisitor {
    type Value = DvarMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of dvar hash to string value or null")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = DvarMap::new();
        while let Some((key, value)) = access.next_entry::<String, Option<String>>()? {
            map.set(key, value);
        }
        Ok(map)
    }
}
