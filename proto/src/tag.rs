use serde::{Deserialize, Serialize};
use std::fmt;

/// One name/value metadata pair attached to a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self { Self { name: name.into(), value: value.into() } }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}={}", self.name, self.value) }
}

/// The tags of a single record, in wire order. Names are unique: inserting an
/// existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new() -> Self { Self(Vec::new()) }

    pub fn get(&self, name: &str) -> Option<&str> { self.0.iter().find(|tag| tag.name == name).map(|tag| tag.value.as_str()) }

    pub fn contains(&self, name: &str) -> bool { self.0.iter().any(|tag| tag.name == name) }

    /// Returns the previous value if `name` was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|tag| tag.name == name) {
            Some(tag) => Some(std::mem::replace(&mut tag.value, value)),
            None => {
                self.0.push(Tag { name, value });
                None
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> { self.0.iter() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self { iter.into_iter().map(|tag| (tag.name, tag.value)).collect() }
}

impl IntoIterator for TagSet {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;
    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}
