//! The keyed collection of entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// Mapping from entry id (the document filename) to entry.
///
/// Iteration order is by id, which keeps the catalog file stable between
/// saves. Display order is decided by the view, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, Entry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.get_mut(id)
    }

    /// Insert or replace the entry stored under `id`.
    pub fn set(&mut self, id: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.entries.insert(id.into(), entry)
    }

    pub fn delete(&mut self, id: &str) -> Option<Entry> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn all(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Entry)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Entry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let mut catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.set("a.pdf", Entry::new("A", "", "")).is_none());
        assert!(catalog.set("a.pdf", Entry::new("A2", "", "")).is_some());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("a.pdf").map(|e| e.title.as_str()), Some("A2"));

        catalog.get_mut("a.pdf").unwrap().read = true;
        assert!(catalog.get("a.pdf").unwrap().read);

        assert!(catalog.delete("a.pdf").is_some());
        assert!(catalog.delete("a.pdf").is_none());
        assert!(!catalog.contains("a.pdf"));
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut catalog = Catalog::new();
        catalog.set("x_1_y.pdf", Entry::new("y", "x", "1"));
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["x_1_y.pdf"]["Title"], "y");
    }
}
