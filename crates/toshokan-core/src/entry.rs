//! Catalog records.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::tags::{join_tags, split_tags};

/// One catalog record.
///
/// Field names on disk follow the existing `toshokan.json` layout
/// (`Title`, `Authors`, `Year`, `Tags`, `Read`, `BibText`, `Notes`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Entry {
    pub title: String,
    pub authors: String,
    /// Kept as text: partial years, ranges and leading zeros survive.
    pub year: String,
    /// Always normalized by `split_tags`, so every tag survives a save/load.
    #[serde(serialize_with = "tags_to_string", deserialize_with = "tags_from_string")]
    tags: Vec<String>,
    pub read: bool,
    pub bib_text: String,
    pub notes: String,
}

impl Entry {
    /// A fresh unread entry with no tags.
    pub fn new(
        title: impl Into<String>,
        authors: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            authors: authors.into(),
            year: year.into(),
            ..Default::default()
        }
    }

    /// Replace the tags from a `;`-delimited string.
    pub fn set_tags(&mut self, raw: &str) {
        self.tags = split_tags(raw);
    }

    /// Tags in entry order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tags in their persisted `;`-joined form.
    pub fn tags_string(&self) -> String {
        join_tags(&self.tags)
    }

    /// Set view of the tags for membership tests.
    pub fn tag_set(&self) -> BTreeSet<&str> {
        self.tags.iter().map(String::as_str).collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tags.iter().any(|t| t == tag)
    }

    /// `o` for read, `-` for unread.
    pub fn read_marker(&self) -> &'static str {
        if self.read {
            "o"
        } else {
            "-"
        }
    }
}

fn tags_to_string<S: Serializer>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&join_tags(tags))
}

fn tags_from_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(split_tags(&raw))
}
