//! Tag parsing and the derived tag index.
//!
//! Tags are free text separated by `;` in the catalog file. Case is kept
//! as typed; whitespace around each tag is not significant.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::TagLabels;

/// Separator between tags in the persisted tag string.
pub const TAG_DELIMITER: char = ';';

/// Parse a delimited tag string into an ordered, duplicate-free list.
///
/// # Examples
/// ```
/// use toshokan_core::split_tags;
/// assert_eq!(split_tags("foo; bar ;"), vec!["foo", "bar"]);
/// assert!(split_tags(" ; ;").is_empty());
/// ```
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

/// Join tags back into the persisted form.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(&TAG_DELIMITER.to_string())
}

/// A tag selection for the catalog view.
///
/// The pseudo-tags are variants rather than reserved strings, so a user tag
/// can never shadow them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagFilter {
    All,
    Read,
    Unread,
    Tag(String),
}

impl TagFilter {
    /// Whether this is one of the three built-in selections.
    pub fn is_pseudo(&self) -> bool {
        !matches!(self, Self::Tag(_))
    }

    /// Text shown for this selection in the tag panel.
    pub fn label<'a>(&'a self, labels: &'a TagLabels) -> &'a str {
        match self {
            Self::All => &labels.all,
            Self::Read => &labels.read,
            Self::Unread => &labels.unread,
            Self::Tag(tag) => tag,
        }
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::All
    }
}

/// Distinct user tags across the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: BTreeSet<String>,
}

impl TagIndex {
    /// Collect every tag used by any entry.
    pub fn derive(catalog: &Catalog) -> Self {
        let tags = catalog
            .all()
            .flat_map(|(_, entry)| entry.tags().iter().cloned())
            .collect();
        Self { tags }
    }

    /// User tags in byte order.
    pub fn user_tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag.trim())
    }

    /// Number of selectable filters, pseudo-tags included.
    pub fn filter_count(&self) -> usize {
        self.tags.len() + 3
    }

    /// Display order: All, Read, Unread pinned first, then user tags.
    pub fn filters(&self) -> Vec<TagFilter> {
        let mut filters = vec![TagFilter::All, TagFilter::Read, TagFilter::Unread];
        filters.extend(self.tags.iter().cloned().map(TagFilter::Tag));
        filters
    }
}
