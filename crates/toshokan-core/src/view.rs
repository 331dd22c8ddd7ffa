//! Filtered, sorted projections of the catalog.

use crate::catalog::Catalog;
use crate::entry::Entry;
use crate::tags::TagFilter;

/// One visible row: an entry and the id it is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRow<'a> {
    pub id: &'a str,
    pub entry: &'a Entry,
}

/// Whether `entry` belongs in the view for `filter`.
pub fn matches(entry: &Entry, filter: &TagFilter) -> bool {
    match filter {
        TagFilter::All => true,
        TagFilter::Read => entry.read,
        TagFilter::Unread => !entry.read,
        TagFilter::Tag(tag) => entry.has_tag(tag),
    }
}

/// Entries passing `filter`, ordered by title then id.
///
/// An unknown tag simply matches nothing.
pub fn project<'a>(catalog: &'a Catalog, filter: &TagFilter) -> Vec<ViewRow<'a>> {
    let mut rows: Vec<ViewRow<'a>> = catalog
        .all()
        .filter(|(_, entry)| matches(entry, filter))
        .map(|(id, entry)| ViewRow { id, entry })
        .collect();
    rows.sort_by(|a, b| a.entry.title.cmp(&b.entry.title).then_with(|| a.id.cmp(b.id)));
    rows
}

/// Keep rows whose title, authors or year contain `query`, ignoring case.
pub fn search<'a>(rows: Vec<ViewRow<'a>>, query: &str) -> Vec<ViewRow<'a>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| {
            [&row.entry.title, &row.entry.authors, &row.entry.year]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
