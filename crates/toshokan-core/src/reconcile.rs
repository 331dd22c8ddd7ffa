//! Aligning the catalog with the document directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::catalog::Catalog;
use crate::entry::Entry;
use crate::error::ScanError;
use crate::filename::FilenameCodec;

/// Filenames found in the document directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    files: BTreeSet<String>,
    /// Hidden or non UTF-8 names that were left out
    pub skipped: usize,
}

impl DirectoryListing {
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DirectoryListing {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(Into::into).collect(),
            skipped: 0,
        }
    }
}

/// List the regular files directly inside `dir`.
///
/// Subdirectories are skipped, not descended into. Dotfiles and names that
/// are not valid UTF-8 are counted in `skipped`.
pub fn scan_directory(dir: &Path) -> Result<DirectoryListing, ScanError> {
    let unreadable = |source| ScanError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut listing = DirectoryListing::default();
    for dirent in fs::read_dir(dir).map_err(unreadable)? {
        let dirent = dirent.map_err(unreadable)?;
        // Follows symlinks, so a link to a directory is skipped too.
        let is_dir = fs::metadata(dirent.path())
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            continue;
        }
        match dirent.file_name().into_string() {
            Ok(name) if !name.starts_with('.') => {
                listing.files.insert(name);
            }
            _ => listing.skipped += 1,
        }
    }
    Ok(listing)
}

/// What a reconcile pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Added files whose names did not decode; they got placeholder entries
    pub placeholders: Vec<String>,
}

impl ReconcileReport {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Result of reconciling a catalog against a listing.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub catalog: Catalog,
    pub report: ReconcileReport,
}

/// Builds entries for new files and drops entries whose file is gone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    codec: FilenameCodec,
}

impl Reconciler {
    pub fn new(codec: FilenameCodec) -> Self {
        Self { codec }
    }

    /// Compute the reconciled catalog without touching `catalog`.
    ///
    /// The caller swaps the result in, so a failure before this point leaves
    /// the live catalog as it was.
    pub fn reconcile(&self, catalog: &Catalog, listing: &DirectoryListing) -> Reconciliation {
        let mut next = catalog.clone();
        let mut report = ReconcileReport::default();

        for file in listing.files() {
            if next.contains(file) {
                continue;
            }
            let entry = self.entry_for(file, &mut report);
            next.set(file, entry);
            report.added.push(file.to_string());
        }

        let orphaned: Vec<String> = catalog
            .ids()
            .filter(|id| !listing.contains(id))
            .map(str::to_string)
            .collect();
        for id in orphaned {
            next.delete(&id);
            report.removed.push(id);
        }

        tracing::debug!(
            added = report.added.len(),
            removed = report.removed.len(),
            placeholders = report.placeholders.len(),
            "reconciled catalog"
        );
        Reconciliation {
            catalog: next,
            report,
        }
    }

    /// A new unread, untagged entry for `file`.
    ///
    /// Names that do not decode become placeholders titled with the filename.
    pub fn entry_for(&self, file: &str, report: &mut ReconcileReport) -> Entry {
        match self.codec.decode(file) {
            Ok(decoded) => Entry::new(decoded.title, decoded.authors, decoded.year),
            Err(_) => {
                report.placeholders.push(file.to_string());
                Entry::new(file, "", "")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn listing(names: &[&str]) -> DirectoryListing {
        names.iter().copied().collect()
    }

    #[test]
    fn new_file_is_decoded() {
        let result = Reconciler::default().reconcile(
            &Catalog::new(),
            &listing(&["Smith-Jones_2021_On-Widgets.pdf"]),
        );
        let entry = result.catalog.get("Smith-Jones_2021_On-Widgets.pdf").unwrap();
        assert_eq!(entry.authors, "Smith Jones");
        assert_eq!(entry.year, "2021");
        assert_eq!(entry.title, "On Widgets");
        assert!(!entry.read);
        assert!(entry.tags().is_empty());
        assert_eq!(result.report.added, vec!["Smith-Jones_2021_On-Widgets.pdf"]);
    }

    #[test]
    fn malformed_file_gets_placeholder() {
        let result = Reconciler::default().reconcile(&Catalog::new(), &listing(&["scan0001.pdf"]));
        let entry = result.catalog.get("scan0001.pdf").unwrap();
        assert_eq!(entry.title, "scan0001.pdf");
        assert_eq!(entry.authors, "");
        assert_eq!(entry.year, "");
        assert_eq!(result.report.placeholders, vec!["scan0001.pdf"]);
    }

    #[test]
    fn existing_entries_keep_their_edits() {
        let mut catalog = Catalog::new();
        let mut entry = Entry::new("Custom Title", "Me", "2000");
        entry.read = true;
        entry.set_tags("keep");
        catalog.set("Me_2000_Other.pdf", entry.clone());

        let result = Reconciler::default().reconcile(&catalog, &listing(&["Me_2000_Other.pdf"]));
        assert_eq!(result.catalog.get("Me_2000_Other.pdf"), Some(&entry));
        assert!(result.report.is_unchanged());
    }

    #[test]
    fn missing_file_removes_entry() {
        let mut catalog = Catalog::new();
        catalog.set("a_1_x.pdf", Entry::new("x", "a", "1"));
        catalog.set("b_2_y.pdf", Entry::new("y", "b", "2"));

        let result = Reconciler::default().reconcile(&catalog, &listing(&["b_2_y.pdf"]));
        assert!(!result.catalog.contains("a_1_x.pdf"));
        assert_eq!(result.report.removed, vec!["a_1_x.pdf"]);
        // input untouched
        assert!(catalog.contains("a_1_x.pdf"));
    }

    #[test]
    fn scan_skips_directories_and_hidden_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a_1_x.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("b_2_y.pdf"), b"%PDF").unwrap();

        let listing = scan_directory(dir.path()).unwrap();
        assert_eq!(listing.files().collect::<Vec<_>>(), vec!["a_1_x.pdf"]);
        assert_eq!(listing.skipped, 1);
    }

    #[test]
    fn scan_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let err = scan_directory(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, ScanError::Unreadable { .. }));
    }

    fn arb_catalog() -> impl Strategy<Value = Catalog> {
        proptest::collection::btree_map("[a-c]_[0-9]_[a-c]\\.pdf", any::<bool>(), 0..6).prop_map(
            |m| {
                m.into_iter()
                    .map(|(id, read)| {
                        let mut entry = Entry::new("t", "a", "1");
                        entry.read = read;
                        (id, entry)
                    })
                    .collect::<Catalog>()
            },
        )
    }

    proptest! {
        #[test]
        fn key_set_matches_listing(
            catalog in arb_catalog(),
            files in proptest::collection::btree_set("[a-c]_[0-9]_[a-c]\\.pdf|[a-z]{1,4}\\.txt", 0..8),
        ) {
            let listing: DirectoryListing = files.iter().cloned().collect();
            let result = Reconciler::default().reconcile(&catalog, &listing);
            let keys: BTreeSet<&str> = result.catalog.ids().collect();
            let expected: BTreeSet<&str> = files.iter().map(String::as_str).collect();
            prop_assert_eq!(keys, expected);
        }

        #[test]
        fn reconcile_is_idempotent(
            catalog in arb_catalog(),
            files in proptest::collection::btree_set("[a-c]_[0-9]_[a-c]\\.pdf", 0..8),
        ) {
            let listing: DirectoryListing = files.into_iter().collect();
            let reconciler = Reconciler::default();
            let once = reconciler.reconcile(&catalog, &listing);
            let twice = reconciler.reconcile(&once.catalog, &listing);
            prop_assert_eq!(&twice.catalog, &once.catalog);
            prop_assert!(twice.report.is_unchanged());
        }
    }
}
