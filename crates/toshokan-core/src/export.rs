//! Bibliography export: concatenate the `.bib` records of a view.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::filename::{stem, with_extension};
use crate::store::write_atomic;
use crate::view::ViewRow;

/// Result of an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Number of records written
    pub written: usize,
    /// Ids without a bibliography file
    pub missing: Vec<String>,
}

/// Write the bibliography records of `rows`, in view order, to `destination`.
///
/// Records are read from `<bibs_dir>/<stem>.<bib_extension>` and separated by
/// a blank line. The destination is replaced as a whole.
pub fn export_bibliography(
    rows: &[ViewRow<'_>],
    bibs_dir: &Path,
    bib_extension: &str,
    destination: &Path,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();
    let mut records = Vec::new();

    for row in rows {
        let path = bibs_dir.join(with_extension(stem(row.id), bib_extension));
        match fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => records.push(text.trim().to_string()),
            Ok(_) => report.missing.push(row.id.to_string()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                report.missing.push(row.id.to_string())
            }
            Err(source) => return Err(ExportError::Read { path, source }.into()),
        }
    }

    let mut output = records.join("\n\n");
    if !output.is_empty() {
        output.push('\n');
    }
    write_atomic(destination, output.as_bytes()).map_err(|source| ExportError::Write {
        path: destination.to_path_buf(),
        source,
    })?;

    report.written = records.len();
    tracing::debug!(
        written = report.written,
        missing = report.missing.len(),
        destination = %destination.display(),
        "exported bibliography"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::entry::Entry;
    use crate::tags::TagFilter;
    use crate::error::ToshokanError;
    use crate::view::project;
    use tempfile::TempDir;

    #[test]
    fn concatenates_in_view_order() {
        let dir = TempDir::new().unwrap();
        let bibs = dir.path().join("bibs");
        fs::create_dir(&bibs).unwrap();
        fs::write(bibs.join("b_1_Beta.bib"), "@misc{beta}\n").unwrap();
        fs::write(bibs.join("a_2_Alpha.bib"), "@misc{alpha}").unwrap();

        let mut catalog = Catalog::new();
        catalog.set("b_1_Beta.pdf", Entry::new("Beta", "b", "1"));
        catalog.set("a_2_Alpha.pdf", Entry::new("Alpha", "a", "2"));
        catalog.set("c_3_Gamma.pdf", Entry::new("Gamma", "c", "3"));
        let rows = project(&catalog, &TagFilter::All);

        let out = dir.path().join("export.bib");
        let report = export_bibliography(&rows, &bibs, "bib", &out).unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(report.missing, vec!["c_3_Gamma.pdf"]);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "@misc{alpha}\n\n@misc{beta}\n"
        );
    }

    #[test]
    fn unwritable_destination_keeps_io_source() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be replaced by the export file.
        let out = dir.path().join("taken");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("child"), "x").unwrap();

        let err = export_bibliography(&[], dir.path(), "bib", &out).unwrap_err();
        match err {
            ToshokanError::Export(export) => {
                assert!(matches!(&export, ExportError::Write { path, .. } if path == &out));
                assert!(std::error::Error::source(&export).is_some());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_view_writes_empty_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("export.bib");
        let report = export_bibliography(&[], dir.path(), "bib", &out).unwrap();
        assert_eq!(report, ExportReport::default());
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }
}
