//! Mapping between entry metadata and document filenames.
//!
//! Documents are named `authors_year_title.ext`. Spaces inside authors and
//! title are written as a separator character (`-` by default) so the three
//! fields stay underscore-delimited.

use serde::{Deserialize, Serialize};

use crate::error::FilenameError;

/// Delimiter between the three identifying fields.
pub const FIELD_DELIMITER: char = '_';

/// Identifying fields recovered from a filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedName {
    pub authors: String,
    pub year: String,
    pub title: String,
    pub extension: String,
}

/// Encoder/decoder for canonical document filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameCodec {
    separator: char,
}

impl Default for FilenameCodec {
    fn default() -> Self {
        Self { separator: '-' }
    }
}

impl FilenameCodec {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Build `authors_year_title.extension`.
    ///
    /// An empty extension produces a name without a trailing dot.
    pub fn encode(&self, authors: &str, year: &str, title: &str, extension: &str) -> String {
        let sep = self.separator.to_string();
        let stem = format!(
            "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
            authors.replace(' ', &sep),
            year,
            title.replace(' ', &sep)
        );
        with_extension(&stem, extension)
    }

    /// Split a filename back into authors, year and title.
    ///
    /// Underscores beyond the second stay in the title.
    pub fn decode(&self, filename: &str) -> Result<DecodedName, FilenameError> {
        let (stem, extension) = split_extension(filename);
        let mut parts = stem.splitn(3, FIELD_DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(authors), Some(year), Some(title)) => Ok(DecodedName {
                authors: authors.replace(self.separator, " "),
                year: year.to_string(),
                title: title.replace(self.separator, " "),
                extension: extension.to_string(),
            }),
            _ => Err(FilenameError::Malformed {
                filename: filename.to_string(),
            }),
        }
    }
}

/// Split at the last `.`; a leading dot does not start an extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos + 1..]),
        _ => (filename, ""),
    }
}

/// Filename without its extension.
pub fn stem(filename: &str) -> &str {
    split_extension(filename).0
}

/// `stem.extension`, or just `stem` when the extension is empty.
pub fn with_extension(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn encode_replaces_spaces() {
        let codec = FilenameCodec::default();
        assert_eq!(
            codec.encode("Smith Jones", "2021", "On Widgets", "pdf"),
            "Smith-Jones_2021_On-Widgets.pdf"
        );
        assert_eq!(codec.encode("A", "1", "B", ""), "A_1_B");
    }

    #[test]
    fn decode_canonical_name() {
        let decoded = FilenameCodec::default()
            .decode("Smith-Jones_2021_On-Widgets.pdf")
            .unwrap();
        assert_eq!(decoded.authors, "Smith Jones");
        assert_eq!(decoded.year, "2021");
        assert_eq!(decoded.title, "On Widgets");
        assert_eq!(decoded.extension, "pdf");
    }

    #[rstest]
    #[case("nounderscores.pdf")]
    #[case("only_two.pdf")]
    #[case("")]
    #[case(".hidden")]
    fn malformed_names(#[case] name: &str) {
        let err = FilenameCodec::default().decode(name).unwrap_err();
        assert_eq!(
            err,
            FilenameError::Malformed {
                filename: name.to_string()
            }
        );
    }

    #[test]
    fn extra_underscores_stay_in_title() {
        let decoded = FilenameCodec::default()
            .decode("Doe_2020_snake_case-rules.v2.pdf")
            .unwrap();
        assert_eq!(decoded.title, "snake_case rules.v2");
        assert_eq!(decoded.extension, "pdf");
    }

    #[test]
    fn custom_separator() {
        let codec = FilenameCodec::new('+');
        let name = codec.encode("Ada Lovelace", "1843", "Notes", "pdf");
        assert_eq!(name, "Ada+Lovelace_1843_Notes.pdf");
        assert_eq!(codec.decode(&name).unwrap().authors, "Ada Lovelace");
    }

    #[rstest]
    #[case("a_1_b.pdf", "a_1_b", "pdf")]
    #[case("a_1_b", "a_1_b", "")]
    #[case("a_1_b.tar.gz", "a_1_b.tar", "gz")]
    #[case(".bashrc", ".bashrc", "")]
    fn extension_split(#[case] name: &str, #[case] stem_part: &str, #[case] ext: &str) {
        assert_eq!(split_extension(name), (stem_part, ext));
        assert_eq!(stem(name), stem_part);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            authors in "[A-Za-z]{1,8}( [A-Za-z]{1,8}){0,2}",
            year in "[0-9x?]{0,4}",
            title in "[A-Za-z0-9]{1,8}( [A-Za-z0-9]{1,8}){0,4}",
            ext in "[a-z]{1,4}",
        ) {
            let codec = FilenameCodec::default();
            let decoded = codec.decode(&codec.encode(&authors, &year, &title, &ext)).unwrap();
            prop_assert_eq!(decoded.authors, authors);
            prop_assert_eq!(decoded.year, year);
            prop_assert_eq!(decoded.title, title);
            prop_assert_eq!(decoded.extension, ext);
        }
    }
}
