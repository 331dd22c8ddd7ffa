//! Error types for toshokan-core

use std::path::PathBuf;

use thiserror::Error;

use crate::interaction::{EditField, EditKind};

/// Result type alias for toshokan operations
pub type Result<T> = std::result::Result<T, ToshokanError>;

/// Main error type for toshokan operations
#[derive(Error, Debug)]
pub enum ToshokanError {
    /// Persisted catalog problems
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Document directory problems
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// A filename that does not follow `authors_year_title.ext`
    #[error("Filename error: {0}")]
    Filename(#[from] FilenameError),

    /// Command rejected by the focus/modal state machine
    #[error("Rejected: {0}")]
    Interaction(#[from] InteractionError),

    /// Committing an edit failed
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// Configuration problems
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Bibliography export failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// No entry with this id
    #[error("Entry not found: {0}")]
    NotFound(String),
}

/// Persistence-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the catalog file failed
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The catalog file exists but is not a valid catalog
    #[error("Malformed catalog file {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Bibliography export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// A record file exists but could not be read
    #[error("Cannot read bibliography record {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination could not be written
    #[error("Cannot write export {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory scan errors
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read document directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Filename codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilenameError {
    #[error("Malformed filename {filename:?}: expected authors_year_title.ext")]
    Malformed { filename: String },
}

/// Focus/modal gate rejections
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    /// A modal edit is open; only its own field edits, save and cancel run
    #[error("{command} is not allowed while editing {target}")]
    EditInProgress { command: &'static str, target: String },

    /// Save/cancel/field edit with no open edit
    #[error("{0} requires an open edit")]
    NoActiveEdit(&'static str),

    /// Entry commands need the library panel focused
    #[error("{0} requires library focus")]
    WrongFocus(&'static str),

    /// The field is not part of this kind of edit
    #[error("{field:?} cannot be edited in a {kind:?} edit")]
    FieldNotEditable { field: EditField, kind: EditKind },
}

/// Edit commit errors
#[derive(Error, Debug)]
pub enum EditError {
    /// A field value that cannot be encoded into a filename
    #[error("Invalid {field:?}: {reason}")]
    InvalidField { field: EditField, reason: String },

    /// The renamed id is already taken
    #[error("Cannot rename {from} to {to}: name already in use")]
    IdConflict { from: String, to: String },

    /// Renaming a backing file failed; earlier renames were rolled back
    #[error("Rename {from} -> {to} failed: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_error_display() {
        let err = InteractionError::EditInProgress {
            command: "refresh",
            target: "a_1_b.pdf".into(),
        };
        assert_eq!(err.to_string(), "refresh is not allowed while editing a_1_b.pdf");
    }

    #[test]
    fn umbrella_conversion() {
        let err: ToshokanError = FilenameError::Malformed {
            filename: "nope.pdf".into(),
        }
        .into();
        assert!(matches!(err, ToshokanError::Filename(_)));
        assert!(err.to_string().contains("nope.pdf"));
    }
}
