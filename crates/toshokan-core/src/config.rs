//! Configuration for toshokan
//!
//! Directory locations, external programs, pseudo-tag labels and filename
//! conventions. Loaded from TOML; every section and field is optional.
//!
//! ```toml
//! [paths]
//! library = "./library/"
//! notes = ".notes/"
//! bibs = ".bibs/"
//! catalog = "./toshokan.json"
//!
//! [apps]
//! editor = "vim"
//! pdf_viewer = "mupdf"
//!
//! [tags]
//! all = "---ALL----"
//! read = "---READ---"
//! unread = "--UNREAD--"
//!
//! [filename]
//! separator = "-"
//! notes_extension = "md"
//! bib_extension = "bib"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filename::FilenameCodec;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToshokanConfig {
    pub paths: LibraryPaths,
    pub apps: AppsConfig,
    pub tags: TagLabels,
    pub filename: FilenameConfig,
}

/// Where the catalog and its files live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryPaths {
    /// Flat directory of documents; filenames are entry ids
    pub library: PathBuf,
    /// Notes, one `<stem>.md` per entry
    pub notes: PathBuf,
    /// Bibliography records, one `<stem>.bib` per entry
    pub bibs: PathBuf,
    /// The persisted catalog file
    pub catalog: PathBuf,
}

impl Default for LibraryPaths {
    fn default() -> Self {
        Self {
            library: PathBuf::from("./library/"),
            notes: PathBuf::from(".notes/"),
            bibs: PathBuf::from(".bibs/"),
            catalog: PathBuf::from("./toshokan.json"),
        }
    }
}

/// External programs launched by the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsConfig {
    pub editor: String,
    pub pdf_viewer: String,
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            editor: "vim".to_string(),
            pdf_viewer: "mupdf".to_string(),
        }
    }
}

/// Display labels for the three pseudo-tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagLabels {
    pub all: String,
    pub read: String,
    pub unread: String,
}

impl Default for TagLabels {
    fn default() -> Self {
        Self {
            all: "---ALL----".to_string(),
            read: "---READ---".to_string(),
            unread: "--UNREAD--".to_string(),
        }
    }
}

/// Filename conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilenameConfig {
    /// Written in place of spaces in authors and title
    pub separator: char,
    pub notes_extension: String,
    pub bib_extension: String,
}

impl Default for FilenameConfig {
    fn default() -> Self {
        Self {
            separator: '-',
            notes_extension: "md".to_string(),
            bib_extension: "bib".to_string(),
        }
    }
}

impl FilenameConfig {
    pub fn codec(&self) -> FilenameCodec {
        FilenameCodec::new(self.separator)
    }
}

impl ToshokanConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/toshokan/config.toml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("toshokan").join("config.toml"))
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load from an explicit file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let Some(default_path) = Self::default_path() else {
            return Ok(Self::default());
        };
        match Self::from_file(&default_path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let labels = [&self.tags.all, &self.tags.read, &self.tags.unread];
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "pseudo-tag labels must not be empty".to_string(),
            ));
        }
        if labels[0] == labels[1] || labels[0] == labels[2] || labels[1] == labels[2] {
            return Err(ConfigError::Invalid(
                "pseudo-tag labels must be distinct".to_string(),
            ));
        }

        let sep = self.filename.separator;
        if sep == '_' || sep == '/' || sep == '.' || sep.is_whitespace() {
            return Err(ConfigError::Invalid(format!(
                "filename separator {sep:?} would break filename decoding"
            )));
        }

        for ext in [&self.filename.notes_extension, &self.filename.bib_extension] {
            if ext.is_empty() || ext.contains('/') || ext.contains('.') {
                return Err(ConfigError::Invalid(format!(
                    "invalid file extension {ext:?}"
                )));
            }
        }

        Ok(())
    }
}
