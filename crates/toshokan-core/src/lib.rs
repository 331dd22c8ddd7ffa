//! toshokan-core: catalog synchronization and tag-indexed views.
//!
//! A catalog maps document filenames to bibliographic entries (title,
//! authors, year, tags, read flag). The catalog is persisted as JSON and
//! reconciled against a flat directory of documents named
//! `authors_year_title.ext`. Views filter the catalog by tag and sort it by
//! title; a focus/modal state machine gates which commands may run.

pub mod catalog;
pub mod command;
pub mod config;
pub mod entry;
pub mod error;
pub mod export;
pub mod filename;
pub mod interaction;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod tags;
pub mod view;

pub use catalog::Catalog;
pub use command::{Command, OpenTarget, Outcome};
pub use config::{AppsConfig, FilenameConfig, LibraryPaths, TagLabels, ToshokanConfig};
pub use entry::Entry;
pub use error::{
    ConfigError, EditError, ExportError, FilenameError, InteractionError, Result, ScanError,
    StorageError, ToshokanError,
};
pub use export::{export_bibliography, ExportReport};
pub use filename::{DecodedName, FilenameCodec};
pub use interaction::{Draft, EditField, EditKind, EditSession, Focus, Interaction, Modal};
pub use reconcile::{scan_directory, DirectoryListing, ReconcileReport, Reconciler, Reconciliation};
pub use session::Session;
pub use store::{CatalogStore, JsonCatalogStore};
pub use tags::{join_tags, split_tags, TagFilter, TagIndex};
pub use view::{project, search, ViewRow};
