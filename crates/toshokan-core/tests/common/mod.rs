//! Temporary library fixtures for session tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use toshokan_core::{JsonCatalogStore, LibraryPaths, ReconcileReport, Session, ToshokanConfig};

/// A throwaway library, notes, bibs and catalog layout.
pub struct TestLibrary {
    _dir: TempDir,
    pub config: ToshokanConfig,
}

impl TestLibrary {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let mut config = ToshokanConfig::default();
        config.paths = LibraryPaths {
            library: dir.path().join("library"),
            notes: dir.path().join(".notes"),
            bibs: dir.path().join(".bibs"),
            catalog: dir.path().join("toshokan.json"),
        };
        for path in [&config.paths.library, &config.paths.notes, &config.paths.bibs] {
            fs::create_dir_all(path).expect("create fixture dir");
        }
        Self { _dir: dir, config }
    }

    pub fn add_document(&self, name: &str) -> PathBuf {
        let path = self.config.paths.library.join(name);
        fs::write(&path, b"%PDF-1.4").expect("write document");
        path
    }

    pub fn remove_document(&self, name: &str) {
        fs::remove_file(self.config.paths.library.join(name)).expect("remove document");
    }

    pub fn write_notes(&self, stem: &str, text: &str) -> PathBuf {
        let path = self.config.paths.notes.join(format!("{stem}.md"));
        fs::write(&path, text).expect("write notes");
        path
    }

    pub fn write_bib(&self, stem: &str, text: &str) -> PathBuf {
        let path = self.config.paths.bibs.join(format!("{stem}.bib"));
        fs::write(&path, text).expect("write bib");
        path
    }

    pub fn store(&self) -> JsonCatalogStore {
        JsonCatalogStore::new(&self.config.paths.catalog)
    }

    pub fn open(&self) -> (Session, ReconcileReport) {
        Session::open(self.config.clone(), Box::new(self.store())).expect("open session")
    }
}
