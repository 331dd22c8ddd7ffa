//! Catalog persistence.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::Catalog;
use crate::error::StorageError;

/// The trait that catalog storage backends implement.
pub trait CatalogStore {
    /// Read the persisted catalog.
    fn load(&self) -> Result<Catalog, StorageError>;

    /// Replace the persisted catalog with `catalog`.
    ///
    /// Either the whole file is replaced or it is left untouched.
    fn save(&self, catalog: &Catalog) -> Result<(), StorageError>;
}

/// A catalog stored as one JSON object keyed by entry id.
#[derive(Debug, Clone)]
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogStore for JsonCatalogStore {
    fn load(&self) -> Result<Catalog, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no catalog file yet");
                return Ok(Catalog::new());
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Catalog::new());
        }

        let catalog: Catalog =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::Malformed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %self.path.display(), entries = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    fn save(&self, catalog: &Catalog) -> Result<(), StorageError> {
        // Serialize completely before touching the file.
        let bytes = serde_json::to_vec_pretty(catalog)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        write_atomic(&self.path, &bytes).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), entries = catalog.len(), "catalog saved");
        Ok(())
    }
}

/// Write `bytes` to a temporary sibling, then move it over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = unique_temp_path(path);
    let written = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()
    })();
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if fs::rename(&temp_path, path).is_err() {
        let copied = fs::copy(&temp_path, path);
        let _ = fs::remove_file(&temp_path);
        copied?;
    }
    Ok(())
}

fn unique_temp_path(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nonce = SEQ.fetch_add(1, Ordering::Relaxed);
    let ts_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut temp_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("toshokan.json")
        .to_string();
    temp_name.push_str(&format!(".tmp-{ts_nanos}-{nonce}"));
    path.with_file_name(temp_name)
}
