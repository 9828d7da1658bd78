//! Catalog files with per-name write serialization.
//!
//! Each catalog is a JSON array of records stored as `{dir}/{name}`. All
//! read-modify-write cycles on one catalog go through a [`CatalogTxn`],
//! which holds that catalog's async mutex until it is committed or dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use fnicon_core::{CatalogRecord, sort_records};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{load_json_opt, save_json};

/// File holding the auth config; never treated as a catalog.
pub const PASSWORD_FILE: &str = "password.json";

/// Catalog created at first start.
pub const DEFAULT_CATALOG: &str = "fnicon.json";

// ============================================================================
// Name Validation
// ============================================================================

/// Checks that `name` is a plain `.json` file name other than the auth
/// config.
pub fn validate_catalog_name(name: &str) -> Result<(), StoreError> {
    let plain = !name.is_empty()
        && name.len() > ".json".len()
        && name.ends_with(".json")
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
        && name != PASSWORD_FILE;

    if plain {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

// ============================================================================
// Catalog Store
// ============================================================================

/// Catalog persistence rooted at the configuration directory.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    dir: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl CatalogStore {
    /// Creates a store for catalogs in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The configuration directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the named catalog.
    pub fn catalog_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_catalog_name(name)?;
        Ok(self.dir.join(name))
    }

    /// Path of an icon file in the configuration directory.
    ///
    /// Returns `None` for names that would escape the directory.
    pub fn icon_path(&self, file_name: &str) -> Option<PathBuf> {
        let plain = !file_name.is_empty()
            && !file_name.contains(['/', '\\', '\0'])
            && file_name != "."
            && file_name != "..";
        plain.then(|| self.dir.join(file_name))
    }

    /// Lists catalog names, sorted.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if validate_catalog_name(&name).is_ok() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Reads a catalog, ordered by ascending sequence number.
    pub async fn read(&self, name: &str) -> Result<Vec<CatalogRecord>, StoreError> {
        let path = self.catalog_path(name)?;
        let mut records: Vec<CatalogRecord> = load_json_opt(&path)
            .await?
            .ok_or_else(|| StoreError::CatalogNotFound(name.to_string()))?;
        sort_records(&mut records);
        Ok(records)
    }

    /// Creates the catalog with `records` unless it already exists.
    ///
    /// Returns true if the file was created.
    pub async fn create_if_missing(
        &self,
        name: &str,
        records: &[CatalogRecord],
    ) -> Result<bool, StoreError> {
        let path = self.catalog_path(name)?;
        let _guard = self.lock(name).await;
        if tokio::fs::try_exists(&path).await? {
            debug!(catalog = name, "Catalog already exists");
            return Ok(false);
        }
        save_json(&path, records).await?;
        info!(catalog = name, records = records.len(), "Created catalog");
        Ok(true)
    }

    /// Locks the named catalog and loads it for modification.
    ///
    /// The lock is held until the returned transaction is committed or
    /// dropped.
    pub async fn begin(&self, name: &str) -> Result<CatalogTxn, StoreError> {
        let path = self.catalog_path(name)?;
        let guard = self.lock(name).await;
        let records = self.read(name).await?;
        debug!(catalog = name, records = records.len(), "Catalog locked");
        Ok(CatalogTxn {
            name: name.to_string(),
            path,
            records,
            _guard: guard,
        })
    }

    async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(name.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

// ============================================================================
// Catalog Transaction
// ============================================================================

/// Exclusive, in-memory view of one catalog.
#[derive(Debug)]
pub struct CatalogTxn {
    name: String,
    path: PathBuf,
    /// Records as loaded, sorted by sequence number.
    pub records: Vec<CatalogRecord>,
    _guard: OwnedMutexGuard<()>,
}

impl CatalogTxn {
    /// Catalog name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the record with `seq`.
    pub fn position(&self, seq: u32) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|r| r.sequence_number == seq)
            .ok_or_else(|| StoreError::RecordNotFound {
                catalog: self.name.clone(),
                seq,
            })
    }

    /// Writes the records back and releases the lock.
    pub async fn commit(mut self) -> Result<Vec<CatalogRecord>, StoreError> {
        sort_records(&mut self.records);
        save_json(&self.path, &self.records).await?;
        info!(catalog = %self.name, records = self.records.len(), "Catalog saved");
        Ok(self.records)
    }
}

// ============================================================================
// Tests
// ============================================================================
