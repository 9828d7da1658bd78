//! Catalog operations with icon discovery and mirroring.
//!
//! Every write runs inside a [`CatalogTxn`], so icon resolution and
//! download for a record happen while its catalog is locked.

use std::collections::HashSet;
use std::sync::Arc;

use fnicon_core::{
    CatalogRecord, DEFAULT_ICON_URL, IconChange, RecordPatch, local_icon_ref, next_sequence,
};
use fnicon_fetch::{Fetcher, IconPipeline, acquire};
use fnicon_store::{CatalogStore, CatalogTxn, StoreError};
use tracing::{debug, info, instrument, warn};

/// Catalog reads and writes plus the icon subsystem.
pub struct CatalogService {
    catalogs: CatalogStore,
    pipeline: IconPipeline,
}

impl CatalogService {
    /// Creates a service over `catalogs` that fetches with `fetcher`.
    pub fn new(catalogs: CatalogStore, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            catalogs,
            pipeline: IconPipeline::new(fetcher),
        }
    }

    /// The underlying catalog store.
    pub fn catalogs(&self) -> &CatalogStore {
        &self.catalogs
    }

    /// Lists catalog names.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        self.catalogs.list().await
    }

    /// Reads a catalog in sequence order.
    pub async fn read(&self, name: &str) -> Result<Vec<CatalogRecord>, StoreError> {
        self.catalogs.read(name).await
    }

    // ========================================================================
    // Icons
    // ========================================================================

    /// Finds an icon for `external_url`, falling back to the default icon.
    async fn discover_icon(&self, external_url: &str) -> String {
        self.pipeline.resolve(external_url).await.icon_or_default()
    }

    /// Downloads the record's remote icon to its local file and points
    /// `local_icon_path` at it.
    ///
    /// The path is set even if the download fails.
    async fn mirror_icon(&self, record: &mut CatalogRecord) -> bool {
        let file_name = record.icon_file_name();
        let acquired = match self.catalogs.icon_path(&file_name) {
            Some(dest) => {
                acquire(self.pipeline.fetcher().as_ref(), &record.remote_icon_url, &dest)
                    .await
                    .is_ok()
            }
            None => {
                warn!(file = %file_name, "Refusing to write icon outside the conf dir");
                false
            }
        };
        record.local_icon_path = Some(local_icon_ref(&file_name));
        acquired
    }

    async fn remove_icon(&self, file_name: &str) {
        let Some(path) = self.catalogs.icon_path(file_name) else {
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => info!(path = %path.display(), "Removed icon file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove icon file"),
        }
    }

    /// Renames icon files in the configuration directory.
    ///
    /// Every source is first moved to a hidden staging name, so a move may
    /// target a name another move is vacating. Missing sources are skipped;
    /// other failures are logged.
    async fn rename_icons(&self, moves: &[(String, String)]) {
        let mut staged = Vec::with_capacity(moves.len());
        for (i, (from, to)) in moves.iter().enumerate() {
            let (Some(src), Some(tmp)) = (
                self.catalogs.icon_path(from),
                self.catalogs.icon_path(&format!(".rename-{i}.tmp")),
            ) else {
                continue;
            };
            match tokio::fs::rename(&src, &tmp).await {
                Ok(()) => staged.push((tmp, to)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(file = %from, "Icon file missing, nothing to rename");
                }
                Err(e) => warn!(file = %from, error = %e, "Failed to stage icon rename"),
            }
        }

        for (tmp, to) in staged {
            let Some(dest) = self.catalogs.icon_path(to) else {
                continue;
            };
            match tokio::fs::rename(&tmp, &dest).await {
                Ok(()) => debug!(file = %to, "Renamed icon file"),
                Err(e) => warn!(file = %to, error = %e, "Failed to rename icon file"),
            }
        }
    }

    /// Points every record's local icon at `{seq}_{title}.jpg` and moves
    /// the files to match.
    async fn rename_to_canonical(&self, records: &mut [CatalogRecord]) {
        let mut moves = Vec::new();
        for record in records.iter_mut() {
            let Some(current) = record.local_icon_file_name().map(str::to_owned) else {
                continue;
            };
            let target = record.icon_file_name();
            if current != target {
                record.local_icon_path = Some(local_icon_ref(&target));
                moves.push((current, target));
            }
        }
        if !moves.is_empty() {
            self.rename_icons(&moves).await;
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Adds a record with the lowest free sequence number.
    ///
    /// Without an explicit remote icon, one is discovered from the
    /// external URL.
    #[instrument(skip(self, patch))]
    pub async fn create(&self, name: &str, patch: RecordPatch) -> Result<CatalogRecord, StoreError> {
        let mut txn = self.catalogs.begin(name).await?;
        let seq = next_sequence(&txn.records);
        let mut record = CatalogRecord::from_patch(seq, patch)?;

        if !record.has_remote_icon() {
            record.remote_icon_url = self.discover_icon(&record.external_url).await;
        }
        self.mirror_icon(&mut record).await;

        txn.records.push(record.clone());
        txn.commit().await?;
        info!(catalog = name, seq, title = %record.title, "Record created");
        Ok(record)
    }

    /// Merges `patch` into record `seq`.
    ///
    /// The icon is rediscovered when the external URL changes value, and
    /// re-downloaded whenever either icon-relevant field changes. A new
    /// title renames the local icon; a superseded icon file is removed.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        name: &str,
        seq: u32,
        patch: RecordPatch,
    ) -> Result<CatalogRecord, StoreError> {
        let mut txn = self.catalogs.begin(name).await?;
        let index = txn.position(seq)?;
        let mut record = txn.records[index].clone();
        let previous_icon = record.remote_icon_url.clone();
        let previous_file = record.local_icon_file_name().map(str::to_owned);

        let change = record.apply_patch(patch);
        if change == IconChange::ExternalUrl {
            record.remote_icon_url = self.discover_icon(&record.external_url).await;
        }
        if !record.has_remote_icon() {
            record.remote_icon_url = DEFAULT_ICON_URL.to_string();
        }

        let mut stale_file = None;
        if change == IconChange::Unchanged && record.remote_icon_url == previous_icon {
            debug!(seq, "Icon unchanged");
            self.rename_to_canonical(std::slice::from_mut(&mut record)).await;
        } else {
            self.mirror_icon(&mut record).await;
            stale_file = previous_file.filter(|old| *old != record.icon_file_name());
        }

        txn.records[index] = record.clone();
        txn.commit().await?;
        if let Some(old) = stale_file {
            self.remove_icon(&old).await;
        }
        info!(catalog = name, seq, "Record updated");
        Ok(record)
    }

    /// Removes record `seq` and its local icon file.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str, seq: u32) -> Result<CatalogRecord, StoreError> {
        let mut txn = self.catalogs.begin(name).await?;
        let index = txn.position(seq)?;
        let record = txn.records.remove(index);

        if let Some(file_name) = record.local_icon_file_name() {
            self.remove_icon(file_name).await;
        }
        txn.commit().await?;
        info!(catalog = name, seq, "Record deleted");
        Ok(record)
    }

    /// Renumbers records 1..N following `order`.
    ///
    /// Records missing from `order` keep their relative order after the
    /// listed ones. Repeated sequence numbers count once. Icon files are
    /// renamed to follow their record's new number.
    #[instrument(skip(self, order), fields(listed = order.len()))]
    pub async fn reorder(&self, name: &str, order: &[u32]) -> Result<Vec<CatalogRecord>, StoreError> {
        let mut txn = self.catalogs.begin(name).await?;
        let mut records = reordered(&txn, order)?;
        self.rename_to_canonical(&mut records).await;

        txn.records = records;
        let records = txn.commit().await?;
        info!(catalog = name, records = records.len(), "Catalog reordered");
        Ok(records)
    }

    // ========================================================================
    // Startup
    // ========================================================================

    /// Downloads every remote icon whose local file is missing.
    ///
    /// The catalog is written only if a download succeeded or a local
    /// path changed. Returns the number of icons downloaded.
    pub async fn init_images(&self, name: &str) -> Result<usize, StoreError> {
        let mut txn = self.catalogs.begin(name).await?;
        let mut downloaded = 0;
        let mut changed = false;

        for record in &mut txn.records {
            if !record.has_remote_icon() || self.local_icon_exists(record).await {
                continue;
            }
            let before = record.local_icon_path.clone();
            if self.mirror_icon(record).await {
                downloaded += 1;
            }
            changed |= record.local_icon_path != before;
        }

        if downloaded > 0 || changed {
            txn.commit().await?;
        }
        info!(catalog = name, downloaded, "Image initialization finished");
        Ok(downloaded)
    }

    async fn local_icon_exists(&self, record: &CatalogRecord) -> bool {
        match record
            .local_icon_file_name()
            .and_then(|n| self.catalogs.icon_path(n))
        {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("catalogs", &self.catalogs)
            .field("strategies", &self.pipeline.len())
            .finish_non_exhaustive()
    }
}

/// Applies a reorder request to the records of `txn`.
fn reordered(txn: &CatalogTxn, order: &[u32]) -> Result<Vec<CatalogRecord>, StoreError> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(txn.records.len());

    for &seq in order {
        if seen.insert(seq) {
            result.push(txn.records[txn.position(seq)?].clone());
        }
    }
    result.extend(
        txn.records
            .iter()
            .filter(|r| !seen.contains(&r.sequence_number))
            .cloned(),
    );

    for (record, seq) in result.iter_mut().zip(1..) {
        record.sequence_number = seq;
    }
    Ok(result)
}
