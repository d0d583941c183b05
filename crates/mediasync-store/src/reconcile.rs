//! Reconciliation sweep: garbage-collects stored assets that content no longer references.
//!
//! The sweep trusts the live reference set completely. An identifier missing
//! from that set because of a scan gap is indistinguishable from a real
//! orphan, which is why [`SweepMode::Retain`] exists for runs whose scan met
//! unrecognized content shapes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use mediasync_core::{AssetId, Result, ScanReport, UnknownBlockPolicy};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::layout::OutputLayout;
use crate::ledger::Ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMode {
    /// Delete unreferenced files and their ledger entries.
    Delete,
    /// Report unreferenced files but keep them.
    Retain,
}

impl SweepMode {
    /// Retain only when asked to and the scan actually met unknown block kinds.
    pub fn for_scan(policy: UnknownBlockPolicy, scan: &ScanReport) -> Self {
        match policy {
            UnknownBlockPolicy::Retain if scan.has_unrecognized() => SweepMode::Retain,
            _ => SweepMode::Delete,
        }
    }
}

/// Identifiers referenced by content, and the output file each one was written to this run.
///
/// A live identifier with a known output keeps only that file; any other
/// `{id}.*` file is a superseded output. A live identifier without a known
/// output (no metadata, or processing failed) keeps whatever is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSet {
    ids: BTreeSet<AssetId>,
    outputs: BTreeMap<AssetId, String>,
}

impl LiveSet {
    pub fn new(ids: BTreeSet<AssetId>) -> Self {
        Self {
            ids,
            outputs: BTreeMap::new(),
        }
    }

    /// Record the file name `id` is stored under. Marks `id` live.
    pub fn expect_output(&mut self, id: AssetId, file_name: impl Into<String>) {
        self.ids.insert(id.clone());
        self.outputs.insert(id, file_name.into());
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.ids.contains(id)
    }

    pub fn expected_output(&self, id: &AssetId) -> Option<&str> {
        self.outputs.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl From<BTreeSet<AssetId>> for LiveSet {
    fn from(ids: BTreeSet<AssetId>) -> Self {
        Self::new(ids)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// File names deleted from the output directory.
    pub removed: Vec<String>,
    /// Unreferenced file names kept because of [`SweepMode::Retain`].
    pub retained: Vec<String>,
    /// Ledger entries dropped for identifiers with no live reference.
    pub pruned_entries: usize,
}

/// Delete every stored file that is not the current output of a live identifier.
///
/// Files of unreferenced identifiers are deleted along with their ledger
/// entries, unless `mode` is [`SweepMode::Retain`]. Superseded outputs of live
/// identifiers (an older extension) are always deleted and the ledger entry is
/// kept. The ledger file and `temp_` files are never touched. The ledger is
/// saved again if anything was removed from it.
pub async fn sweep(
    layout: &OutputLayout,
    ledger: &mut Ledger,
    live: &LiveSet,
    mode: SweepMode,
) -> Result<SweepReport> {
    let mut report = SweepReport::default();
    let mut files: Vec<(String, PathBuf)> = Vec::new();

    let mut dir = fs::read_dir(layout.root()).await?;
    while let Some(entry) = dir.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let raw = entry.file_name();
        let name = match raw.to_str() {
            Some(name) => name.to_string(),
            None => {
                let lossy = raw.to_string_lossy().into_owned();
                warn!(file = %lossy, "sweep: file name is not valid UTF-8, treating as unreferenced");
                lossy
            }
        };
        files.push((name, entry.path()));
    }
    files.sort();

    let mut ledger_changed = false;
    for (name, path) in files {
        if OutputLayout::is_ledger(&name) || OutputLayout::is_temp(&name) {
            continue;
        }
        let id = AssetId::from(OutputLayout::identifier_of(&name));

        if live.contains(&id) {
            match live.expected_output(&id) {
                Some(expected) if expected != name => {
                    if remove(&path, &name).await {
                        debug!(file = %name, expected, "sweep: removed superseded output");
                        report.removed.push(name);
                    }
                }
                _ => {}
            }
            continue;
        }

        if mode == SweepMode::Retain {
            debug!(file = %name, "sweep: retaining unreferenced file");
            report.retained.push(name);
            continue;
        }

        if remove(&path, &name).await {
            debug!(file = %name, asset_id = %id, "sweep: removed orphan");
            ledger_changed |= ledger.remove(&id).is_some();
            report.removed.push(name);
        }
    }

    if mode == SweepMode::Delete {
        let stale: Vec<AssetId> = ledger.ids().filter(|id| !live.contains(id)).cloned().collect();
        for id in &stale {
            ledger.remove(id);
        }
        report.pruned_entries = stale.len();
        ledger_changed |= !stale.is_empty();
    }

    if ledger_changed {
        ledger.save().await?;
    }

    if !report.retained.is_empty() {
        warn!(
            retained = report.retained.len(),
            "sweep: unreferenced files kept because the scan met unrecognized block kinds"
        );
    }
    info!(
        removed = report.removed.len(),
        retained = report.retained.len(),
        pruned_entries = report.pruned_entries,
        "sweep: complete"
    );
    Ok(report)
}

async fn remove(path: &Path, name: &str) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            warn!(file = %name, error = %e, "sweep: failed to remove file");
            false
        }
    }
}
