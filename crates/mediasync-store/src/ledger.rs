//! Persisted asset ledger: identifier → last processing metadata.
//!
//! The file is a single JSON object keyed by identifier:
//!
//! ```json
//! {
//!   "9a07...51": {
//!     "hash": "5d41402abc4b2a76b9719d911017c592",
//!     "processedAt": 1718000000000,
//!     "originalSize": 73400320,
//!     "processedSize": 9123456
//!   }
//! }
//! ```
//!
//! ## Ownership
//!
//! One run owns one `Ledger`. It is loaded once at startup, mutated through
//! `&mut` while assets are processed strictly one after another, and flushed
//! at the end of the main pass and again after reconciliation. There is no
//! file locking: two concurrent runs against the same output directory race
//! and the last writer wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mediasync_core::{AssetId, Error, LedgerEntry, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    entries: BTreeMap<AssetId, LedgerEntry>,
}

impl Ledger {
    /// Empty ledger bound to `path`; nothing is read or written.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the ledger at `path`.
    ///
    /// A missing file yields an empty ledger. A malformed file is an error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !fs::try_exists(&path).await? {
            debug!(path = %path.display(), "ledger: no file, starting empty");
            return Ok(Self::empty(path));
        }

        let raw = fs::read_to_string(&path).await?;
        let entries: BTreeMap<AssetId, LedgerEntry> = serde_json::from_str(&raw).map_err(|e| {
            Error::Serialization(format!("malformed ledger {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), entries = entries.len(), "ledger: loaded");
        Ok(Self { path, entries })
    }

    /// Write the full ledger, replacing the previous file.
    ///
    /// Output is pretty-printed with sorted keys; the write goes through a
    /// sibling temp file and a rename.
    pub async fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let temp_path = temp_path_for(&self.path);

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "ledger: File::create failed");
            e
        })?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %self.path.display(), error = %e, "ledger: rename failed");
            e
        })?;
        debug!(path = %self.path.display(), entries = self.entries.len(), "ledger: saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: &AssetId) -> Option<&LedgerEntry> {
        self.entries.get(id)
    }

    pub fn insert(&mut self, id: AssetId, entry: LedgerEntry) -> Option<LedgerEntry> {
        self.entries.insert(id, entry)
    }

    pub fn remove(&mut self, id: &AssetId) -> Option<LedgerEntry> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &AssetId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &LedgerEntry)> {
        self.entries.iter()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
