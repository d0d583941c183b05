//! Flat output directory layout.
//!
//! ```text
//! public/assets/
//! ├── .asset-cache.json                            # ledger
//! ├── 4f1c...e2.webp                               # {identifier}{extension}
//! ├── 9a07...51.mp4
//! └── temp_9a07...51.mp4                           # only while a video is in flight
//! ```

use std::path::{Path, PathBuf};

use mediasync_core::defaults::{LEDGER_FILE_NAME, TEMP_PREFIX};
use mediasync_core::{AssetId, Result};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output directory tree if it does not exist.
    pub async fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Final location of an asset: `{root}/{id}{ext}`.
    pub fn final_path(&self, id: &AssetId, ext: &str) -> PathBuf {
        self.root.join(format!("{}{}", id, ext))
    }

    /// Transient download location: `{root}/temp_{id}{ext}`.
    pub fn temp_path(&self, id: &AssetId, ext: &str) -> PathBuf {
        self.root.join(format!("{}{}{}", TEMP_PREFIX, id, ext))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE_NAME)
    }

    /// Identifier encoded in a stored file name (everything before the first `.`).
    pub fn identifier_of(file_name: &str) -> &str {
        file_name
            .split_once('.')
            .map(|(id, _)| id)
            .unwrap_or(file_name)
    }

    pub fn is_temp(file_name: &str) -> bool {
        file_name.starts_with(TEMP_PREFIX)
    }

    /// The ledger file itself, or the ledger's in-flight replacement.
    pub fn is_ledger(file_name: &str) -> bool {
        file_name == LEDGER_FILE_NAME
            || file_name
                .strip_prefix(LEDGER_FILE_NAME)
                .is_some_and(|rest| rest == ".tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = OutputLayout::new("/srv/site/public/assets");
        let id = AssetId::from("3b7e-11");

        assert_eq!(
            layout.final_path(&id, ".webp"),
            PathBuf::from("/srv/site/public/assets/3b7e-11.webp")
        );
        assert_eq!(
            layout.temp_path(&id, ".mp4"),
            PathBuf::from("/srv/site/public/assets/temp_3b7e-11.mp4")
        );
        assert_eq!(
            layout.ledger_path(),
            PathBuf::from("/srv/site/public/assets/.asset-cache.json")
        );
    }

    #[test]
    fn test_identifier_of() {
        assert_eq!(OutputLayout::identifier_of("3b7e-11.webp"), "3b7e-11");
        assert_eq!(OutputLayout::identifier_of("3b7e-11.tar.gz"), "3b7e-11");
        assert_eq!(OutputLayout::identifier_of("3b7e-11"), "3b7e-11");
    }

    #[test]
    fn test_special_files() {
        assert!(OutputLayout::is_temp("temp_3b7e.mp4"));
        assert!(!OutputLayout::is_temp("3b7e.mp4"));
        assert!(OutputLayout::is_ledger(".asset-cache.json"));
        assert!(OutputLayout::is_ledger(".asset-cache.json.tmp"));
        assert!(!OutputLayout::is_ledger(".asset-cache.json.bak"));
    }

    #[tokio::test]
    async fn test_ensure_creates_nested_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("public").join("assets"));
        layout.ensure().await.unwrap();
        assert!(layout.root().is_dir());
    }
}
