//! Seams to the external collaborators: content store, transport, encoder.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;

use crate::content::ContentGraph;
use crate::models::{AssetId, Dimensions, FileMetadata, ImageTransform};
use crate::Result;

/// Read-only view of the headless content store.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch every collection that may reference assets.
    async fn fetch_graph(&self) -> Result<ContentGraph>;

    /// Fetch metadata for the given identifiers in one batched query.
    async fn fetch_file_metadata(&self, ids: &BTreeSet<AssetId>) -> Result<Vec<FileMetadata>>;

    /// Download URL for an asset, optionally carrying a server-side image transform.
    fn asset_url(&self, id: &AssetId, transform: Option<&ImageTransform>) -> String;
}

/// Byte transport for asset downloads.
#[async_trait]
pub trait AssetTransport: Send + Sync {
    /// Download `url` into `dest`, overwriting it. Returns the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// External media prober/encoder.
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Pixel dimensions of the first video stream.
    async fn probe_dimensions(&self, input: &Path) -> Result<Dimensions>;

    /// Transcode `input` into `output` scaled to `target`.
    async fn transcode(&self, input: &Path, output: &Path, target: Dimensions) -> Result<()>;

    fn name(&self) -> &str;
}
