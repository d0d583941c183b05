//! Fetch-transform pipeline: one asset in, one output file and ledger entry out.
//!
//! Images are resized and recompressed by the content store and downloaded
//! straight to their final path. Videos and other files land in a `temp_`
//! file first, are hashed, and are only transformed (videos) or promoted
//! (other files) when the hash differs from the ledger or the output is gone.

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info, warn};

use mediasync_core::{
    defaults, AssetKind, AssetRecord, AssetTransport, Dimensions, LedgerEntry, MediaEncoder,
    ProcessOutcome, Result,
};
use mediasync_store::{hash_file, Ledger, OutputLayout};

pub struct AssetPipeline {
    transport: Arc<dyn AssetTransport>,
    encoder: Arc<dyn MediaEncoder>,
    layout: OutputLayout,
    image_format: String,
    max_width: u32,
}

impl AssetPipeline {
    pub fn new(
        transport: Arc<dyn AssetTransport>,
        encoder: Arc<dyn MediaEncoder>,
        layout: OutputLayout,
    ) -> Self {
        Self {
            transport,
            encoder,
            layout,
            image_format: defaults::IMAGE_FORMAT.to_string(),
            max_width: defaults::MAX_WIDTH,
        }
    }

    /// Extension used for image outputs; must match the transform format in the URL.
    pub fn with_image_format(mut self, format: impl Into<String>) -> Self {
        self.image_format = format.into();
        self
    }

    /// Width cap for transcoded videos.
    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Name of the output file for `record`: `{id}{ext}`.
    pub fn output_file_name(&self, record: &AssetRecord) -> String {
        format!("{}{}", record.id, record.output_extension(&self.image_format))
    }

    /// Process one asset.
    ///
    /// The exclusive borrow of the ledger is the whole concurrency story: one
    /// asset is downloaded, transformed and recorded before the next begins.
    /// On error the ledger is left untouched for this asset.
    pub async fn process(&self, record: &AssetRecord, ledger: &mut Ledger) -> Result<ProcessOutcome> {
        let ext = record.output_extension(&self.image_format);
        let final_path = self.layout.final_path(&record.id, &ext);

        if record.kind == AssetKind::Image {
            return self.process_image(record, &final_path, ledger).await;
        }

        let temp_path = self.layout.temp_path(&record.id, &ext);
        let result = self
            .process_hashed(record, &temp_path, &final_path, ledger)
            .await;
        remove_if_exists(&temp_path).await;
        result
    }

    async fn process_image(
        &self,
        record: &AssetRecord,
        final_path: &Path,
        ledger: &mut Ledger,
    ) -> Result<ProcessOutcome> {
        let size = self.transport.download(&record.url, final_path).await?;
        debug!(asset_id = %record.id, size, "Downloaded transformed image");
        ledger.insert(record.id.clone(), LedgerEntry::now("", record.filesize, size));
        Ok(ProcessOutcome::saved(size))
    }

    async fn process_hashed(
        &self,
        record: &AssetRecord,
        temp_path: &Path,
        final_path: &Path,
        ledger: &mut Ledger,
    ) -> Result<ProcessOutcome> {
        let downloaded = self.transport.download(&record.url, temp_path).await?;
        let hash = hash_file(temp_path).await?;

        if let Some(entry) = ledger.get(&record.id) {
            if !entry.hash.is_empty() && entry.hash == hash && fs::try_exists(final_path).await? {
                debug!(asset_id = %record.id, "Ledger hit, output unchanged");
                return Ok(ProcessOutcome::cached(entry.processed_size));
            }
        }

        let processed_size = match record.kind {
            AssetKind::Video => self.transcode_or_copy(record, temp_path, final_path).await?,
            AssetKind::Image | AssetKind::Other => {
                fs::rename(temp_path, final_path).await?;
                downloaded
            }
        };

        ledger.insert(
            record.id.clone(),
            LedgerEntry::now(hash, record.filesize, processed_size),
        );
        Ok(ProcessOutcome::saved(processed_size))
    }

    /// Transcode a video, falling back to a verbatim copy if probing or encoding fails.
    async fn transcode_or_copy(
        &self,
        record: &AssetRecord,
        input: &Path,
        output: &Path,
    ) -> Result<u64> {
        match self.transcode(input, output).await {
            Ok(target) => {
                info!(asset_id = %record.id, %target, encoder = self.encoder.name(), "Transcoded video");
            }
            Err(e) => {
                warn!(
                    asset_id = %record.id,
                    error = %e,
                    "Transcode failed, keeping original bytes"
                );
                fs::copy(input, output).await?;
            }
        }
        Ok(fs::metadata(output).await?.len())
    }

    async fn transcode(&self, input: &Path, output: &Path) -> Result<Dimensions> {
        let source = self.encoder.probe_dimensions(input).await?;
        let target = source.scale_to_max_width(self.max_width);
        self.encoder.transcode(input, output, target).await?;
        Ok(target)
    }
}

async fn remove_if_exists(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temp file"),
    }
}
