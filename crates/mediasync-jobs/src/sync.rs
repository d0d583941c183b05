//! Full mirror run: scan, resolve, process every asset, then reconcile.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use mediasync_core::{
    percent_saved, AssetId, AssetTransport, ContentScanner, ContentSource, ImageTransform,
    MediaEncoder, MirrorConfig, Result, UnknownBlockPolicy,
};
use mediasync_store::{sweep, Ledger, LiveSet, OutputLayout, SweepMode};

use crate::pipeline::AssetPipeline;
use crate::resolve::{resolve_records, KindCounts};

/// Summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Size of the live reference set.
    pub referenced: usize,
    /// Resolved records per category.
    pub counts: KindCounts,
    /// Assets freshly downloaded or transformed.
    pub processed: usize,
    /// Ledger cache hits.
    pub skipped: usize,
    /// Assets whose processing failed this run.
    pub failed: Vec<AssetId>,
    pub removed: Vec<String>,
    pub retained: Vec<String>,
    pub pruned_entries: usize,
    pub unrecognized: BTreeMap<String, usize>,
    /// Declared sizes of successfully handled assets.
    pub original_bytes: u64,
    /// Output sizes of successfully handled assets.
    pub processed_bytes: u64,
}

impl SyncReport {
    pub fn percent_saved(&self) -> i64 {
        percent_saved(self.original_bytes, self.processed_bytes)
    }
}

pub struct SyncRun {
    source: Arc<dyn ContentSource>,
    pipeline: AssetPipeline,
    scanner: ContentScanner,
    transform: ImageTransform,
    unknown_blocks: UnknownBlockPolicy,
}

impl SyncRun {
    pub fn new(source: Arc<dyn ContentSource>, pipeline: AssetPipeline, transform: ImageTransform) -> Self {
        Self {
            source,
            pipeline,
            scanner: ContentScanner::default(),
            transform,
            unknown_blocks: UnknownBlockPolicy::default(),
        }
    }

    /// Assemble a run from configuration and the three collaborators.
    pub fn from_config(
        config: &MirrorConfig,
        source: Arc<dyn ContentSource>,
        transport: Arc<dyn AssetTransport>,
        encoder: Arc<dyn MediaEncoder>,
    ) -> Self {
        let transform = config.image_transform();
        let pipeline = AssetPipeline::new(transport, encoder, OutputLayout::new(&config.output_dir))
            .with_image_format(transform.format.clone())
            .with_max_width(config.max_width);
        Self::new(source, pipeline, transform).with_unknown_block_policy(config.unknown_blocks)
    }

    pub fn with_scanner(mut self, scanner: ContentScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_unknown_block_policy(mut self, policy: UnknownBlockPolicy) -> Self {
        self.unknown_blocks = policy;
        self
    }

    /// Run to completion.
    ///
    /// Ledger load, content fetch, and metadata resolution failures abort the
    /// run. Per-asset failures are logged, counted, and skipped.
    pub async fn execute(&self) -> Result<SyncReport> {
        let layout = self.pipeline.layout();
        layout.ensure().await?;

        let mut ledger = Ledger::load(layout.ledger_path()).await?;
        info!(entries = ledger.len(), path = %ledger.path().display(), "Loaded ledger");

        let graph = self.source.fetch_graph().await?;
        info!(
            posts = graph.posts.len(),
            categories = graph.categories.len(),
            pages = graph.pages.len(),
            "Fetched content graph"
        );

        let scan = self.scanner.scan(&graph);
        info!(assets = scan.ids.len(), "Scanned content for asset references");

        let records = resolve_records(self.source.as_ref(), &scan.ids, &self.transform).await?;

        let mut report = SyncReport {
            referenced: scan.ids.len(),
            counts: KindCounts::of(&records),
            unrecognized: scan.unrecognized.clone(),
            ..SyncReport::default()
        };

        let mut live = LiveSet::new(scan.ids.clone());
        let total = records.len();
        for (index, record) in records.iter().enumerate() {
            info!(
                asset = index + 1,
                total,
                asset_id = %record.id,
                kind = record.kind.label(),
                filename = %record.filename,
                "Processing asset"
            );
            match self.pipeline.process(record, &mut ledger).await {
                Ok(outcome) => {
                    info!(
                        asset_id = %record.id,
                        saved = outcome.saved,
                        size = outcome.size,
                        "Asset done"
                    );
                    if outcome.saved {
                        report.processed += 1;
                    } else {
                        report.skipped += 1;
                    }
                    live.expect_output(record.id.clone(), self.pipeline.output_file_name(record));
                    report.original_bytes += record.filesize;
                    report.processed_bytes += outcome.size;
                }
                Err(e) => {
                    warn!(asset_id = %record.id, error = %e, "Failed to process asset");
                    report.failed.push(record.id.clone());
                }
            }
        }

        ledger.save().await?;

        let mode = SweepMode::for_scan(self.unknown_blocks, &scan);
        let swept = sweep(layout, &mut ledger, &live, mode).await?;
        report.removed = swept.removed;
        report.retained = swept.retained;
        report.pruned_entries = swept.pruned_entries;

        info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed.len(),
            removed = report.removed.len(),
            "Sync complete"
        );
        Ok(report)
    }
}
