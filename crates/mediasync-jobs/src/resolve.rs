//! Asset metadata resolver: identifier set → one [`AssetRecord`] per stored file.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use mediasync_core::{AssetId, AssetKind, AssetRecord, ContentSource, ImageTransform, Result};

/// Issue one batched metadata query and build a record per returned file.
///
/// Images get a download URL carrying `transform`; everything else points at
/// the stored original. Identifiers the store does not know are logged and
/// produce no record.
pub async fn resolve_records(
    source: &dyn ContentSource,
    ids: &BTreeSet<AssetId>,
    transform: &ImageTransform,
) -> Result<Vec<AssetRecord>> {
    let files = source.fetch_file_metadata(ids).await?;

    let mut seen = BTreeSet::new();
    let mut records = Vec::with_capacity(files.len());
    for meta in files {
        if !seen.insert(meta.id.clone()) {
            continue;
        }
        let kind = AssetKind::classify(meta.mime_type.as_deref().unwrap_or_default());
        let url = match kind {
            AssetKind::Image => source.asset_url(&meta.id, Some(transform)),
            AssetKind::Video | AssetKind::Other => source.asset_url(&meta.id, None),
        };
        records.push(AssetRecord::from_metadata(meta, url));
    }

    for missing in ids.iter().filter(|id| !seen.contains(*id)) {
        warn!(asset_id = %missing, "Referenced asset has no metadata in the content store");
    }
    debug!(requested = ids.len(), resolved = records.len(), "Resolved asset records");
    Ok(records)
}

/// Counts per category, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub images: usize,
    pub videos: usize,
    pub others: usize,
}

impl KindCounts {
    pub fn of(records: &[AssetRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            match r.kind {
                AssetKind::Image => acc.images += 1,
                AssetKind::Video => acc.videos += 1,
                AssetKind::Other => acc.others += 1,
            }
            acc
        })
    }
}
