//! Pre-flight size estimate: how much the mirror would occupy, without downloading anything.

use serde::Serialize;
use tracing::info;

use mediasync_core::{
    defaults, percent_of, AssetId, AssetKind, AssetRecord, ContentScanner, ContentSource,
    ImageTransform, Result,
};

use crate::resolve::{resolve_records, KindCounts};

/// Storage guidance derived from the estimated mirror size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Safe,
    Caution,
    ConsiderAlternatives,
}

impl Recommendation {
    pub fn for_size(bytes: u64) -> Self {
        if bytes < defaults::ESTIMATE_SAFE_BYTES {
            Recommendation::Safe
        } else if bytes < defaults::ESTIMATE_CAUTION_BYTES {
            Recommendation::Caution
        } else {
            Recommendation::ConsiderAlternatives
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::Safe => "Safe to mirror assets at build time",
            Recommendation::Caution => "Proceed with caution: assets are significant but manageable",
            Recommendation::ConsiderAlternatives => {
                "Consider alternatives: assets may exceed the storage budget"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSize {
    pub id: AssetId,
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    pub referenced: usize,
    pub counts: KindCounts,
    pub original_bytes: u64,
    /// Images at a fixed share of their original size, everything else unchanged.
    pub estimated_bytes: u64,
    pub storage_limit_bytes: u64,
    pub largest: Vec<FileSize>,
}

impl SizeEstimate {
    pub fn from_records(referenced: usize, records: &[AssetRecord], storage_limit_bytes: u64) -> Self {
        let original_bytes = records.iter().map(|r| r.filesize).sum();
        let estimated_bytes = records.iter().map(estimated_size).sum();

        let mut by_size: Vec<&AssetRecord> = records.iter().collect();
        by_size.sort_by(|a, b| b.filesize.cmp(&a.filesize).then_with(|| a.id.cmp(&b.id)));
        let largest = by_size
            .into_iter()
            .take(defaults::ESTIMATE_TOP_FILES)
            .map(|r| FileSize {
                id: r.id.clone(),
                filename: r.filename.clone(),
                mime_type: r.mime_type.clone(),
                size: r.filesize,
            })
            .collect();

        Self {
            referenced,
            counts: KindCounts::of(records),
            original_bytes,
            estimated_bytes,
            storage_limit_bytes,
            largest,
        }
    }

    pub fn percent_of_limit(&self) -> i64 {
        percent_of(self.estimated_bytes, self.storage_limit_bytes)
    }

    pub fn recommendation(&self) -> Recommendation {
        Recommendation::for_size(self.estimated_bytes)
    }
}

fn estimated_size(record: &AssetRecord) -> u64 {
    match record.kind {
        AssetKind::Image => (record.filesize as f64 * defaults::IMAGE_ESTIMATE_RATIO).floor() as u64,
        AssetKind::Video | AssetKind::Other => record.filesize,
    }
}

/// Scan content and resolve metadata, then size up the mirror.
pub async fn estimate_sizes(
    source: &dyn ContentSource,
    scanner: &ContentScanner,
    transform: &ImageTransform,
    storage_limit_bytes: u64,
) -> Result<SizeEstimate> {
    let graph = source.fetch_graph().await?;
    let scan = scanner.scan(&graph);
    let records = resolve_records(source, &scan.ids, transform).await?;

    let estimate = SizeEstimate::from_records(scan.ids.len(), &records, storage_limit_bytes);
    info!(
        assets = estimate.referenced,
        original_bytes = estimate.original_bytes,
        estimated_bytes = estimate.estimated_bytes,
        "Estimated mirror size"
    );
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn record(id: &str, mime: &str, size: u64) -> AssetRecord {
        AssetRecord {
            id: AssetId::from(id),
            mime_type: mime.to_string(),
            filesize: size,
            filename: format!("{}.bin", id),
            url: String::new(),
            kind: AssetKind::classify(mime),
        }
    }

    #[test]
    fn test_images_estimated_at_fixed_ratio() {
        let records = vec![
            record("a", "image/png", 1000),
            record("b", "video/mp4", 5000),
            record("c", "application/pdf", 333),
            record("d", "image/jpeg", 7),
        ];
        let est = SizeEstimate::from_records(5, &records, 10 * GIB);

        assert_eq!(est.original_bytes, 6340);
        // 400 + 5000 + 333 + floor(2.8)
        assert_eq!(est.estimated_bytes, 5735);
        assert_eq!(est.referenced, 5);
        assert_eq!(
            est.counts,
            KindCounts {
                images: 2,
                videos: 1,
                others: 1
            }
        );
    }

    #[test]
    fn test_largest_files_sorted_and_capped() {
        let records: Vec<AssetRecord> = (0..15u64)
            .map(|i| record(&format!("f{:02}", i), "video/mp4", i * 100))
            .collect();
        let est = SizeEstimate::from_records(15, &records, 10 * GIB);

        assert_eq!(est.largest.len(), 10);
        assert_eq!(est.largest[0].size, 1400);
        assert_eq!(est.largest[9].size, 500);
    }

    #[test]
    fn test_recommendation_tiers() {
        assert_eq!(Recommendation::for_size(0), Recommendation::Safe);
        assert_eq!(Recommendation::for_size(GIB - 1), Recommendation::Safe);
        assert_eq!(Recommendation::for_size(GIB), Recommendation::Caution);
        assert_eq!(Recommendation::for_size(5 * GIB), Recommendation::ConsiderAlternatives);
    }

    #[test]
    fn test_percent_of_limit() {
        let records = vec![record("v", "video/mp4", 2 * GIB)];
        let est = SizeEstimate::from_records(1, &records, 10 * GIB);
        assert_eq!(est.percent_of_limit(), 20);
        assert_eq!(est.recommendation(), Recommendation::Caution);
    }
}
