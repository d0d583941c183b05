//! Content graph scanner: collects every asset identifier referenced by content.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::content::{Block, Category, ContentGraph, Page, Post, Relation, RichTextTranslation};
use crate::models::AssetId;

/// Extracts asset identifiers embedded in free-form rich text.
///
/// This is an approximation: a mention is not necessarily a rendered asset.
/// Over-inclusion only keeps an asset alive longer than needed.
pub trait ReferenceExtractor: Send + Sync {
    fn extract(&self, html: &str, out: &mut BTreeSet<AssetId>);
}

static ASSET_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/assets/([a-f0-9-]+)").expect("asset path pattern is valid")
});

/// Matches `/assets/<hex-id>` fragments.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssetPathPattern;

impl ReferenceExtractor for AssetPathPattern {
    fn extract(&self, html: &str, out: &mut BTreeSet<AssetId>) {
        for caps in ASSET_PATH.captures_iter(html) {
            if let Some(id) = caps.get(1) {
                out.insert(AssetId::from(id.as_str()));
            }
        }
    }
}

/// Outcome of a scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Live reference set.
    pub ids: BTreeSet<AssetId>,
    /// Block collections outside the known set, with occurrence counts.
    pub unrecognized: BTreeMap<String, usize>,
}

impl ScanReport {
    pub fn has_unrecognized(&self) -> bool {
        !self.unrecognized.is_empty()
    }
}

pub struct ContentScanner {
    extractor: Arc<dyn ReferenceExtractor>,
}

impl Default for ContentScanner {
    fn default() -> Self {
        Self::new(Arc::new(AssetPathPattern))
    }
}

impl ContentScanner {
    pub fn new(extractor: Arc<dyn ReferenceExtractor>) -> Self {
        Self { extractor }
    }

    pub fn scan(&self, graph: &ContentGraph) -> ScanReport {
        let mut report = ScanReport::default();

        for post in &graph.posts {
            self.scan_post(post, &mut report);
        }
        for category in &graph.categories {
            self.scan_category(category, &mut report);
        }
        for page in &graph.pages {
            self.scan_page(page, &mut report);
        }

        for (collection, count) in &report.unrecognized {
            warn!(
                collection = %collection,
                count,
                "Unrecognized block kind; assets it references are invisible to the scan"
            );
        }
        debug!(
            posts = graph.posts.len(),
            categories = graph.categories.len(),
            pages = graph.pages.len(),
            assets = report.ids.len(),
            "Content scan complete"
        );
        report
    }

    fn scan_post(&self, post: &Post, report: &mut ScanReport) {
        add_file(post.image.as_ref(), report);
        self.scan_translations(post.translations.as_deref(), report);
    }

    fn scan_category(&self, category: &Category, report: &mut ScanReport) {
        add_file(category.background.as_ref(), report);
        self.scan_blocks(category.blocks.as_deref(), report);
    }

    fn scan_page(&self, page: &Page, report: &mut ScanReport) {
        self.scan_blocks(page.blocks.as_deref(), report);
    }

    fn scan_blocks(&self, blocks: Option<&[Relation<Block>]>, report: &mut ScanReport) {
        for block in blocks.unwrap_or_default().iter().filter_map(Relation::expanded) {
            self.scan_block(block, report);
        }
    }

    fn scan_block(&self, block: &Block, report: &mut ScanReport) {
        match block {
            Block::RichText(rich) => self.scan_translations(rich.translations.as_deref(), report),
            Block::Gallery(gallery) => {
                for item in gallery
                    .items
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(Relation::expanded)
                {
                    add_file(item.directus_file.as_ref(), report);
                }
            }
            Block::Hero(hero) => add_file(hero.image.as_ref(), report),
            Block::Columns(columns) => self.scan_blocks(columns.blocks.as_deref(), report),
            Block::Inert(_) | Block::Unresolved => {}
            Block::Unrecognized(collection) => {
                *report.unrecognized.entry(collection.clone()).or_default() += 1;
            }
        }
    }

    fn scan_translations(
        &self,
        translations: Option<&[Relation<RichTextTranslation>]>,
        report: &mut ScanReport,
    ) {
        for translation in translations
            .unwrap_or_default()
            .iter()
            .filter_map(Relation::expanded)
        {
            if let Some(html) = translation.content.as_deref() {
                self.extractor.extract(html, &mut report.ids);
            }
        }
    }
}

fn add_file(file: Option<&Relation<crate::content::FileRef>>, report: &mut ScanReport) {
    if let Some(id) = file.and_then(Relation::file_id) {
        report.ids.insert(AssetId::from(id));
    }
}
