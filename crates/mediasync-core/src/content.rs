//! Typed content graph as returned by the content store.
//!
//! Collections are decoded into a closed set of shapes. Block entries (the
//! many-to-any `{ collection, item }` junction rows) become a [`Block`] variant
//! chosen by their declared collection, so every kind that can reference an
//! asset is handled by one exhaustive match in the scanner.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::warn;

/// A relational field: either the expanded related object or a bare key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Relation<T> {
    Expanded(T),
    Key(JsonValue),
}

impl<T> Relation<T> {
    pub fn expanded(&self) -> Option<&T> {
        match self {
            Relation::Expanded(v) => Some(v),
            Relation::Key(_) => None,
        }
    }
}

/// Reference to a stored file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileRef {
    pub id: String,
}

impl Relation<FileRef> {
    /// Identifier of the referenced file, whether expanded or given as a string key.
    pub fn file_id(&self) -> Option<&str> {
        let id = match self {
            Relation::Expanded(file) => Some(file.id.as_str()),
            Relation::Key(JsonValue::String(id)) => Some(id.as_str()),
            Relation::Key(_) => None,
        };
        id.filter(|id| !id.is_empty())
    }
}

/// A translation row carrying HTML-like rich text.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RichTextTranslation {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub image: Option<Relation<FileRef>>,
    #[serde(default)]
    pub translations: Option<Vec<Relation<RichTextTranslation>>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub background: Option<Relation<FileRef>>,
    #[serde(default)]
    pub blocks: Option<Vec<Relation<Block>>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub blocks: Option<Vec<Relation<Block>>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RichTextBlock {
    #[serde(default)]
    pub translations: Option<Vec<Relation<RichTextTranslation>>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GalleryItem {
    #[serde(default)]
    pub directus_file: Option<Relation<FileRef>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GalleryBlock {
    #[serde(default)]
    pub items: Option<Vec<Relation<GalleryItem>>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct HeroBlock {
    #[serde(default)]
    pub image: Option<Relation<FileRef>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ColumnsBlock {
    #[serde(default)]
    pub blocks: Option<Vec<Relation<Block>>>,
}

pub const COLLECTION_RICHTEXT: &str = "block_richtext";
pub const COLLECTION_GALLERY: &str = "block_gallery";
pub const COLLECTION_HERO: &str = "block_hero";
pub const COLLECTION_COLUMNS: &str = "block_columns";

/// Block collections whose payload cannot reference an asset.
pub const INERT_COLLECTIONS: &[&str] = &[
    "block_heading",
    "block_embed",
    "block_posts",
    "block_form",
    "block_button",
    "block_button_group",
    "block_categories",
];

/// One block of a page, category, or column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBlock")]
pub enum Block {
    RichText(RichTextBlock),
    Gallery(GalleryBlock),
    Hero(HeroBlock),
    Columns(ColumnsBlock),
    /// Known kind that never carries assets.
    Inert(String),
    /// No payload, an unexpanded key, or a payload that does not match its kind.
    Unresolved,
    /// Collection outside the known set.
    Unrecognized(String),
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    collection: Option<String>,
    #[serde(default)]
    item: Option<JsonValue>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let Some(collection) = raw.collection else {
            return Block::Unresolved;
        };

        if INERT_COLLECTIONS.contains(&collection.as_str()) {
            return Block::Inert(collection);
        }

        let known = matches!(
            collection.as_str(),
            COLLECTION_RICHTEXT | COLLECTION_GALLERY | COLLECTION_HERO | COLLECTION_COLUMNS
        );
        if !known {
            return Block::Unrecognized(collection);
        }

        let item = match raw.item {
            Some(item @ JsonValue::Object(_)) => item,
            _ => return Block::Unresolved,
        };

        let parsed = match collection.as_str() {
            COLLECTION_RICHTEXT => serde_json::from_value(item).map(Block::RichText),
            COLLECTION_GALLERY => serde_json::from_value(item).map(Block::Gallery),
            COLLECTION_HERO => serde_json::from_value(item).map(Block::Hero),
            _ => serde_json::from_value(item).map(Block::Columns),
        };
        parsed.unwrap_or(Block::Unresolved)
    }
}

/// Every collection that may reference assets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentGraph {
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub pages: Vec<Page>,
}

impl ContentGraph {
    /// Decode raw collection rows, dropping rows that do not fit their shape.
    pub fn from_rows(posts: Vec<JsonValue>, categories: Vec<JsonValue>, pages: Vec<JsonValue>) -> Self {
        Self {
            posts: decode_rows("posts", posts),
            categories: decode_rows("categories", categories),
            pages: decode_rows("pages", pages),
        }
    }
}

fn decode_rows<T: DeserializeOwned>(collection: &str, rows: Vec<JsonValue>) -> Vec<T> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(collection, index, error = %e, "Skipping malformed content row");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_relation_accepts_object_and_key() {
        let expanded: Relation<FileRef> = serde_json::from_value(json!({ "id": "ab12", "type": "image/png" })).unwrap();
        let key: Relation<FileRef> = serde_json::from_value(json!("cd34")).unwrap();
        let numeric: Relation<FileRef> = serde_json::from_value(json!(7)).unwrap();

        assert_eq!(expanded.file_id(), Some("ab12"));
        assert_eq!(key.file_id(), Some("cd34"));
        assert_eq!(numeric.file_id(), None);
    }

    #[test]
    fn test_block_kinds_from_collection() {
        let rich: Block = serde_json::from_value(json!({
            "collection": "block_richtext",
            "item": { "translations": [{ "content": "<p>hi</p>" }] }
        }))
        .unwrap();
        assert!(matches!(rich, Block::RichText(_)));

        let inert: Block = serde_json::from_value(json!({
            "collection": "block_embed",
            "item": { "embed_code": "<iframe/>" }
        }))
        .unwrap();
        assert_eq!(inert, Block::Inert("block_embed".to_string()));

        let unknown: Block = serde_json::from_value(json!({
            "collection": "block_carousel",
            "item": { "slides": [] }
        }))
        .unwrap();
        assert_eq!(unknown, Block::Unrecognized("block_carousel".to_string()));
    }

    #[test]
    fn test_block_without_payload_is_unresolved() {
        let missing: Block = serde_json::from_value(json!({ "collection": "block_gallery" })).unwrap();
        let key_only: Block = serde_json::from_value(json!({ "collection": "block_hero", "item": "9f1c" })).unwrap();
        let wrong_shape: Block = serde_json::from_value(json!({
            "collection": "block_gallery",
            "item": { "items": "not-a-list" }
        }))
        .unwrap();

        assert_eq!(missing, Block::Unresolved);
        assert_eq!(key_only, Block::Unresolved);
        assert_eq!(wrong_shape, Block::Unresolved);
    }

    #[test]
    fn test_columns_nest_blocks() {
        let block: Block = serde_json::from_value(json!({
            "collection": "block_columns",
            "item": {
                "blocks": [
                    { "collection": "block_hero", "item": { "image": { "id": "beef" } } },
                    12
                ]
            }
        }))
        .unwrap();

        let Block::Columns(columns) = block else {
            panic!("Expected Columns");
        };
        let nested = columns.blocks.unwrap();
        assert_eq!(nested.len(), 2);
        assert!(matches!(nested[0], Relation::Expanded(Block::Hero(_))));
        assert!(matches!(nested[1], Relation::Key(_)));
    }

    #[test]
    fn test_from_rows_skips_malformed_rows() {
        let graph = ContentGraph::from_rows(
            vec![json!({ "image": { "id": "aa" } }), json!({ "translations": 42 })],
            vec![json!({ "background": null, "blocks": null })],
            vec![],
        );
        assert_eq!(graph.posts.len(), 1);
        assert_eq!(graph.categories.len(), 1);
        assert!(graph.pages.is_empty());
    }
}
