//! Field selections for collection reads.
//!
//! Block junctions are many-to-any relations, so each payload collection is
//! expanded explicitly with the `item:<collection>` syntax.

use mediasync_core::content::{
    COLLECTION_COLUMNS, COLLECTION_GALLERY, COLLECTION_HERO, COLLECTION_RICHTEXT,
};

pub const POSTS: &str = "posts";
pub const CATEGORIES: &str = "categories";
pub const PAGES: &str = "pages";

/// Fields read for file metadata.
pub const FILE_FIELDS: &str = "id,filesize,type,filename_download";

pub fn post_fields() -> String {
    ["*", "image.*", "translations.*"].join(",")
}

pub fn category_fields() -> String {
    let mut fields = vec!["*".to_string(), "background.*".to_string()];
    fields.extend(block_fields("blocks", true));
    fields.join(",")
}

pub fn page_fields() -> String {
    let mut fields = vec!["*".to_string()];
    fields.extend(block_fields("blocks", true));
    fields.join(",")
}

fn block_fields(prefix: &str, with_columns: bool) -> Vec<String> {
    let mut fields = vec![
        format!("{prefix}.*"),
        format!("{prefix}.item:{COLLECTION_RICHTEXT}.*"),
        format!("{prefix}.item:{COLLECTION_RICHTEXT}.translations.*"),
        format!("{prefix}.item:{COLLECTION_GALLERY}.*"),
        format!("{prefix}.item:{COLLECTION_GALLERY}.items.*"),
        format!("{prefix}.item:{COLLECTION_GALLERY}.items.directus_file.*"),
        format!("{prefix}.item:{COLLECTION_HERO}.*"),
        format!("{prefix}.item:{COLLECTION_HERO}.image.*"),
    ];
    if with_columns {
        fields.push(format!("{prefix}.item:{COLLECTION_COLUMNS}.*"));
        fields.extend(block_fields(
            &format!("{prefix}.item:{COLLECTION_COLUMNS}.blocks"),
            false,
        ));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_fields() {
        assert_eq!(post_fields(), "*,image.*,translations.*");
    }

    #[test]
    fn test_category_fields_expand_block_payloads() {
        let fields = category_fields();
        assert!(fields.starts_with("*,background.*,blocks.*,"));
        assert!(fields.contains("blocks.item:block_richtext.translations.*"));
        assert!(fields.contains("blocks.item:block_gallery.items.directus_file.*"));
        assert!(fields.contains("blocks.item:block_columns.blocks.item:block_hero.image.*"));
        assert!(!fields.contains("blocks.item:block_columns.blocks.item:block_columns"));
    }

    #[test]
    fn test_page_fields_include_hero_image() {
        assert!(page_fields().contains("blocks.item:block_hero.image.*"));
    }
}
