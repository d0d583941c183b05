//! Asset data model: identifiers, records, ledger entries, and outcomes.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults;

/// Opaque identifier of a stored asset, as referenced by content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Transform strategy category, derived from the declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// `image/*`: resized and recompressed by the content store.
    Image,
    /// `video/*`: transcoded locally by the external encoder.
    Video,
    /// Anything else: mirrored verbatim.
    Other,
}

impl AssetKind {
    /// Classify a MIME type by prefix.
    pub fn classify(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            AssetKind::Image
        } else if mime_type.starts_with("video/") {
            AssetKind::Video
        } else {
            AssetKind::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
            AssetKind::Other => "other",
        }
    }
}

/// Server-side image transform requested through the download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTransform {
    pub width: u32,
    pub quality: u8,
    pub format: String,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            width: defaults::MAX_WIDTH,
            quality: defaults::IMAGE_QUALITY,
            format: defaults::IMAGE_FORMAT.to_string(),
        }
    }
}

/// Canonical file metadata as returned by the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: AssetId,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    /// Some content store deployments serialize big integers as strings.
    #[serde(default, deserialize_with = "deserialize_size")]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filename_download: Option<String>,
}

fn deserialize_size<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Size>::deserialize(deserializer)? {
        Some(Size::Number(n)) => Some(n),
        Some(Size::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// One asset to mirror. Built once per identifier by the metadata resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub id: AssetId,
    pub mime_type: String,
    pub filesize: u64,
    pub filename: String,
    pub url: String,
    pub kind: AssetKind,
}

impl AssetRecord {
    /// Build a record from store metadata and a resolved download URL.
    pub fn from_metadata(meta: FileMetadata, url: String) -> Self {
        let mime_type = meta
            .mime_type
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| defaults::FALLBACK_MIME_TYPE.to_string());
        let kind = AssetKind::classify(&mime_type);
        let filename = meta
            .filename_download
            .unwrap_or_else(|| meta.id.as_str().to_string());

        Self {
            id: meta.id,
            mime_type,
            filesize: meta.filesize.unwrap_or(0),
            filename,
            url,
            kind,
        }
    }

    /// Extension of the *output* file, including the leading dot.
    ///
    /// Images take the requested transform format, videos the transcode
    /// container, and other files keep their original extension (or none).
    pub fn output_extension(&self, image_format: &str) -> String {
        match self.kind {
            AssetKind::Image => format!(".{}", image_format),
            AssetKind::Video => defaults::VIDEO_EXTENSION.to_string(),
            AssetKind::Other => Path::new(&self.filename)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e))
                .unwrap_or_default(),
        }
    }
}

/// Per-asset processing metadata persisted in the ledger.
///
/// `hash` is the MD5 of the downloaded original, or empty for assets whose
/// category is never hashed (server-transformed images).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub hash: String,
    /// Epoch milliseconds.
    pub processed_at: i64,
    pub original_size: u64,
    pub processed_size: u64,
}

impl LedgerEntry {
    /// Entry stamped with the current time.
    pub fn now(hash: impl Into<String>, original_size: u64, processed_size: u64) -> Self {
        Self {
            hash: hash.into(),
            processed_at: chrono::Utc::now().timestamp_millis(),
            original_size,
            processed_size,
        }
    }
}

/// Result of processing one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// A fresh download/transform happened (false = ledger cache hit).
    pub saved: bool,
    /// Size of the output file in bytes.
    pub size: u64,
}

impl ProcessOutcome {
    pub fn saved(size: u64) -> Self {
        Self { saved: true, size }
    }

    pub fn cached(size: u64) -> Self {
        Self { saved: false, size }
    }
}

/// Pixel dimensions of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Cap the width at `max_width`, preserving aspect ratio.
    ///
    /// The scaled height is rounded to the nearest integer and then bumped to
    /// the next even number, which H.264 requires. Sources already within
    /// bounds are returned unchanged.
    pub fn scale_to_max_width(self, max_width: u32) -> Self {
        if self.width <= max_width || self.width == 0 {
            return self;
        }
        let scaled = (f64::from(self.height) * f64::from(max_width) / f64::from(self.width))
            .round() as u32;
        let height = if scaled % 2 == 0 { scaled } else { scaled + 1 };
        Self {
            width: max_width,
            height,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(mime: Option<&str>, filename: Option<&str>) -> FileMetadata {
        FileMetadata {
            id: AssetId::from("abc-123"),
            mime_type: mime.map(str::to_string),
            filesize: Some(2048),
            filename_download: filename.map(str::to_string),
        }
    }

    #[test]
    fn test_classify_by_prefix() {
        assert_eq!(AssetKind::classify("image/png"), AssetKind::Image);
        assert_eq!(AssetKind::classify("video/quicktime"), AssetKind::Video);
        assert_eq!(AssetKind::classify("application/pdf"), AssetKind::Other);
        assert_eq!(AssetKind::classify(""), AssetKind::Other);
    }

    #[test]
    fn test_missing_mime_defaults_to_other() {
        let record = AssetRecord::from_metadata(meta(None, Some("x.bin")), String::new());
        assert_eq!(record.mime_type, "application/octet-stream");
        assert_eq!(record.kind, AssetKind::Other);
    }

    #[test]
    fn test_output_extension_per_kind() {
        let image = AssetRecord::from_metadata(meta(Some("image/jpeg"), Some("a.jpg")), String::new());
        let video = AssetRecord::from_metadata(meta(Some("video/webm"), Some("a.webm")), String::new());
        let pdf = AssetRecord::from_metadata(
            meta(Some("application/pdf"), Some("brochure.final.pdf")),
            String::new(),
        );
        let bare = AssetRecord::from_metadata(meta(Some("text/plain"), Some("README")), String::new());

        assert_eq!(image.output_extension("webp"), ".webp");
        assert_eq!(video.output_extension("webp"), ".mp4");
        assert_eq!(pdf.output_extension("webp"), ".pdf");
        assert_eq!(bare.output_extension("webp"), "");
    }

    #[test]
    fn test_file_metadata_accepts_string_filesize() {
        let parsed: FileMetadata = serde_json::from_value(json!({
            "id": "f1",
            "type": "video/mp4",
            "filesize": "73400320",
            "filename_download": "clip.mp4"
        }))
        .unwrap();
        assert_eq!(parsed.filesize, Some(73_400_320));

        let missing: FileMetadata = serde_json::from_value(json!({ "id": "f2", "filesize": null })).unwrap();
        assert_eq!(missing.filesize, None);
        assert_eq!(missing.mime_type, None);
    }

    #[test]
    fn test_ledger_entry_serializes_camel_case() {
        let entry = LedgerEntry {
            hash: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            processed_at: 1_700_000_000_000,
            original_size: 10,
            processed_size: 5,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["processedAt"], 1_700_000_000_000i64);
        assert_eq!(value["originalSize"], 10);
        assert_eq!(value["processedSize"], 5);
    }

    #[test]
    fn test_scale_preserves_aspect_ratio() {
        let scaled = Dimensions::new(1920, 1080).scale_to_max_width(800);
        assert_eq!(scaled, Dimensions::new(800, 450));
    }

    #[test]
    fn test_scale_rounds_odd_height_up_to_even() {
        // 501 * 800 / 1000 = 400.8 -> 401 -> 402
        let scaled = Dimensions::new(1000, 501).scale_to_max_width(800);
        assert_eq!(scaled, Dimensions::new(800, 402));
        // 333 * 800 / 1000 = 266.4 -> 266
        let scaled = Dimensions::new(1000, 333).scale_to_max_width(800);
        assert_eq!(scaled, Dimensions::new(800, 266));
    }

    #[test]
    fn test_scale_leaves_small_sources_alone() {
        let src = Dimensions::new(640, 361);
        assert_eq!(src.scale_to_max_width(800), src);
        assert_eq!(Dimensions::new(800, 600).scale_to_max_width(800), Dimensions::new(800, 600));
    }
}
