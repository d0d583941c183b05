//! Centralized default constants for mediasync.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration falls back to these when an environment variable or CLI flag
//! is absent.

// =============================================================================
// OUTPUT DIRECTORY
// =============================================================================

/// Default output directory for mirrored assets, relative to the working directory.
pub const OUTPUT_DIR: &str = "public/assets";

/// File name of the ledger inside the output directory.
pub const LEDGER_FILE_NAME: &str = ".asset-cache.json";

/// Prefix of transient download files inside the output directory.
pub const TEMP_PREFIX: &str = "temp_";

// =============================================================================
// IMAGES (server-side transform)
// =============================================================================

/// Maximum output width in pixels for images and videos.
pub const MAX_WIDTH: u32 = 800;

/// Image recompression quality (1-100) requested from the content store.
pub const IMAGE_QUALITY: u8 = 80;

/// Output image container requested from the content store.
pub const IMAGE_FORMAT: &str = "webp";

// =============================================================================
// VIDEO (local transcode)
// =============================================================================

/// Output video container extension.
pub const VIDEO_EXTENSION: &str = ".mp4";

/// x264 constant rate factor (lower is better quality, 18-28 is typical).
pub const VIDEO_CRF: u8 = 28;

/// x264 encoder preset.
pub const VIDEO_PRESET: &str = "medium";

/// AAC audio bitrate for transcoded videos.
pub const AUDIO_BITRATE: &str = "128k";

/// Default encoder binary.
pub const FFMPEG_BIN: &str = "ffmpeg";

/// Default prober binary.
pub const FFPROBE_BIN: &str = "ffprobe";

// =============================================================================
// CONTENT
// =============================================================================

/// MIME type assumed when the content store reports none.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

// =============================================================================
// ESTIMATE
// =============================================================================

/// Fraction of the original size a server-side transformed image is assumed to keep.
pub const IMAGE_ESTIMATE_RATIO: f64 = 0.4;

/// Storage limit of the hosting target (10 GiB).
pub const STORAGE_LIMIT_BYTES: u64 = 10 * 1024 * 1024 * 1024;

/// Below this estimated total, mirroring at build time is considered safe (1 GiB).
pub const ESTIMATE_SAFE_BYTES: u64 = 1024 * 1024 * 1024;

/// Below this estimated total, mirroring is manageable but worth watching (5 GiB).
pub const ESTIMATE_CAUTION_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Number of largest files listed in an estimate.
pub const ESTIMATE_TOP_FILES: usize = 10;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

pub const ENV_CMS_URL: &str = "DIRECTUS_URL";
pub const ENV_CMS_TOKEN: &str = "DIRECTUS_TOKEN";
pub const ENV_OUTPUT_DIR: &str = "MEDIASYNC_OUTPUT_DIR";
pub const ENV_MAX_WIDTH: &str = "MEDIASYNC_MAX_WIDTH";
pub const ENV_IMAGE_QUALITY: &str = "MEDIASYNC_IMAGE_QUALITY";
pub const ENV_IMAGE_FORMAT: &str = "MEDIASYNC_IMAGE_FORMAT";
pub const ENV_VIDEO_CRF: &str = "MEDIASYNC_VIDEO_CRF";
pub const ENV_VIDEO_PRESET: &str = "MEDIASYNC_VIDEO_PRESET";
pub const ENV_AUDIO_BITRATE: &str = "MEDIASYNC_AUDIO_BITRATE";
pub const ENV_FFMPEG_PATH: &str = "FFMPEG_PATH";
pub const ENV_FFPROBE_PATH: &str = "FFPROBE_PATH";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "MEDIASYNC_HTTP_TIMEOUT_SECS";
pub const ENV_ENCODER_TIMEOUT_SECS: &str = "MEDIASYNC_ENCODER_TIMEOUT_SECS";
pub const ENV_UNKNOWN_BLOCKS: &str = "MEDIASYNC_UNKNOWN_BLOCKS";
pub const ENV_STORAGE_LIMIT_BYTES: &str = "MEDIASYNC_STORAGE_LIMIT_BYTES";
