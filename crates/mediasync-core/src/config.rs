//! Run configuration, loaded from the environment with defaults.

use std::path::PathBuf;
use std::str::FromStr;

use crate::defaults::*;
use crate::models::ImageTransform;
use crate::{Error, Result};

/// What the reconciliation sweep does when the scan met block kinds it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownBlockPolicy {
    /// Trust the live set and delete every unreferenced file.
    #[default]
    Delete,
    /// Keep every file for this run; report what would have been deleted.
    Retain,
}

impl FromStr for UnknownBlockPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "retain" => Ok(Self::Retain),
            other => Err(Error::Config(format!(
                "unknown block policy '{}' (expected 'delete' or 'retain')",
                other
            ))),
        }
    }
}

/// Full configuration for a sync or estimate run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Base URL of the content store.
    pub cms_url: String,
    /// Static bearer token for the content store.
    pub cms_token: String,
    pub output_dir: PathBuf,
    pub max_width: u32,
    pub image_quality: u8,
    pub image_format: String,
    pub video_crf: u8,
    pub video_preset: String,
    pub audio_bitrate: String,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub http_timeout_secs: Option<u64>,
    /// Per-invocation encoder timeout; `None` waits indefinitely.
    pub encoder_timeout_secs: Option<u64>,
    pub unknown_blocks: UnknownBlockPolicy,
    pub storage_limit_bytes: u64,
}

impl MirrorConfig {
    /// Defaults for everything except the content store coordinates.
    pub fn new(cms_url: impl Into<String>, cms_token: impl Into<String>) -> Self {
        Self {
            cms_url: cms_url.into(),
            cms_token: cms_token.into(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            max_width: MAX_WIDTH,
            image_quality: IMAGE_QUALITY,
            image_format: IMAGE_FORMAT.to_string(),
            video_crf: VIDEO_CRF,
            video_preset: VIDEO_PRESET.to_string(),
            audio_bitrate: AUDIO_BITRATE.to_string(),
            ffmpeg_path: FFMPEG_BIN.to_string(),
            ffprobe_path: FFPROBE_BIN.to_string(),
            http_timeout_secs: None,
            encoder_timeout_secs: None,
            unknown_blocks: UnknownBlockPolicy::Delete,
            storage_limit_bytes: STORAGE_LIMIT_BYTES,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cms_url = lookup(ENV_CMS_URL)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config(format!("{} is not set", ENV_CMS_URL)))?;
        let cms_token = lookup(ENV_CMS_TOKEN)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config(format!("{} is not set", ENV_CMS_TOKEN)))?;

        let mut config = Self::new(cms_url.trim_end_matches('/'), cms_token);

        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(v) = parse_var(&lookup, ENV_MAX_WIDTH)? {
            config.max_width = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_IMAGE_QUALITY)? {
            config.image_quality = v;
        }
        if let Some(v) = lookup(ENV_IMAGE_FORMAT) {
            config.image_format = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_VIDEO_CRF)? {
            config.video_crf = v;
        }
        if let Some(v) = lookup(ENV_VIDEO_PRESET) {
            config.video_preset = v;
        }
        if let Some(v) = lookup(ENV_AUDIO_BITRATE) {
            config.audio_bitrate = v;
        }
        if let Some(v) = lookup(ENV_FFMPEG_PATH) {
            config.ffmpeg_path = v;
        }
        if let Some(v) = lookup(ENV_FFPROBE_PATH) {
            config.ffprobe_path = v;
        }
        config.http_timeout_secs = parse_var(&lookup, ENV_HTTP_TIMEOUT_SECS)?;
        config.encoder_timeout_secs = parse_var(&lookup, ENV_ENCODER_TIMEOUT_SECS)?;
        if let Some(v) = lookup(ENV_UNKNOWN_BLOCKS) {
            config.unknown_blocks = v.parse()?;
        }
        if let Some(v) = parse_var(&lookup, ENV_STORAGE_LIMIT_BYTES)? {
            config.storage_limit_bytes = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cms_url.is_empty() {
            return Err(Error::Config("content store URL is empty".to_string()));
        }
        if self.cms_token.is_empty() {
            return Err(Error::Config("content store token is empty".to_string()));
        }
        if self.max_width == 0 {
            return Err(Error::Config("max width must be positive".to_string()));
        }
        if !(1..=100).contains(&self.image_quality) {
            return Err(Error::Config(format!(
                "image quality must be within 1..=100, got {}",
                self.image_quality
            )));
        }
        if self.image_format.is_empty() {
            return Err(Error::Config("image format is empty".to_string()));
        }
        Ok(())
    }

    /// Server-side transform requested for image downloads.
    pub fn image_transform(&self) -> ImageTransform {
        ImageTransform {
            width: self.max_width,
            quality: self.image_quality,
            format: self.image_format.clone(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, raw))),
    }
}
