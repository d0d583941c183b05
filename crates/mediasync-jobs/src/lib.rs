//! # mediasync-jobs
//!
//! The mirror run itself.
//!
//! This crate provides:
//! - The metadata resolver (identifier set → asset records)
//! - An ffmpeg/ffprobe backed video encoder
//! - The per-asset fetch-transform pipeline with ledger cache checks
//! - The full sync run and the pre-flight size estimate
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mediasync_cms::{DirectusClient, HttpDownloader};
//! use mediasync_jobs::{FfmpegConfig, FfmpegEncoder, SyncRun};
//!
//! let config = MirrorConfig::from_env()?;
//! let run = SyncRun::from_config(
//!     &config,
//!     Arc::new(DirectusClient::from_env()?),
//!     Arc::new(HttpDownloader::new(config.http_timeout_secs)?),
//!     Arc::new(FfmpegEncoder::new(FfmpegConfig::from_mirror_config(&config))),
//! );
//! let report = run.execute().await?;
//! println!("{} processed, {} skipped", report.processed, report.skipped);
//! ```

pub mod estimate;
pub mod ffmpeg;
pub mod pipeline;
pub mod resolve;
pub mod sync;

pub use estimate::{estimate_sizes, FileSize, Recommendation, SizeEstimate};
pub use ffmpeg::{FfmpegConfig, FfmpegEncoder};
pub use pipeline::AssetPipeline;
pub use resolve::{resolve_records, KindCounts};
pub use sync::{SyncReport, SyncRun};
