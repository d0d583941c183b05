//! mediasync: mirror CMS-hosted media into a local static asset directory.
//!
//! `mediasync sync` downloads, transforms, and reconciles every asset the
//! content references. `mediasync estimate` sizes up the mirror from metadata
//! alone.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use mediasync_cms::{DirectusClient, DirectusConfig, HttpDownloader};
use mediasync_core::{format_bytes, ContentScanner, MirrorConfig, UnknownBlockPolicy};
use mediasync_jobs::{estimate_sizes, FfmpegConfig, FfmpegEncoder, SizeEstimate, SyncReport, SyncRun};

#[derive(Parser)]
#[command(name = "mediasync")]
#[command(author, version, about = "Mirror CMS media assets into local static storage")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, transform, and reconcile every referenced asset
    Sync {
        /// Output directory (default: public/assets)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Maximum width for images and videos, in pixels
        #[arg(long)]
        max_width: Option<u32>,

        /// Image quality passed to the content store transform (1-100)
        #[arg(long)]
        image_quality: Option<u8>,

        /// x264 constant rate factor for video transcodes
        #[arg(long)]
        video_crf: Option<u8>,

        /// Keep unreferenced files when content contains unknown block kinds
        #[arg(long)]
        retain_unknown: bool,
    },

    /// Estimate the mirror size from file metadata, without downloading
    Estimate {
        /// Storage budget to compare against, in bytes
        #[arg(long)]
        storage_limit_bytes: Option<u64>,
    },
}

/// Initialize tracing.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "mediasync=info")
fn init_logging() -> Option<WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "mediasync=info,mediasync_core=info,mediasync_store=info,mediasync_cms=info,mediasync_jobs=info"
            .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let file_dir = Path::new(path).parent().unwrap_or(Path::new("."));
        let file_name = Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("mediasync.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

/// Apply `sync` flags on top of the environment configuration.
fn apply_sync_overrides(
    config: &mut MirrorConfig,
    output_dir: Option<PathBuf>,
    max_width: Option<u32>,
    image_quality: Option<u8>,
    video_crf: Option<u8>,
    retain_unknown: bool,
) {
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(width) = max_width {
        config.max_width = width;
    }
    if let Some(quality) = image_quality {
        config.image_quality = quality;
    }
    if let Some(crf) = video_crf {
        config.video_crf = crf;
    }
    if retain_unknown {
        config.unknown_blocks = UnknownBlockPolicy::Retain;
    }
}

async fn run_sync(config: MirrorConfig) -> anyhow::Result<()> {
    let source = Arc::new(DirectusClient::new(DirectusConfig::from_mirror_config(&config))?);
    let transport = Arc::new(HttpDownloader::new(config.http_timeout_secs)?);
    let encoder = FfmpegEncoder::new(FfmpegConfig::from_mirror_config(&config));
    if !encoder.health_check().await {
        warn!(
            ffmpeg = %encoder.config().ffmpeg_path,
            "ffmpeg is not runnable; videos will be copied without transcoding"
        );
    }

    info!(output_dir = %config.output_dir.display(), "Starting asset sync");
    let report = SyncRun::from_config(&config, source, transport, Arc::new(encoder))
        .execute()
        .await?;
    print_sync_report(&report);
    Ok(())
}

fn print_sync_report(report: &SyncReport) {
    println!();
    println!("Asset sync complete");
    println!("  Referenced:  {}", report.referenced);
    println!(
        "  Resolved:    {} images, {} videos, {} other",
        report.counts.images, report.counts.videos, report.counts.others
    );
    println!("  Processed:   {}", report.processed);
    println!("  Skipped:     {} (unchanged)", report.skipped);
    if !report.failed.is_empty() {
        let ids: Vec<String> = report.failed.iter().map(ToString::to_string).collect();
        println!("  Failed:      {} ({})", report.failed.len(), ids.join(", "));
    }
    println!("  Removed:     {}", report.removed.len());
    if !report.retained.is_empty() {
        println!(
            "  Retained:    {} unreferenced files kept (unknown block kinds: {})",
            report.retained.len(),
            report
                .unrecognized
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!("  Original:    {}", format_bytes(report.original_bytes));
    println!("  Processed:   {}", format_bytes(report.processed_bytes));
    println!("  Saved:       {}%", report.percent_saved());
}

async fn run_estimate(config: MirrorConfig) -> anyhow::Result<()> {
    let source = DirectusClient::new(DirectusConfig::from_mirror_config(&config))?;
    let estimate = estimate_sizes(
        &source,
        &ContentScanner::default(),
        &config.image_transform(),
        config.storage_limit_bytes,
    )
    .await?;
    print_estimate(&estimate);
    Ok(())
}

fn print_estimate(estimate: &SizeEstimate) {
    println!();
    println!("Asset size estimate");
    println!("  Images:      {}", estimate.counts.images);
    println!("  Videos:      {}", estimate.counts.videos);
    println!("  Other:       {}", estimate.counts.others);
    println!("  Referenced:  {}", estimate.referenced);
    println!();
    println!("  Original:    {}", format_bytes(estimate.original_bytes));
    println!("  Estimated:   {}", format_bytes(estimate.estimated_bytes));
    println!(
        "  Budget:      {} of {} ({}%)",
        format_bytes(estimate.estimated_bytes),
        format_bytes(estimate.storage_limit_bytes),
        estimate.percent_of_limit()
    );
    println!();
    println!("  {}", estimate.recommendation().message());

    if !estimate.largest.is_empty() {
        println!();
        println!("Largest files:");
        for (index, file) in estimate.largest.iter().enumerate() {
            println!(
                "  {}. {} - {} ({})",
                index + 1,
                file.filename,
                format_bytes(file.size),
                file.mime_type
            );
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = MirrorConfig::from_env()?;

    match cli.command {
        Commands::Sync {
            output_dir,
            max_width,
            image_quality,
            video_crf,
            retain_unknown,
        } => {
            apply_sync_overrides(
                &mut config,
                output_dir,
                max_width,
                image_quality,
                video_crf,
                retain_unknown,
            );
            config.validate()?;
            run_sync(config).await
        }
        Commands::Estimate {
            storage_limit_bytes,
        } => {
            if let Some(limit) = storage_limit_bytes {
                config.storage_limit_bytes = limit;
            }
            run_estimate(config).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::try_parse_from([
            "mediasync",
            "sync",
            "--output-dir",
            "dist/assets",
            "--max-width",
            "1200",
            "--retain-unknown",
        ])
        .unwrap();

        match cli.command {
            Commands::Sync {
                output_dir,
                max_width,
                image_quality,
                retain_unknown,
                ..
            } => {
                assert_eq!(output_dir, Some(PathBuf::from("dist/assets")));
                assert_eq!(max_width, Some(1200));
                assert_eq!(image_quality, None);
                assert!(retain_unknown);
            }
            Commands::Estimate { .. } => panic!("expected sync"),
        }
    }

    #[test]
    fn test_sync_overrides_win_over_environment() {
        let mut config = MirrorConfig::new("https://cms.test", "token");
        apply_sync_overrides(&mut config, None, Some(640), Some(70), Some(30), true);

        assert_eq!(config.max_width, 640);
        assert_eq!(config.image_quality, 70);
        assert_eq!(config.video_crf, 30);
        assert_eq!(config.unknown_blocks, UnknownBlockPolicy::Retain);
        assert_eq!(config.output_dir, PathBuf::from("public/assets"));
    }

    #[test]
    fn test_parse_estimate() {
        let cli =
            Cli::try_parse_from(["mediasync", "estimate", "--storage-limit-bytes", "1024"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Estimate {
                storage_limit_bytes: Some(1024)
            }
        ));
    }
}
