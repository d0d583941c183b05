//! FfmpegEncoder — probes and transcodes videos with the ffprobe/ffmpeg binaries.

use std::ffi::OsString;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use mediasync_core::{defaults, Dimensions, Error, MediaEncoder, MirrorConfig, Result};

/// Encoder settings.
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// x264 constant rate factor.
    pub crf: u8,
    pub preset: String,
    pub audio_bitrate: String,
    /// Per-invocation timeout; `None` waits for the process to exit.
    pub timeout_secs: Option<u64>,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: defaults::FFMPEG_BIN.to_string(),
            ffprobe_path: defaults::FFPROBE_BIN.to_string(),
            crf: defaults::VIDEO_CRF,
            preset: defaults::VIDEO_PRESET.to_string(),
            audio_bitrate: defaults::AUDIO_BITRATE.to_string(),
            timeout_secs: None,
        }
    }
}

impl FfmpegConfig {
    pub fn from_mirror_config(config: &MirrorConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            crf: config.video_crf,
            preset: config.video_preset.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
            timeout_secs: config.encoder_timeout_secs,
        }
    }
}

pub struct FfmpegEncoder {
    config: FfmpegConfig,
}

impl FfmpegEncoder {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FfmpegConfig {
        &self.config
    }

    /// Check that the encoder binary runs.
    pub async fn health_check(&self) -> bool {
        match Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
        {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
}

/// Run a command to completion, failing on spawn error, timeout, or non-zero exit.
async fn run_cmd(cmd: &mut Command, program: &str, timeout_secs: Option<u64>) -> Result<Output> {
    cmd.kill_on_drop(true);
    let output = match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), cmd.output())
            .await
            .map_err(|_| Error::Encoder(format!("{} timed out after {}s", program, secs)))?,
        None => cmd.output().await,
    }
    .map_err(|e| Error::Encoder(format!("Failed to execute {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Encoder(format!(
            "{} failed ({}): {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(output)
}

/// Arguments that print the first video stream's size as `WxH`.
fn probe_args(input: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height",
        "-of",
        "csv=s=x:p=0",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(input.as_os_str().to_owned());
    args
}

fn transcode_args(config: &FfmpegConfig, input: &Path, output: &Path, target: Dimensions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input.as_os_str().to_owned()];
    let rest = [
        "-vf".to_string(),
        format!("scale={}:{}", target.width, target.height),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-crf".to_string(),
        config.crf.to_string(),
        "-preset".to_string(),
        config.preset.clone(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        config.audio_bitrate.clone(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-y".to_string(),
    ];
    args.extend(rest.into_iter().map(OsString::from));
    args.push(output.as_os_str().to_owned());
    args
}

/// Parse ffprobe's `WxH` CSV output; the first non-empty line wins.
pub fn parse_probe_output(stdout: &str) -> Result<Dimensions> {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| Error::Encoder("ffprobe reported no video stream".to_string()))?;

    let (w, h) = line
        .split_once('x')
        .ok_or_else(|| Error::Encoder(format!("Unexpected ffprobe output: '{}'", line)))?;
    let parse = |s: &str| {
        s.trim()
            .trim_end_matches(',')
            .parse::<u32>()
            .map_err(|e| Error::Encoder(format!("Unexpected ffprobe output '{}': {}", line, e)))
    };
    Ok(Dimensions::new(parse(w)?, parse(h)?))
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    async fn probe_dimensions(&self, input: &Path) -> Result<Dimensions> {
        let output = run_cmd(
            Command::new(&self.config.ffprobe_path).args(probe_args(input)),
            "ffprobe",
            self.config.timeout_secs,
        )
        .await?;
        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn transcode(&self, input: &Path, output: &Path, target: Dimensions) -> Result<()> {
        let args = transcode_args(&self.config, input, output, target);
        debug!(input = %input.display(), output = %output.display(), %target, "Transcoding video");
        run_cmd(
            Command::new(&self.config.ffmpeg_path).args(args),
            "ffmpeg",
            self.config.timeout_secs,
        )
        .await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}
