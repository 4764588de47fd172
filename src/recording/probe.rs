use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::info;

/// What the integrity inspection learned about a media file
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Container duration in seconds
    pub duration_secs: f64,
    /// Number of video tracks in the container
    pub video_tracks: usize,
}

impl MediaInfo {
    /// A recording is playable if it has any duration and at least one
    /// video track
    pub fn is_playable(&self) -> bool {
        self.duration_secs > 0.0 && self.video_tracks > 0
    }
}

/// Media container inspection
///
/// The recorder's container format is produced externally and only
/// inspected here, never parsed in detail. Implementations must be
/// cheap enough to run as a detached diagnostic task.
#[async_trait::async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

/// Probe backed by the `ffprobe` CLI
///
/// Runs ffprobe with JSON output and reads the stream list and format
/// duration out of it.
pub struct FfprobeProbe;

#[async_trait::async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .await
            .context("Failed to run ffprobe")?;

        if !output.status.success() {
            bail!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .context("Failed to parse ffprobe output")?;

        let video_tracks = json
            .get("streams")
            .and_then(|s| s.as_array())
            .map(|streams| {
                streams
                    .iter()
                    .filter(|s| {
                        s.get("codec_type").and_then(|t| t.as_str()) == Some("video")
                    })
                    .count()
            })
            .unwrap_or(0);

        let duration_secs = json
            .get("format")
            .and_then(|f| f.get("duration"))
            .and_then(|d| d.as_str())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        let media_info = MediaInfo {
            duration_secs,
            video_tracks,
        };

        info!(
            "Probed {}: {:.1}s, {} video track(s)",
            path.display(),
            media_info.duration_secs,
            media_info.video_tracks
        );

        Ok(media_info)
    }
}
