//! FFprobe container inspection.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Streams found in a media container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Whether a video stream is present
    pub has_video: bool,
    /// First audio stream, if any
    pub audio: Option<AudioStreamInfo>,
}

impl ContainerInfo {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Audio stream details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub codec: String,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
}

/// Probe a media container for its streams.
pub async fn probe_container(path: impl AsRef<Path>) -> MediaResult<ContainerInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(stdout: &[u8]) -> MediaResult<ContainerInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let has_video = probe.streams.iter().any(|s| s.codec_type == "video");

    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "audio")
        .map(|s| AudioStreamInfo {
            codec: s.codec_name.clone().unwrap_or_default(),
            sample_rate: s.sample_rate.as_ref().and_then(|r| r.parse().ok()),
            channels: s.channels,
        });

    Ok(ContainerInfo {
        duration,
        has_video,
        audio,
    })
}
