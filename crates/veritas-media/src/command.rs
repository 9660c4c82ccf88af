//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Builder for a single-input, single-output FFmpeg invocation.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    /// Placed before `-i`
    input_args: Vec<String>,
    /// Placed between the input and the output path
    output_args: Vec<String>,
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Append an argument before `-i`.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Append an argument after the input.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Drop the video stream.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Keep an existing output file instead of overwriting it.
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }

    /// Build the command arguments.
    ///
    /// Progress reporting is disabled (`-nostats`) and only errors are
    /// printed.
    pub fn build_args(&self) -> Vec<String> {
        let overwrite = if self.overwrite { "-y" } else { "-n" };
        let mut args: Vec<String> = [overwrite, "-hide_banner", "-nostats", "-v", "error"]
            .iter()
            .map(|a| a.to_string())
            .collect();

        args.extend(self.input_args.iter().cloned());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().into_owned());
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Encoder arguments for an audio container, chosen by file extension.
pub fn audio_codec_args(extension: &str) -> MediaResult<Vec<&'static str>> {
    let args: &[&str] = match extension.to_ascii_lowercase().as_str() {
        "mp3" => &["-c:a", "libmp3lame", "-q:a", "2"],
        "wav" => &["-c:a", "pcm_s16le"],
        "m4a" | "aac" => &["-c:a", "aac", "-b:a", "192k"],
        "flac" => &["-c:a", "flac"],
        "ogg" => &["-c:a", "libvorbis", "-q:a", "5"],
        other => return Err(MediaError::UnsupportedFormat(other.to_string())),
    };
    Ok(args.to_vec())
}

/// Runs an [`FfmpegCommand`], optionally bounded in time.
///
/// The child process is spawned with `kill_on_drop`, so it never outlives
/// the future that waits on it.
pub struct FfmpegRunner {
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Kill FFmpeg after `secs` seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match self.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
                    .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        // The dropped future kills the child.
                        warn!("FFmpeg timed out after {} seconds, killing process", secs);
                        return Err(MediaError::Timeout(secs));
                    }
                }
            }
            None => child.wait_with_output().await?,
        };

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                (!stderr.is_empty()).then_some(stderr),
                output.status.code(),
            ))
        }
    }
}

/// Locate `ffmpeg` on the PATH.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Locate `ffprobe` on the PATH.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
