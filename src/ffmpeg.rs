//! FFmpeg command builder and runner for raw grayscale frame input.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::debug;

use crate::encoder::EncoderError;

/// Builder for an FFmpeg command reading 8-bit gray frames from stdin.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Output file path
    output: PathBuf,
    /// Native frame size (width, height) of the piped frames
    frame_size: (usize, usize),
    /// Input frame rate
    fps: u32,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(output: impl AsRef<Path>, frame_size: (usize, usize), fps: u32) -> Self {
        Self {
            output: output.as_ref().to_path_buf(),
            frame_size,
            fps,
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set output pixel format.
    pub fn pixel_format(self, pix_fmt: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(pix_fmt)
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Raw frames on stdin
        let (width, height) = self.frame_size;
        args.extend([
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "gray".to_string(),
            "-s".to_string(),
            format!("{width}x{height}"),
            "-r".to_string(),
            self.fps.to_string(),
            "-i".to_string(),
            "pipe:0".to_string(),
        ]);

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runs an [`FfmpegCommand`], feeding it raw frame bytes.
#[derive(Debug, Default)]
pub struct FfmpegRunner {
    /// Directories searched for `ffmpeg` instead of `PATH`
    search_path: Option<OsString>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self { search_path: None }
    }

    /// Look for `ffmpeg` in `paths` (same syntax as `PATH`).
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    fn program(&self) -> Result<PathBuf, EncoderError> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir()?;
                which::which_in("ffmpeg", Some(paths), cwd)
            }
            None => which::which("ffmpeg"),
        };
        found.map_err(|_| EncoderError::FfmpegNotFound)
    }

    /// Spawn ffmpeg, write `frames` to its stdin and wait for it to exit.
    pub async fn run(&self, cmd: &FfmpegCommand, frames: &[u8]) -> Result<(), EncoderError> {
        let program = self.program()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", program.display(), args.join(" "));

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child.stdin.take().ok_or(EncoderError::PipeClosed)?;
        let mut stderr = child.stderr.take().ok_or(EncoderError::PipeClosed)?;

        let feed = async move {
            stdin.write_all(frames).await?;
            // ffmpeg waits for EOF before finishing the file
            stdin.shutdown().await?;
            Ok::<_, std::io::Error>(())
        };
        let drain = async move {
            let mut output = Vec::new();
            stderr.read_to_end(&mut output).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&output).into_owned())
        };

        let (fed, drained) = tokio::join!(feed, drain);
        let status = child.wait().await?;

        if !status.success() {
            // the exit status is the error; a broken stdin pipe is only its symptom
            return Err(EncoderError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                drained.ok(),
                status.code(),
            ));
        }
        fed?;
        drained?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_pipe_gray_frames_and_scale_with_neighbor() {
        let cmd = FfmpegCommand::new("sub01_xy.mp4", (64, 48), 24)
            .video_filter("scale=1024:768:flags=neighbor")
            .video_codec("libx264")
            .pixel_format("yuv420p");
        let args = cmd.build_args();

        assert_eq!(args[0], "-y");
        assert_eq!(&args[1..3], ["-v", "error"]);
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pix_fmt gray -s 64x48 -r 24 -i pipe:0"));
        assert!(joined.contains("-vf scale=1024:768:flags=neighbor"));
        assert_eq!(args.last().map(String::as_str), Some("sub01_xy.mp4"));

        let input = args.iter().position(|a| a == "-i").unwrap();
        let filter = args.iter().position(|a| a == "-vf").unwrap();
        assert!(input < filter);
    }
}
