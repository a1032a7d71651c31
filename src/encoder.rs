use crate::enums::{Orientation, OutputFormat};
use crate::ffmpeg::{FfmpegCommand, FfmpegRunner};
use crate::interpolator::{DisplayDimensions, Interpolator};

use image::GrayImage;
use ndarray::ArrayView3;
use ndarray::Axis;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Frame rate of the output movies
pub const DEFAULT_FPS: u32 = 24;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFmpeg pipe was not captured")]
    PipeClosed,

    #[error("Frame buffer does not match {width}x{height}")]
    FrameSize { width: u32, height: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl EncoderError {
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        let mut message = message.into();
        if let Some(stderr) = stderr.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            message = format!("{message}: {stderr}");
        }
        Self::FfmpegFailed {
            message,
            stderr,
            exit_code,
        }
    }
}

/// Writes one (t, h, w) 8-bit stack per orientation.
#[derive(Debug)]
pub enum Encoder {
    /// H.264 movie, upsampled by ffmpeg's scale filter
    Ffmpeg {
        fps: u32,
        codec: String,
        runner: FfmpegRunner,
    },
    /// PNG per frame, upsampled in-process
    PngSequence,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::from_format(OutputFormat::Mp4, DEFAULT_FPS)
    }
}

impl Encoder {
    pub fn from_format(format: OutputFormat, fps: u32) -> Self {
        match format {
            OutputFormat::Mp4 => Encoder::Ffmpeg {
                fps,
                codec: "libx264".to_string(),
                runner: FfmpegRunner::new(),
            },
            OutputFormat::Png => Encoder::PngSequence,
        }
    }

    /// `<out_dir>/<stem>_<plane>.mp4`, or the frame directory for PNG output
    pub fn output_path(&self, out_dir: &Path, stem: &str, orientation: Orientation) -> PathBuf {
        let name = format!("{stem}_{}", orientation.suffix());
        match self {
            Encoder::Ffmpeg { .. } => out_dir.join(format!("{name}.mp4")),
            Encoder::PngSequence => out_dir.join(name),
        }
    }

    /// Upsample `stack` to `dims` and write it to `output`, replacing
    /// whatever is there.
    pub async fn encode(
        &self,
        stack: &ArrayView3<'_, u8>,
        dims: DisplayDimensions,
        output: &Path,
    ) -> Result<(), EncoderError> {
        let (_, height, width) = stack.dim();
        info!(
            "Resampling from {} x {} to {} x {}",
            width, height, dims.width, dims.height
        );
        match self {
            Encoder::Ffmpeg { fps, codec, runner } => {
                let cmd = FfmpegCommand::new(output, (width, height), *fps)
                    .video_filter(dims.scale_filter())
                    .video_codec(codec.as_str())
                    .pixel_format("yuv420p");
                // iter() walks (t, h, w) in logical order whatever the layout
                let frames: Vec<u8> = stack.iter().copied().collect();
                runner.run(&cmd, &frames).await
            }
            Encoder::PngSequence => Self::write_png_sequence(stack, dims, output),
        }
    }

    fn write_png_sequence(
        stack: &ArrayView3<'_, u8>,
        dims: DisplayDimensions,
        output: &Path,
    ) -> Result<(), EncoderError> {
        fs::create_dir_all(output)?;
        for (t, frame) in stack.axis_iter(Axis(0)).enumerate() {
            let upsampled = Interpolator::nearest_neighbor(&frame, dims);
            let pixel_data: Vec<u8> = upsampled.iter().copied().collect();
            let image = GrayImage::from_raw(dims.width, dims.height, pixel_data).ok_or(
                EncoderError::FrameSize {
                    width: dims.width,
                    height: dims.height,
                },
            )?;
            image.save(output.join(format!("{t:04}.png")))?;
        }
        Ok(())
    }
}
