use crate::encoder::{DEFAULT_FPS, Encoder, EncoderError};
use crate::enums::{Orientation, OutputFormat};
use crate::intensity::{IntensityRange, rescale_to_u8};
use crate::interpolator::DisplayDimensions;
use crate::volume::{Center, Volume, VolumeError};
use crate::volume_loader::{VolumeLoader, VolumeLoaderError};

use ndarray::Array3;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] VolumeLoaderError),

    #[error(transparent)]
    Volume(#[from] VolumeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: EncoderError,
    },
}

/// Settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub infile: PathBuf,
    pub center: Center,
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    pub fps: u32,
}

impl Config {
    pub fn new(infile: impl Into<PathBuf>, center: Center) -> Self {
        Self {
            infile: infile.into(),
            center,
            out_dir: PathBuf::from("."),
            format: OutputFormat::default(),
            fps: DEFAULT_FPS,
        }
    }
}

/// One rescaled orthoslice stack, ready for encoding
#[derive(Debug)]
pub struct OrthoStack {
    pub orientation: Orientation,
    pub stack: Array3<u8>,
    pub dims: DisplayDimensions,
}

/// Slice, reorder and rescale all three planes through `center`.
///
/// Every plane is rescaled with the same `range`.
pub fn render_stacks(
    volume: &Volume,
    center: Center,
    range: &IntensityRange,
) -> Result<Vec<OrthoStack>, VolumeError> {
    volume.validate_center(&center)?;
    Orientation::ALL
        .into_iter()
        .map(|orientation| {
            let stack = volume.get_stack_from_axis(center.index_for(orientation), orientation)?;
            let stack = rescale_to_u8(&stack.view(), range);
            let dims = DisplayDimensions::for_stack(&stack.view());
            Ok::<_, VolumeError>(OrthoStack {
                orientation,
                stack,
                dims,
            })
        })
        .collect()
}

pub struct OrthoMovie {
    config: Config,
    encoder: Encoder,
}

impl OrthoMovie {
    pub fn new(config: Config) -> Self {
        let encoder = Encoder::from_format(config.format, config.fps);
        Self { config, encoder }
    }

    /// Run the whole pipeline and return the written outputs in
    /// xy, xz, yz order.
    pub async fn run(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let Config { infile, center, .. } = &self.config;
        info!("Input 4D image       : {}", infile.display());
        info!(
            "Orthoslice (x, y, z) : ({}, {}, {})",
            center.x, center.y, center.z
        );

        let volume = VolumeLoader::load_from_file(infile)?;
        self.run_volume(&volume, &VolumeLoader::file_stem(infile))
            .await
    }

    /// Encode the three orthoslice stacks of an already loaded volume.
    pub async fn run_volume(
        &self,
        volume: &Volume,
        stem: &str,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        info!("Determining robust rescaling limits");
        let range = IntensityRange::from_volume(volume);
        info!("Rescaling limits : ({}, {})", range.low, range.high);

        info!("Extracting orthoslices");
        let stacks = render_stacks(volume, self.config.center, &range)?;

        fs::create_dir_all(&self.config.out_dir)?;
        let mut outputs = Vec::with_capacity(stacks.len());
        for OrthoStack {
            orientation,
            stack,
            dims,
        } in &stacks
        {
            let path = self
                .encoder
                .output_path(&self.config.out_dir, stem, *orientation);
            info!("Writing {} movie to {}", orientation, path.display());
            self.encoder
                .encode(&stack.view(), *dims, &path)
                .await
                .map_err(|source| PipelineError::Encode {
                    path: path.clone(),
                    source,
                })?;
            outputs.push(path);
        }
        Ok(outputs)
    }
}
