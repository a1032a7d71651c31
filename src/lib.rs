//! # orthomovie
//!
//! Orthoslice movies through a single voxel of a 4D (x, y, z, t) NIfTI-1
//! time series, for visual quality control of motion correction.
//!
//! A volume is loaded from a `.nii` or `.nii.gz` file and cut along the
//! three medical planes through one center voxel:
//!  - Axial (xy, fixed z)
//!  - Coronal (xz, fixed y)
//!  - Sagittal (yz, fixed x)
//!
//! Each cut keeps the time axis, so it becomes a short movie. All three
//! movies share one robust intensity window (5th to 99th percentile of the
//! whole 4D volume) so brightness does not flicker between frames or differ
//! between planes. Frames are upsampled with nearest-neighbor sampling so
//! that every displayed pixel is a real voxel value.
//!
//! Movies are encoded by an `ffmpeg` executable found on `PATH`. A PNG
//! frame sequence can be written instead when ffmpeg is not available.
//!
//! # Examples
//!
//! ```no_run
//! # use orthomovie::{Config, OrthoMovie, volume::Center};
//! # async fn run() -> Result<(), orthomovie::PipelineError> {
//! let config = Config::new("sub-01_bold_mcf.nii.gz", Center::new(32, 32, 18));
//! let outputs = OrthoMovie::new(config).run().await?;
//! // sub-01_bold_mcf_xy.mp4, sub-01_bold_mcf_xz.mp4, sub-01_bold_mcf_yz.mp4
//! assert_eq!(outputs.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod encoder;
pub mod enums;
pub mod ffmpeg;
pub mod intensity;
pub mod interpolator;
pub mod pipeline;
pub mod volume;
pub mod volume_loader;

pub use pipeline::{Config, OrthoMovie, PipelineError, render_stacks};
