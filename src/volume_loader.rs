use crate::volume::Volume;

use ndarray::Ix4;
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Extensions stripped from the input name to build output names
pub const NIFTI_EXTENSIONS: [&str; 2] = [".nii.gz", ".nii"];

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("Input file not found: {0}")]
    NotFound(String),

    #[error("Expected a 4D (x, y, z, t) image, found {0} dimensions")]
    NotFourDimensional(usize),

    #[error("Image has an empty axis: {0:?}")]
    EmptyAxis(Vec<usize>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NIfTI error: {0}")]
    Nifti(#[from] nifti::error::NiftiError),
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a 4D volume from a `.nii` or `.nii.gz` file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not a valid NIfTI-1
    /// image or does not have exactly four dimensions
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Volume, VolumeLoaderError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(VolumeLoaderError::NotFound(path.display().to_string()));
        }

        info!("Loading 4D image from {}", path.display());
        let object = ReaderOptions::new().read_file(path)?;
        let spacing = Self::get_spacing(&object.header().pixdim);
        debug!(?spacing, "Voxel spacing");

        let data = object.into_volume().into_ndarray::<f32>()?;
        let shape = data.shape().to_vec();
        if shape.len() != 4 {
            return Err(VolumeLoaderError::NotFourDimensional(shape.len()));
        }
        if shape.contains(&0) {
            return Err(VolumeLoaderError::EmptyAxis(shape));
        }
        let data = data
            .into_dimensionality::<Ix4>()
            .map_err(|_| VolumeLoaderError::NotFourDimensional(shape.len()))?;

        info!("Image size (nx, ny, nz, nt) : {:?}", data.dim());
        Ok(Volume::new(data, spacing))
    }

    /// File name with the NIfTI extension removed, used as the output stem
    pub fn file_stem(path: impl AsRef<Path>) -> String {
        let name = path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        NIFTI_EXTENSIONS
            .iter()
            .find_map(|ext| name.strip_suffix(ext))
            .map(str::to_owned)
            .unwrap_or(name)
    }

    fn get_spacing(pixdim: &[f32; 8]) -> (f32, f32, f32, f32) {
        (pixdim[1], pixdim[2], pixdim[3], pixdim[4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_nifti_extensions() {
        assert_eq!(VolumeLoader::file_stem("/data/sub-01_bold.nii.gz"), "sub-01_bold");
        assert_eq!(VolumeLoader::file_stem("run1.nii"), "run1");
        assert_eq!(VolumeLoader::file_stem("dir/scan.v2.nii"), "scan.v2");
        assert_eq!(VolumeLoader::file_stem("plain"), "plain");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = VolumeLoader::load_from_file("does/not/exist.nii.gz").unwrap_err();
        assert!(matches!(err, VolumeLoaderError::NotFound(_)));
    }
}
