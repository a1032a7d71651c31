use crate::enums::Orientation;

use ndarray::Array3;
use ndarray::Array4;
use ndarray::ArrayView3;
use ndarray::Axis;
use ndarray::s;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("{orientation} slice index {index} is outside the volume (axis length {len})")]
    IndexOutOfBounds {
        orientation: Orientation,
        index: usize,
        len: usize,
    },
}

/// Voxel coordinate where the three orthoslices intersect
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Center {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Center {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Index along the axis held fixed by `orientation`
    pub fn index_for(&self, orientation: Orientation) -> usize {
        match orientation {
            Orientation::Axial => self.z,
            Orientation::Coronal => self.y,
            Orientation::Sagittal => self.x,
        }
    }
}

#[derive(Debug, Default)]
pub struct Volume {
    pub data: Array4<f32>,
    pub spacing: (f32, f32, f32, f32),
}

impl Volume {
    pub fn new(data: Array4<f32>, spacing: (f32, f32, f32, f32)) -> Self {
        Self { data, spacing }
    }

    /// Get the dimensions of the volume (nx, ny, nz, nt)
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    /// Number of time frames
    pub fn frames(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    /// Check every plane index of `center` against the spatial extent.
    pub fn validate_center(&self, center: &Center) -> Result<(), VolumeError> {
        for orientation in Orientation::ALL {
            let index = center.index_for(orientation);
            if !self.is_valid_index(index, &orientation) {
                return Err(VolumeError::IndexOutOfBounds {
                    orientation,
                    index,
                    len: self.data.len_of(Axis(orientation.fixed_axis())),
                });
            }
        }
        Ok(())
    }

    /// Cross-section through `index` in native (a, b, t) axis order.
    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: &Orientation,
    ) -> Result<ArrayView3<'_, f32>, VolumeError> {
        if !self.is_valid_index(index, orientation) {
            return Err(VolumeError::IndexOutOfBounds {
                orientation: *orientation,
                index,
                len: self.data.len_of(Axis(orientation.fixed_axis())),
            });
        }
        let slice_result = match orientation {
            Orientation::Axial => self.data().slice(s![.., .., index, ..]),
            Orientation::Coronal => self.data().slice(s![.., index, .., ..]),
            Orientation::Sagittal => self.data().slice(s![index, .., .., ..]),
        };
        Ok(slice_result)
    }

    /// Cross-section through `index` as a (t, h, w) stack in display orientation.
    pub fn get_stack_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Result<Array3<f32>, VolumeError> {
        let slice = self.get_slice_from_axis(index, &orientation)?;
        let stack = match orientation {
            Orientation::Axial => reorder_axial(slice),
            Orientation::Coronal => reorder_coronal(slice),
            Orientation::Sagittal => reorder_sagittal(slice),
        };
        Ok(stack.as_standard_layout().into_owned())
    }

    fn is_valid_index(&self, index: usize, orientation: &Orientation) -> bool {
        index < self.data.len_of(Axis(orientation.fixed_axis()))
    }
}

/// (x, y, t) -> (t, y, x), then flip y so that anterior is up.
pub fn reorder_axial(slice: ArrayView3<'_, f32>) -> ArrayView3<'_, f32> {
    let mut stack = slice.reversed_axes();
    stack.invert_axis(Axis(1));
    stack
}

/// (x, z, t) -> (t, z, x), then flip z so that superior is up.
pub fn reorder_coronal(slice: ArrayView3<'_, f32>) -> ArrayView3<'_, f32> {
    let mut stack = slice.reversed_axes();
    stack.invert_axis(Axis(1));
    stack
}

/// (y, z, t) -> (t, z, y), then flip both z and y.
pub fn reorder_sagittal(slice: ArrayView3<'_, f32>) -> ArrayView3<'_, f32> {
    let mut stack = slice.reversed_axes();
    stack.invert_axis(Axis(1));
    stack.invert_axis(Axis(2));
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_volume() -> Volume {
        // (nx, ny, nz, nt) all distinct so a swapped axis cannot go unnoticed
        let mut data = Array4::<f32>::zeros((4, 5, 6, 2));
        data[[1, 1, 3, 1]] = 7.0;
        Volume::new(data, (1.0, 1.0, 1.0, 1.0))
    }

    #[test]
    fn axial_stack_flips_height_only() {
        let volume = marker_volume();
        let stack = volume.get_stack_from_axis(3, Orientation::Axial).unwrap();
        // (t, y, x) with y flipped
        assert_eq!(stack.dim(), (2, 5, 4));
        assert_eq!(stack[[1, 5 - 1 - 1, 1]], 7.0);
        assert_eq!(stack.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn coronal_stack_flips_height_only() {
        let volume = marker_volume();
        let stack = volume.get_stack_from_axis(1, Orientation::Coronal).unwrap();
        // (t, z, x) with z flipped
        assert_eq!(stack.dim(), (2, 6, 4));
        assert_eq!(stack[[1, 6 - 1 - 3, 1]], 7.0);
        assert_eq!(stack.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn sagittal_stack_flips_both_axes() {
        let volume = marker_volume();
        let stack = volume
            .get_stack_from_axis(1, Orientation::Sagittal)
            .unwrap();
        // (t, z, y) with z and y flipped
        assert_eq!(stack.dim(), (2, 6, 5));
        assert_eq!(stack[[1, 6 - 1 - 3, 5 - 1 - 1]], 7.0);
        assert_eq!(stack.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn stacks_are_standard_layout() {
        let volume = marker_volume();
        for orientation in Orientation::ALL {
            let stack = volume.get_stack_from_axis(1, orientation).unwrap();
            assert!(stack.is_standard_layout());
        }
    }

    #[test]
    fn single_frame_keeps_time_axis() {
        let volume = Volume::new(Array4::zeros((3, 3, 3, 1)), (1.0, 1.0, 1.0, 1.0));
        let stack = volume.get_stack_from_axis(0, Orientation::Axial).unwrap();
        assert_eq!(stack.dim(), (1, 3, 3));
    }

    #[test]
    fn out_of_range_center_is_rejected() {
        let volume = marker_volume();
        let err = volume.validate_center(&Center::new(1, 5, 2)).unwrap_err();
        match err {
            VolumeError::IndexOutOfBounds {
                orientation,
                index,
                len,
            } => {
                assert_eq!(orientation, Orientation::Coronal);
                assert_eq!(index, 5);
                assert_eq!(len, 5);
            }
        }
        assert!(volume.validate_center(&Center::new(3, 4, 5)).is_ok());
        assert!(volume.get_stack_from_axis(6, Orientation::Axial).is_err());
    }
}
