use crate::volume::Volume;

use ndarray::Array3;
use ndarray::ArrayView3;
use ndarray::Zip;

/// Lower percentile used for the global rescaling window
pub const LOW_PERCENTILE: f64 = 5.0;
/// Upper percentile used for the global rescaling window
pub const HIGH_PERCENTILE: f64 = 99.0;

/// Robust intensity window shared by every output stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntensityRange {
    pub low: f32,
    pub high: f32,
}

impl IntensityRange {
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// 5th and 99th percentile over every voxel of every frame.
    ///
    /// Non-finite voxels are ignored. A volume without any finite voxel
    /// yields the empty window `(0, 0)`.
    pub fn from_volume(volume: &Volume) -> Self {
        let mut values: Vec<f32> = volume
            .data()
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if values.is_empty() {
            return Self::new(0.0, 0.0);
        }
        let low = percentile(&mut values, LOW_PERCENTILE);
        let high = percentile(&mut values, HIGH_PERCENTILE);
        Self::new(low, high)
    }

    /// Offset and span of the linear map `(v - offset) / span * 255`.
    pub fn coefficients(&self) -> (f32, f32) {
        (self.low, self.high - self.low)
    }

    /// Map one intensity into [0, 255], clipping outside the window.
    #[inline]
    pub fn map_to_u8(&self, value: f32) -> u8 {
        // max/min rather than clamp: NaN lands on `low`
        let clipped = value.max(self.low).min(self.high);
        let (offset, span) = self.coefficients();
        let scaled = if span != 0.0 {
            (clipped - offset) / span * 255.0
        } else {
            clipped.clamp(0.0, 255.0)
        };
        scaled as u8
    }
}

/// Percentile with linear interpolation between the closest ranks.
///
/// Reorders `values` in place. `values` must not be empty.
pub fn percentile(values: &mut [f32], p: f64) -> f32 {
    let rank = p / 100.0 * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;

    let (_, lo_value, upper) = values.select_nth_unstable_by(lo, f32::total_cmp);
    let lo_value = *lo_value;
    if frac == 0.0 || upper.is_empty() {
        return lo_value;
    }
    let hi_value = upper.iter().copied().fold(f32::INFINITY, f32::min);

    (lo_value as f64 + (hi_value as f64 - lo_value as f64) * frac) as f32
}

/// Rescale a (t, h, w) stack into 8-bit with the shared window.
pub fn rescale_to_u8(stack: &ArrayView3<'_, f32>, range: &IntensityRange) -> Array3<u8> {
    Zip::from(stack).par_map_collect(|&v| range.map_to_u8(v))
}
